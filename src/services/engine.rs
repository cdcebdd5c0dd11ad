//! Weighted multi-factor recommendation scoring.
//!
//! The engine is a pure function of its inputs: it filters a candidate pool
//! against the active preference filters, scores each survivor from five
//! weighted sub-scores, attaches human-readable match reasons, and returns a
//! ranked list. Missing optional fields on a candidate never fail the
//! computation; they degrade to neutral or zero contributions.

use std::collections::HashSet;

use chrono::{Datelike, Utc};

use crate::models::{
    all_genre_ids, genre_name, CatalogItem, PreferenceProfile, ScoredItem,
};
use crate::services::similarity::{cosine_similarity, genre_vector, normalize_score};

/// Default number of recommendations returned
pub const DEFAULT_LIMIT: usize = 20;

/// Fixed sub-score weights; they sum to 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub genre: f64,
    pub cast: f64,
    pub similarity: f64,
    pub rating: f64,
    pub popularity: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            genre: 0.30,
            cast: 0.25,
            similarity: 0.25,
            rating: 0.10,
            popularity: 0.10,
        }
    }
}

/// Computes composite recommendation scores over a candidate pool
pub struct RecommendationEngine {
    weights: ScoringWeights,
    genre_universe: Vec<u32>,
    current_year: i32,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(Utc::now().year())
    }
}

impl RecommendationEngine {
    /// Creates an engine anchored at the given current year; recency reasons
    /// and tests depend on the anchor rather than the wall clock
    pub fn new(current_year: i32) -> Self {
        Self {
            weights: ScoringWeights::default(),
            genre_universe: all_genre_ids(),
            current_year,
        }
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Filters, scores, sorts, and truncates the candidate pool.
    ///
    /// Candidates surviving the filters keep their relative order, and the
    /// descending sort is stable, so equal scores tie-break by pool order.
    pub fn generate_recommendations(
        &self,
        pool: &[CatalogItem],
        prefs: &PreferenceProfile,
        limit: usize,
    ) -> Vec<ScoredItem> {
        let filtered: Vec<&CatalogItem> = pool
            .iter()
            .filter(|item| self.passes_filters(item, prefs))
            .collect();

        tracing::debug!(
            pool_size = pool.len(),
            after_filters = filtered.len(),
            "Scoring candidate pool"
        );

        let mut scored: Vec<ScoredItem> = filtered
            .into_iter()
            .map(|item| ScoredItem {
                item: item.clone(),
                score: self.score(item, prefs),
                reasons: self.match_reasons(item, prefs),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        scored.truncate(limit);
        scored
    }

    /// Builds a genre-diverse subsequence of an already-ranked list: first at
    /// most one item per distinct primary genre in input order, then backfill
    /// from the top until `count` is reached
    pub fn diverse_recommendations(&self, ranked: &[ScoredItem], count: usize) -> Vec<ScoredItem> {
        let mut diverse: Vec<ScoredItem> = Vec::new();
        let mut used_genres: HashSet<u32> = HashSet::new();
        let mut used_keys = HashSet::new();

        for entry in ranked {
            if diverse.len() >= count {
                break;
            }
            if let Some(&primary) = entry.item.genre_ids.first() {
                if used_genres.insert(primary) {
                    used_keys.insert(entry.item.key());
                    diverse.push(entry.clone());
                }
            }
        }

        for entry in ranked {
            if diverse.len() >= count {
                break;
            }
            if used_keys.insert(entry.item.key()) {
                diverse.push(entry.clone());
            }
        }

        diverse
    }

    /// Composite score: the weighted sum of the five sub-scores
    pub fn score(&self, item: &CatalogItem, prefs: &PreferenceProfile) -> f64 {
        self.genre_score(item, prefs) * self.weights.genre
            + self.cast_score(item, prefs) * self.weights.cast
            + self.similarity_score(item, prefs) * self.weights.similarity
            + self.rating_score(item) * self.weights.rating
            + self.popularity_score(item) * self.weights.popularity
    }

    /// Genre sub-score. No selected genres is neutral (0.5), not a penalty.
    /// Any single match earns a 0.6 baseline so genre-relevant content never
    /// ranks below irrelevant content; further matches add a diminishing
    /// bonus capped at 0.4.
    pub fn genre_score(&self, item: &CatalogItem, prefs: &PreferenceProfile) -> f64 {
        if prefs.selected_genres.is_empty() {
            return 0.5;
        }
        if item.genre_ids.is_empty() {
            return 0.0;
        }

        let match_count = item
            .genre_ids
            .iter()
            .filter(|g| prefs.selected_genres.contains(*g))
            .count();

        if match_count == 0 {
            return 0.0;
        }

        let bonus_per_match = 0.4 / prefs.selected_genres.len().max(3) as f64;
        let bonus = (match_count as f64 * bonus_per_match).min(0.4);

        (0.6 + bonus).min(1.0)
    }

    /// Cast/crew sub-score: the fraction of selected people found in the
    /// item's cast or director credits. No selected people is neutral.
    pub fn cast_score(&self, item: &CatalogItem, prefs: &PreferenceProfile) -> f64 {
        let total_selected = prefs.selected_actors.len() + prefs.selected_directors.len();
        if total_selected == 0 {
            return 0.5;
        }

        let cast_ids: HashSet<u64> = item.cast.iter().map(|c| c.id).collect();
        let director_ids: HashSet<u64> = item.director_ids().collect();

        let match_count = prefs
            .selected_actors
            .iter()
            .filter(|id| cast_ids.contains(*id))
            .count()
            + prefs
                .selected_directors
                .iter()
                .filter(|id| director_ids.contains(*id))
                .count();

        (match_count as f64 / total_selected as f64).min(1.0)
    }

    /// Similarity sub-score: maximum cosine similarity between the item's
    /// genre vector and any single watched item's vector. Empty history is
    /// neutral.
    pub fn similarity_score(&self, item: &CatalogItem, prefs: &PreferenceProfile) -> f64 {
        if prefs.watched_content.is_empty() {
            return 0.5;
        }

        let item_vector = genre_vector(&item.genre_ids, &self.genre_universe);

        prefs
            .watched_content
            .iter()
            .map(|watched| {
                let watched_vector = genre_vector(&watched.genre_ids, &self.genre_universe);
                cosine_similarity(&item_vector, &watched_vector)
            })
            .fold(0.0, f64::max)
    }

    /// Rating sub-score; an unrated item contributes zero
    pub fn rating_score(&self, item: &CatalogItem) -> f64 {
        normalize_score(item.rating.unwrap_or(0.0), 0.0, 10.0)
    }

    /// Popularity sub-score, capped at 1000 before normalization
    pub fn popularity_score(&self, item: &CatalogItem) -> f64 {
        normalize_score(item.popularity.min(1000.0), 0.0, 1000.0)
    }

    fn passes_filters(&self, item: &CatalogItem, prefs: &PreferenceProfile) -> bool {
        if let Some(range) = prefs.year_range {
            if !range.contains(item.release_year()) {
                return false;
            }
        }

        // Items without a known runtime pass the duration filter
        if let (Some(range), Some(runtime)) = (prefs.duration_range, item.runtime_minutes) {
            if !range.contains(runtime as i32) {
                return false;
            }
        }

        if prefs.min_rating > 0.0 && item.rating.unwrap_or(0.0) < prefs.min_rating {
            return false;
        }

        if prefs.has_watched(item.key()) {
            return false;
        }

        true
    }

    /// Human-readable justifications, in fixed order: genre match, high
    /// rating, popularity, recency. At most one entry per category.
    pub fn match_reasons(&self, item: &CatalogItem, prefs: &PreferenceProfile) -> Vec<String> {
        let mut reasons = Vec::new();

        if !prefs.selected_genres.is_empty() {
            let names: Vec<&str> = item
                .genre_ids
                .iter()
                .filter(|g| prefs.selected_genres.contains(*g))
                .filter_map(|g| genre_name(*g))
                .collect();
            if !names.is_empty() {
                reasons.push(format!("Matches {} genre", names.join(", ")));
            }
        }

        if let Some(rating) = item.rating {
            if rating >= 7.5 {
                reasons.push(format!("High rating ({rating:.1})"));
            }
        }

        if item.popularity > 100.0 {
            reasons.push("Popular".to_string());
        }

        let year = item.release_year();
        if year >= self.current_year - 2 {
            reasons.push("Recent release".to_string());
        }

        reasons
    }
}
