use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::catalog::{CatalogItem, ContentKey};

/// Which media types the user wants recommendations for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaFilter {
    Movie,
    Show,
    #[default]
    Both,
}

/// Inclusive numeric range used by the year and duration filters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RangeFilter {
    pub min: i32,
    pub max: i32,
}

impl RangeFilter {
    pub fn contains(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// User-controlled recommendation configuration, long-lived across a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PreferenceProfile {
    #[serde(default)]
    pub media_type_filter: MediaFilter,
    #[serde(default)]
    pub selected_genres: HashSet<u32>,
    #[serde(default)]
    pub selected_actors: HashSet<u64>,
    #[serde(default)]
    pub selected_directors: HashSet<u64>,
    /// Previously seen items, unique by `(id, media_type)`. Feeds both the
    /// similarity sub-score and the watched-exclusion filter.
    #[serde(default)]
    pub watched_content: Vec<CatalogItem>,
    #[serde(default)]
    pub year_range: Option<RangeFilter>,
    #[serde(default)]
    pub duration_range: Option<RangeFilter>,
    #[serde(default)]
    pub min_rating: f64,
}

impl PreferenceProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a watched item, ignoring duplicates by content key
    pub fn add_watched(&mut self, item: CatalogItem) {
        if !self.has_watched(item.key()) {
            self.watched_content.push(item);
        }
    }

    pub fn has_watched(&self, key: ContentKey) -> bool {
        self.watched_content.iter().any(|w| w.key() == key)
    }
}
