//! Raw TMDB response shapes and their conversion into [`CatalogItem`].
//!
//! Keeping the provider's field names and nesting here isolates the rest of
//! the crate from the wire format: everything downstream of this module works
//! with `CatalogItem` only.

use chrono::NaiveDate;
use serde::Deserialize;

use super::catalog::{CastMember, CatalogItem, CrewMember, MediaType};

/// One page of a TMDB list endpoint (discover, similar, search)
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<TmdbListItem>,
    #[serde(default)]
    pub total_pages: u32,
}

/// A list-endpoint entry. Movies carry `title`/`release_date`, shows carry
/// `name`/`first_air_date`; both variants deserialize into the same struct.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbListItem {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// A detail-endpoint response, requested with `append_to_response=credits`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbDetails {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub episode_run_time: Vec<u32>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub credits: Option<TmdbCredits>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCastMember {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCrewMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub job: String,
}

/// Parses a provider date string, treating empty or malformed values as absent
fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

/// Maps the provider's zero-means-unrated sentinel to an absent rating
fn parse_rating(vote_average: f64) -> Option<f64> {
    if vote_average > 0.0 {
        Some(vote_average)
    } else {
        None
    }
}

impl TmdbListItem {
    /// Converts a list entry into a [`CatalogItem`].
    ///
    /// List endpoints do not label entries with their media type, so the
    /// caller supplies it from the endpoint that was queried.
    pub fn into_item(self, media_type: MediaType) -> CatalogItem {
        let title = self.title.or(self.name).unwrap_or_default();
        let release_date = parse_date(
            self.release_date
                .as_deref()
                .or(self.first_air_date.as_deref()),
        );

        CatalogItem {
            id: self.id,
            media_type,
            title,
            genre_ids: self.genre_ids,
            rating: parse_rating(self.vote_average),
            popularity: self.popularity,
            release_date,
            runtime_minutes: None,
            cast: Vec::new(),
            crew: Vec::new(),
            overview: self.overview.filter(|o| !o.is_empty()),
            poster_path: self.poster_path,
        }
    }
}

impl TmdbDetails {
    /// Converts a detail response into a [`CatalogItem`] with credits attached
    pub fn into_item(self, media_type: MediaType) -> CatalogItem {
        let title = self.title.or(self.name).unwrap_or_default();
        let release_date = parse_date(
            self.release_date
                .as_deref()
                .or(self.first_air_date.as_deref()),
        );

        // Movies report a single runtime; shows report per-episode runtimes
        let runtime_minutes = self
            .runtime
            .or_else(|| self.episode_run_time.first().copied());

        let (cast, crew) = match self.credits {
            Some(credits) => (
                credits
                    .cast
                    .into_iter()
                    .map(|c| CastMember {
                        id: c.id,
                        name: c.name,
                    })
                    .collect(),
                credits
                    .crew
                    .into_iter()
                    .map(|c| CrewMember {
                        id: c.id,
                        name: c.name,
                        job: c.job,
                    })
                    .collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };

        CatalogItem {
            id: self.id,
            media_type,
            title,
            genre_ids: self.genres.into_iter().map(|g| g.id).collect(),
            rating: parse_rating(self.vote_average),
            popularity: self.popularity,
            release_date,
            runtime_minutes,
            cast,
            crew,
            overview: self.overview.filter(|o| !o.is_empty()),
            poster_path: self.poster_path,
        }
    }
}
