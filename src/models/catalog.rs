use std::fmt::Display;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Type of content in the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Show,
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Movie => write!(f, "movie"),
            MediaType::Show => write!(f, "show"),
        }
    }
}

/// Uniqueness key for catalog items.
///
/// Movie and show identifier spaces overlap at the provider, so an item is
/// only unique by the `(id, media_type)` pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ContentKey {
    pub id: u64,
    pub media_type: MediaType,
}

/// A cast credit on a catalog item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
}

/// A crew credit on a catalog item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    pub job: String,
}

/// A candidate title from the catalog provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: u64,
    pub media_type: MediaType,
    pub title: String,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Average user rating in [0, 10]. `None` means "no votes yet": the
    /// provider reports that as a literal zero, which is mapped to `None` at
    /// the boundary so it is not confused with a unanimous zero rating.
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub runtime_minutes: Option<u32>,
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl CatalogItem {
    pub fn key(&self) -> ContentKey {
        ContentKey {
            id: self.id,
            media_type: self.media_type,
        }
    }

    /// Release year, with 0 as the sentinel for an unknown date. The sentinel
    /// naturally fails explicit year-range filters and recency checks.
    pub fn release_year(&self) -> i32 {
        self.release_date.map(|d| d.year()).unwrap_or(0)
    }

    /// Person ids of crew members credited as director
    pub fn director_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.crew
            .iter()
            .filter(|c| c.job == "Director")
            .map(|c| c.id)
    }
}

/// A catalog item with its computed recommendation score and the
/// human-readable reasons behind it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub score: f64,
    pub reasons: Vec<String>,
}

/// TMDB genre universe, movies and TV combined, in fixed order.
///
/// The ordering doubles as the layout of every genre indicator vector, so all
/// vectors built from it are comparable.
pub const GENRES: &[(u32, &str)] = &[
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
    (10759, "Action & Adventure"),
    (10762, "Kids"),
    (10763, "News"),
    (10764, "Reality"),
    (10765, "Sci-Fi & Fantasy"),
    (10766, "Soap"),
    (10767, "Talk"),
    (10768, "War & Politics"),
];

/// All genre codes in universe order
pub fn all_genre_ids() -> Vec<u32> {
    GENRES.iter().map(|(id, _)| *id).collect()
}

/// Human-readable name for a genre code
pub fn genre_name(id: u32) -> Option<&'static str> {
    GENRES
        .iter()
        .find(|(genre_id, _)| *genre_id == id)
        .map(|(_, name)| *name)
}
