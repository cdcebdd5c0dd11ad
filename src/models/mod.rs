pub mod catalog;
pub mod preferences;
pub mod tmdb;

pub use catalog::{
    all_genre_ids, genre_name, CastMember, CatalogItem, ContentKey, CrewMember, MediaType,
    ScoredItem, GENRES,
};
pub use preferences::{MediaFilter, PreferenceProfile, RangeFilter};
