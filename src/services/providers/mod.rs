//! External collaborator abstractions.
//!
//! The catalog provider and the text-generation service are consumed through
//! traits so the engine and round controller can be driven by fakes in tests
//! and are never tied to a concrete vendor.

use crate::{
    error::AppResult,
    models::{CatalogItem, MediaType, PreferenceProfile},
};

pub mod gemini;
pub mod tmdb;

pub use gemini::GeminiClient;
pub use tmdb::TmdbProvider;

#[cfg(test)]
use mockall::automock;

/// Trait for catalog metadata providers
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch a page of candidate items matching the profile's hard filters.
    ///
    /// Providers may pre-filter server-side where supported; the engine
    /// re-applies every filter locally regardless.
    async fn discover(&self, prefs: &PreferenceProfile, page: u32) -> AppResult<Vec<CatalogItem>>;

    /// Fetch a full detail record, including credits, for one title
    async fn details(&self, id: u64, media_type: MediaType) -> AppResult<CatalogItem>;

    /// Fetch titles the provider considers similar to the given one
    async fn similar(&self, id: u64, media_type: MediaType) -> AppResult<Vec<CatalogItem>>;
}

/// Trait for the advisory text-generation service.
///
/// Output is never used for scoring or ranking decisions; every call site
/// must have a static fallback for when generation fails.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a short piece of text for the given prompt
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}
