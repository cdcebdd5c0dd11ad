use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::PreferenceProfile;
use crate::services::{
    providers::{CatalogProvider, TextGenerator},
    RandomPairSelector, RecommendationEngine, RoundController,
};
use crate::storage::UserDataStore;

/// Shared application state.
///
/// The catalog provider and text generator are injected at construction so
/// tests can substitute fakes.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<RwLock<AppStateInner>>,
    pub catalog: Arc<dyn CatalogProvider>,
}

/// Inner state that can be modified
pub struct AppStateInner {
    pub preferences: PreferenceProfile,
    pub store: UserDataStore,
    pub engine: RecommendationEngine,
    pub rounds: RoundController,
}

impl AppState {
    /// Creates application state around the given collaborators
    pub fn new(catalog: Arc<dyn CatalogProvider>, text: Arc<dyn TextGenerator>) -> Self {
        let rounds = RoundController::new(
            Arc::clone(&catalog),
            text,
            Box::new(RandomPairSelector),
        );

        Self {
            inner: Arc::new(RwLock::new(AppStateInner {
                preferences: PreferenceProfile::new(),
                store: UserDataStore::new(),
                engine: RecommendationEngine::default(),
                rounds,
            })),
            catalog,
        }
    }
}
