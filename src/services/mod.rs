pub mod engine;
pub mod providers;
pub mod rounds;
pub mod similarity;

pub use engine::{RecommendationEngine, ScoringWeights, DEFAULT_LIMIT};
pub use rounds::{PairSelector, RandomPairSelector, RoundController, RoundSelection, TOTAL_ROUNDS};
