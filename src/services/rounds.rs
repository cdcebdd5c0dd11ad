//! Round-based preference elicitation.
//!
//! Three pairwise-choice rounds: each round presents two candidates drawn at
//! random from the content pool, the user marks one as watched, and the
//! selections become the implicit-feedback signal for the final
//! recommendation list. The unpicked candidate is discarded outright; only
//! positive preference is ever modeled.

use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::index::sample;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{genre_name, CatalogItem, ContentKey, MediaType, ScoredItem},
    services::providers::{CatalogProvider, TextGenerator},
};

/// Number of elicitation rounds per session
pub const TOTAL_ROUNDS: u8 = 3;

/// Maximum teaser length in characters
const TEASER_MAX_CHARS: usize = 300;

/// Size of the finalized recommendation list
const FINAL_LIMIT: usize = 50;

/// Size of the fallback list when every round was skipped
const FALLBACK_LIMIT: usize = 20;

/// Source of the two candidate indices for a round.
///
/// Production uses an unseeded thread-local generator; tests inject scripted
/// picks so round behavior is deterministic.
pub trait PairSelector: Send + Sync {
    /// Picks two distinct indices in `0..pool_len`. Callers guarantee
    /// `pool_len >= 2`.
    fn pick_pair(&mut self, pool_len: usize) -> (usize, usize);
}

/// Default selector backed by `rand::thread_rng`
#[derive(Default)]
pub struct RandomPairSelector;

impl PairSelector for RandomPairSelector {
    fn pick_pair(&mut self, pool_len: usize) -> (usize, usize) {
        let mut rng = rand::thread_rng();
        let picked = sample(&mut rng, pool_len, 2);
        (picked.index(0), picked.index(1))
    }
}

/// The item a user marked as watched in one round
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RoundSelection {
    pub id: u64,
    pub media_type: MediaType,
}

impl RoundSelection {
    fn key(&self) -> ContentKey {
        ContentKey {
            id: self.id,
            media_type: self.media_type,
        }
    }
}

/// One candidate of a presented pair, with its teaser text
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PresentedCandidate {
    pub item: CatalogItem,
    pub teaser: String,
}

/// The two candidates presented in a round
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PresentedPair {
    pub round: u8,
    pub first: PresentedCandidate,
    pub second: PresentedCandidate,
}

/// Controller lifecycle, one instance per session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundPhase {
    Idle,
    Rendered(u8),
    Resolved(u8),
    Done,
}

/// Drives the three elicitation rounds and the finalization step
pub struct RoundController {
    catalog: Arc<dyn CatalogProvider>,
    text: Arc<dyn TextGenerator>,
    selector: Box<dyn PairSelector>,
    phase: RoundPhase,
    /// Latest pool handed to `start_round`; the all-skipped fallback draws
    /// from it
    pool: Vec<CatalogItem>,
    /// Keys of the currently presented pair, for resolve validation
    current_pair: Option<(u8, [ContentKey; 2])>,
    selections: Vec<RoundSelection>,
}

impl RoundController {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        text: Arc<dyn TextGenerator>,
        selector: Box<dyn PairSelector>,
    ) -> Self {
        Self {
            catalog,
            text,
            selector,
            phase: RoundPhase::Idle,
            pool: Vec::new(),
            current_pair: None,
            selections: Vec::new(),
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn selections(&self) -> &[RoundSelection] {
        &self.selections
    }

    /// Prepares a round: picks two distinct candidates, fetches their full
    /// detail records concurrently, and attaches a teaser for each.
    ///
    /// A pool smaller than two items is a precondition failure the caller
    /// must handle by supplying a larger pool. A failed detail fetch is fatal
    /// to the round; a failed teaser generation is not.
    pub async fn start_round(
        &mut self,
        round: u8,
        pool: &[CatalogItem],
    ) -> AppResult<PresentedPair> {
        if round == 0 || round > TOTAL_ROUNDS {
            return Err(AppError::InvalidInput(format!(
                "round must be between 1 and {}",
                TOTAL_ROUNDS
            )));
        }
        if pool.len() < 2 {
            return Err(AppError::InsufficientPool(pool.len()));
        }

        self.pool = pool.to_vec();

        let (i, j) = self.selector.pick_pair(pool.len());
        let (a, b) = (&pool[i], &pool[j]);

        tracing::debug!(
            round = round,
            first = %a.title,
            second = %b.title,
            "Preparing round pair"
        );

        let (first_item, second_item) = tokio::try_join!(
            self.catalog.details(a.id, a.media_type),
            self.catalog.details(b.id, b.media_type)
        )?;

        let (first_teaser, second_teaser) =
            tokio::join!(self.teaser(&first_item), self.teaser(&second_item));

        self.current_pair = Some((round, [first_item.key(), second_item.key()]));
        self.phase = RoundPhase::Rendered(round);

        Ok(PresentedPair {
            round,
            first: PresentedCandidate {
                item: first_item,
                teaser: first_teaser,
            },
            second: PresentedCandidate {
                item: second_item,
                teaser: second_teaser,
            },
        })
    }

    /// Records the user's pick for a round. The unpicked candidate is
    /// discarded with no effect.
    pub fn resolve_round(&mut self, round: u8, id: u64, media_type: MediaType) -> AppResult<()> {
        let selection = RoundSelection { id, media_type };

        if let Some((presented_round, keys)) = &self.current_pair {
            if *presented_round == round && !keys.contains(&selection.key()) {
                return Err(AppError::InvalidInput(format!(
                    "{} {} was not presented in round {}",
                    media_type, id, round
                )));
            }
        }

        if !self.selections.iter().any(|s| s.key() == selection.key()) {
            self.selections.push(selection);
        }

        tracing::info!(round = round, id = id, media_type = %media_type, "Round resolved");

        self.current_pair = None;
        self.phase = RoundPhase::Resolved(round);
        Ok(())
    }

    /// Skips a round; downstream personalization simply has one signal fewer
    pub fn skip_round(&mut self, round: u8) {
        tracing::info!(round = round, "Round skipped");
        self.current_pair = None;
        self.phase = RoundPhase::Resolved(round);
    }

    /// Builds the final list from provider "similar" results for each
    /// recorded selection, with a flat popularity-derived score.
    ///
    /// With zero selections the first items of the original pool are returned
    /// instead; the weighted scoring engine is deliberately not invoked here,
    /// the two ranking paths stay independent.
    pub async fn finalize(&mut self) -> AppResult<Vec<ScoredItem>> {
        let result = if self.selections.is_empty() {
            tracing::info!("No round selections recorded, falling back to content pool");
            self.pool_fallback()
        } else {
            let mut merged: Vec<CatalogItem> = Vec::new();
            let mut failures = 0usize;

            for selection in &self.selections {
                match self
                    .catalog
                    .similar(selection.id, selection.media_type)
                    .await
                {
                    Ok(items) => merged.extend(items),
                    Err(e) => {
                        tracing::warn!(
                            id = selection.id,
                            media_type = %selection.media_type,
                            error = %e,
                            "Similar-items fetch failed"
                        );
                        failures += 1;
                    }
                }
            }

            if merged.is_empty() && failures > 0 {
                self.pool_fallback()
            } else {
                let mut seen = HashSet::new();
                let mut scored: Vec<ScoredItem> = merged
                    .into_iter()
                    .filter(|item| seen.insert(item.key()))
                    .map(similar_scored)
                    .collect();

                scored.sort_by(|a, b| {
                    b.score
                        .partial_cmp(&a.score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                scored.truncate(FINAL_LIMIT);
                scored
            }
        };

        tracing::info!(count = result.len(), "Finalized round recommendations");

        self.phase = RoundPhase::Done;
        Ok(result)
    }

    /// Generates a teaser for one candidate, falling back to its synopsis
    /// when the text service fails
    async fn teaser(&self, item: &CatalogItem) -> String {
        let genres: Vec<&str> = item
            .genre_ids
            .iter()
            .filter_map(|g| genre_name(*g))
            .collect();
        let synopsis = item.overview.as_deref().unwrap_or_default();

        let prompt = format!(
            "Write an enticing 2-3 sentence description of this {}:\n\n\
             Title: \"{}\"\nGenres: {}\nSynopsis: {}\n\n\
             Why is it worth watching? Keep it short.",
            item.media_type,
            item.title,
            if genres.is_empty() {
                "Unknown".to_string()
            } else {
                genres.join(", ")
            },
            truncate_chars(synopsis, 200),
        );

        match self.text.generate(&prompt).await {
            Ok(text) => truncate_chars(&text, TEASER_MAX_CHARS),
            Err(e) => {
                tracing::warn!(title = %item.title, error = %e, "Teaser generation failed, using synopsis");
                let fallback = item
                    .overview
                    .clone()
                    .unwrap_or_else(|| format!("{} is well worth a watch.", item.title));
                truncate_chars(&fallback, TEASER_MAX_CHARS)
            }
        }
    }

    fn pool_fallback(&self) -> Vec<ScoredItem> {
        self.pool
            .iter()
            .take(FALLBACK_LIMIT)
            .cloned()
            .map(|item| ScoredItem {
                score: flat_score(&item),
                reasons: vec!["Matches your selected genres".to_string()],
                item,
            })
            .collect()
    }
}

/// Flat popularity-derived score used by the finalization path
fn flat_score(item: &CatalogItem) -> f64 {
    item.rating.unwrap_or(0.0) * 10.0
}

fn similar_scored(item: CatalogItem) -> ScoredItem {
    let mut reasons = vec!["Similar to titles you watched".to_string()];
    if let Some(rating) = item.rating {
        reasons.push(format!("★ {rating:.1}/10"));
    }
    ScoredItem {
        score: flat_score(&item),
        reasons,
        item,
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}...", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::{MockCatalogProvider, MockTextGenerator};

    /// Selector that replays a fixed sequence of picks
    struct ScriptedSelector {
        picks: Vec<(usize, usize)>,
    }

    impl PairSelector for ScriptedSelector {
        fn pick_pair(&mut self, _pool_len: usize) -> (usize, usize) {
            self.picks.remove(0)
        }
    }

    fn item(id: u64, media_type: MediaType, rating: Option<f64>) -> CatalogItem {
        CatalogItem {
            id,
            media_type,
            title: format!("Title {id}"),
            genre_ids: vec![28],
            rating,
            popularity: 10.0,
            release_date: None,
            runtime_minutes: None,
            cast: Vec::new(),
            crew: Vec::new(),
            overview: Some(format!("Synopsis for title {id}")),
            poster_path: None,
        }
    }

    fn controller_with(
        catalog: MockCatalogProvider,
        text: MockTextGenerator,
        picks: Vec<(usize, usize)>,
    ) -> RoundController {
        RoundController::new(
            Arc::new(catalog),
            Arc::new(text),
            Box::new(ScriptedSelector { picks }),
        )
    }

    fn details_mock() -> MockCatalogProvider {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_details()
            .returning(|id, media_type| Ok(item(id, media_type, Some(7.0))));
        catalog
    }

    #[tokio::test]
    async fn test_start_round_rejects_small_pool() {
        let mut controller = controller_with(
            MockCatalogProvider::new(),
            MockTextGenerator::new(),
            vec![],
        );

        let err = controller
            .start_round(1, &[item(1, MediaType::Movie, None)])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientPool(1)));
        assert_eq!(controller.phase(), RoundPhase::Idle);
    }

    #[tokio::test]
    async fn test_start_round_rejects_out_of_range_round() {
        let mut controller = controller_with(
            MockCatalogProvider::new(),
            MockTextGenerator::new(),
            vec![],
        );

        let pool = vec![item(1, MediaType::Movie, None), item(2, MediaType::Movie, None)];
        assert!(matches!(
            controller.start_round(4, &pool).await.unwrap_err(),
            AppError::InvalidInput(_)
        ));
    }

    #[tokio::test]
    async fn test_start_round_presents_generated_teasers() {
        let mut text = MockTextGenerator::new();
        text.expect_generate()
            .returning(|_| Ok("A gripping pick.".to_string()));

        let mut controller = controller_with(details_mock(), text, vec![(0, 1)]);

        let pool = vec![item(1, MediaType::Movie, None), item(2, MediaType::Show, None)];
        let pair = controller.start_round(1, &pool).await.unwrap();

        assert_eq!(pair.round, 1);
        assert_eq!(pair.first.item.id, 1);
        assert_eq!(pair.second.item.id, 2);
        assert_eq!(pair.first.teaser, "A gripping pick.");
        assert_eq!(controller.phase(), RoundPhase::Rendered(1));
    }

    #[tokio::test]
    async fn test_teaser_falls_back_to_synopsis_on_generation_failure() {
        let mut text = MockTextGenerator::new();
        text.expect_generate()
            .returning(|_| Err(AppError::TextGeneration("unavailable".to_string())));

        let mut controller = controller_with(details_mock(), text, vec![(0, 1)]);

        let pool = vec![item(1, MediaType::Movie, None), item(2, MediaType::Movie, None)];
        let pair = controller.start_round(1, &pool).await.unwrap();

        assert_eq!(pair.first.teaser, "Synopsis for title 1");
        assert_eq!(pair.second.teaser, "Synopsis for title 2");
    }

    #[tokio::test]
    async fn test_detail_fetch_failure_is_fatal_to_round() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_details()
            .returning(|_, _| Err(AppError::ExternalApi("boom".to_string())));

        let mut controller = controller_with(catalog, MockTextGenerator::new(), vec![(0, 1)]);

        let pool = vec![item(1, MediaType::Movie, None), item(2, MediaType::Movie, None)];
        assert!(controller.start_round(1, &pool).await.is_err());
    }

    #[tokio::test]
    async fn test_resolve_rejects_unpresented_item() {
        let mut text = MockTextGenerator::new();
        text.expect_generate().returning(|_| Ok("ok".to_string()));
        let mut controller = controller_with(details_mock(), text, vec![(0, 1)]);

        let pool = vec![item(1, MediaType::Movie, None), item(2, MediaType::Movie, None)];
        controller.start_round(1, &pool).await.unwrap();

        assert!(controller.resolve_round(1, 99, MediaType::Movie).is_err());
        assert!(controller.resolve_round(1, 2, MediaType::Movie).is_ok());
        assert_eq!(controller.selections().len(), 1);
    }

    #[tokio::test]
    async fn test_finalize_fetches_similar_for_each_selection_only() {
        let mut text = MockTextGenerator::new();
        text.expect_generate().returning(|_| Ok("ok".to_string()));

        let mut catalog = details_mock();
        // Two resolved rounds, one skipped: exactly two similar lookups
        catalog
            .expect_similar()
            .times(2)
            .returning(|id, media_type| {
                Ok(vec![
                    item(id * 10, media_type, Some(8.0)),
                    item(id * 10 + 1, media_type, Some(6.0)),
                ])
            });

        let mut controller = controller_with(catalog, text, vec![(0, 1), (0, 1)]);

        let pool = vec![item(1, MediaType::Movie, None), item(2, MediaType::Movie, None)];
        controller.start_round(1, &pool).await.unwrap();
        controller.resolve_round(1, 1, MediaType::Movie).unwrap();
        controller.start_round(2, &pool).await.unwrap();
        controller.resolve_round(2, 2, MediaType::Movie).unwrap();
        controller.skip_round(3);

        let final_list = controller.finalize().await.unwrap();

        assert_eq!(controller.phase(), RoundPhase::Done);
        assert_eq!(final_list.len(), 4);
        // Flat score is rating x 10, sorted descending
        assert_eq!(final_list[0].score, 80.0);
        assert!(final_list[0]
            .reasons
            .contains(&"Similar to titles you watched".to_string()));
    }

    #[tokio::test]
    async fn test_finalize_dedups_similar_results_by_key() {
        let mut text = MockTextGenerator::new();
        text.expect_generate().returning(|_| Ok("ok".to_string()));

        let mut catalog = details_mock();
        // Both selections return the same similar title
        catalog
            .expect_similar()
            .times(2)
            .returning(|_, media_type| Ok(vec![item(500, media_type, Some(7.5))]));

        let mut controller = controller_with(catalog, text, vec![(0, 1), (0, 1)]);

        let pool = vec![item(1, MediaType::Movie, None), item(2, MediaType::Movie, None)];
        controller.start_round(1, &pool).await.unwrap();
        controller.resolve_round(1, 1, MediaType::Movie).unwrap();
        controller.start_round(2, &pool).await.unwrap();
        controller.resolve_round(2, 2, MediaType::Movie).unwrap();
        controller.skip_round(3);

        let final_list = controller.finalize().await.unwrap();
        assert_eq!(final_list.len(), 1);
    }

    #[tokio::test]
    async fn test_finalize_all_skipped_uses_pool_fallback() {
        let mut text = MockTextGenerator::new();
        text.expect_generate().returning(|_| Ok("ok".to_string()));

        let mut catalog = details_mock();
        catalog.expect_similar().times(0);

        let mut controller = controller_with(catalog, text, vec![(0, 1)]);

        let pool: Vec<CatalogItem> = (1..=30)
            .map(|id| item(id, MediaType::Movie, Some(6.0)))
            .collect();
        controller.start_round(1, &pool).await.unwrap();
        controller.skip_round(1);
        controller.skip_round(2);
        controller.skip_round(3);

        let final_list = controller.finalize().await.unwrap();

        assert_eq!(final_list.len(), 20);
        assert_eq!(final_list[0].item.id, 1);
        assert_eq!(
            final_list[0].reasons,
            vec!["Matches your selected genres".to_string()]
        );
    }

    #[tokio::test]
    async fn test_finalize_falls_back_when_every_similar_call_fails() {
        let mut text = MockTextGenerator::new();
        text.expect_generate().returning(|_| Ok("ok".to_string()));

        let mut catalog = details_mock();
        catalog
            .expect_similar()
            .returning(|_, _| Err(AppError::ExternalApi("down".to_string())));

        let mut controller = controller_with(catalog, text, vec![(0, 1)]);

        let pool = vec![
            item(1, MediaType::Movie, Some(6.0)),
            item(2, MediaType::Movie, Some(5.0)),
        ];
        controller.start_round(1, &pool).await.unwrap();
        controller.resolve_round(1, 1, MediaType::Movie).unwrap();

        let final_list = controller.finalize().await.unwrap();
        assert_eq!(final_list.len(), 2);
        assert_eq!(
            final_list[0].reasons,
            vec!["Matches your selected genres".to_string()]
        );
    }

    #[test]
    fn test_truncate_chars_appends_ellipsis() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdefghij", 5), "abcde...");
    }
}
