use crate::{
    error::AppResult,
    models::{NewRecommendation, Recommendation, ScoreFilter, VoteOutcome},
};

/// Storage operations the recommendation service relies on
///
/// Implementations are shared across request handlers, so every method takes
/// `&self` and must be safe to call concurrently.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationRepository: Send + Sync {
    /// Inserts a new record with score 0
    async fn create(&self, data: &NewRecommendation) -> AppResult<Recommendation>;

    async fn find(&self, id: i32) -> AppResult<Option<Recommendation>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Recommendation>>;

    /// Adds `delta` to the score in a single statement and returns the updated record
    async fn update_score(&self, id: i32, delta: i32) -> AppResult<Option<Recommendation>>;

    /// Decrements the score by one and, within the same atomic step, deletes
    /// the record when the new score is below `threshold`
    async fn decrement_and_prune(&self, id: i32, threshold: i32)
        -> AppResult<Option<VoteOutcome>>;

    /// Returns whether a record was deleted
    async fn remove(&self, id: i32) -> AppResult<bool>;

    /// Lists records ordered by id ascending, optionally restricted to a score range
    async fn find_all(&self, filter: Option<ScoreFilter>) -> AppResult<Vec<Recommendation>>;

    /// The `limit` most recently created records, newest first
    async fn latest(&self, limit: i64) -> AppResult<Vec<Recommendation>>;

    /// Up to `amount` records by score descending; ties are not ordered
    async fn top_by_score(&self, amount: i64) -> AppResult<Vec<Recommendation>>;

    async fn count(&self) -> AppResult<i64>;

    /// Removes every record
    async fn truncate(&self) -> AppResult<()>;
}
