use std::sync::Arc;

use rand::Rng;
use tracing::instrument;

use crate::{
    db::RecommendationRepository,
    error::{AppError, AppResult},
    models::{NewRecommendation, Recommendation},
    services::selection::{choose_partition, pick_index},
};

/// A downvote leaving the score below this value removes the recommendation
pub const REMOVAL_THRESHOLD: i32 = -5;

/// How many records `get` returns
pub const LATEST_LIMIT: i64 = 10;

/// Voting and selection rules for song recommendations
///
/// Holds an injected store handle; all persistence goes through it.
#[derive(Clone)]
pub struct RecommendationService {
    repository: Arc<dyn RecommendationRepository>,
}

impl RecommendationService {
    pub fn new(repository: Arc<dyn RecommendationRepository>) -> Self {
        Self { repository }
    }

    /// Stores a new recommendation with score 0
    ///
    /// The input is expected to have passed `NewRecommendation::validate`.
    #[instrument(skip(self, data), fields(name = %data.name))]
    pub async fn insert(&self, data: NewRecommendation) -> AppResult<Recommendation> {
        if self.repository.find_by_name(&data.name).await?.is_some() {
            return Err(AppError::Conflict(
                "Recommendations names must be unique".to_string(),
            ));
        }

        let recommendation = self.repository.create(&data).await?;
        tracing::info!(id = recommendation.id, "Recommendation created");

        Ok(recommendation)
    }

    #[instrument(skip(self))]
    pub async fn upvote(&self, id: i32) -> AppResult<()> {
        self.get_by_id(id).await?;

        // The record may disappear between the lookup and the update
        let updated = self
            .repository
            .update_score(id, 1)
            .await?
            .ok_or_else(not_found)?;
        tracing::debug!(id, score = updated.score, "Recommendation upvoted");

        Ok(())
    }

    /// Lowers the score by one, removing the record once it drops below
    /// [`REMOVAL_THRESHOLD`]
    #[instrument(skip(self))]
    pub async fn downvote(&self, id: i32) -> AppResult<()> {
        self.get_by_id(id).await?;

        let outcome = self
            .repository
            .decrement_and_prune(id, REMOVAL_THRESHOLD)
            .await?
            .ok_or_else(not_found)?;

        if outcome.removed {
            tracing::info!(
                id,
                score = outcome.recommendation.score,
                "Recommendation removed after falling below threshold"
            );
        } else {
            tracing::debug!(
                id,
                score = outcome.recommendation.score,
                "Recommendation downvoted"
            );
        }

        Ok(())
    }

    /// The most recent recommendations, newest first
    pub async fn get(&self) -> AppResult<Vec<Recommendation>> {
        self.repository.latest(LATEST_LIMIT).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Recommendation> {
        self.repository.find(id).await?.ok_or_else(not_found)
    }

    /// Up to `amount` recommendations by score, highest first
    pub async fn get_top(&self, amount: u32) -> AppResult<Vec<Recommendation>> {
        self.repository.top_by_score(i64::from(amount)).await
    }

    /// Picks a recommendation with the weighted popular/fresh policy
    pub async fn get_random(&self) -> AppResult<Recommendation> {
        let (partition_roll, index_roll) = {
            let mut rng = rand::thread_rng();
            (rng.gen::<f64>(), rng.gen::<f64>())
        };

        self.get_random_with(partition_roll, index_roll).await
    }

    /// Same as [`get_random`](Self::get_random) with the two uniform rolls supplied
    ///
    /// `partition_roll` chooses the preferred side of the score split and
    /// `index_roll` picks uniformly inside the resulting pool. When the
    /// preferred side is empty the pool is every record.
    #[instrument(skip(self))]
    pub async fn get_random_with(
        &self,
        partition_roll: f64,
        index_roll: f64,
    ) -> AppResult<Recommendation> {
        let partition = choose_partition(partition_roll);

        let mut pool = self
            .repository
            .find_all(Some(partition.score_filter()))
            .await?;

        if pool.is_empty() {
            tracing::debug!(?partition, "Preferred partition empty, drawing from all");
            pool = self.repository.find_all(None).await?;
        }

        if pool.is_empty() {
            return Err(not_found());
        }

        let index = pick_index(pool.len(), index_roll);
        Ok(pool.swap_remove(index))
    }

    /// Clears every recommendation; only reachable from the test reset route
    pub async fn delete_all(&self) -> AppResult<()> {
        self.repository.truncate().await?;
        tracing::warn!("All recommendations deleted");
        Ok(())
    }
}

fn not_found() -> AppError {
    AppError::NotFound(String::new())
}
