use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{NewRecommendation, Recommendation, ScoreFilter, VoteOutcome},
};

use super::repository::RecommendationRepository;

/// Process-local recommendation store
///
/// Mirrors the `recommendations` table: ids are handed out from a counter that
/// is never reset, and names are unique. Each operation runs under one lock
/// acquisition, which makes every method atomic with respect to the others.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    inner: Arc<RwLock<MemoryRepositoryInner>>,
}

#[derive(Default)]
struct MemoryRepositoryInner {
    last_id: i32,
    // Keyed by id, so iteration follows insertion order
    records: BTreeMap<i32, Recommendation>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RecommendationRepository for MemoryRepository {
    async fn create(&self, data: &NewRecommendation) -> AppResult<Recommendation> {
        let mut inner = self.inner.write().await;

        if inner.records.values().any(|r| r.name == data.name) {
            return Err(AppError::Conflict(
                "Recommendations names must be unique".to_string(),
            ));
        }

        inner.last_id += 1;
        let recommendation = Recommendation {
            id: inner.last_id,
            name: data.name.clone(),
            youtube_link: data.youtube_link.clone(),
            score: 0,
        };
        inner.records.insert(recommendation.id, recommendation.clone());

        Ok(recommendation)
    }

    async fn find(&self, id: i32) -> AppResult<Option<Recommendation>> {
        let inner = self.inner.read().await;
        Ok(inner.records.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Recommendation>> {
        let inner = self.inner.read().await;
        Ok(inner.records.values().find(|r| r.name == name).cloned())
    }

    async fn update_score(&self, id: i32, delta: i32) -> AppResult<Option<Recommendation>> {
        let mut inner = self.inner.write().await;
        Ok(inner.records.get_mut(&id).map(|r| {
            r.score += delta;
            r.clone()
        }))
    }

    async fn decrement_and_prune(
        &self,
        id: i32,
        threshold: i32,
    ) -> AppResult<Option<VoteOutcome>> {
        let mut inner = self.inner.write().await;

        let Some(record) = inner.records.get_mut(&id) else {
            return Ok(None);
        };
        record.score -= 1;
        let recommendation = record.clone();

        let removed = recommendation.score < threshold;
        if removed {
            inner.records.remove(&id);
        }

        Ok(Some(VoteOutcome {
            recommendation,
            removed,
        }))
    }

    async fn remove(&self, id: i32) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.records.remove(&id).is_some())
    }

    async fn find_all(&self, filter: Option<ScoreFilter>) -> AppResult<Vec<Recommendation>> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .values()
            .filter(|r| filter.map_or(true, |f| f.matches(r.score)))
            .cloned()
            .collect())
    }

    async fn latest(&self, limit: i64) -> AppResult<Vec<Recommendation>> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .values()
            .rev()
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn top_by_score(&self, amount: i64) -> AppResult<Vec<Recommendation>> {
        let inner = self.inner.read().await;
        let mut recommendations: Vec<Recommendation> = inner.records.values().cloned().collect();
        recommendations.sort_by(|a, b| b.score.cmp(&a.score));
        recommendations.truncate(usize::try_from(amount).unwrap_or(0));
        Ok(recommendations)
    }

    async fn count(&self) -> AppResult<i64> {
        let inner = self.inner.read().await;
        Ok(inner.records.len() as i64)
    }

    async fn truncate(&self) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.records.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(name: &str) -> NewRecommendation {
        NewRecommendation::new(name, "https://www.youtube.com/watch?v=bd5DCefoRbY")
    }

    async fn seeded(scores: &[i32]) -> MemoryRepository {
        let repository = MemoryRepository::new();
        for (i, score) in scores.iter().enumerate() {
            let created = repository.create(&song(&format!("song {i}"))).await.unwrap();
            repository.update_score(created.id, *score).await.unwrap();
        }
        repository
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let repository = MemoryRepository::new();

        let first = repository.create(&song("first")).await.unwrap();
        let second = repository.create(&song("second")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(second.score, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let repository = MemoryRepository::new();
        repository.create(&song("same")).await.unwrap();

        let result = repository.create(&song("same")).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(repository.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_truncate() {
        let repository = MemoryRepository::new();
        repository.create(&song("before")).await.unwrap();
        repository.truncate().await.unwrap();

        let after = repository.create(&song("after")).await.unwrap();

        assert_eq!(after.id, 2);
        assert_eq!(repository.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove_reports_whether_deleted() {
        let repository = seeded(&[0]).await;

        assert!(repository.remove(1).await.unwrap());
        assert!(!repository.remove(1).await.unwrap());
        assert!(repository.find_by_name("song 0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_score_unknown_id() {
        let repository = MemoryRepository::new();
        assert!(repository.update_score(42, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_decrement_and_prune_keeps_record_at_threshold() {
        let repository = seeded(&[-4]).await;

        let outcome = repository.decrement_and_prune(1, -5).await.unwrap().unwrap();

        assert_eq!(outcome.recommendation.score, -5);
        assert!(!outcome.removed);
        assert!(repository.find(1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_decrement_and_prune_removes_below_threshold() {
        let repository = seeded(&[-5]).await;

        let outcome = repository.decrement_and_prune(1, -5).await.unwrap().unwrap();

        assert_eq!(outcome.recommendation.score, -6);
        assert!(outcome.removed);
        assert!(repository.find(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_decrement_and_prune_unknown_id() {
        let repository = MemoryRepository::new();
        assert!(repository.decrement_and_prune(3, -5).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_downvotes_remove_exactly_once() {
        let repository = seeded(&[-4]).await;

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let repository = repository.clone();
                tokio::spawn(async move { repository.decrement_and_prune(1, -5).await })
            })
            .collect();

        let mut removed = 0;
        let mut missing = 0;
        for handle in handles {
            match handle.await.unwrap().unwrap() {
                Some(outcome) if outcome.removed => removed += 1,
                Some(_) => {}
                None => missing += 1,
            }
        }

        assert_eq!(removed, 1);
        assert_eq!(missing, 0);
        assert_eq!(repository.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_latest_is_newest_first() {
        let repository = seeded(&[0; 12]).await;

        let latest = repository.latest(10).await.unwrap();

        assert_eq!(latest.len(), 10);
        assert_eq!(latest[0].id, 12);
        assert_eq!(latest[9].id, 3);
    }

    #[tokio::test]
    async fn test_top_by_score_orders_descending() {
        let repository = seeded(&[3, 25, -2, 11, 7]).await;

        let top = repository.top_by_score(3).await.unwrap();

        let scores: Vec<i32> = top.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![25, 11, 7]);
    }

    #[tokio::test]
    async fn test_find_all_filters_by_score() {
        let repository = seeded(&[10, 11, -3, 40]).await;

        let above = repository
            .find_all(Some(ScoreFilter::Above(10)))
            .await
            .unwrap();
        let at_most = repository
            .find_all(Some(ScoreFilter::AtMost(10)))
            .await
            .unwrap();

        assert_eq!(above.iter().map(|r| r.score).collect::<Vec<_>>(), vec![11, 40]);
        assert_eq!(at_most.iter().map(|r| r.score).collect::<Vec<_>>(), vec![10, -3]);
        assert_eq!(repository.find_all(None).await.unwrap().len(), 4);
    }
}
