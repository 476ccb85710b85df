use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::{AppError, AppResult};

/// Links must point at a YouTube page
static YOUTUBE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://(www\.)?youtube\.com/.+$").expect("link pattern is valid")
});

/// A song recommendation as stored and returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: i32,
    pub name: String,
    pub youtube_link: String,
    pub score: i32,
}

/// Body of a recommendation submission
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecommendation {
    pub name: String,
    #[serde(alias = "link")]
    pub youtube_link: String,
}

impl NewRecommendation {
    pub fn new(name: impl Into<String>, youtube_link: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            youtube_link: youtube_link.into(),
        }
    }

    /// Shape check applied at the boundary before the service sees the input
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Unprocessable("name must not be empty".to_string()));
        }

        if !YOUTUBE_LINK.is_match(&self.youtube_link) {
            return Err(AppError::Unprocessable(
                "youtubeLink must be a https://youtube.com link".to_string(),
            ));
        }

        Ok(())
    }
}

/// Score range filter used by the random selection queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreFilter {
    /// `score > bound`
    Above(i32),
    /// `score <= bound`
    AtMost(i32),
}

impl ScoreFilter {
    pub fn matches(&self, score: i32) -> bool {
        match *self {
            ScoreFilter::Above(bound) => score > bound,
            ScoreFilter::AtMost(bound) => score <= bound,
        }
    }
}

/// Result of a downvote applied by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteOutcome {
    /// The record with its post-vote score, as written before any removal
    pub recommendation: Recommendation,
    /// Whether the vote pushed the score past the removal threshold
    pub removed: bool,
}
