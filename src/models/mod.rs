pub mod recommendation;

pub use recommendation::{NewRecommendation, Recommendation, ScoreFilter, VoteOutcome};
