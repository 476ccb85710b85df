pub mod recommendations;
pub mod selection;

pub use recommendations::RecommendationService;
