pub mod blueprint;
pub mod dto;
pub mod engine;
pub mod evaluators;
pub mod operators;
pub mod repair;
pub mod traits;
pub mod types;

pub use blueprint::Blueprint;
pub use dto::{GenerationStats, PlanDocument, RunReport};
pub use engine::GeneticEngine;
pub use evaluators::PlanEvaluator;
pub use repair::FeasibilityRepair;
pub use traits::{EvaluationSlot, FitnessEvaluator};
pub use types::{Fitness, Genome, Individual, Population};
