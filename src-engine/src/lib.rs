pub mod genetics;
pub mod simulation;
pub mod tls;
pub mod utils;

pub use genetics::{GeneticEngine, PlanDocument, PlanEvaluator, RunReport};
pub use utils::{AppError, Result};
