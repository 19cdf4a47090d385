pub mod metrics;
pub mod plan;

pub use metrics::CostBreakdown;
pub use plan::PlanEvaluator;
