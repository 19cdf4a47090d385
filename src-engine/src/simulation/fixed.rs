use super::{MetricsBundle, SimulationSession, Simulator};
use crate::genetics::dto::PlanDocument;
use crate::utils::prelude::*;

/// Simulateur à blanc : renvoie toujours les mêmes métriques.
/// Sert au mode `--dry-run` du CLI et aux tests du cœur génétique.
#[derive(Debug, Clone, Default)]
pub struct FixedMetricsSimulator {
    metrics: MetricsBundle,
}

impl FixedMetricsSimulator {
    pub fn new(metrics: MetricsBundle) -> Self {
        Self { metrics }
    }
}

impl Simulator for FixedMetricsSimulator {
    fn apply_and_run(&self, plan: &PlanDocument, session: &SimulationSession) -> Result<MetricsBundle> {
        debug!(
            gen = session.generation,
            ind = session.index,
            tls = plan.tls.len(),
            "Simulation à blanc"
        );
        Ok(self.metrics.clone())
    }
}
