// FICHIER : src-engine/src/genetics/evaluators/plan.rs

use crate::genetics::dto::PlanDocument;
use crate::genetics::evaluators::metrics::CostBreakdown;
use crate::genetics::repair::FeasibilityRepair;
use crate::genetics::traits::{EvaluationSlot, FitnessEvaluator};
use crate::genetics::types::{Fitness, Individual};
use crate::simulation::{SimulationSession, Simulator};
use crate::tls::{ApproachIndexProvider, BoundsMap, CompatibilityMap};
use crate::utils::config::FitnessConfig;
use crate::utils::fs::{ensure_dir, write_json_atomic};
use crate::utils::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

/// Évalue un individu en rejouant son plan réparé dans le simulateur.
///
/// Chaque évaluation reçoit son propre dossier `<results>/gen_<g>/ind_<i>/`.
pub struct PlanEvaluator<S: Simulator> {
    simulator: S,
    bounds: BoundsMap,
    compat: CompatibilityMap,
    repair: FeasibilityRepair,
    fitness: FitnessConfig,
    scenario: PathBuf,
    results_dir: PathBuf,
    approaches: Option<Arc<dyn ApproachIndexProvider>>,
}

impl<S: Simulator> PlanEvaluator<S> {
    pub fn new(
        simulator: S,
        bounds: BoundsMap,
        compat: CompatibilityMap,
        repair: FeasibilityRepair,
        fitness: FitnessConfig,
        scenario: impl Into<PathBuf>,
        results_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            simulator,
            bounds,
            compat,
            repair,
            fitness,
            scenario: scenario.into(),
            results_dir: results_dir.into(),
            approaches: None,
        }
    }

    /// Active le déroulé des programmes dans le document de plan.
    pub fn with_approaches(mut self, provider: Arc<dyn ApproachIndexProvider>) -> Self {
        self.approaches = Some(provider);
        self
    }

    pub fn output_dir(&self, slot: EvaluationSlot) -> PathBuf {
        self.results_dir
            .join(format!("gen_{}", slot.generation))
            .join(format!("ind_{}", slot.index))
    }

    fn simulate(&self, individual: &Individual, slot: EvaluationSlot) -> Result<CostBreakdown> {
        let mut plan = PlanDocument::from_genome(&individual.genome);
        if let Some(provider) = &self.approaches {
            plan.attach_programs(&individual.genome, provider.as_ref(), &self.compat)?;
        }

        let session = SimulationSession {
            scenario: self.scenario.clone(),
            step_budget: self.fitness.steps,
            output_dir: self.output_dir(slot),
            generation: slot.generation,
            index: slot.index,
        };
        ensure_dir(&session.output_dir)?;
        write_json_atomic(&session.plan_path(), &plan)?;

        let metrics = self.simulator.apply_and_run(&plan, &session)?;
        Ok(CostBreakdown::from_metrics(&metrics))
    }
}

impl<S: Simulator> FitnessEvaluator for PlanEvaluator<S> {
    fn evaluate(&self, individual: &mut Individual, slot: EvaluationSlot) -> Fitness {
        let violations = self
            .repair
            .repair_genome(&mut individual.genome, &self.bounds, &self.compat);
        individual.meta.insert("violations".into(), json!(violations));

        match self.simulate(individual, slot) {
            Ok(costs) => {
                let penalty = self.fitness.penalties.invalid_tls_w * violations as f64;
                let value = costs.score(&self.fitness.weights) - penalty;
                individual.meta.insert("costs".into(), json!(costs));
                Fitness::new(value, violations)
            }
            Err(e) => {
                let plan = serde_json::to_string(&individual.genome).unwrap_or_default();
                error!(
                    gen = slot.generation,
                    ind = slot.index,
                    error = %e,
                    plan = %plan,
                    "💥 Évaluation échouée, fitness sentinelle"
                );
                individual.meta.insert("failure".into(), json!(e.to_string()));
                Fitness::failed(violations)
            }
        }
    }
}
