//! Collaborateur de simulation : rejoue un plan et renvoie des métriques brutes.

pub mod fixed;
pub mod process;

use crate::genetics::dto::PlanDocument;
use crate::utils::prelude::*;
use std::path::{Path, PathBuf};

pub use fixed::FixedMetricsSimulator;
pub use process::ProcessSimulator;

/// Métriques brutes d'une simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsBundle {
    /// Temps d'attente cumulé des véhicules, par pas
    pub waiting_time_per_step: Vec<f64>,
    /// Véhicules arrêtés, par pas
    pub halted_per_step: Vec<f64>,
    /// Longueur de file par tronçon (échantillons)
    pub edge_queue_lengths: Vec<f64>,
    /// Temps de parcours des véhicules arrivés
    pub arrival_travel_times: Vec<f64>,
    pub arrived: u64,
}

/// Contexte d'une évaluation : scénario, budget de pas et dossier de sortie propre.
#[derive(Debug, Clone)]
pub struct SimulationSession {
    pub scenario: PathBuf,
    pub step_budget: u32,
    pub output_dir: PathBuf,
    pub generation: usize,
    pub index: usize,
}

impl SimulationSession {
    pub fn plan_path(&self) -> PathBuf {
        self.output_dir.join("plan.json")
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.output_dir.join("metrics.json")
    }

    pub fn scenario(&self) -> &Path {
        &self.scenario
    }
}

/// Capacité injectée : rejoue un plan de façon déterministe.
/// Appel coûteux et à effets de bord (écrit dans `output_dir`).
pub trait Simulator: Send + Sync {
    fn apply_and_run(&self, plan: &PlanDocument, session: &SimulationSession) -> Result<MetricsBundle>;
}

impl<S: Simulator + ?Sized> Simulator for std::sync::Arc<S> {
    fn apply_and_run(&self, plan: &PlanDocument, session: &SimulationSession) -> Result<MetricsBundle> {
        (**self).apply_and_run(plan, session)
    }
}

impl<S: Simulator + ?Sized> Simulator for Box<S> {
    fn apply_and_run(&self, plan: &PlanDocument, session: &SimulationSession) -> Result<MetricsBundle> {
        (**self).apply_and_run(plan, session)
    }
}
