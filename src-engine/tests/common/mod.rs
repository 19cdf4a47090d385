// FICHIER : src-engine/tests/common/mod.rs

use greenwave::genetics::PlanDocument;
use greenwave::simulation::{MetricsBundle, SimulationSession, Simulator};
use greenwave::utils::config::{OptimizerConfig, Scenario, ScenarioConfig};
use greenwave::utils::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

pub const SCENARIO_YAML: &str = r#"
tls_defaults:
  min_green: 5
  max_green: 60
  min_yellow: 2
  max_yellow: 5
  min_red: 0
  max_red: 10
  min_cycle: 20
  max_cycle: 120
tls:
  J1:
    offset_range: [0, 30]
    compatibility_groups: [[N, S], [E, W]]
    signal_positions: [N, S, E, W]
    phases:
      - active_approaches: [N, S]
      - active_approaches: [E, W]
  J2:
    compatibility_groups: [[A, B]]
    signal_positions: [A, B, C]
    phases:
      - active_approaches: [A, B]
      - active_approaches: [C]
"#;

pub fn scenario() -> Scenario {
    let config: ScenarioConfig =
        serde_yaml::from_str(SCENARIO_YAML).expect("scénario de test invalide");
    config.build(0.5).expect("scénario de test non dérivable")
}

pub fn small_config(seed: u64) -> OptimizerConfig {
    OptimizerConfig {
        population_size: 8,
        generations: 5,
        elitism: 2,
        seed,
        workers: 2,
        ..Default::default()
    }
}

/// Simulateur déterministe : le débit suit le vert de la première phase,
/// l'attente suit le temps perdu (jaune + rouge) sur le cycle.
#[derive(Default)]
pub struct StubSimulator {
    pub calls: AtomicUsize,
    /// Fait échouer les individus de cet index, quelle que soit la génération
    pub fail_index: Option<usize>,
}

impl StubSimulator {
    pub fn failing_at(index: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_index: Some(index),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Simulator for StubSimulator {
    fn apply_and_run(&self, plan: &PlanDocument, session: &SimulationSession) -> Result<MetricsBundle> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_index == Some(session.index) {
            return Err(AppError::Evaluation("panne simulée".into()));
        }

        let mut arrived = 0.0;
        let mut lost = 0.0;
        for entry in plan.tls.values() {
            if let Some(first) = entry.phases.first() {
                arrived += first.green;
            }
            lost += entry
                .phases
                .iter()
                .map(|p| p.yellow + p.red)
                .sum::<f64>();
        }

        Ok(MetricsBundle {
            waiting_time_per_step: vec![lost],
            halted_per_step: vec![lost / 2.0],
            edge_queue_lengths: vec![lost / 10.0],
            arrival_travel_times: vec![],
            arrived: arrived.round() as u64,
        })
    }
}
