// FICHIER : src-engine/src/simulation/process.rs

use super::{MetricsBundle, SimulationSession, Simulator};
use crate::genetics::dto::PlanDocument;
use crate::utils::fs::{read_json, write_json_atomic};
use crate::utils::os::exec_command;
use crate::utils::prelude::*;
use std::time::Duration;

/// Lance un simulateur externe par évaluation.
///
/// Protocole : `<program> [extra_args] --cfg <scénario> --plan-json <dir>/plan.json
/// --steps <n> --out-dir <dir>`, puis lecture de `<dir>/metrics.json`.
#[derive(Debug, Clone)]
pub struct ProcessSimulator {
    program: String,
    extra_args: Vec<String>,
    timeout: Option<Duration>,
}

impl ProcessSimulator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
            timeout: None,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// 0 = pas de délai
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    fn arguments(&self, session: &SimulationSession) -> Vec<String> {
        let mut args = self.extra_args.clone();
        args.extend([
            "--cfg".to_string(),
            session.scenario.display().to_string(),
            "--plan-json".to_string(),
            session.plan_path().display().to_string(),
            "--steps".to_string(),
            session.step_budget.to_string(),
            "--out-dir".to_string(),
            session.output_dir.display().to_string(),
        ]);
        args
    }
}

impl Simulator for ProcessSimulator {
    #[instrument(skip(self, plan, session), fields(gen = session.generation, ind = session.index))]
    fn apply_and_run(&self, plan: &PlanDocument, session: &SimulationSession) -> Result<MetricsBundle> {
        let plan_path = session.plan_path();
        if !plan_path.exists() {
            write_json_atomic(&plan_path, plan)?;
        }

        let output = exec_command(&self.program, &self.arguments(session), None, self.timeout)?;
        debug!("Simulation terminée en {:?}", output.elapsed);

        read_json::<MetricsBundle>(&session.metrics_path()).map_err(|e| {
            AppError::Evaluation(format!(
                "Métriques illisibles dans {:?} : {}",
                session.output_dir, e
            ))
        })
    }
}
