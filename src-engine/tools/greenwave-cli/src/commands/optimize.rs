use clap::Args;
use greenwave::genetics::{FeasibilityRepair, GeneticEngine, PlanEvaluator};
use greenwave::simulation::{FixedMetricsSimulator, ProcessSimulator, Simulator};
use greenwave::utils::config::OptimizerConfig;
use greenwave::utils::io::{ensure_dir, write_json_atomic};
use greenwave::utils::{context, prelude::*};
use greenwave::{user_info, user_success};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Clone, Debug)]
pub struct OptimizeArgs {
    /// Fichier de scénario (YAML ou JSON)
    #[arg(long)]
    pub scenario: PathBuf,

    /// Configuration de l'algorithme génétique (valeurs par défaut si absent)
    #[arg(long)]
    pub ga: Option<PathBuf>,

    /// Dossier des artefacts (plans par individu, rapport final)
    #[arg(long, default_value = "results")]
    pub results_dir: PathBuf,

    /// Programme de simulation externe
    #[arg(long, env = "GREENWAVE_SIMULATOR")]
    pub simulator_cmd: Option<String>,

    /// Argument supplémentaire passé au simulateur (répétable)
    #[arg(long = "simulator-arg", allow_hyphen_values = true)]
    pub simulator_args: Vec<String>,

    /// Simulation à blanc (métriques constantes)
    #[arg(long)]
    pub dry_run: bool,
}

pub fn handle(args: OptimizeArgs) -> Result<()> {
    let config = match &args.ga {
        Some(path) => OptimizerConfig::load(path)?,
        None => {
            let mut config = OptimizerConfig::default();
            config.apply_env_overrides()?;
            config.validate()?;
            config
        }
    };
    context::init_logging(&config.logging);

    let scenario = super::load_scenario(&args.scenario, config.repair.granularity_s)?;
    ensure_dir(&args.results_dir)?;

    let simulator: Box<dyn Simulator> = match (&args.simulator_cmd, args.dry_run) {
        (_, true) => {
            user_info!("DRY_RUN", "Mode simulation à blanc");
            Box::new(FixedMetricsSimulator::default())
        }
        (Some(cmd), false) => Box::new(
            ProcessSimulator::new(cmd.clone())
                .with_args(args.simulator_args.clone())
                .with_timeout_secs(config.simulator.timeout_s),
        ),
        (None, false) => {
            return Err(AppError::Config(
                "Aucun simulateur : préciser --simulator-cmd ou --dry-run".into(),
            ))
        }
    };

    let mut evaluator = PlanEvaluator::new(
        simulator,
        scenario.bounds.clone(),
        scenario.compat.clone(),
        FeasibilityRepair::new(config.repair.granularity_s),
        config.fitness.clone(),
        args.scenario.clone(),
        args.results_dir.clone(),
    );
    if !scenario.approaches.is_empty() {
        evaluator = evaluator.with_approaches(Arc::new(scenario.approaches.clone()));
    }

    let engine = GeneticEngine::new(evaluator, &config)?;
    let report = engine.optimize(&scenario.blueprint, |_, stats| {
        user_info!(
            "GEN_DONE",
            "Génération {} | meilleur {:.2} | moyenne {:.2} | global {:.2} | échecs {}",
            stats.generation,
            stats.best,
            stats.mean,
            stats.global_best,
            stats.failures
        );
    })?;

    let best_plan_path = args.results_dir.join("best_plan.json");
    write_json_atomic(&best_plan_path, &report.best_plan)?;
    write_json_atomic(&args.results_dir.join("run_report.json"), &report)?;

    user_success!(
        "OPTIMIZE_DONE",
        "Meilleure fitness {:.2} -> {:?}",
        report.best.fitness_value().unwrap_or(f64::NEG_INFINITY),
        best_plan_path
    );
    Ok(())
}
