use clap::Args;
use greenwave::genetics::repair::DEFAULT_GRANULARITY;
use greenwave::genetics::{FeasibilityRepair, Genome, PlanDocument};
use greenwave::tls::{
    expand_to_states, offset_start, validate_compatibility, validate_ranges, ApproachIndexProvider,
};
use greenwave::utils::config::{LoggingConfig, Scenario};
use greenwave::utils::io::{read_json, write_json_atomic};
use greenwave::utils::{context, prelude::*};
use greenwave::{user_info, user_success};
use std::path::{Path, PathBuf};

#[derive(Args, Clone, Debug)]
pub struct CheckArgs {
    #[arg(long)]
    pub scenario: PathBuf,
    #[arg(long)]
    pub plan: PathBuf,
}

#[derive(Args, Clone, Debug)]
pub struct RepairArgs {
    #[arg(long)]
    pub scenario: PathBuf,
    #[arg(long)]
    pub plan: PathBuf,
    /// Plan réparé (JSON)
    #[arg(long)]
    pub out: PathBuf,
    /// Pas de quantification des durées, en secondes
    #[arg(long, default_value_t = DEFAULT_GRANULARITY)]
    pub granularity: f64,
}

#[derive(Args, Clone, Debug)]
pub struct ExpandArgs {
    #[arg(long)]
    pub scenario: PathBuf,
    #[arg(long)]
    pub plan: PathBuf,
    /// Identifiant du carrefour à dérouler
    #[arg(long)]
    pub tls: String,
}

/// Charge un plan et vérifie que chaque carrefour est déclaré dans le scénario.
fn load_plan(path: &Path, scenario: &Scenario) -> Result<Genome> {
    let document: PlanDocument = read_json(path)?;
    if let Some(unknown) = document
        .tls
        .keys()
        .find(|id| !scenario.blueprint.tls.contains_key(*id))
    {
        return Err(AppError::Config(format!(
            "Carrefour '{}' absent du scénario",
            unknown
        )));
    }
    Ok(document.to_genome())
}

pub fn handle_check(args: CheckArgs) -> Result<()> {
    context::init_logging(&LoggingConfig::default());
    let scenario = super::load_scenario(&args.scenario, 0.0)?;
    let genome = load_plan(&args.plan, &scenario)?;

    for (id, gene) in &genome {
        validate_ranges(gene, scenario.bounds.for_tls(id))?;
        for phase in &gene.phases {
            validate_compatibility(id, &phase.active_approaches, scenario.compat.groups(id))?;
        }
    }

    user_success!("PLAN_VALID", "{} carrefour(s) conformes", genome.len());
    Ok(())
}

pub fn handle_repair(args: RepairArgs) -> Result<()> {
    context::init_logging(&LoggingConfig::default());
    let scenario = super::load_scenario(&args.scenario, args.granularity)?;
    let genome = load_plan(&args.plan, &scenario)?;

    let repair = FeasibilityRepair::new(args.granularity);
    let (repaired, violations) = repair.repaired(&genome, &scenario.bounds, &scenario.compat);

    write_json_atomic(&args.out, &PlanDocument::from_genome(&repaired))?;
    user_info!("PLAN_REPAIRED", "violations corrigées : {}", violations);
    user_success!("PLAN_WRITTEN", "{:?}", args.out);
    Ok(())
}

pub fn handle_expand(args: ExpandArgs) -> Result<()> {
    context::init_logging(&LoggingConfig::default());
    let scenario = super::load_scenario(&args.scenario, 0.0)?;
    let genome = load_plan(&args.plan, &scenario)?;

    let gene = genome
        .get(&args.tls)
        .ok_or_else(|| AppError::Config(format!("Carrefour '{}' absent du plan", args.tls)))?;
    let map = scenario.approaches.approach_map(&args.tls).ok_or_else(|| {
        AppError::Config(format!(
            "Carrefour '{}' : signal_positions non déclaré dans le scénario",
            args.tls
        ))
    })?;

    let states = expand_to_states(gene, &map, scenario.compat.groups(&args.tls))?;
    let (state_index, remaining) = offset_start(gene, &states);

    let output = json!({
        "tls": args.tls,
        "program": states,
        "start": { "state_index": state_index, "remaining": remaining },
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
