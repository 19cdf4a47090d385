// FICHIER : src-engine/tests/genetics_suite/full_flow_test.rs

use crate::common::{init_test_logging, scenario, small_config, StubSimulator};
use greenwave::genetics::{
    FeasibilityRepair, GeneticEngine, PlanDocument, PlanEvaluator, RunReport,
};
use greenwave::tls::{validate_compatibility, validate_ranges};
use greenwave::utils::prelude::*;
use std::path::Path;
use std::sync::Arc;

fn run(seed: u64, simulator: Arc<StubSimulator>, results: &Path) -> RunReport {
    let scenario = scenario();
    let config = small_config(seed);

    let evaluator = PlanEvaluator::new(
        simulator,
        scenario.bounds.clone(),
        scenario.compat.clone(),
        FeasibilityRepair::new(config.repair.granularity_s),
        config.fitness.clone(),
        "scenario.yaml",
        results,
    )
    .with_approaches(Arc::new(scenario.approaches.clone()));

    let engine = GeneticEngine::new(evaluator, &config).unwrap();
    engine.optimize(&scenario.blueprint, |_, _| {}).unwrap()
}

#[test]
fn test_full_optimization_flow() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let simulator = Arc::new(StubSimulator::default());

    let report = run(42, simulator.clone(), dir.path());

    // 8 évaluations initiales, puis 6 enfants par génération (2 élites conservées)
    assert_eq!(report.history.len(), 5);
    assert_eq!(report.history[0].evaluations, 8);
    assert!(report.history[1..].iter().all(|s| s.evaluations == 6));
    assert_eq!(simulator.calls(), 8 + 6 * 4);

    // Le meilleur global ne régresse jamais
    for pair in report.history.windows(2) {
        assert!(pair[1].global_best >= pair[0].global_best);
    }
    let last = report.history.last().unwrap();
    assert_eq!(report.best.fitness_value(), Some(last.global_best));

    // Le meilleur plan est réparé, donc conforme
    let scenario = scenario();
    for (id, gene) in &report.best.genome {
        assert!(validate_ranges(gene, scenario.bounds.for_tls(id)).is_ok());
        for phase in &gene.phases {
            assert!(validate_compatibility(id, &phase.active_approaches, scenario.compat.groups(id)).is_ok());
        }
    }
    assert_eq!(report.best_plan, PlanDocument::from_genome(&report.best.genome));

    // Un dossier d'artefacts par évaluation
    for i in 0..8 {
        assert!(dir.path().join(format!("gen_0/ind_{}/plan.json", i)).exists());
    }
    assert!(dir.path().join("gen_4/ind_7/plan.json").exists());
    assert!(!dir.path().join("gen_4/ind_0").exists(), "les élites ne sont pas réévaluées");
}

#[test]
fn test_same_seed_same_run() {
    init_test_logging();
    let a_dir = tempfile::tempdir().unwrap();
    let b_dir = tempfile::tempdir().unwrap();

    let a = run(7, Arc::new(StubSimulator::default()), a_dir.path());
    let b = run(7, Arc::new(StubSimulator::default()), b_dir.path());

    assert_eq!(a.best.genome, b.best.genome);
    assert_eq!(a.history, b.history);
    assert_ne!(a.run_id, b.run_id);
}

#[test]
fn test_simulator_failure_is_isolated() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();

    let report = run(3, Arc::new(StubSimulator::failing_at(3)), dir.path());

    assert_eq!(report.history.len(), 5);
    assert!(report.history.iter().all(|s| s.failures == 1));
    let best = report.best.fitness.unwrap();
    assert!(!best.failed);
}

#[test]
fn test_report_is_serializable() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let report = run(11, Arc::new(StubSimulator::default()), dir.path());

    let text = serde_json::to_string(&report).unwrap();
    let back: RunReport = serde_json::from_str(&text).unwrap();
    assert_eq!(back.seed, 11);
    assert_eq!(back.history.len(), report.history.len());
    assert_eq!(back.best.genome.len(), 2);

    let value: Value = serde_json::from_str(&text).unwrap();
    assert!(value["best_plan"]["J1"]["phases"].is_array());
}
