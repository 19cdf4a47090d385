// FICHIER : src-engine/tests/genetics_suite/repair_conformance_test.rs

use crate::common::scenario;
use greenwave::genetics::repair::FeasibilityRepair;
use greenwave::genetics::Genome;
use greenwave::tls::{
    cycle_time, expand_to_states, validate_compatibility, validate_ranges, ApproachIndexMap,
    Bounds, BoundsMap, CompatibilityGroup, CompatibilityMap, PhaseGene, TlsGene,
};
use greenwave::utils::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn ns_ew() -> Vec<CompatibilityGroup> {
    vec![
        vec!["N".to_string(), "S".to_string()],
        vec!["E".to_string(), "W".to_string()],
    ]
}

fn four_way(first: &[&str]) -> TlsGene {
    TlsGene::new(
        "J1",
        5.0,
        vec![
            PhaseGene::new(first.iter().copied(), 12.0, 3.0, 1.0),
            PhaseGene::new(["E", "W"], 12.0, 3.0, 1.0),
        ],
    )
}

#[test]
fn test_four_way_intersection_end_to_end() {
    let mut gene = four_way(&["N", "S"]);
    let map = ApproachIndexMap::from_positions(["N", "S", "E", "W"]);

    let states = expand_to_states(&gene, &map, &ns_ew()).unwrap();
    assert_eq!(states.len(), 6);
    assert_eq!(states[0].state.chars().filter(|c| *c == 'G').count(), 2);
    assert_eq!(cycle_time(&gene), 32.0);

    let violations = FeasibilityRepair::new(0.5).repair_tls(&mut gene, &Bounds::default(), &ns_ew());
    assert_eq!(violations, 0);
    assert_eq!(gene.offset, 5.0);
}

#[test]
fn test_incompatible_pair_detected_and_resolved() {
    let mut gene = four_way(&["N", "E"]);

    let direct = validate_compatibility("J1", &gene.phases[0].active_approaches, &ns_ew());
    assert!(matches!(direct, Err(AppError::IncompatibleMovement { .. })));

    let violations = FeasibilityRepair::new(0.5).repair_tls(&mut gene, &Bounds::default(), &ns_ew());
    assert!(violations >= 1);
    assert_eq!(gene.phases[0].active_approaches, vec!["N"]);
}

#[test]
fn test_direct_validation_reports_out_of_range() {
    let mut gene = four_way(&["N", "S"]);
    gene.phases[0].green = 61.0;

    let res = validate_ranges(&gene, &Bounds::default());
    assert!(matches!(res, Err(AppError::OutOfRange { .. })));
}

/// Génome arbitraire, volontairement hors bornes et incompatible.
fn wild_genome(rng: &mut StdRng) -> Genome {
    let pool = ["N", "S", "E", "W", "A", "B", "C"];
    let mut genome = Genome::new();
    for id in ["J1", "J2"] {
        let phase_count = rng.random_range(1..=4);
        let phases = (0..phase_count)
            .map(|_| {
                let n = rng.random_range(1..=3);
                let active: Vec<&str> = (0..n).map(|_| pool[rng.random_range(0..pool.len())]).collect();
                PhaseGene::new(
                    active,
                    rng.random_range(-20.0..120.0),
                    rng.random_range(-5.0..15.0),
                    rng.random_range(-5.0..30.0),
                )
            })
            .collect();
        genome.insert(
            id.to_string(),
            TlsGene::new(id, rng.random_range(-500.0..500.0), phases),
        );
    }
    genome
}

fn assert_admissible(genome: &Genome, bounds: &BoundsMap, compat: &CompatibilityMap) {
    for (id, gene) in genome {
        let b = bounds.for_tls(id);
        for phase in &gene.phases {
            assert!(phase.green >= b.min_green && phase.green <= b.max_green);
            assert!(phase.yellow >= b.min_yellow && phase.yellow <= b.max_yellow);
            assert!(phase.red >= b.min_red && phase.red <= b.max_red);
            assert!(validate_compatibility(id, &phase.active_approaches, compat.groups(id)).is_ok());
        }
        let cycle = gene.cycle_time();
        assert!(gene.offset >= 0.0 && gene.offset < cycle);
    }
}

#[test]
fn test_repair_properties_on_random_genomes() {
    let scenario = scenario();
    let repair = FeasibilityRepair::new(0.5);
    let mut rng = StdRng::seed_from_u64(2024);
    let mut admissible = 0;

    for _ in 0..200 {
        let genome = wild_genome(&mut rng);
        let (once, _) = repair.repaired(&genome, &scenario.bounds, &scenario.compat);
        assert_admissible(&once, &scenario.bounds, &scenario.compat);

        // Le génome réparé est un point fixe
        let (twice, extra) = repair.repaired(&once, &scenario.bounds, &scenario.compat);
        assert_eq!(twice, once);

        // Sans reliquat de cycle, aucune correction supplémentaire
        let cycle_ok = once
            .iter()
            .all(|(id, g)| validate_ranges(g, scenario.bounds.for_tls(id)).is_ok());
        if cycle_ok {
            assert_eq!(extra, 0);
            admissible += 1;
        }
    }
    assert!(admissible > 0);
}

#[test]
fn test_cycle_within_bounds_when_absorbable() {
    // max_cycle = 120 : 62 + 63 = 125, l'excès de 5 s tient dans le dernier rouge
    let scenario = scenario();
    let mut genome = Genome::new();
    genome.insert(
        "J1".into(),
        TlsGene::new(
            "J1",
            0.0,
            vec![
                PhaseGene::new(["N"], 55.0, 5.0, 2.0),
                PhaseGene::new(["E"], 50.0, 5.0, 8.0),
            ],
        ),
    );

    let (repaired, violations) =
        FeasibilityRepair::new(0.5).repaired(&genome, &scenario.bounds, &scenario.compat);
    assert_eq!(violations, 1);
    let gene = &repaired["J1"];
    assert_eq!(gene.phases[1].red, 3.0);
    assert!(validate_ranges(gene, scenario.bounds.for_tls("J1")).is_ok());
}
