// FICHIER : src-engine/tests/genetics_suite/operators_test.rs

use crate::common::scenario;
use greenwave::genetics::operators::{
    intra_intersection_crossover, per_intersection_crossover, Mutation, RankSelection,
    RouletteSelection, SelectionStrategy, TournamentSelection,
};
use greenwave::genetics::{Fitness, Individual, Population};
use greenwave::utils::config::{MutationConfig, NoiseKind};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn evaluated_population(rng: &mut StdRng, size: usize) -> Population {
    let mut pop = scenario().blueprint.initial_population(size, rng);
    for (i, ind) in pop.individuals.iter_mut().enumerate() {
        ind.fitness = Some(Fitness::new((i * 7 % 5) as f64, 0));
    }
    pop
}

fn is_member(pop: &Population, ind: &Individual) -> bool {
    pop.individuals.iter().any(|p| std::ptr::eq(p, ind))
}

#[test]
fn test_operators_never_touch_parents() {
    let mut rng = StdRng::seed_from_u64(99);
    let pop = evaluated_population(&mut rng, 2);
    let (p1, p2) = (&pop.individuals[0], &pop.individuals[1]);
    let snapshot = (p1.clone(), p2.clone());

    let mutation = Mutation::from_config(&MutationConfig {
        rate: 1.0,
        reorder_prob: 1.0,
        noise: NoiseKind::Gaussian,
        ..Default::default()
    });

    for _ in 0..20 {
        let (a, b) = per_intersection_crossover(p1, p2, &mut rng);
        let (c, d) = intra_intersection_crossover(p1, p2, 0.5, &mut rng);
        let e = mutation.apply(p1, &mut rng);

        for child in [&a, &b, &c, &d, &e] {
            assert!(child.fitness.is_none());
            assert!(child.meta.is_empty());
            assert_eq!(child.genome.len(), p1.genome.len());
        }
    }

    assert_eq!(p1.genome, snapshot.0.genome);
    assert_eq!(p2.genome, snapshot.1.genome);
    assert_eq!(p1.fitness, snapshot.0.fitness);
}

#[test]
fn test_selection_returns_population_members() {
    let mut rng = StdRng::seed_from_u64(5);
    let pop = evaluated_population(&mut rng, 9);

    let strategies: Vec<Box<dyn SelectionStrategy>> = vec![
        Box::new(TournamentSelection::new(3)),
        Box::new(RouletteSelection),
        Box::new(RankSelection),
    ];
    for strategy in &strategies {
        for _ in 0..50 {
            let picked = strategy.select(&mut rng, &pop).unwrap();
            assert!(is_member(&pop, picked));
        }
    }
}

#[test]
fn test_tournament_over_whole_population_is_argmax() {
    let mut rng = StdRng::seed_from_u64(8);
    let pop = evaluated_population(&mut rng, 6);
    let best = pop.best().unwrap();

    let strategy = TournamentSelection::new(pop.len());
    for _ in 0..10 {
        let picked = strategy.select(&mut rng, &pop).unwrap();
        assert_eq!(picked.fitness, best.fitness);
    }
}
