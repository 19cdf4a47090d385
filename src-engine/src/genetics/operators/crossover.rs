use crate::genetics::types::Individual;
use crate::utils::config::{CrossoverConfig, CrossoverKind};
use rand::prelude::*;

/// Échange chaque carrefour entier entre les deux parents avec une probabilité 0.5.
pub fn per_intersection_crossover(
    parent1: &Individual,
    parent2: &Individual,
    rng: &mut dyn RngCore,
) -> (Individual, Individual) {
    let mut child1 = parent1.offspring();
    let mut child2 = parent2.offspring();

    for (tls_id, gene1) in child1.genome.iter_mut() {
        if let Some(gene2) = child2.genome.get_mut(tls_id) {
            if rng.random::<f64>() < 0.5 {
                std::mem::swap(gene1, gene2);
            }
        }
    }

    (child1, child2)
}

/// Dans chaque carrefour commun, échange les phases de même rang avec la
/// probabilité `swap_frac`, et le décalage avec la probabilité 0.5.
pub fn intra_intersection_crossover(
    parent1: &Individual,
    parent2: &Individual,
    swap_frac: f64,
    rng: &mut dyn RngCore,
) -> (Individual, Individual) {
    let mut child1 = parent1.offspring();
    let mut child2 = parent2.offspring();

    for (tls_id, gene1) in child1.genome.iter_mut() {
        let Some(gene2) = child2.genome.get_mut(tls_id) else {
            continue;
        };

        let shared = gene1.phases.len().min(gene2.phases.len());
        for (p1, p2) in gene1.phases[..shared]
            .iter_mut()
            .zip(gene2.phases[..shared].iter_mut())
        {
            if rng.random::<f64>() < swap_frac {
                std::mem::swap(p1, p2);
            }
        }

        if rng.random::<f64>() < 0.5 {
            std::mem::swap(&mut gene1.offset, &mut gene2.offset);
        }
    }

    (child1, child2)
}

/// Variantes de croisement, construites depuis la configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Crossover {
    PerIntersection,
    IntraIntersection { swap_frac: f64 },
}

impl Crossover {
    pub fn from_config(config: &CrossoverConfig) -> Self {
        match config.kind {
            CrossoverKind::PerIntersection => Crossover::PerIntersection,
            CrossoverKind::IntraIntersection => Crossover::IntraIntersection {
                swap_frac: config.intra_swap_frac,
            },
        }
    }

    pub fn apply(
        &self,
        parent1: &Individual,
        parent2: &Individual,
        rng: &mut dyn RngCore,
    ) -> (Individual, Individual) {
        match *self {
            Crossover::PerIntersection => per_intersection_crossover(parent1, parent2, rng),
            Crossover::IntraIntersection { swap_frac } => {
                intra_intersection_crossover(parent1, parent2, swap_frac, rng)
            }
        }
    }
}
