use crate::genetics::types::Individual;
use crate::tls::DurationKind;
use crate::utils::config::{MutationConfig, NoiseKind};
use rand::prelude::*;
use rand_distr::{Distribution, Normal};

/// Bruit centré d'amplitude `jitter`.
pub fn noise(kind: NoiseKind, jitter: f64, rng: &mut dyn RngCore) -> f64 {
    if jitter <= 0.0 {
        return 0.0;
    }
    match kind {
        NoiseKind::Uniform => rng.random_range(-jitter..=jitter),
        NoiseKind::Gaussian => Normal::new(0.0, jitter)
            .map(|n| n.sample(&mut *rng))
            .unwrap_or(0.0),
    }
}

/// Mutation exploratoire : aucun bornage ici, la réparation s'en charge ensuite.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub rate: f64,
    pub time_jitter: f64,
    pub offset_jitter: f64,
    pub reorder_prob: f64,
    pub noise: NoiseKind,
}

impl Mutation {
    pub fn from_config(config: &MutationConfig) -> Self {
        Self {
            rate: config.rate,
            time_jitter: config.time_jitter_s,
            offset_jitter: config.offset_jitter_s,
            reorder_prob: config.reorder_prob,
            noise: config.noise,
        }
    }

    /// Retourne un nouvel individu muté ; le parent n'est jamais modifié.
    pub fn apply(&self, parent: &Individual, rng: &mut dyn RngCore) -> Individual {
        let mut child = parent.offspring();

        for gene in child.genome.values_mut() {
            if rng.random::<f64>() < self.rate {
                gene.offset += noise(self.noise, self.offset_jitter, rng);
            }
            for phase in gene.phases.iter_mut() {
                for kind in DurationKind::ALL {
                    if rng.random::<f64>() < self.rate {
                        *phase.get_mut(kind) += noise(self.noise, self.time_jitter, rng);
                    }
                }
            }
            if gene.phases.len() > 1 && rng.random::<f64>() < self.reorder_prob {
                gene.phases.shuffle(&mut *rng);
            }
        }

        child
    }
}
