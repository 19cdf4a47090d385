use crate::genetics::types::{Genome, Individual, Population};
use crate::tls::{PhaseGene, TlsGene};
use crate::utils::prelude::*;
use rand::{Rng, RngCore};
use std::collections::BTreeMap;

/// Plages d'initialisation d'une phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseBlueprint {
    pub active_approaches: Vec<String>,
    pub green: (f64, f64),
    pub yellow: (f64, f64),
    pub red: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TlsBlueprint {
    pub offset_range: (f64, f64),
    pub phases: Vec<PhaseBlueprint>,
}

/// Gabarit de la population initiale : structure des phases et plages de tirage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub tls: BTreeMap<String, TlsBlueprint>,
}

fn sample(rng: &mut dyn RngCore, (lo, hi): (f64, f64)) -> f64 {
    if hi - lo <= f64::EPSILON {
        lo
    } else {
        rng.random_range(lo..=hi)
    }
}

fn check_range(tls_id: &str, name: &str, (lo, hi): (f64, f64)) -> Result<()> {
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return Err(AppError::Config(format!(
            "[{}] plage d'initialisation {} invalide : [{}, {}]",
            tls_id, name, lo, hi
        )));
    }
    Ok(())
}

impl Blueprint {
    pub fn validate(&self) -> Result<()> {
        if self.tls.is_empty() {
            return Err(AppError::Config("Blueprint vide".into()));
        }
        for (tls_id, tls) in &self.tls {
            if tls.phases.is_empty() {
                return Err(AppError::Config(format!("[{}] aucune phase déclarée", tls_id)));
            }
            check_range(tls_id, "offset", tls.offset_range)?;
            for phase in &tls.phases {
                check_range(tls_id, "g", phase.green)?;
                check_range(tls_id, "y", phase.yellow)?;
                check_range(tls_id, "r", phase.red)?;
            }
        }
        Ok(())
    }

    /// Tire un génome uniformément dans les plages, sans réparation.
    pub fn random_genome(&self, rng: &mut dyn RngCore) -> Genome {
        self.tls
            .iter()
            .map(|(tls_id, tls)| {
                let offset = sample(rng, tls.offset_range);
                let phases = tls
                    .phases
                    .iter()
                    .map(|p| PhaseGene {
                        active_approaches: p.active_approaches.clone(),
                        green: sample(rng, p.green),
                        yellow: sample(rng, p.yellow),
                        red: sample(rng, p.red),
                    })
                    .collect();
                (tls_id.clone(), TlsGene::new(tls_id.clone(), offset, phases))
            })
            .collect()
    }

    pub fn initial_population(&self, size: usize, rng: &mut dyn RngCore) -> Population {
        let individuals = (0..size)
            .map(|_| Individual::new(self.random_genome(rng)))
            .collect();
        Population::from_individuals(individuals, 0)
    }
}
