use crate::genetics::types::{Genome, Individual};
use crate::tls::{expand_to_states, offset_start, ApproachIndexProvider, CompatibilityMap, PhaseGene, SignalState, TlsGene};
use crate::utils::prelude::*;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

// --- Document de plan (entrée du simulateur) ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgramStart {
    pub state_index: usize,
    pub remaining: f64,
}

/// Entrée d'un carrefour dans le document de plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TlsPlanEntry {
    pub offset: f64,
    pub phases: Vec<PhaseGene>,
    /// Programme déroulé, présent quand la carte des positions est connue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<Vec<SignalState>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<ProgramStart>,
}

/// Identifiant de carrefour -> plan. C'est le contrat d'échange avec le simulateur.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanDocument {
    pub tls: BTreeMap<String, TlsPlanEntry>,
}

impl PlanDocument {
    pub fn from_genome(genome: &Genome) -> Self {
        let tls = genome
            .iter()
            .map(|(id, gene)| {
                (
                    id.clone(),
                    TlsPlanEntry {
                        offset: gene.offset,
                        phases: gene.phases.clone(),
                        program: None,
                        start: None,
                    },
                )
            })
            .collect();
        Self { tls }
    }

    /// Ajoute le programme déroulé aux carrefours connus du fournisseur.
    pub fn attach_programs(
        &mut self,
        genome: &Genome,
        provider: &dyn ApproachIndexProvider,
        compat: &CompatibilityMap,
    ) -> Result<()> {
        for (id, entry) in self.tls.iter_mut() {
            let (Some(gene), Some(map)) = (genome.get(id), provider.approach_map(id)) else {
                continue;
            };
            let states = expand_to_states(gene, &map, compat.groups(id))?;
            let (state_index, remaining) = offset_start(gene, &states);
            entry.start = Some(ProgramStart {
                state_index,
                remaining,
            });
            entry.program = Some(states);
        }
        Ok(())
    }

    pub fn to_genome(&self) -> Genome {
        self.tls
            .iter()
            .map(|(id, entry)| {
                (
                    id.clone(),
                    TlsGene::new(id.clone(), entry.offset, entry.phases.clone()),
                )
            })
            .collect()
    }
}

// --- Sorties & Suivi ---

/// Statistiques d'une génération (calculées sur les individus évalués).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best: f64,
    pub mean: f64,
    pub worst: f64,
    /// Évaluations effectivement lancées (les élites ne sont pas réévaluées)
    pub evaluations: usize,
    pub failures: usize,
    pub global_best: f64,
}

/// Rapport final d'un run d'optimisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub seed: u64,
    pub best: Individual,
    pub best_plan: PlanDocument,
    pub history: Vec<GenerationStats>,
}
