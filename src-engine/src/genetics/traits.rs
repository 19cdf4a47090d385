// src-engine/src/genetics/traits.rs

use super::types::{Fitness, Individual};

/// Emplacement d'une évaluation dans le run : sert à isoler ses artefacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationSlot {
    pub generation: usize,
    pub index: usize,
}

/// Le lien entre l'AG et le métier.
///
/// L'évaluateur peut réécrire le génome (réparation) et renseigner `meta`.
/// Il ne doit jamais interrompre la génération : un échec se traduit par
/// `Fitness::failed`.
pub trait FitnessEvaluator: Send + Sync {
    fn evaluate(&self, individual: &mut Individual, slot: EvaluationSlot) -> Fitness;
}
