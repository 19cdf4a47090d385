use crate::tls::TlsGene;
use crate::utils::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Génome : un gène par carrefour, ordonné par identifiant.
pub type Genome = BTreeMap<String, TlsGene>;

/// Valeur sentinelle attribuée à une évaluation échouée.
pub const FAILED_FITNESS: f64 = -1.0e12;

/// Performance d'un individu.
/// Convention : on MAXIMISE `value` (le coût est déjà soustrait par l'évaluateur).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fitness {
    pub value: f64,
    /// Nombre de corrections appliquées par la réparation.
    pub violations: u32,
    /// Vrai si le simulateur n'a rien produit d'exploitable.
    #[serde(default)]
    pub failed: bool,
}

impl Fitness {
    pub fn new(value: f64, violations: u32) -> Self {
        Self {
            value,
            violations,
            failed: false,
        }
    }

    pub fn failed(violations: u32) -> Self {
        Self {
            value: FAILED_FITNESS,
            violations,
            failed: true,
        }
    }

    /// Ordre total : un échec est toujours en dessous d'une évaluation réussie.
    pub fn quality_cmp(&self, other: &Fitness) -> Ordering {
        match (self.failed, other.failed) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => self.value.total_cmp(&other.value),
        }
    }

    pub fn is_better_than(&self, other: &Fitness) -> bool {
        self.quality_cmp(other) == Ordering::Greater
    }
}

/// Compare deux fitness optionnelles ; l'absence de fitness est la pire valeur.
pub fn compare_fitness(a: Option<&Fitness>, b: Option<&Fitness>) -> Ordering {
    match (a, b) {
        (Some(fa), Some(fb)) => fa.quality_cmp(fb),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Un individu : un génome, sa performance et des métadonnées d'évaluation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Individual {
    pub genome: Genome,
    pub fitness: Option<Fitness>,
    #[serde(default)]
    pub meta: BTreeMap<String, Value>,
}

impl Individual {
    pub fn new(genome: Genome) -> Self {
        Self {
            genome,
            fitness: None,
            meta: BTreeMap::new(),
        }
    }

    /// Copie profonde du génome, sans fitness ni métadonnées.
    pub fn offspring(&self) -> Self {
        Self::new(self.genome.clone())
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    pub fn fitness_value(&self) -> Option<f64> {
        self.fitness.map(|f| f.value)
    }
}

/// La population complète pour une génération donnée.
#[derive(Clone, Debug, Default)]
pub struct Population {
    pub individuals: Vec<Individual>,
    pub generation: usize,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_individuals(individuals: Vec<Individual>, generation: usize) -> Self {
        Self {
            individuals,
            generation,
        }
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn add(&mut self, individual: Individual) {
        self.individuals.push(individual);
    }

    /// Trie du meilleur au pire. Tri stable : à égalité l'ordre d'origine est conservé.
    pub fn sort_by_fitness(&mut self) {
        self.individuals
            .sort_by(|a, b| compare_fitness(b.fitness.as_ref(), a.fitness.as_ref()));
    }

    pub fn best(&self) -> Option<&Individual> {
        self.individuals
            .iter()
            .reduce(|best, ind| {
                if compare_fitness(ind.fitness.as_ref(), best.fitness.as_ref()) == Ordering::Greater {
                    ind
                } else {
                    best
                }
            })
    }

    /// Les `count` meilleurs individus, fitness conservée (élitisme).
    pub fn get_elites(&self, count: usize) -> Vec<Individual> {
        let mut sorted: Vec<&Individual> = self.individuals.iter().collect();
        sorted.sort_by(|a, b| compare_fitness(b.fitness.as_ref(), a.fitness.as_ref()));
        sorted.into_iter().take(count).cloned().collect()
    }
}
