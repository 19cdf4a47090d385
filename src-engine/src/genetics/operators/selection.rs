use crate::genetics::types::{compare_fitness, Individual, Population};
use crate::utils::config::{SelectionConfig, SelectionKind};
use rand::prelude::*;
use std::cmp::Ordering;

/// Choisit un parent dans une population évaluée.
/// Retourne `None` uniquement si la population est vide.
pub trait SelectionStrategy: Send + Sync {
    fn select<'a>(&self, rng: &mut dyn RngCore, population: &'a Population)
        -> Option<&'a Individual>;
}

pub struct TournamentSelection {
    pub tournament_size: usize,
}

impl TournamentSelection {
    pub fn new(size: usize) -> Self {
        Self {
            tournament_size: size.max(1),
        }
    }
}

impl SelectionStrategy for TournamentSelection {
    fn select<'a>(
        &self,
        rng: &mut dyn RngCore,
        population: &'a Population,
    ) -> Option<&'a Individual> {
        let pop_len = population.individuals.len();
        if pop_len == 0 {
            return None;
        }

        // Tirage sans remise, borné par la taille de la population
        let k = self.tournament_size.min(pop_len);
        let mut best_candidate: Option<&Individual> = None;

        for idx in rand::seq::index::sample(rng, pop_len, k) {
            let challenger = &population.individuals[idx];
            best_candidate = match best_candidate {
                Some(best)
                    if compare_fitness(challenger.fitness.as_ref(), best.fitness.as_ref())
                        != Ordering::Greater =>
                {
                    Some(best)
                }
                _ => Some(challenger),
            };
        }
        best_candidate
    }
}

/// Roulette proportionnelle à la fitness décalée (min -> quasi nul).
/// Les échecs et les non-évalués ont un poids nul.
pub struct RouletteSelection;

impl RouletteSelection {
    const FLOOR: f64 = 1e-9;

    fn weights(population: &Population) -> Vec<f64> {
        let min = population
            .individuals
            .iter()
            .filter_map(|i| i.fitness.filter(|f| !f.failed))
            .map(|f| f.value)
            .fold(f64::INFINITY, f64::min);

        population
            .individuals
            .iter()
            .map(|i| match i.fitness {
                Some(f) if !f.failed => f.value - min + Self::FLOOR,
                _ => 0.0,
            })
            .collect()
    }
}

impl SelectionStrategy for RouletteSelection {
    fn select<'a>(
        &self,
        rng: &mut dyn RngCore,
        population: &'a Population,
    ) -> Option<&'a Individual> {
        if population.is_empty() {
            return None;
        }

        let weights = Self::weights(population);
        let total: f64 = weights.iter().sum();
        if !(total > 0.0) || !total.is_finite() {
            // Aucun individu exploitable : tirage uniforme
            return population.individuals.choose(rng);
        }

        // Premier cumul strictement supérieur au tirage : sur une frontière
        // exacte, c'est l'individu suivant qui l'emporte.
        let pick = rng.random::<f64>() * total;
        let mut acc = 0.0;
        let mut last_positive = None;
        for (ind, w) in population.individuals.iter().zip(&weights) {
            if *w <= 0.0 {
                continue;
            }
            acc += w;
            last_positive = Some(ind);
            if acc > pick {
                return Some(ind);
            }
        }
        last_positive
    }
}

/// Sélection par rang linéaire : le pire a le poids 1, le meilleur le poids n.
pub struct RankSelection;

impl SelectionStrategy for RankSelection {
    fn select<'a>(
        &self,
        rng: &mut dyn RngCore,
        population: &'a Population,
    ) -> Option<&'a Individual> {
        let n = population.len();
        if n == 0 {
            return None;
        }

        let mut ascending: Vec<&Individual> = population.individuals.iter().collect();
        ascending.sort_by(|a, b| compare_fitness(a.fitness.as_ref(), b.fitness.as_ref()));

        let total = (n * (n + 1) / 2) as u64;
        let pick = rng.random_range(0..total);
        let mut acc = 0u64;
        for (rank, ind) in ascending.iter().enumerate() {
            acc += rank as u64 + 1;
            if acc > pick {
                return Some(*ind);
            }
        }
        ascending.last().copied()
    }
}

/// Fabrique pilotée par la configuration.
pub enum Selection {
    Tournament(TournamentSelection),
    Roulette(RouletteSelection),
    Rank(RankSelection),
}

impl Selection {
    pub fn from_config(config: &SelectionConfig) -> Self {
        match config.kind {
            SelectionKind::Tournament => {
                Selection::Tournament(TournamentSelection::new(config.tournament_k))
            }
            SelectionKind::Roulette => Selection::Roulette(RouletteSelection),
            SelectionKind::Rank => Selection::Rank(RankSelection),
        }
    }
}

impl SelectionStrategy for Selection {
    fn select<'a>(
        &self,
        rng: &mut dyn RngCore,
        population: &'a Population,
    ) -> Option<&'a Individual> {
        match self {
            Selection::Tournament(s) => s.select(rng, population),
            Selection::Roulette(s) => s.select(rng, population),
            Selection::Rank(s) => s.select(rng, population),
        }
    }
}

// --- Tests Unitaires ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::types::{Fitness, Genome};
    use rand::rngs::StdRng;

    fn tagged(tag: f64, fitness: Option<Fitness>) -> Individual {
        let mut ind = Individual::new(Genome::new());
        ind.fitness = fitness;
        ind.meta.insert("tag".into(), serde_json::json!(tag));
        ind
    }

    fn tag_of(ind: &Individual) -> f64 {
        ind.meta["tag"].as_f64().unwrap()
    }

    fn population(values: &[f64]) -> Population {
        let mut pop = Population::new();
        for (i, v) in values.iter().enumerate() {
            pop.add(tagged(i as f64, Some(Fitness::new(*v, 0))));
        }
        pop
    }

    #[test]
    fn test_tournament_full_size_returns_best() {
        let mut rng = StdRng::seed_from_u64(1);
        let pop = population(&[3.0, 9.0, -1.0, 4.0]);
        let strategy = TournamentSelection::new(4);

        for _ in 0..20 {
            let selected = strategy.select(&mut rng, &pop).unwrap();
            assert_eq!(tag_of(selected), 1.0);
        }
    }

    #[test]
    fn test_tournament_prefers_better() {
        let mut rng = StdRng::seed_from_u64(2);
        let pop = population(&[1.0, 10.0]);
        let strategy = TournamentSelection::new(2);

        let wins = (0..100)
            .filter(|_| tag_of(strategy.select(&mut rng, &pop).unwrap()) == 1.0)
            .count();
        assert_eq!(wins, 100);
    }

    #[test]
    fn test_roulette_ignores_failed() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut pop = population(&[5.0, 8.0]);
        pop.add(tagged(2.0, Some(Fitness::failed(0))));

        for _ in 0..200 {
            let selected = RouletteSelection.select(&mut rng, &pop).unwrap();
            assert_ne!(tag_of(selected), 2.0);
        }
    }

    #[test]
    fn test_roulette_all_failed_falls_back_to_uniform() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut pop = Population::new();
        pop.add(tagged(0.0, Some(Fitness::failed(0))));
        pop.add(tagged(1.0, Some(Fitness::failed(0))));

        assert!(RouletteSelection.select(&mut rng, &pop).is_some());
    }

    #[test]
    fn test_rank_favors_best() {
        let mut rng = StdRng::seed_from_u64(5);
        let pop = population(&[1.0, 2.0, 3.0, 100.0]);

        let best_hits = (0..1000)
            .filter(|_| tag_of(RankSelection.select(&mut rng, &pop).unwrap()) == 3.0)
            .count();
        // Poids 4/10 pour le meilleur
        assert!(best_hits > 300 && best_hits < 500, "hits = {}", best_hits);
    }

    #[test]
    fn test_empty_population() {
        let mut rng = StdRng::seed_from_u64(6);
        let pop = Population::new();
        let selection = Selection::from_config(&SelectionConfig::default());
        assert!(selection.select(&mut rng, &pop).is_none());
        assert!(RouletteSelection.select(&mut rng, &pop).is_none());
        assert!(RankSelection.select(&mut rng, &pop).is_none());
    }
}
