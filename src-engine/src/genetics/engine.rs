use super::blueprint::Blueprint;
use super::dto::{GenerationStats, PlanDocument, RunReport};
use super::operators::{Crossover, Mutation, Selection, SelectionStrategy};
use super::traits::{EvaluationSlot, FitnessEvaluator};
use super::types::{Individual, Population};
use crate::utils::config::OptimizerConfig;
use crate::utils::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Pilote de l'algorithme génétique.
///
/// Boucle : { évaluation parallèle -> sélection/reproduction } × générations.
/// Un seul flux `StdRng` (initialisation + reproduction) rend le run reproductible ;
/// l'évaluation n'utilise aucun aléa, le pool de workers n'influe donc pas sur le résultat.
pub struct GeneticEngine<E: FitnessEvaluator> {
    evaluator: E,
    population_size: usize,
    generations: usize,
    elitism: usize,
    seed: u64,
    selection: Selection,
    crossover: Crossover,
    crossover_rate: f64,
    mutation: Mutation,
    pool: rayon::ThreadPool,
}

impl<E: FitnessEvaluator> GeneticEngine<E> {
    pub fn new(evaluator: E, config: &OptimizerConfig) -> Result<Self> {
        config.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("greenwave-eval-{}", i))
            .build()
            .map_err(|e| AppError::Config(format!("Pool d'évaluation : {}", e)))?;

        Ok(Self {
            evaluator,
            population_size: config.population_size,
            generations: config.generations,
            elitism: config.elitism,
            seed: config.seed,
            selection: Selection::from_config(&config.selection),
            crossover: Crossover::from_config(&config.crossover),
            crossover_rate: config.crossover.rate,
            mutation: Mutation::from_config(&config.mutation),
            pool,
        })
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Run complet depuis le blueprint.
    pub fn optimize<F>(&self, blueprint: &Blueprint, on_generation: F) -> Result<RunReport>
    where
        F: FnMut(&Population, &GenerationStats),
    {
        blueprint.validate()?;
        let started_at = Utc::now();
        let mut rng = StdRng::seed_from_u64(self.seed);

        let initial = blueprint.initial_population(self.population_size, &mut rng);
        info!(
            "🧬 Démarrage : {} individus, {} générations, graine {}",
            self.population_size, self.generations, self.seed
        );

        let (best, history) = self.run(initial, &mut rng, on_generation)?;

        Ok(RunReport {
            run_id: Uuid::new_v4(),
            started_at,
            finished_at: Utc::now(),
            seed: self.seed,
            best_plan: PlanDocument::from_genome(&best.genome),
            best,
            history,
        })
    }

    /// Fait évoluer une population donnée ; retourne le meilleur individu jamais vu
    /// et l'historique par génération.
    pub fn run<F>(
        &self,
        mut population: Population,
        rng: &mut dyn RngCore,
        mut on_generation: F,
    ) -> Result<(Individual, Vec<GenerationStats>)>
    where
        F: FnMut(&Population, &GenerationStats),
    {
        if population.is_empty() {
            return Err(AppError::Config("Population initiale vide".into()));
        }

        let mut global_best: Option<Individual> = None;
        let mut history = Vec::with_capacity(self.generations);

        for generation in 0..self.generations {
            population.generation = generation;

            // 1. Évaluation parallèle, barrière implicite en fin de par_iter
            let (evaluations, failures) = self.evaluate_population(&mut population);

            // 2. Tri et suivi du meilleur global (monotone)
            population.sort_by_fitness();
            if let Some(best) = population.individuals.first() {
                let improved = match (&global_best, &best.fitness) {
                    (None, _) => true,
                    (Some(gb), Some(f)) => gb.fitness.map(|g| f.is_better_than(&g)).unwrap_or(true),
                    (Some(_), None) => false,
                };
                if improved {
                    global_best = Some(best.clone());
                }
            }

            let stats = self.stats(&population, evaluations, failures, global_best.as_ref());
            info!(
                generation,
                best = stats.best,
                mean = stats.mean,
                global_best = stats.global_best,
                evaluations,
                failures,
                "📈 Génération terminée"
            );
            on_generation(&population, &stats);
            history.push(stats);

            // 3. Reproduction (inutile après la dernière évaluation)
            if generation + 1 < self.generations {
                population = self.breed(&population, rng)?;
            }
        }

        let best = global_best.ok_or_else(|| AppError::Config("Aucun individu évalué".into()))?;
        Ok((best, history))
    }

    /// Évalue les individus sans fitness ; retourne (évaluations, échecs).
    fn evaluate_population(&self, population: &mut Population) -> (usize, usize) {
        let generation = population.generation;
        let evaluations = AtomicUsize::new(0);
        let failures = AtomicUsize::new(0);

        self.pool.install(|| {
            population
                .individuals
                .par_iter_mut()
                .enumerate()
                .filter(|(_, ind)| ind.fitness.is_none())
                .for_each(|(index, ind)| {
                    let slot = EvaluationSlot { generation, index };
                    let fitness = self.evaluator.evaluate(ind, slot);
                    if fitness.failed {
                        failures.fetch_add(1, Ordering::Relaxed);
                    }
                    evaluations.fetch_add(1, Ordering::Relaxed);
                    ind.fitness = Some(fitness);
                });
        });

        (evaluations.into_inner(), failures.into_inner())
    }

    /// Élites conservées telles quelles, puis sélection -> croisement -> mutation.
    /// La population doit être évaluée.
    fn breed(&self, population: &Population, rng: &mut dyn RngCore) -> Result<Population> {
        let mut next = population.get_elites(self.elitism.min(self.population_size));

        while next.len() < self.population_size {
            let parent1 = self.pick(population, rng)?;
            let parent2 = self.pick(population, rng)?;

            let (child1, child2) = if rng.random::<f64>() < self.crossover_rate {
                self.crossover.apply(parent1, parent2, rng)
            } else {
                (parent1.offspring(), parent2.offspring())
            };

            next.push(self.mutation.apply(&child1, rng));
            if next.len() < self.population_size {
                next.push(self.mutation.apply(&child2, rng));
            }
        }

        Ok(Population::from_individuals(next, population.generation + 1))
    }

    fn pick<'a>(&self, population: &'a Population, rng: &mut dyn RngCore) -> Result<&'a Individual> {
        self.selection
            .select(rng, population)
            .ok_or_else(|| AppError::Config("Sélection impossible : population vide".into()))
    }

    fn stats(
        &self,
        population: &Population,
        evaluations: usize,
        failures: usize,
        global_best: Option<&Individual>,
    ) -> GenerationStats {
        let values: Vec<f64> = population
            .individuals
            .iter()
            .filter_map(|i| i.fitness_value())
            .collect();

        let best = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let worst = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mean = if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        };

        GenerationStats {
            generation: population.generation,
            best,
            mean,
            worst,
            evaluations,
            failures,
            global_best: global_best
                .and_then(|g| g.fitness_value())
                .unwrap_or(f64::NEG_INFINITY),
        }
    }
}
