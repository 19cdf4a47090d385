// FICHIER : src-engine/src/utils/config.rs

use crate::genetics::blueprint::{Blueprint, PhaseBlueprint, TlsBlueprint};
use crate::tls::{
    validate_compatibility, ApproachIndexMap, Bounds, BoundsMap, BoundsOverride, CompatibilityGroup,
    CompatibilityMap, StaticApproachIndex,
};
use crate::utils::env;
use crate::utils::error::{AppError, Result};
use crate::utils::fs::read_document;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Surcharges d'environnement reconnues.
pub const ENV_SEED: &str = "GREENWAVE_SEED";
pub const ENV_WORKERS: &str = "GREENWAVE_WORKERS";
pub const ENV_GENERATIONS: &str = "GREENWAVE_GENERATIONS";
pub const ENV_POPULATION: &str = "GREENWAVE_POPULATION";

// =========================================================================
//  CONFIGURATION DE L'OPTIMISEUR
// =========================================================================

/// Paramètres de l'algorithme génétique. Chaque champ a une valeur par défaut.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OptimizerConfig {
    pub population_size: usize,
    pub generations: usize,
    pub elitism: usize,
    pub seed: u64,
    /// 0 = un worker par cœur disponible
    pub workers: usize,
    pub selection: SelectionConfig,
    pub crossover: CrossoverConfig,
    pub mutation: MutationConfig,
    pub repair: RepairConfig,
    pub fitness: FitnessConfig,
    pub simulator: SimulatorConfig,
    pub logging: LoggingConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            generations: 15,
            elitism: 2,
            seed: 42,
            workers: 0,
            selection: SelectionConfig::default(),
            crossover: CrossoverConfig::default(),
            mutation: MutationConfig::default(),
            repair: RepairConfig::default(),
            fitness: FitnessConfig::default(),
            simulator: SimulatorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    Tournament,
    Roulette,
    Rank,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    #[serde(rename = "type")]
    pub kind: SelectionKind,
    pub tournament_k: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            kind: SelectionKind::Tournament,
            tournament_k: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverKind {
    PerIntersection,
    IntraIntersection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CrossoverConfig {
    #[serde(rename = "type")]
    pub kind: CrossoverKind,
    pub rate: f64,
    pub intra_swap_frac: f64,
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            kind: CrossoverKind::PerIntersection,
            rate: 0.8,
            intra_swap_frac: 0.5,
        }
    }
}

/// Loi du bruit de mutation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// Uniforme dans [-jitter, jitter]
    #[default]
    Uniform,
    /// Normale centrée, écart-type = jitter
    Gaussian,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MutationConfig {
    pub rate: f64,
    pub time_jitter_s: f64,
    pub offset_jitter_s: f64,
    pub reorder_prob: f64,
    pub noise: NoiseKind,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            rate: 0.2,
            time_jitter_s: 3.0,
            offset_jitter_s: 5.0,
            reorder_prob: 0.05,
            noise: NoiseKind::Uniform,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RepairConfig {
    pub granularity_s: f64,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self { granularity_s: 0.5 }
    }
}

/// Poids des termes de coût et du débit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FitnessWeights {
    pub wait_time_w: f64,
    pub jam_time_w: f64,
    pub road_rage_w: f64,
    pub travel_time_w: f64,
    pub flow_w: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            wait_time_w: 1.0,
            jam_time_w: 1.0,
            road_rage_w: 0.1,
            travel_time_w: 0.0,
            flow_w: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Penalties {
    pub invalid_tls_w: f64,
}

impl Default for Penalties {
    fn default() -> Self {
        Self {
            invalid_tls_w: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FitnessConfig {
    /// Budget de pas de simulation par évaluation
    pub steps: u32,
    pub weights: FitnessWeights,
    pub penalties: Penalties,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            steps: 900,
            weights: FitnessWeights::default(),
            penalties: Penalties::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulatorConfig {
    pub timeout_s: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self { timeout_s: 600 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Dossier des journaux JSON tournants ; console seule si absent
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl OptimizerConfig {
    /// Charge la configuration (YAML ou JSON), applique l'environnement puis valide.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config: OptimizerConfig = read_document(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        info!(
            "⚙️ Configuration GA chargée : population={}, générations={}, graine={}",
            config.population_size, config.generations, config.seed
        );
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(seed) = env::get_parsed_optional::<u64>(ENV_SEED)? {
            debug!("Surcharge {} = {}", ENV_SEED, seed);
            self.seed = seed;
        }
        if let Some(workers) = env::get_parsed_optional::<usize>(ENV_WORKERS)? {
            self.workers = workers;
        }
        if let Some(generations) = env::get_parsed_optional::<usize>(ENV_GENERATIONS)? {
            self.generations = generations;
        }
        if let Some(population) = env::get_parsed_optional::<usize>(ENV_POPULATION)? {
            self.population_size = population;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(AppError::Config("population_size doit être > 0".into()));
        }
        if self.generations == 0 {
            return Err(AppError::Config("generations doit être > 0".into()));
        }
        if self.elitism > self.population_size {
            return Err(AppError::Config(format!(
                "elitism ({}) > population_size ({})",
                self.elitism, self.population_size
            )));
        }
        if self.selection.kind == SelectionKind::Tournament && self.selection.tournament_k == 0 {
            return Err(AppError::Config("tournament_k doit être > 0".into()));
        }

        let probabilities = [
            ("crossover.rate", self.crossover.rate),
            ("crossover.intra_swap_frac", self.crossover.intra_swap_frac),
            ("mutation.rate", self.mutation.rate),
            ("mutation.reorder_prob", self.mutation.reorder_prob),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(AppError::Config(format!(
                    "{} = {} hors de [0, 1]",
                    name, p
                )));
            }
        }

        for (name, jitter) in [
            ("mutation.time_jitter_s", self.mutation.time_jitter_s),
            ("mutation.offset_jitter_s", self.mutation.offset_jitter_s),
        ] {
            if !jitter.is_finite() || jitter < 0.0 {
                return Err(AppError::Config(format!("{} invalide : {}", name, jitter)));
            }
        }

        if !self.repair.granularity_s.is_finite() || self.repair.granularity_s < 0.0 {
            return Err(AppError::Config(format!(
                "repair.granularity_s invalide : {}",
                self.repair.granularity_s
            )));
        }
        Ok(())
    }
}

// =========================================================================
//  CONFIGURATION DU SCÉNARIO
// =========================================================================

/// Intervalle `[min, max]` tel qu'écrit dans le fichier.
pub type Range = [f64; 2];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseSpec {
    pub active_approaches: Vec<String>,
    #[serde(default)]
    pub g: Option<Range>,
    #[serde(default)]
    pub y: Option<Range>,
    #[serde(default)]
    pub r: Option<Range>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TlsSpec {
    #[serde(default = "default_offset_range")]
    pub offset_range: Range,
    /// Surcharge partielle, fusionnée sur `tls_defaults`.
    #[serde(default)]
    pub bounds: Option<BoundsOverride>,
    #[serde(default)]
    pub compatibility_groups: Vec<CompatibilityGroup>,
    #[serde(default)]
    pub signal_positions: Option<Vec<String>>,
    #[serde(default)]
    pub phases: Vec<PhaseSpec>,
}

fn default_offset_range() -> Range {
    [0.0, 30.0]
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub tls_defaults: Bounds,
    #[serde(default)]
    pub tls: BTreeMap<String, TlsSpec>,
}

/// Tout ce que l'optimiseur dérive d'un scénario.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub bounds: BoundsMap,
    pub compat: CompatibilityMap,
    pub blueprint: Blueprint,
    pub approaches: StaticApproachIndex,
}

impl ScenarioConfig {
    pub fn load(path: &Path) -> Result<Self> {
        read_document(path)
    }

    /// Valide le scénario et dérive bornes, compatibilité, blueprint et carte des positions.
    pub fn build(&self, granularity: f64) -> Result<Scenario> {
        if self.tls.is_empty() {
            return Err(AppError::Config("Le scénario ne déclare aucun carrefour".into()));
        }

        let mut bounds = BoundsMap::uniform(self.tls_defaults);
        let mut compat = CompatibilityMap::new();
        let mut approaches = StaticApproachIndex::new();
        let mut blueprint = Blueprint::default();

        for (tls_id, spec) in &self.tls {
            if spec.phases.is_empty() {
                return Err(AppError::Config(format!("[{}] aucune phase déclarée", tls_id)));
            }
            if let Some(partial) = spec.bounds {
                bounds = bounds.with_override(tls_id.clone(), partial.apply_to(self.tls_defaults));
            }
            let tls_bounds = *bounds.for_tls(tls_id);

            // Le blueprint doit déjà respecter la compatibilité et les positions de signal
            for (i, phase) in spec.phases.iter().enumerate() {
                validate_compatibility(tls_id, &phase.active_approaches, &spec.compatibility_groups)
                    .map_err(|e| AppError::Config(format!("[{}] phase {} : {}", tls_id, i, e)))?;
            }

            compat.insert(tls_id.clone(), spec.compatibility_groups.clone());
            if let Some(positions) = &spec.signal_positions {
                let map = ApproachIndexMap::from_positions(positions.iter().cloned());
                for (i, phase) in spec.phases.iter().enumerate() {
                    if let Some(orphan) = phase.active_approaches.iter().find(|a| !map.controls(a)) {
                        return Err(AppError::Config(format!(
                            "[{}] phase {} : approche '{}' absente de signal_positions",
                            tls_id, i, orphan
                        )));
                    }
                }
                approaches.insert(tls_id.clone(), map);
            }

            let phases = spec
                .phases
                .iter()
                .map(|p| PhaseBlueprint {
                    active_approaches: p.active_approaches.clone(),
                    green: range_or(p.g, (
                        tls_bounds.min_green.max(5.0),
                        tls_bounds.max_green.min(20.0),
                    )),
                    yellow: range_or(p.y, (
                        tls_bounds.min_yellow.max(2.0),
                        tls_bounds.max_yellow.min(4.0),
                    )),
                    red: range_or(p.r, (
                        tls_bounds.min_red.max(0.0),
                        tls_bounds.max_red.min(5.0),
                    )),
                })
                .collect();

            blueprint.tls.insert(
                tls_id.clone(),
                TlsBlueprint {
                    offset_range: (spec.offset_range[0], spec.offset_range[1]),
                    phases,
                },
            );
        }

        bounds.validate(granularity)?;
        blueprint.validate()?;

        info!("🚦 Scénario chargé : {} carrefour(s)", blueprint.tls.len());
        Ok(Scenario {
            bounds,
            compat,
            blueprint,
            approaches,
        })
    }
}

fn range_or(explicit: Option<Range>, fallback: (f64, f64)) -> (f64, f64) {
    explicit.map(|[lo, hi]| (lo, hi)).unwrap_or(fallback)
}
