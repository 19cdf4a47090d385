use crate::utils::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tolérance de comparaison des durées (secondes).
pub const EPSILON: f64 = 1e-9;

/// Bornes d'un carrefour : durées par catégorie et longueur de cycle, en secondes.
/// Configuration immuable, partagée en lecture seule par toute la population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bounds {
    pub min_green: f64,
    pub max_green: f64,
    pub min_yellow: f64,
    pub max_yellow: f64,
    pub min_red: f64,
    pub max_red: f64,
    pub min_cycle: f64,
    pub max_cycle: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min_green: 5.0,
            max_green: 60.0,
            min_yellow: 2.0,
            max_yellow: 5.0,
            min_red: 0.0,
            max_red: 10.0,
            min_cycle: 20.0,
            max_cycle: 240.0,
        }
    }
}

/// Catégorie de durée d'une phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationKind {
    Green,
    Yellow,
    Red,
}

impl DurationKind {
    pub const ALL: [DurationKind; 3] = [DurationKind::Green, DurationKind::Yellow, DurationKind::Red];

    pub fn name(&self) -> &'static str {
        match self {
            DurationKind::Green => "green",
            DurationKind::Yellow => "yellow",
            DurationKind::Red => "red",
        }
    }
}

impl Bounds {
    pub fn range(&self, kind: DurationKind) -> (f64, f64) {
        match kind {
            DurationKind::Green => (self.min_green, self.max_green),
            DurationKind::Yellow => (self.min_yellow, self.max_yellow),
            DurationKind::Red => (self.min_red, self.max_red),
        }
    }

    pub fn cycle_range(&self) -> (f64, f64) {
        (self.min_cycle, self.max_cycle)
    }

    /// Vérifie la cohérence des bornes.
    ///
    /// Les bornes doivent tomber sur la grille de quantification, sinon
    /// quantifier puis borner ne serait plus idempotent.
    pub fn validate(&self, label: &str, granularity: f64) -> Result<()> {
        let pairs = [
            ("green", self.min_green, self.max_green),
            ("yellow", self.min_yellow, self.max_yellow),
            ("red", self.min_red, self.max_red),
            ("cycle", self.min_cycle, self.max_cycle),
        ];

        for (name, lo, hi) in pairs {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(AppError::Config(format!(
                    "[{}] bornes {} non finies",
                    label, name
                )));
            }
            if lo < 0.0 {
                return Err(AppError::Config(format!(
                    "[{}] min_{} négatif ({})",
                    label, name, lo
                )));
            }
            if lo > hi {
                return Err(AppError::Config(format!(
                    "[{}] min_{} ({}) > max_{} ({})",
                    label, name, lo, name, hi
                )));
            }
            if !is_aligned(lo, granularity) || !is_aligned(hi, granularity) {
                return Err(AppError::Config(format!(
                    "[{}] bornes {} non alignées sur la granularité {}s",
                    label, name, granularity
                )));
            }
        }
        Ok(())
    }
}

/// Surcharge partielle des bornes d'un carrefour.
/// Les champs absents sont repris des bornes de base du scénario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoundsOverride {
    pub min_green: Option<f64>,
    pub max_green: Option<f64>,
    pub min_yellow: Option<f64>,
    pub max_yellow: Option<f64>,
    pub min_red: Option<f64>,
    pub max_red: Option<f64>,
    pub min_cycle: Option<f64>,
    pub max_cycle: Option<f64>,
}

impl BoundsOverride {
    pub fn apply_to(&self, base: Bounds) -> Bounds {
        Bounds {
            min_green: self.min_green.unwrap_or(base.min_green),
            max_green: self.max_green.unwrap_or(base.max_green),
            min_yellow: self.min_yellow.unwrap_or(base.min_yellow),
            max_yellow: self.max_yellow.unwrap_or(base.max_yellow),
            min_red: self.min_red.unwrap_or(base.min_red),
            max_red: self.max_red.unwrap_or(base.max_red),
            min_cycle: self.min_cycle.unwrap_or(base.min_cycle),
            max_cycle: self.max_cycle.unwrap_or(base.max_cycle),
        }
    }
}

fn is_aligned(value: f64, granularity: f64) -> bool {
    if granularity <= 0.0 {
        return true;
    }
    ((value / granularity).round() * granularity - value).abs() < EPSILON
}

/// Bornes par carrefour, avec repli sur les bornes par défaut.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundsMap {
    pub default: Bounds,
    #[serde(default)]
    pub per_tls: BTreeMap<String, Bounds>,
}

impl BoundsMap {
    pub fn uniform(bounds: Bounds) -> Self {
        Self {
            default: bounds,
            per_tls: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, tls_id: impl Into<String>, bounds: Bounds) -> Self {
        self.per_tls.insert(tls_id.into(), bounds);
        self
    }

    pub fn for_tls(&self, tls_id: &str) -> &Bounds {
        self.per_tls.get(tls_id).unwrap_or(&self.default)
    }

    pub fn validate(&self, granularity: f64) -> Result<()> {
        self.default.validate("défaut", granularity)?;
        for (tls_id, bounds) in &self.per_tls {
            bounds.validate(tls_id, granularity)?;
        }
        Ok(())
    }
}

/// Ensemble d'approches pouvant recevoir le vert simultanément.
pub type CompatibilityGroup = Vec<String>;

/// Groupes de compatibilité par carrefour.
/// Un carrefour absent de la carte impose une seule approche active par phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompatibilityMap {
    groups: BTreeMap<String, Vec<CompatibilityGroup>>,
}

impl CompatibilityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tls_id: impl Into<String>, groups: Vec<CompatibilityGroup>) {
        self.groups.insert(tls_id.into(), groups);
    }

    pub fn with_groups(mut self, tls_id: impl Into<String>, groups: Vec<CompatibilityGroup>) -> Self {
        self.insert(tls_id, groups);
        self
    }

    /// Groupes déclarés pour ce carrefour (vide si aucun).
    pub fn groups(&self, tls_id: &str) -> &[CompatibilityGroup] {
        self.groups.get(tls_id).map(Vec::as_slice).unwrap_or(&[])
    }
}
