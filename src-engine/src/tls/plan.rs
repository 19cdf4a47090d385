// FICHIER : src-engine/src/tls/plan.rs

use crate::tls::approach::ApproachIndexMap;
use crate::tls::bounds::{Bounds, CompatibilityGroup, DurationKind, EPSILON};
use crate::utils::error::{AppError, Result};
use serde::{Deserialize, Serialize};

pub const STATE_GREEN: char = 'G';
pub const STATE_YELLOW: char = 'y';
pub const STATE_RED: char = 'r';

/// Une phase : approches au vert, puis jaune, puis rouge intégral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseGene {
    pub active_approaches: Vec<String>,
    #[serde(rename = "g")]
    pub green: f64,
    #[serde(rename = "y")]
    pub yellow: f64,
    #[serde(rename = "r")]
    pub red: f64,
}

impl PhaseGene {
    pub fn new<I, S>(active: I, green: f64, yellow: f64, red: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            active_approaches: active.into_iter().map(Into::into).collect(),
            green,
            yellow,
            red,
        }
    }

    pub fn duration(&self) -> f64 {
        self.green + self.yellow + self.red
    }

    pub fn get(&self, kind: DurationKind) -> f64 {
        match kind {
            DurationKind::Green => self.green,
            DurationKind::Yellow => self.yellow,
            DurationKind::Red => self.red,
        }
    }

    pub fn get_mut(&mut self, kind: DurationKind) -> &mut f64 {
        match kind {
            DurationKind::Green => &mut self.green,
            DurationKind::Yellow => &mut self.yellow,
            DurationKind::Red => &mut self.red,
        }
    }
}

/// Plan complet d'un carrefour : décalage et séquence ordonnée de phases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TlsGene {
    pub tls_id: String,
    pub offset: f64,
    pub phases: Vec<PhaseGene>,
}

impl TlsGene {
    pub fn new(tls_id: impl Into<String>, offset: f64, phases: Vec<PhaseGene>) -> Self {
        Self {
            tls_id: tls_id.into(),
            offset,
            phases,
        }
    }

    /// Somme des durées de toutes les phases.
    pub fn cycle_time(&self) -> f64 {
        self.phases.iter().map(PhaseGene::duration).sum()
    }
}

/// Un état de signal émis vers le simulateur : un caractère par position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalState {
    pub state: String,
    pub duration: f64,
}

pub fn cycle_time(gene: &TlsGene) -> f64 {
    gene.cycle_time()
}

/// Vérifie chaque durée de phase puis la longueur de cycle.
pub fn validate_ranges(gene: &TlsGene, bounds: &Bounds) -> Result<()> {
    for (i, phase) in gene.phases.iter().enumerate() {
        for kind in DurationKind::ALL {
            let (min, max) = bounds.range(kind);
            let value = phase.get(kind);
            if !(value >= min - EPSILON && value <= max + EPSILON) {
                return Err(AppError::OutOfRange {
                    tls_id: gene.tls_id.clone(),
                    field: format!("phases[{}].{}", i, kind.name()),
                    value,
                    min,
                    max,
                });
            }
        }
    }

    let cycle = gene.cycle_time();
    let (min, max) = bounds.cycle_range();
    if !(cycle >= min - EPSILON && cycle <= max + EPSILON) {
        return Err(AppError::OutOfRange {
            tls_id: gene.tls_id.clone(),
            field: "cycle".to_string(),
            value: cycle,
            min,
            max,
        });
    }
    Ok(())
}

/// Les approches actives d'une phase doivent être compatibles deux à deux :
/// chaque paire distincte doit apparaître ensemble dans au moins un groupe.
/// Sans groupe déclaré, une seule approche active est permise.
pub fn validate_compatibility(
    tls_id: &str,
    active_approaches: &[String],
    groups: &[CompatibilityGroup],
) -> Result<()> {
    let distinct = dedup_preserving(active_approaches);
    if distinct.len() <= 1 {
        return Ok(());
    }

    let incompatible = || AppError::IncompatibleMovement {
        tls_id: tls_id.to_string(),
        approaches: distinct.clone(),
    };

    if groups.is_empty() {
        return Err(incompatible());
    }

    for (i, a) in distinct.iter().enumerate() {
        for b in &distinct[i + 1..] {
            let shared = groups.iter().any(|g| g.contains(a) && g.contains(b));
            if !shared {
                return Err(incompatible());
            }
        }
    }
    Ok(())
}

/// Retire les doublons en conservant l'ordre d'apparition.
pub fn dedup_preserving(approaches: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(approaches.len());
    for a in approaches {
        if !out.contains(a) {
            out.push(a.clone());
        }
    }
    out
}

/// Déroule le plan en états de signal : trois états (vert, jaune, rouge) par phase.
pub fn expand_to_states(
    gene: &TlsGene,
    approach_map: &ApproachIndexMap,
    groups: &[CompatibilityGroup],
) -> Result<Vec<SignalState>> {
    let width = approach_map.width();
    let mut states = Vec::with_capacity(gene.phases.len() * 3);

    for (i, phase) in gene.phases.iter().enumerate() {
        validate_compatibility(&gene.tls_id, &phase.active_approaches, groups)?;

        if let Some(orphan) = phase
            .active_approaches
            .iter()
            .find(|a| !approach_map.controls(a))
        {
            return Err(AppError::Config(format!(
                "[{}] phase {} : l'approche '{}' ne contrôle aucune position de signal",
                gene.tls_id, i, orphan
            )));
        }

        let lit = |on: char| -> String {
            (0..width)
                .map(|pos| match approach_map.approach_at(pos) {
                    Some(a) if phase.active_approaches.iter().any(|x| x == a) => on,
                    _ => STATE_RED,
                })
                .collect()
        };

        states.push(SignalState {
            state: lit(STATE_GREEN),
            duration: phase.green,
        });
        states.push(SignalState {
            state: lit(STATE_YELLOW),
            duration: phase.yellow,
        });
        states.push(SignalState {
            state: STATE_RED.to_string().repeat(width),
            duration: phase.red,
        });
    }

    Ok(states)
}

/// Position de départ dans le programme déroulé compte tenu du décalage :
/// (index de l'état courant, temps restant dans cet état).
pub fn offset_start(gene: &TlsGene, states: &[SignalState]) -> (usize, f64) {
    let cycle: f64 = states.iter().map(|s| s.duration).sum();
    if states.is_empty() || cycle <= EPSILON {
        return (0, states.first().map(|s| s.duration).unwrap_or(0.0));
    }

    let offset = if gene.offset.is_finite() {
        gene.offset.rem_euclid(cycle)
    } else {
        0.0
    };

    let mut elapsed = 0.0;
    for (i, state) in states.iter().enumerate() {
        if elapsed + state.duration > offset + EPSILON {
            return (i, state.duration - (offset - elapsed));
        }
        elapsed += state.duration;
    }
    (0, states[0].duration)
}
