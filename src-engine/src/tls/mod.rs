//! Modèle de plan de feux : gènes de carrefour, bornes, compatibilité et
//! déroulement en états de signal.

pub mod approach;
pub mod bounds;
pub mod plan;

pub use approach::{ApproachIndexMap, ApproachIndexProvider, StaticApproachIndex};
pub use bounds::{Bounds, BoundsMap, BoundsOverride, CompatibilityGroup, CompatibilityMap, DurationKind};
pub use plan::{
    cycle_time, expand_to_states, offset_start, validate_compatibility, validate_ranges,
    PhaseGene, SignalState, TlsGene,
};
