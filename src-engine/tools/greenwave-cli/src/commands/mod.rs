pub mod optimize;
pub mod plan;

use greenwave::utils::config::{Scenario, ScenarioConfig};
use greenwave::utils::prelude::*;
use std::path::Path;

/// Charge et dérive un scénario avec la granularité de réparation donnée.
pub fn load_scenario(path: &Path, granularity: f64) -> Result<Scenario> {
    ScenarioConfig::load(path)?.build(granularity)
}
