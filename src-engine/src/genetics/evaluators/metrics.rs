use crate::simulation::MetricsBundle;
use crate::utils::config::FitnessWeights;
use crate::utils::prelude::*;

/// Termes de coût extraits des métriques brutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Σ temps d'attente par pas
    pub wait: f64,
    /// Σ véhicules arrêtés par pas
    pub jam: f64,
    /// Σ file², pénalise les files sévères plus que proportionnellement
    pub road_rage: f64,
    pub mean_travel_time: f64,
    pub throughput: f64,
}

impl CostBreakdown {
    pub fn from_metrics(metrics: &MetricsBundle) -> Self {
        let mean_travel_time = if metrics.arrival_travel_times.is_empty() {
            0.0
        } else {
            metrics.arrival_travel_times.iter().sum::<f64>()
                / metrics.arrival_travel_times.len() as f64
        };

        Self {
            wait: metrics.waiting_time_per_step.iter().sum(),
            jam: metrics.halted_per_step.iter().sum(),
            road_rage: metrics.edge_queue_lengths.iter().map(|q| q * q).sum(),
            mean_travel_time,
            throughput: metrics.arrived as f64,
        }
    }

    /// Coût pondéré, hors débit.
    pub fn weighted_cost(&self, w: &FitnessWeights) -> f64 {
        w.wait_time_w * self.wait
            + w.jam_time_w * self.jam
            + w.road_rage_w * self.road_rage
            + w.travel_time_w * self.mean_travel_time
    }

    /// Score à maximiser : débit pondéré moins coût pondéré.
    pub fn score(&self, w: &FitnessWeights) -> f64 {
        w.flow_w * self.throughput - self.weighted_cost(w)
    }
}
