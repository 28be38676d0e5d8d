//! Result and settings types for routing simulations.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How a fault trial decides that a route succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuccessCriterion {
    /// The route's last hop is the destination.
    Endpoint,
    /// The route ends at the destination and every node hop still exists.
    #[default]
    Reachable,
}

/// Knobs shared by every simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    /// Number of source/destination pairs routed per run
    pub trials: usize,
    /// Simulated latency applied once per routed request
    pub ping_delay: Duration,
    /// Fixed RNG seed for reproducible trials
    pub seed: Option<u64>,
    pub criterion: SuccessCriterion,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            trials: 100,
            ping_delay: Duration::ZERO,
            seed: None,
            criterion: SuccessCriterion::default(),
        }
    }
}

/// Aggregate of a random routing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingStats {
    pub trials: usize,
    pub avg_time_secs: f64,
    pub avg_hops: f64,
    pub total_nodes: usize,
}

/// Outcome of removing a random share of nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultInjection {
    pub total_nodes: usize,
    pub removed: usize,
    pub healthy: usize,
}

/// Aggregate of a fault-injected routing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultStats {
    pub fault_rate: f64,
    pub criterion: SuccessCriterion,
    pub total_nodes: usize,
    pub healthy_nodes: usize,
    pub trials: usize,
    pub successful: usize,
    pub success_rate: f64,
    /// Mean routing time over successful trials only
    pub avg_time_on_success: f64,
    /// Mean hop count over successful trials only
    pub avg_hops_on_success: f64,
}

/// One iteration count of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub iterations: u32,
    pub total_nodes: usize,
    pub build_secs: f64,
    pub avg_time_secs: f64,
    pub avg_hops: f64,
}

/// Per-trial result before aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum TrialOutcome {
    Success { secs: f64, hops: usize },
    Failure,
}
