use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::address::SegmentWidth;
use crate::error::FractalError;
use crate::simulation::{SimulationSettings, SuccessCriterion};
use crate::topology::{CancelToken, TopologyBuilder};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Top-level run configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub topology: TopologyConfig,
    pub simulation: SimulationConfig,
    pub limits: LimitsConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !LOG_LEVELS.contains(&self.general.log_level.as_str()) {
            return Err(ValidationError::InvalidGeneral(format!(
                "log_level must be one of {:?}, got '{}'",
                LOG_LEVELS, self.general.log_level
            )));
        }

        if self.topology.dimension < 1 {
            return Err(ValidationError::InvalidTopology(
                "dimension must be at least 1 (a simplex needs 2 vertices)".to_string(),
            ));
        }
        if self.topology.dimension == u16::MAX {
            return Err(ValidationError::InvalidTopology(format!(
                "dimension must be below {}",
                u16::MAX
            )));
        }
        if self.topology.iterations < 1 {
            return Err(ValidationError::InvalidTopology(
                "iterations must be at least 1".to_string(),
            ));
        }

        if self.simulation.trials == 0 {
            return Err(ValidationError::InvalidSimulation(
                "trials must be at least 1".to_string(),
            ));
        }
        let rate = self.simulation.fault_rate;
        if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
            return Err(ValidationError::InvalidSimulation(format!(
                "fault_rate must be within [0, 1], got {}",
                rate
            )));
        }
        if self.simulation.sweep_iterations.is_empty() {
            return Err(ValidationError::InvalidSimulation(
                "sweep_iterations cannot be an empty list".to_string(),
            ));
        }
        if self.simulation.sweep_iterations.contains(&0) {
            return Err(ValidationError::InvalidSimulation(
                "sweep_iterations entries must be at least 1".to_string(),
            ));
        }

        if self.limits.max_nodes == Some(0) {
            return Err(ValidationError::InvalidLimits(
                "max_nodes must be positive when set".to_string(),
            ));
        }

        Ok(())
    }

    /// Simplex vertex count for the configured dimension.
    pub fn vertex_count(&self) -> u16 {
        self.topology.dimension.saturating_add(1)
    }

    pub fn simulation_settings(&self) -> SimulationSettings {
        SimulationSettings {
            trials: self.simulation.trials,
            ping_delay: self.simulation.ping_delay,
            seed: self.general.seed,
            criterion: self.simulation.success_criterion,
        }
    }

    /// Builder for the configured topology with limits applied. Every build
    /// gets its own `build_timeout`; `cancel` stays available for stopping
    /// builds by hand.
    pub fn topology_builder(&self, cancel: &CancelToken) -> Result<TopologyBuilder, FractalError> {
        let mut builder = TopologyBuilder::from_dimension(self.topology.dimension, self.topology.iterations)?
            .with_cancel_token(cancel.clone());
        if let Some(limit) = self.limits.max_nodes {
            builder = builder.with_node_limit(limit);
        }
        if let Some(timeout) = self.limits.build_timeout {
            builder = builder.with_build_timeout(timeout);
        }
        Ok(builder)
    }
}

/// Shared general configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
    /// Fixed RNG seed; random when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Worker threads for routing trials, 0 = one per core
    pub threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            seed: None,
            threads: 0,
        }
    }
}

/// Shape of the network to build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Simplex dimension; the simplex has `dimension + 1` vertices
    pub dimension: u16,
    /// Total level count, base layer included
    pub iterations: u32,
    /// Segment field width of printed binary addresses
    pub address_width: SegmentWidth,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            dimension: 3,
            iterations: 3,
            address_width: SegmentWidth::default(),
        }
    }
}

/// Routing trial settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub trials: usize,
    #[serde(with = "humantime_serde")]
    pub ping_delay: Duration,
    pub success_criterion: SuccessCriterion,
    pub fault_rate: f64,
    pub sweep_iterations: Vec<u32>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: 100,
            ping_delay: Duration::ZERO,
            success_criterion: SuccessCriterion::default(),
            fault_rate: 0.1,
            sweep_iterations: vec![2, 3, 4],
        }
    }
}

/// Resource guards for large builds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_nodes: Option<usize>,
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub build_timeout: Option<Duration>,
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid topology configuration: {0}")]
    InvalidTopology(String),
    #[error("Invalid simulation configuration: {0}")]
    InvalidSimulation(String),
    #[error("Invalid limits configuration: {0}")]
    InvalidLimits(String),
}
