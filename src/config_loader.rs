use crate::config::Config;
use crate::simulation::SuccessCriterion;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration file '{}'", config_path.display()))?;

    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration file '{}'", config_path.display()))?;

    config.validate()?;

    Ok(config)
}

/// Load the configuration file if one was given, defaults otherwise
pub fn load_or_default(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => load_config(path),
        None => {
            info!("No configuration file given, using defaults");
            Ok(Config::default())
        }
    }
}

/// CLI arguments that override YAML settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub seed: Option<u64>,
    pub threads: Option<usize>,
    pub dimension: Option<u16>,
    pub iterations: Option<u32>,
    pub trials: Option<usize>,
    pub ping_delay: Option<Duration>,
    pub fault_rate: Option<f64>,
    pub success_criterion: Option<SuccessCriterion>,
    pub sweep_iterations: Option<Vec<u32>>,
    pub max_nodes: Option<usize>,
}

/// Apply CLI overrides to a configuration and re-validate it
pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<()> {
    if let Some(level) = &overrides.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(seed) = overrides.seed {
        config.general.seed = Some(seed);
    }
    if let Some(threads) = overrides.threads {
        config.general.threads = threads;
    }
    if let Some(dimension) = overrides.dimension {
        config.topology.dimension = dimension;
    }
    if let Some(iterations) = overrides.iterations {
        config.topology.iterations = iterations;
    }
    if let Some(trials) = overrides.trials {
        config.simulation.trials = trials;
    }
    if let Some(delay) = overrides.ping_delay {
        config.simulation.ping_delay = delay;
    }
    if let Some(rate) = overrides.fault_rate {
        config.simulation.fault_rate = rate;
    }
    if let Some(criterion) = overrides.success_criterion {
        config.simulation.success_criterion = criterion;
    }
    if let Some(counts) = &overrides.sweep_iterations {
        config.simulation.sweep_iterations = counts.clone();
    }
    if let Some(limit) = overrides.max_nodes {
        config.limits.max_nodes = Some(limit);
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}
