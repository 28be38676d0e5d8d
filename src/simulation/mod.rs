//! Routing simulation harness.
//!
//! Drives repeated routing trials over a built network: random-pair trials,
//! fault-injected trials and sweeps across iteration counts. Trials are
//! independent, so they run on the rayon pool over a read-only network.
//! Fault injection always completes before the first trial starts.

pub mod fault;
pub mod random;
pub mod sweep;
pub mod types;

pub use fault::{inject_faults, run_fault_routing};
pub use random::run_random_routing;
pub use sweep::run_sweep;
pub use types::{FaultInjection, FaultStats, RoutingStats, SimulationSettings, SuccessCriterion, SweepPoint};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::FractalError;
use crate::topology::{Network, TopologyBuilder};

/// Owns the settings and RNG for a sequence of simulation runs.
#[derive(Debug)]
pub struct Simulator {
    settings: SimulationSettings,
    rng: StdRng,
}

impl Simulator {
    pub fn new(settings: SimulationSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { settings, rng }
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn random_routing(&mut self, network: &Network) -> Result<RoutingStats, FractalError> {
        run_random_routing(network, &self.settings, &mut self.rng)
    }

    pub fn inject_faults(&mut self, network: &mut Network, fault_rate: f64) -> Result<FaultInjection, FractalError> {
        inject_faults(network, fault_rate, &mut self.rng)
    }

    pub fn fault_routing(&mut self, network: &mut Network, fault_rate: f64) -> Result<FaultStats, FractalError> {
        run_fault_routing(network, fault_rate, &self.settings, &mut self.rng)
    }

    pub fn sweep(&mut self, base: &TopologyBuilder, iteration_counts: &[u32]) -> Result<Vec<SweepPoint>, FractalError> {
        run_sweep(base, iteration_counts, &self.settings, &mut self.rng)
    }
}

/// `trials` random routing trials with default settings.
pub fn simulate_random_routing(network: &Network, trials: usize) -> Result<RoutingStats, FractalError> {
    Simulator::new(SimulationSettings {
        trials,
        ..Default::default()
    })
    .random_routing(network)
}

/// Remove `fault_rate` of the nodes, then run `trials` fault trials with
/// default settings.
pub fn simulate_fault_routing(network: &mut Network, fault_rate: f64, trials: usize) -> Result<FaultStats, FractalError> {
    Simulator::new(SimulationSettings {
        trials,
        ..Default::default()
    })
    .fault_routing(network, fault_rate)
}
