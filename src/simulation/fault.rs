//! Fault injection and fault-tolerant routing trials.
//!
//! Faults are static: a share of nodes is removed from the network before
//! any trial starts, then random pairs of surviving nodes are routed over
//! what is left. A trial never raises. Routing errors and wrong endpoints
//! count as failures. The default [`SuccessCriterion::Reachable`] also fails
//! routes that cross a removed node.

use std::collections::HashSet;
use std::time::Instant;

use log::{debug, info, warn};
use rand::Rng;
use rayon::prelude::*;

use super::random::{draw_pairs, sorted_keys};
use super::types::{FaultInjection, FaultStats, SimulationSettings, SuccessCriterion, TrialOutcome};
use crate::error::FractalError;
use crate::routing::Router;
use crate::topology::Network;

fn validate_fault_rate(fault_rate: f64) -> Result<(), FractalError> {
    if fault_rate.is_finite() && (0.0..=1.0).contains(&fault_rate) {
        Ok(())
    } else {
        Err(FractalError::InvalidFaultRate { rate: fault_rate })
    }
}

/// Keep `floor(total * (1 - fault_rate))` nodes chosen uniformly at random
/// and remove the rest.
///
/// # Errors
/// `FractalError::InvalidFaultRate` when `fault_rate` is outside `[0, 1]`.
pub fn inject_faults<R: Rng>(
    network: &mut Network,
    fault_rate: f64,
    rng: &mut R,
) -> Result<FaultInjection, FractalError> {
    validate_fault_rate(fault_rate)?;

    let total_nodes = network.len();
    let healthy = ((total_nodes as f64) * (1.0 - fault_rate)).floor() as usize;
    let healthy = healthy.min(total_nodes);

    let keys: Vec<String> = sorted_keys(network).into_iter().cloned().collect();
    let keep: HashSet<usize> = rand::seq::index::sample(rng, total_nodes, healthy)
        .into_iter()
        .collect();
    for (index, key) in keys.iter().enumerate() {
        if !keep.contains(&index) {
            network.remove(key);
        }
    }

    let injection = FaultInjection {
        total_nodes,
        removed: total_nodes - network.len(),
        healthy: network.len(),
    };
    info!(
        "Fault injection: removed {} of {} nodes ({} healthy)",
        injection.removed, injection.total_nodes, injection.healthy
    );
    Ok(injection)
}

/// Inject faults into `network`, then route random pairs of healthy nodes.
///
/// # Errors
/// Only `FractalError::InvalidFaultRate`; per-trial problems are counted as
/// failures.
pub fn run_fault_routing<R: Rng>(
    network: &mut Network,
    fault_rate: f64,
    settings: &SimulationSettings,
    rng: &mut R,
) -> Result<FaultStats, FractalError> {
    let injection = inject_faults(network, fault_rate, rng)?;
    let network: &Network = network;

    let keys = sorted_keys(network);
    let outcomes: Vec<TrialOutcome> = if keys.len() < 2 {
        warn!(
            "Only {} healthy node(s) left, counting all {} trials as failed",
            keys.len(),
            settings.trials
        );
        vec![TrialOutcome::Failure; settings.trials]
    } else {
        let pairs = draw_pairs(rng, keys.len(), settings.trials);
        let router = Router::new(network).with_ping_delay(settings.ping_delay);
        pairs
            .par_iter()
            .map(|&(src, dst)| run_trial(&router, keys[src], keys[dst], settings.criterion))
            .collect()
    };

    let stats = aggregate(fault_rate, settings.criterion, &injection, &outcomes);
    info!(
        "Fault routing: success rate {:.2}%, avg time {:.6}s, avg hops {:.2}",
        stats.success_rate * 100.0,
        stats.avg_time_on_success,
        stats.avg_hops_on_success
    );
    Ok(stats)
}

fn run_trial(router: &Router<'_>, source_key: &str, dest_key: &str, criterion: SuccessCriterion) -> TrialOutcome {
    let started = Instant::now();
    let route = match router.route_keys(source_key, dest_key) {
        Ok(route) => route,
        Err(e) => {
            debug!("Trial {} -> {} failed: {}", source_key, dest_key, e);
            return TrialOutcome::Failure;
        }
    };
    let secs = started.elapsed().as_secs_f64();

    let reaches_dest = route
        .destination()
        .is_some_and(|last| router.network().get(dest_key) == Some(last));
    if !reaches_dest {
        return TrialOutcome::Failure;
    }

    if criterion == SuccessCriterion::Reachable {
        if let Some(dead) = router.first_unreachable(&route) {
            debug!("Trial {} -> {} crosses failed node {}", source_key, dest_key, dead);
            return TrialOutcome::Failure;
        }
    }

    TrialOutcome::Success {
        secs,
        hops: route.len(),
    }
}

fn aggregate(
    fault_rate: f64,
    criterion: SuccessCriterion,
    injection: &FaultInjection,
    outcomes: &[TrialOutcome],
) -> FaultStats {
    let mut successful = 0usize;
    let mut total_time = 0.0;
    let mut total_hops = 0usize;
    for outcome in outcomes {
        if let TrialOutcome::Success { secs, hops } = outcome {
            successful += 1;
            total_time += secs;
            total_hops += hops;
        }
    }

    let trials = outcomes.len();
    let ratio = |value: f64, count: usize| if count > 0 { value / count as f64 } else { 0.0 };

    FaultStats {
        fault_rate,
        criterion,
        total_nodes: injection.total_nodes,
        healthy_nodes: injection.healthy,
        trials,
        successful,
        success_rate: ratio(successful as f64, trials),
        avg_time_on_success: ratio(total_time, successful),
        avg_hops_on_success: ratio(total_hops as f64, successful),
    }
}
