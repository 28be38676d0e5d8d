//! Random-pair routing trials.

use std::time::Instant;

use log::{debug, info};
use rand::Rng;
use rayon::prelude::*;

use super::types::{RoutingStats, SimulationSettings};
use crate::error::FractalError;
use crate::routing::Router;
use crate::topology::Network;

/// Node keys in a stable order so seeded runs pick the same pairs.
pub(crate) fn sorted_keys(network: &Network) -> Vec<&String> {
    let mut keys: Vec<&String> = network.keys().collect();
    keys.sort();
    keys
}

/// Draw `trials` index pairs with distinct source and destination.
///
/// Callers guarantee `len >= 2`.
pub(crate) fn draw_pairs<R: Rng>(rng: &mut R, len: usize, trials: usize) -> Vec<(usize, usize)> {
    (0..trials)
        .map(|_| {
            let src = rng.gen_range(0..len);
            let mut dst = rng.gen_range(0..len);
            while dst == src {
                dst = rng.gen_range(0..len);
            }
            (src, dst)
        })
        .collect()
}

/// Route `settings.trials` random pairs of distinct nodes.
///
/// Pairs are drawn sequentially from `rng` and routed in parallel.
///
/// # Errors
/// `FractalError::InsufficientNodes` when the network has fewer than two
/// nodes.
pub fn run_random_routing<R: Rng>(
    network: &Network,
    settings: &SimulationSettings,
    rng: &mut R,
) -> Result<RoutingStats, FractalError> {
    let keys = sorted_keys(network);
    if keys.len() < 2 {
        return Err(FractalError::InsufficientNodes { available: keys.len() });
    }

    let pairs = draw_pairs(rng, keys.len(), settings.trials);
    let router = Router::new(network).with_ping_delay(settings.ping_delay);
    debug!("Routing {} random pairs over {} nodes", pairs.len(), keys.len());

    let samples = pairs
        .par_iter()
        .map(|&(src, dst)| -> Result<(f64, usize), FractalError> {
            let started = Instant::now();
            let route = router.route_keys(keys[src], keys[dst])?;
            Ok((started.elapsed().as_secs_f64(), route.len()))
        })
        .collect::<Result<Vec<(f64, usize)>, FractalError>>()?;

    let (avg_time_secs, avg_hops) = if samples.is_empty() {
        (0.0, 0.0)
    } else {
        let count = samples.len() as f64;
        let total_time: f64 = samples.iter().map(|(secs, _)| secs).sum();
        let total_hops: usize = samples.iter().map(|(_, hops)| hops).sum();
        (total_time / count, total_hops as f64 / count)
    };

    info!(
        "Random routing: {} trials, avg time {:.6}s, avg hops {:.2}",
        samples.len(),
        avg_time_secs,
        avg_hops
    );

    Ok(RoutingStats {
        trials: samples.len(),
        avg_time_secs,
        avg_hops,
        total_nodes: network.len(),
    })
}
