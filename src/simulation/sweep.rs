//! Iteration sweeps: network size and routing cost as the depth grows.

use std::time::Instant;

use log::info;
use rand::Rng;

use super::random::run_random_routing;
use super::types::{SimulationSettings, SweepPoint};
use crate::error::FractalError;
use crate::topology::TopologyBuilder;

/// Build one topology per entry of `iteration_counts` (reusing `base`'s
/// vertex count and limits) and run random routing on each.
pub fn run_sweep<R: Rng>(
    base: &TopologyBuilder,
    iteration_counts: &[u32],
    settings: &SimulationSettings,
    rng: &mut R,
) -> Result<Vec<SweepPoint>, FractalError> {
    let mut points = Vec::with_capacity(iteration_counts.len());

    for &iterations in iteration_counts {
        info!("---------- Number of iterations: {} ----------", iterations);
        let started = Instant::now();
        let topology = base.with_iterations(iterations)?.build()?;
        let build_secs = started.elapsed().as_secs_f64();

        let stats = run_random_routing(topology.network(), settings, rng)?;
        points.push(SweepPoint {
            iterations,
            total_nodes: stats.total_nodes,
            build_secs,
            avg_time_secs: stats.avg_time_secs,
            avg_hops: stats.avg_hops,
        });
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::topology::CancelToken;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    #[test]
    fn test_sweep_grows_with_iterations() {
        let base = TopologyBuilder::new(3, 1).unwrap();
        let settings = SimulationSettings {
            trials: 20,
            ..Default::default()
        };
        let points = run_sweep(&base, &[1, 2, 3], &settings, &mut StdRng::seed_from_u64(4)).unwrap();
        let sizes: Vec<usize> = points.iter().map(|p| p.total_nodes).collect();
        assert_eq!(sizes, vec![3, 3 + 9, 3 + 9 + 36]);
        assert_eq!(points[0].avg_hops, 2.0);
    }

    #[test]
    fn test_sweep_respects_node_limit() {
        let base = TopologyBuilder::new(3, 1).unwrap().with_node_limit(20);
        let err = run_sweep(&base, &[2, 3], &SimulationSettings::default(), &mut StdRng::seed_from_u64(4))
            .unwrap_err();
        assert!(matches!(err, FractalError::NodeLimitExceeded { limit: 20, level: 3 }));
    }

    #[test]
    fn test_routing_time_does_not_count_toward_build_timeout() {
        let mut config = Config::default();
        config.limits.build_timeout = Some(Duration::from_millis(50));
        config.simulation.ping_delay = Duration::from_millis(150);
        config.simulation.trials = 1;
        config.simulation.sweep_iterations = vec![1, 1];

        let base = config.topology_builder(&CancelToken::new()).unwrap();
        let points = run_sweep(
            &base,
            &config.simulation.sweep_iterations,
            &config.simulation_settings(),
            &mut StdRng::seed_from_u64(4),
        )
        .unwrap();
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.total_nodes == 4));
    }
}
