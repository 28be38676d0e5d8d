//! Level-by-level topology construction.
//!
//! Level 1 is the base simplex: one node `(i, 0)` per vertex. Every further
//! level expands the current frontier into visible nodes, then refreshes the
//! frontier:
//!
//! - **Expansion**: each frontier segment `s` gains the children `s ++ (i, 0)`
//!   for every vertex `i`.
//! - **Refresh**: with `r` the last vertex of `s`, emit `s ++ (r, 0)` and, for
//!   every other vertex `i`, the two tiles `s ++ (i, 1)` and `s ++ (i, 2)`.
//! - **Pruning**: drop emitted segments that double back onto the vertex one
//!   level up.
//!
//! The frontier grows by roughly `2(N-1)` per level, so deep builds are
//! expensive. Builds can be bounded with a node limit, a per-build timeout
//! or cancelled through a [`CancelToken`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use super::types::{Frontier, Network, Topology};
use crate::address::{Label, Pair, SegmentType};
use crate::error::FractalError;

/// Shared flag used to stop a long-running build.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Builds a [`Topology`] for `vertices` simplex vertices and `iterations`
/// total levels (the base layer counts as the first).
#[derive(Debug, Clone)]
pub struct TopologyBuilder {
    vertices: u16,
    iterations: u32,
    node_limit: Option<usize>,
    build_timeout: Option<Duration>,
    cancel: Option<CancelToken>,
}

impl TopologyBuilder {
    /// # Errors
    /// `FractalError::InvalidDimension` when `vertices < 2` or
    /// `iterations < 1`.
    pub fn new(vertices: u16, iterations: u32) -> Result<Self, FractalError> {
        if vertices < 2 || iterations < 1 {
            return Err(FractalError::InvalidDimension {
                vertices: u32::from(vertices),
                iterations,
            });
        }
        Ok(Self {
            vertices,
            iterations,
            node_limit: None,
            build_timeout: None,
            cancel: None,
        })
    }

    /// Builder for a `dimension`-dimensional snowflake, i.e. a simplex with
    /// `dimension + 1` vertices.
    pub fn from_dimension(dimension: u16, iterations: u32) -> Result<Self, FractalError> {
        let vertices = dimension.checked_add(1).ok_or(FractalError::InvalidDimension {
            vertices: u32::from(dimension) + 1,
            iterations,
        })?;
        Self::new(vertices, iterations)
    }

    /// Fail with `NodeLimitExceeded` instead of growing past `limit` nodes.
    pub fn with_node_limit(mut self, limit: usize) -> Self {
        self.node_limit = Some(limit);
        self
    }

    /// Fail with `Cancelled` once a single `build()` runs longer than
    /// `timeout`. The clock starts anew with every build.
    pub fn with_build_timeout(mut self, timeout: Duration) -> Self {
        self.build_timeout = Some(timeout);
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Same vertex count, limits and cancel token with a different level
    /// count.
    pub fn with_iterations(&self, iterations: u32) -> Result<Self, FractalError> {
        let mut builder = Self::new(self.vertices, iterations)?;
        builder.node_limit = self.node_limit;
        builder.build_timeout = self.build_timeout;
        builder.cancel = self.cancel.clone();
        Ok(builder)
    }

    pub fn vertices(&self) -> u16 {
        self.vertices
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Run the full construction.
    pub fn build(&self) -> Result<Topology, FractalError> {
        let started = Instant::now();
        let deadline = self.build_timeout.map(|timeout| started + timeout);
        let mut network = Network::new();

        let mut frontier = self.seed(&mut network, deadline)?;
        info!("Iteration 1: node count {}", network.len());

        for level in 2..=self.iterations as usize {
            self.expand(&frontier, &mut network, level, deadline)?;
            frontier = self.refresh_until(&frontier, level, deadline)?;
            info!("Iteration {}: total node count {}", level, network.len());
            debug!("Iteration {}: frontier holds {} segments", level, frontier.len());
        }

        info!(
            "Network built in {:.2}s: {} vertices, {} levels, {} nodes",
            started.elapsed().as_secs_f64(),
            self.vertices,
            self.iterations,
            network.len()
        );

        Ok(Topology {
            vertices: self.vertices,
            iterations: self.iterations,
            network,
            frontier,
        })
    }

    /// Insert the base simplex and return it as the first frontier.
    fn seed(&self, network: &mut Network, deadline: Option<Instant>) -> Result<Frontier, FractalError> {
        self.check_cancelled(1, deadline)?;
        self.check_limit(u64::from(self.vertices), 1)?;

        let roots: Vec<Label> = (1..=self.vertices).map(Label::root).collect();
        for root in &roots {
            network.insert(root.clone())?;
        }
        Ok(Frontier::new(roots))
    }

    /// Insert the visible nodes of `level` below every frontier segment.
    fn expand(
        &self,
        frontier: &Frontier,
        network: &mut Network,
        level: usize,
        deadline: Option<Instant>,
    ) -> Result<(), FractalError> {
        let added = frontier.len() as u64 * u64::from(self.vertices);
        self.check_limit(network.len() as u64 + added, level)?;

        for segment in frontier.segments() {
            self.check_cancelled(level, deadline)?;
            for vertex in 1..=self.vertices {
                network.insert(segment.child(Pair::node(vertex)))?;
            }
        }
        Ok(())
    }

    /// Compute the next frontier from the current one.
    pub fn refresh(&self, frontier: &Frontier, level: usize) -> Result<Frontier, FractalError> {
        self.refresh_until(frontier, level, None)
    }

    fn refresh_until(
        &self,
        frontier: &Frontier,
        level: usize,
        deadline: Option<Instant>,
    ) -> Result<Frontier, FractalError> {
        let mut next = Vec::with_capacity(frontier.len() * 2 * usize::from(self.vertices - 1));
        let mut pruned = 0usize;

        for segment in frontier.segments() {
            self.check_cancelled(level, deadline)?;
            let Some(origin) = segment.last_vertex() else {
                continue;
            };
            for vertex in 1..=self.vertices {
                let emitted: &[SegmentType] = if vertex == origin {
                    &[SegmentType::Node]
                } else {
                    &[SegmentType::TileA, SegmentType::TileB]
                };
                for &kind in emitted {
                    let candidate = segment.child(Pair::new(vertex, kind));
                    if candidate.is_folded() {
                        pruned += 1;
                    } else {
                        next.push(candidate);
                    }
                }
            }
        }

        debug!("Level {}: pruned {} folded segments", level, pruned);
        Ok(Frontier::new(next))
    }

    fn check_cancelled(&self, level: usize, deadline: Option<Instant>) -> Result<(), FractalError> {
        if let Some(token) = &self.cancel {
            if token.is_cancelled() {
                return Err(FractalError::Cancelled { level });
            }
        }
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                warn!(
                    "Build timeout of {:?} reached at level {}, cancelling",
                    self.build_timeout.unwrap_or_default(),
                    level
                );
                return Err(FractalError::Cancelled { level });
            }
        }
        Ok(())
    }

    fn check_limit(&self, projected: u64, level: usize) -> Result<(), FractalError> {
        match self.node_limit {
            Some(limit) if projected > limit as u64 => Err(FractalError::NodeLimitExceeded { limit, level }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rejects_invalid_dimension() {
        assert!(matches!(
            TopologyBuilder::new(1, 3),
            Err(FractalError::InvalidDimension { vertices: 1, iterations: 3 })
        ));
        assert!(matches!(
            TopologyBuilder::new(4, 0),
            Err(FractalError::InvalidDimension { vertices: 4, iterations: 0 })
        ));
        assert!(matches!(
            TopologyBuilder::from_dimension(0, 2),
            Err(FractalError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_single_level_is_base_simplex() {
        let topology = TopologyBuilder::new(4, 1).unwrap().build().unwrap();
        let keys: HashSet<&String> = topology.network().keys().collect();
        assert_eq!(keys.len(), 4);
        for key in ["[1 0]", "[2 0]", "[3 0]", "[4 0]"] {
            assert!(topology.network().contains_key(key), "missing {}", key);
        }
        assert_eq!(topology.frontier().len(), 4);
    }

    #[test]
    fn test_level_sizes() {
        for vertices in 2u16..=5 {
            let topology = TopologyBuilder::new(vertices, 3).unwrap().build().unwrap();
            let counts = topology.network().level_counts();
            let n = vertices as usize;
            assert_eq!(counts[&1], n);
            assert_eq!(counts[&2], n * n);
            assert_eq!(counts[&3], n * 2 * (n - 1) * n);
            assert_eq!(topology.network().len(), counts.values().sum::<usize>());
        }
    }

    #[test]
    fn test_from_dimension_adds_one_vertex() {
        let builder = TopologyBuilder::from_dimension(3, 2).unwrap();
        assert_eq!(builder.vertices(), 4);
        assert_eq!(builder.build().unwrap().network().len(), 4 + 16);
    }

    #[test]
    fn test_frontier_never_folds() {
        let topology = TopologyBuilder::new(3, 4).unwrap().build().unwrap();
        assert!(!topology.frontier().is_empty());
        for segment in topology.frontier().segments() {
            assert!(!segment.is_folded(), "folded segment {}", segment);
            assert_eq!(segment.level(), 4);
        }
    }

    #[test]
    fn test_refresh_emits_tiles_only_toward_other_vertices() {
        let builder = TopologyBuilder::new(4, 2).unwrap();
        let frontier = Frontier::new(vec![Label::root(2)]);
        let next = builder.refresh(&frontier, 2).unwrap();
        // Continuation (2,0) is pruned, 3 other vertices x 2 tiles survive.
        assert_eq!(next.len(), 6);
        let keys: Vec<String> = next.segments().iter().map(|s| s.to_string()).collect();
        assert!(keys.contains(&"[2 0 1 1]".to_string()));
        assert!(keys.contains(&"[2 0 4 2]".to_string()));
        assert!(!keys.iter().any(|k| k.starts_with("[2 0 2")));
    }

    #[test]
    fn test_frontier_is_not_part_of_network() {
        let topology = TopologyBuilder::new(3, 2).unwrap().build().unwrap();
        for segment in topology.frontier().segments() {
            assert!(!topology.network().contains(segment));
        }
        assert!(topology.network().labels().all(|label| label.is_node()));
    }

    #[test]
    fn test_node_limit() {
        let err = TopologyBuilder::new(4, 3)
            .unwrap()
            .with_node_limit(50)
            .build()
            .unwrap_err();
        assert_eq!(err, FractalError::NodeLimitExceeded { limit: 50, level: 3 });
    }

    #[test]
    fn test_cancelled_build() {
        let token = CancelToken::new();
        token.cancel();
        let err = TopologyBuilder::new(3, 3)
            .unwrap()
            .with_cancel_token(token)
            .build()
            .unwrap_err();
        assert_eq!(err, FractalError::Cancelled { level: 1 });
    }

    #[test]
    fn test_elapsed_build_timeout_cancels() {
        let err = TopologyBuilder::new(3, 3)
            .unwrap()
            .with_build_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert_eq!(err, FractalError::Cancelled { level: 1 });
    }

    #[test]
    fn test_build_timeout_restarts_per_build() {
        let builder = TopologyBuilder::new(4, 1)
            .unwrap()
            .with_build_timeout(Duration::from_millis(50));
        assert!(builder.build().is_ok());
        std::thread::sleep(Duration::from_millis(80));
        let rebuilt = builder.with_iterations(2).unwrap();
        assert_eq!(rebuilt.build().unwrap().network().len(), 4 + 16);
    }
}
