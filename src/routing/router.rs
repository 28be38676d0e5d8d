//! Longest-common-prefix routing.
//!
//! A route climbs from the source toward the deepest ancestor it shares with
//! the destination, then descends along the destination's label. Labels with
//! no common prefix meet at the base layer instead, whose nodes are all
//! mutually adjacent: the route climbs to the source's level-1 node, hops
//! across to the destination's level-1 node and descends from there.

use std::thread;
use std::time::Duration;

use log::trace;

use crate::address::Label;
use crate::error::FractalError;
use crate::topology::Network;

/// Ordered hops from a source node to a destination node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    hops: Vec<Label>,
    common_depth: usize,
    via_base_layer: bool,
}

impl Route {
    pub fn hops(&self) -> &[Label] {
        &self.hops
    }

    pub fn into_hops(self) -> Vec<Label> {
        self.hops
    }

    /// Number of labels on the path, endpoints included.
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    /// Always false for routes produced by [`Router::route_path`].
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn source(&self) -> Option<&Label> {
        self.hops.first()
    }

    pub fn destination(&self) -> Option<&Label> {
        self.hops.last()
    }

    /// Length of the shared label prefix; 0 for base-layer routes.
    pub fn common_depth(&self) -> usize {
        self.common_depth
    }

    pub fn via_base_layer(&self) -> bool {
        self.via_base_layer
    }

    /// Route rendered as node keys.
    pub fn keys(&self) -> Vec<String> {
        self.hops.iter().map(|hop| hop.to_string()).collect()
    }
}

/// Computes routes over a read-only network.
#[derive(Debug, Clone, Copy)]
pub struct Router<'a> {
    network: &'a Network,
    ping_delay: Duration,
}

impl<'a> Router<'a> {
    pub fn new(network: &'a Network) -> Self {
        Self {
            network,
            ping_delay: Duration::ZERO,
        }
    }

    /// Simulated network latency applied once per routed request.
    pub fn with_ping_delay(mut self, delay: Duration) -> Self {
        self.ping_delay = delay;
        self
    }

    pub fn network(&self) -> &'a Network {
        self.network
    }

    /// Route between two nodes given by key.
    pub fn route_keys(&self, source_key: &str, dest_key: &str) -> Result<Route, FractalError> {
        let source = self.network.get(source_key).ok_or_else(|| FractalError::NodeNotFound {
            key: source_key.to_string(),
        })?;
        let dest = self.network.get(dest_key).ok_or_else(|| FractalError::NodeNotFound {
            key: dest_key.to_string(),
        })?;
        self.route_path(source, dest)
    }

    /// Compute the hops from `source` to `dest`.
    ///
    /// # Errors
    /// `FractalError::NodeNotFound` if either label is not in the network.
    pub fn route_path(&self, source: &Label, dest: &Label) -> Result<Route, FractalError> {
        self.network.require(source)?;
        self.network.require(dest)?;

        let common = source.common_prefix_len(dest);
        let route = if common > 0 {
            let ancestor = source.prefix(common);
            let mut hops = ascend(source, common);
            let descent = descend(&ancestor, dest);
            hops.push(ancestor);
            hops.extend(descent);
            Route {
                hops,
                common_depth: common,
                via_base_layer: false,
            }
        } else {
            let source_base = source.prefix(1);
            let dest_base = dest.prefix(1);
            let mut hops = ascend(source, 1);
            let descent = descend(&dest_base, dest);
            hops.push(source_base);
            hops.push(dest_base);
            hops.extend(descent);
            Route {
                hops,
                common_depth: 0,
                via_base_layer: true,
            }
        };

        trace!("Route {} -> {}: {} hops", source, dest, route.len());

        if !self.ping_delay.is_zero() {
            thread::sleep(self.ping_delay);
        }
        Ok(route)
    }

    /// First node on the route that is no longer in the network.
    ///
    /// Hops that end in a tile segment are structural pivots, never network
    /// entries, and are skipped.
    pub fn first_unreachable<'r>(&self, route: &'r Route) -> Option<&'r Label> {
        route
            .hops()
            .iter()
            .filter(|hop| hop.is_node())
            .find(|hop| !self.network.contains(hop))
    }

    pub fn is_reachable(&self, route: &Route) -> bool {
        self.first_unreachable(route).is_none()
    }
}

/// `label` and its ancestors down to (excluding) level `depth`.
fn ascend(label: &Label, depth: usize) -> Vec<Label> {
    (depth + 1..=label.level())
        .rev()
        .map(|level| label.prefix(level))
        .collect()
}

/// Labels from just below `from` down to `dest`, following `dest`'s pairs.
fn descend(from: &Label, dest: &Label) -> Vec<Label> {
    (from.level() + 1..=dest.level())
        .map(|level| dest.prefix(level))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::parse_label;
    use crate::topology::TopologyBuilder;

    fn label(text: &str) -> Label {
        parse_label(text).unwrap()
    }

    fn keys(route: &Route) -> Vec<String> {
        route.keys()
    }

    #[test]
    fn test_tetrahedron_sibling_route() {
        let topology = TopologyBuilder::new(4, 2).unwrap().build().unwrap();
        let router = Router::new(topology.network());
        let route = router.route_path(&label("1 0 2 0"), &label("1 0 3 0")).unwrap();
        assert_eq!(keys(&route), vec!["[1 0 2 0]", "[1 0]", "[1 0 3 0]"]);
        assert_eq!(route.common_depth(), 1);
        assert!(!route.via_base_layer());
    }

    #[test]
    fn test_route_to_self() {
        let topology = TopologyBuilder::new(3, 3).unwrap().build().unwrap();
        let router = Router::new(topology.network());
        for node in topology.network().labels() {
            let route = router.route_path(node, node).unwrap();
            assert_eq!(route.hops(), std::slice::from_ref(node));
        }
    }

    #[test]
    fn test_base_layer_fallback() {
        let topology = TopologyBuilder::new(4, 2).unwrap().build().unwrap();
        let router = Router::new(topology.network());
        let route = router.route_path(&label("1 0 2 0"), &label("3 0 4 0")).unwrap();
        assert_eq!(keys(&route), vec!["[1 0 2 0]", "[1 0]", "[3 0]", "[3 0 4 0]"]);
        assert!(route.via_base_layer());
        assert_eq!(route.common_depth(), 0);

        let route = router.route_path(&label("2 0"), &label("4 0")).unwrap();
        assert_eq!(keys(&route), vec!["[2 0]", "[4 0]"]);
    }

    #[test]
    fn test_route_through_tile_pivot() {
        let topology = TopologyBuilder::new(3, 3).unwrap().build().unwrap();
        let router = Router::new(topology.network());
        let route = router
            .route_path(&label("1 0 2 1 3 0"), &label("1 0 2 2 1 0"))
            .unwrap();
        assert_eq!(
            keys(&route),
            vec!["[1 0 2 1 3 0]", "[1 0 2 1]", "[1 0]", "[1 0 2 2]", "[1 0 2 2 1 0]"]
        );
        assert!(router.is_reachable(&route));
    }

    #[test]
    fn test_ancestor_and_descendant() {
        let topology = TopologyBuilder::new(3, 3).unwrap().build().unwrap();
        let router = Router::new(topology.network());
        let down = router.route_path(&label("2 0"), &label("2 0 3 2 1 0")).unwrap();
        assert_eq!(keys(&down), vec!["[2 0]", "[2 0 3 2]", "[2 0 3 2 1 0]"]);
        let up = router.route_path(&label("2 0 3 2 1 0"), &label("2 0")).unwrap();
        assert_eq!(keys(&up), vec!["[2 0 3 2 1 0]", "[2 0 3 2]", "[2 0]"]);
    }

    #[test]
    fn test_missing_endpoint() {
        let topology = TopologyBuilder::new(3, 2).unwrap().build().unwrap();
        let router = Router::new(topology.network());
        let err = router.route_path(&label("1 0"), &label("1 0 2 1 3 0")).unwrap_err();
        assert_eq!(
            err,
            FractalError::NodeNotFound {
                key: "[1 0 2 1 3 0]".to_string()
            }
        );
        assert!(matches!(
            router.route_keys("[9 0]", "[1 0]"),
            Err(FractalError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn test_unreachable_after_ancestor_removed() {
        let mut topology = TopologyBuilder::new(3, 2).unwrap().build().unwrap();
        topology.network_mut().remove("[1 0]");
        let router = Router::new(topology.network());
        let route = router.route_path(&label("1 0 2 0"), &label("1 0 3 0")).unwrap();
        assert_eq!(route.destination(), Some(&label("1 0 3 0")));
        assert_eq!(router.first_unreachable(&route), Some(&label("1 0")));
        assert!(!router.is_reachable(&route));
    }

    #[test]
    fn test_every_route_ends_at_destination() {
        let topology = TopologyBuilder::new(3, 3).unwrap().build().unwrap();
        let router = Router::new(topology.network());
        let labels: Vec<&Label> = topology.network().labels().collect();
        for src in labels.iter().step_by(5) {
            for dst in labels.iter().step_by(7) {
                let route = router.route_path(src, dst).unwrap();
                assert_eq!(route.source(), Some(*src));
                assert_eq!(route.destination(), Some(*dst));
                assert!(router.is_reachable(&route));
            }
        }
    }
}
