//! Serializable report data.

use serde::{Deserialize, Serialize};

use crate::address::{self, Label, SegmentWidth};
use crate::error::FractalError;
use crate::routing::Route;
use crate::simulation::{FaultStats, SweepPoint};
use crate::topology::Topology;

/// Describes the topology a report was produced from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: String,
    pub vertices: u16,
    pub iterations: u32,
    pub total_nodes: usize,
    pub vertex_bits: u32,
}

impl ReportMetadata {
    pub fn for_topology(topology: &Topology) -> Self {
        Self::new(topology.vertices(), topology.iterations(), topology.network().len())
    }

    pub fn new(vertices: u16, iterations: u32, total_nodes: usize) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            vertices,
            iterations,
            total_nodes,
            vertex_bits: address::vertex_bits(vertices),
        }
    }
}

/// A node key with its binary address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAddress {
    pub key: String,
    pub binary: String,
}

/// Every node of one level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelListing {
    pub level: usize,
    pub node_count: usize,
    pub nodes: Vec<NodeAddress>,
}

/// Lists levels `1..=max_level` of a topology with binary addresses.
pub fn level_listing(
    topology: &Topology,
    max_level: usize,
    width: SegmentWidth,
) -> Result<Vec<LevelListing>, FractalError> {
    topology
        .network()
        .levels()
        .into_iter()
        .filter(|(level, _)| *level <= max_level)
        .map(|(level, labels)| -> Result<LevelListing, FractalError> {
            let nodes = labels
                .into_iter()
                .map(|label| -> Result<NodeAddress, FractalError> {
                    Ok(NodeAddress {
                        key: address::to_key(label),
                        binary: address::to_binary_with(label, topology.vertices(), width)?,
                    })
                })
                .collect::<Result<Vec<_>, FractalError>>()?;
            Ok(LevelListing {
                level,
                node_count: nodes.len(),
                nodes,
            })
        })
        .collect()
}

/// One computed route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteReport {
    pub source: String,
    pub destination: String,
    pub hops: Vec<String>,
    pub common_depth: usize,
    pub via_base_layer: bool,
}

impl RouteReport {
    pub fn new(source: &Label, destination: &Label, route: &Route) -> Self {
        Self {
            source: address::to_key(source),
            destination: address::to_key(destination),
            hops: route.keys(),
            common_depth: route.common_depth(),
            via_base_layer: route.via_base_layer(),
        }
    }
}

/// Everything one CLI run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub metadata: ReportMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vec<LevelListing>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweep: Option<Vec<SweepPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<FaultStats>,
}

impl RunReport {
    pub fn new(metadata: ReportMetadata) -> Self {
        Self {
            metadata,
            levels: None,
            route: None,
            sweep: None,
            fault: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::TopologyBuilder;

    #[test]
    fn test_level_listing_stops_at_max_level() {
        let topology = TopologyBuilder::new(3, 4).unwrap().build().unwrap();
        let listing = level_listing(&topology, 3, SegmentWidth::Wide).unwrap();
        assert_eq!(listing.len(), 3);
        assert_eq!(listing[0].node_count, 3);
        assert_eq!(listing[1].node_count, 9);
        assert_eq!(listing[0].nodes[0].key, "[1 0]");
        // prefix "10" (N-1 = 2) + vertex "00" + segment "00"
        assert_eq!(listing[0].nodes[0].binary, "100000");
    }

    #[test]
    fn test_compact_listing_fails_on_tile_b() {
        let topology = TopologyBuilder::new(3, 3).unwrap().build().unwrap();
        assert!(level_listing(&topology, 2, SegmentWidth::Compact).is_ok());
        assert!(matches!(
            level_listing(&topology, 3, SegmentWidth::Compact),
            Err(FractalError::Encoding { field: "segment", .. })
        ));
    }
}
