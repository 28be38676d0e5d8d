//! Topology type definitions.
//!
//! This file contains the network map that holds every generated node, the
//! transient frontier used between build levels, and the built topology that
//! the router and simulation harness consume.

use std::collections::{BTreeMap, HashMap};

use crate::address::{self, Label, SegmentWidth};
use crate::error::FractalError;

/// All nodes built so far, keyed by their canonical node key.
#[derive(Debug, Clone, Default)]
pub struct Network {
    nodes: HashMap<String, Label>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly generated node.
    ///
    /// # Errors
    /// `FractalError::DuplicateNode` if the key is already present. The
    /// builder never revisits a key, so this signals a construction bug.
    pub fn insert(&mut self, label: Label) -> Result<(), FractalError> {
        let key = address::to_key(&label);
        if self.nodes.contains_key(&key) {
            return Err(FractalError::DuplicateNode { key });
        }
        self.nodes.insert(key, label);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Label> {
        self.nodes.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.nodes.contains_key(&address::to_key(label))
    }

    /// Look up a label, failing with `NodeNotFound` when it is absent.
    pub fn require(&self, label: &Label) -> Result<&Label, FractalError> {
        let key = address::to_key(label);
        self.nodes
            .get(&key)
            .ok_or(FractalError::NodeNotFound { key })
    }

    pub fn remove(&mut self, key: &str) -> Option<Label> {
        self.nodes.remove(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.nodes.keys()
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.nodes.values()
    }

    /// Labels grouped by level, each level sorted.
    pub fn levels(&self) -> BTreeMap<usize, Vec<&Label>> {
        let mut levels: BTreeMap<usize, Vec<&Label>> = BTreeMap::new();
        for label in self.nodes.values() {
            levels.entry(label.level()).or_default().push(label);
        }
        for labels in levels.values_mut() {
            labels.sort();
        }
        levels
    }

    /// Node count per level.
    pub fn level_counts(&self) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for label in self.nodes.values() {
            *counts.entry(label.level()).or_insert(0) += 1;
        }
        counts
    }
}

/// Segments at the deepest level that the next iteration extends.
///
/// Rebuilt from scratch every level and never stored in the [`Network`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontier(Vec<Label>);

impl Frontier {
    pub fn new(segments: Vec<Label>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[Label] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A fully built topology.
#[derive(Debug, Clone)]
pub struct Topology {
    pub(crate) vertices: u16,
    pub(crate) iterations: u32,
    pub(crate) network: Network,
    pub(crate) frontier: Frontier,
}

impl Topology {
    /// Simplex vertex count `N`.
    pub fn vertices(&self) -> u16 {
        self.vertices
    }

    /// Total level count `K`, including the base layer.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Mutable access for fault injection.
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    /// Frontier left over after the last refresh.
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Binary address of an existing node.
    pub fn lookup(&self, label: &Label) -> Result<String, FractalError> {
        self.lookup_with(label, SegmentWidth::default())
    }

    /// Binary address of an existing node with an explicit segment width.
    pub fn lookup_with(&self, label: &Label, width: SegmentWidth) -> Result<String, FractalError> {
        let label = self.network.require(label)?;
        address::to_binary_with(label, self.vertices, width)
    }
}
