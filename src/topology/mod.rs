//! Network topology module.
//!
//! This module builds the self-similar simplex network level by level and
//! holds the resulting node map.

pub mod builder;
pub mod types;

// Re-export key types for easier access
pub use builder::{CancelToken, TopologyBuilder};
pub use types::{Frontier, Network, Topology};
