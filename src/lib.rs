//! # Fractalnet - Self-similar simplex network topology and prefix routing
//!
//! This library builds "snowflake" networks by recursively subdividing an
//! N-vertex simplex, gives every node a hierarchical address, and routes
//! between nodes through their longest common address prefix.
//!
//! ## Overview
//!
//! Level 1 of the network is the base simplex, whose nodes are all mutually
//! adjacent. Each further level hangs a copy of the simplex below every
//! frontier segment of the level above, so a node's label is the path of
//! `(vertex, segment type)` pairs leading to it from the base layer.
//!
//! ## Architecture
//!
//! - `address`: labels, node keys and fixed-width binary addresses
//! - `topology`: level-by-level network construction
//! - `routing`: longest-common-prefix routing with base-layer fallback
//! - `simulation`: random, fault-injected and sweep routing trials
//! - `config` / `config_loader`: YAML configuration and CLI overrides
//! - `report`: JSON and text reports
//!
//! ## Example Usage
//!
//! ```rust
//! use fractalnet::address::parse_label;
//! use fractalnet::routing::Router;
//! use fractalnet::topology::TopologyBuilder;
//!
//! // Tetrahedron (4 vertices), two levels
//! let topology = TopologyBuilder::new(4, 2)?.build()?;
//! assert_eq!(topology.network().len(), 4 + 16);
//!
//! let router = Router::new(topology.network());
//! let route = router.route_path(&parse_label("1 0 2 0")?, &parse_label("1 0 3 0")?)?;
//! assert_eq!(route.keys(), vec!["[1 0 2 0]", "[1 0]", "[1 0 3 0]"]);
//! # Ok::<(), fractalnet::FractalError>(())
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`FractalError`]. The binary and the
//! configuration loader use `color_eyre` for error reporting with context.

pub mod address;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod report;
pub mod routing;
pub mod simulation;
pub mod topology;

pub use error::FractalError;
