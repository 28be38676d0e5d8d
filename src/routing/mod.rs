//! Prefix routing over a built network.

pub mod router;

pub use router::{Route, Router};
