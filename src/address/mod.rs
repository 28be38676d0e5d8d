//! Hierarchical addressing.
//!
//! This module contains the label type that names every node and frontier
//! segment, and the codec that turns labels into map keys and fixed-width
//! binary addresses.

pub mod codec;
pub mod label;

pub use codec::{parse_label, to_binary, to_binary_with, to_key, vertex_bits, SegmentWidth};
pub use label::{Label, Pair, SegmentType};
