//! Error types shared by the codec, builder, router and simulation harness.

/// Errors raised by topology construction, address encoding and routing.
///
/// Every variant is terminal for the operation that produced it. The
/// simulation harness turns routing errors into failed trials instead of
/// propagating them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FractalError {
    #[error("Invalid dimension: {vertices} vertices, {iterations} iterations (need at least 2 vertices and 1 iteration)")]
    InvalidDimension { vertices: u32, iterations: u32 },

    #[error("Node not found: {key}")]
    NodeNotFound { key: String },

    #[error("Cannot encode {field} value {value} in {bits} bit(s)")]
    Encoding {
        field: &'static str,
        value: u32,
        bits: u32,
    },

    #[error("Invalid label '{input}': {reason}")]
    InvalidLabel { input: String, reason: String },

    #[error("Duplicate node generated: {key}")]
    DuplicateNode { key: String },

    #[error("Invalid fault rate {rate}: must be within [0, 1]")]
    InvalidFaultRate { rate: f64 },

    #[error("Need at least 2 nodes to pick distinct endpoints, network has {available}")]
    InsufficientNodes { available: usize },

    #[error("Node limit of {limit} exceeded while building level {level}")]
    NodeLimitExceeded { limit: usize, level: usize },

    #[error("Topology build cancelled at level {level}")]
    Cancelled { level: usize },
}

impl FractalError {
    pub(crate) fn invalid_label(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLabel {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
