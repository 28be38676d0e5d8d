//! Run reports.
//!
//! This module collects the results of a CLI run (level listings, routes,
//! sweeps, fault statistics) and writes them as JSON or plain text.

pub mod render;
pub mod types;

pub use render::{generate_json_report, generate_text_report, render_text};
pub use types::*;
