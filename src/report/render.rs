//! Report generation for topology and routing runs.
//!
//! Generates both JSON and human-readable text reports.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};

use super::types::*;

/// Generate JSON report
pub fn generate_json_report(report: &RunReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}

/// Generate human-readable text report
pub fn generate_text_report(report: &RunReport, output_path: &Path) -> Result<()> {
    fs::write(output_path, render_text(report))
        .with_context(|| format!("Failed to write text report to {}", output_path.display()))?;

    log::info!("Text report written to {}", output_path.display());
    Ok(())
}

fn section(lines: &mut Vec<String>, title: &str) {
    lines.push("=".repeat(72));
    lines.push(format!("{:^72}", title));
    lines.push("=".repeat(72));
    lines.push(String::new());
}

/// Render the report as plain text
pub fn render_text(report: &RunReport) -> String {
    let mut lines: Vec<String> = Vec::new();

    section(&mut lines, "FRACTALNET SIMPLEX NETWORK REPORT");
    lines.push(format!("Generated: {}", report.metadata.generated_at));
    lines.push(format!(
        "Simplex vertices: {} ({} bits per vertex index)",
        report.metadata.vertices, report.metadata.vertex_bits
    ));
    lines.push(format!("Iterations: {}", report.metadata.iterations));
    lines.push(format!("Total nodes: {}", report.metadata.total_nodes));
    lines.push(String::new());

    if let Some(ref levels) = report.levels {
        section(&mut lines, "NODES PER LEVEL");
        for level in levels {
            lines.push(format!("Level {} ({} nodes):", level.level, level.node_count));
            for node in &level.nodes {
                lines.push(format!("  Label: {} -> Binary: {}", node.key, node.binary));
            }
            lines.push("-".repeat(25));
        }
        lines.push(String::new());
    }

    if let Some(ref route) = report.route {
        section(&mut lines, "ROUTING PROCESS");
        lines.push(format!("Source: {}", route.source));
        lines.push(format!("Destination: {}", route.destination));
        if route.via_base_layer {
            lines.push("No common ancestor: crossing the base layer".to_string());
        } else {
            lines.push(format!("Common ancestor depth: {}", route.common_depth));
        }
        lines.push(format!("Hops ({}):", route.hops.len()));
        for hop in &route.hops {
            lines.push(format!("  {}", hop));
        }
        lines.push(String::new());
    }

    if let Some(ref sweep) = report.sweep {
        section(&mut lines, "ROUTING PERFORMANCE SWEEP");
        lines.push(format!(
            "{:>10} {:>12} {:>12} {:>16} {:>10}",
            "Iterations", "Nodes", "Build (s)", "Avg route (s)", "Avg hops"
        ));
        for point in sweep {
            lines.push(format!(
                "{:>10} {:>12} {:>12.3} {:>16.6} {:>10.2}",
                point.iterations, point.total_nodes, point.build_secs, point.avg_time_secs, point.avg_hops
            ));
        }
        lines.push(String::new());
    }

    if let Some(ref fault) = report.fault {
        section(&mut lines, "FAULT SIMULATION RESULTS");
        lines.push(format!("Fault rate: {:.0}%", fault.fault_rate * 100.0));
        lines.push(format!("Original node count: {}", fault.total_nodes));
        lines.push(format!("Healthy node count: {}", fault.healthy_nodes));
        lines.push(format!("Success criterion: {:?}", fault.criterion));
        lines.push(format!(
            "Routing success rate: {:.2}% ({} of {})",
            fault.success_rate * 100.0,
            fault.successful,
            fault.trials
        ));
        lines.push(format!(
            "Average routing time (successful routes): {:.6} s",
            fault.avg_time_on_success
        ));
        lines.push(format!(
            "Average path hops (successful routes): {:.2}",
            fault.avg_hops_on_success
        ));
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::parse_label;
    use crate::routing::Router;
    use crate::topology::TopologyBuilder;
    use tempfile::TempDir;

    fn sample_report() -> RunReport {
        let topology = TopologyBuilder::new(4, 2).unwrap().build().unwrap();
        let source = parse_label("1 0 2 0").unwrap();
        let dest = parse_label("1 0 3 0").unwrap();
        let route = Router::new(topology.network()).route_path(&source, &dest).unwrap();

        let mut report = RunReport::new(ReportMetadata::for_topology(&topology));
        report.route = Some(RouteReport::new(&source, &dest, &route));
        report
    }

    #[test]
    fn test_render_route_section() {
        let text = render_text(&sample_report());
        assert!(text.contains("ROUTING PROCESS"));
        assert!(text.contains("Common ancestor depth: 1"));
        assert!(text.contains("  [1 0 3 0]"));
        assert!(!text.contains("FAULT SIMULATION"));
    }

    #[test]
    fn test_write_reports() {
        let dir = TempDir::new().unwrap();
        let report = sample_report();
        let json_path = dir.path().join("report.json");
        let text_path = dir.path().join("report.txt");

        generate_json_report(&report, &json_path).unwrap();
        generate_text_report(&report, &text_path).unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["metadata"]["total_nodes"], 20);
        assert_eq!(json["route"]["hops"][1], "[1 0]");
        assert!(json.get("fault").is_none());
        assert!(fs::read_to_string(&text_path).unwrap().contains("Total nodes: 20"));
    }
}
