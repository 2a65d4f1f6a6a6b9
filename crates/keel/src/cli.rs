use std::fmt::Write;

use keel_core::config::ManagerSpec;
use keel_core::graph::ValidationReport;
use keel_core::ManagerRegistry;

/// Builds a registry from manifest declarations, in declaration order.
pub fn build_registry(specs: &[ManagerSpec]) -> ManagerRegistry {
    let mut registry = ManagerRegistry::new();
    for spec in specs {
        let deps: Vec<&str> = spec.dependencies.iter().map(String::as_str).collect();
        registry.register(&spec.name, &deps, spec.lazy);
    }
    registry
}

/// Numbered eager order followed by the lazy managers, which only start on
/// first use.
pub fn render_order(registry: &ManagerRegistry, order: &[String]) -> String {
    let mut out = String::new();
    for (i, name) in order.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, name);
    }
    for status in registry.statuses().into_iter().filter(|s| s.lazy) {
        let _ = writeln!(out, "lazy: {}", status.name);
    }
    out
}

pub fn render_report(report: &ValidationReport) -> String {
    let mut out = String::new();
    if report.valid {
        out.push_str("valid\n");
    } else {
        out.push_str("invalid\n");
    }
    for error in &report.errors {
        let _ = writeln!(out, "error: {}", error);
    }
    for warning in &report.warnings {
        let _ = writeln!(out, "warning: {}", warning);
    }
    out
}
