//! List the supported service profiles.

use anyhow::Result;
use cloudwedge_core::service::{GroupingMode, ServiceRegistry};

pub fn run() -> Result<()> {
    for profile in ServiceRegistry::all() {
        let grouping = match profile.grouping {
            GroupingMode::ByMetric => "by-metric",
            GroupingMode::ByResource => "by-resource",
        };

        println!(
            "{:<18} {:<22} dimension={:<26} dashboard={}",
            profile.kind, profile.namespace, profile.dimension_key, grouping,
        );
        println!("  default metrics: {}", profile.default_metrics.join(", "));
        println!(
            "  supported:       {}",
            profile
                .supported_metrics
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    Ok(())
}
