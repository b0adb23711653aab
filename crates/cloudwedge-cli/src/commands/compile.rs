//! Compile a discovery snapshot into per-owner stack templates.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cloudwedge_core::bundle::compile_run;
use cloudwedge_core::config::EngineConfig;
use cloudwedge_core::resource::ResourcesByService;
use cloudwedge_core::template;
use tracing::info;

/// Read the snapshot, compile every owner bundle, and write one template
/// file per stack under the output directory.
pub fn run(
    resources_path: &Path,
    out_dir: &Path,
    region: Option<String>,
    alarm_topic: Option<String>,
) -> Result<()> {
    let region = region
        .or_else(|| env::var("REGION").ok())
        .context("no region given (pass --region or set REGION)")?;
    let alarm_topic = alarm_topic
        .or_else(|| env::var("ALARM_ACTION_TARGET_TOPIC_ARN").ok())
        .context("no alarm topic given (pass --alarm-topic or set ALARM_ACTION_TARGET_TOPIC_ARN)")?;

    let snapshot = read_snapshot(resources_path)?;
    let config = EngineConfig::new(region, alarm_topic);

    let bundles = compile_run(&config, &snapshot);
    if bundles.is_empty() {
        println!("No resources in snapshot; nothing to compile.");
        return Ok(());
    }

    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    for bundle in &bundles {
        let artifacts = template::bundle_artifacts(bundle)
            .with_context(|| format!("failed to render templates for owner '{}'", bundle.owner))?;

        for artifact in &artifacts {
            let path = out_dir.join(format!("{}.json", artifact.stack_name));
            let rendered = serde_json::to_string_pretty(&artifact.template)?;
            fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(stack = %artifact.stack_name, path = %path.display(), "wrote template");
        }

        println!(
            "{}: {} alarm(s), {} widget(s) -> {} stack(s)",
            bundle.owner,
            bundle.alarms.len(),
            bundle.dashboard_widgets.len(),
            artifacts.len(),
        );
    }

    Ok(())
}

fn read_snapshot(path: &Path) -> Result<ResourcesByService> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "ec2": [{
            "service": "ec2",
            "uniqueId": "i-abc123",
            "name": "web-1",
            "owner": "team-x",
            "cloudwatchDimensionId": "i-abc123",
            "tags": [{ "key": "cloudwedge:metrics", "value": "CPUUtilization" }]
        }]
    }"#;

    #[test]
    fn compile_writes_both_templates_per_owner() {
        let dir = tempfile::TempDir::new().unwrap();
        let snapshot_path = dir.path().join("resources.json");
        fs::write(&snapshot_path, SNAPSHOT).unwrap();
        let out_dir = dir.path().join("out");

        run(
            &snapshot_path,
            &out_dir,
            Some("us-west-2".to_string()),
            Some("arn:aws:sns:us-west-2:1:alerts".to_string()),
        )
        .unwrap();

        let alarms = out_dir.join("cloudwedge-autogen-team-x-alarms-stack.json");
        let dashboard = out_dir.join("cloudwedge-autogen-team-x-dashboard-stack.json");
        assert!(alarms.exists());
        assert!(dashboard.exists());

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&alarms).unwrap()).unwrap();
        assert_eq!(parsed["Resources"].as_object().unwrap().len(), 1);
    }

    #[test]
    fn unreadable_snapshot_is_a_clear_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = run(
            &dir.path().join("missing.json"),
            &dir.path().join("out"),
            Some("us-west-2".to_string()),
            Some("arn".to_string()),
        )
        .unwrap_err();

        assert!(err.to_string().contains("failed to read snapshot"));
    }
}
