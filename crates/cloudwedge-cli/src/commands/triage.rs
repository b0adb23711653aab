//! Report orphaned stacks.
//!
//! A stack is orphaned when its owner no longer appears on any discovered
//! resource; it will never receive another update, so the deployment side
//! deletes it. This command only reports - deletion stays with the
//! collaborator that owns the CloudFormation session.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cloudwedge_core::bundle::group_by_owner;
use cloudwedge_core::resource::ResourcesByService;
use cloudwedge_core::stack::{DeployedStack, orphaned_stacks};

pub fn run(resources_path: &Path, stacks_path: &Path) -> Result<()> {
    let snapshot: ResourcesByService = read_json(resources_path)?;
    let stacks: Vec<DeployedStack> = read_json(stacks_path)?;

    let owners = group_by_owner(&snapshot);
    let orphans = orphaned_stacks(owners.keys().map(String::as_str), &stacks);

    if orphans.is_empty() {
        println!("No stacks need to be deleted.");
        return Ok(());
    }

    println!("{} orphaned stack(s):", orphans.len());
    for stack in orphans {
        println!("  {} (owner: {})", stack.stack_name, stack.owner);
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}
