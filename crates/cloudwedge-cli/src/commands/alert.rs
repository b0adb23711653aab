//! Parse an alarm description string.
//!
//! Debugging aid for the notification pipeline: feed it the description
//! off a fired alarm and get the structured fields back as JSON.

use anyhow::{Context, Result};
use cloudwedge_core::alert::parse_description;

pub fn run(description: &str) -> Result<()> {
    let fields = parse_description(description)
        .context("description does not match the Key=Value contract")?;

    println!("{}", serde_json::to_string_pretty(&fields)?);

    Ok(())
}
