//! cloudwedge - tag-driven CloudWatch alarm and dashboard synthesis.
//!
//! CLI front end over `cloudwedge-core`: compile a discovery snapshot into
//! per-owner CloudFormation templates, triage orphaned stacks, inspect the
//! service catalog, and parse alarm descriptions.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

/// cloudwedge - monitoring synthesis from resource tags
#[derive(Parser, Debug)]
#[command(name = "cloudwedge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a discovery snapshot into per-owner stack templates
    Compile {
        /// Discovery snapshot (service -> resources JSON)
        #[arg(short, long)]
        resources: PathBuf,

        /// Directory the templates are written to
        #[arg(short, long, default_value = "templates")]
        out: PathBuf,

        /// Target region for dashboard widgets [env: REGION]
        #[arg(long)]
        region: Option<String>,

        /// SNS topic ARN alarms notify [env: ALARM_ACTION_TARGET_TOPIC_ARN]
        #[arg(long)]
        alarm_topic: Option<String>,
    },

    /// Report deployed stacks whose owner no longer has resources
    Triage {
        /// Discovery snapshot (service -> resources JSON)
        #[arg(short, long)]
        resources: PathBuf,

        /// Deployed stacks list (owner + stack name JSON)
        #[arg(short, long)]
        stacks: PathBuf,
    },

    /// List the supported service profiles
    Services,

    /// Parse an alarm description string into its structured fields
    Alert {
        /// The `Key=Value` description string from a fired alarm
        description: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Compile {
            resources,
            out,
            region,
            alarm_topic,
        } => commands::compile::run(&resources, &out, region, alarm_topic),
        Commands::Triage { resources, stacks } => commands::triage::run(&resources, &stacks),
        Commands::Services => commands::services::run(),
        Commands::Alert { description } => commands::alert::run(&description),
    }
}
