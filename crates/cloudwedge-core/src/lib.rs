//! CloudWedge synthesis engine.
//!
//! CloudWedge turns tagged cloud resources into monitoring artifacts: one
//! set of CloudWatch alarms and one dashboard per owner, rendered as
//! CloudFormation data. Everything here is a pure function of the
//! discovery snapshot and the engine configuration; discovery itself,
//! stack deployment, and notification delivery are collaborators on the
//! other side of the data types in this crate.
//!
//! The pipeline, end to end:
//!
//! 1. [`resource`] - the discovery snapshot types
//! 2. [`tags`] - tag directives resolved into owners, levels, and metric
//!    sets
//! 3. [`service`] - static per-service profiles and metric catalogs
//! 4. [`alarm`] - one validated alarm per `(metric, level)` per resource
//! 5. [`dashboard`] - widget layout per owner
//! 6. [`bundle`] - owner regrouping and per-owner artifact bundles
//! 7. [`template`] - CloudFormation rendering of a bundle
//!
//! [`stack`] and [`alert`] carry the pure halves of the deployment and
//! notification collaborators: status triage and the description-string
//! contract.
//!
//! # Example
//!
//! ```
//! use cloudwedge_core::bundle::compile_run;
//! use cloudwedge_core::config::EngineConfig;
//! use cloudwedge_core::resource::{Resource, ResourcesByService, ServiceKind, Tag};
//!
//! let config = EngineConfig::new("us-west-2", "arn:aws:sns:us-west-2:123456789012:alerts");
//!
//! let mut snapshot = ResourcesByService::new();
//! snapshot.insert(
//!     ServiceKind::Ec2,
//!     vec![Resource {
//!         service: ServiceKind::Ec2,
//!         unique_id: "i-abc123".into(),
//!         name: "web-1".into(),
//!         owner: "team-x".into(),
//!         cloudwatch_dimension_id: "i-abc123".into(),
//!         tags: vec![Tag::new("cloudwedge:metrics:critical", "CPUUtilization")],
//!         attributes: Default::default(),
//!     }],
//! );
//!
//! let bundles = compile_run(&config, &snapshot);
//! assert_eq!(bundles.len(), 1);
//! assert_eq!(bundles[0].owner, "team-x");
//! assert_eq!(bundles[0].alarms.len(), 1);
//! ```

pub mod alarm;
pub mod alert;
pub mod bundle;
pub mod config;
pub mod dashboard;
pub mod props;
pub mod resource;
pub mod service;
pub mod stack;
pub mod tags;
pub mod template;

pub use alarm::{AlarmSpec, CompileError};
pub use bundle::{OwnerArtifactBundle, compile_run};
pub use config::EngineConfig;
pub use resource::{Resource, ResourcesByService, ServiceKind, Tag};
pub use tags::AlertLevel;
