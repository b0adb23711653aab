//! CloudFormation template rendering.
//!
//! The deployment collaborator consumes each owner bundle as two
//! declarative templates: an alarm stack (one `AWS::CloudWatch::Alarm`
//! resource per logical id) and a dashboard stack (one
//! `AWS::CloudWatch::Dashboard` resource keyed by owner). Rendering is
//! pure data assembly; map ordering keeps repeated runs byte-identical.

use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::alarm::AlarmSpec;
use crate::bundle::OwnerArtifactBundle;

/// CloudFormation template format version.
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Which of the two per-owner stacks an artifact is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackType {
    Alarms,
    Dashboard,
}

impl StackType {
    /// Value for the `cloudwedge:type` stack tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Alarms => "alarms",
            Self::Dashboard => "dashboard",
        }
    }
}

/// One renderable stack: name, type, owner, and the template body.
#[derive(Debug, Clone, PartialEq)]
pub struct StackArtifact {
    pub stack_name: String,
    pub stack_type: StackType,
    pub owner: String,
    pub template: Value,
}

/// Template rendering failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TemplateError {
    #[error("failed to serialize dashboard body: {0}")]
    Body(#[from] serde_json::Error),
}

/// Stack name for an owner's alarm stack.
#[must_use]
pub fn alarm_stack_name(owner: &str) -> String {
    format!("cloudwedge-autogen-{owner}-alarms-stack")
}

/// Stack name for an owner's dashboard stack.
#[must_use]
pub fn dashboard_stack_name(owner: &str) -> String {
    format!("cloudwedge-autogen-{owner}-dashboard-stack")
}

/// The CloudWatch dashboard name for an owner.
#[must_use]
pub fn dashboard_name(owner: &str) -> String {
    format!("cloudwedge-{owner}")
}

/// Logical ids must be alphanumeric, owners are free text.
fn dashboard_logical_id(owner: &str) -> String {
    let cleaned: String = owner.chars().filter(char::is_ascii_alphanumeric).collect();
    format!("CloudWedge{cleaned}Dashboard")
}

/// Render both stacks for one owner bundle.
///
/// # Errors
///
/// Returns [`TemplateError`] when the dashboard body cannot be serialized.
pub fn bundle_artifacts(bundle: &OwnerArtifactBundle) -> Result<Vec<StackArtifact>, TemplateError> {
    Ok(vec![
        StackArtifact {
            stack_name: alarm_stack_name(&bundle.owner),
            stack_type: StackType::Alarms,
            owner: bundle.owner.clone(),
            template: alarms_template(bundle),
        },
        StackArtifact {
            stack_name: dashboard_stack_name(&bundle.owner),
            stack_type: StackType::Dashboard,
            owner: bundle.owner.clone(),
            template: dashboard_template(bundle)?,
        },
    ])
}

/// The alarm stack template for one owner.
#[must_use]
pub fn alarms_template(bundle: &OwnerArtifactBundle) -> Value {
    let mut resources = Map::new();
    for (logical_id, spec) in &bundle.alarms {
        resources.insert(logical_id.clone(), alarm_resource(spec));
    }

    json!({
        "AWSTemplateFormatVersion": TEMPLATE_FORMAT_VERSION,
        "Description": format!(
            "CloudWedge Alarm Stack for all resources that have owner {}. \
             This stack is created dynamically by CloudWedge.",
            bundle.owner
        ),
        "Resources": resources,
    })
}

/// The dashboard stack template for one owner.
///
/// The dashboard body is itself JSON, carried as a string property.
///
/// # Errors
///
/// Returns [`TemplateError`] when the widget list cannot be serialized.
pub fn dashboard_template(bundle: &OwnerArtifactBundle) -> Result<Value, TemplateError> {
    let body = serde_json::to_string(&json!({ "widgets": bundle.dashboard_widgets }))?;

    let mut resources = Map::new();
    resources.insert(
        dashboard_logical_id(&bundle.owner),
        json!({
            "Type": "AWS::CloudWatch::Dashboard",
            "Properties": {
                "DashboardName": dashboard_name(&bundle.owner),
                "DashboardBody": body,
            }
        }),
    );

    Ok(json!({
        "AWSTemplateFormatVersion": TEMPLATE_FORMAT_VERSION,
        "Description": format!(
            "CloudWedge Dashboard Stack for all resources that have owner {}. \
             This stack is created dynamically by CloudWedge.",
            bundle.owner
        ),
        "Resources": resources,
    }))
}

/// One `AWS::CloudWatch::Alarm` resource entry.
fn alarm_resource(spec: &AlarmSpec) -> Value {
    let mut properties = Map::new();
    properties.insert("AlarmName".to_string(), json!(spec.name));
    properties.insert("AlarmDescription".to_string(), json!(spec.description));
    properties.insert("Namespace".to_string(), json!(spec.namespace));
    properties.insert("MetricName".to_string(), json!(spec.metric_name));
    properties.insert(
        "Dimensions".to_string(),
        json!([{ "Name": spec.dimension.name, "Value": spec.dimension.value }]),
    );
    properties.insert("AlarmActions".to_string(), json!(spec.alarm_actions));

    for (prop, value) in &spec.properties {
        properties.insert(prop.as_str().to_string(), json!(value));
    }

    json!({
        "Type": "AWS::CloudWatch::Alarm",
        "Properties": properties,
    })
}
