//! Resource data model.
//!
//! A [`Resource`] is the normalized record a discovery collaborator hands to
//! the engine: which service it belongs to, how CloudWatch addresses it, and
//! the raw tag set that drives everything else. Resources are immutable once
//! discovered; the engine only ever reads them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Attribute key set by discovery when an EC2 instance has detailed
/// (one-minute) monitoring enabled. Value is `"enabled"` when it is.
pub const ATTR_DETAILED_MONITORING: &str = "detailed-monitoring";

/// Attribute key set by discovery when an autoscaling group has group
/// metrics collection enabled. Value is `"true"` when it is.
pub const ATTR_METRICS_ENABLED: &str = "metrics-enabled";

/// A single key/value tag attached to a cloud resource.
///
/// Keys and values are free text. Reserved `cloudwedge:` keys carry
/// machine-readable directives; everything else is ignored by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    /// Convenience constructor, mostly for tests and fixtures.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// The services the engine knows how to synthesize alarms for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ServiceKind {
    Ec2,
    Rds,
    ElasticBeanstalk,
    ApiGateway,
    StateMachine,
    Sqs,
    Ecs,
    AutoScalingGroup,
}

impl ServiceKind {
    /// All supported services, in registry order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Ec2,
            Self::Rds,
            Self::ElasticBeanstalk,
            Self::ApiGateway,
            Self::StateMachine,
            Self::Sqs,
            Self::Ecs,
            Self::AutoScalingGroup,
        ]
    }

    /// Stable lowercase identifier, used in alarm names and snapshot keys.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ec2 => "ec2",
            Self::Rds => "rds",
            Self::ElasticBeanstalk => "elasticbeanstalk",
            Self::ApiGateway => "apigateway",
            Self::StateMachine => "statemachine",
            Self::Sqs => "sqs",
            Self::Ecs => "ecs",
            Self::AutoScalingGroup => "autoscalinggroup",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered, opted-in cloud resource.
///
/// `unique_id` is the full unique identifier for the resource within its
/// service (instance id, database identifier, state machine ARN, ...).
/// `cloudwatch_dimension_id` is the value CloudWatch expects for the
/// service's dimension key, which is not always the same thing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub service: ServiceKind,

    pub unique_id: String,

    /// Human-facing name, from a `Name` tag or the service's own naming.
    pub name: String,

    /// Resolved owner. Discovery fills this from the owner tag, falling
    /// back to the default owner constant.
    pub owner: String,

    pub cloudwatch_dimension_id: String,

    #[serde(default)]
    pub tags: Vec<Tag>,

    /// Service-specific attributes discovery chose to carry along, such as
    /// [`ATTR_DETAILED_MONITORING`]. Consumed by per-service hooks.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Resource {
    /// Whether a service-specific attribute has exactly the given value.
    #[must_use]
    pub fn attribute_is(&self, key: &str, value: &str) -> bool {
        self.attributes.get(key).is_some_and(|v| v == value)
    }
}

/// Discovery output: every opted-in resource, grouped by service.
///
/// `BTreeMap` keeps run output deterministic regardless of discovery order.
pub type ResourcesByService = BTreeMap<ServiceKind, Vec<Resource>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_kind_round_trips_through_json() {
        for kind in ServiceKind::all() {
            let encoded = serde_json::to_string(kind).unwrap();
            assert_eq!(encoded, format!("\"{}\"", kind.as_str()));
            let decoded: ServiceKind = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, *kind);
        }
    }

    #[test]
    fn resource_deserializes_with_defaults() {
        let json = r#"{
            "service": "ec2",
            "uniqueId": "i-abc123",
            "name": "web-1",
            "owner": "cloudwedge",
            "cloudwatchDimensionId": "i-abc123"
        }"#;

        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.service, ServiceKind::Ec2);
        assert!(resource.tags.is_empty());
        assert!(resource.attributes.is_empty());
    }

    #[test]
    fn attribute_is_matches_exact_value() {
        let mut resource: Resource = serde_json::from_str(
            r#"{
                "service": "ec2",
                "uniqueId": "i-abc123",
                "name": "web-1",
                "owner": "cloudwedge",
                "cloudwatchDimensionId": "i-abc123"
            }"#,
        )
        .unwrap();

        resource
            .attributes
            .insert(ATTR_DETAILED_MONITORING.to_string(), "enabled".to_string());

        assert!(resource.attribute_is(ATTR_DETAILED_MONITORING, "enabled"));
        assert!(!resource.attribute_is(ATTR_DETAILED_MONITORING, "disabled"));
        assert!(!resource.attribute_is(ATTR_METRICS_ENABLED, "true"));
    }
}
