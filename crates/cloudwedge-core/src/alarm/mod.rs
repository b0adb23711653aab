//! Alarm compilation.
//!
//! One resource in, one validated alarm definition per `(metric, level)`
//! pair out. This is a pure, total function: no retries, no partial state.
//! Unsupported metrics are skipped; a bad period override is the one
//! configuration error that surfaces, because the merge is supposed to
//! always land on a number and silently swallowing a broken override would
//! leave an alarm watching the wrong window.
//!
//! Property precedence, lowest to highest:
//!
//! 1. universal defaults
//! 2. service defaults (`ServiceProfile::default_alarm_props`)
//! 3. metric defaults (supported-metric catalog entry)
//! 4. resource-derived defaults (`ServiceProfile::resource_defaults`)
//! 5. root tag overrides (`cloudwedge:alarm:prop:*`)
//! 6. per-metric tag overrides (`cloudwedge:alarm:metric:*:prop:*`)

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use crate::config::EngineConfig;
use crate::props::{AlarmProp, PropPatch, PropValue, merge_layers, patch};
use crate::resource::Resource;
use crate::service::ServiceProfile;
use crate::tags::{self, AlertLevel, normalize_metric};

/// Prefix on every synthesized alarm name. The deployment collaborator
/// upserts by name, so this is how generated alarms stay recognizable.
pub const ALARM_NAME_PREFIX: &str = "cloudwedge-autogen";

/// Marker between the resource hash and the metric in logical ids.
const LOGICAL_ID_INFIX: &str = "CloudWedge";

/// Description token keys, in wire order. Downstream alert handling parses
/// the description with regexes anchored on these exact names.
pub const DESCRIPTION_KEY_RESOURCE: &str = "Resource";
pub const DESCRIPTION_KEY_METRIC: &str = "Metric";
pub const DESCRIPTION_KEY_LEVEL: &str = "Level";
pub const DESCRIPTION_KEY_TYPE: &str = "Type";
pub const DESCRIPTION_KEY_OWNER: &str = "Owner";

/// The CloudWatch dimension an alarm is scoped by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

/// One fully compiled alarm definition.
///
/// `logical_id` is stable across runs (content-addressed on the resource's
/// unique id) and collision-resistant across resources, so redeploying an
/// unchanged fleet produces byte-identical templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmSpec {
    pub logical_id: String,
    pub name: String,
    pub description: String,
    pub namespace: String,
    pub metric_name: String,
    pub dimension: Dimension,
    pub alarm_actions: Vec<String>,

    /// Complete property set: statistic, period, evaluation periods,
    /// threshold, comparison operator, and treat-missing-data all present.
    pub properties: PropPatch,
}

/// Compilation failure for one resource.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// The merged period was not an integer. Overrides are user input, but
    /// a non-numeric period is a configuration error, not noise.
    #[error("resource {resource}: metric {metric}: period {value:?} is not an integer")]
    InvalidPeriod {
        resource: String,
        metric: String,
        value: String,
    },
}

/// Universal alarm defaults; the bottom layer of every merge.
fn universal_defaults() -> PropPatch {
    patch([
        (AlarmProp::Statistic, "Average".into()),
        (AlarmProp::Period, 1.into()),
        (AlarmProp::TreatMissingData, "missing".into()),
        (AlarmProp::EvaluationPeriods, 10.into()),
        (AlarmProp::Threshold, 99.into()),
        (
            AlarmProp::ComparisonOperator,
            "GreaterThanOrEqualToThreshold".into(),
        ),
    ])
}

/// Compile every alarm for one resource.
///
/// Metrics come from the tag directives, or the service default list at
/// the resource's implicit level when the tags name none. Metrics outside
/// the service catalog are skipped with a debug line. A metric that
/// resolves to the same catalog entry twice is compiled once, first level
/// encountered winning.
///
/// # Errors
///
/// Returns [`CompileError::InvalidPeriod`] when a merged period value does
/// not parse as an integer.
pub fn compile_resource(
    config: &EngineConfig,
    profile: &ServiceProfile,
    resource: &Resource,
) -> Result<BTreeMap<String, AlarmSpec>, CompileError> {
    debug!(
        service = %profile.kind,
        resource = %resource.unique_id,
        "compiling alarms"
    );

    let metrics_by_level = resolved_or_default_metrics(profile, resource);

    let mut alarms = BTreeMap::new();
    let mut compiled: BTreeSet<&'static str> = BTreeSet::new();

    for level in AlertLevel::descending() {
        let Some(metrics) = metrics_by_level.get(level) else {
            continue;
        };

        for metric in metrics {
            let Some(catalog_key) = profile.catalog_key(metric) else {
                debug!(
                    service = %profile.kind,
                    resource = %resource.unique_id,
                    metric = %metric,
                    "metric not in service catalog, skipping"
                );
                continue;
            };

            // Level sets are disjoint by construction, but two spellings of
            // one metric can still land on the same catalog entry.
            if !compiled.insert(catalog_key) {
                continue;
            }

            let spec = build_alarm(config, profile, resource, *level, catalog_key)?;
            alarms.insert(spec.logical_id.clone(), spec);
        }
    }

    Ok(alarms)
}

/// Tag-directed metrics, or the service defaults at the implicit level.
fn resolved_or_default_metrics(
    profile: &ServiceProfile,
    resource: &Resource,
) -> tags::MetricsByLevel {
    let (has_any, by_level) = tags::resolve_metrics_by_level(&resource.tags);
    if has_any {
        return by_level;
    }

    let defaults: BTreeSet<String> = profile
        .default_metrics
        .iter()
        .map(ToString::to_string)
        .collect();

    BTreeMap::from([(tags::level_of(&resource.tags), defaults)])
}

fn build_alarm(
    config: &EngineConfig,
    profile: &ServiceProfile,
    resource: &Resource,
    level: AlertLevel,
    catalog_key: &'static str,
) -> Result<AlarmSpec, CompileError> {
    debug!(level = %level, metric = %catalog_key, "building alarm");

    let universal = universal_defaults();
    let metric_defaults = profile
        .metric_defaults(catalog_key)
        .cloned()
        .unwrap_or_default();
    let resource_defaults = profile
        .resource_defaults
        .map(|hook| hook(resource))
        .unwrap_or_default();
    let root_overrides = tags::prop_overrides_root(&resource.tags);
    let metric_overrides = tags::prop_overrides_for_metric(&resource.tags, catalog_key);

    let mut properties = merge_layers(&[
        &universal,
        &profile.default_alarm_props,
        &metric_defaults,
        &resource_defaults,
        &root_overrides,
        &metric_overrides,
    ]);

    let period = validated_period(profile, resource, catalog_key, &properties)?;
    properties.insert(AlarmProp::Period, PropValue::Int(period));

    Ok(AlarmSpec {
        logical_id: logical_id(&resource.unique_id, catalog_key),
        name: alarm_name(profile, resource, level, catalog_key),
        description: describe(profile, resource, level, catalog_key),
        namespace: profile.namespace.to_string(),
        metric_name: catalog_key.to_string(),
        dimension: Dimension {
            name: profile.dimension_key.to_string(),
            value: resource.cloudwatch_dimension_id.clone(),
        },
        alarm_actions: vec![config.alarm_topic_arn.clone()],
        properties,
    })
}

/// Validate the merged period.
///
/// CloudWatch only accepts periods that are multiples of 60 for standard
/// namespaces, so anything else rounds up to the next minute. Services may
/// additionally declare a floor; a period below it falls back to the
/// service default period unless the resource is exempt (detailed
/// monitoring and the like).
fn validated_period(
    profile: &ServiceProfile,
    resource: &Resource,
    metric: &str,
    properties: &PropPatch,
) -> Result<i64, CompileError> {
    let raw = properties
        .get(&AlarmProp::Period)
        .cloned()
        .unwrap_or(PropValue::Int(1));

    let parsed = raw.as_i64().ok_or_else(|| CompileError::InvalidPeriod {
        resource: resource.unique_id.clone(),
        metric: metric.to_string(),
        value: raw.to_string(),
    })?;

    let mut period = if parsed <= 0 {
        60
    } else {
        (parsed as u64).div_ceil(60) as i64 * 60
    };

    if let Some(floor) = profile.period_floor {
        let exempt = profile.floor_exempt.is_some_and(|hook| hook(resource));
        if period < floor && !exempt {
            debug!(
                resource = %resource.unique_id,
                period,
                floor,
                "period below service floor, falling back to service default"
            );
            period = profile.default_period().unwrap_or(floor);
        }
    }

    Ok(period)
}

/// Stable, template-safe identifier: sha256 of the full unique resource id,
/// hex-encoded, joined with the sanitized metric name.
#[must_use]
pub fn logical_id(unique_id: &str, metric: &str) -> String {
    let digest = Sha256::digest(unique_id.as_bytes());
    format!(
        "{}{}{}",
        hex::encode(digest),
        LOGICAL_ID_INFIX,
        normalize_metric(metric)
    )
}

/// Human-scannable alarm name, also the upsert key downstream.
fn alarm_name(
    profile: &ServiceProfile,
    resource: &Resource,
    level: AlertLevel,
    metric: &str,
) -> String {
    format!(
        "{ALARM_NAME_PREFIX}-{}-{}-{}-{}-{}",
        profile.kind.as_str(),
        resource.owner.to_lowercase(),
        level,
        normalize_metric(metric),
        normalize_metric(&resource.unique_id),
    )
}

/// The `Key=Value ` description string.
///
/// Token order and the trailing space after every token are parsed by the
/// alert ingestion side; both are part of the contract, not formatting.
fn describe(
    profile: &ServiceProfile,
    resource: &Resource,
    level: AlertLevel,
    metric: &str,
) -> String {
    format!(
        "{DESCRIPTION_KEY_RESOURCE}={} {DESCRIPTION_KEY_METRIC}={} {DESCRIPTION_KEY_LEVEL}={} \
         {DESCRIPTION_KEY_TYPE}={} {DESCRIPTION_KEY_OWNER}={} ",
        resource.name, metric, level, profile.namespace, resource.owner,
    )
}
