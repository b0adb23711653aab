//! Service profiles.
//!
//! One [`ServiceProfile`] per supported service: the CloudWatch namespace
//! and dimension key, the supported-metric catalog with per-metric defaults,
//! service-level alarm defaults, and the dashboard behavior. What the
//! original deployment expressed as a class hierarchy is a value table plus
//! a handful of function hooks here; the compilers take a profile as a
//! parameter and never dispatch on service identity themselves.

mod apigateway;
mod autoscalinggroup;
mod ec2;
mod ecs;
mod elasticbeanstalk;
mod rds;
mod sqs;
mod statemachine;

use std::sync::LazyLock;

use serde_json::Value;

use crate::config::EngineConfig;
use crate::dashboard::Widget;
use crate::props::{AlarmProp, PropPatch};
use crate::resource::{Resource, ServiceKind};
use crate::tags::normalize_metric;

/// How a service's resources are laid out on the owner dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingMode {
    /// One widget per metric, all resources charted together.
    ByMetric,
    /// One widget run per resource, header and spacer included.
    ByResource,
}

/// Per-resource alarm defaults derived from resource attributes, e.g. a
/// shorter period when detailed monitoring is on.
pub type ResourceDefaultsHook = fn(&Resource) -> PropPatch;

/// Predicate deciding whether a resource is exempt from the service's
/// period floor.
pub type FloorExemptHook = fn(&Resource) -> bool;

/// Extra widgets for the whole service group, placed right after the
/// section header.
pub type GroupExtraWidgetsHook = fn(&EngineConfig, &[Resource]) -> Vec<Widget>;

/// Extra widgets for a single resource in by-resource layout; the first
/// list is inserted after the resource header, the second appended at the
/// end of the resource's run.
pub type ResourceExtraWidgetsHook = fn(&EngineConfig, &Resource) -> (Vec<Widget>, Vec<Widget>);

/// Dashboard override lookup keyed by metric name. Returns a JSON fragment
/// to merge, or `None` for no override.
pub type DashboardOverrideFn = fn(&str) -> Option<Value>;

/// Static per-service configuration.
pub struct ServiceProfile {
    pub kind: ServiceKind,

    /// CloudWatch namespace, e.g. `AWS/EC2`.
    pub namespace: &'static str,

    /// CloudWatch dimension key the service's alarms are scoped by.
    pub dimension_key: &'static str,

    /// Section title on the owner dashboard.
    pub section_title: &'static str,

    /// Metrics compiled when a resource's tags name none.
    pub default_metrics: &'static [&'static str],

    /// Dedicated dashboard metric list. `None` means the dashboard shows
    /// [`Self::default_metrics`].
    pub dashboard_metrics: Option<&'static [&'static str]>,

    /// Supported-metric catalog: canonical name plus metric-level alarm
    /// defaults. Metrics outside this catalog are skipped at compile time.
    pub supported_metrics: Vec<(&'static str, PropPatch)>,

    /// Service-level alarm defaults, overriding the universal ones.
    pub default_alarm_props: PropPatch,

    pub grouping: GroupingMode,

    /// Minimum accepted period. Values that land below it (and are not
    /// exempted) fall back to the service default period.
    pub period_floor: Option<i64>,

    pub floor_exempt: Option<FloorExemptHook>,

    pub resource_defaults: Option<ResourceDefaultsHook>,

    /// Per-metric options merged into each dashboard series entry.
    pub dashboard_series_options: DashboardOverrideFn,

    /// Per-metric overrides merged into widget properties.
    pub dashboard_metric_properties: DashboardOverrideFn,

    /// Per-metric overrides merged into the widget envelope (width, height).
    pub dashboard_widget_overrides: DashboardOverrideFn,

    pub group_extra_widgets: Option<GroupExtraWidgetsHook>,

    pub resource_extra_widgets: Option<ResourceExtraWidgetsHook>,
}

impl ServiceProfile {
    /// Find the canonical catalog key for a metric name, matching
    /// case/underscore/hyphen-insensitively.
    #[must_use]
    pub fn catalog_key(&self, metric: &str) -> Option<&'static str> {
        let target = normalize_metric(metric);
        self.supported_metrics
            .iter()
            .find(|(name, _)| normalize_metric(name) == target)
            .map(|(name, _)| *name)
    }

    /// Metric-level alarm defaults for a canonical catalog key.
    #[must_use]
    pub fn metric_defaults(&self, catalog_key: &str) -> Option<&PropPatch> {
        self.supported_metrics
            .iter()
            .find(|(name, _)| *name == catalog_key)
            .map(|(_, defaults)| defaults)
    }

    /// The metric list the dashboard charts.
    #[must_use]
    pub fn display_metrics(&self) -> &'static [&'static str] {
        self.dashboard_metrics.unwrap_or(self.default_metrics)
    }

    /// The service default period, when the service declares one.
    #[must_use]
    pub fn default_period(&self) -> Option<i64> {
        self.default_alarm_props
            .get(&AlarmProp::Period)
            .and_then(crate::props::PropValue::as_i64)
    }
}

/// No dashboard overrides for any metric. The common case.
pub(crate) fn no_overrides(_metric: &str) -> Option<Value> {
    None
}

static EC2: LazyLock<ServiceProfile> = LazyLock::new(ec2::profile);
static RDS: LazyLock<ServiceProfile> = LazyLock::new(rds::profile);
static ELASTIC_BEANSTALK: LazyLock<ServiceProfile> = LazyLock::new(elasticbeanstalk::profile);
static API_GATEWAY: LazyLock<ServiceProfile> = LazyLock::new(apigateway::profile);
static STATE_MACHINE: LazyLock<ServiceProfile> = LazyLock::new(statemachine::profile);
static SQS: LazyLock<ServiceProfile> = LazyLock::new(sqs::profile);
static ECS: LazyLock<ServiceProfile> = LazyLock::new(ecs::profile);
static AUTO_SCALING_GROUP: LazyLock<ServiceProfile> = LazyLock::new(autoscalinggroup::profile);

/// Lookup from [`ServiceKind`] to its static profile.
pub struct ServiceRegistry;

impl ServiceRegistry {
    /// The profile for a service.
    #[must_use]
    pub fn get(kind: ServiceKind) -> &'static ServiceProfile {
        match kind {
            ServiceKind::Ec2 => &EC2,
            ServiceKind::Rds => &RDS,
            ServiceKind::ElasticBeanstalk => &ELASTIC_BEANSTALK,
            ServiceKind::ApiGateway => &API_GATEWAY,
            ServiceKind::StateMachine => &STATE_MACHINE,
            ServiceKind::Sqs => &SQS,
            ServiceKind::Ecs => &ECS,
            ServiceKind::AutoScalingGroup => &AUTO_SCALING_GROUP,
        }
    }

    /// All profiles, in registry order.
    pub fn all() -> impl Iterator<Item = &'static ServiceProfile> {
        ServiceKind::all().iter().map(|kind| Self::get(*kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_resolves_to_a_matching_profile() {
        for kind in ServiceKind::all() {
            let profile = ServiceRegistry::get(*kind);
            assert_eq!(profile.kind, *kind);
            assert!(!profile.namespace.is_empty());
            assert!(!profile.dimension_key.is_empty());
            assert!(!profile.supported_metrics.is_empty());
        }
    }

    #[test]
    fn default_metrics_are_always_in_the_catalog() {
        for profile in ServiceRegistry::all() {
            for metric in profile.default_metrics {
                assert!(
                    profile.catalog_key(metric).is_some(),
                    "{}: default metric {metric} missing from catalog",
                    profile.kind
                );
            }
        }
    }

    #[test]
    fn catalog_lookup_is_insensitive_to_case_and_separators() {
        let ec2 = ServiceRegistry::get(ServiceKind::Ec2);
        assert_eq!(
            ec2.catalog_key("statuscheckfailed-instance"),
            Some("StatusCheckFailed_Instance")
        );
        assert_eq!(ec2.catalog_key("cpuutilization"), Some("CPUUtilization"));
        assert_eq!(ec2.catalog_key("NoSuchMetric"), None);
    }

    #[test]
    fn display_metrics_fall_back_to_default_metrics() {
        let ec2 = ServiceRegistry::get(ServiceKind::Ec2);
        assert_eq!(ec2.display_metrics(), ec2.default_metrics);

        let sqs = ServiceRegistry::get(ServiceKind::Sqs);
        assert_ne!(sqs.display_metrics(), sqs.default_metrics);
    }

    #[test]
    fn only_ec2_declares_a_period_floor() {
        for profile in ServiceRegistry::all() {
            match profile.kind {
                ServiceKind::Ec2 => assert_eq!(profile.period_floor, Some(300)),
                _ => assert_eq!(profile.period_floor, None),
            }
        }
    }
}
