//! EC2 instance profile.
//!
//! EC2 is the one service with a period floor: standard monitoring only
//! publishes five-minute datapoints, so periods below 300 seconds are only
//! honored on instances with detailed monitoring enabled.

use serde_json::{Value, json};

use crate::props::{AlarmProp, PropPatch, patch};
use crate::resource::{ATTR_DETAILED_MONITORING, Resource, ServiceKind};

use super::{GroupingMode, ServiceProfile, no_overrides};

pub(super) fn profile() -> ServiceProfile {
    ServiceProfile {
        kind: ServiceKind::Ec2,
        namespace: "AWS/EC2",
        dimension_key: "InstanceId",
        section_title: "EC2",
        default_metrics: &[
            "CPUUtilization",
            "StatusCheckFailed_Instance",
            "StatusCheckFailed_System",
            "DiskWriteOps",
        ],
        dashboard_metrics: None,
        supported_metrics: vec![
            ("CPUUtilization", patch([(AlarmProp::Threshold, 85.into())])),
            (
                "StatusCheckFailed_Instance",
                patch([
                    (AlarmProp::Threshold, 1.into()),
                    (AlarmProp::EvaluationPeriods, 3.into()),
                ]),
            ),
            (
                "StatusCheckFailed_System",
                patch([
                    (AlarmProp::Threshold, 1.into()),
                    (AlarmProp::EvaluationPeriods, 2.into()),
                ]),
            ),
            ("DiskReadOps", patch([(AlarmProp::Threshold, 5000.into())])),
            ("DiskWriteOps", patch([(AlarmProp::Threshold, 5000.into())])),
            ("NetworkIn", patch([(AlarmProp::Threshold, 1_000_000.into())])),
            ("NetworkOut", patch([(AlarmProp::Threshold, 1_000_000.into())])),
        ],
        default_alarm_props: patch([
            (AlarmProp::EvaluationPeriods, 5.into()),
            (AlarmProp::Statistic, "Average".into()),
            (AlarmProp::Period, 300.into()),
            (
                AlarmProp::ComparisonOperator,
                "GreaterThanOrEqualToThreshold".into(),
            ),
        ]),
        grouping: GroupingMode::ByMetric,
        period_floor: Some(300),
        floor_exempt: Some(has_detailed_monitoring),
        resource_defaults: Some(resource_defaults),
        dashboard_series_options: no_overrides,
        dashboard_metric_properties: metric_properties,
        dashboard_widget_overrides: no_overrides,
        group_extra_widgets: None,
        resource_extra_widgets: None,
    }
}

fn has_detailed_monitoring(resource: &Resource) -> bool {
    resource.attribute_is(ATTR_DETAILED_MONITORING, "enabled")
}

/// Detailed monitoring publishes one-minute datapoints, so default the
/// period down to 60 for those instances.
fn resource_defaults(resource: &Resource) -> PropPatch {
    if has_detailed_monitoring(resource) {
        patch([(AlarmProp::Period, 60.into())])
    } else {
        PropPatch::new()
    }
}

fn metric_properties(metric: &str) -> Option<Value> {
    match metric {
        "CPUUtilization" => Some(json!({
            "annotations": {
                "horizontal": [{ "label": "High", "value": 90 }]
            }
        })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Tag;

    fn instance(detailed: bool) -> Resource {
        let mut resource = Resource {
            service: ServiceKind::Ec2,
            unique_id: "i-abc123".into(),
            name: "web-1".into(),
            owner: "cloudwedge".into(),
            cloudwatch_dimension_id: "i-abc123".into(),
            tags: vec![Tag::new("Name", "web-1")],
            attributes: Default::default(),
        };
        if detailed {
            resource
                .attributes
                .insert(ATTR_DETAILED_MONITORING.into(), "enabled".into());
        }
        resource
    }

    #[test]
    fn detailed_monitoring_lowers_the_default_period() {
        let defaults = resource_defaults(&instance(true));
        assert_eq!(defaults.get(&AlarmProp::Period), Some(&60.into()));

        assert!(resource_defaults(&instance(false)).is_empty());
    }

    #[test]
    fn cpu_widget_carries_the_high_annotation() {
        let props = metric_properties("CPUUtilization").unwrap();
        assert_eq!(props["annotations"]["horizontal"][0]["value"], 90);
        assert!(metric_properties("NetworkIn").is_none());
    }
}
