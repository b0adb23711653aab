//! Autoscaling group profile.
//!
//! Group alarms reuse the EC2 metric catalog under the
//! `AutoScalingGroupName` dimension. The dashboard gets a network-vs-CPU
//! chart per group, plus an instances-vs-CPU chart for groups that have
//! group metrics collection enabled.

use serde_json::json;

use crate::config::EngineConfig;
use crate::dashboard::Widget;
use crate::props::{AlarmProp, patch};
use crate::resource::{ATTR_METRICS_ENABLED, Resource, ServiceKind};

use super::{GroupingMode, ServiceProfile, no_overrides};

pub(super) fn profile() -> ServiceProfile {
    ServiceProfile {
        kind: ServiceKind::AutoScalingGroup,
        namespace: "AWS/EC2",
        dimension_key: "AutoScalingGroupName",
        section_title: "Autoscaling",
        default_metrics: &["CPUUtilization", "NetworkIn", "NetworkOut"],
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
        period_floor: None,
        floor_exempt: None,
        resource_defaults: None,
        dashboard_series_options: no_overrides,
        dashboard_metric_properties: no_overrides,
        dashboard_widget_overrides: no_overrides,
        group_extra_widgets: Some(group_extra_widgets),
        resource_extra_widgets: None,
    }
}

fn group_extra_widgets(config: &EngineConfig, resources: &[Resource]) -> Vec<Widget> {
    let mut widgets = Vec::new();

    for resource in resources {
        widgets.push(network_widget(config, resource));
        if resource.attribute_is(ATTR_METRICS_ENABLED, "true") {
            widgets.push(instances_widget(config, resource));
        }
    }

    widgets
}

fn network_widget(config: &EngineConfig, resource: &Resource) -> Widget {
    let region = &config.region;
    let group = &resource.cloudwatch_dimension_id;

    Widget::metric(
        24,
        Some(6),
        json!({
            "metrics": [
                [{ "expression": "nIn+nOut", "label": "All Network", "id": "e1",
                   "region": region, "color": "#d35400" }],
                [ "AWS/EC2", "CPUUtilization", "AutoScalingGroupName", group,
                  { "yAxis": "right", "id": "m3", "color": "#95a5a6" } ],
                [ ".", "NetworkIn", ".", ".", { "id": "nIn", "color": "#f1c40f" } ],
                [ ".", "NetworkOut", ".", ".", { "id": "nOut", "color": "#f39c12" } ]
            ],
            "view": "timeSeries",
            "stacked": false,
            "region": region,
            "stat": "Average",
            "period": 300,
            "title": format!("Autoscaling | {} | Network Vs CPU | AVG over 5 min", resource.name),
            "yAxis": {
                "left": { "label": "Bytes", "min": 0, "showUnits": false },
                "right": { "label": "CPU Utilization %", "max": 100, "showUnits": false, "min": 0 }
            },
            "annotations": {
                "horizontal": [
                    { "color": "#c0392b", "label": "High CPU", "value": 90, "yAxis": "right" },
                    { "label": "10 gigabit/sec bandwidth", "color": "#bdc3c7", "value": 1_250_000_000_u64 },
                    { "label": "5 gigabit/sec bandwidth", "color": "#bdc3c7", "value": 625_000_000_u64 }
                ]
            }
        }),
    )
}

fn instances_widget(config: &EngineConfig, resource: &Resource) -> Widget {
    let region = &config.region;
    let group = &resource.cloudwatch_dimension_id;

    Widget::metric(
        24,
        Some(6),
        json!({
            "metrics": [
                [ "AWS/AutoScaling", "GroupTotalInstances", "AutoScalingGroupName", group,
                  { "id": "m16", "yAxis": "left", "color": "#2980b9" } ],
                [ "AWS/EC2", "CPUUtilization", "AutoScalingGroupName", group,
                  { "yAxis": "right", "id": "m3", "color": "#95a5a6" } ]
            ],
            "view": "timeSeries",
            "stacked": false,
            "region": region,
            "stat": "Average",
            "period": 300,
            "title": format!("Autoscaling | {} | Instances vs CPU", resource.name),
            "yAxis": {
                "left": { "label": "Total Count", "min": 0, "showUnits": false },
                "right": { "label": "CPU Utilization %", "max": 100, "showUnits": false, "min": 0 }
            },
            "annotations": {
                "horizontal": [
                    { "color": "#c0392b", "label": "High CPU", "value": 90, "yAxis": "right" }
                ]
            }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(metrics_enabled: bool) -> Resource {
        let mut resource = Resource {
            service: ServiceKind::AutoScalingGroup,
            unique_id: "arn:aws:autoscaling:us-west-2:123456789012:autoScalingGroup:web".into(),
            name: "web-asg".into(),
            owner: "cloudwedge".into(),
            cloudwatch_dimension_id: "web-asg".into(),
            tags: Vec::new(),
            attributes: Default::default(),
        };
        if metrics_enabled {
            resource
                .attributes
                .insert(ATTR_METRICS_ENABLED.into(), "true".into());
        }
        resource
    }

    #[test]
    fn instances_widget_requires_group_metrics() {
        let config = EngineConfig::new("us-west-2", "arn:aws:sns:us-west-2:1:alerts");

        let widgets = group_extra_widgets(&config, &[group(false)]);
        assert_eq!(widgets.len(), 1);

        let widgets = group_extra_widgets(&config, &[group(true)]);
        assert_eq!(widgets.len(), 2);
        assert_eq!(
            widgets[1].properties["title"],
            "Autoscaling | web-asg | Instances vs CPU"
        );
    }
}
