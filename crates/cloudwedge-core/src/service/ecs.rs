//! ECS cluster profile.

use serde_json::{Value, json};

use crate::props::{AlarmProp, PropPatch, patch};
use crate::resource::ServiceKind;

use super::{GroupingMode, ServiceProfile, no_overrides};

pub(super) fn profile() -> ServiceProfile {
    ServiceProfile {
        kind: ServiceKind::Ecs,
        namespace: "AWS/ECS",
        dimension_key: "ClusterName",
        section_title: "ECS",
        default_metrics: &["CPUUtilization", "MemoryUtilization"],
        dashboard_metrics: None,
        supported_metrics: vec![
            ("CPUUtilization", patch([(AlarmProp::Threshold, 85.into())])),
            ("MemoryUtilization", patch([(AlarmProp::Threshold, 70.into())])),
            ("CPUReservation", PropPatch::new()),
            ("MemoryReservation", PropPatch::new()),
            ("GPUReservation", PropPatch::new()),
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
        dashboard_metric_properties: metric_properties,
        dashboard_widget_overrides: no_overrides,
        group_extra_widgets: None,
        resource_extra_widgets: None,
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
