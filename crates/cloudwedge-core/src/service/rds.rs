//! RDS database instance profile.

use serde_json::{Value, json};

use crate::props::{AlarmProp, patch};
use crate::resource::ServiceKind;

use super::{GroupingMode, ServiceProfile, no_overrides};

pub(super) fn profile() -> ServiceProfile {
    ServiceProfile {
        kind: ServiceKind::Rds,
        namespace: "AWS/RDS",
        dimension_key: "DBInstanceIdentifier",
        section_title: "RDS",
        default_metrics: &["CPUUtilization", "FreeableMemory", "FreeStorageSpace"],
        dashboard_metrics: None,
        supported_metrics: vec![
            (
                "CPUUtilization",
                patch([
                    (AlarmProp::Threshold, 90.into()),
                    (AlarmProp::TreatMissingData, "breaching".into()),
                    (
                        AlarmProp::ComparisonOperator,
                        "GreaterThanOrEqualToThreshold".into(),
                    ),
                ]),
            ),
            // Memory and storage alarm on falling values.
            (
                "FreeableMemory",
                patch([
                    (AlarmProp::Threshold, 100_000_000.into()),
                    (
                        AlarmProp::ComparisonOperator,
                        "LessThanOrEqualToThreshold".into(),
                    ),
                ]),
            ),
            (
                "FreeStorageSpace",
                patch([
                    (AlarmProp::Threshold, 500_000_000.into()),
                    (
                        AlarmProp::ComparisonOperator,
                        "LessThanOrEqualToThreshold".into(),
                    ),
                ]),
            ),
        ],
        default_alarm_props: patch([
            (AlarmProp::EvaluationPeriods, 15.into()),
            (AlarmProp::Statistic, "Average".into()),
            (AlarmProp::Period, 60.into()),
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
