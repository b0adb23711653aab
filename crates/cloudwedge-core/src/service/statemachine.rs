//! Step Functions state machine profile.
//!
//! State machines get the by-resource dashboard layout with a row of
//! execution-status widgets (running count, success rate, result pie) in
//! front of the per-metric charts.

use serde_json::{Value, json};

use crate::config::EngineConfig;
use crate::dashboard::Widget;
use crate::props::{AlarmProp, PropPatch, patch};
use crate::resource::{Resource, ServiceKind};

use super::{GroupingMode, ServiceProfile, no_overrides};

pub(super) fn profile() -> ServiceProfile {
    ServiceProfile {
        kind: ServiceKind::StateMachine,
        namespace: "AWS/States",
        dimension_key: "StateMachineArn",
        section_title: "States",
        default_metrics: &["ExecutionsFailed", "ExecutionThrottled", "ExecutionTime"],
        dashboard_metrics: Some(&["ExecutionTime"]),
        supported_metrics: vec![
            ("ExecutionsStarted", PropPatch::new()),
            ("ExecutionThrottled", PropPatch::new()),
            ("ExecutionsAborted", PropPatch::new()),
            ("ExecutionsSucceeded", PropPatch::new()),
            ("ExecutionsFailed", PropPatch::new()),
            ("ExecutionsTimedOut", PropPatch::new()),
            ("ExecutionTime", PropPatch::new()),
        ],
        default_alarm_props: patch([(AlarmProp::Statistic, "Sum".into())]),
        grouping: GroupingMode::ByResource,
        period_floor: None,
        floor_exempt: None,
        resource_defaults: None,
        dashboard_series_options: no_overrides,
        dashboard_metric_properties: no_overrides,
        dashboard_widget_overrides: widget_overrides,
        group_extra_widgets: None,
        resource_extra_widgets: Some(resource_extra_widgets),
    }
}

fn widget_overrides(metric: &str) -> Option<Value> {
    match metric {
        "ExecutionTime" => Some(json!({ "width": 24, "height": 6 })),
        _ => None,
    }
}

fn resource_extra_widgets(
    config: &EngineConfig,
    resource: &Resource,
) -> (Vec<Widget>, Vec<Widget>) {
    let region = &config.region;
    let arn = &resource.cloudwatch_dimension_id;

    let status = Widget::metric(
        6,
        Some(4),
        json!({
            "metrics": [
                [{ "expression": "m1-m2-m3-m4-m5-m6", "label": "Running", "id": "e3",
                   "period": 86400, "region": region }],
                [{ "expression": "m1/m5", "label": "Success Rate", "id": "e1", "yAxis": "left",
                   "period": 86400, "region": region, "visible": false }],
                [ "AWS/States", "ExecutionsStarted", "StateMachineArn", arn,
                  { "id": "m1", "label": "Started Today", "visible": false } ],
                [ ".", "ExecutionsTimedOut", ".", ".", { "id": "m2", "visible": false } ],
                [ ".", "ExecutionThrottled", ".", ".", { "id": "m3", "visible": false } ],
                [ ".", "ExecutionsAborted", ".", ".", { "id": "m4", "visible": false } ],
                [ ".", "ExecutionsSucceeded", ".", ".", { "id": "m5", "visible": false } ],
                [ ".", "ExecutionsFailed", ".", ".", { "id": "m6", "visible": false } ]
            ],
            "view": "singleValue",
            "region": region,
            "setPeriodToTimeRange": false,
            "stat": "Sum",
            "period": 86400,
            "title": "Status"
        }),
    );

    let activity = Widget::metric(
        12,
        Some(4),
        json!({
            "metrics": [
                [{ "expression": "m1-m2-m3-m4-m5-m6", "label": "Running", "id": "e3",
                   "period": 86400, "region": region, "visible": false }],
                [{ "expression": "(m5/m1)*100", "label": "Success Rate", "id": "e1",
                   "yAxis": "left", "period": 86400, "region": region, "color": "#c7c7c7" }],
                [{ "expression": "FLOOR(METRICS())", "label": "Expression2", "id": "e2",
                   "visible": false, "color": "#1f77b4" }],
                [ "AWS/States", "ExecutionsStarted", "StateMachineArn", arn,
                  { "id": "m1", "label": "Started", "color": "#1f77b4", "visible": false } ],
                [ ".", "ExecutionsTimedOut", ".", ".", { "id": "m2", "visible": false } ],
                [ ".", "ExecutionThrottled", ".", ".", { "id": "m3", "visible": false } ],
                [ ".", "ExecutionsAborted", ".", ".", { "id": "m4", "visible": false } ],
                [ ".", "ExecutionsSucceeded", ".", ".", { "id": "m5", "color": "#2ca02c", "label": "Succeeded" } ],
                [ ".", "ExecutionsFailed", ".", ".", { "id": "m6", "label": "Failed", "color": "#d62728" } ]
            ],
            "view": "singleValue",
            "region": region,
            "stat": "Sum",
            "setPeriodToTimeRange": false,
            "period": 86400,
            "title": "Activity Last 24 hrs"
        }),
    );

    let results = Widget::metric(
        6,
        Some(4),
        json!({
            "metrics": [
                [ "AWS/States", "ExecutionsTimedOut", "StateMachineArn", arn ],
                [ ".", "ExecutionThrottled", ".", "." ],
                [ ".", "ExecutionsAborted", ".", "." ],
                [ ".", "ExecutionsSucceeded", ".", "." ],
                [ ".", "ExecutionsFailed", ".", "." ]
            ],
            "view": "pie",
            "region": region,
            "stat": "Sum",
            "period": 300,
            "title": "Execution Results",
            "legend": { "position": "right" },
            "labels": { "visible": false },
            "stacked": false,
            "setPeriodToTimeRange": true
        }),
    );

    (vec![status, activity, results], Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_time_widget_spans_the_full_row() {
        let over = widget_overrides("ExecutionTime").unwrap();
        assert_eq!(over["width"], 24);
        assert!(widget_overrides("ExecutionsFailed").is_none());
    }

    #[test]
    fn extra_widgets_go_in_front() {
        let config = EngineConfig::new("us-west-2", "arn:aws:sns:us-west-2:1:alerts");
        let resource = Resource {
            service: ServiceKind::StateMachine,
            unique_id: "orders-flow".into(),
            name: "orders-flow".into(),
            owner: "cloudwedge".into(),
            cloudwatch_dimension_id:
                "arn:aws:states:us-west-2:123456789012:stateMachine:orders-flow".into(),
            tags: Vec::new(),
            attributes: Default::default(),
        };

        let (front, back) = resource_extra_widgets(&config, &resource);
        assert_eq!(front.len(), 3);
        assert!(back.is_empty());
        assert_eq!(front[0].properties["title"], "Status");
        assert_eq!(front[2].properties["view"], "pie");
    }
}
