//! SQS queue profile.
//!
//! Queues read better one resource at a time: a row of single-value gauges
//! (in queue, in flight, oldest age) followed by the send-rate chart, with
//! a rolling added-vs-queued comparison appended at the back.

use serde_json::{Value, json};

use crate::config::EngineConfig;
use crate::dashboard::Widget;
use crate::props::{AlarmProp, PropPatch, patch};
use crate::resource::{Resource, ServiceKind};

use super::{GroupingMode, ServiceProfile};

pub(super) fn profile() -> ServiceProfile {
    ServiceProfile {
        kind: ServiceKind::Sqs,
        namespace: "AWS/SQS",
        dimension_key: "QueueName",
        section_title: "SQS",
        default_metrics: &["ApproximateAgeOfOldestMessage", "NumberOfMessagesSent"],
        dashboard_metrics: Some(&[
            "ApproximateNumberOfMessagesVisible",
            "ApproximateNumberOfMessagesNotVisible",
            "ApproximateAgeOfOldestMessage",
        ]),
        supported_metrics: vec![
            ("ApproximateNumberOfMessagesVisible", PropPatch::new()),
            ("ApproximateNumberOfMessagesNotVisible", PropPatch::new()),
            (
                "ApproximateAgeOfOldestMessage",
                patch([
                    // A day on the queue means nothing is draining it.
                    (AlarmProp::Threshold, (3600 * 24).into()),
                    (
                        AlarmProp::ComparisonOperator,
                        "GreaterThanOrEqualToThreshold".into(),
                    ),
                ]),
            ),
            (
                "NumberOfMessagesSent",
                patch([
                    (AlarmProp::Threshold, 0.into()),
                    (
                        AlarmProp::ComparisonOperator,
                        "LessThanOrEqualToThreshold".into(),
                    ),
                ]),
            ),
        ],
        default_alarm_props: patch([
            (AlarmProp::EvaluationPeriods, 6.into()),
            (AlarmProp::Statistic, "Sum".into()),
            (AlarmProp::Period, 3600.into()),
        ]),
        grouping: GroupingMode::ByResource,
        period_floor: None,
        floor_exempt: None,
        resource_defaults: None,
        dashboard_series_options: series_options,
        dashboard_metric_properties: metric_properties,
        dashboard_widget_overrides: widget_overrides,
        group_extra_widgets: None,
        resource_extra_widgets: Some(resource_extra_widgets),
    }
}

fn series_options(metric: &str) -> Option<Value> {
    match metric {
        "NumberOfMessagesSent" => Some(json!({ "stat": "Sum" })),
        "ApproximateNumberOfMessagesVisible"
        | "ApproximateNumberOfMessagesNotVisible"
        | "ApproximateAgeOfOldestMessage" => {
            Some(json!({ "label": "Last 1 Min", "stat": "Sum" }))
        },
        _ => None,
    }
}

fn metric_properties(metric: &str) -> Option<Value> {
    match metric {
        "ApproximateNumberOfMessagesVisible" => Some(json!({
            "view": "singleValue", "period": 60, "title": "In Queue"
        })),
        "ApproximateNumberOfMessagesNotVisible" => Some(json!({
            "view": "singleValue", "period": 60, "title": "In flight"
        })),
        "ApproximateAgeOfOldestMessage" => Some(json!({
            "view": "singleValue", "period": 60, "title": "Oldest message age"
        })),
        _ => None,
    }
}

fn widget_overrides(metric: &str) -> Option<Value> {
    match metric {
        "NumberOfMessagesSent" => Some(json!({ "width": 24, "height": 6 })),
        "ApproximateNumberOfMessagesVisible"
        | "ApproximateNumberOfMessagesNotVisible"
        | "ApproximateAgeOfOldestMessage" => Some(json!({ "width": 8, "height": 3 })),
        _ => None,
    }
}

fn resource_extra_widgets(
    config: &EngineConfig,
    resource: &Resource,
) -> (Vec<Widget>, Vec<Widget>) {
    let queue = &resource.cloudwatch_dimension_id;

    let rolling = Widget::metric(
        24,
        Some(6),
        json!({
            "metrics": [
                [ "AWS/SQS", "NumberOfMessagesSent", "QueueName", queue,
                  { "stat": "Sum", "label": "Records Added (Interval @ 5 Min Sum)" } ],
                [ "...", queue,
                  { "stat": "Maximum", "label": "In Queue (Interval @ 5 Min Max)" } ]
            ],
            "period": 360,
            "view": "timeSeries",
            "title": "Records Added vs In Queue Rolling",
            "region": config.region
        }),
    );

    (Vec::new(), vec![rolling])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gauges_render_as_single_value_tiles() {
        let props = metric_properties("ApproximateNumberOfMessagesVisible").unwrap();
        assert_eq!(props["view"], "singleValue");
        assert_eq!(props["title"], "In Queue");

        let over = widget_overrides("ApproximateNumberOfMessagesVisible").unwrap();
        assert_eq!(over["width"], 8);
        assert_eq!(over["height"], 3);
    }

    #[test]
    fn rolling_comparison_lands_at_the_back() {
        let config = EngineConfig::new("us-west-2", "arn:aws:sns:us-west-2:1:alerts");
        let resource = Resource {
            service: ServiceKind::Sqs,
            unique_id: "billing-dlq".into(),
            name: "billing-dlq".into(),
            owner: "cloudwedge".into(),
            cloudwatch_dimension_id: "billing-dlq".into(),
            tags: Vec::new(),
            attributes: Default::default(),
        };

        let (front, back) = resource_extra_widgets(&config, &resource);
        assert!(front.is_empty());
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].properties["period"], 360);
    }
}
