//! Dashboard widget layout.
//!
//! Each owner gets one dashboard: an owner header, then a section per
//! service. A service lays its resources out in one of two shapes:
//!
//! - **by metric**: one chart per display metric with every resource as a
//!   series. The first series entry carries the full
//!   `(namespace, metric, dimension key, dimension value)` tuple; later
//!   entries use the `"..."` shorthand and inherit the rest, which is how
//!   the dashboard body format deduplicates repeated series metadata.
//! - **by resource**: a header per resource, one chart per display metric
//!   scoped to it, optional service extras front or back, then a spacer.
//!
//! Overrides apply in a fixed order: series options inside each entry,
//! then metric property overrides on the chart, then widget-level layout
//! overrides on the envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::EngineConfig;
use crate::resource::{Resource, ResourcesByService};
use crate::service::{GroupingMode, ServiceProfile, ServiceRegistry};

/// Default chart width; two charts per dashboard row.
const METRIC_WIDGET_WIDTH: u64 = 12;
/// Full-row width for text widgets.
const FULL_ROW_WIDTH: u64 = 24;

/// One dashboard widget in the CloudWatch dashboard body shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    #[serde(rename = "type")]
    pub widget_type: String,

    pub width: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,

    /// Widget-type-specific properties, passed through verbatim.
    pub properties: Value,
}

impl Widget {
    /// A markdown text widget.
    #[must_use]
    pub fn text(width: u64, height: u64, markdown: impl Into<String>) -> Self {
        Self {
            widget_type: "text".to_string(),
            width,
            height: Some(height),
            properties: json!({ "markdown": markdown.into() }),
        }
    }

    /// A metric chart widget.
    #[must_use]
    pub fn metric(width: u64, height: Option<u64>, properties: Value) -> Self {
        Self {
            widget_type: "metric".to_string(),
            width,
            height,
            properties,
        }
    }

    /// Apply a widget-level layout override (`width`/`height` keys).
    fn apply_layout_override(&mut self, patch: &Value) {
        if let Some(width) = patch.get("width").and_then(Value::as_u64) {
            self.width = width;
        }
        if let Some(height) = patch.get("height").and_then(Value::as_u64) {
            self.height = Some(height);
        }
    }
}

/// The full widget list for one owner's dashboard.
#[must_use]
pub fn owner_widgets(
    config: &EngineConfig,
    owner: &str,
    services: &ResourcesByService,
) -> Vec<Widget> {
    let mut widgets = vec![Widget::text(
        FULL_ROW_WIDTH,
        2,
        format!("# {owner}\n###### CREATED BY CLOUDWEDGE"),
    )];

    for (kind, resources) in services {
        if resources.is_empty() {
            continue;
        }
        let profile = ServiceRegistry::get(*kind);
        widgets.extend(service_widgets(config, profile, resources));
    }

    widgets
}

/// One service's dashboard section: header, profile-level extras, then the
/// widgets of the selected grouping strategy.
#[must_use]
pub fn service_widgets(
    config: &EngineConfig,
    profile: &ServiceProfile,
    resources: &[Resource],
) -> Vec<Widget> {
    let mut widgets = vec![Widget::text(
        FULL_ROW_WIDTH,
        1,
        format!("### **{} Resources**", profile.section_title),
    )];

    if let Some(extras) = profile.group_extra_widgets {
        widgets.extend(extras(config, resources));
    }

    match profile.grouping {
        GroupingMode::ByMetric => widgets.extend(by_metric_widgets(config, profile, resources)),
        GroupingMode::ByResource => {
            widgets.extend(by_resource_widgets(config, profile, resources));
        },
    }

    widgets
}

/// One chart per display metric, all resources charted as series.
fn by_metric_widgets(
    config: &EngineConfig,
    profile: &ServiceProfile,
    resources: &[Resource],
) -> Vec<Widget> {
    let mut widgets = Vec::new();

    for metric in profile.display_metrics() {
        let options = (profile.dashboard_series_options)(metric).unwrap_or_else(|| json!({}));

        let series: Vec<Value> = resources
            .iter()
            .enumerate()
            .map(|(index, resource)| {
                if index == 0 {
                    json!([
                        profile.namespace,
                        metric,
                        profile.dimension_key,
                        resource.cloudwatch_dimension_id,
                        options
                    ])
                } else {
                    json!(["...", resource.cloudwatch_dimension_id, options])
                }
            })
            .collect();

        widgets.push(metric_widget(config, profile, metric, series));
    }

    widgets
}

/// A header per resource, then one chart per display metric scoped to it.
fn by_resource_widgets(
    config: &EngineConfig,
    profile: &ServiceProfile,
    resources: &[Resource],
) -> Vec<Widget> {
    let mut widgets = Vec::new();

    for resource in resources {
        let mut run = vec![Widget::text(
            FULL_ROW_WIDTH,
            1,
            format!("# 🔼 {} :: **{}**", profile.section_title, resource.name),
        )];

        for metric in profile.display_metrics() {
            let options =
                (profile.dashboard_series_options)(metric).unwrap_or_else(|| json!({}));
            let series = vec![json!([
                profile.namespace,
                metric,
                profile.dimension_key,
                resource.cloudwatch_dimension_id,
                options
            ])];
            run.push(metric_widget(config, profile, metric, series));
        }

        if let Some(extras) = profile.resource_extra_widgets {
            let (front, back) = extras(config, resource);
            // Front extras slot in right behind the resource header.
            run.splice(1..1, front);
            run.extend(back);
        }

        run.push(Widget::text(FULL_ROW_WIDTH, 1, ""));

        widgets.extend(run);
    }

    widgets
}

/// Base chart shape plus the profile's metric and layout overrides.
fn metric_widget(
    config: &EngineConfig,
    profile: &ServiceProfile,
    metric: &str,
    series: Vec<Value>,
) -> Widget {
    let mut properties = json!({
        "metrics": series,
        "view": "timeSeries",
        "stacked": false,
        "region": config.region,
        "title": metric,
        "legend": { "position": "bottom" },
        "yAxis": {
            "left": { "label": "" },
            "right": { "label": "" }
        }
    });

    if let Some(patch) = (profile.dashboard_metric_properties)(metric) {
        merge_object(&mut properties, &patch);
    }

    let mut widget = Widget::metric(METRIC_WIDGET_WIDTH, None, properties);

    if let Some(patch) = (profile.dashboard_widget_overrides)(metric) {
        widget.apply_layout_override(&patch);
    }

    widget
}

/// Shallow top-level merge of one JSON object into another.
fn merge_object(base: &mut Value, patch: &Value) {
    if let (Some(base_map), Some(patch_map)) = (base.as_object_mut(), patch.as_object()) {
        for (key, value) in patch_map {
            base_map.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::resource::ServiceKind;

    fn config() -> EngineConfig {
        EngineConfig::new("us-west-2", "arn:aws:sns:us-west-2:1:alerts")
    }

    fn ec2_resource(id: &str) -> Resource {
        Resource {
            service: ServiceKind::Ec2,
            unique_id: id.to_string(),
            name: id.to_string(),
            owner: "cloudwedge".to_string(),
            cloudwatch_dimension_id: id.to_string(),
            tags: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    fn queue_resource(name: &str) -> Resource {
        Resource {
            service: ServiceKind::Sqs,
            unique_id: name.to_string(),
            name: name.to_string(),
            owner: "cloudwedge".to_string(),
            cloudwatch_dimension_id: name.to_string(),
            tags: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    #[test]
    fn by_metric_uses_shorthand_after_the_first_series() {
        let profile = ServiceRegistry::get(ServiceKind::Ec2);
        let resources = vec![ec2_resource("i-first"), ec2_resource("i-second")];

        let widgets = by_metric_widgets(&config(), profile, &resources);
        assert_eq!(widgets.len(), profile.default_metrics.len());

        let series = widgets[0].properties["metrics"].as_array().unwrap();
        assert_eq!(series[0][0], "AWS/EC2");
        assert_eq!(series[0][2], "InstanceId");
        assert_eq!(series[0][3], "i-first");
        assert_eq!(series[1][0], "...");
        assert_eq!(series[1][1], "i-second");
    }

    #[test]
    fn section_header_comes_first() {
        let profile = ServiceRegistry::get(ServiceKind::Ec2);
        let widgets = service_widgets(&config(), profile, &[ec2_resource("i-1")]);

        assert_eq!(widgets[0].widget_type, "text");
        assert_eq!(widgets[0].properties["markdown"], "### **EC2 Resources**");
    }

    #[test]
    fn metric_property_override_lands_on_the_chart() {
        let profile = ServiceRegistry::get(ServiceKind::Ec2);
        let widgets = by_metric_widgets(&config(), profile, &[ec2_resource("i-1")]);

        // CPUUtilization is the first display metric and carries the High
        // annotation from the profile.
        let cpu = &widgets[0];
        assert_eq!(cpu.properties["title"], "CPUUtilization");
        assert_eq!(cpu.properties["annotations"]["horizontal"][0]["label"], "High");
    }

    #[test]
    fn by_resource_layout_has_header_extras_and_spacer() {
        let profile = ServiceRegistry::get(ServiceKind::Sqs);
        let widgets = by_resource_widgets(&config(), profile, &[queue_resource("jobs")]);

        // Header, three display metrics, one back extra, spacer.
        assert_eq!(widgets.len(), 6);
        assert!(
            widgets[0].properties["markdown"]
                .as_str()
                .unwrap()
                .contains("jobs")
        );
        assert_eq!(
            widgets[4].properties["title"],
            "Records Added vs In Queue Rolling"
        );
        assert_eq!(widgets[5].properties["markdown"], "");
    }

    #[test]
    fn widget_layout_override_resizes_the_envelope() {
        let profile = ServiceRegistry::get(ServiceKind::Sqs);
        let widgets = by_resource_widgets(&config(), profile, &[queue_resource("jobs")]);

        // Gauges are 8x3 per the profile's widget overrides.
        assert_eq!(widgets[1].width, 8);
        assert_eq!(widgets[1].height, Some(3));
    }

    #[test]
    fn series_options_ride_inside_each_entry() {
        let profile = ServiceRegistry::get(ServiceKind::Sqs);
        let widgets = by_resource_widgets(&config(), profile, &[queue_resource("jobs")]);

        let series = widgets[1].properties["metrics"].as_array().unwrap();
        assert_eq!(series[0][4]["stat"], "Sum");
        assert_eq!(series[0][4]["label"], "Last 1 Min");
    }

    #[test]
    fn owner_widgets_start_with_the_owner_header() {
        let mut services: ResourcesByService = BTreeMap::new();
        services.insert(ServiceKind::Ec2, vec![ec2_resource("i-1")]);
        services.insert(ServiceKind::Sqs, Vec::new());

        let widgets = owner_widgets(&config(), "team-x", &services);

        assert!(
            widgets[0].properties["markdown"]
                .as_str()
                .unwrap()
                .starts_with("# team-x")
        );
        // The empty SQS group contributes nothing, not even a header.
        assert!(
            !widgets
                .iter()
                .any(|w| w.properties["markdown"] == "### **SQS Resources**")
        );
    }

    #[test]
    fn state_machine_front_extras_follow_the_resource_header() {
        let profile = ServiceRegistry::get(ServiceKind::StateMachine);
        let resource = Resource {
            service: ServiceKind::StateMachine,
            unique_id: "orders".to_string(),
            name: "orders".to_string(),
            owner: "cloudwedge".to_string(),
            cloudwatch_dimension_id: "arn:aws:states:us-west-2:1:stateMachine:orders".to_string(),
            tags: Vec::new(),
            attributes: BTreeMap::new(),
        };

        let widgets = by_resource_widgets(&config(), profile, &[resource]);

        // Header, then the three status extras, then ExecutionTime, spacer.
        assert_eq!(widgets.len(), 6);
        assert_eq!(widgets[1].properties["title"], "Status");
        assert_eq!(widgets[4].properties["title"], "ExecutionTime");
        // ExecutionTime is resized to a full row by the widget override.
        assert_eq!(widgets[4].width, 24);
    }
}
