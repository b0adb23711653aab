//! API Gateway REST API profile.

use crate::props::{AlarmProp, PropPatch, patch};
use crate::resource::ServiceKind;

use super::{GroupingMode, ServiceProfile, no_overrides};

pub(super) fn profile() -> ServiceProfile {
    ServiceProfile {
        kind: ServiceKind::ApiGateway,
        namespace: "AWS/ApiGateway",
        dimension_key: "ApiName",
        section_title: "Api Gateway",
        default_metrics: &["Latency", "IntegrationLatency", "5XXError", "4XXError"],
        dashboard_metrics: None,
        supported_metrics: vec![
            ("Latency", PropPatch::new()),
            ("IntegrationLatency", PropPatch::new()),
            ("5XXError", PropPatch::new()),
            ("4XXError", PropPatch::new()),
        ],
        default_alarm_props: patch([(AlarmProp::Statistic, "Sum".into())]),
        grouping: GroupingMode::ByMetric,
        period_floor: None,
        floor_exempt: None,
        resource_defaults: None,
        dashboard_series_options: no_overrides,
        dashboard_metric_properties: no_overrides,
        dashboard_widget_overrides: no_overrides,
        group_extra_widgets: None,
        resource_extra_widgets: None,
    }
}
