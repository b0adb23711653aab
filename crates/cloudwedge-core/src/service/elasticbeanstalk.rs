//! Elastic Beanstalk environment profile.

use crate::props::{AlarmProp, PropPatch, patch};
use crate::resource::ServiceKind;

use super::{GroupingMode, ServiceProfile, no_overrides};

pub(super) fn profile() -> ServiceProfile {
    ServiceProfile {
        kind: ServiceKind::ElasticBeanstalk,
        namespace: "AWS/ElasticBeanstalk",
        dimension_key: "EnvironmentName",
        section_title: "Elastic Beanstalk",
        default_metrics: &[
            "ApplicationRequests2xx",
            "ApplicationRequests3xx",
            "ApplicationRequests4xx",
            "ApplicationRequests5xx",
        ],
        dashboard_metrics: None,
        supported_metrics: vec![
            ("ApplicationRequests2xx", PropPatch::new()),
            ("ApplicationRequests3xx", PropPatch::new()),
            ("ApplicationRequests4xx", PropPatch::new()),
            ("ApplicationRequests5xx", PropPatch::new()),
        ],
        default_alarm_props: patch([(AlarmProp::Statistic, "Average".into())]),
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
