//! Engine configuration.
//!
//! The engine itself is pure; the few environment-shaped values it needs
//! (target region for dashboard widgets, the notification topic alarms
//! point at) are constructed once by the caller and passed in. There are
//! no process-wide globals to reach for.

use serde::{Deserialize, Serialize};

/// Caller-supplied settings threaded through compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Region stamped into dashboard widget properties.
    pub region: String,

    /// SNS topic ARN every synthesized alarm notifies.
    pub alarm_topic_arn: String,
}

impl EngineConfig {
    /// Configuration for a target region and alarm topic.
    pub fn new(region: impl Into<String>, alarm_topic_arn: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            alarm_topic_arn: alarm_topic_arn.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_json() {
        let config = EngineConfig::new("us-west-2", "arn:aws:sns:us-west-2:123456789012:alerts");
        let encoded = serde_json::to_string(&config).unwrap();
        let decoded: EngineConfig = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, config);
    }
}
