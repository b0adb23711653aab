//! Alarm description parsing and notification subjects.
//!
//! Fired alarms come back to the notification pipeline carrying the
//! `Key=Value ` description string the compiler wrote. The regexes here
//! anchor on those exact key names; together with the composer in
//! [`crate::alarm`] they pin both halves of the contract, trailing spaces
//! included.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Notification subjects are capped at 100 characters by the transport.
const SUBJECT_MAX_LEN: usize = 100;

static RE_RESOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Resource=([\w\-]+)").expect("resource regex is valid"));
static RE_METRIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Metric=([\w\-]+)").expect("metric regex is valid"));
static RE_LEVEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Level=(\w+)").expect("level regex is valid"));
static RE_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Type=([\w\-/]+)").expect("type regex is valid"));
static RE_OWNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Owner=(\w+)").expect("owner regex is valid"));

/// The structured fields recovered from an alarm description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmDescriptionFields {
    pub resource: String,
    pub metric: String,
    pub level: String,
    /// CloudWatch namespace, e.g. `AWS/EC2`.
    pub namespace: String,
    pub owner: String,
}

/// Description parse failure.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum AlertParseError {
    /// A required `Key=Value` token was missing or unreadable.
    #[error("alarm description is missing the {0} token")]
    MissingToken(&'static str),
}

fn capture(
    regex: &Regex,
    description: &str,
    token: &'static str,
) -> Result<String, AlertParseError> {
    regex
        .captures(description)
        .map(|captures| captures[1].to_string())
        .ok_or(AlertParseError::MissingToken(token))
}

/// Parse the `Key=Value ` description string back into fields.
///
/// # Errors
///
/// Returns [`AlertParseError::MissingToken`] when any of the five
/// expected tokens cannot be found.
pub fn parse_description(description: &str) -> Result<AlarmDescriptionFields, AlertParseError> {
    Ok(AlarmDescriptionFields {
        resource: capture(&RE_RESOURCE, description, "Resource")?,
        metric: capture(&RE_METRIC, description, "Metric")?,
        level: capture(&RE_LEVEL, description, "Level")?,
        namespace: capture(&RE_TYPE, description, "Type")?,
        owner: capture(&RE_OWNER, description, "Owner")?,
    })
}

/// Compose the notification subject line for a fired alarm.
///
/// Shaped like `Critical ALARM on EC2 for web-1 CPUUtilization threshold
/// 95`, truncated with a trailing ellipsis when it would exceed the
/// transport's 100-character cap.
#[must_use]
pub fn notification_subject(
    state: &str,
    level: &str,
    namespace: &str,
    resource: &str,
    metric: &str,
    threshold: &str,
) -> String {
    // "AWS/ElasticBeanstalk" reads better as "ElasticBeanstalk".
    let service = namespace.rsplit('/').next().unwrap_or(namespace);

    let level = capitalize(level);
    let subject = format!("{level} {state} on {service} for {resource} {metric} threshold {threshold}");

    if subject.len() > SUBJECT_MAX_LEN - 2 {
        let truncated: String = subject.chars().take(SUBJECT_MAX_LEN - 4).collect();
        format!("{truncated}..")
    } else {
        subject
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTION: &str =
        "Resource=web-1 Metric=CPUUtilization Level=medium Type=AWS/EC2 Owner=cloudwedge ";

    #[test]
    fn parses_every_token() {
        let fields = parse_description(DESCRIPTION).unwrap();
        assert_eq!(fields.resource, "web-1");
        assert_eq!(fields.metric, "CPUUtilization");
        assert_eq!(fields.level, "medium");
        assert_eq!(fields.namespace, "AWS/EC2");
        assert_eq!(fields.owner, "cloudwedge");
    }

    #[test]
    fn missing_token_is_an_error() {
        let err = parse_description("Resource=web-1 Metric=CPUUtilization ").unwrap_err();
        assert_eq!(err, AlertParseError::MissingToken("Level"));
    }

    #[test]
    fn subject_reads_like_a_sentence() {
        let subject =
            notification_subject("ALARM", "critical", "AWS/ElasticBeanstalk", "api", "5XXError", "90");
        assert_eq!(subject, "Critical ALARM on ElasticBeanstalk for api 5XXError threshold 90");
    }

    #[test]
    fn long_subjects_truncate_with_ellipsis() {
        let resource = "a".repeat(120);
        let subject =
            notification_subject("ALARM", "critical", "AWS/EC2", &resource, "CPUUtilization", "90");
        assert!(subject.len() <= SUBJECT_MAX_LEN);
        assert!(subject.ends_with(".."));
    }
}
