//! Tag resolution.
//!
//! Tags are the sole configuration surface of the engine, and they are
//! arbitrary user input: unordered, free-form, frequently wrong. Every
//! function in this module is pure and lenient. A malformed directive is
//! skipped, never an error, because a typo on one resource must not take
//! down a whole compilation run.
//!
//! The reserved key family:
//!
//! - `cloudwedge:owner` - grouping key, compared case-insensitively
//! - `cloudwedge:level` - implicit alert level (`critical|high|medium|low`)
//! - `cloudwedge:metrics` - `|`-delimited metric list at the implicit level
//! - `cloudwedge:metrics:<level>` - explicit per-level metric lists
//! - `cloudwedge:alarm:prop:<Name>` - root property override
//! - `cloudwedge:alarm:metric:<Metric>:prop:<Name>` - per-metric override

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::props::{AlarmProp, PropPatch, PropValue};
use crate::resource::Tag;

/// Opt-in marker checked by the discovery collaborator, not the engine.
pub const TAG_ACTIVE: &str = "cloudwedge:active";
/// Owner name for grouping.
pub const TAG_OWNER: &str = "cloudwedge:owner";
/// Implicit alert level for the resource.
pub const TAG_LEVEL: &str = "cloudwedge:level";
/// Metric list assigned to the resource's implicit level.
pub const TAG_METRICS: &str = "cloudwedge:metrics";
/// Root alarm property override prefix.
pub const TAG_ALARM_PROP_PREFIX: &str = "cloudwedge:alarm:prop:";
/// Per-metric alarm property override prefix.
pub const TAG_ALARM_METRIC_PREFIX: &str = "cloudwedge:alarm:metric:";

/// Marker tag placed on deployed stacks so triage can find them.
pub const TAG_STACK_ID_KEY: &str = "cloudwedge:stack";
/// Marker tag value for [`TAG_STACK_ID_KEY`].
pub const TAG_STACK_ID_VALUE: &str = "true";
/// Stack-type tag (`alarms` or `dashboard`) on deployed stacks.
pub const TAG_STACK_TYPE_KEY: &str = "cloudwedge:type";

/// Owner applied when no owner tag is present.
pub const DEFAULT_OWNER: &str = "cloudwedge";

static METRIC_PROP_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^cloudwedge:alarm:metric:(.+?):prop:(.+)$").expect("metric prop key regex is valid")
});

/// Alert levels, highest precedence first.
///
/// A metric listed under more than one level belongs to the highest one;
/// the declaration order here is what "highest" means everywhere else.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl AlertLevel {
    /// All levels in descending precedence.
    #[must_use]
    pub const fn descending() -> &'static [Self] {
        &[Self::Critical, Self::High, Self::Medium, Self::Low]
    }

    /// Tag value spelling for the level.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// The dedicated per-level metrics tag key.
    #[must_use]
    pub const fn metrics_tag_key(&self) -> &'static str {
        match self {
            Self::Critical => "cloudwedge:metrics:critical",
            Self::High => "cloudwedge:metrics:high",
            Self::Medium => "cloudwedge:metrics:medium",
            Self::Low => "cloudwedge:metrics:low",
        }
    }

    /// Exact-match parse of a tag value. Level values are case-sensitive.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::descending()
            .iter()
            .copied()
            .find(|level| level.as_str() == value)
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metric sets per level after cross-level deduplication.
pub type MetricsByLevel = BTreeMap<AlertLevel, BTreeSet<String>>;

/// First tag with an exactly matching key.
#[must_use]
pub fn tag_value<'a>(tags: &'a [Tag], key: &str) -> Option<&'a str> {
    tags.iter()
        .find(|tag| tag.key == key)
        .map(|tag| tag.value.as_str())
}

/// Owner directive, or the default owner constant.
#[must_use]
pub fn owner_of(tags: &[Tag]) -> &str {
    tag_value(tags, TAG_OWNER).unwrap_or(DEFAULT_OWNER)
}

/// Implicit alert level. Missing or unrecognized values mean `medium`.
#[must_use]
pub fn level_of(tags: &[Tag]) -> AlertLevel {
    tag_value(tags, TAG_LEVEL)
        .and_then(AlertLevel::parse)
        .unwrap_or(AlertLevel::Medium)
}

/// Metric list from one tag key: `|`-delimited, whitespace-insignificant,
/// duplicates collapsed. An absent tag yields the empty set.
#[must_use]
pub fn metrics_for_level(tags: &[Tag], tag_key: &str) -> BTreeSet<String> {
    let Some(raw) = tag_value(tags, tag_key) else {
        return BTreeSet::new();
    };

    raw.split('|')
        .map(|token| token.split_whitespace().collect::<String>())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Resolve the explicit and dynamic metric directives into one set per
/// level, deduplicated across levels.
///
/// The generic [`TAG_METRICS`] list joins the implicit level's set first;
/// then, walking levels in descending precedence, any metric already
/// claimed by a higher level is removed from the lower ones. A metric's
/// effective level is therefore the highest level that ever listed it.
///
/// The returned flag is `true` iff any metric was listed at all; callers
/// use `false` to fall back to service default metrics.
#[must_use]
pub fn resolve_metrics_by_level(tags: &[Tag]) -> (bool, MetricsByLevel) {
    let mut sets: MetricsByLevel = AlertLevel::descending()
        .iter()
        .map(|level| (*level, metrics_for_level(tags, level.metrics_tag_key())))
        .collect();

    // The catch-all list inherits the resource's implicit level.
    let dynamic = metrics_for_level(tags, TAG_METRICS);
    if !dynamic.is_empty() {
        sets.entry(level_of(tags)).or_default().extend(dynamic);
    }

    let mut claimed: BTreeSet<String> = BTreeSet::new();
    for level in AlertLevel::descending() {
        let set = sets.entry(*level).or_default();
        set.retain(|metric| !claimed.contains(metric));
        claimed.extend(set.iter().cloned());
    }

    (!claimed.is_empty(), sets)
}

/// Root property overrides: every `cloudwedge:alarm:prop:<Name>` tag whose
/// suffix names a whitelisted property. Unrecognized suffixes are ignored.
#[must_use]
pub fn prop_overrides_root(tags: &[Tag]) -> PropPatch {
    let mut overrides = PropPatch::new();

    for tag in tags {
        let Some(suffix) = tag.key.strip_prefix(TAG_ALARM_PROP_PREFIX) else {
            continue;
        };
        if let Some(prop) = AlarmProp::parse_insensitive(suffix) {
            overrides.insert(prop, PropValue::Text(tag.value.clone()));
        }
    }

    overrides
}

/// Per-metric property overrides for one target metric.
///
/// Matches `cloudwedge:alarm:metric:<Metric>:prop:<Name>` tags where the
/// metric token equals the target under [`normalize_metric`], then applies
/// the same property whitelist as the root overrides.
#[must_use]
pub fn prop_overrides_for_metric(tags: &[Tag], metric: &str) -> PropPatch {
    let target = normalize_metric(metric);
    let mut overrides = PropPatch::new();

    for tag in tags {
        let Some(captures) = METRIC_PROP_KEY.captures(&tag.key) else {
            continue;
        };
        if normalize_metric(&captures[1]) != target {
            continue;
        }
        if let Some(prop) = AlarmProp::parse_insensitive(&captures[2]) {
            overrides.insert(prop, PropValue::Text(tag.value.clone()));
        }
    }

    overrides
}

/// Normalize a metric name for matching: lowercase, underscores and
/// hyphens stripped. `Status_Check-Failed` and `statuscheckfailed` compare
/// equal; nothing else is folded.
#[must_use]
pub fn normalize_metric(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(key: &str, value: &str) -> Tag {
        Tag::new(key, value)
    }

    #[test]
    fn owner_falls_back_to_default() {
        assert_eq!(owner_of(&[]), DEFAULT_OWNER);
        assert_eq!(owner_of(&[tag(TAG_OWNER, "team-x")]), "team-x");
    }

    #[test]
    fn level_falls_back_on_unknown_values() {
        assert_eq!(level_of(&[]), AlertLevel::Medium);
        assert_eq!(level_of(&[tag(TAG_LEVEL, "critical")]), AlertLevel::Critical);
        // Level values are case-sensitive; near-misses mean the default.
        assert_eq!(level_of(&[tag(TAG_LEVEL, "Critical")]), AlertLevel::Medium);
        assert_eq!(level_of(&[tag(TAG_LEVEL, "severe")]), AlertLevel::Medium);
    }

    #[test]
    fn metric_list_splits_trims_and_dedupes() {
        let tags = [tag(
            TAG_METRICS,
            " CPUUtilization | NetworkIn |CPUUtilization| ",
        )];
        let metrics = metrics_for_level(&tags, TAG_METRICS);
        assert_eq!(
            metrics,
            BTreeSet::from(["CPUUtilization".to_string(), "NetworkIn".to_string()])
        );
    }

    #[test]
    fn higher_level_claims_shared_metric() {
        let tags = [
            tag("cloudwedge:metrics:critical", "CPUUtilization | NetworkIn"),
            tag("cloudwedge:metrics:low", "CPUUtilization | DiskWriteOps"),
        ];

        let (has_any, by_level) = resolve_metrics_by_level(&tags);

        assert!(has_any);
        assert!(by_level[&AlertLevel::Critical].contains("CPUUtilization"));
        assert!(!by_level[&AlertLevel::Low].contains("CPUUtilization"));
        assert!(by_level[&AlertLevel::Low].contains("DiskWriteOps"));
    }

    #[test]
    fn dynamic_metrics_union_before_cross_level_dedup() {
        // NetworkIn is listed both at critical and in the generic list; the
        // generic list lands on the implicit level (medium here) and then
        // loses the dedup to critical.
        let tags = [
            tag("cloudwedge:metrics:critical", "CPUUtilization | NetworkIn"),
            tag(TAG_METRICS, "NetworkIn"),
        ];

        let (_, by_level) = resolve_metrics_by_level(&tags);

        assert!(by_level[&AlertLevel::Critical].contains("NetworkIn"));
        assert!(by_level[&AlertLevel::Medium].is_empty());
    }

    #[test]
    fn dynamic_metrics_follow_the_level_tag() {
        let tags = [
            tag(TAG_LEVEL, "high"),
            tag(TAG_METRICS, "FreeableMemory"),
        ];

        let (has_any, by_level) = resolve_metrics_by_level(&tags);

        assert!(has_any);
        assert!(by_level[&AlertLevel::High].contains("FreeableMemory"));
    }

    #[test]
    fn no_metric_tags_means_no_metrics() {
        let (has_any, by_level) = resolve_metrics_by_level(&[tag(TAG_LEVEL, "low")]);
        assert!(!has_any);
        assert!(by_level.values().all(BTreeSet::is_empty));
    }

    #[test]
    fn root_overrides_respect_the_whitelist() {
        let tags = [
            tag("cloudwedge:alarm:prop:Threshold", "95"),
            tag("cloudwedge:alarm:prop:statistic", "Sum"),
            tag("cloudwedge:alarm:prop:AlarmName", "nope"),
            tag("unrelated", "value"),
        ];

        let overrides = prop_overrides_root(&tags);

        assert_eq!(overrides.len(), 2);
        assert_eq!(
            overrides.get(&AlarmProp::Threshold),
            Some(&PropValue::Text("95".into()))
        );
        assert_eq!(
            overrides.get(&AlarmProp::Statistic),
            Some(&PropValue::Text("Sum".into()))
        );
    }

    #[test]
    fn metric_overrides_match_loosely_on_the_metric_token() {
        let tags = [
            tag(
                "cloudwedge:alarm:metric:status_check_failed-instance:prop:Threshold",
                "2",
            ),
            tag(
                "cloudwedge:alarm:metric:CPUUtilization:prop:Threshold",
                "95",
            ),
        ];

        let overrides = prop_overrides_for_metric(&tags, "StatusCheckFailed_Instance");
        assert_eq!(
            overrides.get(&AlarmProp::Threshold),
            Some(&PropValue::Text("2".into()))
        );

        // The CPUUtilization override must not bleed onto other metrics.
        let unrelated = prop_overrides_for_metric(&tags, "NetworkIn");
        assert!(unrelated.is_empty());
    }

    #[test]
    fn malformed_override_keys_are_ignored() {
        let tags = [
            tag("cloudwedge:alarm:metric:CPUUtilization", "orphan"),
            tag("cloudwedge:alarm:metric::prop:Threshold", "90"),
            tag("cloudwedge:alarm:metric:CPUUtilization:prop:Bogus", "1"),
        ];

        assert!(prop_overrides_for_metric(&tags, "CPUUtilization").is_empty());
    }

    #[test]
    fn normalize_metric_folds_case_and_separators() {
        assert_eq!(normalize_metric("StatusCheckFailed_System"), "statuscheckfailedsystem");
        assert_eq!(normalize_metric("status-check-failed_system"), "statuscheckfailedsystem");
        assert_eq!(normalize_metric("5XXError"), "5xxerror");
    }
}
