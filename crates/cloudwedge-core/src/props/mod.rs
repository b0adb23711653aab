//! Alarm property model and the layered merge.
//!
//! Alarm configuration is assembled from up to six partial layers (universal
//! defaults, service defaults, metric defaults, resource-derived defaults,
//! root tag overrides, per-metric tag overrides). Each layer is a
//! [`PropPatch`]: a sparse map that only sets the keys it cares about.
//! [`merge_layers`] folds a fixed-order slice of layers left to right, so
//! precedence lives in exactly one place and can be tested in isolation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The alarm properties that tags are allowed to set.
///
/// Anything outside this whitelist in a property-override tag is ignored.
/// Variant names double as the CloudFormation property names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[non_exhaustive]
pub enum AlarmProp {
    Statistic,
    Period,
    TreatMissingData,
    EvaluationPeriods,
    Threshold,
    ComparisonOperator,
}

impl AlarmProp {
    /// Every whitelisted property.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Statistic,
            Self::Period,
            Self::TreatMissingData,
            Self::EvaluationPeriods,
            Self::Threshold,
            Self::ComparisonOperator,
        ]
    }

    /// The CloudFormation property name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Statistic => "Statistic",
            Self::Period => "Period",
            Self::TreatMissingData => "TreatMissingData",
            Self::EvaluationPeriods => "EvaluationPeriods",
            Self::Threshold => "Threshold",
            Self::ComparisonOperator => "ComparisonOperator",
        }
    }

    /// Case-insensitive lookup, used when resolving tag key suffixes.
    /// Returns `None` for names outside the whitelist.
    #[must_use]
    pub fn parse_insensitive(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|prop| prop.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for AlarmProp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A property value as it flows through the merge.
///
/// Catalog defaults are typed numbers; tag overrides arrive as text. The
/// untagged representation serializes either form straight into template
/// JSON, which accepts both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl PropValue {
    /// Numeric view of the value, parsing text if necessary.
    ///
    /// Floats only qualify when they carry no fractional part; a threshold
    /// of `99.5` is a legitimate value but never a legitimate period.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            #[allow(clippy::cast_possible_truncation)] // fract() == 0.0 checked first
            Self::Float(value) if value.fract() == 0.0 => Some(*value as i64),
            Self::Float(_) => None,
            Self::Text(value) => value.trim().parse().ok(),
        }
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// A sparse set of alarm properties. One configuration layer.
pub type PropPatch = BTreeMap<AlarmProp, PropValue>;

/// Fold layers left to right, later layers overwriting earlier ones.
///
/// Keys a layer does not set pass through unchanged, so a patch that only
/// sets `Threshold` never disturbs an inherited `Period`.
#[must_use]
pub fn merge_layers(layers: &[&PropPatch]) -> PropPatch {
    let mut merged = PropPatch::new();
    for layer in layers {
        for (prop, value) in layer.iter() {
            merged.insert(*prop, value.clone());
        }
    }
    merged
}

/// Build a patch from `(prop, value)` pairs. Keeps catalog tables terse.
#[must_use]
pub fn patch(entries: impl IntoIterator<Item = (AlarmProp, PropValue)>) -> PropPatch {
    entries.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_insensitive_accepts_any_casing() {
        assert_eq!(
            AlarmProp::parse_insensitive("threshold"),
            Some(AlarmProp::Threshold)
        );
        assert_eq!(
            AlarmProp::parse_insensitive("EVALUATIONPERIODS"),
            Some(AlarmProp::EvaluationPeriods)
        );
        assert_eq!(AlarmProp::parse_insensitive("AlarmActions"), None);
        assert_eq!(AlarmProp::parse_insensitive(""), None);
    }

    #[test]
    fn merge_later_layers_win_per_key() {
        let base = patch([
            (AlarmProp::Threshold, 99.into()),
            (AlarmProp::Period, 300.into()),
        ]);
        let override_layer = patch([(AlarmProp::Threshold, "85".into())]);

        let merged = merge_layers(&[&base, &override_layer]);

        assert_eq!(
            merged.get(&AlarmProp::Threshold),
            Some(&PropValue::Text("85".into()))
        );
        // Untouched key survives from the earlier layer.
        assert_eq!(merged.get(&AlarmProp::Period), Some(&PropValue::Int(300)));
    }

    #[test]
    fn merge_of_empty_layers_is_empty() {
        let empty = PropPatch::new();
        assert!(merge_layers(&[&empty, &empty]).is_empty());
        assert!(merge_layers(&[]).is_empty());
    }

    #[test]
    fn as_i64_parses_text_and_rejects_fractions() {
        assert_eq!(PropValue::Int(300).as_i64(), Some(300));
        assert_eq!(PropValue::Text(" 45 ".into()).as_i64(), Some(45));
        assert_eq!(PropValue::Float(60.0).as_i64(), Some(60));
        assert_eq!(PropValue::Float(60.5).as_i64(), None);
        assert_eq!(PropValue::Text("five".into()).as_i64(), None);
    }

    #[test]
    fn prop_value_serializes_untagged() {
        assert_eq!(serde_json::to_string(&PropValue::Int(5)).unwrap(), "5");
        assert_eq!(
            serde_json::to_string(&PropValue::Text("Sum".into())).unwrap(),
            "\"Sum\""
        );
    }
}
