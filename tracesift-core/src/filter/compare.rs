//! Scalar comparators: pure comparisons of item values against reference
//! values under a named comparison mode.

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde::de;
use serde::{Deserialize, Deserializer};

use super::error::{InvalidCondition, Result};

/// Compares a string value against a reference value.
///
/// The declarative form is a single-key mapping naming the mode, e.g.
/// `{contains: "safety"}` or `{in: [Draft, Review]}`. Exactly one mode per
/// comparator is enforced by the enum shape.
#[derive(Debug, Clone, Deserialize)]
pub enum StringCompare {
    /// Value contains the reference as a substring
    #[serde(rename = "contains")]
    Contains(String),

    /// Value does not contain the reference as a substring
    #[serde(rename = "does not contain")]
    DoesNotContain(String),

    /// Value equals the reference
    #[serde(rename = "is")]
    Is(String),

    /// Value differs from the reference
    #[serde(rename = "is not")]
    IsNot(String),

    /// Value is one of the reference values
    #[serde(rename = "in")]
    In(Vec<String>),

    /// Value is none of the reference values
    #[serde(rename = "not in")]
    NotIn(Vec<String>),

    /// A case-insensitive regex matches at the start of the value
    #[serde(rename = "matches")]
    Matches(#[serde(deserialize_with = "de_anchored_regex")] Regex),
}

impl StringCompare {
    /// Builds a `matches` comparator from a pattern string.
    pub fn matches_pattern(pattern: &str) -> std::result::Result<Self, regex::Error> {
        Ok(StringCompare::Matches(compile_anchored(pattern)?))
    }

    /// Evaluates the comparator against a string value.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            StringCompare::Contains(s) => value.contains(s.as_str()),
            StringCompare::DoesNotContain(s) => !value.contains(s.as_str()),
            StringCompare::Is(s) => value == s,
            StringCompare::IsNot(s) => value != s,
            StringCompare::In(set) => set.iter().any(|s| s == value),
            StringCompare::NotIn(set) => !set.iter().any(|s| s == value),
            StringCompare::Matches(re) => re.is_match(value),
        }
    }
}

/// Compiles a pattern for match-at-start semantics, case-insensitively.
fn compile_anchored(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(&format!("^(?:{})", pattern))
        .case_insensitive(true)
        .build()
}

fn de_anchored_regex<'de, D>(deserializer: D) -> std::result::Result<Regex, D::Error>
where
    D: Deserializer<'de>,
{
    let pattern = String::deserialize(deserializer)?;
    compile_anchored(&pattern).map_err(de::Error::custom)
}

/// Compares an integer value (a relationship count) against reference values.
///
/// Two mutually exclusive families: the equality family (`is`, `is not`,
/// `in`, `not in`), of which at most one mode may be given, and the ordering
/// family, which allows one lower and one upper bound. All configured
/// comparisons must hold, so a half-open range is written as
/// `{greater than: 1, less than: 5}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NumberCompare {
    /// Value equals the reference
    #[serde(rename = "is")]
    pub is: Option<i64>,

    /// Value differs from the reference
    #[serde(rename = "is not")]
    pub is_not: Option<i64>,

    /// Value is one of the reference values
    #[serde(rename = "in")]
    pub within: Option<Vec<i64>>,

    /// Value is none of the reference values
    #[serde(rename = "not in")]
    pub not_within: Option<Vec<i64>>,

    /// Value is strictly greater than the reference
    #[serde(rename = "greater than")]
    pub greater_than: Option<i64>,

    /// Value is greater than or equal to the reference
    #[serde(rename = "greater than or equal to")]
    pub greater_than_eq: Option<i64>,

    /// Value is strictly less than the reference
    #[serde(rename = "less than")]
    pub less_than: Option<i64>,

    /// Value is less than or equal to the reference
    #[serde(rename = "less than or equal to")]
    pub less_than_eq: Option<i64>,
}

impl NumberCompare {
    fn equality_modes(&self) -> Vec<&'static str> {
        let mut modes = Vec::new();
        if self.is.is_some() {
            modes.push("is");
        }
        if self.is_not.is_some() {
            modes.push("is not");
        }
        if self.within.is_some() {
            modes.push("in");
        }
        if self.not_within.is_some() {
            modes.push("not in");
        }
        modes
    }

    fn ordering_modes(&self) -> Vec<&'static str> {
        let mut modes = Vec::new();
        if self.greater_than.is_some() {
            modes.push("greater than");
        }
        if self.greater_than_eq.is_some() {
            modes.push("greater than or equal to");
        }
        if self.less_than.is_some() {
            modes.push("less than");
        }
        if self.less_than_eq.is_some() {
            modes.push("less than or equal to");
        }
        modes
    }

    /// Checks the family-exclusivity rules. `condition` names the owning
    /// condition for error context.
    pub fn validate(&self, condition: &'static str) -> Result<()> {
        let equality = self.equality_modes();
        let ordering = self.ordering_modes();

        if equality.is_empty() && ordering.is_empty() {
            return Err(InvalidCondition::MissingSubAttribute {
                condition,
                attribute: "count",
            });
        }

        if equality.len() > 1 {
            return Err(InvalidCondition::ConflictingAttributes {
                first: equality[0],
                second: equality[1],
            });
        }

        if let (Some(&first), Some(&second)) = (equality.first(), ordering.first()) {
            return Err(InvalidCondition::ConflictingAttributes { first, second });
        }

        if self.greater_than.is_some() && self.greater_than_eq.is_some() {
            return Err(InvalidCondition::ConflictingAttributes {
                first: "greater than",
                second: "greater than or equal to",
            });
        }

        if self.less_than.is_some() && self.less_than_eq.is_some() {
            return Err(InvalidCondition::ConflictingAttributes {
                first: "less than",
                second: "less than or equal to",
            });
        }

        Ok(())
    }

    /// Evaluates every configured comparison against the value; all must hold.
    pub fn matches(&self, value: i64) -> bool {
        let mut ok = true;
        if let Some(n) = self.is {
            ok &= value == n;
        }
        if let Some(n) = self.is_not {
            ok &= value != n;
        }
        if let Some(set) = &self.within {
            ok &= set.contains(&value);
        }
        if let Some(set) = &self.not_within {
            ok &= !set.contains(&value);
        }
        if let Some(n) = self.greater_than {
            ok &= value > n;
        }
        if let Some(n) = self.greater_than_eq {
            ok &= value >= n;
        }
        if let Some(n) = self.less_than {
            ok &= value < n;
        }
        if let Some(n) = self.less_than_eq {
            ok &= value <= n;
        }
        ok
    }
}

/// Accepts timestamps strictly inside the configured bounds.
///
/// "after X" holds for timestamps strictly greater than X, "before X" for
/// timestamps strictly less than X. At least one bound must be configured.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateRange {
    /// Accept only timestamps strictly before this instant
    pub before: Option<DateTime<Utc>>,

    /// Accept only timestamps strictly after this instant
    pub after: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Checks that at least one bound is configured. `condition` names the
    /// owning condition for error context.
    pub fn validate(&self, condition: &'static str) -> Result<()> {
        if self.before.is_none() && self.after.is_none() {
            return Err(InvalidCondition::MissingAttribute { condition });
        }
        Ok(())
    }

    /// True iff the timestamp is strictly inside every configured bound.
    pub fn contains(&self, value: DateTime<Utc>) -> bool {
        if let Some(after) = self.after {
            if value <= after {
                return false;
            }
        }
        if let Some(before) = self.before {
            if value >= before {
                return false;
            }
        }
        true
    }
}
