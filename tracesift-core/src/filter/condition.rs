//! Atomic conditions over a single attribute of a trace item, including
//! quantification over an item's relationship neighbors.

use serde::{Deserialize, Deserializer};

use crate::models::{Direction, Item};

use super::compare::{DateRange, NumberCompare, StringCompare};
use super::error::{InvalidCondition, Result};
use super::{de_opt_string_or_seq, ItemIndex, NamedConditions};

/// A single predicate over one attribute of a trace item.
///
/// The declarative form is a single-key mapping naming the attribute. The
/// closed enum makes "exactly one attribute per condition" structural: a
/// definition with zero or several attributes fails to decode.
#[derive(Debug, Clone, Deserialize)]
pub enum Condition {
    /// Predicate over the item's hierarchical location path
    #[serde(rename = "location")]
    Location(LocationCondition),

    /// Predicate over a named item field
    #[serde(rename = "field")]
    Field(FieldCondition),

    /// Predicate over the creation timestamp
    #[serde(rename = "created")]
    Created(DateRange),

    /// Predicate over the last-modification timestamp
    #[serde(rename = "modified")]
    Modified(DateRange),

    /// Predicate over the item's tags
    #[serde(rename = "tags")]
    Tags(TagCondition),

    /// Predicate over the item's upstream relationships
    #[serde(rename = "upstream items")]
    Upstream(RelationshipCondition),

    /// Predicate over the item's downstream relationships
    #[serde(rename = "downstream items")]
    Downstream(RelationshipCondition),
}

impl Condition {
    /// Checks the sub-attribute rules that the declarative shape alone
    /// cannot express.
    pub fn validate(&self) -> Result<()> {
        match self {
            Condition::Location(_) | Condition::Tags(_) => Ok(()),
            Condition::Field(field) => field.validate(),
            Condition::Created(range) => range.validate("created"),
            Condition::Modified(range) => range.validate("modified"),
            Condition::Upstream(rel) => rel.validate(Direction::Upstream),
            Condition::Downstream(rel) => rel.validate(Direction::Downstream),
        }
    }

    /// Evaluates the condition against an item.
    ///
    /// `index` resolves relationship targets and `named` resolves condition
    /// names; both are read-only. Errors are configuration defects and abort
    /// the whole filter run.
    pub fn evaluate(&self, item: &Item, index: &ItemIndex, named: &NamedConditions) -> Result<bool> {
        match self {
            Condition::Location(location) => Ok(location.evaluate(item)),
            Condition::Field(field) => Ok(field.evaluate(item)),
            Condition::Created(range) => Ok(range.contains(item.created_at)),
            Condition::Modified(range) => Ok(range.contains(item.modified_at)),
            Condition::Tags(tags) => Ok(tags.evaluate(item)),
            Condition::Upstream(rel) => rel.evaluate(item, Direction::Upstream, index, named),
            Condition::Downstream(rel) => rel.evaluate(item, Direction::Downstream, index, named),
        }
    }

    /// Name of the nested condition this condition references, if any.
    pub(super) fn referenced_name(&self) -> Option<&str> {
        match self {
            Condition::Upstream(rel) | Condition::Downstream(rel) => {
                rel.match_logic().map(|(_, name)| name)
            }
            _ => None,
        }
    }
}

/// Predicate over the hierarchical location path of an item.
///
/// The path under inspection is always the item's location followed by its
/// own title.
#[derive(Debug, Clone, Deserialize)]
pub enum LocationCondition {
    /// The item's full path starts with the given path
    #[serde(rename = "is under")]
    IsUnder(#[serde(deserialize_with = "de_location_path")] Vec<String>),

    /// The item's full path does not start with the given path
    #[serde(rename = "is not under")]
    IsNotUnder(#[serde(deserialize_with = "de_location_path")] Vec<String>),

    /// Every node of the full path satisfies the comparator
    #[serde(rename = "every node")]
    EveryNode(StringCompare),

    /// No node of the full path satisfies the comparator
    #[serde(rename = "no node")]
    NoNode(StringCompare),
}

impl LocationCondition {
    /// Evaluates the predicate against the item's full path.
    pub fn evaluate(&self, item: &Item) -> bool {
        match self {
            LocationCondition::IsUnder(path) => is_under(item, path),
            LocationCondition::IsNotUnder(path) => !is_under(item, path),
            LocationCondition::EveryNode(cmp) => item.full_path().all(|node| cmp.matches(node)),
            LocationCondition::NoNode(cmp) => item.full_path().all(|node| !cmp.matches(node)),
        }
    }
}

/// True iff the item's full path has at least as many nodes as `path` and
/// matches it node for node from the start. An item whose path is shorter
/// than `path` is never under it.
fn is_under(item: &Item, path: &[String]) -> bool {
    let mut item_path = item.full_path();
    path.iter().all(|node| item_path.next() == Some(node.as_str()))
}

/// Splits a `/`-separated location string into path nodes, honoring `\/`
/// for a literal slash and `\\` for a literal backslash.
fn parse_location_path(raw: &str) -> Vec<String> {
    let mut nodes = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('/') => current.push('/'),
                Some('\\') => current.push('\\'),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            '/' => nodes.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    nodes.push(current);
    nodes
}

fn de_location_path<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_location_path(&raw))
}

/// Predicate over a named item field.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldCondition {
    /// Field to inspect
    pub name: String,

    /// Comparator applied to the field value; if omitted, presence of the
    /// field alone satisfies the condition
    pub value: Option<StringCompare>,

    /// Whether the field must be present on the item. A missing field makes
    /// a required condition fail and an optional one pass.
    #[serde(default = "default_true")]
    pub required: bool,
}

fn default_true() -> bool {
    true
}

impl FieldCondition {
    /// An optional-field condition without a comparator can never be
    /// meaningful, so it is rejected.
    pub fn validate(&self) -> Result<()> {
        if !self.required && self.value.is_none() {
            return Err(InvalidCondition::MissingSubAttribute {
                condition: "field",
                attribute: "value",
            });
        }
        Ok(())
    }

    /// Evaluates the predicate against the item's fields.
    pub fn evaluate(&self, item: &Item) -> bool {
        match item.fields.get(&self.name) {
            None => !self.required,
            Some(value) => match &self.value {
                None => true,
                Some(cmp) => cmp.matches(value),
            },
        }
    }
}

/// Predicate over the item's tag set.
#[derive(Debug, Clone, Deserialize)]
pub enum TagCondition {
    /// The tag is present on the item
    #[serde(rename = "include")]
    Include(String),

    /// The tag is absent from the item
    #[serde(rename = "exclude")]
    Exclude(String),
}

impl TagCondition {
    /// Evaluates the predicate against the item's tags.
    pub fn evaluate(&self, item: &Item) -> bool {
        match self {
            TagCondition::Include(tag) => item.tags.contains(tag),
            TagCondition::Exclude(tag) => !item.tags.contains(tag),
        }
    }
}

/// How a nested condition is quantified over relationship neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quantifier {
    /// Every known neighbor must satisfy the condition
    AllMatch,
    /// The number of matching neighbors is compared against `count`
    CountMatch,
    /// No known neighbor may satisfy the condition
    NoneMatch,
}

/// Predicate over an item's relationships in one direction.
///
/// Either counts the relationships (`count`), or quantifies a named nested
/// condition over the related items (`all match`, `count match`,
/// `none match`). Relationship targets absent from the report are "unknown"
/// neighbors: expected data, not an error. Their handling differs by mode —
/// `count unknowns` adds them in pure counting mode, `count match` always
/// counts them, and `all match`/`none match` fail outright on unknowns
/// unless `count unknowns` is set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationshipCondition {
    /// Relationship types to consider; relationships of other types are
    /// ignored entirely. Accepts a single type or a list.
    #[serde(
        rename = "with relationship type",
        default,
        deserialize_with = "de_opt_string_or_seq"
    )]
    pub with_type: Option<Vec<String>>,

    /// Numeric comparison applied to the relationship count (or, with
    /// `count match`, to the matching-neighbor count)
    pub count: Option<NumberCompare>,

    /// Name of a condition every known neighbor must satisfy
    #[serde(rename = "all match")]
    pub all_match: Option<String>,

    /// Name of a condition whose matching neighbors are counted
    #[serde(rename = "count match")]
    pub count_match: Option<String>,

    /// Name of a condition no known neighbor may satisfy
    #[serde(rename = "none match")]
    pub none_match: Option<String>,

    /// Whether unresolved neighbors participate in pure counting, and
    /// whether `all match`/`none match` tolerate them
    #[serde(rename = "count unknowns", default)]
    pub count_unknowns: bool,
}

impl RelationshipCondition {
    fn match_logic(&self) -> Option<(Quantifier, &str)> {
        if let Some(name) = &self.all_match {
            Some((Quantifier::AllMatch, name.as_str()))
        } else if let Some(name) = &self.count_match {
            Some((Quantifier::CountMatch, name.as_str()))
        } else {
            self.none_match
                .as_deref()
                .map(|name| (Quantifier::NoneMatch, name))
        }
    }

    /// Name of the nested condition, if a match logic is configured.
    pub fn condition_name(&self) -> Option<&str> {
        self.match_logic().map(|(_, name)| name)
    }

    /// Checks the attribute-combination rules for one direction.
    pub fn validate(&self, direction: Direction) -> Result<()> {
        let condition = direction.label();

        let mut logics = Vec::new();
        if self.all_match.is_some() {
            logics.push("all match");
        }
        if self.count_match.is_some() {
            logics.push("count match");
        }
        if self.none_match.is_some() {
            logics.push("none match");
        }
        if logics.len() > 1 {
            return Err(InvalidCondition::ConflictingAttributes {
                first: logics[0],
                second: logics[1],
            });
        }

        if self.count.is_none() && logics.is_empty() {
            return Err(InvalidCondition::MissingAttribute { condition });
        }

        if let Some(count) = &self.count {
            count.validate(condition)?;
        }

        match (self.count.is_some(), self.match_logic()) {
            (false, Some((Quantifier::CountMatch, _))) => {
                Err(InvalidCondition::RequiresAttribute {
                    first: "count match",
                    second: "count",
                })
            }
            (true, Some((Quantifier::AllMatch, _))) => {
                Err(InvalidCondition::ConflictingAttributes {
                    first: "count",
                    second: "all match",
                })
            }
            (true, Some((Quantifier::NoneMatch, _))) => {
                Err(InvalidCondition::ConflictingAttributes {
                    first: "count",
                    second: "none match",
                })
            }
            _ => Ok(()),
        }
    }

    /// Evaluates the predicate against the item's relationships in the
    /// given direction.
    pub(super) fn evaluate(
        &self,
        item: &Item,
        direction: Direction,
        index: &ItemIndex,
        named: &NamedConditions,
    ) -> Result<bool> {
        // Resolve the nested condition up front; a dangling name is a
        // configuration defect even when the relationship list is empty
        let nested = match self.match_logic() {
            Some((quantifier, name)) => {
                let node = named
                    .get(name)
                    .ok_or_else(|| InvalidCondition::UnknownName(name.to_string()))?;
                Some((quantifier, node))
            }
            None => None,
        };

        // Split the relationships of interest into resolved neighbors and
        // unknowns
        let mut known = Vec::new();
        let mut unknowns = 0usize;
        for rel in item.relationships(direction) {
            if let Some(types) = &self.with_type {
                if !types.iter().any(|t| *t == rel.rel_type) {
                    continue;
                }
            }
            match index.get(rel.related_id.as_str()) {
                Some(related) => known.push(*related),
                None => unknowns += 1,
            }
        }

        let Some((quantifier, node)) = nested else {
            // Pure counting mode
            let Some(count) = &self.count else {
                return Err(InvalidCondition::MissingAttribute {
                    condition: direction.label(),
                });
            };
            let mut total = known.len();
            if self.count_unknowns {
                total += unknowns;
            }
            return Ok(count.matches(total as i64));
        };

        // Unknown neighbors make universal/no-match claims unverifiable
        if unknowns > 0
            && !self.count_unknowns
            && matches!(quantifier, Quantifier::AllMatch | Quantifier::NoneMatch)
        {
            return Ok(false);
        }

        match quantifier {
            Quantifier::CountMatch => {
                let Some(count) = &self.count else {
                    return Err(InvalidCondition::RequiresAttribute {
                        first: "count match",
                        second: "count",
                    });
                };
                // Unknowns always count as matches here
                let mut matching = unknowns;
                for related in &known {
                    if node.evaluate(related, index, named)? {
                        matching += 1;
                    }
                }
                Ok(count.matches(matching as i64))
            }
            Quantifier::AllMatch => {
                for related in &known {
                    if !node.evaluate(related, index, named)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Quantifier::NoneMatch => {
                for related in &known {
                    if node.evaluate(related, index, named)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}
