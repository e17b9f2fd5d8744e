//! Declarative filtering of trace items.
//!
//! A [`Filter`] is built from a map of named conditions whose reserved
//! `main` entry is the entry point. Each condition is either an atomic
//! [`Condition`] over one item attribute or a [`ConditionGroup`] combining
//! nested conditions; relationship conditions may quantify a named condition
//! over an item's upstream or downstream neighbors. The whole definition is
//! validated once at construction and is immutable afterwards, so a filter
//! can be applied to any number of reports, concurrently if desired.
//!
//! ```
//! use tracesift_core::Filter;
//!
//! let filter = Filter::from_yaml_str(
//!     "
//! main:
//!   type: Requirement
//!   according to all:
//!     - verified
//! verified:
//!   downstream items:
//!     with relationship type: verified by
//!     count: {greater than or equal to: 1}
//! ",
//! )
//! .unwrap();
//! assert!(filter.named_conditions().contains_key("verified"));
//! ```

mod compare;
mod condition;
mod error;
mod group;

pub use compare::{DateRange, NumberCompare, StringCompare};
pub use condition::{
    Condition, FieldCondition, LocationCondition, RelationshipCondition, TagCondition,
};
pub use error::{InvalidCondition, Result};
pub use group::{Combinator, ConditionGroup, GroupMember};

use anyhow::Context;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::models::Item;

/// Index of report items by id, built once per [`Filter::apply`] call.
///
/// Duplicate ids are a data-quality issue upstream and are not validated
/// here; the last occurrence wins.
pub type ItemIndex<'a> = HashMap<&'a str, &'a Item>;

/// Registry of named conditions available during evaluation.
pub type NamedConditions = HashMap<String, FilterNode>;

/// A condition or condition group: the node type of the predicate tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FilterNode {
    /// A group of conditions with an item-type filter and a combinator
    Group(ConditionGroup),
    /// A single condition over one item attribute
    Condition(Condition),
}

impl FilterNode {
    /// Validates this node and every inline descendant.
    pub fn validate(&self) -> Result<()> {
        match self {
            FilterNode::Condition(condition) => condition.validate(),
            FilterNode::Group(group) => {
                group.validate()?;
                if let Some((_, members)) = group.members() {
                    for member in members {
                        if let GroupMember::Inline(node) = member {
                            node.validate()?;
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// Evaluates the node against an item.
    pub fn evaluate(&self, item: &Item, index: &ItemIndex, named: &NamedConditions) -> Result<bool> {
        match self {
            FilterNode::Condition(condition) => condition.evaluate(item, index, named),
            FilterNode::Group(group) => group.evaluate(item, index, named),
        }
    }

    /// Collects every condition name this node references, from group
    /// members and from relationship match conditions of inline nodes.
    fn referenced_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            FilterNode::Condition(condition) => {
                if let Some(name) = condition.referenced_name() {
                    names.push(name);
                }
            }
            FilterNode::Group(group) => {
                if let Some((_, members)) = group.members() {
                    for member in members {
                        match member {
                            GroupMember::Named(name) => names.push(name),
                            GroupMember::Inline(node) => node.referenced_names(names),
                        }
                    }
                }
            }
        }
    }
}

/// Filters sets of trace items against a validated predicate tree.
///
/// The tree and its named conditions are immutable after construction;
/// [`Filter::apply`] builds a fresh item index per call and holds no other
/// state, so a filter may be shared across threads.
#[derive(Debug, Clone)]
pub struct Filter {
    main: FilterNode,
    named: NamedConditions,
}

impl Filter {
    /// Reserved name of the entry-point condition.
    pub const MAIN: &'static str = "main";

    /// Creates a filter from an entry-point node and a named-condition
    /// registry, validating the whole definition.
    pub fn new(main: FilterNode, named: NamedConditions) -> Result<Self> {
        let filter = Self { main, named };
        filter.validate()?;
        Ok(filter)
    }

    /// Creates a filter from a map of named conditions that contains the
    /// reserved `main` entry.
    pub fn from_conditions(mut conditions: HashMap<String, FilterNode>) -> Result<Self> {
        let main = conditions
            .remove(Self::MAIN)
            .ok_or(InvalidCondition::MissingMain)?;
        Self::new(main, conditions)
    }

    /// Parses and validates a filter from its YAML definition.
    pub fn from_yaml_str(definition: &str) -> Result<Self> {
        log::debug!("Reading filter definition...");
        let conditions: HashMap<String, FilterNode> = serde_yaml::from_str(definition)?;
        Self::from_conditions(conditions)
    }

    /// Loads and validates a filter definition from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        log::info!("Creating filter from {:?}...", path);
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read filter file: {:?}", path))?;

        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid filter definition in {:?}", path))
    }

    /// The entry-point condition.
    pub fn main_condition(&self) -> &FilterNode {
        &self.main
    }

    /// The named conditions available to the filter.
    pub fn named_conditions(&self) -> &NamedConditions {
        &self.named
    }

    /// Applies the filter, returning the matching items in input order.
    ///
    /// Configuration defects discovered during evaluation abort the run; no
    /// partial results are returned.
    pub fn apply<'a>(&self, items: &'a [Item]) -> Result<Vec<&'a Item>> {
        log::debug!("Filtering {} items...", items.len());
        let index: ItemIndex = items.iter().map(|item| (item.id.as_str(), item)).collect();

        let mut matched = Vec::new();
        for item in items {
            if self.main.evaluate(item, &index, &self.named)? {
                matched.push(item);
            }
        }

        log::debug!("{} of {} items matched", matched.len(), items.len());
        Ok(matched)
    }

    fn validate(&self) -> Result<()> {
        log::debug!("Validating filter...");
        self.main.validate()?;
        for node in self.named.values() {
            node.validate()?;
        }
        self.check_cycles()
    }

    /// Rejects named-condition reference cycles with a depth-first walk over
    /// name references, starting from `main` and from every registry entry
    /// so cycles unreachable from `main` are caught too. Names that do not
    /// resolve are skipped here; they surface during evaluation instead.
    fn check_cycles(&self) -> Result<()> {
        let mut done: HashSet<&str> = HashSet::new();
        let mut visiting: Vec<&str> = Vec::new();

        self.walk_references(&self.main, &mut visiting, &mut done)?;
        for (name, node) in &self.named {
            if done.contains(name.as_str()) {
                continue;
            }
            visiting.push(name);
            self.walk_references(node, &mut visiting, &mut done)?;
            visiting.pop();
            done.insert(name);
        }

        Ok(())
    }

    fn walk_references<'a>(
        &'a self,
        node: &'a FilterNode,
        visiting: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Result<()> {
        let mut names = Vec::new();
        node.referenced_names(&mut names);

        for name in names {
            if done.contains(name) {
                continue;
            }
            if visiting.contains(&name) {
                return Err(InvalidCondition::CircularReference(name.to_string()));
            }
            let Some(target) = self.named.get(name) else {
                continue;
            };
            visiting.push(name);
            self.walk_references(target, visiting, done)?;
            visiting.pop();
            done.insert(name);
        }

        Ok(())
    }
}

/// Accepts either a single string or a sequence of strings.
pub(crate) fn de_opt_string_or_seq<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => None,
        Some(OneOrMany::One(value)) => Some(vec![value]),
        Some(OneOrMany::Many(values)) => Some(values),
    })
}
