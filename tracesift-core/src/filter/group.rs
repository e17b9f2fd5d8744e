//! Condition groups: an item-type filter plus an all/any combination of
//! nested conditions.

use serde::Deserialize;

use crate::models::Item;

use super::error::{InvalidCondition, Result};
use super::{de_opt_string_or_seq, FilterNode, ItemIndex, NamedConditions};

/// How the verdicts of group members are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Every member must hold
    All,
    /// At least one member must hold
    Any,
}

/// A group member: a condition or nested group defined in place, or a
/// reference to an entry in the named-condition registry.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GroupMember {
    /// Reference to a named condition
    Named(String),
    /// Condition or nested group defined inline
    Inline(FilterNode),
}

impl GroupMember {
    fn resolve<'a>(&'a self, named: &'a NamedConditions) -> Result<&'a FilterNode> {
        match self {
            GroupMember::Named(name) => named
                .get(name)
                .ok_or_else(|| InvalidCondition::UnknownName(name.clone())),
            GroupMember::Inline(node) => Ok(node),
        }
    }
}

/// Combines nested conditions with an item-type filter.
///
/// An item whose type is absent from `type` fails the group outright,
/// independent of the members. A group with a satisfied type filter and no
/// member list is a match.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionGroup {
    /// Item types the group applies to. Accepts a single type or a list.
    #[serde(rename = "type", default, deserialize_with = "de_opt_string_or_seq")]
    pub item_types: Option<Vec<String>>,

    /// Members that must all hold
    #[serde(rename = "according to all")]
    pub all: Option<Vec<GroupMember>>,

    /// Members of which at least one must hold
    #[serde(rename = "according to any")]
    pub any: Option<Vec<GroupMember>>,
}

impl ConditionGroup {
    /// The configured combinator and member list, if any.
    pub fn members(&self) -> Option<(Combinator, &[GroupMember])> {
        if let Some(members) = &self.all {
            Some((Combinator::All, members.as_slice()))
        } else {
            self.any
                .as_deref()
                .map(|members| (Combinator::Any, members))
        }
    }

    /// Checks that the group is well-formed: a single combinator, and at
    /// least a type filter or one member.
    pub fn validate(&self) -> Result<()> {
        if self.all.is_some() && self.any.is_some() {
            return Err(InvalidCondition::ConflictingAttributes {
                first: "according to all",
                second: "according to any",
            });
        }

        let has_members = self.members().is_some_and(|(_, members)| !members.is_empty());
        if self.item_types.is_none() && !has_members {
            return Err(InvalidCondition::EmptyGroup);
        }

        Ok(())
    }

    /// Evaluates the group against an item.
    pub fn evaluate(&self, item: &Item, index: &ItemIndex, named: &NamedConditions) -> Result<bool> {
        if let Some(types) = &self.item_types {
            if !types.iter().any(|t| *t == item.object_type) {
                return Ok(false);
            }
        }

        let Some((combinator, members)) = self.members() else {
            return Ok(true);
        };

        // Resolve every name before combining, so a dangling reference is
        // rejected even when the combinator short-circuits past it
        let mut resolved = Vec::with_capacity(members.len());
        for member in members {
            resolved.push(member.resolve(named)?);
        }

        match combinator {
            Combinator::All => {
                for node in resolved {
                    if !node.evaluate(item, index, named)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Combinator::Any => {
                for node in resolved {
                    if node.evaluate(item, index, named)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}
