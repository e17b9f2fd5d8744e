use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Represents a directed, typed link from one trace item to another
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Relationship {
    /// Identifier of the item on the other end of the link; the referenced
    /// item may be absent from the report being filtered
    pub related_id: String,

    /// The type of relationship (e.g., "verifies", "derived from")
    #[serde(rename = "type")]
    pub rel_type: String,
}

/// Represents a single requirement or test item from a trace data report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Stable identifier, unique within a report; relationship targets are
    /// resolved against it
    pub id: String,

    /// Item type discriminator (e.g., "Requirement", "Test Case")
    pub object_type: String,

    /// Short title of the item
    pub title: String,

    /// Hierarchical location of the item; the full path is the location
    /// followed by the item's own title
    pub location: Vec<String>,

    /// Arbitrary named attributes
    pub fields: HashMap<String, String>,

    /// Tags attached to the item
    pub tags: HashSet<String>,

    /// When the item was created
    pub created_at: DateTime<Utc>,

    /// When the item was last modified
    pub modified_at: DateTime<Utc>,

    /// Incoming relationships
    pub upstream: Vec<Relationship>,

    /// Outgoing relationships
    pub downstream: Vec<Relationship>,
}

impl Item {
    /// Iterates over the full hierarchical path of the item: every location
    /// node followed by the item's own title
    pub fn full_path(&self) -> impl Iterator<Item = &str> {
        self.location
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.title.as_str()))
    }

    /// Returns the item's relationships in the given direction
    pub fn relationships(&self, direction: Direction) -> &[Relationship] {
        match direction {
            Direction::Upstream => &self.upstream,
            Direction::Downstream => &self.downstream,
        }
    }
}

/// Direction of a relationship walk from an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards items this item traces from
    Upstream,
    /// Towards items this item traces to
    Downstream,
}

impl Direction {
    /// Name of the condition attribute that selects this direction
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Upstream => "upstream items",
            Direction::Downstream => "downstream items",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
