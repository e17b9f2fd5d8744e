//! Error types for filter definitions.

use thiserror::Error;

/// Errors raised when a filter condition definition is invalid.
///
/// Every variant is a configuration defect: the filter definition itself is
/// broken, not a particular item. They abort the whole filter run and carry
/// the attribute or condition name needed to fix the definition.
#[derive(Debug, Error)]
pub enum InvalidCondition {
    /// A condition names none of the attributes its kind requires.
    #[error("missing attribute for \"{condition}\" condition")]
    MissingAttribute { condition: &'static str },

    /// A condition is missing a required sub-attribute.
    #[error("missing \"{attribute}\" attribute for \"{condition}\" condition")]
    MissingSubAttribute {
        condition: &'static str,
        attribute: &'static str,
    },

    /// Two attributes that cannot be used together were both given.
    #[error("attribute \"{first}\" cannot be combined with attribute \"{second}\"")]
    ConflictingAttributes {
        first: &'static str,
        second: &'static str,
    },

    /// An attribute that requires a companion attribute was given alone.
    #[error("attribute \"{first}\" must be used with attribute \"{second}\"")]
    RequiresAttribute {
        first: &'static str,
        second: &'static str,
    },

    /// A condition group names neither an item type nor any members.
    #[error("condition group must specify a type and/or a group of conditions")]
    EmptyGroup,

    /// A named condition reference could not be resolved.
    #[error("missing condition with name \"{0}\"")]
    UnknownName(String),

    /// Named conditions reference each other in a cycle.
    #[error("condition \"{0}\" is part of a reference cycle")]
    CircularReference(String),

    /// The filter definition has no "main" condition.
    #[error("filter must define a \"main\" condition")]
    MissingMain,

    /// The filter definition could not be decoded.
    #[error("invalid filter definition: {0}")]
    Definition(#[from] serde_yaml::Error),
}

/// Result type for filter operations.
pub type Result<T> = std::result::Result<T, InvalidCondition>;
