pub mod filter;
pub mod models;
pub mod report;

// Re-export commonly used types
pub use filter::{
    Combinator, Condition, ConditionGroup, DateRange, FieldCondition, Filter, FilterNode,
    GroupMember, InvalidCondition, ItemIndex, LocationCondition, NamedConditions, NumberCompare,
    RelationshipCondition, StringCompare, TagCondition,
};
pub use models::{Direction, Item, Relationship};
pub use report::{load_all_items, load_items};
