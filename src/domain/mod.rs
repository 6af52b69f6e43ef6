//! Domain layer: classification tree, rules and builder
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod display;
pub mod error;
pub mod record;
pub mod rule;
pub mod value;

pub use arena::{ClassTree, Node, MAX_ANCESTOR_HOPS};
pub use builder::{TreeBuilder, TreeResult};
pub use display::{RenderOptions, TreeNodeConvert};
pub use error::DomainError;
pub use record::{AttributeSource, Record};
pub use rule::{DateTimeRangeRule, DiscreteRangeRule, EqualityRule, NodeRule, TimeWindow};
pub use value::Value;
