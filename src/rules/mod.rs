//! Rule engine: compiled title/class patterns, the ordered rule list and
//! the source that feeds new rule lists in as whole snapshots.

mod engine;
mod rule;
mod source;
mod store;

pub use engine::RuleList;
pub use rule::{Action, Rule};
pub use source::ConfigRuleSource;
pub use store::RuleStore;
