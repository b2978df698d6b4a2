//! Rule-based authorization with group resolution and conditional rules.
//!
//! A user's effective rules derive transitively from group membership: each
//! active group grants a comma-delimited set of rule ids, each active rule
//! may attach a condition evaluated against the user's attribute record, and
//! the reserved id `"*"` marks an unconditional superuser. Authorization
//! queries combine requested rule names under an AND/OR relation, optionally
//! honoring request-parameter constraints embedded in stored rule names
//! (URL mode).

pub mod condition;
pub mod engine;
pub mod types;

pub use engine::Auth;
pub use types::{CheckMode, Relation, RuleNames, RuleSet, WILDCARD};
