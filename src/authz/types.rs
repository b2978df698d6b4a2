use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashMap;

/// Reserved rule-id marker granting unconditional superuser access.
pub const WILDCARD: &str = "*";

/// A user's resolved rule set: rule id -> lower-cased rule name, plus the
/// wildcard marker when the granted-id set contained `"*"`.
///
/// Computed on demand, cached per uid, and invalidated only by process restart
/// or an explicit cache clear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: BTreeMap<i64, String>,
    #[serde(default)]
    wildcard: bool,
}

impl RuleSet {
    pub fn insert(&mut self, id: i64, name: String) {
        self.rules.insert(id, name);
    }

    /// Record the wildcard marker (`"*"` was granted).
    pub fn grant_all(&mut self) {
        self.wildcard = true;
    }

    pub fn is_superuser(&self) -> bool {
        self.wildcard
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && !self.wildcard
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// The stored rule names, without the wildcard marker.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.values().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.values().any(|n| n == name)
    }
}

/// Requested rule names: either one comma-delimited string or an explicit
/// list. Every name is lower-cased before matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleNames {
    One(String),
    Many(Vec<String>),
}

impl RuleNames {
    pub fn normalized(&self) -> Vec<String> {
        match self {
            RuleNames::One(s) => s.to_lowercase().split(',').map(str::to_string).collect(),
            RuleNames::Many(list) => list.iter().map(|n| n.to_lowercase()).collect(),
        }
    }
}

impl From<&str> for RuleNames {
    fn from(value: &str) -> Self {
        RuleNames::One(value.to_string())
    }
}

impl From<Vec<String>> for RuleNames {
    fn from(value: Vec<String>) -> Self {
        RuleNames::Many(value)
    }
}

/// Combinator applied across multiple requested names in one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    And,
    #[default]
    Or,
}

/// Matching mode: `Url` honors parameter constraints embedded in stored rule
/// names; anything else matches on identifier equality alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    #[default]
    Url,
    Normal,
}

// ---------- API request/response types ----------

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    /// Comma-delimited string or explicit list of rule names
    pub names: RuleNames,
    pub uid: i64,
    #[serde(default)]
    pub relation: Relation,
    #[serde(default)]
    pub mode: CheckMode,
    /// Request parameter bag consulted in URL mode
    #[serde(default)]
    pub params: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub allowed: bool,
}

#[derive(Debug, Serialize)]
pub struct RuleListResponse {
    pub superuser: bool,
    pub rules: Vec<String>,
}
