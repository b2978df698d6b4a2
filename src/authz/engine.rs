use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use sea_orm::DatabaseConnection;
use serde_json::{Map, Value};

use crate::authz::condition;
use crate::authz::types::{CheckMode, Relation, RuleNames, RuleSet, WILDCARD};
use crate::errors::AuthError;
use crate::session::{rule_list_key, SessionStore};
use crate::settings::{AuthMode, AuthSettings};
use crate::storage;
use crate::storage::GroupRow;

/// The authorization engine.
///
/// Construct one per process with explicit collaborators and pass it to call
/// sites; per-uid memos (group rows, rule lists, user attributes) live inside
/// the instance. Concurrent checks for the same uid may race to populate a
/// memo; last writer wins and the values are identical, so no locking beyond
/// the maps themselves.
pub struct Auth {
    db: DatabaseConnection,
    settings: AuthSettings,
    sessions: Arc<dyn SessionStore>,
    group_cache: DashMap<i64, Vec<GroupRow>>,
    rule_list_cache: DashMap<i64, RuleSet>,
    attr_cache: DashMap<i64, Map<String, Value>>,
}

impl Auth {
    pub fn new(
        db: DatabaseConnection,
        settings: AuthSettings,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            db,
            settings,
            sessions,
            group_cache: DashMap::new(),
            rule_list_cache: DashMap::new(),
            attr_cache: DashMap::new(),
        }
    }

    /// Authorize `uid` against the requested rule names.
    ///
    /// Returns `true` immediately when auth is disabled in configuration
    /// (fail-open by design) or when the user holds the wildcard grant.
    /// `params` is the current request's parameter bag, consulted only in
    /// URL mode.
    pub async fn check(
        &self,
        names: &RuleNames,
        uid: i64,
        relation: Relation,
        mode: CheckMode,
        params: &HashMap<String, String>,
    ) -> Result<bool, AuthError> {
        if !self.settings.enabled {
            return Ok(true);
        }

        let rule_list = self.rule_list(uid).await?;
        if rule_list.is_superuser() {
            return Ok(true);
        }

        let requested = names.normalized();
        let request_params = lowercase_params(params);

        // Requested names that found a satisfying stored rule
        let mut matched: HashSet<String> = HashSet::new();
        for stored in rule_list.names() {
            match (mode, stored.split_once('?')) {
                (CheckMode::Url, Some((bare, query))) => {
                    if requested.iter().any(|name| name == bare)
                        && embedded_params_match(query, &request_params)
                    {
                        matched.insert(bare.to_string());
                    }
                }
                _ => {
                    if requested.iter().any(|name| name == stored) {
                        matched.insert(stored.to_string());
                    }
                }
            }
        }

        let allowed = match relation {
            Relation::Or => !matched.is_empty(),
            Relation::And => requested.iter().all(|name| matched.contains(name)),
        };
        tracing::debug!(uid, ?relation, ?mode, allowed, "authorization check");
        Ok(allowed)
    }

    /// The user's effective rule set, resolved through group membership and
    /// condition evaluation. Memoized per uid; in at-login mode a previously
    /// persisted session entry short-circuits recomputation.
    pub async fn rule_list(&self, uid: i64) -> Result<RuleSet, AuthError> {
        if let Some(cached) = self.rule_list_cache.get(&uid) {
            return Ok(cached.clone());
        }

        if self.settings.mode == AuthMode::AtLogin {
            if let Some(saved) = self.sessions.get(&rule_list_key(uid)).await? {
                return Ok(saved);
            }
        }

        let ids = self.rule_ids(uid).await?;
        if ids.is_empty() {
            let empty = RuleSet::default();
            self.rule_list_cache.insert(uid, empty.clone());
            return Ok(empty);
        }

        let wildcard = ids.iter().any(|id| id == WILDCARD);
        // Superusers see every active rule; everyone else only granted ids.
        // Ids that fail to parse are data inconsistency and are dropped.
        let id_filter: Option<Vec<i64>> = if wildcard {
            None
        } else {
            Some(ids.iter().filter_map(|id| id.parse().ok()).collect())
        };

        let candidates =
            storage::rules_by_status(&self.db, &self.settings.tables, id_filter.as_deref()).await?;

        let mut list = RuleSet::default();
        if wildcard {
            list.grant_all();
        }
        for rule in candidates {
            let cond = rule.condition.as_deref().unwrap_or("").trim();
            if !cond.is_empty() && !wildcard {
                let attrs = self.user_attributes(uid).await?;
                if condition::evaluate(cond, &attrs) {
                    list.insert(rule.id, rule.name.to_lowercase());
                }
            } else {
                // No condition (or wildcard grant): presence is enough
                list.insert(rule.id, rule.name.to_lowercase());
            }
        }

        tracing::debug!(uid, rules = list.len(), superuser = list.is_superuser(), "resolved rule list");
        self.rule_list_cache.insert(uid, list.clone());
        if self.settings.mode == AuthMode::AtLogin {
            self.sessions.set(&rule_list_key(uid), &list).await?;
        }
        Ok(list)
    }

    /// Active group memberships for a user, memoized per uid.
    pub async fn groups(&self, uid: i64) -> Result<Vec<GroupRow>, AuthError> {
        if let Some(cached) = self.group_cache.get(&uid) {
            return Ok(cached.clone());
        }
        let rows = storage::groups_for_user(&self.db, &self.settings.tables, uid).await?;
        self.group_cache.insert(uid, rows.clone());
        Ok(rows)
    }

    /// The de-duplicated union of rule ids granted through group membership.
    /// May contain the `"*"` wildcard marker. Empty for users with no
    /// memberships: that is "no rules", not an error.
    pub async fn rule_ids(&self, uid: i64) -> Result<Vec<String>, AuthError> {
        let groups = self.groups(uid).await?;
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for group in &groups {
            for id in group.rules.trim_matches(',').split(',') {
                let id = id.trim();
                if id.is_empty() {
                    continue;
                }
                if seen.insert(id.to_string()) {
                    ids.push(id.to_string());
                }
            }
        }
        Ok(ids)
    }

    async fn user_attributes(&self, uid: i64) -> Result<Map<String, Value>, AuthError> {
        if let Some(cached) = self.attr_cache.get(&uid) {
            return Ok(cached.clone());
        }
        // A missing user record degrades to an empty attribute map, which
        // leaves every conditional clause unsatisfied.
        let attrs = storage::user_record(&self.db, &self.settings.tables, uid)
            .await?
            .unwrap_or_default();
        self.attr_cache.insert(uid, attrs.clone());
        Ok(attrs)
    }

    /// Drop the memoized state for one uid.
    pub fn invalidate(&self, uid: i64) {
        self.group_cache.remove(&uid);
        self.rule_list_cache.remove(&uid);
        self.attr_cache.remove(&uid);
    }

    /// Drop all memoized state.
    pub fn clear_cache(&self) {
        self.group_cache.clear();
        self.rule_list_cache.clear();
        self.attr_cache.clear();
    }
}

fn lowercase_params(params: &HashMap<String, String>) -> HashMap<String, String> {
    params
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.to_lowercase()))
        .collect()
}

/// Every key/value pair embedded in a stored rule's `?k=v&...` suffix must be
/// present with an equal value in the request parameter bag. Both sides are
/// lower-cased. A suffix that fails to parse never matches.
fn embedded_params_match(query: &str, request_params: &HashMap<String, String>) -> bool {
    let Ok(constraints) = serde_urlencoded::from_str::<HashMap<String, String>>(query) else {
        return false;
    };
    constraints.iter().all(|(key, value)| {
        request_params.get(&key.to_lowercase()).map(String::as_str)
            == Some(value.to_lowercase().as_str())
    })
}
