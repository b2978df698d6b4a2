//! Cross-request persistence for resolved rule lists ("at-login" auth mode).
//!
//! The engine never deletes or expires entries here; session lifecycle is an
//! external concern. Keys are namespaced per uid via [`rule_list_key`].

use crate::authz::types::RuleSet;
use crate::entities;
use crate::errors::AuthError;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

/// Namespaced session key for a user's resolved rule list.
pub fn rule_list_key(uid: i64) -> String {
    format!("rule_list:{uid}")
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn has(&self, key: &str) -> Result<bool, AuthError>;
    async fn get(&self, key: &str) -> Result<Option<RuleSet>, AuthError>;
    async fn set(&self, key: &str, rules: &RuleSet) -> Result<(), AuthError>;
}

/// Process-local store, for tests and single-instance deployments.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: DashMap<String, RuleSet>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn has(&self, key: &str) -> Result<bool, AuthError> {
        Ok(self.entries.contains_key(key))
    }

    async fn get(&self, key: &str) -> Result<Option<RuleSet>, AuthError> {
        Ok(self.entries.get(key).map(|e| e.clone()))
    }

    async fn set(&self, key: &str, rules: &RuleSet) -> Result<(), AuthError> {
        self.entries.insert(key.to_string(), rules.clone());
        Ok(())
    }
}

const PROPERTY_OWNER: &str = "auth";

/// Store backed by the `properties` table: one JSON-encoded rule set per key,
/// upserted on write so re-login refreshes the persisted list.
#[derive(Clone)]
pub struct DbSessionStore {
    db: DatabaseConnection,
}

impl DbSessionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find(&self, key: &str) -> Result<Option<entities::property::Model>, AuthError> {
        use entities::property::{Column, Entity};

        let model = Entity::find()
            .filter(Column::Owner.eq(PROPERTY_OWNER))
            .filter(Column::Key.eq(key))
            .one(&self.db)
            .await?;
        Ok(model)
    }
}

#[async_trait]
impl SessionStore for DbSessionStore {
    async fn has(&self, key: &str) -> Result<bool, AuthError> {
        Ok(self.find(key).await?.is_some())
    }

    async fn get(&self, key: &str) -> Result<Option<RuleSet>, AuthError> {
        match self.find(key).await? {
            Some(model) => {
                let rules: RuleSet = serde_json::from_str(&model.value)?;
                Ok(Some(rules))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, rules: &RuleSet) -> Result<(), AuthError> {
        use entities::property::{Column, Entity};
        use sea_orm::sea_query::OnConflict;

        let now = Utc::now().timestamp();
        let json = serde_json::to_string(rules)?;

        let property = entities::property::ActiveModel {
            owner: Set(PROPERTY_OWNER.to_string()),
            key: Set(key.to_string()),
            value: Set(json),
            updated_at: Set(now),
        };

        Entity::insert(property)
            .on_conflict(
                OnConflict::columns([Column::Owner, Column::Key])
                    .update_columns([Column::Value, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }
}
