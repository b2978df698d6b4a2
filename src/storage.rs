//! Data-access layer for the authorization engine.
//!
//! Table names are not hard-coded: they arrive through [`AuthTables`] and are
//! spliced into `sea_query`-built statements, so deployments can point the
//! engine at any schema that carries the expected columns.

use crate::errors::AuthError;
use crate::settings::{AuthTables, Database as DbCfg};
use sea_orm::sea_query::{Alias, Asterisk, Expr, JoinType, Query};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, FromQueryResult, JsonValue};
use serde::Serialize;
use serde_json::Value;

/// Row status value considered live; everything else is ignored.
pub const STATUS_ACTIVE: &str = "active";

/// A membership row: the user's link joined to its (active) group.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct GroupRow {
    pub uid: i64,
    pub group_id: i64,
    pub id: i64,
    pub pid: Option<i64>,
    pub name: String,
    /// Comma-delimited rule ids granted by this group.
    pub rules: String,
}

/// A candidate rule row, selected with the exact column set the resolver needs.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct RuleRow {
    pub id: i64,
    pub pid: Option<i64>,
    pub condition: Option<String>,
    pub icon: Option<String>,
    pub name: String,
    pub title: String,
    pub menu_type: Option<String>,
}

pub async fn init(cfg: &DbCfg) -> Result<DatabaseConnection, AuthError> {
    let db = Database::connect(&cfg.url).await?;
    Ok(db)
}

/// All active groups the user belongs to, via the membership table.
///
/// A user with no memberships yields an empty list, never an error.
pub async fn groups_for_user(
    db: &DatabaseConnection,
    tables: &AuthTables,
    uid: i64,
) -> Result<Vec<GroupRow>, AuthError> {
    let aga = || Alias::new("aga");
    let ag = || Alias::new("ag");

    let mut query = Query::select();
    query
        .columns([
            (aga(), Alias::new("uid")),
            (aga(), Alias::new("group_id")),
        ])
        .columns([
            (ag(), Alias::new("id")),
            (ag(), Alias::new("pid")),
            (ag(), Alias::new("name")),
            (ag(), Alias::new("rules")),
        ])
        .from_as(Alias::new(&tables.group_access), aga())
        .join_as(
            JoinType::LeftJoin,
            Alias::new(&tables.group),
            ag(),
            Expr::col((aga(), Alias::new("group_id"))).equals((ag(), Alias::new("id"))),
        )
        .and_where(Expr::col((aga(), Alias::new("uid"))).eq(uid))
        .and_where(Expr::col((ag(), Alias::new("status"))).eq(STATUS_ACTIVE));

    let stmt = db.get_database_backend().build(&query);
    let rows = GroupRow::find_by_statement(stmt).all(db).await?;
    Ok(rows)
}

/// Active rule rows, optionally restricted to an id set.
///
/// `ids = None` means "all active rules" (the wildcard grantee path).
pub async fn rules_by_status(
    db: &DatabaseConnection,
    tables: &AuthTables,
    ids: Option<&[i64]>,
) -> Result<Vec<RuleRow>, AuthError> {
    let mut query = Query::select();
    query
        .columns([
            Alias::new("id"),
            Alias::new("pid"),
            Alias::new("condition"),
            Alias::new("icon"),
            Alias::new("name"),
            Alias::new("title"),
            Alias::new("menu_type"),
        ])
        .from(Alias::new(&tables.rule))
        .and_where(Expr::col(Alias::new("status")).eq(STATUS_ACTIVE));

    if let Some(ids) = ids {
        query.and_where(Expr::col(Alias::new("id")).is_in(ids.iter().copied()));
    }

    let stmt = db.get_database_backend().build(&query);
    let rows = RuleRow::find_by_statement(stmt).all(db).await?;
    Ok(rows)
}

/// The user's attribute record as a flat name -> value map, or `None` if the
/// user row does not exist.
pub async fn user_record(
    db: &DatabaseConnection,
    tables: &AuthTables,
    uid: i64,
) -> Result<Option<serde_json::Map<String, Value>>, AuthError> {
    let mut query = Query::select();
    query
        .column(Asterisk)
        .from(Alias::new(&tables.user))
        .and_where(Expr::col(Alias::new("uid")).eq(uid));

    let stmt = db.get_database_backend().build(&query);
    let row = JsonValue::find_by_statement(stmt).one(db).await?;

    match row {
        Some(Value::Object(map)) => Ok(Some(map)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities;
    use crate::settings::AuthTables;
    use sea_orm::{ActiveModelTrait, Set};
    use sea_orm_migration::MigratorTrait;
    use tempfile::NamedTempFile;

    /// Test database helper that keeps temp file alive
    struct TestDb {
        connection: DatabaseConnection,
        _temp_file: NamedTempFile,
    }

    impl TestDb {
        async fn new() -> Self {
            let temp_file = NamedTempFile::new().expect("Failed to create temp file");
            let db_path = temp_file.path().to_str().expect("Invalid temp file path");
            let db_url = format!("sqlite://{}?mode=rwc", db_path);

            let connection = Database::connect(&db_url)
                .await
                .expect("Failed to connect to test database");

            migration::Migrator::up(&connection, None)
                .await
                .expect("Failed to run migrations");

            Self {
                connection,
                _temp_file: temp_file,
            }
        }

        fn connection(&self) -> &DatabaseConnection {
            &self.connection
        }
    }

    async fn seed_group(db: &DatabaseConnection, name: &str, rules: &str, status: &str) -> i64 {
        let group = entities::auth_group::ActiveModel {
            name: Set(name.to_string()),
            rules: Set(rules.to_string()),
            status: Set(status.to_string()),
            ..Default::default()
        };
        group.insert(db).await.expect("Failed to insert group").id
    }

    async fn seed_membership(db: &DatabaseConnection, uid: i64, group_id: i64) {
        let access = entities::auth_group_access::ActiveModel {
            uid: Set(uid),
            group_id: Set(group_id),
        };
        access.insert(db).await.expect("Failed to insert membership");
    }

    async fn seed_rule(db: &DatabaseConnection, name: &str, status: &str) -> i64 {
        let rule = entities::auth_rule::ActiveModel {
            name: Set(name.to_string()),
            title: Set(name.to_string()),
            rule_type: Set(1),
            status: Set(status.to_string()),
            ..Default::default()
        };
        rule.insert(db).await.expect("Failed to insert rule").id
    }

    #[tokio::test]
    async fn test_groups_for_user_filters_inactive() {
        let test_db = TestDb::new().await;
        let db = test_db.connection();
        let tables = AuthTables::default();

        let active = seed_group(db, "editors", "1,2", STATUS_ACTIVE).await;
        let disabled = seed_group(db, "retired", "3", "disabled").await;
        seed_membership(db, 7, active).await;
        seed_membership(db, 7, disabled).await;

        let rows = groups_for_user(db, &tables, 7)
            .await
            .expect("Failed to load groups");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "editors");
        assert_eq!(rows[0].rules, "1,2");
        assert_eq!(rows[0].uid, 7);
    }

    #[tokio::test]
    async fn test_groups_for_user_empty() {
        let test_db = TestDb::new().await;
        let db = test_db.connection();

        let rows = groups_for_user(db, &AuthTables::default(), 42)
            .await
            .expect("Failed to load groups");

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_rules_by_status_id_filter() {
        let test_db = TestDb::new().await;
        let db = test_db.connection();
        let tables = AuthTables::default();

        let a = seed_rule(db, "orders/list", STATUS_ACTIVE).await;
        let b = seed_rule(db, "orders/edit", STATUS_ACTIVE).await;
        let dead = seed_rule(db, "orders/purge", "disabled").await;

        let all = rules_by_status(db, &tables, None)
            .await
            .expect("Failed to load rules");
        assert_eq!(all.len(), 2);

        let filtered = rules_by_status(db, &tables, Some(&[a, dead]))
            .await
            .expect("Failed to load rules");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, a);
        assert_ne!(filtered[0].id, b);
    }

    #[tokio::test]
    async fn test_user_record_flat_map() {
        let test_db = TestDb::new().await;
        let db = test_db.connection();
        let tables = AuthTables::default();

        let user = entities::user::ActiveModel {
            username: Set("alice".to_string()),
            score: Set(50),
            level: Set(3),
            created_at: Set(0),
            ..Default::default()
        };
        let uid = user.insert(db).await.expect("Failed to insert user").uid;

        let attrs = user_record(db, &tables, uid)
            .await
            .expect("Failed to load user")
            .expect("User not found");

        assert_eq!(attrs.get("username"), Some(&Value::String("alice".into())));
        assert_eq!(attrs.get("score"), Some(&Value::from(50)));

        let missing = user_record(db, &tables, uid + 1)
            .await
            .expect("Query failed");
        assert!(missing.is_none());
    }
}
