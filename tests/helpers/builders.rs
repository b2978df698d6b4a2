use lodestone::entities;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Create a user row and return its uid
pub async fn seed_user(db: &DatabaseConnection, username: &str, score: i64, level: i64) -> i64 {
    let user = entities::user::ActiveModel {
        username: Set(username.to_string()),
        score: Set(score),
        level: Set(level),
        created_at: Set(0),
        ..Default::default()
    };
    user.insert(db).await.expect("Failed to create test user").uid
}

/// Create an active group granting the given comma-delimited rule ids
pub async fn seed_group(db: &DatabaseConnection, name: &str, rules: &str) -> i64 {
    seed_group_with_status(db, name, rules, "active").await
}

pub async fn seed_group_with_status(
    db: &DatabaseConnection,
    name: &str,
    rules: &str,
    status: &str,
) -> i64 {
    let group = entities::auth_group::ActiveModel {
        name: Set(name.to_string()),
        rules: Set(rules.to_string()),
        status: Set(status.to_string()),
        ..Default::default()
    };
    group.insert(db).await.expect("Failed to create test group").id
}

/// Link a user to a group
pub async fn seed_membership(db: &DatabaseConnection, uid: i64, group_id: i64) {
    let access = entities::auth_group_access::ActiveModel {
        uid: Set(uid),
        group_id: Set(group_id),
    };
    access
        .insert(db)
        .await
        .expect("Failed to create test membership");
}

/// Create an active rule, optionally with a condition, and return its id
pub async fn seed_rule(db: &DatabaseConnection, name: &str, condition: Option<&str>) -> i64 {
    seed_rule_with_status(db, name, condition, "active").await
}

pub async fn seed_rule_with_status(
    db: &DatabaseConnection,
    name: &str,
    condition: Option<&str>,
    status: &str,
) -> i64 {
    let rule = entities::auth_rule::ActiveModel {
        name: Set(name.to_string()),
        title: Set(name.to_string()),
        rule_type: Set(1),
        status: Set(status.to_string()),
        condition: Set(condition.map(str::to_string)),
        ..Default::default()
    };
    rule.insert(db).await.expect("Failed to create test rule").id
}
