use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "auth_rule")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub pid: Option<i64>,
    /// Case-insensitive unique identifier; "*" is reserved for the wildcard rule.
    #[sea_orm(unique)]
    pub name: String,
    pub title: String,
    pub rule_type: i64,
    pub status: String,
    /// Optional boolean-expression string evaluated against user attributes.
    pub condition: Option<String>,
    pub icon: Option<String>,
    pub menu_type: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
