use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Platform role. Fund creators may submit charity funds; admins moderate them.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "fund_creator")]
    FundCreator,
    #[sea_orm(string_value = "admin")]
    Admin,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2id PHC string, never exposed through the API
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub date_joined: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::charity_fund::Entity")]
    CharityFund,
    #[sea_orm(has_many = "super::help_request::Entity")]
    HelpRequest,
}

impl Related<super::charity_fund::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CharityFund.def()
    }
}

impl Related<super::help_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HelpRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
