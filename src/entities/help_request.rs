use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum RequestCategory {
    #[sea_orm(string_value = "food")]
    Food,
    #[sea_orm(string_value = "clothes")]
    Clothes,
    #[sea_orm(string_value = "medicine")]
    Medicine,
    #[sea_orm(string_value = "household")]
    Household,
    #[sea_orm(string_value = "other")]
    Other,
}

impl RequestCategory {
    pub fn display(&self) -> &'static str {
        match self {
            RequestCategory::Food => "Food",
            RequestCategory::Clothes => "Clothes",
            RequestCategory::Medicine => "Medicine",
            RequestCategory::Household => "Household goods",
            RequestCategory::Other => "Other",
        }
    }
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum RequestUrgency {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "critical")]
    Critical,
}

impl RequestUrgency {
    pub fn display(&self) -> &'static str {
        match self {
            RequestUrgency::Low => "Not urgent",
            RequestUrgency::Medium => "Medium urgency",
            RequestUrgency::High => "Urgent",
            RequestUrgency::Critical => "Very urgent",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "help_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: RequestCategory,
    pub urgency: RequestUrgency,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub is_active: bool,
    pub is_fulfilled: bool,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
