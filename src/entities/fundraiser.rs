use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum FundraiserStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "fundraisers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    pub fund_id: i64,
    pub title: String,
    pub description: String,
    pub goal_amount: f64,
    pub current_amount: f64,
    pub image_url: Option<String>,
    pub status: FundraiserStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// Collected share of the goal, clamped to [0, 100]. A non-positive
    /// goal reports 0 rather than dividing by zero.
    pub fn progress_percentage(&self) -> f64 {
        if self.goal_amount > 0.0 {
            (self.current_amount / self.goal_amount * 100.0).min(100.0)
        } else {
            0.0
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::charity_fund::Entity",
        from = "Column::FundId",
        to = "super::charity_fund::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Fund,
}

impl Related<super::charity_fund::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fund.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn fundraiser(goal: f64, current: f64) -> Model {
        Model {
            id: 1,
            fund_id: 1,
            title: "Test".to_string(),
            description: "Test".to_string(),
            goal_amount: goal,
            current_amount: current,
            image_url: None,
            status: FundraiserStatus::Active,
            start_date: Utc::now(),
            end_date: Utc::now(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn progress_is_a_fraction_of_the_goal() {
        assert_eq!(fundraiser(200.0, 50.0).progress_percentage(), 25.0);
    }

    #[test]
    fn progress_clamps_at_one_hundred() {
        assert_eq!(fundraiser(100.0, 250.0).progress_percentage(), 100.0);
    }

    #[test]
    fn progress_is_zero_without_a_goal() {
        assert_eq!(fundraiser(0.0, 50.0).progress_percentage(), 0.0);
        assert_eq!(fundraiser(-10.0, 50.0).progress_percentage(), 0.0);
    }
}
