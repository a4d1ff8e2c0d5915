//! Savings goals.
//!
//! `current_amount_minor` only grows. `is_completed` is set once the target is
//! reached and stays set.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoalParticipant {
    pub user_id: String,
    pub contribution_minor: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Goal {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub target_amount_minor: i64,
    pub current_amount_minor: i64,
    pub deadline: Option<NaiveDate>,
    pub is_completed: bool,
    pub is_shared: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<GoalParticipant>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub target_amount_minor: i64,
    pub current_amount_minor: i64,
    pub deadline: Option<Date>,
    pub is_completed: bool,
    pub is_shared: bool,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_goals::Entity")]
    UserGoals,
}

impl Related<super::user_goals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserGoals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<(Model, Vec<super::user_goals::Model>)> for Goal {
    fn from((model, links): (Model, Vec<super::user_goals::Model>)) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            target_amount_minor: model.target_amount_minor,
            current_amount_minor: model.current_amount_minor,
            deadline: model.deadline,
            is_completed: model.is_completed,
            is_shared: model.is_shared,
            created_by: model.created_by,
            created_at: model.created_at,
            participants: links
                .into_iter()
                .map(|link| GoalParticipant {
                    user_id: link.user_id,
                    contribution_minor: link.contribution_minor,
                })
                .collect(),
        }
    }
}
