//! Categories.
//!
//! System defaults have `user_id = NULL` and `is_default = true`; everything
//! else belongs to one user and may be shared with the family.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, TransactionType};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub kind: TransactionType,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_default: bool,
    pub is_shared: bool,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub name_norm: String,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_default: bool,
    pub is_shared: bool,
    pub user_id: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(has_many = "super::budgets::Entity")]
    Budgets,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            kind: TransactionType::try_from(model.kind.as_str())?,
            color: model.color,
            icon: model.icon,
            is_default: model.is_default,
            is_shared: model.is_shared,
            user_id: model.user_id,
            created_at: model.created_at,
        })
    }
}
