//! Payment cards, owned by one user and optionally tied to a bank account.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, RecordStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardType {
    Credit,
    Debit,
}

impl CardType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "CREDIT",
            Self::Debit => "DEBIT",
        }
    }
}

impl TryFrom<&str> for CardType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "CREDIT" => Ok(Self::Credit),
            "DEBIT" => Ok(Self::Debit),
            other => Err(EngineError::InvalidInput(format!(
                "invalid card type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub id: Uuid,
    pub name: String,
    pub card_type: CardType,
    pub last_four_digits: String,
    pub limit_minor: Option<i64>,
    pub closing_day: Option<i32>,
    pub due_day: Option<i32>,
    pub bank_account_id: Option<Uuid>,
    pub is_shared: bool,
    pub status: RecordStatus,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub card_type: String,
    pub last_four_digits: String,
    pub limit_minor: Option<i64>,
    pub closing_day: Option<i32>,
    pub due_day: Option<i32>,
    pub bank_account_id: Option<Uuid>,
    pub is_shared: bool,
    pub status: String,
    pub user_id: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_accounts::Entity",
        from = "Column::BankAccountId",
        to = "super::bank_accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    BankAccounts,
}

impl Related<super::bank_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Card {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            card_type: CardType::try_from(model.card_type.as_str())?,
            last_four_digits: model.last_four_digits,
            limit_minor: model.limit_minor,
            closing_day: model.closing_day,
            due_day: model.due_day,
            bank_account_id: model.bank_account_id,
            is_shared: model.is_shared,
            status: RecordStatus::try_from(model.status.as_str())?,
            user_id: model.user_id,
            created_at: model.created_at,
        })
    }
}
