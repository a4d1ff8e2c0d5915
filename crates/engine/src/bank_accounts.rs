//! Bank accounts.
//!
//! `current_balance_minor` starts equal to `initial_balance_minor` and then
//! moves only through paid transactions (see `ops::balances`).

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountType {
    Checking,
    Savings,
    Investment,
    Other,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "CHECKING",
            Self::Savings => "SAVINGS",
            Self::Investment => "INVESTMENT",
            Self::Other => "OTHER",
        }
    }
}

impl TryFrom<&str> for AccountType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "CHECKING" => Ok(Self::Checking),
            "SAVINGS" => Ok(Self::Savings),
            "INVESTMENT" => Ok(Self::Investment),
            "OTHER" => Ok(Self::Other),
            other => Err(EngineError::InvalidInput(format!(
                "invalid account type: {other}"
            ))),
        }
    }
}

/// Lifecycle shared by accounts and cards. Archived records stay readable
/// but cannot be referenced by new transactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordStatus {
    Active,
    Archived,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Archived => "ARCHIVED",
        }
    }
}

impl TryFrom<&str> for RecordStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "ACTIVE" => Ok(Self::Active),
            "ARCHIVED" => Ok(Self::Archived),
            other => Err(EngineError::InvalidInput(format!(
                "invalid status: {other}"
            ))),
        }
    }
}

/// Result of a delete request on an account or card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    /// Other rows still reference the record, so it was archived.
    Archived,
    Deleted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BankAccount {
    pub id: Uuid,
    pub name: String,
    pub bank_name: Option<String>,
    pub account_type: AccountType,
    pub initial_balance_minor: i64,
    pub current_balance_minor: i64,
    pub is_shared: bool,
    pub status: RecordStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bank_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub bank_name: Option<String>,
    pub account_type: String,
    pub initial_balance_minor: i64,
    pub current_balance_minor: i64,
    pub is_shared: bool,
    pub status: String,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_bank_accounts::Entity")]
    UserBankAccounts,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(has_many = "super::cards::Entity")]
    Cards,
}

impl Related<super::user_bank_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserBankAccounts.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::cards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for BankAccount {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            bank_name: model.bank_name,
            account_type: AccountType::try_from(model.account_type.as_str())?,
            initial_balance_minor: model.initial_balance_minor,
            current_balance_minor: model.current_balance_minor,
            is_shared: model.is_shared,
            status: RecordStatus::try_from(model.status.as_str())?,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}
