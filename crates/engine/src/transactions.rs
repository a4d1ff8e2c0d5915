//! Transaction rows.
//!
//! A single payment is stored as `installments = 1, current_installment = 1`.
//! An installment series is one parent row (`current_installment = 0`) that is
//! never paid and never listed, plus `N` children pointing at it through
//! `parent_transaction_id`.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }

    pub fn inverted(self) -> Self {
        match self {
            Self::Income => Self::Expense,
            Self::Expense => Self::Income,
        }
    }

    /// Signed effect on an account balance.
    pub fn signed(self, amount_minor: i64) -> i64 {
        match self {
            Self::Income => amount_minor,
            Self::Expense => -amount_minor,
        }
    }
}

impl TryFrom<&str> for TransactionType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "INCOME" => Ok(Self::Income),
            "EXPENSE" => Ok(Self::Expense),
            other => Err(EngineError::InvalidInput(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecurringType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurringType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }
}

impl TryFrom<&str> for RecurringType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "DAILY" => Ok(Self::Daily),
            "WEEKLY" => Ok(Self::Weekly),
            "MONTHLY" => Ok(Self::Monthly),
            "YEARLY" => Ok(Self::Yearly),
            other => Err(EngineError::InvalidInput(format!(
                "invalid recurring type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub description: String,
    pub amount_minor: i64,
    pub kind: TransactionType,
    pub date: DateTime<Utc>,
    pub is_paid: bool,
    pub is_recurring: bool,
    pub recurring_type: Option<RecurringType>,
    pub installments: i32,
    pub current_installment: i32,
    pub parent_transaction_id: Option<Uuid>,
    pub category_id: Uuid,
    pub bank_account_id: Option<Uuid>,
    pub card_id: Option<Uuid>,
    pub is_shared: bool,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_series_parent(&self) -> bool {
        self.current_installment == 0
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub description: String,
    pub amount_minor: i64,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub date: DateTimeUtc,
    pub is_paid: bool,
    pub is_recurring: bool,
    pub recurring_type: Option<String>,
    pub installments: i32,
    pub current_installment: i32,
    pub parent_transaction_id: Option<Uuid>,
    pub category_id: Uuid,
    pub bank_account_id: Option<Uuid>,
    pub card_id: Option<Uuid>,
    pub is_shared: bool,
    pub user_id: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Categories,
    #[sea_orm(
        belongs_to = "super::bank_accounts::Entity",
        from = "Column::BankAccountId",
        to = "super::bank_accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    BankAccounts,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::bank_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub(crate) fn kind(&self) -> Result<TransactionType, EngineError> {
        TransactionType::try_from(self.kind.as_str())
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            kind: TransactionType::try_from(model.kind.as_str())?,
            recurring_type: model
                .recurring_type
                .as_deref()
                .map(RecurringType::try_from)
                .transpose()?,
            description: model.description,
            amount_minor: model.amount_minor,
            date: model.date,
            is_paid: model.is_paid,
            is_recurring: model.is_recurring,
            installments: model.installments,
            current_installment: model.current_installment,
            parent_transaction_id: model.parent_transaction_id,
            category_id: model.category_id,
            bank_account_id: model.bank_account_id,
            card_id: model.card_id,
            is_shared: model.is_shared,
            user_id: model.user_id,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_amount_follows_type() {
        assert_eq!(TransactionType::Income.signed(250), 250);
        assert_eq!(TransactionType::Expense.signed(250), -250);
        assert_eq!(
            TransactionType::Expense.inverted().signed(250),
            TransactionType::Income.signed(250)
        );
    }

    #[test]
    fn type_strings_round_trip_through_storage_form() {
        for kind in [TransactionType::Income, TransactionType::Expense] {
            assert_eq!(TransactionType::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(TransactionType::try_from("income").is_err());
        assert_eq!(
            RecurringType::try_from("MONTHLY").unwrap(),
            RecurringType::Monthly
        );
    }
}
