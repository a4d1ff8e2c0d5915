//! Transaction operations: creation with installment expansion, updates with
//! balance reconciliation, series-aware deletion and paginated listing.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{EngineError, RecurringType, ResultEngine, TransactionType};

mod create;
mod delete;
mod list;
mod update;

pub use list::{TransactionListFilter, TransactionPage};

/// Upper bound on the number of installments in one series.
pub(crate) const MAX_INSTALLMENTS: i32 = 120;

/// Input for creating a transaction (or an installment series when
/// `installments > 1`).
#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub description: String,
    pub amount_minor: i64,
    pub kind: TransactionType,
    pub date: DateTime<Utc>,
    pub is_paid: bool,
    pub is_recurring: bool,
    pub recurring_type: Option<RecurringType>,
    pub installments: i32,
    pub category_id: Uuid,
    pub bank_account_id: Option<Uuid>,
    pub card_id: Option<Uuid>,
    pub is_shared: bool,
}

/// Partial update of a transaction. `None` leaves a field untouched.
///
/// Series parents only accept `description` and `category_id`.
#[derive(Clone, Debug, Default)]
pub struct TransactionUpdate {
    pub description: Option<String>,
    pub amount_minor: Option<i64>,
    pub kind: Option<TransactionType>,
    pub date: Option<DateTime<Utc>>,
    pub is_paid: Option<bool>,
    pub is_recurring: Option<bool>,
    pub recurring_type: Option<RecurringType>,
    pub category_id: Option<Uuid>,
    /// `Some(None)` detaches the account.
    pub bank_account_id: Option<Option<Uuid>>,
    /// `Some(None)` detaches the card.
    pub card_id: Option<Option<Uuid>>,
    pub is_shared: Option<bool>,
}

/// What a delete removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransactionDeletion {
    /// Rows removed, parent included.
    pub removed: u64,
    /// Installments (children) removed.
    pub installments_removed: u64,
}

/// `recurring_type` is required exactly when `is_recurring` is set.
fn validate_recurrence(
    is_recurring: bool,
    recurring_type: Option<RecurringType>,
) -> ResultEngine<()> {
    match (is_recurring, recurring_type) {
        (true, None) => Err(EngineError::InvalidInput(
            "recurring_type is required for recurring transactions".to_string(),
        )),
        (false, Some(_)) => Err(EngineError::InvalidInput(
            "recurring_type is only allowed for recurring transactions".to_string(),
        )),
        _ => Ok(()),
    }
}

fn normalize_description(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(
            "description must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recurrence_type_required_iff_recurring() {
        assert!(validate_recurrence(false, None).is_ok());
        assert!(validate_recurrence(true, Some(RecurringType::Monthly)).is_ok());
        assert!(validate_recurrence(true, None).is_err());
        assert!(validate_recurrence(false, Some(RecurringType::Weekly)).is_err());
    }

    #[test]
    fn description_is_trimmed() {
        assert_eq!(normalize_description("  Rent ").unwrap(), "Rent");
        assert!(normalize_description("  ").is_err());
    }
}
