use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, RecurringType, ResultEngine, Transaction, TransactionType, transactions,
    util::require_positive,
};

use super::super::{Engine, with_tx};
use super::{TransactionUpdate, normalize_description, validate_recurrence};

impl TransactionUpdate {
    /// True when the update touches anything a series parent cannot change.
    fn touches_payment_fields(&self) -> bool {
        self.amount_minor.is_some()
            || self.kind.is_some()
            || self.date.is_some()
            || self.is_paid.is_some()
            || self.is_recurring.is_some()
            || self.recurring_type.is_some()
            || self.bank_account_id.is_some()
            || self.card_id.is_some()
    }
}

impl Engine {
    pub async fn transaction(
        &self,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction_owner(&db_tx, transaction_id, user_id)
                .await?;
            Transaction::try_from(model)
        })
    }

    /// Update a transaction. Authorization: transaction owner.
    ///
    /// The stored balance effect of the old row is reversed and the effect of
    /// the new row applied, so flipping `is_paid` or editing the amount, type
    /// or account of a paid row keeps balances exact.
    pub async fn update_transaction(
        &self,
        transaction_id: Uuid,
        user_id: &str,
        update: TransactionUpdate,
    ) -> ResultEngine<Transaction> {
        let description = update
            .description
            .as_deref()
            .map(normalize_description)
            .transpose()?;
        if let Some(amount) = update.amount_minor {
            require_positive(amount, "amount")?;
        }

        with_tx!(self, |db_tx| {
            let old = self
                .require_transaction_owner(&db_tx, transaction_id, user_id)
                .await?;
            let old_kind = old.kind()?;

            if old.current_installment == 0 && update.touches_payment_fields() {
                return Err(EngineError::InvalidInput(
                    "only description and category can change on an installment parent"
                        .to_string(),
                ));
            }

            let kind = update.kind.unwrap_or(old_kind);
            let is_recurring = update.is_recurring.unwrap_or(old.is_recurring);
            let recurring_type = match update.is_recurring {
                Some(false) => update.recurring_type,
                _ => update.recurring_type.or(old
                    .recurring_type
                    .as_deref()
                    .map(RecurringType::try_from)
                    .transpose()?),
            };
            validate_recurrence(is_recurring, recurring_type)?;

            let category_id = update.category_id.unwrap_or(old.category_id);
            if update.category_id.is_some() || update.kind.is_some() {
                let category = self
                    .require_category_visible(&db_tx, category_id, user_id)
                    .await?;
                if TransactionType::try_from(category.kind.as_str())? != kind {
                    return Err(EngineError::InvalidInput(
                        "category type does not match transaction type".to_string(),
                    ));
                }
            }
            if let Some(Some(account_id)) = update.bank_account_id
                && old.bank_account_id != Some(account_id)
            {
                self.require_account_usable(&db_tx, account_id, user_id)
                    .await?;
            }
            if let Some(Some(card_id)) = update.card_id
                && old.card_id != Some(card_id)
            {
                self.require_card_usable(&db_tx, card_id, user_id).await?;
            }

            self.reverse_paid_effect(&db_tx, &old).await?;

            let mut active: transactions::ActiveModel = old.into();
            if let Some(description) = description {
                active.description = ActiveValue::Set(description);
            }
            if let Some(amount) = update.amount_minor {
                active.amount_minor = ActiveValue::Set(amount);
            }
            if let Some(date) = update.date {
                active.date = ActiveValue::Set(date);
            }
            if let Some(is_paid) = update.is_paid {
                active.is_paid = ActiveValue::Set(is_paid);
            }
            if let Some(account_id) = update.bank_account_id {
                active.bank_account_id = ActiveValue::Set(account_id);
            }
            if let Some(card_id) = update.card_id {
                active.card_id = ActiveValue::Set(card_id);
            }
            if let Some(is_shared) = update.is_shared {
                active.is_shared = ActiveValue::Set(is_shared);
            }
            active.kind = ActiveValue::Set(kind.as_str().to_string());
            active.category_id = ActiveValue::Set(category_id);
            active.is_recurring = ActiveValue::Set(is_recurring);
            active.recurring_type = ActiveValue::Set(recurring_type.map(|r| r.as_str().to_string()));
            let new = active.update(&db_tx).await?;

            self.apply_paid_effect(&db_tx, &new).await?;
            Transaction::try_from(new)
        })
    }
}
