use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction, TransactionType, transactions,
    util::{add_months, require_positive, split_installments},
};

use super::super::{Engine, with_tx};
use super::{MAX_INSTALLMENTS, NewTransaction, normalize_description, validate_recurrence};

impl Engine {
    /// Create a transaction.
    ///
    /// With `installments > 1` this writes one parent row
    /// (`current_installment = 0`, description suffixed with ` (Nx)`) and `N`
    /// children one calendar month apart. Children split the amount evenly and
    /// the last one absorbs the remainder. Only the first child inherits
    /// `is_paid`. Paid rows against an account move its balance immediately.
    ///
    /// Returns the single row, or the children of a series in order.
    pub async fn create_transaction(
        &self,
        user_id: &str,
        input: NewTransaction,
    ) -> ResultEngine<Vec<Transaction>> {
        let description = normalize_description(&input.description)?;
        require_positive(input.amount_minor, "amount")?;
        validate_recurrence(input.is_recurring, input.recurring_type)?;
        let installments = input.installments.max(1);
        if installments > MAX_INSTALLMENTS {
            return Err(EngineError::InvalidInput(format!(
                "installments must be at most {MAX_INSTALLMENTS}"
            )));
        }
        if input.amount_minor < i64::from(installments) {
            return Err(EngineError::InvalidAmount(
                "amount is too small for the number of installments".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.validate_references(&db_tx, user_id, &input).await?;
            if installments == 1 {
                let model = self
                    .insert_transaction_row(
                        &db_tx,
                        user_id,
                        &input,
                        RowShape {
                            description,
                            amount_minor: input.amount_minor,
                            date: input.date,
                            is_paid: input.is_paid,
                            installments: 1,
                            current_installment: 1,
                            parent_transaction_id: None,
                        },
                    )
                    .await?;
                self.apply_paid_effect(&db_tx, &model).await?;
                Ok(vec![Transaction::try_from(model)?])
            } else {
                self.insert_series(&db_tx, user_id, &input, description, installments)
                    .await
            }
        })
    }

    async fn insert_series(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        input: &NewTransaction,
        description: String,
        installments: i32,
    ) -> ResultEngine<Vec<Transaction>> {
        let parent = self
            .insert_transaction_row(
                db,
                user_id,
                input,
                RowShape {
                    description: format!("{description} ({installments}x)"),
                    amount_minor: input.amount_minor,
                    date: input.date,
                    is_paid: false,
                    installments,
                    current_installment: 0,
                    parent_transaction_id: None,
                },
            )
            .await?;

        let mut children = Vec::with_capacity(installments as usize);
        for (index, share) in split_installments(input.amount_minor, installments)
            .into_iter()
            .enumerate()
        {
            let number = index as i32 + 1;
            let child = self
                .insert_transaction_row(
                    db,
                    user_id,
                    input,
                    RowShape {
                        description: description.clone(),
                        amount_minor: share,
                        date: add_months(input.date, index as u32)?,
                        is_paid: input.is_paid && number == 1,
                        installments,
                        current_installment: number,
                        parent_transaction_id: Some(parent.id),
                    },
                )
                .await?;
            self.apply_paid_effect(db, &child).await?;
            children.push(Transaction::try_from(child)?);
        }

        tracing::info!(
            parent_id = %parent.id,
            installments,
            amount_minor = input.amount_minor,
            "installment series created"
        );
        Ok(children)
    }

    /// Category must be visible with a matching type; account and card must
    /// be usable by the caller.
    async fn validate_references(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        input: &NewTransaction,
    ) -> ResultEngine<()> {
        self.require_user_exists(db, user_id).await?;
        let category = self
            .require_category_visible(db, input.category_id, user_id)
            .await?;
        if TransactionType::try_from(category.kind.as_str())? != input.kind {
            return Err(EngineError::InvalidInput(
                "category type does not match transaction type".to_string(),
            ));
        }
        if let Some(account_id) = input.bank_account_id {
            self.require_account_usable(db, account_id, user_id).await?;
        }
        if let Some(card_id) = input.card_id {
            self.require_card_usable(db, card_id, user_id).await?;
        }
        Ok(())
    }

    async fn insert_transaction_row(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        input: &NewTransaction,
        shape: RowShape,
    ) -> ResultEngine<transactions::Model> {
        transactions::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            description: ActiveValue::Set(shape.description),
            amount_minor: ActiveValue::Set(shape.amount_minor),
            kind: ActiveValue::Set(input.kind.as_str().to_string()),
            date: ActiveValue::Set(shape.date),
            is_paid: ActiveValue::Set(shape.is_paid),
            is_recurring: ActiveValue::Set(input.is_recurring),
            recurring_type: ActiveValue::Set(
                input.recurring_type.map(|r| r.as_str().to_string()),
            ),
            installments: ActiveValue::Set(shape.installments),
            current_installment: ActiveValue::Set(shape.current_installment),
            parent_transaction_id: ActiveValue::Set(shape.parent_transaction_id),
            category_id: ActiveValue::Set(input.category_id),
            bank_account_id: ActiveValue::Set(input.bank_account_id),
            card_id: ActiveValue::Set(input.card_id),
            is_shared: ActiveValue::Set(input.is_shared),
            user_id: ActiveValue::Set(user_id.to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(db)
        .await
        .map_err(Into::into)
    }
}

/// Per-row values that differ between a parent and its installments.
struct RowShape {
    description: String,
    amount_minor: i64,
    date: DateTime<Utc>,
    is_paid: bool,
    installments: i32,
    current_installment: i32,
    parent_transaction_id: Option<Uuid>,
}
