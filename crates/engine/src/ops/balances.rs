use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, TransactionType, bank_accounts, transactions};

use super::Engine;

impl Engine {
    /// Moves an account balance by `amount_minor`: `Income` adds, `Expense`
    /// subtracts.
    ///
    /// Single `UPDATE ... SET current = current + delta`, so concurrent writers
    /// never lose each other's updates.
    pub(super) async fn apply_balance_delta(
        &self,
        db: &DatabaseTransaction,
        account_id: Uuid,
        amount_minor: i64,
        kind: TransactionType,
    ) -> ResultEngine<()> {
        let delta = kind.signed(amount_minor);
        let result = bank_accounts::Entity::update_many()
            .col_expr(
                bank_accounts::Column::CurrentBalanceMinor,
                Expr::col(bank_accounts::Column::CurrentBalanceMinor).add(delta),
            )
            .filter(bank_accounts::Column::Id.eq(account_id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(
                "bank account not exists".to_string(),
            ));
        }
        tracing::debug!(%account_id, delta, "applied balance delta");
        Ok(())
    }

    /// Applies the balance effect of a stored row, if it has one.
    pub(super) async fn apply_paid_effect(
        &self,
        db: &DatabaseTransaction,
        model: &transactions::Model,
    ) -> ResultEngine<()> {
        if let (true, Some(account_id)) = (model.is_paid, model.bank_account_id) {
            self.apply_balance_delta(db, account_id, model.amount_minor, model.kind()?)
                .await?;
        }
        Ok(())
    }

    /// Undoes the balance effect of a stored row, if it has one.
    pub(super) async fn reverse_paid_effect(
        &self,
        db: &DatabaseTransaction,
        model: &transactions::Model,
    ) -> ResultEngine<()> {
        if let (true, Some(account_id)) = (model.is_paid, model.bank_account_id) {
            self.apply_balance_delta(
                db,
                account_id,
                model.amount_minor,
                model.kind()?.inverted(),
            )
            .await?;
        }
        Ok(())
    }
}
