use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{ResultEngine, transactions};

use super::super::{Engine, with_tx};
use super::TransactionDeletion;

impl Engine {
    /// Delete a transaction. Authorization: transaction owner.
    ///
    /// - single row: reverse its balance effect and delete it;
    /// - one installment with `delete_all = false`: same, siblings stay;
    /// - an installment with `delete_all = true`, or a series parent: reverse
    ///   every paid child, delete all children, then the parent.
    ///
    /// Everything runs in one DB transaction.
    pub async fn delete_transaction(
        &self,
        transaction_id: Uuid,
        user_id: &str,
        delete_all: bool,
    ) -> ResultEngine<TransactionDeletion> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction_owner(&db_tx, transaction_id, user_id)
                .await?;

            let series_parent = if model.current_installment == 0 {
                Some(model.id)
            } else if delete_all {
                model.parent_transaction_id
            } else {
                None
            };

            let deletion = match series_parent {
                Some(parent_id) => self.delete_series(&db_tx, parent_id).await?,
                None => {
                    self.reverse_paid_effect(&db_tx, &model).await?;
                    transactions::Entity::delete_by_id(model.id)
                        .exec(&db_tx)
                        .await?;
                    TransactionDeletion {
                        removed: 1,
                        installments_removed: u64::from(model.parent_transaction_id.is_some()),
                    }
                }
            };
            tracing::info!(
                %transaction_id,
                removed = deletion.removed,
                "transaction deleted"
            );
            Ok(deletion)
        })
    }

    async fn delete_series(
        &self,
        db: &DatabaseTransaction,
        parent_id: Uuid,
    ) -> ResultEngine<TransactionDeletion> {
        let children = transactions::Entity::find()
            .filter(transactions::Column::ParentTransactionId.eq(parent_id))
            .all(db)
            .await?;
        for child in &children {
            self.reverse_paid_effect(db, child).await?;
        }
        let removed_children = transactions::Entity::delete_many()
            .filter(transactions::Column::ParentTransactionId.eq(parent_id))
            .exec(db)
            .await?
            .rows_affected;
        let removed_parent = transactions::Entity::delete_by_id(parent_id)
            .exec(db)
            .await?
            .rows_affected;
        Ok(TransactionDeletion {
            removed: removed_children + removed_parent,
            installments_removed: removed_children,
        })
    }
}
