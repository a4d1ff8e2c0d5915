use std::collections::BTreeSet;

use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    AccountType, BankAccount, EngineError, MemberRole, RecordStatus, Removal, ResultEngine,
    bank_accounts, cards, transactions, user_bank_accounts,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

/// Input for creating a bank account.
#[derive(Clone, Debug)]
pub struct NewBankAccount {
    pub name: String,
    pub bank_name: Option<String>,
    pub account_type: AccountType,
    pub initial_balance_minor: i64,
    pub is_shared: bool,
    /// Family members linked to the account as `MEMBER`.
    pub collaborators: Vec<String>,
}

/// Partial update of a bank account. `None` leaves a field untouched.
#[derive(Clone, Debug, Default)]
pub struct BankAccountUpdate {
    pub name: Option<String>,
    /// `Some("")` clears the bank name.
    pub bank_name: Option<String>,
    pub account_type: Option<AccountType>,
    pub initial_balance_minor: Option<i64>,
    pub is_shared: Option<bool>,
    pub status: Option<RecordStatus>,
}

impl Engine {
    /// Create an account owned by `user_id`.
    ///
    /// The current balance starts at the initial balance. Collaborators must
    /// belong to the creator's family.
    pub async fn create_bank_account(
        &self,
        user_id: &str,
        input: NewBankAccount,
    ) -> ResultEngine<BankAccount> {
        let name = normalize_required_name(&input.name, "bank account")?;
        let bank_name = normalize_optional_text(input.bank_name.as_deref());
        let collaborators: BTreeSet<String> = input
            .collaborators
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty() && c != user_id)
            .collect();

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;
            for collaborator in &collaborators {
                self.require_user_exists(&db_tx, collaborator).await?;
                if !self.same_family(&db_tx, user_id, collaborator).await? {
                    return Err(EngineError::InvalidInput(format!(
                        "{collaborator} is not a member of your family"
                    )));
                }
            }

            let id = Uuid::new_v4();
            let model = bank_accounts::ActiveModel {
                id: ActiveValue::Set(id),
                name: ActiveValue::Set(name),
                bank_name: ActiveValue::Set(bank_name),
                account_type: ActiveValue::Set(input.account_type.as_str().to_string()),
                initial_balance_minor: ActiveValue::Set(input.initial_balance_minor),
                current_balance_minor: ActiveValue::Set(input.initial_balance_minor),
                is_shared: ActiveValue::Set(input.is_shared),
                status: ActiveValue::Set(RecordStatus::Active.as_str().to_string()),
                created_by: ActiveValue::Set(user_id.to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;

            self.link_account(&db_tx, id, user_id, MemberRole::Owner)
                .await?;
            for collaborator in &collaborators {
                self.link_account(&db_tx, id, collaborator, MemberRole::Member)
                    .await?;
            }

            BankAccount::try_from(model)
        })
    }

    async fn link_account(
        &self,
        db: &DatabaseTransaction,
        account_id: Uuid,
        user_id: &str,
        role: MemberRole,
    ) -> ResultEngine<()> {
        user_bank_accounts::ActiveModel {
            bank_account_id: ActiveValue::Set(account_id),
            user_id: ActiveValue::Set(user_id.to_string()),
            role: ActiveValue::Set(role.as_str().to_string()),
        }
        .insert(db)
        .await?;
        Ok(())
    }

    /// Accounts linked to the caller plus accounts shared by family members.
    pub async fn bank_accounts(&self, user_id: &str) -> ResultEngine<Vec<BankAccount>> {
        with_tx!(self, |db_tx| {
            let linked: Vec<Uuid> = user_bank_accounts::Entity::find()
                .filter(user_bank_accounts::Column::UserId.eq(user_id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|link| link.bank_account_id)
                .collect();
            let peers = self.family_peers(&db_tx, user_id).await?;

            let mut condition = Condition::any().add(bank_accounts::Column::Id.is_in(linked));
            if !peers.is_empty() {
                condition = condition.add(
                    Condition::all()
                        .add(bank_accounts::Column::IsShared.eq(true))
                        .add(bank_accounts::Column::CreatedBy.is_in(peers)),
                );
            }

            let models = bank_accounts::Entity::find()
                .filter(condition)
                .order_by_asc(bank_accounts::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(BankAccount::try_from).collect()
        })
    }

    pub async fn bank_account(&self, account_id: Uuid, user_id: &str) -> ResultEngine<BankAccount> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_account_read(&db_tx, account_id, user_id)
                .await?;
            BankAccount::try_from(model)
        })
    }

    /// Update an account. Authorization: `OWNER` link required.
    ///
    /// Changing the initial balance shifts the current balance by the same
    /// amount, so paid history stays applied.
    pub async fn update_bank_account(
        &self,
        account_id: Uuid,
        user_id: &str,
        update: BankAccountUpdate,
    ) -> ResultEngine<BankAccount> {
        let name = update
            .name
            .as_deref()
            .map(|n| normalize_required_name(n, "bank account"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let current = self
                .require_account_owner(&db_tx, account_id, user_id)
                .await?;

            let mut active = bank_accounts::ActiveModel {
                id: ActiveValue::Unchanged(account_id),
                ..Default::default()
            };
            let mut changed = false;
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
                changed = true;
            }
            if let Some(bank_name) = update.bank_name.as_deref() {
                active.bank_name = ActiveValue::Set(normalize_optional_text(Some(bank_name)));
                changed = true;
            }
            if let Some(account_type) = update.account_type {
                active.account_type = ActiveValue::Set(account_type.as_str().to_string());
                changed = true;
            }
            if let Some(is_shared) = update.is_shared {
                active.is_shared = ActiveValue::Set(is_shared);
                changed = true;
            }
            if let Some(status) = update.status {
                active.status = ActiveValue::Set(status.as_str().to_string());
                changed = true;
            }
            if changed {
                active.update(&db_tx).await?;
            }

            if let Some(initial) = update.initial_balance_minor {
                let delta = initial - current.initial_balance_minor;
                if delta != 0 {
                    bank_accounts::Entity::update_many()
                        .col_expr(bank_accounts::Column::InitialBalanceMinor, Expr::value(initial))
                        .col_expr(
                            bank_accounts::Column::CurrentBalanceMinor,
                            Expr::col(bank_accounts::Column::CurrentBalanceMinor).add(delta),
                        )
                        .filter(bank_accounts::Column::Id.eq(account_id))
                        .exec(&db_tx)
                        .await?;
                }
            }

            let model = bank_accounts::Entity::find_by_id(account_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("bank account not exists".to_string()))?;
            BankAccount::try_from(model)
        })
    }

    /// Delete an account. Authorization: `OWNER` link required.
    ///
    /// Accounts still referenced by transactions or cards are archived
    /// instead of removed.
    pub async fn delete_bank_account(
        &self,
        account_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Removal> {
        with_tx!(self, |db_tx| {
            self.require_account_owner(&db_tx, account_id, user_id)
                .await?;

            let referenced_by_transactions = transactions::Entity::find()
                .filter(transactions::Column::BankAccountId.eq(account_id))
                .count(&db_tx)
                .await?
                > 0;
            let referenced_by_cards = cards::Entity::find()
                .filter(cards::Column::BankAccountId.eq(account_id))
                .count(&db_tx)
                .await?
                > 0;

            if referenced_by_transactions || referenced_by_cards {
                bank_accounts::ActiveModel {
                    id: ActiveValue::Unchanged(account_id),
                    status: ActiveValue::Set(RecordStatus::Archived.as_str().to_string()),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;
                tracing::info!(%account_id, "bank account archived");
                Ok(Removal::Archived)
            } else {
                user_bank_accounts::Entity::delete_many()
                    .filter(user_bank_accounts::Column::BankAccountId.eq(account_id))
                    .exec(&db_tx)
                    .await?;
                bank_accounts::Entity::delete_by_id(account_id)
                    .exec(&db_tx)
                    .await?;
                tracing::info!(%account_id, "bank account deleted");
                Ok(Removal::Deleted)
            }
        })
    }
}
