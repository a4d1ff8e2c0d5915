use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    BankAccount, Card, Category, EngineError, Goal, ResultEngine, Transaction, TransactionType,
    bank_accounts, cards, categories, goals, transactions,
};

use super::{Engine, with_tx};

/// Kind of record whose `is_shared` flag can be toggled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShareTarget {
    BankAccount,
    Card,
    Category,
    Goal,
    Transaction,
}

impl ShareTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BankAccount => "bank_account",
            Self::Card => "card",
            Self::Category => "category",
            Self::Goal => "goal",
            Self::Transaction => "transaction",
        }
    }
}

/// Everything a family member has flagged as shared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemberSharedData {
    pub bank_accounts: Vec<BankAccount>,
    pub cards: Vec<Card>,
    pub categories: Vec<Category>,
    pub goals: Vec<Goal>,
    pub transactions: Vec<Transaction>,
}

impl Engine {
    /// Set the `is_shared` flag of a record. Authorization: record owner.
    pub async fn set_shared(
        &self,
        user_id: &str,
        target: ShareTarget,
        item_id: Uuid,
        shared: bool,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            match target {
                ShareTarget::BankAccount => {
                    self.require_account_owner(&db_tx, item_id, user_id).await?;
                    bank_accounts::ActiveModel {
                        id: ActiveValue::Unchanged(item_id),
                        is_shared: ActiveValue::Set(shared),
                        ..Default::default()
                    }
                    .update(&db_tx)
                    .await?;
                }
                ShareTarget::Card => {
                    self.require_card_owner(&db_tx, item_id, user_id).await?;
                    cards::ActiveModel {
                        id: ActiveValue::Unchanged(item_id),
                        is_shared: ActiveValue::Set(shared),
                        ..Default::default()
                    }
                    .update(&db_tx)
                    .await?;
                }
                ShareTarget::Category => {
                    let model = self
                        .require_category_owner(&db_tx, item_id, user_id)
                        .await?;
                    if shared && !model.is_shared {
                        self.ensure_category_unique(
                            &db_tx,
                            user_id,
                            &model.name_norm,
                            TransactionType::try_from(model.kind.as_str())?,
                            true,
                            Some(item_id),
                        )
                        .await?;
                    }
                    categories::ActiveModel {
                        id: ActiveValue::Unchanged(item_id),
                        is_shared: ActiveValue::Set(shared),
                        ..Default::default()
                    }
                    .update(&db_tx)
                    .await?;
                }
                ShareTarget::Goal => {
                    self.require_goal_creator(&db_tx, item_id, user_id).await?;
                    goals::ActiveModel {
                        id: ActiveValue::Unchanged(item_id),
                        is_shared: ActiveValue::Set(shared),
                        ..Default::default()
                    }
                    .update(&db_tx)
                    .await?;
                }
                ShareTarget::Transaction => {
                    self.require_transaction_owner(&db_tx, item_id, user_id)
                        .await?;
                    transactions::ActiveModel {
                        id: ActiveValue::Unchanged(item_id),
                        is_shared: ActiveValue::Set(shared),
                        ..Default::default()
                    }
                    .update(&db_tx)
                    .await?;
                }
            }
            tracing::info!(
                user_id,
                target = target.as_str(),
                %item_id,
                shared,
                "sharing updated"
            );
            Ok(())
        })
    }

    /// Records `member_id` has shared, as seen by `viewer_id`.
    ///
    /// Both users must sit in the same family; otherwise the member is
    /// reported as not found. Series parents are left out of transactions.
    pub async fn member_shared_data(
        &self,
        viewer_id: &str,
        member_id: &str,
    ) -> ResultEngine<MemberSharedData> {
        with_tx!(self, |db_tx| {
            if viewer_id != member_id
                && !self.same_family(&db_tx, viewer_id, member_id).await?
            {
                return Err(EngineError::KeyNotFound("member not exists".to_string()));
            }

            let bank_accounts = bank_accounts::Entity::find()
                .filter(bank_accounts::Column::CreatedBy.eq(member_id.to_string()))
                .filter(bank_accounts::Column::IsShared.eq(true))
                .order_by_asc(bank_accounts::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(BankAccount::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            let cards = cards::Entity::find()
                .filter(cards::Column::UserId.eq(member_id.to_string()))
                .filter(cards::Column::IsShared.eq(true))
                .order_by_asc(cards::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Card::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            let categories = categories::Entity::find()
                .filter(categories::Column::UserId.eq(member_id.to_string()))
                .filter(categories::Column::IsDefault.eq(false))
                .filter(categories::Column::IsShared.eq(true))
                .order_by_asc(categories::Column::Name)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Category::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            let goal_models = goals::Entity::find()
                .filter(goals::Column::CreatedBy.eq(member_id.to_string()))
                .filter(goals::Column::IsShared.eq(true))
                .order_by_asc(goals::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            let mut goals = Vec::with_capacity(goal_models.len());
            for model in goal_models {
                goals.push(self.load_goal(&db_tx, model).await?);
            }
            let transactions = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(member_id.to_string()))
                .filter(transactions::Column::IsShared.eq(true))
                .filter(transactions::Column::CurrentInstallment.ne(0))
                .order_by_desc(transactions::Column::Date)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Transaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            Ok(MemberSharedData {
                bank_accounts,
                cards,
                categories,
                goals,
                transactions,
            })
        })
    }
}
