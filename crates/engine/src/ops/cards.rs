use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Card, CardType, EngineError, RecordStatus, Removal, ResultEngine, cards, transactions,
    util::{require_positive, validate_day_of_month, validate_last_four_digits},
};

use super::{Engine, normalize_required_name, with_tx};

/// Input for creating a card.
#[derive(Clone, Debug)]
pub struct NewCard {
    pub name: String,
    pub card_type: CardType,
    pub last_four_digits: String,
    pub limit_minor: Option<i64>,
    pub closing_day: Option<i32>,
    pub due_day: Option<i32>,
    pub bank_account_id: Option<Uuid>,
}

/// Partial update of a card. `None` leaves a field untouched.
#[derive(Clone, Debug, Default)]
pub struct CardUpdate {
    pub name: Option<String>,
    pub card_type: Option<CardType>,
    pub last_four_digits: Option<String>,
    pub limit_minor: Option<i64>,
    pub closing_day: Option<i32>,
    pub due_day: Option<i32>,
    pub bank_account_id: Option<Uuid>,
    pub is_shared: Option<bool>,
    pub status: Option<RecordStatus>,
}

fn validate_card_numbers(
    limit_minor: Option<i64>,
    closing_day: Option<i32>,
    due_day: Option<i32>,
) -> ResultEngine<()> {
    if let Some(limit) = limit_minor {
        require_positive(limit, "card limit")?;
    }
    validate_day_of_month(closing_day, "closing day")?;
    validate_day_of_month(due_day, "due day")?;
    Ok(())
}

impl Engine {
    /// Create a card for `user_id`.
    ///
    /// Cards start shared when the owner belongs to a family.
    pub async fn create_card(&self, user_id: &str, input: NewCard) -> ResultEngine<Card> {
        let name = normalize_required_name(&input.name, "card")?;
        let last_four_digits = validate_last_four_digits(&input.last_four_digits)?;
        validate_card_numbers(input.limit_minor, input.closing_day, input.due_day)?;

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;
            if let Some(account_id) = input.bank_account_id {
                self.require_account_usable(&db_tx, account_id, user_id)
                    .await?;
            }
            let is_shared = self.family_membership(&db_tx, user_id).await?.is_some();

            let model = cards::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                name: ActiveValue::Set(name),
                card_type: ActiveValue::Set(input.card_type.as_str().to_string()),
                last_four_digits: ActiveValue::Set(last_four_digits),
                limit_minor: ActiveValue::Set(input.limit_minor),
                closing_day: ActiveValue::Set(input.closing_day),
                due_day: ActiveValue::Set(input.due_day),
                bank_account_id: ActiveValue::Set(input.bank_account_id),
                is_shared: ActiveValue::Set(is_shared),
                status: ActiveValue::Set(RecordStatus::Active.as_str().to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Card::try_from(model)
        })
    }

    /// Own cards plus cards shared by family members.
    pub async fn cards(&self, user_id: &str) -> ResultEngine<Vec<Card>> {
        with_tx!(self, |db_tx| {
            let peers = self.family_peers(&db_tx, user_id).await?;
            let mut condition =
                Condition::any().add(cards::Column::UserId.eq(user_id.to_string()));
            if !peers.is_empty() {
                condition = condition.add(
                    Condition::all()
                        .add(cards::Column::IsShared.eq(true))
                        .add(cards::Column::UserId.is_in(peers)),
                );
            }
            let models = cards::Entity::find()
                .filter(condition)
                .order_by_asc(cards::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Card::try_from).collect()
        })
    }

    pub async fn card(&self, card_id: Uuid, user_id: &str) -> ResultEngine<Card> {
        with_tx!(self, |db_tx| {
            let model = self.require_card_read(&db_tx, card_id, user_id).await?;
            Card::try_from(model)
        })
    }

    /// Update a card. Authorization: card owner.
    pub async fn update_card(
        &self,
        card_id: Uuid,
        user_id: &str,
        update: CardUpdate,
    ) -> ResultEngine<Card> {
        let name = update
            .name
            .as_deref()
            .map(|n| normalize_required_name(n, "card"))
            .transpose()?;
        let last_four_digits = update
            .last_four_digits
            .as_deref()
            .map(validate_last_four_digits)
            .transpose()?;
        validate_card_numbers(update.limit_minor, update.closing_day, update.due_day)?;

        with_tx!(self, |db_tx| {
            let model = self.require_card_owner(&db_tx, card_id, user_id).await?;
            if let Some(account_id) = update.bank_account_id {
                self.require_account_usable(&db_tx, account_id, user_id)
                    .await?;
            }

            let mut active: cards::ActiveModel = model.clone().into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(card_type) = update.card_type {
                active.card_type = ActiveValue::Set(card_type.as_str().to_string());
            }
            if let Some(digits) = last_four_digits {
                active.last_four_digits = ActiveValue::Set(digits);
            }
            if let Some(limit) = update.limit_minor {
                active.limit_minor = ActiveValue::Set(Some(limit));
            }
            if let Some(day) = update.closing_day {
                active.closing_day = ActiveValue::Set(Some(day));
            }
            if let Some(day) = update.due_day {
                active.due_day = ActiveValue::Set(Some(day));
            }
            if let Some(account_id) = update.bank_account_id {
                active.bank_account_id = ActiveValue::Set(Some(account_id));
            }
            if let Some(is_shared) = update.is_shared {
                active.is_shared = ActiveValue::Set(is_shared);
            }
            if let Some(status) = update.status {
                active.status = ActiveValue::Set(status.as_str().to_string());
            }
            let model = if active.is_changed() {
                active.update(&db_tx).await?
            } else {
                model
            };
            Card::try_from(model)
        })
    }

    /// Delete a card. Authorization: card owner.
    ///
    /// Cards referenced by transactions are archived instead of removed.
    pub async fn delete_card(&self, card_id: Uuid, user_id: &str) -> ResultEngine<Removal> {
        with_tx!(self, |db_tx| {
            self.require_card_owner(&db_tx, card_id, user_id).await?;
            let referenced = transactions::Entity::find()
                .filter(transactions::Column::CardId.eq(card_id))
                .count(&db_tx)
                .await?
                > 0;
            if referenced {
                cards::ActiveModel {
                    id: ActiveValue::Unchanged(card_id),
                    status: ActiveValue::Set(RecordStatus::Archived.as_str().to_string()),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;
                Ok(Removal::Archived)
            } else {
                let result = cards::Entity::delete_by_id(card_id).exec(&db_tx).await?;
                if result.rows_affected == 0 {
                    return Err(EngineError::KeyNotFound("card not exists".to_string()));
                }
                Ok(Removal::Deleted)
            }
        })
    }
}
