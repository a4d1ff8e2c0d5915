use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Category, EngineError, ResultEngine, TransactionType, budgets, categories, transactions,
    util::{normalize_category_display, normalize_category_key},
};

use super::{Engine, normalize_optional_text, with_tx};

/// Input for creating a category.
#[derive(Clone, Debug)]
pub struct NewCategory {
    pub name: String,
    pub kind: TransactionType,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_shared: bool,
}

/// Partial update of a category. `None` leaves a field untouched.
#[derive(Clone, Debug, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_shared: Option<bool>,
}

impl Engine {
    /// Categories a user can see: system defaults, their own, and the ones
    /// family members share.
    fn visible_categories_condition(user_id: &str, peers: Vec<String>) -> Condition {
        let mut condition = Condition::any()
            .add(categories::Column::IsDefault.eq(true))
            .add(categories::Column::UserId.eq(user_id.to_string()));
        if !peers.is_empty() {
            condition = condition.add(
                Condition::all()
                    .add(categories::Column::IsShared.eq(true))
                    .add(categories::Column::UserId.is_in(peers)),
            );
        }
        condition
    }

    /// Rejects a name that would collide with a category already visible to
    /// the owner, or to the owner's family when the category is shared.
    pub(super) async fn ensure_category_unique(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        name_norm: &str,
        kind: TransactionType,
        is_shared: bool,
        exclude: Option<Uuid>,
    ) -> ResultEngine<()> {
        let peers = self.family_peers(db, user_id).await?;
        let mut scope = Self::visible_categories_condition(user_id, peers.clone());
        if is_shared && !peers.is_empty() {
            scope = scope.add(categories::Column::UserId.is_in(peers));
        }

        let mut query = categories::Entity::find()
            .filter(scope)
            .filter(categories::Column::NameNorm.eq(name_norm.to_string()))
            .filter(categories::Column::Kind.eq(kind.as_str()));
        if let Some(id) = exclude {
            query = query.filter(categories::Column::Id.ne(id));
        }
        if let Some(existing) = query.one(db).await? {
            return Err(EngineError::ExistingKey(existing.name));
        }
        Ok(())
    }

    /// List visible categories, optionally narrowed to one type.
    pub async fn categories(
        &self,
        user_id: &str,
        kind: Option<TransactionType>,
    ) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            let peers = self.family_peers(&db_tx, user_id).await?;
            let mut query = categories::Entity::find()
                .filter(Self::visible_categories_condition(user_id, peers));
            if let Some(kind) = kind {
                query = query.filter(categories::Column::Kind.eq(kind.as_str()));
            }
            let models = query
                .order_by_desc(categories::Column::IsDefault)
                .order_by_asc(categories::Column::NameNorm)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Category::try_from).collect()
        })
    }

    pub async fn category(&self, category_id: Uuid, user_id: &str) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_category_visible(&db_tx, category_id, user_id)
                .await?;
            Category::try_from(model)
        })
    }

    pub async fn create_category(
        &self,
        user_id: &str,
        input: NewCategory,
    ) -> ResultEngine<Category> {
        let name = normalize_category_display(&input.name)?;
        let name_norm = normalize_category_key(&name)?;

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;
            self.ensure_category_unique(
                &db_tx,
                user_id,
                &name_norm,
                input.kind,
                input.is_shared,
                None,
            )
            .await?;

            let model = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                name: ActiveValue::Set(name),
                name_norm: ActiveValue::Set(name_norm),
                kind: ActiveValue::Set(input.kind.as_str().to_string()),
                color: ActiveValue::Set(normalize_optional_text(input.color.as_deref())),
                icon: ActiveValue::Set(normalize_optional_text(input.icon.as_deref())),
                is_default: ActiveValue::Set(false),
                is_shared: ActiveValue::Set(input.is_shared),
                user_id: ActiveValue::Set(Some(user_id.to_string())),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Category::try_from(model)
        })
    }

    /// Update a category. Defaults are immutable; only the owner may edit.
    pub async fn update_category(
        &self,
        category_id: Uuid,
        user_id: &str,
        update: CategoryUpdate,
    ) -> ResultEngine<Category> {
        let display = update
            .name
            .as_deref()
            .map(normalize_category_display)
            .transpose()?;

        with_tx!(self, |db_tx| {
            let model = self
                .require_category_owner(&db_tx, category_id, user_id)
                .await?;
            let kind = TransactionType::try_from(model.kind.as_str())?;
            let is_shared = update.is_shared.unwrap_or(model.is_shared);
            let name_norm = match display.as_deref() {
                Some(name) => normalize_category_key(name)?,
                None => model.name_norm.clone(),
            };
            if display.is_some() || is_shared != model.is_shared {
                self.ensure_category_unique(
                    &db_tx,
                    user_id,
                    &name_norm,
                    kind,
                    is_shared,
                    Some(category_id),
                )
                .await?;
            }

            let mut active: categories::ActiveModel = model.into();
            if let Some(name) = display {
                active.name = ActiveValue::Set(name);
                active.name_norm = ActiveValue::Set(name_norm);
            }
            if let Some(color) = update.color.as_deref() {
                active.color = ActiveValue::Set(normalize_optional_text(Some(color)));
            }
            if let Some(icon) = update.icon.as_deref() {
                active.icon = ActiveValue::Set(normalize_optional_text(Some(icon)));
            }
            active.is_shared = ActiveValue::Set(is_shared);
            let model = active.update(&db_tx).await?;
            Category::try_from(model)
        })
    }

    /// Delete a category. Refused while transactions or budgets use it.
    pub async fn delete_category(&self, category_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_category_owner(&db_tx, category_id, user_id)
                .await?;
            let used_by_transactions = transactions::Entity::find()
                .filter(transactions::Column::CategoryId.eq(category_id))
                .count(&db_tx)
                .await?;
            let used_by_budgets = budgets::Entity::find()
                .filter(budgets::Column::CategoryId.eq(category_id))
                .count(&db_tx)
                .await?;
            if used_by_transactions > 0 || used_by_budgets > 0 {
                return Err(EngineError::ExistingKey(format!(
                    "category {} is in use",
                    model.name
                )));
            }
            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
