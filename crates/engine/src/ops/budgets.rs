use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Budget, EngineError, ResultEngine, TransactionType, budgets, transactions,
    util::{month_bounds, require_positive, validate_budget_period},
};

use super::{Engine, with_tx};

/// Input for creating a budget.
#[derive(Clone, Debug)]
pub struct NewBudget {
    pub category_id: Uuid,
    pub amount_minor: i64,
    pub month: i32,
    pub year: i32,
}

#[derive(Clone, Debug, Default)]
pub struct BudgetUpdate {
    pub amount_minor: Option<i64>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BudgetListFilter {
    pub month: Option<i32>,
    pub year: Option<i32>,
}

impl Engine {
    /// Sum of paid expense installments/single rows of `model`'s category
    /// dated inside its calendar month.
    async fn budget_spent(
        &self,
        db: &DatabaseTransaction,
        model: &budgets::Model,
    ) -> ResultEngine<i64> {
        let (start, end) = month_bounds(model.month as u32, model.year)?;
        let spent: Option<Option<i64>> = transactions::Entity::find()
            .select_only()
            .column_as(transactions::Column::AmountMinor.sum(), "spent")
            .filter(transactions::Column::UserId.eq(model.user_id.clone()))
            .filter(transactions::Column::CategoryId.eq(model.category_id))
            .filter(transactions::Column::Kind.eq(TransactionType::Expense.as_str()))
            .filter(transactions::Column::IsPaid.eq(true))
            .filter(transactions::Column::CurrentInstallment.ne(0))
            .filter(transactions::Column::Date.gte(start))
            .filter(transactions::Column::Date.lt(end))
            .into_tuple()
            .one(db)
            .await?;
        Ok(spent.flatten().unwrap_or(0))
    }

    async fn load_budget(
        &self,
        db: &DatabaseTransaction,
        model: budgets::Model,
    ) -> ResultEngine<Budget> {
        let spent = self.budget_spent(db, &model).await?;
        Ok(Budget::from((model, spent)))
    }

    async fn require_budget_owner(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<budgets::Model> {
        budgets::Entity::find_by_id(budget_id)
            .one(db)
            .await?
            .filter(|b| b.user_id == user_id)
            .ok_or_else(|| EngineError::KeyNotFound("budget not exists".to_string()))
    }

    /// Create a monthly budget. One budget per (user, category, month, year).
    pub async fn create_budget(&self, user_id: &str, input: NewBudget) -> ResultEngine<Budget> {
        require_positive(input.amount_minor, "budget amount")?;
        validate_budget_period(input.month, input.year)?;

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;
            let category = self
                .require_category_visible(&db_tx, input.category_id, user_id)
                .await?;
            if TransactionType::try_from(category.kind.as_str())? != TransactionType::Expense {
                return Err(EngineError::InvalidInput(
                    "budgets apply to expense categories only".to_string(),
                ));
            }

            let exists = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(user_id.to_string()))
                .filter(budgets::Column::CategoryId.eq(input.category_id))
                .filter(budgets::Column::Month.eq(input.month))
                .filter(budgets::Column::Year.eq(input.year))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(format!(
                    "budget for {} {}/{}",
                    category.name, input.month, input.year
                )));
            }

            let model = budgets::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(user_id.to_string()),
                category_id: ActiveValue::Set(input.category_id),
                amount_minor: ActiveValue::Set(input.amount_minor),
                month: ActiveValue::Set(input.month),
                year: ActiveValue::Set(input.year),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            self.load_budget(&db_tx, model).await
        })
    }

    /// The caller's budgets, optionally narrowed to a month and/or year.
    pub async fn budgets(
        &self,
        user_id: &str,
        filter: BudgetListFilter,
    ) -> ResultEngine<Vec<Budget>> {
        with_tx!(self, |db_tx| {
            let mut query =
                budgets::Entity::find().filter(budgets::Column::UserId.eq(user_id.to_string()));
            if let Some(month) = filter.month {
                query = query.filter(budgets::Column::Month.eq(month));
            }
            if let Some(year) = filter.year {
                query = query.filter(budgets::Column::Year.eq(year));
            }
            let models = query
                .order_by_desc(budgets::Column::Year)
                .order_by_desc(budgets::Column::Month)
                .order_by_asc(budgets::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                out.push(self.load_budget(&db_tx, model).await?);
            }
            Ok(out)
        })
    }

    pub async fn budget(&self, budget_id: Uuid, user_id: &str) -> ResultEngine<Budget> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_budget_owner(&db_tx, budget_id, user_id)
                .await?;
            self.load_budget(&db_tx, model).await
        })
    }

    pub async fn update_budget(
        &self,
        budget_id: Uuid,
        user_id: &str,
        update: BudgetUpdate,
    ) -> ResultEngine<Budget> {
        if let Some(amount) = update.amount_minor {
            require_positive(amount, "budget amount")?;
        }
        with_tx!(self, |db_tx| {
            let model = self
                .require_budget_owner(&db_tx, budget_id, user_id)
                .await?;
            let model = match update.amount_minor {
                Some(amount) => {
                    let mut active: budgets::ActiveModel = model.into();
                    active.amount_minor = ActiveValue::Set(amount);
                    active.update(&db_tx).await?
                }
                None => model,
            };
            self.load_budget(&db_tx, model).await
        })
    }

    pub async fn delete_budget(&self, budget_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget_owner(&db_tx, budget_id, user_id)
                .await?;
            budgets::Entity::delete_by_id(budget_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
