use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{EngineError, Goal, ResultEngine, goals, user_goals, util::require_positive};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

/// Input for creating a goal.
#[derive(Clone, Debug)]
pub struct NewGoal {
    pub name: String,
    pub description: Option<String>,
    pub target_amount_minor: i64,
    pub deadline: Option<NaiveDate>,
    pub is_shared: bool,
    /// Family members who can contribute alongside the creator.
    pub shared_with: Vec<String>,
}

/// Partial update of a goal. `None` leaves a field untouched.
#[derive(Clone, Debug, Default)]
pub struct GoalUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub target_amount_minor: Option<i64>,
    pub deadline: Option<NaiveDate>,
    pub is_shared: Option<bool>,
}

impl Engine {
    pub(super) async fn load_goal(
        &self,
        db: &DatabaseTransaction,
        model: goals::Model,
    ) -> ResultEngine<Goal> {
        let links = user_goals::Entity::find()
            .filter(user_goals::Column::GoalId.eq(model.id))
            .order_by_asc(user_goals::Column::UserId)
            .all(db)
            .await?;
        Ok(Goal::from((model, links)))
    }

    /// Create a goal. The creator and every `shared_with` user get a
    /// participant row with a zero contribution.
    pub async fn create_goal(&self, user_id: &str, input: NewGoal) -> ResultEngine<Goal> {
        let name = normalize_required_name(&input.name, "goal")?;
        require_positive(input.target_amount_minor, "target amount")?;
        let shared_with: BTreeSet<String> = input
            .shared_with
            .iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty() && u != user_id)
            .collect();

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;
            for participant in &shared_with {
                self.require_user_exists(&db_tx, participant).await?;
                if !self.same_family(&db_tx, user_id, participant).await? {
                    return Err(EngineError::InvalidInput(format!(
                        "{participant} is not a member of your family"
                    )));
                }
            }

            let id = Uuid::new_v4();
            let model = goals::ActiveModel {
                id: ActiveValue::Set(id),
                name: ActiveValue::Set(name),
                description: ActiveValue::Set(normalize_optional_text(
                    input.description.as_deref(),
                )),
                target_amount_minor: ActiveValue::Set(input.target_amount_minor),
                current_amount_minor: ActiveValue::Set(0),
                deadline: ActiveValue::Set(input.deadline),
                is_completed: ActiveValue::Set(false),
                is_shared: ActiveValue::Set(input.is_shared),
                created_by: ActiveValue::Set(user_id.to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;

            let participants =
                std::iter::once(user_id).chain(shared_with.iter().map(String::as_str));
            for participant in participants {
                user_goals::ActiveModel {
                    goal_id: ActiveValue::Set(id),
                    user_id: ActiveValue::Set(participant.to_string()),
                    contribution_minor: ActiveValue::Set(0),
                }
                .insert(&db_tx)
                .await?;
            }

            self.load_goal(&db_tx, model).await
        })
    }

    /// Goals the caller participates in plus goals shared by family members.
    pub async fn goals(&self, user_id: &str) -> ResultEngine<Vec<Goal>> {
        with_tx!(self, |db_tx| {
            let linked: Vec<Uuid> = user_goals::Entity::find()
                .filter(user_goals::Column::UserId.eq(user_id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|link| link.goal_id)
                .collect();
            let peers = self.family_peers(&db_tx, user_id).await?;

            let mut condition = Condition::any()
                .add(goals::Column::Id.is_in(linked))
                .add(goals::Column::CreatedBy.eq(user_id.to_string()));
            if !peers.is_empty() {
                condition = condition.add(
                    Condition::all()
                        .add(goals::Column::IsShared.eq(true))
                        .add(goals::Column::CreatedBy.is_in(peers)),
                );
            }
            let models = goals::Entity::find()
                .filter(condition)
                .order_by_asc(goals::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                out.push(self.load_goal(&db_tx, model).await?);
            }
            Ok(out)
        })
    }

    pub async fn goal(&self, goal_id: Uuid, user_id: &str) -> ResultEngine<Goal> {
        with_tx!(self, |db_tx| {
            let model = self.require_goal_read(&db_tx, goal_id, user_id).await?;
            self.load_goal(&db_tx, model).await
        })
    }

    /// Update a goal. Authorization: goal creator.
    ///
    /// Raising the target never clears `is_completed`; lowering it below the
    /// current amount completes the goal.
    pub async fn update_goal(
        &self,
        goal_id: Uuid,
        user_id: &str,
        update: GoalUpdate,
    ) -> ResultEngine<Goal> {
        let name = update
            .name
            .as_deref()
            .map(|n| normalize_required_name(n, "goal"))
            .transpose()?;
        if let Some(target) = update.target_amount_minor {
            require_positive(target, "target amount")?;
        }

        with_tx!(self, |db_tx| {
            let model = self.require_goal_creator(&db_tx, goal_id, user_id).await?;
            let mut active: goals::ActiveModel = model.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(description) = update.description.as_deref() {
                active.description = ActiveValue::Set(normalize_optional_text(Some(description)));
            }
            if let Some(target) = update.target_amount_minor {
                active.target_amount_minor = ActiveValue::Set(target);
            }
            if let Some(deadline) = update.deadline {
                active.deadline = ActiveValue::Set(Some(deadline));
            }
            if let Some(is_shared) = update.is_shared {
                active.is_shared = ActiveValue::Set(is_shared);
            }
            if active.is_changed() {
                active.update(&db_tx).await?;
            }
            self.mark_goal_completed(&db_tx, goal_id).await?;

            let model = goals::Entity::find_by_id(goal_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("goal not exists".to_string()))?;
            self.load_goal(&db_tx, model).await
        })
    }

    /// Delete a goal and its participant rows. Authorization: goal creator.
    pub async fn delete_goal(&self, goal_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_goal_creator(&db_tx, goal_id, user_id).await?;
            user_goals::Entity::delete_many()
                .filter(user_goals::Column::GoalId.eq(goal_id))
                .exec(&db_tx)
                .await?;
            goals::Entity::delete_by_id(goal_id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Add `amount_minor` to the caller's contribution and to the goal total.
    ///
    /// Both increments are single `UPDATE ... + amount` statements. The goal
    /// flips to completed once the total reaches the target and never flips
    /// back. Completed goals still accept contributions.
    pub async fn contribute_to_goal(
        &self,
        goal_id: Uuid,
        user_id: &str,
        amount_minor: i64,
    ) -> ResultEngine<Goal> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "contribution must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let linked = user_goals::Entity::update_many()
                .col_expr(
                    user_goals::Column::ContributionMinor,
                    Expr::col(user_goals::Column::ContributionMinor).add(amount_minor),
                )
                .filter(user_goals::Column::GoalId.eq(goal_id))
                .filter(user_goals::Column::UserId.eq(user_id.to_string()))
                .exec(&db_tx)
                .await?
                .rows_affected;
            if linked == 0 {
                return Err(EngineError::KeyNotFound("goal not exists".to_string()));
            }

            goals::Entity::update_many()
                .col_expr(
                    goals::Column::CurrentAmountMinor,
                    Expr::col(goals::Column::CurrentAmountMinor).add(amount_minor),
                )
                .filter(goals::Column::Id.eq(goal_id))
                .exec(&db_tx)
                .await?;
            self.mark_goal_completed(&db_tx, goal_id).await?;

            let model = goals::Entity::find_by_id(goal_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("goal not exists".to_string()))?;
            tracing::info!(
                %goal_id,
                user_id,
                amount_minor,
                current = model.current_amount_minor,
                "goal contribution recorded"
            );
            self.load_goal(&db_tx, model).await
        })
    }

    async fn mark_goal_completed(
        &self,
        db: &DatabaseTransaction,
        goal_id: Uuid,
    ) -> ResultEngine<()> {
        goals::Entity::update_many()
            .col_expr(goals::Column::IsCompleted, Expr::value(true))
            .filter(goals::Column::Id.eq(goal_id))
            .filter(goals::Column::IsCompleted.eq(false))
            .filter(
                Expr::col(goals::Column::CurrentAmountMinor)
                    .gte(Expr::col(goals::Column::TargetAmountMinor)),
            )
            .exec(db)
            .await?;
        Ok(())
    }
}
