//! Budget API endpoints

use api_types::{
    Message,
    budget::{BudgetNew, BudgetQuery, BudgetUpdate, BudgetView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Budget, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn view(budget: Budget) -> BudgetView {
    BudgetView {
        id: budget.id,
        category_id: budget.category_id,
        amount: budget.amount_minor,
        month: budget.month,
        year: budget.year,
        spent: budget.spent_minor,
        remaining: budget.remaining_minor,
        created_at: budget.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<BudgetQuery>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    let budgets = state
        .engine
        .budgets(
            &user.username,
            engine::BudgetListFilter {
                month: query.month,
                year: query.year,
            },
        )
        .await?;
    Ok(Json(budgets.into_iter().map(view).collect()))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<BudgetView>), ServerError> {
    let budget = state
        .engine
        .create_budget(
            &user.username,
            engine::NewBudget {
                category_id: payload.category_id,
                amount_minor: payload.amount,
                month: payload.month,
                year: payload.year,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view(budget))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BudgetView>, ServerError> {
    let budget = state.engine.budget(id, &user.username).await?;
    Ok(Json(view(budget)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BudgetUpdate>,
) -> Result<Json<BudgetView>, ServerError> {
    let budget = state
        .engine
        .update_budget(
            id,
            &user.username,
            engine::BudgetUpdate {
                amount_minor: payload.amount,
            },
        )
        .await?;
    Ok(Json(view(budget)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_budget(id, &user.username).await?;
    Ok(Json(Message::new("budget deleted")))
}
