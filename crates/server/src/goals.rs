//! Goal API endpoints

use api_types::{
    Message,
    goal::{GoalContribution, GoalNew, GoalParticipantView, GoalUpdate, GoalView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Goal, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub(crate) fn view(goal: Goal) -> GoalView {
    GoalView {
        id: goal.id,
        name: goal.name,
        description: goal.description,
        target_amount: goal.target_amount_minor,
        current_amount: goal.current_amount_minor,
        deadline: goal.deadline,
        is_completed: goal.is_completed,
        is_shared: goal.is_shared,
        created_by: goal.created_by,
        created_at: goal.created_at,
        participants: goal
            .participants
            .into_iter()
            .map(|p| GoalParticipantView {
                user_id: p.user_id,
                contribution: p.contribution_minor,
            })
            .collect(),
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<GoalView>>, ServerError> {
    let goals = state.engine.goals(&user.username).await?;
    Ok(Json(goals.into_iter().map(view).collect()))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<GoalNew>,
) -> Result<(StatusCode, Json<GoalView>), ServerError> {
    let goal = state
        .engine
        .create_goal(
            &user.username,
            engine::NewGoal {
                name: payload.name,
                description: payload.description,
                target_amount_minor: payload.target_amount,
                deadline: payload.deadline,
                is_shared: payload.is_shared,
                shared_with: payload.shared_with,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view(goal))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GoalView>, ServerError> {
    let goal = state.engine.goal(id, &user.username).await?;
    Ok(Json(view(goal)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GoalUpdate>,
) -> Result<Json<GoalView>, ServerError> {
    let goal = state
        .engine
        .update_goal(
            id,
            &user.username,
            engine::GoalUpdate {
                name: payload.name,
                description: payload.description,
                target_amount_minor: payload.target_amount,
                deadline: payload.deadline,
                is_shared: payload.is_shared,
            },
        )
        .await?;
    Ok(Json(view(goal)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_goal(id, &user.username).await?;
    Ok(Json(Message::new("goal deleted")))
}

pub async fn contribute(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GoalContribution>,
) -> Result<Json<GoalView>, ServerError> {
    let goal = state
        .engine
        .contribute_to_goal(id, &user.username, payload.amount)
        .await?;
    Ok(Json(view(goal)))
}
