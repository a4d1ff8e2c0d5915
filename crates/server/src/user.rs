//! Caller identity, user administration and roles.

use api_types::user::{RoleView, UserNew, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{NewUser, User};

use crate::{ServerError, server::ServerState};

fn view(user: User) -> UserView {
    UserView {
        username: user.username,
        display_name: user.display_name,
        email: user.email,
        role: user.role,
        created_at: user.created_at,
    }
}

pub async fn me(Extension(user): Extension<User>) -> Json<UserView> {
    Json(view(user))
}

/// List every user. Admin only.
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<UserView>>, ServerError> {
    let users = state.engine.list_users(&user.username).await?;
    Ok(Json(users.into_iter().map(view).collect()))
}

/// Create a user. Admin only.
pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let created = state
        .engine
        .create_user(
            &user.username,
            NewUser {
                username: payload.username,
                display_name: payload.display_name,
                email: payload.email,
                admin: payload.admin,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view(created))))
}

pub async fn roles(State(state): State<ServerState>) -> Result<Json<Vec<RoleView>>, ServerError> {
    let roles = state.engine.roles().await?;
    Ok(Json(
        roles
            .into_iter()
            .map(|role| RoleView {
                id: role.id,
                name: role.name,
            })
            .collect(),
    ))
}
