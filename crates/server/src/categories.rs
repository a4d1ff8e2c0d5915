//! Categories API endpoints.

use api_types::{
    Message,
    category::{CategoryNew, CategoryQuery, CategoryUpdate, CategoryView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Category, User};
use uuid::Uuid;

use crate::{
    ServerError,
    server::ServerState,
    transactions::{engine_kind, map_kind},
};

pub(crate) fn view(category: Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        kind: map_kind(category.kind),
        color: category.color,
        icon: category.icon,
        is_default: category.is_default,
        is_shared: category.is_shared,
        user_id: category.user_id,
        created_at: category.created_at,
    }
}

/// Defaults, own categories and the ones shared by the family.
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state
        .engine
        .categories(&user.username, query.kind.map(engine_kind))
        .await?;
    Ok(Json(categories.into_iter().map(view).collect()))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .create_category(
            &user.username,
            engine::NewCategory {
                name: payload.name,
                kind: engine_kind(payload.kind),
                color: payload.color,
                icon: payload.icon,
                is_shared: payload.is_shared,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view(category))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.engine.category(id, &user.username).await?;
    Ok(Json(view(category)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state
        .engine
        .update_category(
            id,
            &user.username,
            engine::CategoryUpdate {
                name: payload.name,
                color: payload.color,
                icon: payload.icon,
                is_shared: payload.is_shared,
            },
        )
        .await?;
    Ok(Json(view(category)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_category(id, &user.username).await?;
    Ok(Json(Message::new("category deleted")))
}
