//! Card API endpoints

use api_types::{
    Message,
    card::{CardNew, CardType as ApiType, CardUpdate, CardView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Card, CardType, User};
use uuid::Uuid;

use crate::{
    ServerError,
    bank_accounts::{engine_status, map_status, removal_message},
    server::ServerState,
};

fn engine_type(kind: ApiType) -> CardType {
    match kind {
        ApiType::Credit => CardType::Credit,
        ApiType::Debit => CardType::Debit,
    }
}

pub(crate) fn view(card: Card) -> CardView {
    CardView {
        id: card.id,
        name: card.name,
        card_type: match card.card_type {
            CardType::Credit => ApiType::Credit,
            CardType::Debit => ApiType::Debit,
        },
        last_four_digits: card.last_four_digits,
        limit: card.limit_minor,
        closing_day: card.closing_day,
        due_day: card.due_day,
        bank_account_id: card.bank_account_id,
        is_shared: card.is_shared,
        status: map_status(card.status),
        user_id: card.user_id,
        created_at: card.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CardView>>, ServerError> {
    let cards = state.engine.cards(&user.username).await?;
    Ok(Json(cards.into_iter().map(view).collect()))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<CardNew>,
) -> Result<(StatusCode, Json<CardView>), ServerError> {
    let card = state
        .engine
        .create_card(
            &user.username,
            engine::NewCard {
                name: payload.name,
                card_type: engine_type(payload.card_type),
                last_four_digits: payload.last_four_digits,
                limit_minor: payload.limit,
                closing_day: payload.closing_day,
                due_day: payload.due_day,
                bank_account_id: payload.bank_account_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view(card))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CardView>, ServerError> {
    let card = state.engine.card(id, &user.username).await?;
    Ok(Json(view(card)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CardUpdate>,
) -> Result<Json<CardView>, ServerError> {
    let card = state
        .engine
        .update_card(
            id,
            &user.username,
            engine::CardUpdate {
                name: payload.name,
                card_type: payload.card_type.map(engine_type),
                last_four_digits: payload.last_four_digits,
                limit_minor: payload.limit,
                closing_day: payload.closing_day,
                due_day: payload.due_day,
                bank_account_id: payload.bank_account_id,
                is_shared: payload.is_shared,
                status: payload.status.map(engine_status),
            },
        )
        .await?;
    Ok(Json(view(card)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, ServerError> {
    let removal = state.engine.delete_card(id, &user.username).await?;
    Ok(Json(removal_message("card", removal)))
}
