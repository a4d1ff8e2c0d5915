//! Transactions API endpoints

use api_types::transaction::{
    RecurringType as ApiRecurring, TransactionCreated, TransactionDeleteQuery,
    TransactionDeleted, TransactionListResponse, TransactionNew, TransactionQuery,
    TransactionType as ApiKind, TransactionUpdate, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{RecurringType, Transaction, TransactionType, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub(crate) fn map_kind(kind: TransactionType) -> ApiKind {
    match kind {
        TransactionType::Income => ApiKind::Income,
        TransactionType::Expense => ApiKind::Expense,
    }
}

pub(crate) fn engine_kind(kind: ApiKind) -> TransactionType {
    match kind {
        ApiKind::Income => TransactionType::Income,
        ApiKind::Expense => TransactionType::Expense,
    }
}

fn map_recurring(kind: RecurringType) -> ApiRecurring {
    match kind {
        RecurringType::Daily => ApiRecurring::Daily,
        RecurringType::Weekly => ApiRecurring::Weekly,
        RecurringType::Monthly => ApiRecurring::Monthly,
        RecurringType::Yearly => ApiRecurring::Yearly,
    }
}

fn engine_recurring(kind: ApiRecurring) -> RecurringType {
    match kind {
        ApiRecurring::Daily => RecurringType::Daily,
        ApiRecurring::Weekly => RecurringType::Weekly,
        ApiRecurring::Monthly => RecurringType::Monthly,
        ApiRecurring::Yearly => RecurringType::Yearly,
    }
}

pub(crate) fn view(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        description: tx.description,
        amount: tx.amount_minor,
        kind: map_kind(tx.kind),
        date: tx.date,
        is_paid: tx.is_paid,
        is_recurring: tx.is_recurring,
        recurring_type: tx.recurring_type.map(map_recurring),
        installments: tx.installments,
        current_installment: tx.current_installment,
        parent_transaction_id: tx.parent_transaction_id,
        category_id: tx.category_id,
        bank_account_id: tx.bank_account_id,
        card_id: tx.card_id,
        is_shared: tx.is_shared,
        user_id: tx.user_id,
        created_at: tx.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let filter = engine::TransactionListFilter {
        kind: query.kind.map(engine_kind),
        category_id: query.category_id,
        bank_account_id: query.bank_account_id,
        card_id: query.card_id,
        is_paid: query.is_paid,
        start_date: query.start_date,
        end_date: query.end_date,
        page: query.page,
        limit: query.limit,
    };
    let page = state.engine.transactions(&user.username, filter).await?;

    Ok(Json(TransactionListResponse {
        items: page.items.into_iter().map(view).collect(),
        total: page.total,
        page: page.page,
        limit: page.limit,
        total_pages: page.total_pages,
    }))
}

/// Create a single transaction or an installment series.
pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let rows = state
        .engine
        .create_transaction(
            &user.username,
            engine::NewTransaction {
                description: payload.description,
                amount_minor: payload.amount,
                kind: engine_kind(payload.kind),
                date: payload.date,
                is_paid: payload.is_paid,
                is_recurring: payload.is_recurring,
                recurring_type: payload.recurring_type.map(engine_recurring),
                installments: payload.installments,
                category_id: payload.category_id,
                bank_account_id: payload.bank_account_id,
                card_id: payload.card_id,
                is_shared: payload.is_shared,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionCreated {
            transactions: rows.into_iter().map(view).collect(),
        }),
    ))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(id, &user.username).await?;
    Ok(Json(view(tx)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .update_transaction(
            id,
            &user.username,
            engine::TransactionUpdate {
                description: payload.description,
                amount_minor: payload.amount,
                kind: payload.kind.map(engine_kind),
                date: payload.date,
                is_paid: payload.is_paid,
                is_recurring: payload.is_recurring,
                recurring_type: payload.recurring_type.map(engine_recurring),
                category_id: payload.category_id,
                bank_account_id: payload.bank_account_id,
                card_id: payload.card_id,
                is_shared: payload.is_shared,
            },
        )
        .await?;
    Ok(Json(view(tx)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(query): Query<TransactionDeleteQuery>,
) -> Result<Json<TransactionDeleted>, ServerError> {
    let deletion = state
        .engine
        .delete_transaction(id, &user.username, query.delete_all)
        .await?;
    Ok(Json(TransactionDeleted {
        message: "transaction deleted".to_string(),
        removed: deletion.removed,
        installments_removed: deletion.installments_removed,
    }))
}
