//! Bank account API endpoints

use api_types::{
    Message, RecordStatus as ApiStatus,
    bank_account::{AccountType as ApiType, BankAccountNew, BankAccountUpdate, BankAccountView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{AccountType, BankAccount, RecordStatus, Removal, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub(crate) fn map_status(status: RecordStatus) -> ApiStatus {
    match status {
        RecordStatus::Active => ApiStatus::Active,
        RecordStatus::Archived => ApiStatus::Archived,
    }
}

pub(crate) fn engine_status(status: ApiStatus) -> RecordStatus {
    match status {
        ApiStatus::Active => RecordStatus::Active,
        ApiStatus::Archived => RecordStatus::Archived,
    }
}

fn map_type(kind: AccountType) -> ApiType {
    match kind {
        AccountType::Checking => ApiType::Checking,
        AccountType::Savings => ApiType::Savings,
        AccountType::Investment => ApiType::Investment,
        AccountType::Other => ApiType::Other,
    }
}

fn engine_type(kind: ApiType) -> AccountType {
    match kind {
        ApiType::Checking => AccountType::Checking,
        ApiType::Savings => AccountType::Savings,
        ApiType::Investment => AccountType::Investment,
        ApiType::Other => AccountType::Other,
    }
}

pub(crate) fn view(account: BankAccount) -> BankAccountView {
    BankAccountView {
        id: account.id,
        name: account.name,
        bank_name: account.bank_name,
        account_type: map_type(account.account_type),
        initial_balance: account.initial_balance_minor,
        current_balance: account.current_balance_minor,
        is_shared: account.is_shared,
        status: map_status(account.status),
        created_by: account.created_by,
        created_at: account.created_at,
    }
}

pub(crate) fn removal_message(what: &str, removal: Removal) -> Message {
    match removal {
        Removal::Archived => Message::new(format!("{what} archived: it is still referenced")),
        Removal::Deleted => Message::new(format!("{what} deleted")),
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BankAccountView>>, ServerError> {
    let accounts = state.engine.bank_accounts(&user.username).await?;
    Ok(Json(accounts.into_iter().map(view).collect()))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<BankAccountNew>,
) -> Result<(StatusCode, Json<BankAccountView>), ServerError> {
    let account = state
        .engine
        .create_bank_account(
            &user.username,
            engine::NewBankAccount {
                name: payload.name,
                bank_name: payload.bank_name,
                account_type: engine_type(payload.account_type),
                initial_balance_minor: payload.initial_balance,
                is_shared: payload.is_shared,
                collaborators: payload.collaborators,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view(account))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BankAccountView>, ServerError> {
    let account = state.engine.bank_account(id, &user.username).await?;
    Ok(Json(view(account)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BankAccountUpdate>,
) -> Result<Json<BankAccountView>, ServerError> {
    let account = state
        .engine
        .update_bank_account(
            id,
            &user.username,
            engine::BankAccountUpdate {
                name: payload.name,
                bank_name: payload.bank_name,
                account_type: payload.account_type.map(engine_type),
                initial_balance_minor: payload.initial_balance,
                is_shared: payload.is_shared,
                status: payload.status.map(engine_status),
            },
        )
        .await?;
    Ok(Json(view(account)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, ServerError> {
    let removal = state.engine.delete_bank_account(id, &user.username).await?;
    Ok(Json(removal_message("bank account", removal)))
}
