use axum::{
    Json, Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use std::{net::SocketAddr, sync::Arc};

use crate::{
    ServerError, bank_accounts, budgets, cards, categories, family, goals, transactions, user,
};
use api_types::Message;
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolve `Authorization: Bearer <token>` to a user and stash it in the
/// request extensions for the handlers.
async fn auth(
    auth_header: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Ok(TypedHeader(Authorization(bearer))) = auth_header else {
        return Err(ServerError::Unauthorized);
    };
    let token = bearer.token();
    if token.is_empty() {
        return Err(ServerError::Unauthorized);
    }

    let user = match state.engine.user_for_session(token).await {
        Ok(user) => user,
        Err(EngineError::KeyNotFound(_)) => return Err(ServerError::Unauthorized),
        Err(err) => return Err(err.into()),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn health() -> Json<Message> {
    Json(Message::new("ok"))
}

/// Build the API router. Everything except `/health` sits behind [`auth`].
pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    let protected = Router::new()
        .route("/me", get(user::me))
        .route("/users", get(user::list).post(user::create))
        .route("/roles", get(user::roles))
        .route(
            "/bank-accounts",
            get(bank_accounts::list).post(bank_accounts::create),
        )
        .route(
            "/bank-accounts/{id}",
            get(bank_accounts::get)
                .patch(bank_accounts::update)
                .delete(bank_accounts::delete),
        )
        .route("/cards", get(cards::list).post(cards::create))
        .route(
            "/cards/{id}",
            get(cards::get).patch(cards::update).delete(cards::delete),
        )
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            get(categories::get)
                .patch(categories::update)
                .delete(categories::delete),
        )
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .patch(transactions::update)
                .delete(transactions::delete),
        )
        .route("/goals", get(goals::list).post(goals::create))
        .route(
            "/goals/{id}",
            get(goals::get).patch(goals::update).delete(goals::delete),
        )
        .route("/goals/{id}/contribute", post(goals::contribute))
        .route("/budgets", get(budgets::list).post(budgets::create))
        .route(
            "/budgets/{id}",
            get(budgets::get).patch(budgets::update).delete(budgets::delete),
        )
        .route(
            "/family",
            get(family::get).post(family::create).delete(family::delete),
        )
        .route("/family/leave", post(family::leave))
        .route(
            "/family/invitations",
            get(family::invitations).post(family::invite),
        )
        .route("/family/invitations/{id}", patch(family::respond))
        .route(
            "/family/members/{username}",
            axum::routing::delete(family::remove_member),
        )
        .route(
            "/family/members/{username}/data",
            get(family::member_data),
        )
        .route("/family/share", post(family::share))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .with_state(state)
}

/// Bind `addr` and serve until the listener fails. Bind errors are returned
/// to the caller.
pub async fn run(engine: Engine, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await.inspect_err(|err| {
        tracing::error!("failed to bind server listener on {addr}: {err}");
    })?;
    run_with_listener(engine, listener).await
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine)).await
}
