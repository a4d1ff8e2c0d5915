use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::Duration;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Engine, NewUser};

struct TestApp {
    router: Router,
    alice: String,
    bob: String,
}

async fn test_app() -> TestApp {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();

    for (username, admin) in [("alice", true), ("bob", false)] {
        engine
            .bootstrap_user(NewUser {
                username: username.to_string(),
                display_name: username.to_uppercase(),
                admin,
                ..Default::default()
            })
            .await
            .unwrap();
    }
    let alice = engine
        .issue_session("alice", Duration::hours(1))
        .await
        .unwrap();
    let bob = engine
        .issue_session("bob", Duration::hours(1))
        .await
        .unwrap();

    TestApp {
        router: server::router(engine),
        alice,
        bob,
    }
}

async fn call(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn food_category(app: &TestApp) -> String {
    let (status, body) = call(
        &app.router,
        Method::GET,
        "/categories?type=EXPENSE",
        Some(&app.alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body.as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Food")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = test_app().await;
    let (status, body) = call(&app.router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "ok");
}

#[tokio::test]
async fn protected_routes_reject_missing_or_unknown_tokens() {
    let app = test_app().await;

    let (status, body) = call(&app.router, Method::GET, "/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = call(&app.router, Method::GET, "/me", Some("nope"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(&app.router, Method::GET, "/me", Some(&app.alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["displayName"], "ALICE");
}

#[tokio::test]
async fn users_listing_is_admin_only() {
    let app = test_app().await;
    let (status, body) = call(&app.router, Method::GET, "/users", Some(&app.alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = call(&app.router, Method::GET, "/users", Some(&app.bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn transaction_flow_updates_account_balance() {
    let app = test_app().await;
    let food = food_category(&app).await;

    let (status, account) = call(
        &app.router,
        Method::POST,
        "/bank-accounts",
        Some(&app.alice),
        Some(json!({
            "name": "Checking",
            "bankName": "Bank",
            "accountType": "CHECKING",
            "initialBalance": 10_000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(account["currentBalance"], 10_000);
    let account_id = account["id"].as_str().unwrap().to_string();

    let (status, created) = call(
        &app.router,
        Method::POST,
        "/transactions",
        Some(&app.alice),
        Some(json!({
            "description": "Fridge",
            "amount": 3_000,
            "type": "EXPENSE",
            "date": "2025-03-10T12:00:00Z",
            "isPaid": true,
            "installments": 3,
            "categoryId": food,
            "bankAccountId": account_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let rows = created["transactions"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["currentInstallment"], 1);

    let uri = format!("/bank-accounts/{account_id}");
    let (_, account) = call(&app.router, Method::GET, &uri, Some(&app.alice), None).await;
    assert_eq!(account["currentBalance"], 9_000);

    let (status, page) = call(
        &app.router,
        Method::GET,
        "/transactions?page=1&limit=2",
        Some(&app.alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 3);
    assert_eq!(page["totalPages"], 2);

    let uri = format!(
        "/transactions/{}?deleteAll=true",
        rows[1]["id"].as_str().unwrap()
    );
    let (status, deleted) = call(&app.router, Method::DELETE, &uri, Some(&app.alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["installmentsRemoved"], 3);

    let uri = format!("/bank-accounts/{account_id}");
    let (_, account) = call(&app.router, Method::GET, &uri, Some(&app.alice), None).await;
    assert_eq!(account["currentBalance"], 10_000);
}

#[tokio::test]
async fn errors_carry_status_and_message() {
    let app = test_app().await;
    let food = food_category(&app).await;

    let uri = format!("/transactions/{}", uuid::Uuid::new_v4());
    let (status, body) = call(&app.router, Method::GET, &uri, Some(&app.alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not exists"));

    let (status, body) = call(
        &app.router,
        Method::POST,
        "/transactions",
        Some(&app.alice),
        Some(json!({
            "description": "Nothing",
            "amount": 0,
            "type": "EXPENSE",
            "date": "2025-03-10T12:00:00Z",
            "categoryId": food
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = call(
        &app.router,
        Method::POST,
        "/family",
        Some(&app.alice),
        Some(json!({ "name": "Rossi" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(
        &app.router,
        Method::POST,
        "/family",
        Some(&app.alice),
        Some(json!({ "name": "Again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn invitation_round_trip_over_http() {
    let app = test_app().await;
    call(
        &app.router,
        Method::POST,
        "/family",
        Some(&app.alice),
        Some(json!({ "name": "Rossi" })),
    )
    .await;

    let (status, invitation) = call(
        &app.router,
        Method::POST,
        "/family/invitations",
        Some(&app.alice),
        Some(json!({ "username": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(invitation["status"], "PENDING");

    let uri = format!(
        "/family/invitations/{}",
        invitation["id"].as_str().unwrap()
    );
    let (status, answered) = call(
        &app.router,
        Method::PATCH,
        &uri,
        Some(&app.bob),
        Some(json!({ "action": "accept" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(answered["status"], "ACCEPTED");

    let (status, family) = call(&app.router, Method::GET, "/family", Some(&app.bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(family["members"].as_array().unwrap().len(), 2);

    let (status, data) = call(
        &app.router,
        Method::GET,
        "/family/members/alice/data",
        Some(&app.bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(data["bankAccounts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn run_reports_an_address_already_in_use() {
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = taken.local_addr().unwrap();

    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();

    let err = server::run(engine, addr).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::AddrInUse);
}
