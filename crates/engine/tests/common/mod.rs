#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    AccountType, Category, Engine, NewBankAccount, NewTransaction, NewUser, TransactionType,
};
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    for username in ["alice", "bob", "carol"] {
        engine
            .bootstrap_user(NewUser {
                username: username.to_string(),
                display_name: username.to_uppercase(),
                ..Default::default()
            })
            .await
            .unwrap();
    }
    (engine, db)
}

pub fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

pub async fn default_category(engine: &Engine, user: &str, name: &str) -> Category {
    engine
        .categories(user, None)
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.is_default && c.name == name)
        .unwrap()
}

pub async fn checking(engine: &Engine, user: &str, initial_balance_minor: i64) -> Uuid {
    engine
        .create_bank_account(
            user,
            NewBankAccount {
                name: "Checking".to_string(),
                bank_name: Some("Bank".to_string()),
                account_type: AccountType::Checking,
                initial_balance_minor,
                is_shared: false,
                collaborators: Vec::new(),
            },
        )
        .await
        .unwrap()
        .id
}

pub async fn balance(engine: &Engine, user: &str, account_id: Uuid) -> i64 {
    engine
        .bank_account(account_id, user)
        .await
        .unwrap()
        .current_balance_minor
}

pub fn expense(category_id: Uuid, account_id: Option<Uuid>, amount_minor: i64) -> NewTransaction {
    NewTransaction {
        description: "Groceries".to_string(),
        amount_minor,
        kind: TransactionType::Expense,
        date: day(2025, 1, 15),
        is_paid: true,
        is_recurring: false,
        recurring_type: None,
        installments: 1,
        category_id,
        bank_account_id: account_id,
        card_id: None,
        is_shared: false,
    }
}

/// `alice` owns a family that `bob` has joined.
pub async fn family_of_alice_and_bob(engine: &Engine) {
    engine.create_family("alice", "Rossi").await.unwrap();
    let invitation = engine.invite("alice", "bob").await.unwrap();
    engine
        .respond_to_invitation(invitation.id, "bob", engine::InvitationAction::Accept)
        .await
        .unwrap();
}
