mod common;

use chrono::Duration;

use common::{checking, default_category, engine_with_db, expense, family_of_alice_and_bob};
use engine::{
    CardType, EngineError, NewCard, NewCategory, NewTransaction, NewUser, ShareTarget,
    TransactionType,
};

fn visa() -> NewCard {
    NewCard {
        name: "Visa".to_string(),
        card_type: CardType::Credit,
        last_four_digits: "4242".to_string(),
        limit_minor: Some(500_000),
        closing_day: Some(5),
        due_day: Some(15),
        bank_account_id: None,
    }
}

#[tokio::test]
async fn member_data_holds_only_shared_records() {
    let (engine, _db) = engine_with_db().await;
    family_of_alice_and_bob(&engine).await;
    let food = default_category(&engine, "bob", "Food").await;

    let hidden_account = checking(&engine, "bob", 100).await;
    let open_account = checking(&engine, "bob", 200).await;
    engine
        .set_shared("bob", ShareTarget::BankAccount, open_account, true)
        .await
        .unwrap();

    let card = engine.create_card("bob", visa()).await.unwrap();
    assert!(card.is_shared);
    engine
        .set_shared("bob", ShareTarget::Card, card.id, false)
        .await
        .unwrap();

    let shared_tx = engine
        .create_transaction(
            "bob",
            NewTransaction {
                is_shared: true,
                ..expense(food.id, Some(open_account), 10)
            },
        )
        .await
        .unwrap()
        .remove(0);
    engine
        .create_transaction("bob", expense(food.id, Some(hidden_account), 20))
        .await
        .unwrap();

    let data = engine.member_shared_data("alice", "bob").await.unwrap();
    assert_eq!(data.bank_accounts.len(), 1);
    assert_eq!(data.bank_accounts[0].id, open_account);
    assert!(data.cards.is_empty());
    assert_eq!(data.transactions.len(), 1);
    assert_eq!(data.transactions[0].id, shared_tx.id);
    assert!(data.categories.is_empty());
    assert!(data.goals.is_empty());
}

#[tokio::test]
async fn only_family_members_see_member_data() {
    let (engine, _db) = engine_with_db().await;
    family_of_alice_and_bob(&engine).await;

    assert!(matches!(
        engine.member_shared_data("carol", "bob").await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.member_shared_data("alice", "nobody").await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(engine.member_shared_data("carol", "carol").await.is_ok());
}

#[tokio::test]
async fn only_the_owner_toggles_sharing() {
    let (engine, _db) = engine_with_db().await;
    family_of_alice_and_bob(&engine).await;
    let account = checking(&engine, "alice", 0).await;

    assert!(matches!(
        engine
            .set_shared("bob", ShareTarget::BankAccount, account, true)
            .await,
        Err(EngineError::KeyNotFound(_) | EngineError::Forbidden(_))
    ));
    engine
        .set_shared("alice", ShareTarget::BankAccount, account, true)
        .await
        .unwrap();
    assert!(engine.bank_account(account, "bob").await.is_ok());

    engine
        .set_shared("alice", ShareTarget::BankAccount, account, false)
        .await
        .unwrap();
    assert!(matches!(
        engine.bank_account(account, "bob").await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn sharing_a_category_rechecks_name_collisions() {
    let (engine, _db) = engine_with_db().await;
    family_of_alice_and_bob(&engine).await;
    let new = |name: &str, is_shared| NewCategory {
        name: name.to_string(),
        kind: TransactionType::Expense,
        color: None,
        icon: None,
        is_shared,
    };

    let bobs = engine
        .create_category("bob", new("pets", false))
        .await
        .unwrap();
    engine
        .create_category("alice", new("Pets", false))
        .await
        .unwrap();
    engine
        .create_category("alice", new("Garden", true))
        .await
        .unwrap();

    let err = engine
        .set_shared("bob", ShareTarget::Category, bobs.id, true)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let shared = engine.member_shared_data("bob", "alice").await.unwrap();
    assert_eq!(shared.categories.len(), 1);
    assert_eq!(shared.categories[0].name, "Garden");
}

#[tokio::test]
async fn sessions_resolve_until_revoked_or_expired() {
    let (engine, _db) = engine_with_db().await;

    let token = engine
        .issue_session("alice", Duration::days(1))
        .await
        .unwrap();
    assert_eq!(
        engine.user_for_session(&token).await.unwrap().username,
        "alice"
    );

    engine.revoke_session(&token).await.unwrap();
    assert!(matches!(
        engine.user_for_session(&token).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.issue_session("alice", Duration::zero()).await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.issue_session("nobody", Duration::days(1)).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn only_admins_manage_users() {
    let (engine, _db) = engine_with_db().await;
    engine
        .bootstrap_user(NewUser {
            username: "root".to_string(),
            display_name: "Root".to_string(),
            admin: true,
            ..Default::default()
        })
        .await
        .unwrap();
    let dave = || NewUser {
        username: "dave".to_string(),
        display_name: "Dave".to_string(),
        ..Default::default()
    };

    assert!(matches!(
        engine.create_user("alice", dave()).await,
        Err(EngineError::Forbidden(_))
    ));
    let created = engine.create_user("root", dave()).await.unwrap();
    assert!(!created.is_admin());
    assert!(matches!(
        engine.create_user("root", dave()).await,
        Err(EngineError::ExistingKey(_))
    ));
    assert_eq!(engine.list_users("root").await.unwrap().len(), 5);
}
