mod common;

use uuid::Uuid;

use common::{checking, default_category, engine_with_db, expense};
use engine::{
    CardType, CardUpdate, EngineError, NewCard, NewTransaction, RecordStatus, Removal,
};

fn debit(bank_account_id: Option<Uuid>) -> NewCard {
    NewCard {
        name: "Debit".to_string(),
        card_type: CardType::Debit,
        last_four_digits: "1234".to_string(),
        limit_minor: None,
        closing_day: None,
        due_day: None,
        bank_account_id,
    }
}

#[tokio::test]
async fn card_outside_a_family_is_private() {
    let (engine, _db) = engine_with_db().await;
    let account = checking(&engine, "alice", 0).await;

    let card = engine.create_card("alice", debit(Some(account))).await.unwrap();
    assert!(!card.is_shared);
    assert_eq!(card.status, RecordStatus::Active);
    assert_eq!(card.bank_account_id, Some(account));

    assert!(matches!(
        engine.card(card.id, "bob").await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(engine.cards("bob").await.unwrap().is_empty());
}

#[tokio::test]
async fn unused_card_is_deleted() {
    let (engine, _db) = engine_with_db().await;
    let card = engine.create_card("alice", debit(None)).await.unwrap();

    assert!(matches!(
        engine.delete_card(card.id, "bob").await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert_eq!(
        engine.delete_card(card.id, "alice").await.unwrap(),
        Removal::Deleted
    );
    assert!(matches!(
        engine.card(card.id, "alice").await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn referenced_card_is_archived_and_refused_for_new_transactions() {
    let (engine, _db) = engine_with_db().await;
    let food = default_category(&engine, "alice", "Food").await;
    let card = engine.create_card("alice", debit(None)).await.unwrap();

    engine
        .create_transaction(
            "alice",
            NewTransaction {
                card_id: Some(card.id),
                ..expense(food.id, None, 1_500)
            },
        )
        .await
        .unwrap();

    assert_eq!(
        engine.delete_card(card.id, "alice").await.unwrap(),
        Removal::Archived
    );
    let archived = engine.card(card.id, "alice").await.unwrap();
    assert_eq!(archived.status, RecordStatus::Archived);
    assert_eq!(engine.cards("alice").await.unwrap().len(), 1);

    let err = engine
        .create_transaction(
            "alice",
            NewTransaction {
                card_id: Some(card.id),
                ..expense(food.id, None, 700)
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    engine
        .update_card(
            card.id,
            "alice",
            CardUpdate {
                status: Some(RecordStatus::Active),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    engine
        .create_transaction(
            "alice",
            NewTransaction {
                card_id: Some(card.id),
                ..expense(food.id, None, 700)
            },
        )
        .await
        .unwrap();
}
