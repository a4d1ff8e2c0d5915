mod common;

use common::{balance, checking, day, default_category, engine_with_db, expense};
use engine::{
    EngineError, NewTransaction, RecordStatus, Removal, TransactionListFilter, TransactionType,
    TransactionUpdate,
};

#[tokio::test]
async fn paid_rows_move_the_balance_and_unpaid_rows_do_not() {
    let (engine, _db) = engine_with_db().await;
    let food = default_category(&engine, "alice", "Food").await;
    let salary = default_category(&engine, "alice", "Salary").await;
    let account = checking(&engine, "alice", 1_000).await;

    engine
        .create_transaction("alice", expense(food.id, Some(account), 250))
        .await
        .unwrap();
    let mut pay = expense(salary.id, Some(account), 2_000);
    pay.kind = TransactionType::Income;
    engine.create_transaction("alice", pay).await.unwrap();
    let mut pending = expense(food.id, Some(account), 99);
    pending.is_paid = false;
    engine.create_transaction("alice", pending).await.unwrap();

    assert_eq!(balance(&engine, "alice", account).await, 1_000 - 250 + 2_000);
}

#[tokio::test]
async fn toggling_is_paid_restores_the_balance_exactly() {
    let (engine, _db) = engine_with_db().await;
    let food = default_category(&engine, "alice", "Food").await;
    let account = checking(&engine, "alice", 1_000).await;

    let tx = engine
        .create_transaction("alice", expense(food.id, Some(account), 300))
        .await
        .unwrap()
        .remove(0);
    assert_eq!(balance(&engine, "alice", account).await, 700);

    let unpay = TransactionUpdate {
        is_paid: Some(false),
        ..Default::default()
    };
    engine
        .update_transaction(tx.id, "alice", unpay)
        .await
        .unwrap();
    assert_eq!(balance(&engine, "alice", account).await, 1_000);

    let repay = TransactionUpdate {
        is_paid: Some(true),
        amount_minor: Some(120),
        ..Default::default()
    };
    engine
        .update_transaction(tx.id, "alice", repay)
        .await
        .unwrap();
    assert_eq!(balance(&engine, "alice", account).await, 880);
}

#[tokio::test]
async fn detaching_the_account_of_a_paid_row_restores_its_balance() {
    let (engine, _db) = engine_with_db().await;
    let food = default_category(&engine, "alice", "Food").await;
    let account = checking(&engine, "alice", 1_000).await;
    let other = checking(&engine, "alice", 500).await;

    let tx = engine
        .create_transaction("alice", expense(food.id, Some(account), 300))
        .await
        .unwrap()
        .remove(0);
    assert_eq!(balance(&engine, "alice", account).await, 700);

    let detached = engine
        .update_transaction(
            tx.id,
            "alice",
            TransactionUpdate {
                bank_account_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(detached.bank_account_id, None);
    assert_eq!(balance(&engine, "alice", account).await, 1_000);

    let untouched = engine
        .update_transaction(
            tx.id,
            "alice",
            TransactionUpdate {
                description: Some("Market".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(untouched.bank_account_id, None);

    engine
        .update_transaction(
            tx.id,
            "alice",
            TransactionUpdate {
                bank_account_id: Some(Some(other)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(balance(&engine, "alice", account).await, 1_000);
    assert_eq!(balance(&engine, "alice", other).await, 200);
}

#[tokio::test]
async fn installment_series_and_partial_delete() {
    let (engine, _db) = engine_with_db().await;
    let food = default_category(&engine, "alice", "Food").await;
    let account = checking(&engine, "alice", 1_000).await;

    let children = engine
        .create_transaction(
            "alice",
            NewTransaction {
                description: "Sofa".to_string(),
                installments: 3,
                ..expense(food.id, Some(account), 300)
            },
        )
        .await
        .unwrap();

    assert_eq!(children.len(), 3);
    assert_eq!(children.iter().map(|c| c.amount_minor).sum::<i64>(), 300);
    assert_eq!(
        children.iter().map(|c| c.date).collect::<Vec<_>>(),
        vec![day(2025, 1, 15), day(2025, 2, 15), day(2025, 3, 15)]
    );
    assert!(children[0].is_paid);
    assert!(!children[1].is_paid && !children[2].is_paid);
    assert_eq!(balance(&engine, "alice", account).await, 900);

    let parent_id = children[0].parent_transaction_id.unwrap();
    let parent = engine.transaction(parent_id, "alice").await.unwrap();
    assert!(parent.is_series_parent());
    assert_eq!(parent.amount_minor, 300);
    assert_eq!(parent.description, "Sofa (3x)");

    let listed = engine
        .transactions("alice", TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.total, 3);
    assert!(listed.items.iter().all(|t| !t.is_series_parent()));

    let deletion = engine
        .delete_transaction(children[0].id, "alice", false)
        .await
        .unwrap();
    assert_eq!(deletion.removed, 1);
    assert_eq!(balance(&engine, "alice", account).await, 1_000);
    assert!(engine.transaction(parent_id, "alice").await.is_ok());
    assert!(engine.transaction(children[1].id, "alice").await.is_ok());
}

#[tokio::test]
async fn deleting_a_whole_series_reverses_every_paid_child() {
    let (engine, _db) = engine_with_db().await;
    let food = default_category(&engine, "alice", "Food").await;
    let account = checking(&engine, "alice", 1_000).await;

    let children = engine
        .create_transaction(
            "alice",
            NewTransaction {
                installments: 4,
                ..expense(food.id, Some(account), 1_001)
            },
        )
        .await
        .unwrap();
    assert_eq!(children[3].amount_minor, 251);

    engine
        .update_transaction(
            children[1].id,
            "alice",
            TransactionUpdate {
                is_paid: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(balance(&engine, "alice", account).await, 1_000 - 500);

    let deletion = engine
        .delete_transaction(children[2].id, "alice", true)
        .await
        .unwrap();
    assert_eq!(deletion.removed, 5);
    assert_eq!(deletion.installments_removed, 4);
    assert_eq!(balance(&engine, "alice", account).await, 1_000);

    let listed = engine
        .transactions("alice", TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.total, 0);
}

#[tokio::test]
async fn series_parent_only_accepts_description_and_category() {
    let (engine, _db) = engine_with_db().await;
    let food = default_category(&engine, "alice", "Food").await;
    let children = engine
        .create_transaction(
            "alice",
            NewTransaction {
                installments: 2,
                ..expense(food.id, None, 200)
            },
        )
        .await
        .unwrap();
    let parent_id = children[0].parent_transaction_id.unwrap();

    let err = engine
        .update_transaction(
            parent_id,
            "alice",
            TransactionUpdate {
                amount_minor: Some(10),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let renamed = engine
        .update_transaction(
            parent_id,
            "alice",
            TransactionUpdate {
                description: Some("TV".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.description, "TV");
}

#[tokio::test]
async fn rejects_bad_amounts_and_mismatched_categories() {
    let (engine, _db) = engine_with_db().await;
    let food = default_category(&engine, "alice", "Food").await;
    let salary = default_category(&engine, "alice", "Salary").await;

    let err = engine
        .create_transaction("alice", expense(food.id, None, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_transaction("alice", expense(salary.id, None, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = engine
        .create_transaction(
            "alice",
            NewTransaction {
                installments: 5,
                ..expense(food.id, None, 4)
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn other_users_cannot_see_or_touch_a_transaction() {
    let (engine, _db) = engine_with_db().await;
    let food = default_category(&engine, "alice", "Food").await;
    let tx = engine
        .create_transaction("alice", expense(food.id, None, 10))
        .await
        .unwrap()
        .remove(0);

    assert!(matches!(
        engine.transaction(tx.id, "bob").await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.delete_transaction(tx.id, "bob", false).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn listing_filters_and_pages() {
    let (engine, _db) = engine_with_db().await;
    let food = default_category(&engine, "alice", "Food").await;
    for (index, month) in (1..=5).enumerate() {
        engine
            .create_transaction(
                "alice",
                NewTransaction {
                    date: day(2025, month, 10),
                    is_paid: index % 2 == 0,
                    ..expense(food.id, None, 10)
                },
            )
            .await
            .unwrap();
    }

    let page = engine
        .transactions(
            "alice",
            TransactionListFilter {
                limit: Some(2),
                page: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!((page.total, page.total_pages, page.items.len()), (5, 3, 2));
    assert_eq!(page.items[0].date, day(2025, 3, 10));

    let paid_in_range = engine
        .transactions(
            "alice",
            TransactionListFilter {
                is_paid: Some(true),
                start_date: Some(day(2025, 1, 10)),
                end_date: Some(day(2025, 3, 10)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(paid_in_range.total, 2);
}

#[tokio::test]
async fn referenced_account_is_archived_and_then_unusable() {
    let (engine, _db) = engine_with_db().await;
    let food = default_category(&engine, "alice", "Food").await;
    let used = checking(&engine, "alice", 0).await;
    let unused = checking(&engine, "alice", 0).await;
    engine
        .create_transaction("alice", expense(food.id, Some(used), 10))
        .await
        .unwrap();

    assert_eq!(
        engine.delete_bank_account(used, "alice").await.unwrap(),
        Removal::Archived
    );
    assert_eq!(
        engine.delete_bank_account(unused, "alice").await.unwrap(),
        Removal::Deleted
    );
    let archived = engine.bank_account(used, "alice").await.unwrap();
    assert_eq!(archived.status, RecordStatus::Archived);

    let err = engine
        .create_transaction("alice", expense(food.id, Some(used), 10))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn editing_initial_balance_shifts_current_balance() {
    let (engine, _db) = engine_with_db().await;
    let food = default_category(&engine, "alice", "Food").await;
    let account = checking(&engine, "alice", 1_000).await;
    engine
        .create_transaction("alice", expense(food.id, Some(account), 100))
        .await
        .unwrap();

    let updated = engine
        .update_bank_account(
            account,
            "alice",
            engine::BankAccountUpdate {
                initial_balance_minor: Some(1_500),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.initial_balance_minor, 1_500);
    assert_eq!(updated.current_balance_minor, 1_400);
}
