mod common;

use common::{day, default_category, engine_with_db, expense, family_of_alice_and_bob};
use engine::{
    BudgetListFilter, BudgetUpdate, CategoryUpdate, EngineError, NewBudget, NewCategory,
    NewTransaction, TransactionType,
};

fn category(name: &str, kind: TransactionType, is_shared: bool) -> NewCategory {
    NewCategory {
        name: name.to_string(),
        kind,
        color: Some("#123456".to_string()),
        icon: None,
        is_shared,
    }
}

#[tokio::test]
async fn defaults_are_visible_and_immutable() {
    let (engine, _db) = engine_with_db().await;
    let expenses = engine
        .categories("alice", Some(TransactionType::Expense))
        .await
        .unwrap();
    assert_eq!(expenses.len(), 8);
    assert!(expenses.iter().all(|c| c.is_default));

    let food = default_category(&engine, "alice", "Food").await;
    let err = engine
        .update_category(
            food.id,
            "alice",
            CategoryUpdate {
                name: Some("Meals".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
    assert!(matches!(
        engine.delete_category(food.id, "alice").await,
        Err(EngineError::Forbidden(_))
    ));
}

#[tokio::test]
async fn names_collide_after_normalization() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_category("alice", category("  FOOD ", TransactionType::Expense, false))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let pets = engine
        .create_category("alice", category("Pets", TransactionType::Expense, false))
        .await
        .unwrap();
    let err = engine
        .create_category("alice", category("pêts", TransactionType::Expense, false))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    engine
        .create_category("alice", category("Pets", TransactionType::Income, false))
        .await
        .unwrap();
    engine
        .create_category("bob", category("Pets", TransactionType::Expense, false))
        .await
        .unwrap();
    assert_eq!(
        engine.category(pets.id, "alice").await.unwrap().name,
        "Pets"
    );
}

#[tokio::test]
async fn shared_categories_reach_the_family_only() {
    let (engine, _db) = engine_with_db().await;
    family_of_alice_and_bob(&engine).await;
    let garden = engine
        .create_category("alice", category("Garden", TransactionType::Expense, true))
        .await
        .unwrap();
    let secret = engine
        .create_category("alice", category("Secret", TransactionType::Expense, false))
        .await
        .unwrap();

    assert!(engine.category(garden.id, "bob").await.is_ok());
    assert!(matches!(
        engine.category(secret.id, "bob").await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.category(garden.id, "carol").await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine
            .update_category(garden.id, "bob", CategoryUpdate::default())
            .await,
        Err(EngineError::Forbidden(_))
    ));
}

#[tokio::test]
async fn category_in_use_cannot_be_deleted() {
    let (engine, _db) = engine_with_db().await;
    let pets = engine
        .create_category("alice", category("Pets", TransactionType::Expense, false))
        .await
        .unwrap();
    engine
        .create_transaction("alice", expense(pets.id, None, 40))
        .await
        .unwrap();

    assert!(matches!(
        engine.delete_category(pets.id, "alice").await,
        Err(EngineError::ExistingKey(_))
    ));

    let unused = engine
        .create_category("alice", category("Hobbies", TransactionType::Expense, false))
        .await
        .unwrap();
    engine.delete_category(unused.id, "alice").await.unwrap();
}

#[tokio::test]
async fn budget_tracks_paid_expenses_of_its_month() {
    let (engine, _db) = engine_with_db().await;
    let food = default_category(&engine, "alice", "Food").await;

    let budget = engine
        .create_budget(
            "alice",
            NewBudget {
                category_id: food.id,
                amount_minor: 500,
                month: 1,
                year: 2025,
            },
        )
        .await
        .unwrap();
    assert_eq!((budget.spent_minor, budget.remaining_minor), (0, 500));

    engine
        .create_transaction("alice", expense(food.id, None, 120))
        .await
        .unwrap();
    engine
        .create_transaction(
            "alice",
            NewTransaction {
                is_paid: false,
                ..expense(food.id, None, 1_000)
            },
        )
        .await
        .unwrap();
    engine
        .create_transaction(
            "alice",
            NewTransaction {
                date: day(2025, 2, 1),
                ..expense(food.id, None, 1_000)
            },
        )
        .await
        .unwrap();
    engine
        .create_transaction("bob", expense(food.id, None, 1_000))
        .await
        .unwrap();
    engine
        .create_transaction(
            "alice",
            NewTransaction {
                installments: 2,
                ..expense(food.id, None, 200)
            },
        )
        .await
        .unwrap();

    let budget = engine.budget(budget.id, "alice").await.unwrap();
    assert_eq!(budget.spent_minor, 220);
    assert_eq!(budget.remaining_minor, 280);

    let budget = engine
        .update_budget(
            budget.id,
            "alice",
            BudgetUpdate {
                amount_minor: Some(200),
            },
        )
        .await
        .unwrap();
    assert_eq!(budget.remaining_minor, -20);
}

#[tokio::test]
async fn budgets_are_unique_per_month_and_validated() {
    let (engine, _db) = engine_with_db().await;
    let food = default_category(&engine, "alice", "Food").await;
    let salary = default_category(&engine, "alice", "Salary").await;
    let input = |month, year, category_id| NewBudget {
        category_id,
        amount_minor: 100,
        month,
        year,
    };

    engine
        .create_budget("alice", input(3, 2025, food.id))
        .await
        .unwrap();
    assert!(matches!(
        engine.create_budget("alice", input(3, 2025, food.id)).await,
        Err(EngineError::ExistingKey(_))
    ));
    assert!(matches!(
        engine.create_budget("alice", input(13, 2025, food.id)).await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.create_budget("alice", input(3, 1999, food.id)).await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.create_budget("alice", input(3, 2025, salary.id)).await,
        Err(EngineError::InvalidInput(_))
    ));

    engine
        .create_budget("alice", input(4, 2025, food.id))
        .await
        .unwrap();
    let march = engine
        .budgets(
            "alice",
            BudgetListFilter {
                month: Some(3),
                year: Some(2025),
            },
        )
        .await
        .unwrap();
    assert_eq!(march.len(), 1);
    assert_eq!(
        engine
            .budgets("alice", BudgetListFilter::default())
            .await
            .unwrap()
            .len(),
        2
    );
    assert!(engine.budgets("bob", BudgetListFilter::default()).await.unwrap().is_empty());

    assert!(matches!(
        engine.delete_budget(march[0].id, "bob").await,
        Err(EngineError::KeyNotFound(_))
    ));
    engine.delete_budget(march[0].id, "alice").await.unwrap();
}
