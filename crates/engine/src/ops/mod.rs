use sea_orm::{ConnectionTrait, DatabaseConnection};

use crate::{EngineError, ResultEngine};

mod access;
mod balances;
mod bank_accounts;
mod budgets;
mod cards;
mod categories;
mod families;
mod goals;
mod sharing;
mod transactions;
mod users;

pub use bank_accounts::{BankAccountUpdate, NewBankAccount};
pub use budgets::{BudgetListFilter, BudgetUpdate, NewBudget};
pub use cards::{CardUpdate, NewCard};
pub use categories::{CategoryUpdate, NewCategory};
pub use goals::{GoalUpdate, NewGoal};
pub use sharing::{MemberSharedData, ShareTarget};
pub use transactions::{
    NewTransaction, TransactionDeletion, TransactionListFilter, TransactionPage,
    TransactionUpdate,
};
pub use users::NewUser;

/// Evaluate `$body` with `$tx` bound to a fresh database transaction.
///
/// `Ok` commits; `Err` drops the transaction, which rolls it back. An early
/// `return Ok(..)` inside the body skips the commit, so bodies must fall
/// through to their final expression on success.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of every family-finance operation.
///
/// The engine holds no state besides the connection: each call reads what it
/// needs, checks visibility for the acting username and writes in a single
/// transaction.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim `value`; blank strings become `None`.
fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[derive(Default)]
pub struct EngineBuilder {
    database: Option<DatabaseConnection>,
}

impl EngineBuilder {
    /// Connection with the schema already migrated.
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = Some(db);
        self
    }

    /// Check the connection answers and construct the [`Engine`].
    pub async fn build(self) -> ResultEngine<Engine> {
        let database = self.database.ok_or_else(|| {
            EngineError::InvalidInput("engine needs a database connection".to_string())
        })?;
        database.ping().await?;
        tracing::debug!(backend = ?database.get_database_backend(), "engine ready");
        Ok(Engine { database })
    }
}
