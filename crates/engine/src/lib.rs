//! Domain engine for the family finance tracker.
//!
//! Every operation lives on [`Engine`] and takes the caller's username
//! explicitly. Visibility is re-derived on each call from ownership, account
//! links and family membership; nothing is cached in memory.

pub use bank_accounts::{AccountType, BankAccount, RecordStatus, Removal};
pub use budgets::Budget;
pub use cards::{Card, CardType};
pub use categories::Category;
pub use error::EngineError;
pub use families::Family;
pub use family_invitations::{
    FamilyInvitation, INVITATION_TTL_DAYS, InvitationAction, InvitationStatus,
};
pub use family_members::{FamilyMember, MemberRole};
pub use goals::{Goal, GoalParticipant};
pub use ops::{
    BankAccountUpdate, BudgetListFilter, BudgetUpdate, CardUpdate, CategoryUpdate, Engine,
    EngineBuilder, GoalUpdate, MemberSharedData, NewBankAccount, NewBudget, NewCard, NewCategory,
    NewGoal, NewTransaction, NewUser, ShareTarget, TransactionDeletion, TransactionListFilter,
    TransactionPage, TransactionUpdate,
};
pub use roles::{ADMIN_ROLE, Role, USER_ROLE};
pub use transactions::{RecurringType, Transaction, TransactionType};
pub use users::User;

mod bank_accounts;
mod budgets;
mod cards;
mod categories;
mod error;
mod families;
mod family_invitations;
mod family_members;
mod goals;
mod ops;
mod roles;
mod sessions;
mod transactions;
mod user_bank_accounts;
mod user_goals;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
