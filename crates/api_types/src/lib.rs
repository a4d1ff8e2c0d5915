//! JSON bodies exchanged over the HTTP API.
//!
//! Field names are camelCase on the wire and every amount is an integer in
//! minor units.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of accounts and cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordStatus {
    Active,
    Archived,
}

/// `{ "message": ... }` body for operations with nothing else to return.
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Tells an explicit `null` (`Some(None)`) apart from an absent field (`None`).
/// Pair with `#[serde(default)]`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserView {
        pub username: String,
        pub display_name: String,
        pub email: Option<String>,
        pub role: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserNew {
        pub username: String,
        pub display_name: String,
        pub email: Option<String>,
        #[serde(default)]
        pub admin: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoleView {
        pub id: Uuid,
        pub name: String,
    }
}

pub mod bank_account {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum AccountType {
        Checking,
        Savings,
        Investment,
        Other,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BankAccountNew {
        pub name: String,
        pub bank_name: Option<String>,
        pub account_type: AccountType,
        #[serde(default)]
        pub initial_balance: i64,
        #[serde(default)]
        pub is_shared: bool,
        /// Family members linked to the account alongside the creator.
        #[serde(default)]
        pub collaborators: Vec<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BankAccountUpdate {
        pub name: Option<String>,
        pub bank_name: Option<String>,
        pub account_type: Option<AccountType>,
        pub initial_balance: Option<i64>,
        pub is_shared: Option<bool>,
        pub status: Option<RecordStatus>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BankAccountView {
        pub id: Uuid,
        pub name: String,
        pub bank_name: Option<String>,
        pub account_type: AccountType,
        pub initial_balance: i64,
        pub current_balance: i64,
        pub is_shared: bool,
        pub status: RecordStatus,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod card {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum CardType {
        Credit,
        Debit,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CardNew {
        pub name: String,
        pub card_type: CardType,
        pub last_four_digits: String,
        pub limit: Option<i64>,
        pub closing_day: Option<i32>,
        pub due_day: Option<i32>,
        pub bank_account_id: Option<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CardUpdate {
        pub name: Option<String>,
        pub card_type: Option<CardType>,
        pub last_four_digits: Option<String>,
        pub limit: Option<i64>,
        pub closing_day: Option<i32>,
        pub due_day: Option<i32>,
        pub bank_account_id: Option<Uuid>,
        pub is_shared: Option<bool>,
        pub status: Option<RecordStatus>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CardView {
        pub id: Uuid,
        pub name: String,
        pub card_type: CardType,
        pub last_four_digits: String,
        pub limit: Option<i64>,
        pub closing_day: Option<i32>,
        pub due_day: Option<i32>,
        pub bank_account_id: Option<Uuid>,
        pub is_shared: bool,
        pub status: RecordStatus,
        pub user_id: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod category {
    use super::transaction::TransactionType;
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryQuery {
        #[serde(rename = "type")]
        pub kind: Option<TransactionType>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryNew {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub color: Option<String>,
        pub icon: Option<String>,
        #[serde(default)]
        pub is_shared: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub color: Option<String>,
        pub icon: Option<String>,
        pub is_shared: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub color: Option<String>,
        pub icon: Option<String>,
        pub is_default: bool,
        pub is_shared: bool,
        pub user_id: Option<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum TransactionType {
        Income,
        Expense,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum RecurringType {
        Daily,
        Weekly,
        Monthly,
        Yearly,
    }

    fn one() -> i32 {
        1
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionNew {
        pub description: String,
        pub amount: i64,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub date: DateTime<Utc>,
        #[serde(default)]
        pub is_paid: bool,
        #[serde(default)]
        pub is_recurring: bool,
        pub recurring_type: Option<RecurringType>,
        #[serde(default = "one")]
        pub installments: i32,
        pub category_id: Uuid,
        pub bank_account_id: Option<Uuid>,
        pub card_id: Option<Uuid>,
        #[serde(default)]
        pub is_shared: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionUpdate {
        pub description: Option<String>,
        pub amount: Option<i64>,
        #[serde(rename = "type")]
        pub kind: Option<TransactionType>,
        pub date: Option<DateTime<Utc>>,
        pub is_paid: Option<bool>,
        pub is_recurring: Option<bool>,
        pub recurring_type: Option<RecurringType>,
        pub category_id: Option<Uuid>,
        /// `null` detaches the account.
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub bank_account_id: Option<Option<Uuid>>,
        /// `null` detaches the card.
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub card_id: Option<Option<Uuid>>,
        pub is_shared: Option<bool>,
    }

    /// Query string of `GET /transactions`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionQuery {
        #[serde(rename = "type")]
        pub kind: Option<TransactionType>,
        pub category_id: Option<Uuid>,
        pub bank_account_id: Option<Uuid>,
        pub card_id: Option<Uuid>,
        pub is_paid: Option<bool>,
        pub start_date: Option<DateTime<Utc>>,
        pub end_date: Option<DateTime<Utc>>,
        pub page: Option<u64>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionDeleteQuery {
        #[serde(default)]
        pub delete_all: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: Uuid,
        pub description: String,
        pub amount: i64,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub date: DateTime<Utc>,
        pub is_paid: bool,
        pub is_recurring: bool,
        pub recurring_type: Option<RecurringType>,
        pub installments: i32,
        pub current_installment: i32,
        pub parent_transaction_id: Option<Uuid>,
        pub category_id: Uuid,
        pub bank_account_id: Option<Uuid>,
        pub card_id: Option<Uuid>,
        pub is_shared: bool,
        pub user_id: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionListResponse {
        pub items: Vec<TransactionView>,
        pub total: u64,
        pub page: u64,
        pub limit: u64,
        pub total_pages: u64,
    }

    /// Rows written by a create: the single row, or the installments of a
    /// series (the parent row is not listed).
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionCreated {
        pub transactions: Vec<TransactionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionDeleted {
        pub message: String,
        pub removed: u64,
        pub installments_removed: u64,
    }
}

pub mod goal {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GoalNew {
        pub name: String,
        pub description: Option<String>,
        pub target_amount: i64,
        pub deadline: Option<NaiveDate>,
        #[serde(default)]
        pub is_shared: bool,
        #[serde(default)]
        pub shared_with: Vec<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GoalUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub target_amount: Option<i64>,
        pub deadline: Option<NaiveDate>,
        pub is_shared: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalContribution {
        pub amount: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GoalParticipantView {
        pub user_id: String,
        pub contribution: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GoalView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub target_amount: i64,
        pub current_amount: i64,
        pub deadline: Option<NaiveDate>,
        pub is_completed: bool,
        pub is_shared: bool,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
        pub participants: Vec<GoalParticipantView>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetQuery {
        pub month: Option<i32>,
        pub year: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetNew {
        pub category_id: Uuid,
        pub amount: i64,
        pub month: i32,
        pub year: i32,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub amount: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetView {
        pub id: Uuid,
        pub category_id: Uuid,
        pub amount: i64,
        pub month: i32,
        pub year: i32,
        pub spent: i64,
        pub remaining: i64,
        pub created_at: DateTime<Utc>,
    }
}

pub mod family {
    use super::*;
    use super::{
        bank_account::BankAccountView, card::CardView, category::CategoryView, goal::GoalView,
        transaction::TransactionView,
    };

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum MemberRole {
        Owner,
        Member,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum InvitationStatus {
        Pending,
        Accepted,
        Rejected,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum InvitationAction {
        Accept,
        Reject,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FamilyNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FamilyMemberView {
        pub user_id: String,
        pub display_name: String,
        pub role: MemberRole,
        pub joined_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FamilyView {
        pub id: Uuid,
        pub name: String,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
        pub members: Vec<FamilyMemberView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvitationNew {
        pub username: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvitationResponse {
        pub action: InvitationAction,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct InvitationView {
        pub id: Uuid,
        pub family_id: Uuid,
        pub family_name: String,
        pub invited_user_id: String,
        pub invited_by: String,
        pub status: InvitationStatus,
        pub created_at: DateTime<Utc>,
        pub expires_at: DateTime<Utc>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ShareType {
        #[serde(alias = "bankAccount")]
        BankAccount,
        Card,
        Category,
        Goal,
        Transaction,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ShareRequest {
        #[serde(rename = "type")]
        pub kind: ShareType,
        pub item_id: Uuid,
        pub shared: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MemberSharedDataView {
        pub bank_accounts: Vec<BankAccountView>,
        pub cards: Vec<CardView>,
        pub categories: Vec<CategoryView>,
        pub goals: Vec<GoalView>,
        pub transactions: Vec<TransactionView>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_new_uses_camel_case_and_defaults() {
        let body = serde_json::json!({
            "description": "Groceries",
            "amount": 1250,
            "type": "EXPENSE",
            "date": "2025-03-01T10:00:00Z",
            "categoryId": "7b0d3c1e-8a4b-4d52-9a55-0e4a8d7f6c21",
            "bankAccountId": null,
        });
        let parsed: transaction::TransactionNew = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.kind, transaction::TransactionType::Expense);
        assert_eq!(parsed.installments, 1);
        assert!(!parsed.is_paid);
        assert!(parsed.card_id.is_none());
    }

    #[test]
    fn transaction_update_tells_null_from_absent() {
        let detach: transaction::TransactionUpdate =
            serde_json::from_value(serde_json::json!({ "bankAccountId": null })).unwrap();
        assert_eq!(detach.bank_account_id, Some(None));
        assert_eq!(detach.card_id, None);

        let card_id = "7b0d3c1e-8a4b-4d52-9a55-0e4a8d7f6c21";
        let attach: transaction::TransactionUpdate =
            serde_json::from_value(serde_json::json!({ "cardId": card_id })).unwrap();
        assert_eq!(attach.card_id, Some(Some(card_id.parse().unwrap())));
        assert_eq!(attach.bank_account_id, None);
    }

    #[test]
    fn share_request_accepts_both_type_spellings() {
        for raw in ["bank_account", "bankAccount"] {
            let body = serde_json::json!({
                "type": raw,
                "itemId": "7b0d3c1e-8a4b-4d52-9a55-0e4a8d7f6c21",
                "shared": true,
            });
            let parsed: family::ShareRequest = serde_json::from_value(body).unwrap();
            assert_eq!(parsed.kind, family::ShareType::BankAccount);
        }
        for raw in ["bank-account", "budget"] {
            let body = serde_json::json!({
                "type": raw,
                "itemId": "7b0d3c1e-8a4b-4d52-9a55-0e4a8d7f6c21",
                "shared": true,
            });
            assert!(serde_json::from_value::<family::ShareRequest>(body).is_err());
        }
    }

    #[test]
    fn invitation_action_is_lowercase() {
        let parsed: family::InvitationResponse =
            serde_json::from_value(serde_json::json!({ "action": "accept" })).unwrap();
        assert_eq!(parsed.action, family::InvitationAction::Accept);
        assert!(
            serde_json::from_value::<family::InvitationResponse>(
                serde_json::json!({ "action": "maybe" })
            )
            .is_err()
        );
    }
}
