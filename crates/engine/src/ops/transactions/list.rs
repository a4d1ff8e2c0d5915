use chrono::{DateTime, Utc};
use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Transaction, TransactionType, transactions};

use super::super::{Engine, with_tx};

pub(crate) const DEFAULT_PAGE_SIZE: u64 = 50;
pub(crate) const MAX_PAGE_SIZE: u64 = 200;

/// Filters for listing transactions.
///
/// `start_date` and `end_date` are both inclusive. Series parents are never
/// returned.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub kind: Option<TransactionType>,
    pub category_id: Option<Uuid>,
    pub bank_account_id: Option<Uuid>,
    pub card_id: Option<Uuid>,
    pub is_paid: Option<bool>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// 1-based, defaults to 1.
    pub page: Option<u64>,
    /// Defaults to 50, capped at 200.
    pub limit: Option<u64>,
}

/// One page of transactions, newest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionPage {
    pub items: Vec<Transaction>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<(u64, u64)> {
    if let (Some(start), Some(end)) = (filter.start_date, filter.end_date)
        && start > end
    {
        return Err(EngineError::InvalidInput(
            "invalid range: start_date must be <= end_date".to_string(),
        ));
    }
    let page = filter.page.unwrap_or(1);
    if page == 0 {
        return Err(EngineError::InvalidInput("page starts at 1".to_string()));
    }
    let limit = filter
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    Ok((page, limit))
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionListFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, filter: &TransactionListFilter) -> Self {
        if let Some(kind) = filter.kind {
            self = self.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(category_id) = filter.category_id {
            self = self.filter(transactions::Column::CategoryId.eq(category_id));
        }
        if let Some(account_id) = filter.bank_account_id {
            self = self.filter(transactions::Column::BankAccountId.eq(account_id));
        }
        if let Some(card_id) = filter.card_id {
            self = self.filter(transactions::Column::CardId.eq(card_id));
        }
        if let Some(is_paid) = filter.is_paid {
            self = self.filter(transactions::Column::IsPaid.eq(is_paid));
        }
        if let Some(start) = filter.start_date {
            self = self.filter(transactions::Column::Date.gte(start));
        }
        if let Some(end) = filter.end_date {
            self = self.filter(transactions::Column::Date.lte(end));
        }
        self
    }
}

impl Engine {
    /// List the caller's own transactions, newest first.
    pub async fn transactions(
        &self,
        user_id: &str,
        filter: TransactionListFilter,
    ) -> ResultEngine<TransactionPage> {
        let (page, limit) = validate_list_filter(&filter)?;
        with_tx!(self, |db_tx| {
            let query = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id.to_string()))
                .filter(transactions::Column::CurrentInstallment.ne(0))
                .apply_tx_filters(&filter)
                .order_by_desc(transactions::Column::Date)
                .order_by_desc(transactions::Column::CreatedAt)
                .order_by_asc(transactions::Column::CurrentInstallment);

            let paginator = query.paginate(&db_tx, limit);
            let total = paginator.num_items().await?;
            let models = paginator.fetch_page(page - 1).await?;
            let items = models
                .into_iter()
                .map(Transaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            Ok(TransactionPage {
                items,
                total,
                page,
                limit,
                total_pages: total.div_ceil(limit),
            })
        })
    }
}
