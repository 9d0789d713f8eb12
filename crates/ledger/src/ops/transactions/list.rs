use chrono::{Datelike, Days, NaiveDate};
use sea_orm::{QueryFilter, QueryOrder, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::transactions::{self, Transaction, format_entry_date};
use crate::{LedgerError, ResultLedger};

use super::super::Ledger;

/// Page size used by the paginated listing when callers take the default.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Date filter for listing expenses. All bounds are inclusive; dates
/// compare as stored, `YYYY-MM-DD` text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExpenseFilter {
    /// Every expense of the user.
    All,
    /// Expenses on exactly the given date.
    Today(NaiveDate),
    /// The seven days ending at the given date.
    Week(NaiveDate),
    /// The calendar month of the given date, up to and including it.
    Month(NaiveDate),
    /// An explicit inclusive range. Never cached.
    Range { from: NaiveDate, to: NaiveDate },
}

impl ExpenseFilter {
    /// Cache key segments; one list entry per user per variant.
    pub(crate) const VARIANTS: [&'static str; 5] = ["all", "today", "week", "month", "range"];

    pub(crate) fn variant_key(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today(_) => "today",
            Self::Week(_) => "week",
            Self::Month(_) => "month",
            Self::Range { .. } => "range",
        }
    }

    /// Arbitrary ranges are not worth a cache slot; every other variant is.
    fn cacheable(&self) -> bool {
        !matches!(self, Self::Range { .. })
    }

    /// The reference date a cached list is valid for. `All` has none.
    fn stamp(&self) -> Option<NaiveDate> {
        match *self {
            Self::All | Self::Range { .. } => None,
            Self::Today(date) | Self::Week(date) | Self::Month(date) => Some(date),
        }
    }

    /// Inclusive date bounds, or `None` for the unfiltered listing.
    fn bounds(&self) -> ResultLedger<Option<(NaiveDate, NaiveDate)>> {
        match *self {
            Self::All => Ok(None),
            Self::Today(date) => Ok(Some((date, date))),
            Self::Week(date) => {
                let start = date.checked_sub_days(Days::new(6)).unwrap_or(date);
                Ok(Some((start, date)))
            }
            Self::Month(date) => {
                let start =
                    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
                Ok(Some((start, date)))
            }
            Self::Range { from, to } => {
                if from > to {
                    return Err(LedgerError::Validation(format!(
                        "range start {from} is after range end {to}"
                    )));
                }
                Ok(Some((from, to)))
            }
        }
    }
}

impl Ledger {
    /// Lists a user's expenses for the given filter, newest first (then by
    /// id, so the order is total). Read-through cached except for `Range`.
    pub async fn expenses(
        &self,
        user_id: &str,
        filter: &ExpenseFilter,
    ) -> ResultLedger<Vec<Transaction>> {
        let bounds = filter.bounds()?;
        let key = (user_id.to_string(), filter.variant_key());
        let stamp = filter.stamp();

        if filter.cacheable()
            && let Some(hit) = self.cached_list(&key, stamp)
        {
            return Ok(hit);
        }

        let mut query =
            transactions::Entity::find().filter(transactions::Column::UserId.eq(user_id));
        if let Some((from, to)) = bounds {
            query = query
                .filter(transactions::Column::EntryDate.gte(format_entry_date(from)))
                .filter(transactions::Column::EntryDate.lte(format_entry_date(to)));
        }
        let models = query
            .order_by_desc(transactions::Column::EntryDate)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?;

        let items = models
            .into_iter()
            .map(Transaction::try_from)
            .collect::<ResultLedger<Vec<_>>>()?;

        if filter.cacheable() {
            self.store_list(key, stamp, items.clone());
        }
        Ok(items)
    }

    /// Fetches a single expense by id, through the record cache.
    pub async fn expense(&self, id: Uuid) -> ResultLedger<Transaction> {
        if let Some(hit) = self.cached_record(&id) {
            return Ok(hit);
        }

        let model = transactions::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::NotFound("transaction not exists".to_string()))?;
        let record = Transaction::try_from(model)?;
        self.store_record(record.clone());
        Ok(record)
    }

    /// One page of a user's expenses, newest first. Pages are zero-based
    /// and never cached.
    pub async fn expenses_page(
        &self,
        user_id: &str,
        page: u64,
        page_size: u64,
    ) -> ResultLedger<Vec<Transaction>> {
        if page_size == 0 {
            return Err(LedgerError::Validation(
                "page size must be positive".to_string(),
            ));
        }

        let models = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::EntryDate)
            .order_by_desc(transactions::Column::Id)
            .limit(page_size)
            .offset(page * page_size)
            .all(&self.database)
            .await?;

        models
            .into_iter()
            .map(Transaction::try_from)
            .collect::<ResultLedger<Vec<_>>>()
    }

    /// Total number of expenses recorded by a user.
    pub async fn count_expenses(&self, user_id: &str) -> ResultLedger<u64> {
        let count = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .count(&self.database)
            .await?;
        Ok(count)
    }
}
