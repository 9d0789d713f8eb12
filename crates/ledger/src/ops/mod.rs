use std::sync::Mutex;
use std::time::{Duration, Instant};

use sea_orm::{ConnectionTrait, DatabaseConnection, prelude::*};
use uuid::Uuid;

use crate::{
    BalanceState, CacheConfig, CacheStats, Category, CategoryType, LedgerError, ResultLedger,
    Transaction, TtlCache, categories::types as category_types,
};

mod balances;
mod categories;
mod transactions;

pub use categories::{CategoryUpdate, NewCategory};
pub use transactions::{DEFAULT_PAGE_SIZE, ExpenseFilter, ExpenseUpdate, NewExpense};

/// Run a block inside a DB transaction, committing on success. On error the
/// transaction is dropped and rolls back.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        // Pin the error type so `?` on the expanded expression can infer it.
        let result: crate::ResultLedger<_> = $body;
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

type ListKey = (String, &'static str);

/// A cached list carries the reference date it was computed for; a lookup
/// with a different date is a miss, not a near-enough hit.
type ListEntry = (Option<chrono::NaiveDate>, Vec<Transaction>);

/// The four cache instances fronting the store: filtered lists, single
/// records, per-user category lists, per-user balance state.
struct LedgerCaches {
    lists: TtlCache<ListKey, ListEntry>,
    records: TtlCache<Uuid, Transaction>,
    categories: TtlCache<String, Vec<Category>>,
    balances: TtlCache<String, BalanceState>,
}

impl LedgerCaches {
    fn new(config: &CacheConfig) -> Self {
        Self {
            lists: TtlCache::new(
                config.list_capacity,
                Duration::from_secs(config.list_ttl_secs),
            ),
            records: TtlCache::new(
                config.record_capacity,
                Duration::from_secs(config.record_ttl_secs),
            ),
            categories: TtlCache::new(
                config.category_capacity,
                Duration::from_secs(config.category_ttl_secs),
            ),
            balances: TtlCache::new(
                config.balance_capacity,
                Duration::from_secs(config.balance_ttl_secs),
            ),
        }
    }
}

impl std::fmt::Debug for LedgerCaches {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerCaches").finish_non_exhaustive()
    }
}

/// Hit/miss counters per cache instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LedgerCacheStats {
    pub lists: CacheStats,
    pub records: CacheStats,
    pub categories: CacheStats,
    pub balances: CacheStats,
}

#[derive(Debug)]
pub struct Ledger {
    database: DatabaseConnection,
    caches: Mutex<LedgerCaches>,
}

impl Ledger {
    /// Return a builder for `Ledger`. Help to build the struct.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    /// Runs `f` against the caches. A poisoned lock degrades to "no cache":
    /// reads fall through to the store and writes skip the caches, so a
    /// cache fault never reaches the caller.
    fn with_caches<T>(&self, f: impl FnOnce(&mut LedgerCaches) -> T) -> Option<T> {
        match self.caches.lock() {
            Ok(mut guard) => Some(f(&mut guard)),
            Err(_) => {
                tracing::warn!("cache lock poisoned; degrading to direct store access");
                None
            }
        }
    }

    pub(crate) fn cached_list(
        &self,
        key: &ListKey,
        stamp: Option<chrono::NaiveDate>,
    ) -> Option<Vec<Transaction>> {
        self.with_caches(|caches| {
            let (cached_stamp, items) = caches.lists.get(key, Instant::now())?;
            if cached_stamp != stamp {
                caches.lists.invalidate(key);
                return None;
            }
            Some(items)
        })
        .flatten()
    }

    pub(crate) fn store_list(
        &self,
        key: ListKey,
        stamp: Option<chrono::NaiveDate>,
        items: Vec<Transaction>,
    ) {
        self.with_caches(|caches| caches.lists.insert(key, (stamp, items), Instant::now()));
    }

    pub(crate) fn cached_record(&self, id: &Uuid) -> Option<Transaction> {
        self.with_caches(|caches| caches.records.get(id, Instant::now()))
            .flatten()
    }

    pub(crate) fn store_record(&self, tx: Transaction) {
        self.with_caches(|caches| caches.records.insert(tx.id, tx, Instant::now()));
    }

    pub(crate) fn cached_categories(&self, user_id: &str) -> Option<Vec<Category>> {
        self.with_caches(|caches| caches.categories.get(&user_id.to_string(), Instant::now()))
            .flatten()
    }

    pub(crate) fn store_categories(&self, user_id: &str, items: Vec<Category>) {
        self.with_caches(|caches| {
            caches
                .categories
                .insert(user_id.to_string(), items, Instant::now())
        });
    }

    pub(crate) fn cached_balance(&self, user_id: &str) -> Option<BalanceState> {
        self.with_caches(|caches| caches.balances.get(&user_id.to_string(), Instant::now()))
            .flatten()
    }

    pub(crate) fn store_balance(&self, state: BalanceState) {
        self.with_caches(|caches| {
            caches
                .balances
                .insert(state.user_id.clone(), state, Instant::now())
        });
    }

    /// Mandatory invalidation after every successful mutating ledger call:
    /// every filter-variant list key for the user, the balance entry, and
    /// the single-record entry of the touched transaction. Runs even when
    /// the mutation "didn't change much".
    pub(crate) fn invalidate_user(&self, user_id: &str, transaction_id: Option<Uuid>) {
        self.with_caches(|caches| {
            for variant in ExpenseFilter::VARIANTS {
                caches.lists.invalidate(&(user_id.to_string(), variant));
            }
            if let Some(id) = transaction_id {
                caches.records.invalidate(&id);
            }
            caches.balances.invalidate(&user_id.to_string());
        });
    }

    pub(crate) fn invalidate_categories(&self, user_id: &str) {
        self.with_caches(|caches| caches.categories.invalidate(&user_id.to_string()));
    }

    /// Drops every cached entry (used on logout).
    pub fn clear_caches(&self) {
        self.with_caches(|caches| {
            caches.lists.clear();
            caches.records.clear();
            caches.categories.clear();
            caches.balances.clear();
        });
    }

    /// Hit/miss counters for diagnostics; `None` if the cache lock is
    /// poisoned.
    pub fn cache_stats(&self) -> Option<LedgerCacheStats> {
        self.with_caches(|caches| LedgerCacheStats {
            lists: caches.lists.stats(),
            records: caches.records.stats(),
            categories: caches.categories.stats(),
            balances: caches.balances.stats(),
        })
    }

    /// Looks the referenced category type up in the seeded table, erroring
    /// before any balance state is touched.
    pub(crate) async fn require_category_type<C>(
        &self,
        conn: &C,
        kind: CategoryType,
    ) -> ResultLedger<()>
    where
        C: ConnectionTrait,
    {
        category_types::Entity::find_by_id(kind.as_str().to_string())
            .one(conn)
            .await?
            .ok_or_else(|| {
                LedgerError::Integrity(format!("category type '{}' not seeded", kind.as_str()))
            })?;
        Ok(())
    }
}

/// The builder for `Ledger`
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
    cache_config: CacheConfig,
}

impl LedgerBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Override the default cache capacities and TTLs.
    pub fn cache_config(mut self, config: CacheConfig) -> LedgerBuilder {
        self.cache_config = config;
        self
    }

    /// Construct `Ledger`
    pub async fn build(self) -> ResultLedger<Ledger> {
        Ok(Ledger {
            database: self.database,
            caches: Mutex::new(LedgerCaches::new(&self.cache_config)),
        })
    }
}
