//! Core engine of a personal expense tracker: a transaction ledger with
//! frozen category snapshots, per-user balance state, a read-through
//! TTL + LRU cache layer, and a 50/30/20 budget projection on top.

pub use balances::BalanceState;
pub use budget::{BudgetReport, BudgetSignal, SavingsBand, SpendByType};
pub use cache::{CacheConfig, CacheStats, TtlCache};
pub use categories::{Category, CategoryType};
pub use currency::Currency;
pub use directory::{CategoryRecord, CurrencyRecord, Directory};
pub use error::LedgerError;
pub use money::MoneyCents;
pub use ops::{
    CategoryUpdate, DEFAULT_PAGE_SIZE, ExpenseFilter, ExpenseUpdate, Ledger, LedgerBuilder,
    LedgerCacheStats, NewCategory, NewExpense,
};
pub use transactions::{CategorySnapshot, Transaction};

mod balances;
mod budget;
mod cache;
mod categories;
mod currency;
mod directory;
mod error;
mod money;
mod ops;
mod transactions;

type ResultLedger<T> = Result<T, LedgerError>;
