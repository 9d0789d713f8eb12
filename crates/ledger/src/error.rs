//! The module contains the errors the ledger can return.
//!
//! The taxonomy is small and deliberate:
//!
//! - [`Validation`] for bad input (non-positive amount, empty names).
//! - [`NotFound`] for operations on a missing transaction or category.
//! - [`Integrity`] when a referenced category type is not seeded; raised
//!   before any balance state is touched.
//! - [`ConsistencyWarning`] when a balance override would fall below the
//!   cumulative Necessity+Want spend; rejected outright, never clamped.
//!
//! [`Validation`]: LedgerError::Validation
//! [`NotFound`]: LedgerError::NotFound
//! [`Integrity`]: LedgerError::Integrity
//! [`ConsistencyWarning`]: LedgerError::ConsistencyWarning
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Integrity violation: {0}")]
    Integrity(String),
    #[error("Inconsistent balance: {0}")]
    ConsistencyWarning(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Integrity(a), Self::Integrity(b)) => a == b,
            (Self::ConsistencyWarning(a), Self::ConsistencyWarning(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
