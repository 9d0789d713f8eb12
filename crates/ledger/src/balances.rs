//! Per-user balance state.
//!
//! Two tracked numbers: the current wallet balance, reduced by every
//! recorded expense, and the reference balance, the user-declared baseline
//! the 50/30/20 projection is computed from. The `user_balances` row is the
//! single source of truth; the in-process cache in front of it is strictly
//! read-through and is evicted on every write.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Currency, LedgerError, MoneyCents};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceState {
    pub user_id: String,
    /// Running wallet total: reference minus every recorded amount,
    /// Savings included.
    pub current: MoneyCents,
    /// Budget baseline, changed only by an explicit override.
    pub reference: MoneyCents,
    pub currency: Currency,
}

impl BalanceState {
    /// Zeroed state for a user with no balance row yet.
    pub fn initial(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            current: MoneyCents::ZERO,
            reference: MoneyCents::ZERO,
            currency: Currency::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub current_minor: i64,
    pub reference_minor: i64,
    pub currency: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BalanceState> for ActiveModel {
    fn from(state: &BalanceState) -> Self {
        Self {
            user_id: ActiveValue::Set(state.user_id.clone()),
            current_minor: ActiveValue::Set(state.current.cents()),
            reference_minor: ActiveValue::Set(state.reference.cents()),
            currency: ActiveValue::Set(state.currency.code().to_string()),
        }
    }
}

impl TryFrom<Model> for BalanceState {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: model.user_id,
            current: MoneyCents::new(model.current_minor),
            reference: MoneyCents::new(model.reference_minor),
            currency: Currency::try_from(model.currency.as_str()).unwrap_or_default(),
        })
    }
}
