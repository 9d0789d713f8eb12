use sea_orm::{ActiveValue, ConnectionTrait, TransactionTrait, prelude::*};

use crate::balances::{self, BalanceState};
use crate::{BudgetReport, BudgetSignal, Currency, LedgerError, MoneyCents, ResultLedger};

use super::transactions::spend_by_type_on;
use super::{Ledger, with_tx};

impl Ledger {
    /// Fetches the row for a user, creating it with zeroed balances on
    /// first touch.
    async fn ensure_balance_model<C>(conn: &C, user_id: &str) -> ResultLedger<balances::Model>
    where
        C: ConnectionTrait,
    {
        if let Some(model) = balances::Entity::find_by_id(user_id.to_string())
            .one(conn)
            .await?
        {
            return Ok(model);
        }
        let state = BalanceState::initial(user_id);
        let model = balances::ActiveModel::from(&state).insert(conn).await?;
        Ok(model)
    }

    /// Shifts a user's current balance by `delta_minor`. Always runs inside
    /// the same transaction as the ledger write it accompanies.
    pub(crate) async fn apply_balance_delta<C>(
        &self,
        conn: &C,
        user_id: &str,
        delta_minor: i64,
    ) -> ResultLedger<()>
    where
        C: ConnectionTrait,
    {
        let model = Self::ensure_balance_model(conn, user_id).await?;
        let active = balances::ActiveModel {
            user_id: ActiveValue::Set(user_id.to_string()),
            current_minor: ActiveValue::Set(model.current_minor + delta_minor),
            ..Default::default()
        };
        active.update(conn).await?;
        Ok(())
    }

    /// A user's balance state, through the balance cache. Users without a
    /// row yet read as all zeroes.
    pub async fn balance(&self, user_id: &str) -> ResultLedger<BalanceState> {
        if let Some(hit) = self.cached_balance(user_id) {
            return Ok(hit);
        }

        let state = match balances::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await?
        {
            Some(model) => BalanceState::try_from(model)?,
            None => BalanceState::initial(user_id),
        };
        self.store_balance(state.clone());
        Ok(state)
    }

    /// Replaces the user's reference balance. The current balance is
    /// re-derived as the new reference minus necessity and want spend
    /// already committed, so recorded history stays accounted for. Errors
    /// without writing when the new reference does not cover that spend.
    pub async fn override_balance(
        &self,
        user_id: &str,
        new_reference: MoneyCents,
    ) -> ResultLedger<BalanceState> {
        let state = with_tx!(self, |db_tx| {
            // Committed spend is never negative, so this also rejects a
            // negative reference.
            let committed = spend_by_type_on(&db_tx, user_id).await?.committed();
            if new_reference < committed {
                return Err(LedgerError::ConsistencyWarning(format!(
                    "reference balance {new_reference} does not cover committed spend {committed}"
                )));
            }

            let model = Self::ensure_balance_model(&db_tx, user_id).await?;
            let state = BalanceState {
                user_id: user_id.to_string(),
                current: new_reference - committed,
                reference: new_reference,
                currency: Currency::try_from(model.currency.as_str())?,
            };
            let active = balances::ActiveModel {
                user_id: ActiveValue::Set(user_id.to_string()),
                current_minor: ActiveValue::Set(state.current.cents()),
                reference_minor: ActiveValue::Set(state.reference.cents()),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(state)
        })?;

        self.invalidate_user(user_id, None);
        self.store_balance(state.clone());
        tracing::info!(%user_id, reference = %state.reference, "overrode reference balance");
        Ok(state)
    }

    /// Changes the display currency of a user's balances.
    pub async fn set_currency(&self, user_id: &str, currency: Currency) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            Self::ensure_balance_model(&db_tx, user_id).await?;
            let active = balances::ActiveModel {
                user_id: ActiveValue::Set(user_id.to_string()),
                currency: ActiveValue::Set(currency.code().to_string()),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })?;

        self.with_caches(|caches| caches.balances.invalidate(&user_id.to_string()));
        Ok(())
    }

    /// The 50/30/20 breakdown for a user, derived from the reference
    /// balance and the per-type spend totals.
    pub async fn budget_report(&self, user_id: &str) -> ResultLedger<BudgetReport> {
        let state = self.balance(user_id).await?;
        let spend = self.spend_by_type(user_id).await?;
        Ok(BudgetReport::compute(state.reference, &spend))
    }

    /// The savings health signal derived from the budget report.
    pub async fn budget_signal(&self, user_id: &str) -> ResultLedger<BudgetSignal> {
        let state = self.balance(user_id).await?;
        let spend = self.spend_by_type(user_id).await?;
        Ok(BudgetReport::compute(state.reference, &spend).signal(state.currency))
    }
}
