use chrono::NaiveDate;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::transactions::{self, CategorySnapshot, Transaction, format_entry_date};
use crate::{LedgerError, MoneyCents, ResultLedger};

use super::super::{Ledger, with_tx};

/// Command to record a new expense.
#[derive(Clone, Debug)]
pub struct NewExpense {
    pub user_id: String,
    pub amount: MoneyCents,
    pub entry_date: NaiveDate,
    pub comment: Option<String>,
    pub snapshot: CategorySnapshot,
}

/// Full replacement for an existing expense, snapshot included.
#[derive(Clone, Debug)]
pub struct ExpenseUpdate {
    pub amount: MoneyCents,
    pub entry_date: NaiveDate,
    pub comment: Option<String>,
    pub snapshot: CategorySnapshot,
}

impl Ledger {
    /// Records an expense and debits the user's current balance by its
    /// amount, atomically. Returns the id of the new transaction.
    pub async fn record_expense(&self, cmd: NewExpense) -> ResultLedger<Uuid> {
        let record = Transaction::new(
            cmd.user_id,
            cmd.amount,
            cmd.entry_date,
            cmd.comment,
            cmd.snapshot,
        )?;

        let id = with_tx!(self, |db_tx| {
            self.require_category_type(&db_tx, record.snapshot.category_type)
                .await?;
            transactions::ActiveModel::from(&record)
                .insert(&db_tx)
                .await?;
            self.apply_balance_delta(&db_tx, &record.user_id, -record.amount.cents())
                .await?;
            Ok(record.id)
        })?;

        self.invalidate_user(&record.user_id, Some(id));
        tracing::info!(user_id = %record.user_id, %id, amount = %record.amount, "recorded expense");
        Ok(id)
    }

    /// Replaces every mutable field of an expense and shifts the user's
    /// current balance by the amount delta. Returns the number of updated
    /// rows.
    pub async fn update_expense(&self, id: Uuid, cmd: ExpenseUpdate) -> ResultLedger<u64> {
        if !cmd.amount.is_positive() {
            return Err(LedgerError::Validation(
                "expense amount must be positive".to_string(),
            ));
        }
        if cmd.snapshot.name.trim().is_empty() {
            return Err(LedgerError::Validation(
                "category snapshot name cannot be empty".to_string(),
            ));
        }

        let user_id = with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| LedgerError::NotFound("transaction not exists".to_string()))?;
            self.require_category_type(&db_tx, cmd.snapshot.category_type)
                .await?;

            let delta = cmd.amount.cents() - model.amount_minor;
            let active = transactions::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                amount_minor: ActiveValue::Set(cmd.amount.cents()),
                entry_date: ActiveValue::Set(format_entry_date(cmd.entry_date)),
                comment: ActiveValue::Set(cmd.comment.clone()),
                category_name: ActiveValue::Set(cmd.snapshot.name.clone()),
                category_icon: ActiveValue::Set(cmd.snapshot.icon.clone()),
                category_image_path: ActiveValue::Set(cmd.snapshot.image_path.clone()),
                category_color: ActiveValue::Set(cmd.snapshot.color),
                category_type: ActiveValue::Set(cmd.snapshot.category_type.as_str().to_string()),
                category_type_label: ActiveValue::Set(cmd.snapshot.type_label.clone()),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            self.apply_balance_delta(&db_tx, &model.user_id, -delta)
                .await?;
            Ok(model.user_id)
        })?;

        self.invalidate_user(&user_id, Some(id));
        tracing::info!(%user_id, %id, "updated expense");
        Ok(1)
    }

    /// Deletes an expense, refunding its amount to the user's current
    /// balance in the same transaction. Returns the number of deleted rows.
    pub async fn delete_expense(&self, id: Uuid) -> ResultLedger<u64> {
        let (user_id, rows) = with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| LedgerError::NotFound("transaction not exists".to_string()))?;

            self.apply_balance_delta(&db_tx, &model.user_id, model.amount_minor)
                .await?;
            let result = transactions::Entity::delete_by_id(model.id.clone())
                .exec(&db_tx)
                .await?;
            Ok((model.user_id, result.rows_affected))
        })?;

        self.invalidate_user(&user_id, Some(id));
        tracing::info!(%user_id, %id, "deleted expense");
        Ok(rows)
    }
}
