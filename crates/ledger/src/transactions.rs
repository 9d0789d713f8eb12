//! Ledger row primitives.
//!
//! A `Transaction` is one recorded expense. It embeds a `CategorySnapshot`
//! frozen at insert time, so later category edits or deletions never change
//! what history shows.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CategoryType, LedgerError, MoneyCents, ResultLedger};

/// Date column format. Lexicographic comparison of the stored strings must
/// equal chronological comparison, which holds for zero-padded `YYYY-MM-DD`.
pub(crate) const ENTRY_DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn format_entry_date(date: NaiveDate) -> String {
    date.format(ENTRY_DATE_FORMAT).to_string()
}

fn parse_entry_date(value: &str) -> ResultLedger<NaiveDate> {
    NaiveDate::parse_from_str(value, ENTRY_DATE_FORMAT)
        .map_err(|_| LedgerError::Validation(format!("invalid entry date: {value}")))
}

/// Immutable denormalized category data captured when an expense is
/// recorded. Distinct from the mutable [`Category`](crate::Category)
/// aggregate on purpose.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    pub name: String,
    pub icon: String,
    pub image_path: Option<String>,
    pub color: Option<i32>,
    pub category_type: CategoryType,
    /// Display label of the type as it read at insert time.
    pub type_label: String,
}

impl CategorySnapshot {
    pub fn new(
        name: String,
        icon: String,
        image_path: Option<String>,
        color: Option<i32>,
        category_type: CategoryType,
    ) -> Self {
        Self {
            name,
            icon,
            image_path,
            color,
            category_type,
            type_label: category_type.label().to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub amount: MoneyCents,
    pub entry_date: NaiveDate,
    pub comment: Option<String>,
    pub snapshot: CategorySnapshot,
}

impl Transaction {
    pub fn new(
        user_id: String,
        amount: MoneyCents,
        entry_date: NaiveDate,
        comment: Option<String>,
        snapshot: CategorySnapshot,
    ) -> ResultLedger<Self> {
        if !amount.is_positive() {
            return Err(LedgerError::Validation(
                "amount must be > 0".to_string(),
            ));
        }
        if snapshot.name.trim().is_empty() {
            return Err(LedgerError::Validation(
                "category name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            amount,
            entry_date,
            comment,
            snapshot,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub amount_minor: i64,
    pub entry_date: String,
    pub comment: Option<String>,
    pub category_name: String,
    pub category_icon: String,
    pub category_image_path: Option<String>,
    pub category_color: Option<i32>,
    pub category_type: String,
    pub category_type_label: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            entry_date: ActiveValue::Set(format_entry_date(tx.entry_date)),
            comment: ActiveValue::Set(tx.comment.clone()),
            category_name: ActiveValue::Set(tx.snapshot.name.clone()),
            category_icon: ActiveValue::Set(tx.snapshot.icon.clone()),
            category_image_path: ActiveValue::Set(tx.snapshot.image_path.clone()),
            category_color: ActiveValue::Set(tx.snapshot.color),
            category_type: ActiveValue::Set(tx.snapshot.category_type.as_str().to_string()),
            category_type_label: ActiveValue::Set(tx.snapshot.type_label.clone()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::NotFound("transaction not exists".to_string()))?,
            user_id: model.user_id,
            amount: MoneyCents::new(model.amount_minor),
            entry_date: parse_entry_date(&model.entry_date)?,
            comment: model.comment,
            snapshot: CategorySnapshot {
                name: model.category_name,
                icon: model.category_icon,
                image_path: model.category_image_path,
                color: model.category_color,
                category_type: CategoryType::try_from(model.category_type.as_str())?,
                type_label: model.category_type_label,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> CategorySnapshot {
        CategorySnapshot::new(
            "Groceries".to_string(),
            "cart".to_string(),
            None,
            Some(0x00FF00),
            CategoryType::Necessity,
        )
    }

    #[test]
    fn rejects_non_positive_amount() {
        for cents in [0, -500] {
            let err = Transaction::new(
                "alice".to_string(),
                MoneyCents::new(cents),
                NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
                None,
                snapshot(),
            )
            .unwrap_err();
            assert!(matches!(err, LedgerError::Validation(_)));
        }
    }

    #[test]
    fn snapshot_captures_type_label() {
        assert_eq!(snapshot().type_label, "Necesidad");
    }

    #[test]
    fn entry_date_format_is_lexicographically_ordered() {
        let early = format_entry_date(NaiveDate::from_ymd_opt(2026, 2, 9).unwrap());
        let late = format_entry_date(NaiveDate::from_ymd_opt(2026, 11, 1).unwrap());
        assert_eq!(early, "2026-02-09");
        assert!(early < late);
    }
}
