use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Statement, Value};

use crate::transactions::format_entry_date;
use crate::{CategoryType, MoneyCents, ResultLedger, SpendByType};

use super::super::Ledger;

/// Sums a user's spend per category type. Generic over the connection so
/// it can run both standalone and inside a balance-override transaction.
pub(crate) async fn spend_by_type_on<C>(conn: &C, user_id: &str) -> ResultLedger<SpendByType>
where
    C: ConnectionTrait,
{
    let statement = Statement::from_sql_and_values(
        conn.get_database_backend(),
        "SELECT category_type, COALESCE(SUM(amount_minor), 0) AS total \
         FROM transactions WHERE user_id = ? GROUP BY category_type",
        vec![user_id.into()],
    );
    let rows = conn.query_all(statement).await?;

    let mut spend = SpendByType::default();
    for row in rows {
        let kind: String = row.try_get("", "category_type")?;
        let total: i64 = row.try_get("", "total")?;
        match CategoryType::try_from(kind.as_str())? {
            CategoryType::Necessity => spend.necessity = MoneyCents::new(total),
            CategoryType::Want => spend.want = MoneyCents::new(total),
            CategoryType::Savings => spend.savings = MoneyCents::new(total),
        }
    }
    Ok(spend)
}

impl Ledger {
    /// Per-type spend totals for a user, missing types reported as zero.
    pub async fn spend_by_type(&self, user_id: &str) -> ResultLedger<SpendByType> {
        spend_by_type_on(&self.database, user_id).await
    }

    /// Sum of every expense of the user, optionally bounded by inclusive
    /// entry dates.
    pub async fn total_spent(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ResultLedger<MoneyCents> {
        let mut sql = String::from(
            "SELECT COALESCE(SUM(amount_minor), 0) AS total \
             FROM transactions WHERE user_id = ?",
        );
        let mut values: Vec<Value> = vec![user_id.into()];
        if let Some(from) = from {
            sql.push_str(" AND entry_date >= ?");
            values.push(format_entry_date(from).into());
        }
        if let Some(to) = to {
            sql.push_str(" AND entry_date <= ?");
            values.push(format_entry_date(to).into());
        }

        let statement =
            Statement::from_sql_and_values(self.database.get_database_backend(), sql, values);
        let total = match self.database.query_one(statement).await? {
            Some(row) => row.try_get::<i64>("", "total")?,
            None => 0,
        };
        Ok(MoneyCents::new(total))
    }
}
