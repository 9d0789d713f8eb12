use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use ledger::{
    CategorySnapshot, CategoryType, Currency, ExpenseFilter, ExpenseUpdate, Ledger, LedgerError,
    MoneyCents, NewCategory, NewExpense, SavingsBand,
};
use migration::MigratorTrait;

async fn ledger_with_db() -> (Ledger, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder().database(db.clone()).build().await.unwrap();
    (ledger, db)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn snapshot(name: &str, kind: CategoryType) -> CategorySnapshot {
    CategorySnapshot::new(name.to_string(), "cart".to_string(), None, Some(3), kind)
}

fn expense(user: &str, cents: i64, day: NaiveDate, kind: CategoryType) -> NewExpense {
    NewExpense {
        user_id: user.to_string(),
        amount: MoneyCents::new(cents),
        entry_date: day,
        comment: None,
        snapshot: snapshot("Groceries", kind),
    }
}

#[tokio::test]
async fn recording_expenses_debits_current_balance() {
    let (ledger, _db) = ledger_with_db().await;
    ledger
        .override_balance("alice", MoneyCents::new(100_000))
        .await
        .unwrap();

    ledger
        .record_expense(expense(
            "alice",
            20_000,
            date(2026, 8, 10),
            CategoryType::Necessity,
        ))
        .await
        .unwrap();
    ledger
        .record_expense(expense(
            "alice",
            40_000,
            date(2026, 8, 11),
            CategoryType::Want,
        ))
        .await
        .unwrap();

    let state = ledger.balance("alice").await.unwrap();
    assert_eq!(state.current, MoneyCents::new(40_000));
    assert_eq!(state.reference, MoneyCents::new(100_000));
}

#[tokio::test]
async fn budget_projection_follows_fifty_thirty_twenty() {
    let (ledger, _db) = ledger_with_db().await;
    ledger
        .override_balance("alice", MoneyCents::new(100_000))
        .await
        .unwrap();

    // Necessity 200.00 against an ideal of 500.00.
    ledger
        .record_expense(expense(
            "alice",
            20_000,
            date(2026, 8, 10),
            CategoryType::Necessity,
        ))
        .await
        .unwrap();

    let state = ledger.balance("alice").await.unwrap();
    assert_eq!(state.current, MoneyCents::new(80_000));

    let report = ledger.budget_report("alice").await.unwrap();
    assert_eq!(report.ideal_necessity, MoneyCents::new(50_000));
    assert_eq!(report.ideal_want, MoneyCents::new(30_000));
    assert_eq!(report.ideal_savings, MoneyCents::new(20_000));
    assert_eq!(report.available_necessity, MoneyCents::new(30_000));
    assert_eq!(report.savings_available, MoneyCents::new(80_000));
    assert_eq!(report.savings_pct, 80.0);
    assert_eq!(report.band(), SavingsBand::Excellent);

    // Want 400.00 overspends its 300.00 ideal: available floors at zero,
    // the spent percentage clamps to 100.
    ledger
        .record_expense(expense(
            "alice",
            40_000,
            date(2026, 8, 11),
            CategoryType::Want,
        ))
        .await
        .unwrap();

    let state = ledger.balance("alice").await.unwrap();
    assert_eq!(state.current, MoneyCents::new(40_000));

    let report = ledger.budget_report("alice").await.unwrap();
    assert_eq!(report.available_want, MoneyCents::ZERO);
    assert_eq!(report.spent_pct_want, 100.0);
    assert_eq!(report.savings_available, MoneyCents::new(40_000));
    assert_eq!(report.savings_pct, 40.0);
    assert_eq!(report.band(), SavingsBand::Warning);
}

#[tokio::test]
async fn deleting_an_expense_refunds_the_balance() {
    let (ledger, _db) = ledger_with_db().await;
    ledger
        .override_balance("alice", MoneyCents::new(100_000))
        .await
        .unwrap();

    let keep = ledger
        .record_expense(expense(
            "alice",
            40_000,
            date(2026, 8, 11),
            CategoryType::Want,
        ))
        .await
        .unwrap();
    let necessity = ledger
        .record_expense(expense(
            "alice",
            20_000,
            date(2026, 8, 10),
            CategoryType::Necessity,
        ))
        .await
        .unwrap();

    let rows = ledger.delete_expense(necessity).await.unwrap();
    assert_eq!(rows, 1);

    let state = ledger.balance("alice").await.unwrap();
    assert_eq!(state.current, MoneyCents::new(60_000));

    let report = ledger.budget_report("alice").await.unwrap();
    assert_eq!(report.savings_available, MoneyCents::new(60_000));
    assert_eq!(report.savings_pct, 60.0);

    let remaining = ledger.expenses("alice", &ExpenseFilter::All).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep);
}

#[tokio::test]
async fn savings_expense_lowers_wallet_but_not_projection() {
    let (ledger, _db) = ledger_with_db().await;
    ledger
        .override_balance("alice", MoneyCents::new(100_000))
        .await
        .unwrap();

    ledger
        .record_expense(expense(
            "alice",
            20_000,
            date(2026, 8, 10),
            CategoryType::Necessity,
        ))
        .await
        .unwrap();
    ledger
        .record_expense(expense(
            "alice",
            20_000,
            date(2026, 8, 11),
            CategoryType::Want,
        ))
        .await
        .unwrap();
    // A 100.00 Savings transfer leaves the wallet but stays out of the
    // committed Necessity/Want spend.
    ledger
        .record_expense(expense(
            "alice",
            10_000,
            date(2026, 8, 12),
            CategoryType::Savings,
        ))
        .await
        .unwrap();

    let state = ledger.balance("alice").await.unwrap();
    assert_eq!(state.current, MoneyCents::new(50_000));

    let report = ledger.budget_report("alice").await.unwrap();
    assert_eq!(report.savings_available, MoneyCents::new(60_000));
    assert_eq!(report.savings_pct, 60.0);
}

#[tokio::test]
async fn update_expense_shifts_balance_by_the_delta() {
    let (ledger, _db) = ledger_with_db().await;
    ledger
        .override_balance("alice", MoneyCents::new(100_000))
        .await
        .unwrap();

    let id = ledger
        .record_expense(expense(
            "alice",
            20_000,
            date(2026, 8, 10),
            CategoryType::Necessity,
        ))
        .await
        .unwrap();

    let rows = ledger
        .update_expense(
            id,
            ExpenseUpdate {
                amount: MoneyCents::new(35_000),
                entry_date: date(2026, 8, 12),
                comment: Some("weekly shop".to_string()),
                snapshot: snapshot("Groceries", CategoryType::Necessity),
            },
        )
        .await
        .unwrap();
    assert_eq!(rows, 1);

    let state = ledger.balance("alice").await.unwrap();
    assert_eq!(state.current, MoneyCents::new(65_000));

    let updated = ledger.expense(id).await.unwrap();
    assert_eq!(updated.amount, MoneyCents::new(35_000));
    assert_eq!(updated.entry_date, date(2026, 8, 12));
    assert_eq!(updated.comment.as_deref(), Some("weekly shop"));
}

#[tokio::test]
async fn balance_survives_delete_and_reinsert() {
    let (ledger, _db) = ledger_with_db().await;
    ledger
        .override_balance("alice", MoneyCents::new(100_000))
        .await
        .unwrap();

    let id = ledger
        .record_expense(expense(
            "alice",
            25_000,
            date(2026, 8, 10),
            CategoryType::Want,
        ))
        .await
        .unwrap();
    ledger.delete_expense(id).await.unwrap();
    ledger
        .record_expense(expense(
            "alice",
            25_000,
            date(2026, 8, 10),
            CategoryType::Want,
        ))
        .await
        .unwrap();

    let state = ledger.balance("alice").await.unwrap();
    assert_eq!(state.current, MoneyCents::new(75_000));
    assert_eq!(ledger.count_expenses("alice").await.unwrap(), 1);
}

#[tokio::test]
async fn listings_are_newest_first_and_filters_bound_dates() {
    let (ledger, _db) = ledger_with_db().await;
    let days = [
        date(2026, 8, 1),
        date(2026, 8, 20),
        date(2026, 8, 26),
        date(2026, 8, 26),
    ];
    for day in days {
        ledger
            .record_expense(expense("alice", 1_000, day, CategoryType::Necessity))
            .await
            .unwrap();
    }

    let all = ledger.expenses("alice", &ExpenseFilter::All).await.unwrap();
    assert_eq!(all.len(), 4);
    let listed: Vec<NaiveDate> = all.iter().map(|tx| tx.entry_date).collect();
    assert_eq!(
        listed,
        vec![
            date(2026, 8, 26),
            date(2026, 8, 26),
            date(2026, 8, 20),
            date(2026, 8, 1),
        ]
    );
    // Same entry date: the id ordering is repeatable.
    let again = ledger.expenses("alice", &ExpenseFilter::All).await.unwrap();
    assert_eq!(all, again);

    let today = ledger
        .expenses("alice", &ExpenseFilter::Today(date(2026, 8, 26)))
        .await
        .unwrap();
    assert_eq!(today.len(), 2);

    let week = ledger
        .expenses("alice", &ExpenseFilter::Week(date(2026, 8, 26)))
        .await
        .unwrap();
    assert_eq!(week.len(), 3);

    let month = ledger
        .expenses("alice", &ExpenseFilter::Month(date(2026, 8, 26)))
        .await
        .unwrap();
    assert_eq!(month.len(), 4);

    let range = ledger
        .expenses(
            "alice",
            &ExpenseFilter::Range {
                from: date(2026, 8, 2),
                to: date(2026, 8, 25),
            },
        )
        .await
        .unwrap();
    assert_eq!(range.len(), 1);

    let err = ledger
        .expenses(
            "alice",
            &ExpenseFilter::Range {
                from: date(2026, 8, 25),
                to: date(2026, 8, 2),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn dated_filters_do_not_share_cache_entries_across_reference_dates() {
    let (ledger, _db) = ledger_with_db().await;
    ledger
        .record_expense(expense(
            "alice",
            1_000,
            date(2026, 8, 28),
            CategoryType::Necessity,
        ))
        .await
        .unwrap();

    let today = ledger
        .expenses("alice", &ExpenseFilter::Today(date(2026, 8, 28)))
        .await
        .unwrap();
    assert_eq!(today.len(), 1);

    // The cached list belongs to the 28th; asking about the 29th must go
    // back to the store, not reuse it.
    let next_day = ledger
        .expenses("alice", &ExpenseFilter::Today(date(2026, 8, 29)))
        .await
        .unwrap();
    assert!(next_day.is_empty());

    let again = ledger
        .expenses("alice", &ExpenseFilter::Today(date(2026, 8, 28)))
        .await
        .unwrap();
    assert_eq!(again.len(), 1);

    let week = ledger
        .expenses("alice", &ExpenseFilter::Week(date(2026, 8, 28)))
        .await
        .unwrap();
    assert_eq!(week.len(), 1);
    let week_later = ledger
        .expenses("alice", &ExpenseFilter::Week(date(2026, 9, 28)))
        .await
        .unwrap();
    assert!(week_later.is_empty());
}

#[tokio::test]
async fn pagination_walks_newest_first() {
    let (ledger, _db) = ledger_with_db().await;
    for day in 1..=25 {
        ledger
            .record_expense(expense(
                "alice",
                1_000,
                date(2026, 7, day),
                CategoryType::Necessity,
            ))
            .await
            .unwrap();
    }

    let first = ledger
        .expenses_page("alice", 0, ledger::DEFAULT_PAGE_SIZE)
        .await
        .unwrap();
    assert_eq!(first.len(), 20);
    assert_eq!(first[0].entry_date, date(2026, 7, 25));

    let second = ledger
        .expenses_page("alice", 1, ledger::DEFAULT_PAGE_SIZE)
        .await
        .unwrap();
    assert_eq!(second.len(), 5);
    assert_eq!(second[4].entry_date, date(2026, 7, 1));

    assert_eq!(ledger.count_expenses("alice").await.unwrap(), 25);

    let err = ledger.expenses_page("alice", 0, 0).await.unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn aggregates_split_by_type_and_date() {
    let (ledger, _db) = ledger_with_db().await;
    ledger
        .record_expense(expense(
            "alice",
            10_000,
            date(2026, 8, 1),
            CategoryType::Necessity,
        ))
        .await
        .unwrap();
    ledger
        .record_expense(expense(
            "alice",
            5_000,
            date(2026, 8, 10),
            CategoryType::Want,
        ))
        .await
        .unwrap();
    ledger
        .record_expense(expense(
            "bob",
            99_000,
            date(2026, 8, 10),
            CategoryType::Want,
        ))
        .await
        .unwrap();

    let spend = ledger.spend_by_type("alice").await.unwrap();
    assert_eq!(spend.necessity, MoneyCents::new(10_000));
    assert_eq!(spend.want, MoneyCents::new(5_000));
    assert_eq!(spend.savings, MoneyCents::ZERO);
    assert_eq!(spend.committed(), MoneyCents::new(15_000));

    let total = ledger.total_spent("alice", None, None).await.unwrap();
    assert_eq!(total, MoneyCents::new(15_000));

    let bounded = ledger
        .total_spent("alice", Some(date(2026, 8, 5)), None)
        .await
        .unwrap();
    assert_eq!(bounded, MoneyCents::new(5_000));

    // A user with no rows still sums to an explicit zero.
    let empty = ledger.total_spent("carol", None, None).await.unwrap();
    assert_eq!(empty, MoneyCents::ZERO);
}

#[tokio::test]
async fn lists_are_refetched_after_each_mutation() {
    let (ledger, _db) = ledger_with_db().await;
    let id = ledger
        .record_expense(expense(
            "alice",
            10_000,
            date(2026, 8, 1),
            CategoryType::Necessity,
        ))
        .await
        .unwrap();

    // Prime the list, record, and balance caches.
    assert_eq!(
        ledger
            .expenses("alice", &ExpenseFilter::All)
            .await
            .unwrap()
            .len(),
        1
    );
    ledger.expense(id).await.unwrap();
    ledger.balance("alice").await.unwrap();

    ledger
        .record_expense(expense(
            "alice",
            5_000,
            date(2026, 8, 2),
            CategoryType::Want,
        ))
        .await
        .unwrap();

    let listed = ledger.expenses("alice", &ExpenseFilter::All).await.unwrap();
    assert_eq!(listed.len(), 2);
    let state = ledger.balance("alice").await.unwrap();
    assert_eq!(state.current, MoneyCents::new(-15_000));

    ledger.delete_expense(id).await.unwrap();
    let err = ledger.expense(id).await.unwrap_err();
    assert_eq!(err, LedgerError::NotFound("transaction not exists".to_string()));
    assert_eq!(
        ledger
            .expenses("alice", &ExpenseFilter::All)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn caches_serve_hits_between_mutations() {
    let (ledger, _db) = ledger_with_db().await;
    ledger
        .record_expense(expense(
            "alice",
            10_000,
            date(2026, 8, 1),
            CategoryType::Necessity,
        ))
        .await
        .unwrap();

    ledger.expenses("alice", &ExpenseFilter::All).await.unwrap();
    ledger.expenses("alice", &ExpenseFilter::All).await.unwrap();

    let stats = ledger.cache_stats().unwrap();
    assert_eq!(stats.lists.hits, 1);
    assert_eq!(stats.lists.misses, 1);

    ledger.clear_caches();
    ledger.expenses("alice", &ExpenseFilter::All).await.unwrap();
    let stats = ledger.cache_stats().unwrap();
    assert_eq!(stats.lists.misses, 2);
}

#[tokio::test]
async fn category_edits_leave_snapshots_untouched() {
    let (ledger, _db) = ledger_with_db().await;
    let category_id = ledger
        .create_category(NewCategory {
            user_id: "alice".to_string(),
            name: "Groceries".to_string(),
            icon: "cart".to_string(),
            image_path: None,
            color: Some(3),
            category_type: CategoryType::Necessity,
        })
        .await
        .unwrap();

    let expense_id = ledger
        .record_expense(expense(
            "alice",
            10_000,
            date(2026, 8, 1),
            CategoryType::Necessity,
        ))
        .await
        .unwrap();

    ledger
        .update_category(
            category_id,
            ledger::CategoryUpdate {
                name: "Food".to_string(),
                icon: "fork".to_string(),
                image_path: None,
                color: Some(5),
                category_type: CategoryType::Want,
            },
        )
        .await
        .unwrap();

    let categories = ledger.categories("alice").await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Food");
    assert_eq!(categories[0].category_type, CategoryType::Want);

    // The recorded row still shows what was true at insert time.
    let recorded = ledger.expense(expense_id).await.unwrap();
    assert_eq!(recorded.snapshot.name, "Groceries");
    assert_eq!(recorded.snapshot.category_type, CategoryType::Necessity);
    assert_eq!(recorded.snapshot.type_label, "Necesidad");

    ledger.delete_category(category_id).await.unwrap();
    assert!(ledger.categories("alice").await.unwrap().is_empty());
    let recorded = ledger.expense(expense_id).await.unwrap();
    assert_eq!(recorded.snapshot.name, "Groceries");
}

#[tokio::test]
async fn unseeded_category_type_rejects_the_insert() {
    let (ledger, db) = ledger_with_db().await;
    ledger
        .override_balance("alice", MoneyCents::new(100_000))
        .await
        .unwrap();

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "DELETE FROM category_types WHERE id = ?",
        vec!["want".into()],
    ))
    .await
    .unwrap();

    let err = ledger
        .record_expense(expense(
            "alice",
            10_000,
            date(2026, 8, 1),
            CategoryType::Want,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Integrity(_)));

    // Rejected before any balance state was touched.
    let state = ledger.balance("alice").await.unwrap();
    assert_eq!(state.current, MoneyCents::new(100_000));
    assert_eq!(ledger.count_expenses("alice").await.unwrap(), 0);
}

#[tokio::test]
async fn override_below_committed_spend_is_refused() {
    let (ledger, _db) = ledger_with_db().await;
    ledger
        .override_balance("alice", MoneyCents::new(100_000))
        .await
        .unwrap();
    ledger
        .record_expense(expense(
            "alice",
            60_000,
            date(2026, 8, 1),
            CategoryType::Necessity,
        ))
        .await
        .unwrap();

    let err = ledger
        .override_balance("alice", MoneyCents::new(50_000))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::ConsistencyWarning(_)));

    // A negative reference falls below any committed spend, including zero.
    let err = ledger
        .override_balance("bob", MoneyCents::new(-1))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::ConsistencyWarning(_)));

    let state = ledger.balance("alice").await.unwrap();
    assert_eq!(state.reference, MoneyCents::new(100_000));
    assert_eq!(state.current, MoneyCents::new(40_000));

    // A covering override re-derives the current balance from history.
    let state = ledger
        .override_balance("alice", MoneyCents::new(80_000))
        .await
        .unwrap();
    assert_eq!(state.reference, MoneyCents::new(80_000));
    assert_eq!(state.current, MoneyCents::new(20_000));
}

#[tokio::test]
async fn unknown_ids_report_not_found() {
    let (ledger, _db) = ledger_with_db().await;

    let err = ledger.expense(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err, LedgerError::NotFound("transaction not exists".to_string()));

    let err = ledger.delete_expense(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err, LedgerError::NotFound("transaction not exists".to_string()));

    let err = ledger.delete_category(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err, LedgerError::NotFound("category not exists".to_string()));
}

#[tokio::test]
async fn currency_change_shows_up_in_the_signal() {
    let (ledger, _db) = ledger_with_db().await;
    ledger
        .override_balance("alice", MoneyCents::new(100_000))
        .await
        .unwrap();
    ledger.set_currency("alice", Currency::Eur).await.unwrap();

    let signal = ledger.budget_signal("alice").await.unwrap();
    assert_eq!(signal.currency_code, "EUR");
    assert_eq!(signal.savings_pct, 100.0);
    assert_eq!(signal.savings_available, MoneyCents::new(100_000));
}
