//! The budget entry model and its database queries.

use std::collections::HashMap;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, user::UserID};

use super::{
    Category,
    summary::{BudgetSummary, CategoryTotals, category_total},
};

/// A dated amount of money in one budget category.
///
/// Entries are immutable once created; editing a category happens by
/// replacing all of its entries at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEntry {
    /// The entry's ID. Store-assigned IDs are positive; entries that only
    /// exist in memory carry negative IDs assigned by the budget book.
    pub id: i64,
    /// The user the entry belongs to.
    pub user_id: UserID,
    /// The category the entry is filed under.
    pub category: Category,
    /// When the money moved.
    pub date: Date,
    /// What the entry was for, e.g. "Salary", "Groceries".
    pub description: String,
    /// The dollar amount.
    pub amount: f64,
    /// When the entry was written to the store. `None` until then.
    pub created_at: Option<OffsetDateTime>,
}

/// Create the budget entry table and its index.
///
/// # Errors
///
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_entry_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget_entry (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                )",
        (),
    )?;

    // Replace-by-category and load both select on this pair.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_budget_entry_user_category
             ON budget_entry(user_id, category);",
        (),
    )?;

    Ok(())
}

/// Replace all persisted entries for `(user_id, category)` with `new_entries`.
///
/// Runs as a single SQL transaction: either the category ends up holding
/// exactly `new_entries`, or the store is left untouched. Entry IDs and
/// `created_at` timestamps are assigned by the store, so the IDs on
/// `new_entries` are ignored.
///
/// # Errors
///
/// Returns [Error::StoreWrite] if any statement or the commit fails. The
/// caller is expected to log the error; in-memory state is not rolled back.
pub fn replace_category_entries(
    user_id: UserID,
    category: Category,
    new_entries: &[BudgetEntry],
    connection: &mut Connection,
) -> Result<(), Error> {
    let sql_transaction = connection.transaction().map_err(Error::StoreWrite)?;

    sql_transaction
        .execute(
            "DELETE FROM budget_entry WHERE user_id = ?1 AND category = ?2",
            (user_id.as_i64(), category),
        )
        .map_err(Error::StoreWrite)?;

    {
        let mut statement = sql_transaction
            .prepare(
                "INSERT INTO budget_entry (user_id, category, date, description, amount, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .map_err(Error::StoreWrite)?;

        for entry in new_entries {
            statement
                .execute((
                    user_id.as_i64(),
                    category,
                    entry.date,
                    &entry.description,
                    entry.amount,
                    OffsetDateTime::now_utc(),
                ))
                .map_err(Error::StoreWrite)?;
        }
    }

    sql_transaction.commit().map_err(Error::StoreWrite)
}

/// Load the user's whole budget from the store.
///
/// Queries all entries for `user_id`, groups them by category and folds the
/// groups into a [BudgetSummary]. Categories with no stored entries keep the
/// total given by `baseline`.
///
/// # Errors
///
/// Returns [Error::StoreQuery] if the query fails. The caller is expected to
/// log the error and leave its prior state untouched; there are no retries.
pub fn load_user_budget(
    user_id: UserID,
    baseline: &CategoryTotals,
    connection: &Connection,
) -> Result<(BudgetSummary, HashMap<Category, Vec<BudgetEntry>>), Error> {
    let mut statement = connection
        .prepare(
            "SELECT id, user_id, category, date, description, amount, created_at
             FROM budget_entry
             WHERE user_id = :user_id
             ORDER BY date, id",
        )
        .map_err(Error::StoreQuery)?;

    let rows = statement
        .query_map(&[(":user_id", &user_id.as_i64())], map_entry_row)
        .map_err(Error::StoreQuery)?;

    let mut entries: HashMap<Category, Vec<BudgetEntry>> = HashMap::new();

    for row in rows {
        let entry = row.map_err(Error::StoreQuery)?;
        entries.entry(entry.category).or_default().push(entry);
    }

    let mut totals = *baseline;

    for (&category, category_entries) in &entries {
        totals.set(category, category_total(category_entries));
    }

    Ok((BudgetSummary::from_totals(&totals), entries))
}

/// Map a database row to a [BudgetEntry].
fn map_entry_row(row: &Row) -> Result<BudgetEntry, rusqlite::Error> {
    Ok(BudgetEntry {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category: row.get(2)?,
        date: row.get(3)?,
        description: row.get(4)?,
        amount: row.get(5)?,
        created_at: Some(row.get(6)?),
    })
}

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        PasswordHash,
        budget::{Category, summary::CategoryTotals},
        db::initialize,
        user::{UserID, create_user},
    };

    use super::{BudgetEntry, load_user_budget, replace_category_entries};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn get_test_user(connection: &Connection) -> UserID {
        create_user(PasswordHash::new_unchecked("hunter2"), connection)
            .expect("Could not create test user")
            .id
    }

    fn entry(user_id: UserID, category: Category, description: &str, amount: f64) -> BudgetEntry {
        BudgetEntry {
            id: -1,
            user_id,
            category,
            date: date!(2024 - 03 - 01),
            description: description.to_owned(),
            amount,
            created_at: None,
        }
    }

    #[test]
    fn replace_then_load_round_trips() {
        let mut conn = get_test_connection();
        let user_id = get_test_user(&conn);
        let new_entries = vec![
            entry(user_id, Category::Income, "Salary", 5000.0),
            entry(user_id, Category::Income, "Interest", 12.5),
        ];

        replace_category_entries(user_id, Category::Income, &new_entries, &mut conn)
            .expect("Could not replace entries");

        let (summary, entries) =
            load_user_budget(user_id, &CategoryTotals::default(), &conn).unwrap();
        let loaded = entries.get(&Category::Income).unwrap();

        assert_eq!(loaded.len(), new_entries.len());
        for (got, want) in loaded.iter().zip(&new_entries) {
            assert_eq!(got.date, want.date);
            assert_eq!(got.description, want.description);
            assert_eq!(got.amount, want.amount);
            assert!(got.id > 0, "want a store-assigned ID, got {}", got.id);
            assert!(got.created_at.is_some());
        }
        assert_eq!(summary.income, 5012.5);
    }

    #[test]
    fn replace_overwrites_previous_entries() {
        let mut conn = get_test_connection();
        let user_id = get_test_user(&conn);
        replace_category_entries(
            user_id,
            Category::Bills,
            &[entry(user_id, Category::Bills, "Electricity", 100.0)],
            &mut conn,
        )
        .unwrap();

        replace_category_entries(
            user_id,
            Category::Bills,
            &[entry(user_id, Category::Bills, "Rent", 1800.0)],
            &mut conn,
        )
        .unwrap();

        let (summary, entries) =
            load_user_budget(user_id, &CategoryTotals::default(), &conn).unwrap();
        let bills = entries.get(&Category::Bills).unwrap();

        assert_eq!(bills.len(), 1);
        assert_eq!(bills[0].description, "Rent");
        assert_eq!(summary.bills, 1800.0);
    }

    #[test]
    fn replace_with_empty_clears_category() {
        let mut conn = get_test_connection();
        let user_id = get_test_user(&conn);
        replace_category_entries(
            user_id,
            Category::Savings,
            &[entry(user_id, Category::Savings, "Emergency Fund", 500.0)],
            &mut conn,
        )
        .unwrap();

        replace_category_entries(user_id, Category::Savings, &[], &mut conn).unwrap();

        let (_, entries) = load_user_budget(user_id, &CategoryTotals::default(), &conn).unwrap();

        assert!(entries.get(&Category::Savings).is_none());
    }

    #[test]
    fn replace_leaves_other_categories_alone() {
        let mut conn = get_test_connection();
        let user_id = get_test_user(&conn);
        replace_category_entries(
            user_id,
            Category::Income,
            &[entry(user_id, Category::Income, "Salary", 5000.0)],
            &mut conn,
        )
        .unwrap();

        replace_category_entries(
            user_id,
            Category::Expenses,
            &[entry(user_id, Category::Expenses, "Groceries", 200.0)],
            &mut conn,
        )
        .unwrap();

        let (summary, _) = load_user_budget(user_id, &CategoryTotals::default(), &conn).unwrap();

        assert_eq!(summary.income, 5000.0);
        assert_eq!(summary.expenses, 200.0);
    }

    #[test]
    fn load_seeds_missing_categories_from_baseline() {
        let mut conn = get_test_connection();
        let user_id = get_test_user(&conn);
        replace_category_entries(
            user_id,
            Category::Income,
            &[entry(user_id, Category::Income, "Salary", 4000.0)],
            &mut conn,
        )
        .unwrap();

        let (summary, _) = load_user_budget(user_id, &CategoryTotals::sample(), &conn).unwrap();

        // Stored categories override the baseline; the rest keep it.
        assert_eq!(summary.income, 4000.0);
        assert_eq!(summary.expenses, 2000.0);
        assert_eq!(summary.bills, 1500.0);
        assert_eq!(summary.savings, 500.0);
    }

    #[test]
    fn load_with_no_entries_yields_baseline() {
        let conn = get_test_connection();
        let user_id = get_test_user(&conn);

        let (summary, entries) =
            load_user_budget(user_id, &CategoryTotals::default(), &conn).unwrap();

        assert!(entries.is_empty());
        assert_eq!(summary.net_cash_flow, 0.0);
    }
}
