//! The in-memory budget book.
//!
//! The book holds the entries and summary rendered on the budget page. While
//! no one is signed in it shows the demo budget and absorbs edits without
//! persisting them. A background task subscribes to the session store and
//! swaps the book's contents on sign-in (load from the store) and sign-out
//! (reset to the demo budget, discarding unsynced edits).

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;
use time::Date;
use tokio::task::JoinHandle;

use crate::{Error, session::SessionStore, user::UserID};

use super::{
    Category,
    entry::{BudgetEntry, load_user_budget, replace_category_entries},
    summary::{BudgetSummary, CategoryTotals, category_total},
};

/// Placeholder owner for entries that only exist in memory.
const LOCAL_OWNER: UserID = UserID::new(0);

/// The budget being edited: entries per category plus the derived summary.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetBook {
    entries: HashMap<Category, Vec<BudgetEntry>>,
    totals: CategoryTotals,
    summary: BudgetSummary,
    next_local_id: i64,
}

impl BudgetBook {
    /// The demo budget shown to anonymous visitors.
    ///
    /// The demo totals do not match the demo entries; a category's total is
    /// only recomputed from its entries once that category is edited.
    pub fn sample() -> Self {
        let sample_entries = [
            (Category::Income, "Salary", 5000.0),
            (Category::Expenses, "Groceries", 200.0),
            (Category::Bills, "Electricity", 100.0),
            (Category::Savings, "Emergency Fund", 500.0),
            (Category::Debt, "Credit Card Payment", 300.0),
        ];

        let mut entries: HashMap<Category, Vec<BudgetEntry>> = HashMap::new();
        let mut next_local_id = -1;

        for (category, description, amount) in sample_entries {
            entries.entry(category).or_default().push(BudgetEntry {
                id: next_local_id,
                user_id: LOCAL_OWNER,
                category,
                date: time::macros::date!(2024 - 03 - 01),
                description: description.to_owned(),
                amount,
                created_at: None,
            });
            next_local_id -= 1;
        }

        let totals = CategoryTotals::sample();

        Self {
            entries,
            totals,
            summary: BudgetSummary::from_totals(&totals),
            next_local_id,
        }
    }

    /// The current summary figures.
    pub fn summary(&self) -> &BudgetSummary {
        &self.summary
    }

    /// The entries in `category`, in insertion order.
    pub fn entries(&self, category: Category) -> &[BudgetEntry] {
        self.entries.get(&category).map_or(&[], Vec::as_slice)
    }

    /// Add an entry to `category` and recompute that category's total and the
    /// summary. Returns a clone of the added entry.
    ///
    /// The entry gets a negative in-memory ID; the store assigns the real ID
    /// if and when the category is reconciled.
    pub fn add_entry(
        &mut self,
        category: Category,
        date: Date,
        description: &str,
        amount: f64,
    ) -> BudgetEntry {
        let entry = BudgetEntry {
            id: self.next_local_id,
            user_id: LOCAL_OWNER,
            category,
            date,
            description: description.to_owned(),
            amount,
            created_at: None,
        };
        self.next_local_id -= 1;

        self.entries.entry(category).or_default().push(entry.clone());
        self.recompute(category);

        entry
    }

    /// Remove the entry with `entry_id` from `category` and recompute that
    /// category's total and the summary.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if no entry in `category` has `entry_id`.
    pub fn remove_entry(&mut self, category: Category, entry_id: i64) -> Result<(), Error> {
        let category_entries = self.entries.entry(category).or_default();
        let initial_length = category_entries.len();

        category_entries.retain(|entry| entry.id != entry_id);

        if category_entries.len() == initial_length {
            return Err(Error::NotFound);
        }

        self.recompute(category);

        Ok(())
    }

    /// Replace the book's contents with a budget loaded from the store.
    pub fn load(&mut self, summary: BudgetSummary, entries: HashMap<Category, Vec<BudgetEntry>>) {
        self.totals = summary.totals();
        self.summary = summary;
        self.entries = entries;
    }

    /// Reset the book to the demo budget, discarding any unsynced edits.
    pub fn reset(&mut self) {
        *self = Self::sample();
    }

    /// Recompute the edited category's total from its entries, then rederive
    /// the summary. Other categories keep their existing totals.
    fn recompute(&mut self, category: Category) {
        self.totals
            .set(category, category_total(self.entries(category)));
        self.summary = BudgetSummary::from_totals(&self.totals);
    }
}

/// Spawn the background task that keeps `book` in step with the session
/// store.
///
/// On sign-in the user's budget is loaded from the store and replaces the
/// book's contents; if the load fails the error is logged and the book keeps
/// its prior state. On sign-out the book resets to the demo budget. The task
/// ends when the session store is dropped.
pub fn spawn_session_sync(
    book: Arc<Mutex<BudgetBook>>,
    sessions: &SessionStore,
    db_connection: Arc<Mutex<Connection>>,
) -> JoinHandle<()> {
    let mut session_rx = sessions.subscribe();

    tokio::spawn(async move {
        while session_rx.changed().await.is_ok() {
            let session = *session_rx.borrow_and_update();

            match session {
                Some(session) => {
                    let load_result = match db_connection.lock() {
                        Ok(connection) => load_user_budget(
                            session.user_id,
                            &CategoryTotals::default(),
                            &connection,
                        ),
                        Err(_) => {
                            tracing::error!(
                                "could not acquire the database lock to load the budget"
                            );
                            continue;
                        }
                    };

                    match (load_result, book.lock()) {
                        (Ok((summary, entries)), Ok(mut book)) => book.load(summary, entries),
                        (Err(error), _) => {
                            tracing::error!("could not load the budget after sign-in: {error}");
                        }
                        (_, Err(_)) => {
                            tracing::error!("could not acquire the budget book lock");
                        }
                    }
                }
                None => match book.lock() {
                    Ok(mut book) => book.reset(),
                    Err(_) => tracing::error!("could not acquire the budget book lock"),
                },
            }
        }
    })
}

/// Persist `entries` as the stored contents of `category` for `user_id`.
///
/// The write runs on a blocking thread so the request handler does not wait
/// on the database. Failures are logged and the in-memory book keeps the
/// edit; the store catches up on the next successful reconcile.
pub(super) fn spawn_reconcile(
    user_id: UserID,
    category: Category,
    entries: Vec<BudgetEntry>,
    db_connection: Arc<Mutex<Connection>>,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let mut connection = match db_connection.lock() {
            Ok(connection) => connection,
            Err(_) => {
                tracing::error!(
                    "could not acquire the database lock to persist {category} entries"
                );
                return;
            }
        };

        if let Err(error) = replace_category_entries(user_id, category, &entries, &mut connection)
        {
            tracing::error!("could not persist {category} entries: {error}");
        }
    })
}
