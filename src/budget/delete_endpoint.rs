//! The endpoint for deleting a budget entry.

use std::str::FromStr;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::session::active_user;

use super::{
    Category,
    book::spawn_reconcile,
    budget_page::{BudgetState, budget_content, today_in},
};

/// Delete the entry with `entry_id` from `category` and respond with the
/// updated budget content, with the edited category as the active tab.
///
/// Deleting an entry that does not exist responds with an alert telling the
/// user to refresh. When a user is signed in, the edited category is
/// persisted in the background.
///
/// # Panics
///
/// Panics if the lock for the budget book is already held by the same thread.
pub async fn delete_entry(
    State(state): State<BudgetState>,
    jar: PrivateCookieJar,
    Path((category, entry_id)): Path<(String, i64)>,
) -> Response {
    let category = match Category::from_str(&category) {
        Ok(category) => category,
        Err(error) => return error.into_alert_response(),
    };

    let content = {
        let mut book = state.budget_book.lock().unwrap();

        if let Err(error) = book.remove_entry(category, entry_id) {
            return error.into_alert_response();
        }

        if let Some(user_id) = active_user(&jar, &state.sessions) {
            spawn_reconcile(
                user_id,
                category,
                book.entries(category).to_vec(),
                state.db_connection.clone(),
            );
        }

        budget_content(&book, category, today_in(&state.local_timezone))
    };

    content.into_response()
}
