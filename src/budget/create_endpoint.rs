//! The endpoint for adding a budget entry to a category.

use std::str::FromStr;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar};
use serde::Deserialize;
use time::{Date, macros::format_description};

use crate::{Error, session::active_user};

use super::{
    Category,
    book::spawn_reconcile,
    budget_page::{BudgetState, budget_content, today_in},
};

/// The form data for creating a budget entry.
#[derive(Debug, Deserialize)]
pub struct NewEntryForm {
    /// The category the entry belongs to, in lowercase.
    pub category: String,
    /// The date of the entry as "YYYY-MM-DD".
    pub date: String,
    /// What the entry is for.
    pub description: String,
    /// The dollar amount of the entry.
    pub amount: f64,
}

/// Add an entry to the budget book and respond with the updated budget
/// content, with the edited category as the active tab.
///
/// The edit is applied in memory first. When a user is signed in, the edited
/// category is persisted in the background; the response does not wait for
/// the write.
///
/// # Panics
///
/// Panics if the lock for the budget book is already held by the same thread.
pub async fn create_entry(
    State(state): State<BudgetState>,
    jar: PrivateCookieJar,
    Form(form): Form<NewEntryForm>,
) -> Response {
    let category = match Category::from_str(&form.category) {
        Ok(category) => category,
        Err(error) => return error.into_alert_response(),
    };

    let date = match Date::parse(&form.date, format_description!("[year]-[month]-[day]")) {
        Ok(date) => date,
        Err(_) => return Error::InvalidDate(form.date).into_alert_response(),
    };

    let content = {
        let mut book = state.budget_book.lock().unwrap();
        book.add_entry(category, date, &form.description, form.amount);

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

#[cfg(test)]
mod create_entry_tests {
    use axum::{Router, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use scraper::{Html, Selector};

    use crate::{AppState, endpoints};

    use super::create_entry;

    fn new_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "42",
            "Pacific/Auckland",
        )
        .unwrap();

        let app = Router::new()
            .route(endpoints::ENTRIES_API, post(create_entry))
            .with_state(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn returns_updated_content_with_edited_category_active() {
        let server = new_test_server();

        let response = server
            .post(endpoints::ENTRIES_API)
            .form(&[
                ("category", "expenses"),
                ("date", "2024-03-02"),
                ("description", "Petrol"),
                ("amount", "50"),
            ])
            .await;

        response.assert_status_ok();
        let document = Html::parse_fragment(&response.text());

        let text = document.root_element().text().collect::<String>();
        assert!(text.contains("Petrol"));
        // Expenses recomputed from its entries: 200 (demo) + 50.
        assert!(text.contains("$250"));

        let panel_selector = Selector::parse("[role=tabpanel][data-panel=expenses]").unwrap();
        let panel = document.select(&panel_selector).next().unwrap();
        assert!(panel.value().classes().all(|class| class != "hidden"));
    }

    #[tokio::test]
    async fn rejects_unknown_category() {
        let server = new_test_server();

        let response = server
            .post(endpoints::ENTRIES_API)
            .form(&[
                ("category", "holidays"),
                ("date", "2024-03-02"),
                ("description", "Flights"),
                ("amount", "800"),
            ])
            .await;

        response.assert_status_bad_request();
        assert!(response.text().contains("Invalid category"));
    }

    #[tokio::test]
    async fn rejects_malformed_date() {
        let server = new_test_server();

        let response = server
            .post(endpoints::ENTRIES_API)
            .form(&[
                ("category", "bills"),
                ("date", "02/03/2024"),
                ("description", "Internet"),
                ("amount", "80"),
            ])
            .await;

        response.assert_status_bad_request();
        assert!(response.text().contains("Invalid date"));
    }
}
