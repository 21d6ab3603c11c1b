//! The budget page: summary cards, the category grid and the distribution
//! chart.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use time::{Date, OffsetDateTime};

use crate::{
    AppState,
    endpoints,
    html::{HeadElement, PAGE_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    session::{SessionStore, active_user},
    timezone::get_local_offset,
};

use super::{
    Category,
    book::BudgetBook,
    chart::{chart_inline_script, chart_view, distribution_chart},
    grid::grid_view,
    summary_cards::summary_cards_view,
};

const ECHARTS_CDN: &str = "https://cdn.jsdelivr.net/npm/echarts@5.6.0/dist/echarts.min.js";

/// The state needed to render the budget page and its htmx partials.
#[derive(Clone)]
pub struct BudgetState {
    /// The budget being shown and edited.
    pub budget_book: Arc<Mutex<BudgetBook>>,
    /// The database connection for persisting a signed-in user's edits.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The process-wide session store.
    pub sessions: SessionStore,
    /// The key for decrypting private cookies.
    pub cookie_key: Key,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            budget_book: state.budget_book.clone(),
            db_connection: state.db_connection.clone(),
            sessions: state.sessions.clone(),
            cookie_key: state.cookie_key.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl FromRef<BudgetState> for Key {
    fn from_ref(state: &BudgetState) -> Self {
        state.cookie_key.clone()
    }
}

/// Today's date in the local timezone, for the add-entry form's date field.
pub(super) fn today_in(local_timezone: &str) -> Date {
    let now = OffsetDateTime::now_utc();

    match get_local_offset(local_timezone) {
        Some(offset) => now.to_offset(offset).date(),
        None => now.date(),
    }
}

/// The swappable core of the budget page.
///
/// Both the full page and the entry endpoints render this so that adding or
/// deleting an entry refreshes the cards, grid and chart in one swap. The
/// inline script re-initializes the chart after each swap.
pub(super) fn budget_content(book: &BudgetBook, active_tab: Category, today: Date) -> Markup {
    let chart = distribution_chart(book.summary());

    html! {
        div id="budget-content" class="w-full max-w-screen-xl"
        {
            (summary_cards_view(book.summary()))
            (grid_view(book, active_tab, today))
            (chart_view(&chart))
            (chart_inline_script(&chart))
        }
    }
}

/// Route handler for the budget page.
///
/// Anonymous visitors get the demo budget; once signed in, the page shows the
/// stored budget that the session sync task has loaded.
///
/// # Panics
///
/// Panics if the lock for the budget book is already held by the same thread.
pub async fn get_budget_page(State(state): State<BudgetState>, jar: PrivateCookieJar) -> Response {
    let signed_in = active_user(&jar, &state.sessions).is_some();
    let today = today_in(&state.local_timezone);

    let content = {
        let book = state.budget_book.lock().unwrap();

        html! {
            (NavBar::new(endpoints::ROOT, signed_in).into_html())

            main class=(PAGE_CONTAINER_STYLE)
            {
                (budget_content(&book, Category::Income, today))
            }
        }
    };

    base(
        "Budget",
        &[
            HeadElement::ScriptLink(ECHARTS_CDN.to_owned()),
            dollar_input_styles(),
        ],
        &content,
    )
    .into_response()
}

#[cfg(test)]
mod budget_page_tests {
    use axum::{Router, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use scraper::{Html, Selector};

    use crate::{AppState, endpoints};

    use super::get_budget_page;

    fn new_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "42",
            "Pacific/Auckland",
        )
        .unwrap();

        let app = Router::new()
            .route(endpoints::ROOT, get(get_budget_page))
            .with_state(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn returns_demo_budget_for_anonymous_visitor() {
        let server = new_test_server();

        let response = server.get(endpoints::ROOT).await;

        response.assert_status_ok();
        let document = Html::parse_document(&response.text());

        let tab_selector = Selector::parse("[role=tab]").unwrap();
        assert_eq!(document.select(&tab_selector).count(), 5);

        let chart_selector = Selector::parse("#budget-distribution-chart").unwrap();
        assert_eq!(document.select(&chart_selector).count(), 1);

        let text = document.root_element().text().collect::<String>();
        assert!(text.contains("Salary"));
        assert!(text.contains("Net Cash Flow"));
    }

    #[tokio::test]
    async fn shows_sign_in_link_for_anonymous_visitor() {
        let server = new_test_server();

        let response = server.get(endpoints::ROOT).await;

        response.assert_status_ok();
        assert!(response.text().contains("Sign in"));
    }
}
