//! The sign-in page and the handler for sign-in requests.
//!
//! Sign-in takes only a password since the app serves a single household.
//! On success the auth cookie is set and the sign-in is published to the
//! session store, which triggers loading the stored budget.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{invalidate_auth_cookie, set_auth_cookie},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, base, link, loading_spinner, log_in_register, password_input},
    session::SessionStore,
    user::{User, get_sole_user},
};

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect password.";

/// How long the auth cookie should last if the user selects "remember me" at sign-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// Renders the sign-in form with an optional error message.
fn log_in_form(error_message: Option<&str>) -> Markup {
    html! {
        form
            id="log-in-form"
            class="space-y-4 md:space-y-6"
            hx-post=(endpoints::LOG_IN_API)
            hx-swap="outerHTML"
        {
            (password_input("", 0, error_message))

            div class="flex items-center"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    class="w-4 h-4 rounded me-2";

                label
                    for="remember_me"
                    class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "Stay signed in for 7 days"
                }
            }

            button
                type="submit"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="htmx-indicator" { (loading_spinner()) }
                "Sign in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "First time here? "
                (link(endpoints::REGISTER_VIEW, "Create the household password"))
            }
        }
    }
}

/// Display the sign-in page.
pub async fn get_log_in_page() -> Response {
    base(
        "Sign in",
        &[],
        &log_in_register("Sign in to your budget", &log_in_form(None)),
    )
    .into_response()
}

/// The state needed to perform a sign-in.
#[derive(Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection holding the user table.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The process-wide session store.
    pub sessions: SessionStore,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
            sessions: state.sessions.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the sign-in form.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Password entered during sign-in.
    pub password: String,
    /// Whether to extend the initial auth cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set
    /// (see the [MDN docs](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/input/checkbox#value_2)).
    /// The `Some` variant should be interpreted as `true` irregardless of the
    /// string value, and the `None` variant should be interpreted as `false`.
    pub remember_me: Option<String>,
}

/// Handler for sign-in requests via the POST method.
///
/// On a successful sign-in the auth cookie is set, the session store is
/// notified and the client is redirected to the budget page. Otherwise, the
/// form is returned with an error message explaining the problem.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let user: User = match get_sole_user(
        &state
            .db_connection
            .lock()
            .expect("Could acquire lock to database connection"),
    ) {
        Ok(user) => user,
        Err(Error::NotFound) => {
            return log_in_error_response(INVALID_CREDENTIALS_ERROR_MSG);
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_error_response("An internal error occurred. Please try again later.");
        }
    };

    let is_password_valid = match user.password_hash.verify(&user_data.password) {
        Ok(is_password_valid) => is_password_valid,
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_error_response("An internal error occurred. Please try again later.");
        }
    };

    if !is_password_valid {
        return log_in_error_response(INVALID_CREDENTIALS_ERROR_MSG);
    }

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    match set_auth_cookie(jar.clone(), user.id, cookie_duration) {
        Ok(updated_jar) => {
            state.sessions.sign_in(user.id);

            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::ROOT.to_owned()),
                updated_jar,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}

fn log_in_error_response(error_message: &str) -> Response {
    (StatusCode::OK, log_in_form(Some(error_message))).into_response()
}


#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::post};
    use axum_htmx::HX_REDIRECT;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        PasswordHash, ValidatedPassword,
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION},
        endpoints,
        session::SessionStore,
        user::{UserID, create_user, create_user_table},
    };

    use super::{
        INVALID_CREDENTIALS_ERROR_MSG, LogInState, REMEMBER_ME_COOKIE_DURATION, post_log_in,
    };

    /// Use the minimum cost during tests to keep them fast.
    const TEST_COST: u32 = 4;

    const TEST_PASSWORD: &str = "averygoodlongpassword1";

    fn get_test_state(with_user: bool) -> LogInState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");

        if with_user {
            let password_hash =
                PasswordHash::new(ValidatedPassword::new_unchecked(TEST_PASSWORD), TEST_COST)
                    .expect("Could not hash test password");
            create_user(password_hash, &connection).expect("Could not create test user");
        }

        LogInState {
            cookie_key: crate::app_state::create_cookie_key("foobar"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: Arc::new(Mutex::new(connection)),
            sessions: SessionStore::new(),
        }
    }

    fn new_test_server(state: LogInState) -> TestServer {
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let state = get_test_state(true);
        let sessions = state.sessions.clone();
        let server = new_test_server(state);

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[("password", TEST_PASSWORD)])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(
            response.header(HX_REDIRECT).to_str().unwrap(),
            endpoints::ROOT
        );

        let auth_cookie = response.cookie(COOKIE_TOKEN);
        assert!(auth_cookie.expires_datetime() > Some(OffsetDateTime::now_utc()));

        assert_eq!(
            sessions.current().map(|session| session.user_id),
            Some(UserID::new(1))
        );
    }

    #[tokio::test]
    async fn remember_me_extends_auth_cookie() {
        let server = new_test_server(get_test_state(true));

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[("password", TEST_PASSWORD), ("remember_me", "on")])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        let auth_cookie = response.cookie(COOKIE_TOKEN);
        let want_expiry = OffsetDateTime::now_utc() + REMEMBER_ME_COOKIE_DURATION;

        assert!(
            (auth_cookie.expires_datetime().unwrap() - want_expiry).abs() < Duration::seconds(2),
            "got cookie expiry {:?}, want {want_expiry:?}",
            auth_cookie.expires_datetime()
        );
    }

    #[tokio::test]
    async fn log_in_fails_with_incorrect_password() {
        let state = get_test_state(true);
        let sessions = state.sessions.clone();
        let server = new_test_server(state);

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[("password", "wrongpassword")])
            .await;

        response.assert_status_ok();
        assert!(response.text().contains(INVALID_CREDENTIALS_ERROR_MSG));
        assert_eq!(sessions.current(), None);
    }

    #[tokio::test]
    async fn log_in_fails_before_registration() {
        let server = new_test_server(get_test_state(false));

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[("password", TEST_PASSWORD)])
            .await;

        response.assert_status_ok();
        assert!(response.text().contains(INVALID_CREDENTIALS_ERROR_MSG));
    }

    #[tokio::test]
    async fn log_in_fails_with_missing_credentials() {
        let server = new_test_server(get_test_state(true));

        server
            .post(endpoints::LOG_IN_API)
            .content_type("application/x-www-form-urlencoded")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
