//! The registration page for setting the password for accessing the app.
//!
//! The app serves a single household, so registration is only open until the
//! first password has been created. A successful registration signs the new
//! user in straight away.
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
    AppState, PasswordHash, ValidatedPassword,
    auth::set_auth_cookie,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, link,
        loading_spinner, log_in_register, password_input,
    },
    internal_server_error::get_internal_server_error_redirect,
    session::SessionStore,
    user::{count_users, create_user},
};

/// The minimum password length enforced client-side. The server runs strength
/// checking on top of this.
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

/// Which half of the registration form an error message belongs to.
enum FormError<'a> {
    None,
    Password(&'a str),
    Confirmation(&'a str),
}

fn registration_form(password: &str, error: FormError) -> Markup {
    let (password_error, confirmation_error) = match error {
        FormError::None => (None, None),
        FormError::Password(message) => (Some(message), None),
        FormError::Confirmation(message) => (None, Some(message)),
    };

    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (password_input(password, PASSWORD_INPUT_MIN_LENGTH, password_error))

            div
            {
                label for="confirm-password" class=(FORM_LABEL_STYLE) { "Confirm Password" }

                input
                    type="password"
                    name="confirm_password"
                    id="confirm-password"
                    placeholder="••••••••"
                    class=(FORM_TEXT_INPUT_STYLE)
                    minlength=(PASSWORD_INPUT_MIN_LENGTH)
                    autofocus[confirmation_error.is_some()]
                    required;

                @if let Some(message) = confirmation_error {
                    p class="text-red-500 text-base" { (message) }
                }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Create Password"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have a password? "
                (link(endpoints::LOG_IN_VIEW, "Sign in here"))
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let form = registration_form("", FormError::None);

    base("Register", &[], &log_in_register("Create Password", &form)).into_response()
}

/// The state needed for creating a new user.
#[derive(Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection holding the user table.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The process-wide session store.
    pub sessions: SessionStore,
}

impl FromRef<AppState> for RegistrationState {
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
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the registration form.
#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    /// The password to protect the app with.
    pub password: String,
    /// The same password, entered a second time.
    pub confirm_password: String,
}

/// Handler for registration requests via the POST method.
///
/// Refuses to create a second user. On success the new user is signed in and
/// the client is redirected to the budget page.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let user_count = {
        let connection = state
            .db_connection
            .lock()
            .expect("Could not acquire database lock");

        count_users(&connection).unwrap_or(0)
    };

    if user_count >= 1 {
        let message =
            "A password has already been created, please sign in with your existing password.";

        return registration_form(&user_data.password, FormError::Confirmation(message))
            .into_response();
    }

    let validated_password = match ValidatedPassword::new(&user_data.password) {
        Ok(password) => password,
        Err(error) => {
            let message = error.to_string();

            return registration_form(&user_data.password, FormError::Password(&message))
                .into_response();
        }
    };

    if user_data.password != user_data.confirm_password {
        return registration_form(
            &user_data.password,
            FormError::Confirmation("Passwords do not match"),
        )
        .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");

            return get_internal_server_error_redirect();
        }
    };

    let create_result = {
        let connection = state
            .db_connection
            .lock()
            .expect("Could not acquire database lock");

        create_user(password_hash, &connection)
    };

    let user = match create_result {
        Ok(user) => user,
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");

            return get_internal_server_error_redirect();
        }
    };

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => {
            state.sessions.sign_in(user.id);

            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::ROOT.to_owned()),
                jar,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");

            get_internal_server_error_redirect()
        }
    }
}
