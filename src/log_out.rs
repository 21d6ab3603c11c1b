//! Sign-out route handler that ends the session, invalidates the auth cookie
//! and redirects back to the budget page.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{AppState, auth::invalidate_auth_cookie, endpoints, session::SessionStore};

/// The state needed to perform a sign-out.
#[derive(Clone)]
pub struct LogOutState {
    /// The key for decrypting private cookies.
    pub cookie_key: Key,
    /// The process-wide session store.
    pub sessions: SessionStore,
}

impl FromRef<AppState> for LogOutState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            sessions: state.sessions.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogOutState> for Key {
    fn from_ref(state: &LogOutState) -> Self {
        state.cookie_key.clone()
    }
}

/// End the session, invalidate the auth cookie and redirect to the budget
/// page, which shows the demo budget again. Edits made while signed out are
/// not persisted.
pub async fn get_log_out(State(state): State<LogOutState>, jar: PrivateCookieJar) -> Response {
    state.sessions.sign_out();

    let jar = invalidate_auth_cookie(jar);

    (jar, Redirect::to(endpoints::ROOT)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::{
        body::Body,
        extract::State,
        http::{Response, StatusCode, header::SET_COOKIE},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, set_auth_cookie},
        endpoints,
        session::SessionStore,
        user::UserID,
    };

    use super::{LogOutState, get_log_out};

    #[tokio::test]
    async fn log_out_ends_session_and_invalidates_cookie() {
        let key = Key::from(&Sha512::digest("42"));
        let cookie_jar = set_auth_cookie(
            PrivateCookieJar::new(key.clone()),
            UserID::new(1),
            DEFAULT_COOKIE_DURATION,
        )
        .unwrap();
        let state = LogOutState {
            cookie_key: key,
            sessions: SessionStore::new(),
        };
        state.sessions.sign_in(UserID::new(1));
        let sessions = state.sessions.clone();

        let response = get_log_out(State(state), cookie_jar).await;

        assert_eq!(sessions.current(), None);
        assert_redirect(&response, endpoints::ROOT);
        assert_cookie_expired(&response);
    }

    fn assert_redirect(response: &Response<Body>, want_location: &str) {
        let redirect_location = response.headers().get("location").unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(redirect_location, want_location);
    }

    fn assert_cookie_expired(response: &Response<Body>) {
        for cookie_header in response.headers().get_all(SET_COOKIE) {
            let cookie_string = cookie_header.to_str().unwrap();
            let cookie = Cookie::parse(cookie_string).unwrap();

            if cookie.name() != COOKIE_TOKEN {
                continue;
            }

            assert_eq!(
                cookie.expires_datetime(),
                Some(OffsetDateTime::UNIX_EPOCH),
                "got expires {:?}, want {:?}",
                cookie.expires_datetime(),
                Some(OffsetDateTime::UNIX_EPOCH),
            );

            assert_eq!(
                cookie.max_age(),
                Some(Duration::ZERO),
                "got max age {:?}, want {:?}",
                cookie.max_age(),
                Some(Duration::ZERO),
            );
        }
    }
}
