//! Cookie-based authentication.
//!
//! A signed-in user carries a single private (encrypted and signed) cookie
//! holding a JSON [Token]. Handlers read the cookie to learn who, if anyone,
//! is making the request; the process-wide session store remains the source
//! of truth for whether a session is active.

mod cookie;
mod token;

pub use cookie::{DEFAULT_COOKIE_DURATION, get_token, invalidate_auth_cookie, set_auth_cookie};
pub use token::Token;

// The cookie name is an implementation detail; only tests need it to pick
// the auth cookie out of a response.
#[cfg(test)]
pub use cookie::COOKIE_TOKEN;
