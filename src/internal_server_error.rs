//! The page to display for an internal server error.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{endpoints, html::error_view};

/// The route handler for the internal server error page.
pub async fn get_internal_server_error_page() -> Response {
    get_internal_server_error_response(
        "Sorry, something went wrong.",
        "Try again later or check the server logs",
    )
}

/// Redirect an htmx request to the internal server error page.
pub fn get_internal_server_error_redirect() -> Response {
    // `HxRedirect` only sets response parts, so the tuple needs a body.
    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
        (),
    )
        .into_response()
}

/// Build a 500 page with a custom `description` and suggested `fix`.
pub fn get_internal_server_error_response(description: &str, fix: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(error_view("Internal Server Error", "500", description, fix).into_string()),
    )
        .into_response()
}
