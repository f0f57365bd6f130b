pub mod auth;
pub mod comments;
pub mod posts;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(posts::router())
        .merge(comments::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `303 See Other` to `location`, optionally replacing the session cookie.
fn see_other(location: impl Into<String>, set_cookie: Option<String>) -> Response {
    let location = location.into();
    match set_cookie {
        Some(cookie) => (
            StatusCode::SEE_OTHER,
            [(header::LOCATION, location), (header::SET_COOKIE, cookie)],
            "",
        )
            .into_response(),
        None => (StatusCode::SEE_OTHER, [(header::LOCATION, location)], "").into_response(),
    }
}
