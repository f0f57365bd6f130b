use axum::extract::{FromRequestParts, Path};
use axum::http::header;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::blog::BlogError;
use crate::db::models::User;
use crate::error::AppError;
use crate::state::AppState;

/// The logged-in user, if the request carries a valid session cookie.
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(cookie_header) = cookie_header(parts) else {
            return Ok(MaybeUser(None));
        };

        let conn = state.db.get()?;
        Ok(MaybeUser(
            state.session.resolve_user(&conn, Some(&cookie_header)),
        ))
    }
}

/// Requires a logged-in user. Anonymous requests are redirected to the
/// login page.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await? {
            MaybeUser(Some(user)) => Ok(CurrentUser(user)),
            MaybeUser(None) => Err(BlogError::NotAuthenticated.into()),
        }
    }
}

/// Numeric ids from the URL. A segment that is not a valid id names no
/// resource, so it is a 404 rather than a 400.
#[derive(Debug)]
pub struct Ids<T>(pub T);

impl<T> FromRequestParts<AppState> for Ids<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(ids)) => Ok(Ids(ids)),
            Err(rejection) => {
                tracing::debug!("Unroutable id: {}", rejection);
                Err(AppError::NotFound)
            }
        }
    }
}

/// All `Cookie` headers folded into one, as HTTP/2 clients may split them.
fn cookie_header(parts: &Parts) -> Option<String> {
    let values: Vec<&str> = parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join("; "))
    }
}
