use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Json, Router};

use crate::blog::accounts::{self, LoginForm, SignupForm};
use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::routes::see_other;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", get(signup_form).post(signup))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
        .route("/welcome", get(welcome))
}

/// GET /signup
pub async fn signup_form() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "username": "", "email": "" }))
}

/// POST /signup
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let user = accounts::signup(&conn, &form)?;
    Ok(see_other("/welcome", Some(state.session.login(&user))))
}

/// GET /login
pub async fn login_form() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "username": "" }))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let user = accounts::login(&conn, &form)?;
    Ok(see_other("/welcome", Some(state.session.login(&user))))
}

/// GET /logout
pub async fn logout(State(state): State<AppState>) -> Response {
    see_other("/signup", Some(state.session.logout()))
}

/// GET /welcome
pub async fn welcome(MaybeUser(user): MaybeUser) -> Response {
    match user {
        Some(user) => Json(serde_json::json!({ "username": user.name })).into_response(),
        None => see_other("/signup", None),
    }
}
