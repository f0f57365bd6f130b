use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Json, Router};
use serde_json::json;

use crate::blog::likes;
use crate::blog::posts::{self, PostForm, DELETE_POST_CONFIRMATION};
use crate::error::AppResult;
use crate::extractors::{CurrentUser, Ids, MaybeUser};
use crate::routes::see_other;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(front_page))
        .route("/newpost", get(new_post_form).post(create_post))
        .route("/{id}", get(show_post).post(toggle_like))
        .route("/{id}/edit", get(edit_form).post(edit_post))
        .route("/{id}/delete", get(delete_confirmation).post(delete_post))
}

/// GET /
pub async fn front_page(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let posts = posts::list_posts(&conn)?;
    Ok(Json(json!({ "posts": posts, "logged_in": user.is_some() })).into_response())
}

/// GET /newpost
pub async fn new_post_form(CurrentUser(_user): CurrentUser) -> Response {
    Json(json!({ "subject": "", "content": "" })).into_response()
}

/// POST /newpost
pub async fn create_post(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let post = posts::create_post(&conn, user.as_ref(), &form)?;
    Ok(see_other(format!("/{}", post.id), None))
}

/// GET /{id}
pub async fn show_post(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Ids(id): Ids<i64>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let page = posts::post_page(&conn, user.as_ref(), id)?;
    Ok(Json(page).into_response())
}

/// POST /{id}: toggle the caller's like
pub async fn toggle_like(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Ids(id): Ids<i64>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    likes::toggle(&conn, user.as_ref(), id)?;
    Ok(see_other(format!("/{id}"), None))
}

/// GET /{id}/edit
pub async fn edit_form(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Ids(id): Ids<i64>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let post = posts::post_for_edit(&conn, user.as_ref(), id)?;
    Ok(Json(json!({ "subject": post.subject, "content": post.content })).into_response())
}

/// POST /{id}/edit
pub async fn edit_post(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Ids(id): Ids<i64>,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let post = posts::edit_post(&conn, user.as_ref(), id, &form)?;
    Ok(see_other(format!("/{}", post.id), None))
}

/// GET /{id}/delete
pub async fn delete_confirmation(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Ids(id): Ids<i64>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let post = posts::post_for_delete(&conn, user.as_ref(), id)?;
    Ok(Json(json!({ "post": post, "confirm": DELETE_POST_CONFIRMATION })).into_response())
}

/// POST /{id}/delete
pub async fn delete_post(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Ids(id): Ids<i64>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    posts::delete_post(&conn, user.as_ref(), id)?;
    Ok(see_other("/", None))
}
