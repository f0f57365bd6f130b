use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Json, Router};
use serde_json::json;

use crate::blog::comments::{self, CommentForm, DELETE_COMMENT_CONFIRMATION};
use crate::blog::posts::fetch_post;
use crate::error::AppResult;
use crate::extractors::{CurrentUser, Ids, MaybeUser};
use crate::routes::see_other;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/comment", get(new_comment_form).post(add_comment))
        .route(
            "/{id}/comment/{cid}/edit",
            get(edit_form).post(edit_comment),
        )
        .route(
            "/{id}/comment/{cid}/delete",
            get(delete_confirmation).post(delete_comment),
        )
}

/// GET /{id}/comment
pub async fn new_comment_form(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Ids(id): Ids<i64>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let post = fetch_post(&conn, id)?;
    Ok(Json(json!({ "post": post, "content": "" })).into_response())
}

/// POST /{id}/comment
pub async fn add_comment(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Ids(id): Ids<i64>,
    Form(form): Form<CommentForm>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let comment = comments::add_comment(&conn, user.as_ref(), id, &form)?;
    Ok(see_other(format!("/{}", comment.post_id), None))
}

/// GET /{id}/comment/{cid}/edit
pub async fn edit_form(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Ids((id, cid)): Ids<(i64, i64)>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let comment = comments::comment_for_edit(&conn, user.as_ref(), id, cid)?;
    Ok(Json(json!({ "content": comment.content })).into_response())
}

/// POST /{id}/comment/{cid}/edit
pub async fn edit_comment(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Ids((id, cid)): Ids<(i64, i64)>,
    Form(form): Form<CommentForm>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    comments::edit_comment(&conn, user.as_ref(), id, cid, &form)?;
    Ok(see_other(format!("/{id}"), None))
}

/// GET /{id}/comment/{cid}/delete
pub async fn delete_confirmation(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Ids((id, cid)): Ids<(i64, i64)>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let comment = comments::comment_for_delete(&conn, user.as_ref(), id, cid)?;
    Ok(Json(json!({ "comment": comment, "confirm": DELETE_COMMENT_CONFIRMATION })).into_response())
}

/// POST /{id}/comment/{cid}/delete
pub async fn delete_comment(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Ids((id, cid)): Ids<(i64, i64)>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    comments::delete_comment(&conn, user.as_ref(), id, cid)?;
    Ok(see_other(format!("/{id}"), None))
}
