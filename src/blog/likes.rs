use rusqlite::{params, Connection};
use serde::Serialize;

use crate::auth::guard::{self, Action};
use crate::blog::posts::fetch_post;
use crate::blog::{BlogError, BlogResult};
use crate::db;
use crate::db::models::{Like, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeState {
    Liked,
    NotLiked,
}

impl LikeState {
    /// Label for the toggle button: what pressing it would do.
    pub fn label(self) -> &'static str {
        match self {
            LikeState::Liked => "unlike",
            LikeState::NotLiked => "like",
        }
    }
}

pub fn like_state(conn: &Connection, post_id: i64, user_id: i64) -> BlogResult<LikeState> {
    Ok(match Like::find(conn, post_id, user_id)? {
        Some(_) => LikeState::Liked,
        None => LikeState::NotLiked,
    })
}

pub fn like_count(conn: &Connection, post_id: i64) -> BlogResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM likes WHERE post_id = ?1",
        params![post_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Flip `actor`'s like on a post and return the new state.
///
/// The lookup and the write share one IMMEDIATE transaction, so concurrent
/// toggles for the same pair serialize and at most one row ever exists.
pub fn toggle(conn: &Connection, actor: Option<&User>, post_id: i64) -> BlogResult<LikeState> {
    db::immediate(conn, |conn| {
        let post = fetch_post(conn, post_id)?;
        let actor = guard::can_like(actor, &post)
            .map_err(|denial| BlogError::denied(Action::LikePost, denial))?;

        let state = match Like::find(conn, post.id, actor.id)? {
            Some(like) => {
                conn.execute(
                    "DELETE FROM likes WHERE post_id = ?1 AND user_id = ?2",
                    params![like.post_id, like.user_id],
                )?;
                LikeState::NotLiked
            }
            None => {
                conn.execute(
                    "INSERT INTO likes (post_id, user_id) VALUES (?1, ?2)",
                    params![post.id, actor.id],
                )?;
                LikeState::Liked
            }
        };

        tracing::debug!("User {} {:?} post {}", actor.id, state, post.id);
        Ok(state)
    })
}
