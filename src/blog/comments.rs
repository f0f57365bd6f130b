use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::auth::guard::{self, Action};
use crate::blog::posts::fetch_post;
use crate::blog::{BlogError, BlogResult, ValidationError};
use crate::db;
use crate::db::models::{Comment, User};

pub const COMMENT_MISSING_CONTENT: &str = "Please, enter some content!";
pub const DELETE_COMMENT_CONFIRMATION: &str = "Are you sure you want to delete this comment?";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub content: String,
}

impl CommentForm {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.content.is_empty() {
            return Err(ValidationError::new(COMMENT_MISSING_CONTENT));
        }
        Ok(())
    }
}

/// A comment as shown under its post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_name: String,
}

pub fn comments_for_post(conn: &Connection, post_id: i64) -> BlogResult<Vec<CommentView>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.post_id, c.author_id, c.content, c.created_at, u.name
         FROM comments c
         JOIN users u ON u.id = c.author_id
         WHERE c.post_id = ?1
         ORDER BY c.created_at, c.id",
    )?;

    let comments = stmt
        .query_map(params![post_id], |row| {
            Ok(CommentView {
                comment: Comment {
                    id: row.get(0)?,
                    post_id: row.get(1)?,
                    author_id: row.get(2)?,
                    content: row.get(3)?,
                    created_at: row.get(4)?,
                },
                author_name: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(comments)
}

fn fetch_comment(conn: &Connection, post_id: i64, comment_id: i64) -> BlogResult<Comment> {
    Comment::by_id(conn, post_id, comment_id)?.ok_or(BlogError::CommentNotFound {
        post_id,
        comment_id,
    })
}

/// Comment on an existing post.
pub fn add_comment(
    conn: &Connection,
    actor: Option<&User>,
    post_id: i64,
    form: &CommentForm,
) -> BlogResult<Comment> {
    let actor = actor.ok_or(BlogError::NotAuthenticated)?;
    form.validate()?;

    db::immediate(conn, |conn| {
        let post = fetch_post(conn, post_id)?;
        conn.execute(
            "INSERT INTO comments (post_id, author_id, content) VALUES (?1, ?2, ?3)",
            params![post.id, actor.id, form.content],
        )?;
        let comment = fetch_comment(conn, post.id, conn.last_insert_rowid())?;

        tracing::info!("User {} commented on post {}", actor.id, post.id);
        Ok(comment)
    })
}

pub fn comment_for_edit(
    conn: &Connection,
    actor: Option<&User>,
    post_id: i64,
    comment_id: i64,
) -> BlogResult<Comment> {
    let comment = fetch_comment(conn, post_id, comment_id)?;
    guard::can_edit_or_delete_comment(actor, &comment)
        .map_err(|denial| BlogError::denied(Action::EditComment, denial))?;
    Ok(comment)
}

pub fn edit_comment(
    conn: &Connection,
    actor: Option<&User>,
    post_id: i64,
    comment_id: i64,
    form: &CommentForm,
) -> BlogResult<Comment> {
    db::immediate(conn, |conn| {
        let comment = fetch_comment(conn, post_id, comment_id)?;
        guard::can_edit_or_delete_comment(actor, &comment)
            .map_err(|denial| BlogError::denied(Action::EditComment, denial))?;
        form.validate()?;

        conn.execute(
            "UPDATE comments SET content = ?1 WHERE id = ?2",
            params![form.content, comment.id],
        )?;

        Ok(Comment {
            content: form.content.clone(),
            ..comment
        })
    })
}

pub fn comment_for_delete(
    conn: &Connection,
    actor: Option<&User>,
    post_id: i64,
    comment_id: i64,
) -> BlogResult<Comment> {
    let comment = fetch_comment(conn, post_id, comment_id)?;
    guard::can_edit_or_delete_comment(actor, &comment)
        .map_err(|denial| BlogError::denied(Action::DeleteComment, denial))?;
    Ok(comment)
}

pub fn delete_comment(
    conn: &Connection,
    actor: Option<&User>,
    post_id: i64,
    comment_id: i64,
) -> BlogResult<()> {
    db::immediate(conn, |conn| {
        let comment = fetch_comment(conn, post_id, comment_id)?;
        let actor = guard::can_edit_or_delete_comment(actor, &comment)
            .map_err(|denial| BlogError::denied(Action::DeleteComment, denial))?;

        conn.execute("DELETE FROM comments WHERE id = ?1", params![comment.id])?;
        tracing::info!("User {} deleted comment {}", actor.id, comment.id);
        Ok(())
    })
}
