use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::auth::guard::{self, Action};
use crate::blog::comments::{self, CommentView};
use crate::blog::likes;
use crate::blog::{BlogError, BlogResult, ValidationError};
use crate::db;
use crate::db::models::{Post, User};

pub const POST_MISSING_FIELDS: &str = "Please, enter both a subject and some content!";
pub const DELETE_POST_CONFIRMATION: &str = "Are you sure you want to delete this post?";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub subject: String,
    pub content: String,
}

impl PostForm {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.subject.is_empty() || self.content.is_empty() {
            return Err(ValidationError::new(POST_MISSING_FIELDS)
                .with("subject", &self.subject)
                .with("content", &self.content));
        }
        Ok(())
    }
}

/// Everything the post page shows.
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub post: Post,
    pub comments: Vec<CommentView>,
    pub like_count: i64,
    /// `"like"` / `"unlike"` for a logged-in viewer, absent otherwise.
    pub like_label: Option<&'static str>,
}

pub fn fetch_post(conn: &Connection, post_id: i64) -> BlogResult<Post> {
    Post::by_id(conn, post_id)?.ok_or(BlogError::PostNotFound(post_id))
}

pub fn list_posts(conn: &Connection) -> BlogResult<Vec<Post>> {
    Ok(Post::all_newest_first(conn)?)
}

pub fn post_page(conn: &Connection, viewer: Option<&User>, post_id: i64) -> BlogResult<PostPage> {
    let post = fetch_post(conn, post_id)?;
    let comments = comments::comments_for_post(conn, post.id)?;
    let like_count = likes::like_count(conn, post.id)?;
    let like_label = match viewer {
        Some(user) => Some(likes::like_state(conn, post.id, user.id)?.label()),
        None => None,
    };

    Ok(PostPage {
        post,
        comments,
        like_count,
        like_label,
    })
}

pub fn create_post(conn: &Connection, actor: Option<&User>, form: &PostForm) -> BlogResult<Post> {
    let actor = actor.ok_or(BlogError::NotAuthenticated)?;
    form.validate()?;

    conn.execute(
        "INSERT INTO posts (subject, content, creator_id) VALUES (?1, ?2, ?3)",
        params![form.subject, form.content, actor.id],
    )?;
    let post = fetch_post(conn, conn.last_insert_rowid())?;

    tracing::info!("User {} created post {}", actor.id, post.id);
    Ok(post)
}

/// The post to pre-fill the edit form with, if `actor` may edit it.
pub fn post_for_edit(conn: &Connection, actor: Option<&User>, post_id: i64) -> BlogResult<Post> {
    let post = fetch_post(conn, post_id)?;
    guard::can_edit_or_delete_post(actor, &post)
        .map_err(|denial| BlogError::denied(Action::EditPost, denial))?;
    Ok(post)
}

pub fn edit_post(
    conn: &Connection,
    actor: Option<&User>,
    post_id: i64,
    form: &PostForm,
) -> BlogResult<Post> {
    db::immediate(conn, |conn| {
        let post = fetch_post(conn, post_id)?;
        guard::can_edit_or_delete_post(actor, &post)
            .map_err(|denial| BlogError::denied(Action::EditPost, denial))?;
        form.validate()?;

        conn.execute(
            "UPDATE posts SET subject = ?1, content = ?2 WHERE id = ?3",
            params![form.subject, form.content, post.id],
        )?;

        Ok(Post {
            subject: form.subject.clone(),
            content: form.content.clone(),
            ..post
        })
    })
}

/// The post to show on the delete confirmation, if `actor` may delete it.
pub fn post_for_delete(conn: &Connection, actor: Option<&User>, post_id: i64) -> BlogResult<Post> {
    let post = fetch_post(conn, post_id)?;
    guard::can_edit_or_delete_post(actor, &post)
        .map_err(|denial| BlogError::denied(Action::DeletePost, denial))?;
    Ok(post)
}

/// Delete a post. Its comments and likes go with it.
pub fn delete_post(conn: &Connection, actor: Option<&User>, post_id: i64) -> BlogResult<()> {
    db::immediate(conn, |conn| {
        let post = fetch_post(conn, post_id)?;
        let actor = guard::can_edit_or_delete_post(actor, &post)
            .map_err(|denial| BlogError::denied(Action::DeletePost, denial))?;

        conn.execute("DELETE FROM posts WHERE id = ?1", params![post.id])?;
        tracing::info!("User {} deleted post {}", actor.id, post.id);
        Ok(())
    })
}
