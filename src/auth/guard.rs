//! Ownership and identity checks that gate mutations.
//!
//! Each predicate takes the resolved actor (if any) and the target resource.
//! On success it hands back the authenticated actor so callers do not have to
//! unwrap the `Option` a second time.

use std::fmt;
use thiserror::Error;

use crate::db::models::{Comment, Post, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("not the owner")]
    NotOwner,
    #[error("self-like")]
    SelfLike,
}

/// The guarded operation, used to pick the user-facing denial message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    EditPost,
    DeletePost,
    EditComment,
    DeleteComment,
    LikePost,
}

impl Action {
    pub fn not_allowed_message(self) -> &'static str {
        match self {
            Action::EditPost => "You are not allowed to edit this post",
            Action::DeletePost => "You are not allowed to delete this post",
            Action::EditComment => "You are not allowed to edit this comment",
            Action::DeleteComment => "You are not allowed to delete this comment",
            Action::LikePost => "You are not allowed to like your own post",
        }
    }
}

/// A denial together with the action it blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denied {
    pub action: Action,
    pub denial: Denial,
}

impl Denied {
    pub fn message(&self) -> &'static str {
        match self.denial {
            Denial::SelfLike => Action::LikePost.not_allowed_message(),
            _ => self.action.not_allowed_message(),
        }
    }
}

impl fmt::Display for Denied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for Denied {}

pub fn can_edit_or_delete_post<'a>(actor: Option<&'a User>, post: &Post) -> Result<&'a User, Denial> {
    let actor = actor.ok_or(Denial::NotAuthenticated)?;
    if actor.id == post.creator_id {
        Ok(actor)
    } else {
        Err(Denial::NotOwner)
    }
}

pub fn can_edit_or_delete_comment<'a>(
    actor: Option<&'a User>,
    comment: &Comment,
) -> Result<&'a User, Denial> {
    let actor = actor.ok_or(Denial::NotAuthenticated)?;
    if actor.id == comment.author_id {
        Ok(actor)
    } else {
        Err(Denial::NotOwner)
    }
}

pub fn can_like<'a>(actor: Option<&'a User>, post: &Post) -> Result<&'a User, Denial> {
    let actor = actor.ok_or(Denial::NotAuthenticated)?;
    if actor.id == post.creator_id {
        Err(Denial::SelfLike)
    } else {
        Ok(actor)
    }
}
