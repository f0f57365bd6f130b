pub mod accounts;
pub mod comments;
pub mod likes;
pub mod posts;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::auth::guard::{Action, Denial, Denied};

pub type BlogResult<T> = Result<T, BlogError>;

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("Validation failed: {0}")]
    Validation(ValidationError),

    #[error("Login required")]
    NotAuthenticated,

    #[error("Denied: {0}")]
    Denied(Denied),

    #[error("Post {0} was not found")]
    PostNotFound(i64),

    #[error("Comment {comment_id} on post {post_id} was not found")]
    CommentNotFound { post_id: i64, comment_id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl BlogError {
    /// Map a guard denial for `action`. An anonymous actor is a login
    /// redirect, not a denial message.
    pub fn denied(action: Action, denial: Denial) -> Self {
        match denial {
            Denial::NotAuthenticated => BlogError::NotAuthenticated,
            denial => BlogError::Denied(Denied { action, denial }),
        }
    }
}

/// A rejected form: the message to show and the non-secret values the user
/// entered, so the form can be shown again pre-filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub message: &'static str,
    pub values: BTreeMap<&'static str, String>,
}

impl ValidationError {
    pub fn new(message: &'static str) -> Self {
        Self {
            message,
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(field, value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for BlogError {
    fn from(err: ValidationError) -> Self {
        BlogError::Validation(err)
    }
}
