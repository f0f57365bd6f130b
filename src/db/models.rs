use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing)]
    pub pwd_hash: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: i64,
    pub subject: String,
    pub content: String,
    pub creator_id: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Like {
    pub post_id: i64,
    pub user_id: i64,
}

impl User {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            pwd_hash: row.get(2)?,
            email: row.get(3)?,
        })
    }

    pub fn by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Self>> {
        conn.query_row(
            "SELECT id, name, pwd_hash, email FROM users WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .optional()
    }

    pub fn by_name(conn: &Connection, name: &str) -> rusqlite::Result<Option<Self>> {
        conn.query_row(
            "SELECT id, name, pwd_hash, email FROM users WHERE name = ?1",
            params![name],
            Self::from_row,
        )
        .optional()
    }
}

impl Post {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            subject: row.get(1)?,
            content: row.get(2)?,
            creator_id: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    pub fn by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Self>> {
        conn.query_row(
            "SELECT id, subject, content, creator_id, created_at FROM posts WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .optional()
    }

    /// All posts, newest first.
    pub fn all_newest_first(conn: &Connection) -> rusqlite::Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, subject, content, creator_id, created_at FROM posts
             ORDER BY created_at DESC, id DESC",
        )?;
        let posts = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }
}

impl Comment {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            post_id: row.get(1)?,
            author_id: row.get(2)?,
            content: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    /// Look up a comment under a specific post. A comment id paired with the
    /// wrong post id is not found.
    pub fn by_id(conn: &Connection, post_id: i64, id: i64) -> rusqlite::Result<Option<Self>> {
        conn.query_row(
            "SELECT id, post_id, author_id, content, created_at FROM comments
             WHERE id = ?1 AND post_id = ?2",
            params![id, post_id],
            Self::from_row,
        )
        .optional()
    }
}

impl Like {
    pub fn find(conn: &Connection, post_id: i64, user_id: i64) -> rusqlite::Result<Option<Self>> {
        conn.query_row(
            "SELECT post_id, user_id FROM likes WHERE post_id = ?1 AND user_id = ?2",
            params![post_id, user_id],
            |row| {
                Ok(Self {
                    post_id: row.get(0)?,
                    user_id: row.get(1)?,
                })
            },
        )
        .optional()
    }
}
