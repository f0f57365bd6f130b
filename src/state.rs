use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::auth::AuthSession;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub session: AuthSession,
}
