use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use crate::core::config;
use crate::core::error::AppResult;
use crate::storage::migrations::run_migrations;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Every connection waits on a busy database instead of failing immediately
/// and uses WAL so readers don't block the single writer. The schema is
/// migrated before the pool is returned.
///
/// # Example
///
/// ```no_run
/// use treatbot::storage::create_pool;
///
/// let pool = create_pool("winners.db")?;
/// # Ok::<(), treatbot::core::AppError>(())
/// ```
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
        conn.busy_timeout(config::database::busy_timeout())?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_row| Ok(()))
    });
    let pool = Pool::builder().max_size(config::database::POOL_SIZE).build(manager)?;

    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection returns to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> AppResult<DbConnection> {
    Ok(pool.get()?)
}
