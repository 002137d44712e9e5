//! Database access: connection pool, migrations, code pool and winner ledger

pub mod codes;
pub mod db;
pub mod migrations;
pub mod seed;
pub mod winners;

// Re-exports for convenience
pub use codes::{TierStatus, Withdrawal};
pub use db::{create_pool, get_connection, DbConnection, DbPool};
pub use seed::SeedReport;
pub use winners::{RecordOutcome, Winner};
