//! Treatbot - Telegram "trick or treat" giveaway bot
//!
//! A user sends the trigger phrase in a private chat, the bot draws a prize
//! tier, hands out an unused redemption code of that tier and records the
//! user as a one-time winner.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors and logging
//! - `giveaway`: prize table, eligibility gate and the award flow
//! - `storage`: SQLite pool, migrations, code pool and winner ledger
//! - `telegram`: bot setup, dispatcher schema and admin commands

pub mod cli;
pub mod core;
pub mod giveaway;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{AppError, AppResult, Config};
pub use giveaway::{Giveaway, Outcome, PrizeTable, Tier};
pub use storage::{create_pool, get_connection, DbConnection, DbPool};
