//! Winner ledger. `UNIQUE(user_id)` on the table is what guarantees one
//! prize per user; [`has_won`] is only an early check.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

use crate::core::error::{AppError, AppResult};
use crate::giveaway::prize::Tier;

/// A winner row from the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Winner {
    pub user_id: i64,
    pub display_name: String,
    pub tier: Tier,
    pub code: String,
    /// `YYYY-MM-DD HH:MM:SS`, UTC
    pub awarded_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    /// Another award for this user was committed first
    AlreadyWon,
}

fn parse_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Winner> {
    Ok(Winner {
        user_id: row.get(0)?,
        display_name: row.get(1)?,
        tier: row.get(2)?,
        code: row.get(3)?,
        awarded_at: row.get(4)?,
    })
}

pub fn has_won(conn: &Connection, user_id: i64) -> AppResult<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM winners WHERE user_id = ?1", params![user_id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

/// Records an award. A second award for the same user yields `AlreadyWon`.
pub fn record_winner(
    conn: &Connection,
    user_id: i64,
    display_name: &str,
    tier: Tier,
    code: &str,
) -> AppResult<RecordOutcome> {
    let awarded_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let result = conn.execute(
        "INSERT INTO winners (user_id, display_name, prize_tier, code, awarded_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user_id, display_name, tier, code, awarded_at],
    );

    match result {
        Ok(_) => Ok(RecordOutcome::Recorded),
        Err(e) => {
            let err = AppError::from(e);
            if err.is_unique_violation() {
                Ok(RecordOutcome::AlreadyWon)
            } else {
                Err(err)
            }
        }
    }
}

pub fn get_winner(conn: &Connection, user_id: i64) -> AppResult<Option<Winner>> {
    let winner = conn
        .query_row(
            "SELECT user_id, display_name, prize_tier, code, awarded_at FROM winners WHERE user_id = ?1",
            params![user_id],
            parse_row,
        )
        .optional()?;
    Ok(winner)
}

/// All winners, most recent first.
pub fn list_winners(conn: &Connection) -> AppResult<Vec<Winner>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, display_name, prize_tier, code, awarded_at
         FROM winners
         ORDER BY awarded_at DESC, id DESC",
    )?;
    let rows = stmt.query_map([], parse_row)?;

    let mut winners = Vec::new();
    for row in rows {
        winners.push(row?);
    }
    Ok(winners)
}

/// Number of winners per tier.
pub fn tier_counts(winners: &[Winner]) -> HashMap<Tier, usize> {
    let mut counts = HashMap::new();
    for winner in winners {
        *counts.entry(winner.tier).or_insert(0) += 1;
    }
    counts
}
