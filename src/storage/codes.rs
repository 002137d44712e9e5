//! Redemption code pool.
//!
//! Each code belongs to one tier and is handed out at most once. Claiming is a
//! single conditional `UPDATE ... RETURNING` so two connections can never
//! receive the same code.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use strum::IntoEnumIterator;

use crate::core::error::AppResult;
use crate::giveaway::prize::Tier;

/// A code row from the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    pub code: String,
    pub tier: Tier,
    pub used: bool,
}

/// Result of trying to claim a code for a tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Withdrawal {
    Claimed(String),
    /// Every code of the tier has been handed out
    NotAvailable,
}

/// Pool counters for one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierStatus {
    pub tier: Tier,
    pub total: u64,
    pub available: u64,
    pub used: u64,
}

/// Claims the first unused code of `tier` and marks it used.
pub fn withdraw_code(conn: &Connection, tier: Tier) -> AppResult<Withdrawal> {
    let used_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let claimed: Option<String> = conn
        .query_row(
            "UPDATE codes SET is_used = 1, used_at = ?2
             WHERE id = (SELECT id FROM codes WHERE tier = ?1 AND is_used = 0 ORDER BY id LIMIT 1)
               AND is_used = 0
             RETURNING code",
            params![tier, used_at],
            |row| row.get(0),
        )
        .optional()?;

    Ok(match claimed {
        Some(code) => Withdrawal::Claimed(code),
        None => Withdrawal::NotAvailable,
    })
}

/// Returns a claimed code to the pool. Only a used code can be released.
pub fn release_code(conn: &Connection, code: &str) -> AppResult<bool> {
    let changed = conn.execute(
        "UPDATE codes SET is_used = 0, used_at = NULL WHERE code = ?1 AND is_used = 1",
        params![code],
    )?;
    Ok(changed == 1)
}

/// Total number of codes loaded, used or not.
pub fn count_codes(conn: &Connection) -> AppResult<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM codes", [], |row| row.get(0))?;
    Ok(count.max(0) as u64)
}

/// Looks up a single code.
pub fn get_code(conn: &Connection, code: &str) -> AppResult<Option<Code>> {
    let row = conn
        .query_row(
            "SELECT code, tier, is_used FROM codes WHERE code = ?1",
            params![code],
            |row| {
                Ok(Code {
                    code: row.get(0)?,
                    tier: row.get(1)?,
                    used: row.get::<_, i64>(2)? != 0,
                })
            },
        )
        .optional()?;
    Ok(row)
}

/// Per-tier counters, one entry for every tier (zeros when a tier has no codes).
pub fn pool_status(conn: &Connection) -> AppResult<Vec<TierStatus>> {
    let mut stmt = conn.prepare(
        "SELECT tier, COUNT(*), SUM(CASE WHEN is_used = 0 THEN 1 ELSE 0 END)
         FROM codes GROUP BY tier",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, Tier>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?))
    })?;

    let mut counted = Vec::new();
    for row in rows {
        counted.push(row?);
    }

    Ok(Tier::iter()
        .map(|tier| {
            let (total, available) = counted
                .iter()
                .find(|(t, _, _)| *t == tier)
                .map(|&(_, total, available)| (total.max(0) as u64, available.max(0) as u64))
                .unwrap_or((0, 0));
            TierStatus {
                tier,
                total,
                available,
                used: total - available,
            }
        })
        .collect())
}

/// Inserts a code, ignoring duplicates. Returns `true` if a row was added.
pub fn insert_code(conn: &Connection, code: &str, tier: Tier) -> AppResult<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO codes (code, tier, is_used) VALUES (?1, ?2, 0)",
        params![code, tier],
    )?;
    Ok(changed == 1)
}
