//! Loads the redemption code file (`Code,Prize` columns) into an empty pool.

use rusqlite::Connection;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::core::error::{AppError, AppResult};
use crate::giveaway::prize::Tier;
use crate::storage::codes::{count_codes, insert_code};

#[derive(Debug, Deserialize)]
struct CodeRecord {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Prize")]
    prize: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedReport {
    /// The pool already had codes; nothing was read
    Skipped { existing: u64 },
    Loaded {
        inserted: u64,
        duplicates: u64,
        per_tier: HashMap<Tier, u64>,
    },
}

/// Seeds the pool from a CSV file unless codes already exist.
pub fn seed_codes_from_csv(conn: &mut Connection, path: impl AsRef<Path>) -> AppResult<SeedReport> {
    let existing = count_codes(conn)?;
    if existing > 0 {
        log::info!("ℹ️ Codes already exist in database ({} codes)", existing);
        return Ok(SeedReport::Skipped { existing });
    }

    let path = path.as_ref();
    log::info!("🔄 Loading codes from {}...", path.display());
    let file = std::fs::File::open(path)?;
    seed_codes(conn, file)
}

/// Seeds the pool from any CSV reader unless codes already exist.
///
/// The whole file goes in one transaction: an unknown prize name aborts the
/// load and leaves the pool empty.
pub fn seed_codes<R: Read>(conn: &mut Connection, reader: R) -> AppResult<SeedReport> {
    let existing = count_codes(conn)?;
    if existing > 0 {
        return Ok(SeedReport::Skipped { existing });
    }

    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let tx = conn.transaction()?;
    let mut inserted = 0u64;
    let mut duplicates = 0u64;
    let mut per_tier: HashMap<Tier, u64> = HashMap::new();

    for (idx, record) in csv_reader.deserialize::<CodeRecord>().enumerate() {
        let record = record?;
        // Header is line 1
        let line = idx + 2;
        if record.code.is_empty() {
            return Err(AppError::Validation(format!("line {}: empty code", line)));
        }
        let tier: Tier = record
            .prize
            .parse()
            .map_err(|_| AppError::Validation(format!("line {}: unknown prize '{}'", line, record.prize)))?;

        if insert_code(&tx, &record.code, tier)? {
            inserted += 1;
            *per_tier.entry(tier).or_insert(0) += 1;
        } else {
            log::warn!("⚠️ Duplicate code '{}' on line {} skipped", record.code, line);
            duplicates += 1;
        }
    }
    tx.commit()?;

    log::info!(
        "✅ Loaded {} codes ({} Large, {} Medium, {} Small, {} duplicates skipped)",
        inserted,
        per_tier.get(&Tier::Large).copied().unwrap_or(0),
        per_tier.get(&Tier::Medium).copied().unwrap_or(0),
        per_tier.get(&Tier::Small).copied().unwrap_or(0),
        duplicates
    );

    Ok(SeedReport::Loaded {
        inserted,
        duplicates,
        per_tier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::codes::pool_status;
    use crate::storage::migrations::run_migrations;
    use pretty_assertions::assert_eq;

    const CODES: &str = "Code,Prize\nLRG-01,Large\nMED-01,Medium\nSML-01,Small\nSML-02, Small\n";

    fn make_conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        conn
    }

    #[test]
    fn loads_codes_per_tier() {
        let mut conn = make_conn();
        let report = seed_codes(&mut conn, CODES.as_bytes()).unwrap();

        match report {
            SeedReport::Loaded {
                inserted,
                duplicates,
                per_tier,
            } => {
                assert_eq!(inserted, 4);
                assert_eq!(duplicates, 0);
                assert_eq!(per_tier.get(&Tier::Small), Some(&2));
            }
            other => panic!("expected a load, got {:?}", other),
        }

        let available: Vec<u64> = pool_status(&conn).unwrap().iter().map(|s| s.available).collect();
        assert_eq!(available, vec![1, 1, 2]);
    }

    #[test]
    fn second_load_is_noop() {
        let mut conn = make_conn();
        seed_codes(&mut conn, CODES.as_bytes()).unwrap();

        let report = seed_codes(&mut conn, "Code,Prize\nLRG-99,Large\n".as_bytes()).unwrap();
        assert_eq!(report, SeedReport::Skipped { existing: 4 });
        assert_eq!(count_codes(&conn).unwrap(), 4);
    }

    #[test]
    fn duplicate_codes_in_file_are_skipped() {
        let mut conn = make_conn();
        let report = seed_codes(&mut conn, "Code,Prize\nA,Large\nA,Large\nB,Small\n".as_bytes()).unwrap();
        match report {
            SeedReport::Loaded {
                inserted, duplicates, ..
            } => {
                assert_eq!(inserted, 2);
                assert_eq!(duplicates, 1);
            }
            other => panic!("unexpected report {:?}", other),
        }
    }

    #[test]
    fn unknown_prize_aborts_whole_load() {
        let mut conn = make_conn();
        let err = seed_codes(&mut conn, "Code,Prize\nA,Large\nB,Huge\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3: unknown prize 'Huge'"), "{}", err);
        assert_eq!(count_codes(&conn).unwrap(), 0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut conn = make_conn();
        let err = seed_codes_from_csv(&mut conn, "/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
