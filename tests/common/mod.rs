//! Common test utilities
//!
//! Shared by the integration tests: a file-backed database in a temp dir and
//! a giveaway wired to it with a fixed draw.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use tempfile::TempDir;

use treatbot::giveaway::{
    ChatContext, GateDecision, Giveaway, MembershipGate, OpenGate, PrizeTable, TriggerEvent,
};
use treatbot::storage::seed::seed_codes;
use treatbot::storage::{create_pool, get_connection, DbPool};

pub const CODES_CSV: &str = "Code,Prize\n\
    LRG-01,Large\n\
    MED-01,Medium\n\
    MED-02,Medium\n\
    SML-01,Small\n";

/// Draw values that land in each tier of the default table
pub const DRAW_LARGE: f64 = 0.1;
pub const DRAW_MEDIUM: f64 = 0.4;
pub const DRAW_SMALL: f64 = 0.9;

/// A migrated database in its own temp dir
pub struct TestEnvironment {
    // Keeps the directory alive for the pool
    _dir: TempDir,
    pub db_pool: Arc<DbPool>,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let path = dir.path().join("winners.db");
        let pool = create_pool(path.to_str().expect("tempdir path is not UTF-8")).expect("failed to create pool");
        Self {
            _dir: dir,
            db_pool: Arc::new(pool),
        }
    }

    /// Environment with [`CODES_CSV`] loaded
    pub fn seeded() -> Self {
        Self::with_codes(CODES_CSV)
    }

    pub fn with_codes(csv: &str) -> Self {
        let env = Self::new();
        let mut conn = get_connection(&env.db_pool).expect("failed to get connection");
        seed_codes(&mut conn, csv.as_bytes()).expect("failed to seed codes");
        drop(conn);
        env
    }

    pub fn giveaway(&self, draw: f64) -> Giveaway {
        self.giveaway_with_gate(draw, Arc::new(OpenGate))
    }

    pub fn giveaway_with_gate(&self, draw: f64, gate: Arc<dyn MembershipGate>) -> Giveaway {
        Giveaway::new(
            Arc::clone(&self.db_pool),
            PrizeTable::halloween(),
            gate,
            "trick or treat",
        )
        .with_sampler(Arc::new(move || draw))
    }
}

pub fn private_event(user_id: i64, text: &str) -> TriggerEvent {
    TriggerEvent {
        user_id,
        display_name: format!("user{}", user_id),
        text: text.to_string(),
        context: ChatContext::Private,
    }
}

pub fn group_event(user_id: i64, text: &str) -> TriggerEvent {
    TriggerEvent {
        context: ChatContext::Group,
        ..private_event(user_id, text)
    }
}

/// Gate that rejects everybody with a fixed channel list
pub struct ClosedGate(pub Vec<String>);

#[async_trait]
impl MembershipGate for ClosedGate {
    async fn check(&self, _user_id: i64) -> GateDecision {
        GateDecision::Denied {
            channels: self.0.clone(),
        }
    }
}
