//! Handler types and dependencies

use std::sync::Arc;

use crate::core::config::Config;
use crate::giveaway::Giveaway;
use crate::storage::DbPool;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub db_pool: Arc<DbPool>,
    pub giveaway: Arc<Giveaway>,
    pub config: Arc<Config>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(db_pool: Arc<DbPool>, giveaway: Arc<Giveaway>, config: Arc<Config>) -> Self {
        Self {
            db_pool,
            giveaway,
            config,
        }
    }
}
