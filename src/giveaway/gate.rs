//! Eligibility gate applied before a prize is drawn.
//!
//! The giveaway only knows the trait; the Telegram channel check lives in
//! `telegram::membership`.

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    /// The user must join one of these channels first
    Denied { channels: Vec<String> },
}

#[async_trait]
pub trait MembershipGate: Send + Sync {
    /// Decides whether `user_id` may receive a prize.
    ///
    /// Implementations must not fail: an unreachable collaborator counts as a
    /// denial for that collaborator.
    async fn check(&self, user_id: i64) -> GateDecision;
}

/// Gate that lets everybody through (no channels configured).
pub struct OpenGate;

#[async_trait]
impl MembershipGate for OpenGate {
    async fn check(&self, _user_id: i64) -> GateDecision {
        GateDecision::Allowed
    }
}
