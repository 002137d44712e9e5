//! Giveaway domain: prize table, eligibility gate and the award flow

pub mod flow;
pub mod gate;
pub mod prize;

pub use flow::{ChatContext, Giveaway, Outcome, Sampler, TriggerEvent};
pub use gate::{GateDecision, MembershipGate, OpenGate};
pub use prize::{Prize, PrizeTable, Tier};
