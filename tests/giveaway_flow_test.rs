//! End-to-end tests for the trick-or-treat flow against a file database
//!
//! Run with: cargo test --test giveaway_flow_test

mod common;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::Arc;

use common::{
    group_event, private_event, ClosedGate, TestEnvironment, DRAW_LARGE, DRAW_MEDIUM, DRAW_SMALL,
};
use treatbot::giveaway::{GateDecision, MembershipGate, Outcome, Tier};
use treatbot::storage::codes::{get_code, pool_status};
use treatbot::storage::winners::{get_winner, list_winners, record_winner};
use treatbot::storage::{get_connection, DbPool};

fn available(pool: &DbPool, tier: Tier) -> u64 {
    let conn = get_connection(pool).unwrap();
    pool_status(&conn)
        .unwrap()
        .into_iter()
        .find(|status| status.tier == tier)
        .map(|status| status.available)
        .unwrap()
}

fn winner_count(pool: &DbPool) -> usize {
    let conn = get_connection(pool).unwrap();
    list_winners(&conn).unwrap().len()
}

#[tokio::test]
async fn test_non_trigger_text_is_ignored() {
    let env = TestEnvironment::seeded();
    let giveaway = env.giveaway(DRAW_SMALL);

    let outcome = giveaway.handle(&private_event(1, "hello there")).await.unwrap();
    assert_eq!(outcome, Outcome::Ignored);
    assert_eq!(outcome.reply_text(giveaway.trigger_phrase()), None);
    assert_eq!(winner_count(&env.db_pool), 0);
}

#[tokio::test]
async fn test_group_trigger_redirects_without_writing() {
    let env = TestEnvironment::seeded();
    let giveaway = env.giveaway(DRAW_SMALL);

    let outcome = giveaway.handle(&group_event(7, "Trick or Treat!")).await.unwrap();
    assert_eq!(outcome, Outcome::RedirectToPrivate { already_won: false });
    assert_eq!(winner_count(&env.db_pool), 0);
    assert_eq!(available(&env.db_pool, Tier::Small), 1);
}

#[tokio::test]
async fn test_private_trigger_wins_once() {
    let env = TestEnvironment::seeded();
    let giveaway = env.giveaway(DRAW_SMALL);

    let outcome = giveaway.handle(&private_event(7, "TRICK OR TREAT")).await.unwrap();
    let (tier, code, message) = match outcome {
        Outcome::Won { tier, code, message } => (tier, code, message),
        other => panic!("expected a win, got {:?}", other),
    };
    assert_eq!(tier, Tier::Small);
    assert_eq!(code, "SML-01");
    assert!(message.contains("SML-01"));

    {
        let conn = get_connection(&env.db_pool).unwrap();
        let winner = get_winner(&conn, 7).unwrap().unwrap();
        assert_eq!(winner.tier, Tier::Small);
        assert_eq!(winner.code, "SML-01");
        assert_eq!(winner.display_name, "user7");
        assert!(get_code(&conn, "SML-01").unwrap().unwrap().used);
    }
    assert_eq!(available(&env.db_pool, Tier::Small), 0);

    // Second attempt, private and group
    let again = giveaway.handle(&private_event(7, "trick or treat")).await.unwrap();
    assert_eq!(again, Outcome::AlreadyClaimed);
    let in_group = giveaway.handle(&group_event(7, "trick or treat")).await.unwrap();
    assert_eq!(in_group, Outcome::RedirectToPrivate { already_won: true });
    assert_eq!(
        in_group.reply_text(giveaway.trigger_phrase()),
        again.reply_text(giveaway.trigger_phrase())
    );
    assert_eq!(winner_count(&env.db_pool), 1);
}

#[tokio::test]
async fn test_each_tier_is_reachable() {
    let env = TestEnvironment::seeded();

    let large = env.giveaway(DRAW_LARGE).handle(&private_event(1, "trick or treat")).await.unwrap();
    let medium = env.giveaway(DRAW_MEDIUM).handle(&private_event(2, "trick or treat")).await.unwrap();

    assert!(matches!(large, Outcome::Won { tier: Tier::Large, ref code, .. } if code == "LRG-01"));
    assert!(matches!(medium, Outcome::Won { tier: Tier::Medium, ref code, .. } if code == "MED-01"));
}

#[tokio::test]
async fn test_sold_out_tier_records_nothing() {
    let env = TestEnvironment::with_codes("Code,Prize\nMED-01,Medium\n");
    let giveaway = env.giveaway(DRAW_LARGE);

    let outcome = giveaway.handle(&private_event(3, "trick or treat")).await.unwrap();
    assert_eq!(outcome, Outcome::SoldOut { tier: Tier::Large });
    assert!(outcome
        .reply_text(giveaway.trigger_phrase())
        .unwrap()
        .contains("all Large Candy prizes have been claimed"));
    assert_eq!(winner_count(&env.db_pool), 0);
    assert_eq!(available(&env.db_pool, Tier::Medium), 1);

    // Sold out is not a terminal state for the user
    let retry = env.giveaway(DRAW_MEDIUM).handle(&private_event(3, "trick or treat")).await.unwrap();
    assert!(matches!(retry, Outcome::Won { tier: Tier::Medium, .. }));
}

#[tokio::test]
async fn test_membership_denial_writes_nothing() {
    let env = TestEnvironment::seeded();
    let channels = vec!["@candy_news".to_string(), "@spooky".to_string()];
    let giveaway = env.giveaway_with_gate(DRAW_SMALL, Arc::new(ClosedGate(channels.clone())));

    let outcome = giveaway.handle(&private_event(9, "trick or treat")).await.unwrap();
    assert_eq!(outcome, Outcome::MembershipRequired { channels });

    let reply = outcome.reply_text(giveaway.trigger_phrase()).unwrap();
    assert!(reply.contains("👉 @candy_news\n👉 @spooky"));
    assert!(reply.contains("type 'trick or treat' again"));

    assert_eq!(winner_count(&env.db_pool), 0);
    assert_eq!(available(&env.db_pool, Tier::Small), 1);
}

/// Records a win for the user while the gate is being consulted, as a
/// concurrent message from the same user would.
struct RacingGate {
    db_pool: Arc<DbPool>,
}

#[async_trait]
impl MembershipGate for RacingGate {
    async fn check(&self, user_id: i64) -> GateDecision {
        let conn = get_connection(&self.db_pool).unwrap();
        record_winner(&conn, user_id, "racer", Tier::Medium, "MED-01").unwrap();
        GateDecision::Allowed
    }
}

#[tokio::test]
async fn test_lost_race_returns_code_to_pool() {
    let env = TestEnvironment::seeded();
    let gate = Arc::new(RacingGate {
        db_pool: Arc::clone(&env.db_pool),
    });
    let giveaway = env.giveaway_with_gate(DRAW_SMALL, gate);

    let outcome = giveaway.handle(&private_event(11, "trick or treat")).await.unwrap();
    assert_eq!(outcome, Outcome::AlreadyClaimed);

    let conn = get_connection(&env.db_pool).unwrap();
    let winner = get_winner(&conn, 11).unwrap().unwrap();
    assert_eq!(winner.code, "MED-01");
    assert!(!get_code(&conn, "SML-01").unwrap().unwrap().used);
    drop(conn);
    assert_eq!(available(&env.db_pool, Tier::Small), 1);
}

#[tokio::test]
async fn test_custom_trigger_phrase() {
    let env = TestEnvironment::seeded();
    let giveaway = treatbot::Giveaway::new(
        Arc::clone(&env.db_pool),
        treatbot::PrizeTable::halloween(),
        Arc::new(treatbot::giveaway::OpenGate),
        "Boo Please",
    )
    .with_sampler(Arc::new(|| DRAW_SMALL));

    assert_eq!(giveaway.trigger_phrase(), "boo please");
    assert_eq!(
        giveaway.handle(&private_event(4, "trick or treat")).await.unwrap(),
        Outcome::Ignored
    );
    assert!(matches!(
        giveaway.handle(&private_event(4, "oh BOO please!")).await.unwrap(),
        Outcome::Won { .. }
    ));
}

#[tokio::test]
async fn test_random_draw_awards_a_stocked_tier() {
    let env = TestEnvironment::seeded();
    let giveaway = treatbot::Giveaway::new(
        Arc::clone(&env.db_pool),
        treatbot::PrizeTable::halloween(),
        Arc::new(treatbot::giveaway::OpenGate),
        "trick or treat",
    );

    // Every tier has a code, so the thread RNG draw always wins
    let outcome = giveaway.handle(&private_event(21, "trick or treat")).await.unwrap();
    let (tier, code) = match outcome {
        Outcome::Won { tier, code, .. } => (tier, code),
        other => panic!("expected a win, got {:?}", other),
    };

    let conn = get_connection(&env.db_pool).unwrap();
    let stored = get_code(&conn, &code).unwrap().unwrap();
    assert_eq!(stored.tier, tier);
    assert!(stored.used);
    assert_eq!(get_winner(&conn, 21).unwrap().unwrap().code, code);
}
