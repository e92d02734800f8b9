//! End-to-end tests for the signup/bet/settle/redeem lifecycle, against a
//! real `PostgreSQL` instance. See `tests/common` for the container
//! fixture.

mod common;

use common::fixtures::TestDb;
use ddj_core::draw::draw;
use ddj_core::round::{round_by_id, RoundConfig};
use ddj_api::services::{admin_service, bet_service, redeem_service, settlement_service, signup_service};
use ddj_api::store::{ledger_kind, postgres};

const SEED: &[u8] = b"integration-test-seed-16bytes!!";

fn round_cfg() -> RoundConfig {
    RoundConfig {
        round_seconds: 60,
        close_bets_at: 10,
        anchor_ms: 0,
    }
    .clamp()
}

#[tokio::test]
async fn signup_credits_the_configured_bonus() {
    let db = TestDb::new().await;
    let player = signup_service::signup(&db.pool, "alice", 50).await.unwrap();

    assert_eq!(player.balance, 50);
    assert_eq!(player.status, "ACTIVE");

    let entries = postgres::list_ledger(&db.pool, player.id, 10).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, "BONUS_SIGNUP");
    assert_eq!(entries[0].amount, 50);
}

#[tokio::test]
async fn signup_rejects_duplicate_usernames() {
    let db = TestDb::new().await;
    signup_service::signup(&db.pool, "bob", 0).await.unwrap();
    let err = signup_service::signup(&db.pool, "bob", 0).await.unwrap_err();
    assert!(matches!(err, ddj_api::error::AppError::UsernameTaken));
}

#[tokio::test]
async fn placing_a_bet_debits_the_balance() {
    let db = TestDb::new().await;
    let player = signup_service::signup(&db.pool, "carol", 100).await.unwrap();
    let cfg = round_cfg();

    let round = round_by_id(&cfg, 0, 0);
    let outcome = bet_service::place_bet(&db.pool, &cfg, round.start_ms, player.id, &[1, 2, 3, 4], 1, 40)
        .await
        .unwrap();

    assert_eq!(outcome.balance, 60);
    assert_eq!(outcome.round_id, 0);
}

#[tokio::test]
async fn betting_after_close_at_is_rejected() {
    let db = TestDb::new().await;
    let player = signup_service::signup(&db.pool, "dave", 100).await.unwrap();
    let cfg = round_cfg();
    let round = round_by_id(&cfg, 0, 0);

    let err = bet_service::place_bet(&db.pool, &cfg, round.close_at_ms, player.id, &[1, 2, 3, 4], 1, 10)
        .await
        .unwrap_err();

    match err {
        ddj_api::error::AppError::Domain(ddj_core::error::DomainError::BettingClosed {
            round_id,
            seconds_to_close,
        }) => {
            assert_eq!(round_id, 0);
            assert_eq!(seconds_to_close, 0);
        }
        other => panic!("expected BettingClosed, got {other:?}"),
    }

    // No side effects: the player's balance is untouched.
    let fresh = postgres::get_player(&db.pool, player.id).await.unwrap().unwrap();
    assert_eq!(fresh.balance, 100);
}

#[tokio::test]
async fn a_bet_larger_than_balance_is_rejected() {
    let db = TestDb::new().await;
    let player = signup_service::signup(&db.pool, "erin", 10).await.unwrap();
    let cfg = round_cfg();
    let round = round_by_id(&cfg, 0, 0);

    let err = bet_service::place_bet(&db.pool, &cfg, round.start_ms, player.id, &[1, 2, 3, 4], 1, 11)
        .await
        .unwrap_err();
    assert!(matches!(err, ddj_api::error::AppError::InsufficientBalance));
}

#[tokio::test]
async fn two_concurrent_bets_cannot_both_overdraw_the_balance() {
    let db = TestDb::new().await;
    let player = signup_service::signup(&db.pool, "frank", 50).await.unwrap();
    let cfg = round_cfg();
    let round = round_by_id(&cfg, 0, 0);

    let (r1, r2) = tokio::join!(
        bet_service::place_bet(&db.pool, &cfg, round.start_ms, player.id, &[1, 2, 3, 4], 1, 40),
        bet_service::place_bet(&db.pool, &cfg, round.start_ms, player.id, &[5, 6, 7, 8], 2, 40),
    );

    // Each bet takes the player row lock in turn, so exactly one of the
    // two 40-DOS stakes succeeds against a 50-DOS balance.
    let successes = [&r1, &r2].into_iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);

    let fresh = postgres::get_player(&db.pool, player.id).await.unwrap().unwrap();
    assert_eq!(fresh.balance, 10);
}

#[tokio::test]
async fn settlement_pays_winners_and_is_idempotent() {
    let db = TestDb::new().await;
    let winner = signup_service::signup(&db.pool, "grace", 0).await.unwrap();
    let loser = signup_service::signup(&db.pool, "heidi", 0).await.unwrap();
    admin_service_credit(&db, winner.id, 100).await;
    admin_service_credit(&db, loser.id, 100).await;

    let cfg = round_cfg();
    let round_id = 7u64;
    let round = round_by_id(&cfg, round_id, 0);
    let outcome = draw(SEED, round_id).unwrap();

    // Winner's numbers exactly match the draw; loser's never can (all
    // four outcome numbers are excluded from the loser's pick).
    let mut loser_nums = vec![1u8, 2, 3, 4, 5, 6, 7, 8, 9, 10];
    loser_nums.retain(|n| !outcome.main.contains(n));
    let loser_nums: Vec<i64> = loser_nums.into_iter().take(4).map(i64::from).collect();
    let winner_nums: Vec<i64> = outcome.main.iter().map(|&n| i64::from(n)).collect();

    bet_service::place_bet(
        &db.pool,
        &cfg,
        round.start_ms,
        winner.id,
        &winner_nums,
        i64::from(outcome.chance),
        40,
    )
    .await
    .unwrap();
    bet_service::place_bet(&db.pool, &cfg, round.start_ms, loser.id, &loser_nums, 1, 20)
        .await
        .unwrap();

    let first = settlement_service::settle(&db.pool, &cfg, round.end_ms, round_id, SEED)
        .await
        .unwrap();
    assert!(!first.already_settled);
    assert_eq!(first.outcome, outcome);

    let winner_after = postgres::get_player(&db.pool, winner.id).await.unwrap().unwrap();
    assert!(winner_after.balance > 0, "winner should have been credited");

    let second = settlement_service::settle(&db.pool, &cfg, round.end_ms, round_id, SEED)
        .await
        .unwrap();
    assert!(second.already_settled);
    assert_eq!(second.outcome, outcome);

    // Idempotent: re-settling does not change the balance again.
    let winner_again = postgres::get_player(&db.pool, winner.id).await.unwrap().unwrap();
    assert_eq!(winner_again.balance, winner_after.balance);
}

#[tokio::test]
async fn settling_before_the_round_ends_is_rejected() {
    let db = TestDb::new().await;
    let cfg = round_cfg();
    let round = round_by_id(&cfg, 3, 0);

    let err = settlement_service::settle(&db.pool, &cfg, round.start_ms, 3, SEED)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ddj_api::error::AppError::Domain(ddj_core::error::DomainError::RoundNotEnded { .. })
    ));
}

#[tokio::test]
async fn gift_code_redemption_credits_the_player_once() {
    let db = TestDb::new().await;
    let player = signup_service::signup(&db.pool, "ivan", 0).await.unwrap();

    let codes = admin_service::generate_gift_codes(&db.pool, SEED, 1, 25, None)
        .await
        .unwrap();
    let code = &codes[0].code;

    let redeemed = redeem_service::redeem(&db.pool, player.id, code, SEED, chrono::Utc::now())
        .await
        .unwrap();
    assert_eq!(redeemed.value, 25);
    assert_eq!(redeemed.balance, 25);

    let err = redeem_service::redeem(&db.pool, player.id, code, SEED, chrono::Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, ddj_api::error::AppError::GiftCodeNotActive));
}

/// Credit a player's balance directly for test setup (bypassing the bet
/// pipeline, which always debits).
async fn admin_service_credit(db: &TestDb, player_id: uuid::Uuid, amount: i64) {
    let mut tx = db.pool.begin().await.unwrap();
    let player = postgres::lock_player(&mut *tx, player_id).await.unwrap().unwrap();
    postgres::set_balance(&mut *tx, player_id, player.balance + amount).await.unwrap();
    postgres::insert_ledger(
        &mut *tx,
        Some(player_id),
        ledger_kind::ADMIN_ADD,
        amount,
        serde_json::json!({}),
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();
}
