use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use sea_orm::Database;
use tokio::sync::Mutex;

use engine::{
    Currency, Engine, EngineError, KeyValueStore, LedgerConfig, ManualClock, MemoryStore,
    MiningTimer, Money, Session, SqliteStore,
    store::{ACCOUNTS_KEY, CURRENT_SESSION_KEY, account_session_key},
};
use migration::MigratorTrait;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 15, 8, 0, 0).unwrap()
}

fn money(s: &str) -> Money {
    s.parse().unwrap()
}

async fn engine_with_memory() -> (Engine<MemoryStore, ManualClock>, MemoryStore, ManualClock) {
    let store = MemoryStore::new();
    let clock = ManualClock::new(t0());
    let engine = Engine::builder()
        .store(store.clone())
        .clock(clock.clone())
        .build()
        .await
        .unwrap();
    (engine, store, clock)
}

async fn engine_with_sqlite() -> (Engine<SqliteStore, ManualClock>, SqliteStore, ManualClock) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let store = SqliteStore::new(db);
    let clock = ManualClock::new(t0());
    let engine = Engine::builder()
        .store(store.clone())
        .clock(clock.clone())
        .build()
        .await
        .unwrap();
    (engine, store, clock)
}

fn balances_of(engine: &Engine<impl KeyValueStore, ManualClock>) -> engine::Balances {
    engine.current_session().unwrap().account.balances
}

#[tokio::test]
async fn register_starts_with_default_balances() {
    let (mut engine, _store, _clock) = engine_with_memory().await;

    let account = engine.register("a@x.com", "secret1", None).await.unwrap();

    assert_eq!(account.balances.ranger_ai, Money::ZERO);
    assert_eq!(account.balances.usdt, Money::from_units(1));
    assert_eq!(account.balances.bnb, Money::ZERO);
    assert!(account.referral_code.starts_with("RGR-"));
    assert_eq!(account.referred_by, None);

    let session = engine.current_session().unwrap();
    assert_eq!(session.account.id, account.id);
    assert!(!session.mining.active);
}

#[tokio::test]
async fn referral_pays_both_sides() {
    let (mut engine, _store, _clock) = engine_with_memory().await;

    let a = engine.register("a@x.com", "secret1", None).await.unwrap();
    let b = engine
        .register("b@x.com", "secret2", Some(&a.referral_code))
        .await
        .unwrap();

    assert_eq!(b.balances.ranger_ai, money("0.5"));
    assert_eq!(b.referred_by.as_deref(), Some(a.referral_code.as_str()));

    let accounts = engine.list_accounts().await.unwrap();
    let a_now = accounts.iter().find(|x| x.id == a.id).unwrap();
    assert_eq!(a_now.balances.ranger_ai, Money::from_units(1));

    let referred = engine.referrals_of(&a.referral_code).await.unwrap();
    assert_eq!(referred.len(), 1);
    assert_eq!(referred[0].id, b.id);
}

#[tokio::test]
async fn unknown_referral_code_is_ignored() {
    let (mut engine, _store, _clock) = engine_with_memory().await;

    let a = engine.register("a@x.com", "secret1", None).await.unwrap();
    let b = engine
        .register("b@x.com", "secret2", Some("RGR-NOPE00"))
        .await
        .unwrap();

    assert_eq!(b.balances.ranger_ai, Money::ZERO);
    assert_eq!(b.referred_by.as_deref(), Some("RGR-NOPE00"));
    let accounts = engine.list_accounts().await.unwrap();
    let a_now = accounts.iter().find(|x| x.id == a.id).unwrap();
    assert_eq!(a_now.balances.ranger_ai, Money::ZERO);
}

#[tokio::test]
async fn duplicate_email_is_rejected_case_insensitively() {
    let (mut engine, _store, _clock) = engine_with_memory().await;

    engine.register("a@x.com", "secret1", None).await.unwrap();
    let err = engine
        .register("A@X.COM", "another1", None)
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::Auth("email already registered".to_string()));
    assert_eq!(engine.list_accounts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn register_validates_input() {
    let (mut engine, _store, _clock) = engine_with_memory().await;

    assert!(matches!(
        engine.register("not-an-email", "secret1", None).await,
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        engine.register("a@x.com", "short", None).await,
        Err(EngineError::Validation(_))
    ));
    assert!(engine.list_accounts().await.unwrap().is_empty());
    assert!(engine.current_session().is_none());
}

#[tokio::test]
async fn login_checks_credentials() {
    let (mut engine, _store, _clock) = engine_with_memory().await;
    engine.register("a@x.com", "secret1", None).await.unwrap();
    engine.logout().await.unwrap();

    let invalid = EngineError::Auth("invalid email or password".to_string());
    assert_eq!(
        engine.login("a@x.com", "wrong-password").await.unwrap_err(),
        invalid
    );
    assert_eq!(
        engine.login("nobody@x.com", "secret1").await.unwrap_err(),
        invalid
    );
    assert!(engine.current_session().is_none());

    let session = engine.login("A@x.com", "secret1").await.unwrap();
    assert_eq!(session.account.email, "a@x.com");
}

#[tokio::test]
async fn logout_keeps_account_snapshot() {
    let (mut engine, store, _clock) = engine_with_memory().await;
    let account = engine.register("a@x.com", "secret1", None).await.unwrap();
    assert!(store.get(CURRENT_SESSION_KEY).await.unwrap().is_some());

    engine.logout().await.unwrap();

    assert!(engine.current_session().is_none());
    assert!(store.get(CURRENT_SESSION_KEY).await.unwrap().is_none());
    assert!(
        store
            .get(&account_session_key(account.id))
            .await
            .unwrap()
            .is_some()
    );
    assert!(store.get(ACCOUNTS_KEY).await.unwrap().is_some());

    // Logging out twice is harmless.
    engine.logout().await.unwrap();
}

#[tokio::test]
async fn claim_before_end_is_a_noop() {
    let (mut engine, _store, clock) = engine_with_memory().await;
    engine.register("a@x.com", "secret1", None).await.unwrap();

    assert!(engine.start_mining().await.unwrap());
    clock.advance(TimeDelta::hours(23));
    assert_eq!(engine.claim_rewards().await.unwrap(), None);

    let session = engine.current_session().unwrap();
    assert!(session.mining.active);
    assert_eq!(session.account.balances.ranger_ai, Money::ZERO);
    assert_eq!(session.mining.ends_at, Some(t0() + TimeDelta::hours(24)));
}

#[tokio::test]
async fn claim_after_end_pays_reward_and_goes_idle() {
    let (mut engine, _store, clock) = engine_with_memory().await;
    engine.register("a@x.com", "secret1", None).await.unwrap();
    engine.start_mining().await.unwrap();

    clock.advance(TimeDelta::hours(24));
    assert_eq!(engine.claim_rewards().await.unwrap(), Some(money("0.5")));

    let session = engine.current_session().unwrap();
    assert!(!session.mining.active);
    assert_eq!(session.mining.started_at, None);
    assert_eq!(session.mining.ends_at, None);
    assert_eq!(session.mining.last_claim_at, Some(t0() + TimeDelta::hours(24)));
    assert_eq!(session.account.balances.ranger_ai, money("0.5"));

    // Nothing left to claim, and a new cycle can start.
    assert_eq!(engine.claim_rewards().await.unwrap(), None);
    assert!(engine.start_mining().await.unwrap());
}

#[tokio::test]
async fn start_mining_is_a_noop_when_running_or_logged_out() {
    let (mut engine, _store, clock) = engine_with_memory().await;
    assert!(!engine.start_mining().await.unwrap());

    engine.register("a@x.com", "secret1", None).await.unwrap();
    assert!(engine.start_mining().await.unwrap());
    clock.advance(TimeDelta::hours(1));
    assert!(!engine.start_mining().await.unwrap());
    assert_eq!(
        engine.mining_deadline(),
        Some(t0() + TimeDelta::hours(24))
    );
}

#[tokio::test]
async fn mining_cycle_survives_logout_and_login() {
    let (mut engine, _store, clock) = engine_with_memory().await;
    engine.register("a@x.com", "secret1", None).await.unwrap();
    engine.start_mining().await.unwrap();
    engine.logout().await.unwrap();

    clock.advance(TimeDelta::hours(25));
    let session = engine.login("a@x.com", "secret1").await.unwrap();
    assert!(session.mining.active);

    assert_eq!(engine.claim_rewards().await.unwrap(), Some(money("0.5")));
    engine.logout().await.unwrap();

    let session = engine.login("a@x.com", "secret1").await.unwrap();
    assert_eq!(session.account.balances.ranger_ai, money("0.5"));
    assert!(!session.mining.active);
}

#[tokio::test]
async fn swap_moves_balances_at_rate() {
    let (mut engine, _store, _clock) = engine_with_memory().await;
    engine.register("a@x.com", "secret1", None).await.unwrap();

    let rate = engine.rates().rate(Currency::Usdt, Currency::Bnb).unwrap();
    let receipt = engine
        .swap_currency(Currency::Usdt, Currency::Bnb, money("0.4"))
        .await
        .unwrap();

    assert_eq!(receipt.debited, money("0.4"));
    assert_eq!(receipt.credited, rate.convert(money("0.4")).unwrap());
    assert_eq!(receipt.credited, money("0.0008"));

    let balances = balances_of(&engine);
    assert_eq!(balances.usdt, money("0.6"));
    assert_eq!(balances.bnb, money("0.0008"));
    assert_eq!(balances.ranger_ai, Money::ZERO);

    // Mirrored into the account collection.
    let accounts = engine.list_accounts().await.unwrap();
    assert_eq!(accounts[0].balances, balances);
}

#[tokio::test]
async fn swap_failures_leave_balances_untouched() {
    let (mut engine, _store, _clock) = engine_with_memory().await;

    assert_eq!(
        engine
            .swap_currency(Currency::Usdt, Currency::Bnb, money("0.1"))
            .await
            .unwrap_err(),
        EngineError::NotLoggedIn
    );

    engine.register("a@x.com", "secret1", None).await.unwrap();
    let before = balances_of(&engine);

    assert!(matches!(
        engine
            .swap_currency(Currency::Usdt, Currency::Bnb, money("1.5"))
            .await,
        Err(EngineError::InsufficientBalance(_))
    ));
    assert!(matches!(
        engine
            .swap_currency(Currency::Usdt, Currency::Bnb, Money::ZERO)
            .await,
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        engine
            .swap_currency(Currency::Usdt, Currency::Bnb, money("-1"))
            .await,
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        engine
            .swap_currency(Currency::Usdt, Currency::Usdt, money("0.5"))
            .await,
        Err(EngineError::UnsupportedPair(_))
    ));

    assert_eq!(balances_of(&engine), before);
}

#[tokio::test]
async fn swap_that_converts_to_nothing_is_rejected() {
    let (mut engine, _store, _clock) = engine_with_memory().await;
    engine.register("a@x.com", "secret1", None).await.unwrap();
    let before = balances_of(&engine);

    assert_eq!(
        engine
            .swap_currency(Currency::Usdt, Currency::Bnb, Money::from_minor(1))
            .await
            .unwrap_err(),
        EngineError::Validation("amount too small to convert".to_string())
    );
    assert_eq!(balances_of(&engine), before);

    // 250 minor USDT is the smallest amount worth one minor BNB.
    let receipt = engine
        .swap_currency(Currency::Usdt, Currency::Bnb, Money::from_minor(250))
        .await
        .unwrap();
    assert_eq!(receipt.credited, Money::from_minor(1));
}

#[tokio::test]
async fn rebuilt_engine_with_overdue_cycle_pays_on_claim() {
    let (mut engine, store, clock) = engine_with_memory().await;
    engine.register("a@x.com", "secret1", None).await.unwrap();
    engine.start_mining().await.unwrap();
    drop(engine);

    clock.advance(TimeDelta::hours(25));
    let mut engine = Engine::builder()
        .store(store.clone())
        .clock(clock.clone())
        .build()
        .await
        .unwrap();
    assert!(engine.mining_status().unwrap().claimable);

    assert_eq!(engine.claim_rewards().await.unwrap(), Some(money("0.5")));
    assert_eq!(balances_of(&engine).ranger_ai, money("0.5"));
    assert!(!engine.mining_status().unwrap().claimable);
}

#[tokio::test]
async fn swap_uses_configured_rates() {
    let mut config = LedgerConfig::default();
    config.rates = engine::RateTable::empty();
    config
        .rates
        .set(Currency::Usdt, Currency::RangerAi, "10".parse().unwrap())
        .unwrap();
    let mut engine = Engine::builder()
        .clock(ManualClock::new(t0()))
        .config(config)
        .build()
        .await
        .unwrap();
    engine.register("a@x.com", "secret1", None).await.unwrap();

    assert!(matches!(
        engine
            .swap_currency(Currency::RangerAi, Currency::Usdt, money("0.1"))
            .await,
        Err(EngineError::UnsupportedPair(_))
    ));
    let receipt = engine
        .swap_currency(Currency::Usdt, Currency::RangerAi, money("0.5"))
        .await
        .unwrap();
    assert_eq!(receipt.credited, Money::from_units(5));
}

#[tokio::test]
async fn watching_two_ads_pays_twice() {
    let (mut engine, _store, _clock) = engine_with_memory().await;

    assert_eq!(
        engine.watch_ad_and_earn().await.unwrap_err(),
        EngineError::NotLoggedIn
    );

    engine.register("a@x.com", "secret1", None).await.unwrap();
    let before = balances_of(&engine).ranger_ai;
    engine.watch_ad_and_earn().await.unwrap();
    engine.watch_ad_and_earn().await.unwrap();

    let ad_reward = engine.config().ad_reward;
    assert_eq!(balances_of(&engine).ranger_ai, before + ad_reward + ad_reward);
    assert_eq!(balances_of(&engine).ranger_ai, money("0.1"));
}

#[tokio::test]
async fn rebuilt_engine_resumes_current_session() {
    let (mut engine, store, clock) = engine_with_memory().await;
    engine.register("a@x.com", "secret1", None).await.unwrap();
    engine.start_mining().await.unwrap();
    drop(engine);

    let engine = Engine::builder()
        .store(store.clone())
        .clock(clock.clone())
        .build()
        .await
        .unwrap();
    let session = engine.current_session().unwrap();
    assert_eq!(session.account.email, "a@x.com");
    assert!(session.mining.active);
}

#[tokio::test]
async fn corrupt_account_collection_surfaces_an_error() {
    let (mut engine, store, _clock) = engine_with_memory().await;
    store
        .set(ACCOUNTS_KEY, "{broken".to_string())
        .await
        .unwrap();

    assert!(matches!(
        engine.register("a@x.com", "secret1", None).await,
        Err(EngineError::Serialization(_))
    ));
}

#[tokio::test]
async fn sqlite_store_round_trips_sessions() {
    let (mut engine, store, clock) = engine_with_sqlite().await;
    let a = engine.register("a@x.com", "secret1", None).await.unwrap();
    engine
        .register("b@x.com", "secret2", Some(&a.referral_code))
        .await
        .unwrap();
    engine.watch_ad_and_earn().await.unwrap();
    engine.logout().await.unwrap();

    let raw = store.get(&account_session_key(a.id)).await.unwrap().unwrap();
    let snapshot: Session = serde_json::from_str(&raw).unwrap();
    assert_eq!(snapshot.account.email, "a@x.com");

    let mut engine = Engine::builder()
        .store(store.clone())
        .clock(clock.clone())
        .build()
        .await
        .unwrap();
    assert!(engine.current_session().is_none());

    let b = engine.login("b@x.com", "secret2").await.unwrap();
    assert_eq!(b.account.balances.ranger_ai, money("0.55"));
    engine.logout().await.unwrap();

    let a = engine.login("a@x.com", "secret1").await.unwrap();
    assert_eq!(a.account.balances.ranger_ai, Money::from_units(1));
    assert_eq!(engine.my_referrals().await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn timer_claims_when_cycle_ends() {
    let (mut engine, _store, clock) = engine_with_memory().await;
    engine.register("a@x.com", "secret1", None).await.unwrap();
    engine.start_mining().await.unwrap();

    let shared = Arc::new(Mutex::new(engine));
    let mut timer = MiningTimer::new();
    assert!(timer.arm(&shared).await);
    assert!(timer.is_armed());

    clock.advance(TimeDelta::hours(24));
    assert_eq!(timer.wait().await.unwrap(), Some(money("0.5")));

    let engine = shared.lock().await;
    let session = engine.current_session().unwrap();
    assert!(!session.mining.active);
    assert_eq!(session.account.balances.ranger_ai, money("0.5"));
}

#[tokio::test(start_paused = true)]
async fn disarmed_timer_does_not_claim() {
    let (mut engine, _store, clock) = engine_with_memory().await;
    engine.register("a@x.com", "secret1", None).await.unwrap();
    engine.start_mining().await.unwrap();

    let shared = Arc::new(Mutex::new(engine));
    let mut timer = MiningTimer::new();
    assert!(timer.arm(&shared).await);
    timer.disarm();
    assert!(!timer.is_armed());

    clock.advance(TimeDelta::hours(24));
    tokio::time::sleep(std::time::Duration::from_secs(25 * 3600)).await;
    assert_eq!(timer.wait().await.unwrap(), None);

    let engine = shared.lock().await;
    assert!(engine.current_session().unwrap().mining.active);
    assert_eq!(balances_of(&*engine).ranger_ai, Money::ZERO);
}

#[tokio::test]
async fn timer_does_not_arm_without_a_cycle() {
    let (mut engine, _store, _clock) = engine_with_memory().await;
    engine.register("a@x.com", "secret1", None).await.unwrap();

    let shared = Arc::new(Mutex::new(engine));
    let mut timer = MiningTimer::new();
    assert!(!timer.arm(&shared).await);
    assert!(!timer.is_armed());
}
