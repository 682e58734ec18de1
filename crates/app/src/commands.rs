//! Command handlers. Each prints its outcome; errors bubble up to `main`,
//! which prints them as a single line.

use std::sync::Arc;

use chrono::TimeDelta;
use engine::{
    Account, Clock, Currency, Engine, EngineError, KeyValueStore, MiningTimer, Session,
};
use tokio::sync::Mutex;

use crate::{
    cli::{Command, LoginArgs, MineCommand, RegisterArgs, SwapArgs},
    error::Result,
};

pub async fn dispatch<S, C>(engine: Engine<S, C>, command: Command) -> Result<()>
where
    S: KeyValueStore + 'static,
    C: Clock + 'static,
{
    let mut engine = engine;
    claim_overdue(&mut engine).await?;
    match command {
        Command::Register(args) => register(&mut engine, args).await,
        Command::Login(args) => login(&mut engine, args).await,
        Command::Logout => {
            engine.logout().await?;
            println!("Logged out.");
            Ok(())
        }
        Command::Status => status(&engine),
        Command::Mine(mine) => match mine.command {
            MineCommand::Start => mine_start(&mut engine).await,
            MineCommand::Claim => mine_claim(&mut engine).await,
            MineCommand::Watch => mine_watch(engine).await,
        },
        Command::Swap(args) => swap(&mut engine, args).await,
        Command::WatchAd => watch_ad(&mut engine).await,
        Command::Referrals => referrals(&engine).await,
        Command::Accounts => accounts(&engine).await,
        Command::Rates => {
            for (from, to, rate) in engine.rates().iter() {
                println!("1 {from} = {rate} {to}");
            }
            Ok(())
        }
    }
}

/// Claims a cycle whose end time has already passed, so every command sees
/// the credited balance.
async fn claim_overdue<S: KeyValueStore, C: Clock>(engine: &mut Engine<S, C>) -> Result<()> {
    if let Some(reward) = engine.claim_rewards().await? {
        println!("Mining cycle complete, claimed {reward} {}.", Currency::RangerAi);
    }
    Ok(())
}

fn require_session<S: KeyValueStore, C: Clock>(engine: &Engine<S, C>) -> Result<&Session> {
    Ok(engine.current_session().ok_or(EngineError::NotLoggedIn)?)
}

/// `HH:MM:SS`, clamped at zero.
fn format_remaining(delta: TimeDelta) -> String {
    let total = delta.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

fn print_balances(account: &Account) {
    for currency in Currency::ALL {
        println!(
            "  {currency:<9} {}",
            account
                .balances
                .get(currency)
                .to_fixed(currency.display_digits())
        );
    }
}

async fn register<S: KeyValueStore, C: Clock>(
    engine: &mut Engine<S, C>,
    args: RegisterArgs,
) -> Result<()> {
    let account = engine
        .register(&args.email, &args.password, args.referral.as_deref())
        .await?;
    println!("Welcome, {}!", account.email);
    println!("Your referral code: {}", account.referral_code);
    print_balances(&account);
    Ok(())
}

async fn login<S: KeyValueStore, C: Clock>(
    engine: &mut Engine<S, C>,
    args: LoginArgs,
) -> Result<()> {
    let session = engine.login(&args.email, &args.password).await?;
    println!("Logged in as {}.", session.account.email);
    claim_overdue(engine).await?;
    if engine.mining_deadline().is_some() {
        println!("A mining cycle is still running.");
    }
    Ok(())
}

fn status<S: KeyValueStore, C: Clock>(engine: &Engine<S, C>) -> Result<()> {
    let session = require_session(engine)?;
    println!("{}", session.account.email);
    println!("Referral code: {}", session.account.referral_code);
    if let Some(code) = &session.account.referred_by {
        println!("Referred by:   {code}");
    }
    print_balances(&session.account);

    if let Some(status) = engine.mining_status() {
        if status.claimable {
            println!("Mining complete, reward ready to claim.");
        } else if status.active {
            println!(
                "Mining: {}% ({} left)",
                status.progress_percent,
                format_remaining(status.remaining)
            );
        } else {
            println!("Mining: idle");
        }
        if let Some(last) = status.last_claim_at {
            println!("Last claim: {}", last.format("%Y-%m-%d %H:%M:%S UTC"));
        }
    }
    Ok(())
}

async fn mine_start<S: KeyValueStore, C: Clock>(engine: &mut Engine<S, C>) -> Result<()> {
    require_session(engine)?;
    if engine.start_mining().await? {
        let remaining = engine
            .mining_status()
            .map(|s| s.remaining)
            .unwrap_or_else(TimeDelta::zero);
        println!("Mining started, come back in {}.", format_remaining(remaining));
    } else {
        println!("A mining cycle is already running.");
    }
    Ok(())
}

async fn mine_claim<S: KeyValueStore, C: Clock>(engine: &mut Engine<S, C>) -> Result<()> {
    require_session(engine)?;
    match engine.claim_rewards().await? {
        Some(reward) => println!("Claimed {reward} {}.", Currency::RangerAi),
        None => match engine.mining_status() {
            Some(status) if status.active => println!(
                "Nothing to claim yet, {} left.",
                format_remaining(status.remaining)
            ),
            _ => println!("No mining cycle running."),
        },
    }
    Ok(())
}

async fn mine_watch<S, C>(engine: Engine<S, C>) -> Result<()>
where
    S: KeyValueStore + 'static,
    C: Clock + 'static,
{
    require_session(&engine)?;
    let shared = Arc::new(Mutex::new(engine));
    let mut timer = MiningTimer::new();
    if !timer.arm(&shared).await {
        println!("No mining cycle running.");
        return Ok(());
    }

    if let Some(status) = shared.lock().await.mining_status() {
        println!(
            "Waiting for the cycle to finish ({} left), Ctrl-C to stop.",
            format_remaining(status.remaining)
        );
    }
    let claimed = tokio::select! {
        claimed = timer.wait() => Some(claimed?),
        signal = tokio::signal::ctrl_c() => {
            signal?;
            None
        }
    };
    match claimed {
        Some(Some(reward)) => println!("Cycle complete, claimed {reward} {}.", Currency::RangerAi),
        Some(None) => println!("Cycle ended without a claim."),
        None => {
            timer.disarm();
            println!("Stopped waiting; the cycle keeps running.");
        }
    }
    Ok(())
}

async fn swap<S: KeyValueStore, C: Clock>(
    engine: &mut Engine<S, C>,
    args: SwapArgs,
) -> Result<()> {
    let receipt = engine.swap_currency(args.from, args.to, args.amount).await?;
    println!(
        "Swapped {} {} for {} {} (rate {}).",
        receipt.debited.to_fixed(receipt.from.display_digits().max(4)),
        receipt.from,
        receipt.credited.to_fixed(receipt.to.display_digits().max(4)),
        receipt.to,
        receipt.rate
    );
    Ok(())
}

async fn watch_ad<S: KeyValueStore, C: Clock>(engine: &mut Engine<S, C>) -> Result<()> {
    require_session(engine)?;
    let duration = engine.config().ad_watch_duration;
    println!("Watching ad... ({}s)", duration.num_seconds());
    tokio::time::sleep(duration.to_std().unwrap_or_default()).await;
    let reward = engine.watch_ad_and_earn().await?;
    println!("Ad watched! You earned {reward} {}.", Currency::RangerAi);
    Ok(())
}

async fn referrals<S: KeyValueStore, C: Clock>(engine: &Engine<S, C>) -> Result<()> {
    require_session(engine)?;
    let referred = engine.my_referrals().await?;
    if referred.is_empty() {
        println!("Nobody has used your referral code yet.");
        return Ok(());
    }
    println!("{} referred account(s):", referred.len());
    for account in referred {
        println!(
            "  {} (joined {})",
            account.email,
            account.created_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}

async fn accounts<S: KeyValueStore, C: Clock>(engine: &Engine<S, C>) -> Result<()> {
    for account in engine.list_accounts().await? {
        let referred_by = account.referred_by.as_deref().unwrap_or("-");
        println!(
            "{}  {:<30} code={} referred_by={}",
            account.id, account.email, account.referral_code, referred_by
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use engine::{ManualClock, MemoryStore, Money};

    use super::*;

    async fn engine_at(
        store: &MemoryStore,
        clock: &ManualClock,
    ) -> Engine<MemoryStore, ManualClock> {
        Engine::builder()
            .store(store.clone())
            .clock(clock.clone())
            .build()
            .await
            .unwrap()
    }

    async fn overdue_cycle() -> (MemoryStore, ManualClock) {
        let store = MemoryStore::new();
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 15, 8, 0, 0).unwrap());
        let mut engine = engine_at(&store, &clock).await;
        engine.register("a@x.com", "secret1", None).await.unwrap();
        engine.start_mining().await.unwrap();
        clock.advance(TimeDelta::hours(25));
        (store, clock)
    }

    #[tokio::test]
    async fn resumed_overdue_cycle_is_claimed_before_command() {
        let (store, clock) = overdue_cycle().await;

        dispatch(engine_at(&store, &clock).await, Command::Rates)
            .await
            .unwrap();

        let engine = engine_at(&store, &clock).await;
        let session = engine.current_session().unwrap();
        assert!(!session.mining.active);
        assert_eq!(session.account.balances.ranger_ai, "0.5".parse::<Money>().unwrap());
    }

    #[tokio::test]
    async fn login_claims_overdue_cycle() {
        let (store, clock) = overdue_cycle().await;
        let mut engine = engine_at(&store, &clock).await;
        engine.logout().await.unwrap();

        let args = LoginArgs {
            email: "a@x.com".to_string(),
            password: "secret1".to_string(),
        };
        dispatch(engine, Command::Login(args)).await.unwrap();

        let engine = engine_at(&store, &clock).await;
        let accounts = engine.list_accounts().await.unwrap();
        assert_eq!(accounts[0].balances.ranger_ai, "0.5".parse::<Money>().unwrap());
        assert_eq!(engine.mining_deadline(), None);
    }

    #[test]
    fn remaining_is_formatted_as_clock() {
        assert_eq!(format_remaining(TimeDelta::hours(24)), "24:00:00");
        assert_eq!(format_remaining(TimeDelta::seconds(3_725)), "01:02:05");
        assert_eq!(format_remaining(TimeDelta::seconds(-5)), "00:00:00");
    }
}
