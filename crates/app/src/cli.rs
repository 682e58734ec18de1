use clap::{Args, Parser, Subcommand};
use engine::{Currency, Money};

#[derive(Parser, Debug)]
#[command(name = "ranger")]
#[command(about = "Ranger AI mining simulator: mine, swap and earn virtual tokens")]
pub struct Cli {
    /// Settings file (TOML). Defaults to `settings.toml` when present.
    #[arg(long)]
    pub config: Option<String>,

    /// Database connection string, overrides the settings file.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account and log in.
    Register(RegisterArgs),
    /// Log in, resuming any running mining cycle.
    Login(LoginArgs),
    /// Log out. A running mining cycle keeps going.
    Logout,
    /// Show balances and mining progress.
    Status,
    /// Mining cycle commands.
    Mine(Mine),
    /// Convert between currencies at the fixed rates.
    Swap(SwapArgs),
    /// Watch an ad and earn a small RangerAI reward.
    WatchAd,
    /// List accounts registered with your referral code.
    Referrals,
    /// List every registered account.
    Accounts,
    /// Show the conversion rates.
    Rates,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "RANGER_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Referral code of the account that invited you.
    #[arg(long)]
    pub referral: Option<String>,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "RANGER_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct Mine {
    #[command(subcommand)]
    pub command: MineCommand,
}

#[derive(Subcommand, Debug)]
pub enum MineCommand {
    /// Start a new 24h cycle.
    Start,
    /// Claim the reward of a finished cycle.
    Claim,
    /// Wait for the running cycle to end and claim it.
    Watch,
}

#[derive(Args, Debug)]
pub struct SwapArgs {
    #[arg(long)]
    pub from: Currency,
    #[arg(long)]
    pub to: Currency,
    #[arg(long)]
    pub amount: Money,
}
