//! Applies the `ranger` schema outside the app, e.g. before inspecting a
//! database by hand. The app itself migrates on startup.

use sea_orm::Database;
use sea_orm_migration::prelude::*;

use migration::Migrator;

const DEFAULT_DATABASE_URL: &str = "sqlite:./ranger.db?mode=rwc";
const USAGE: &str = "usage: migration [up|down|fresh|status]  (database from DATABASE_URL, default ./ranger.db)";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let action = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    let database = match action.as_str() {
        "up" | "down" | "fresh" | "status" => Database::connect(&url).await?,
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    match action.as_str() {
        "down" => Migrator::down(&database, None).await?,
        "fresh" => Migrator::fresh(&database).await?,
        "status" => Migrator::status(&database).await?,
        _ => Migrator::up(&database, None).await?,
    }
    println!("kv_entries schema: {action} done on {url}");
    Ok(())
}
