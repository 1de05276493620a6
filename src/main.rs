mod app;
mod config;
mod db;
mod error;
mod model;
mod seed;
mod state;
mod students;
#[cfg(test)]
mod testing;
mod users;

use crate::config::AppConfig;
use crate::seed::SeedContext;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Serve,
    Migrate,
    Seed,
}

impl Command {
    fn parse(arg: Option<&str>) -> anyhow::Result<Self> {
        match arg {
            None | Some("serve") => Ok(Command::Serve),
            Some("migrate") => Ok(Command::Migrate),
            Some("seed") => Ok(Command::Seed),
            Some(other) => anyhow::bail!("unknown command `{other}` (expected serve, migrate or seed)"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "student_roster=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let command = Command::parse(std::env::args().nth(1).as_deref())?;
    let config = AppConfig::from_env()?;

    let db = db::connect(&config).await?;
    db::migrate(&db).await?;

    match command {
        Command::Serve => app::serve(app::build_app(AppState::postgres(db)), &config).await?,
        Command::Migrate => {}
        Command::Seed => {
            let ctx = SeedContext::postgres(db);
            seed::run_seeders(&seed::default_seeders(&config.seed), &ctx).await?;
        }
    }

    Ok(())
}
