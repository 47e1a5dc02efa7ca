//! # marvel-etl
//!
//! A thin entrypoint. All logic lives in the `marvel_etl_server` library crate.

use clap::Parser;
use marvel_etl_server::{start, Cli};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("marvel_etl=info".parse()?)
                .add_directive("marvel_etl_server=info".parse()?),
        )
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    if let Err(e) = start(cli).await {
        eprintln!("[marvel-etl error] {e:?}");
        std::process::exit(1);
    }

    Ok(())
}
