mod admin;
mod args;
mod config;
mod list;

use anyhow::Context as _;
use clap::Parser as _;
use duet_core::db;

use args::{Args, Command};
use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("duet=info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;
    let client = db::Client::new(&config.server.base_url, &config.server.api_key);

    match args.command {
        Command::List {
            collection,
            filters,
        } => list::print(&client, collection, &filters).await,
        Command::Options { collection } => list::options(&client, collection).await,
        Command::Export {
            collection,
            output,
            filters,
        } => {
            let path = list::export(&client, collection, &filters, output).await?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        Command::Admin { command } => {
            anyhow::ensure!(
                config.server.has_credentials(),
                "admin commands need `email` and `password` under [server] in {}",
                args.config
            );
            let session = duet_core::Session::start(client);
            session
                .sign_in(&config.server.email, &config.server.password)
                .await
                .context("Failed to sign in")?;
            let result = admin::run(&session, command).await;
            if let Err(e) = session.sign_out().await {
                tracing::warn!("failed to revoke session: {e}");
            }
            result
        }
    }
}
