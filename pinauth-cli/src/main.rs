use anyhow::Context;
use clap::Parser;
use pinauth_cli::commands::{Command, execute};
use pinauth_cli::config::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "pinauth")]
#[command(author, version, about = "Sign in with Pinterest from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=info,pinauth_cli=info,pinauth_pinterest=info",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AppConfig::parse().context("Failed to load config")?;
    let provider = config
        .pinterest
        .provider()
        .context("Failed to create Pinterest provider")?;

    let output = execute(cli.command, &provider).await?;
    println!("{output}");
    Ok(())
}
