use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    bookrenderer::logging::init().context("init logging")?;

    let cli = bookrenderer::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        bookrenderer::cli::Command::Serve(args) => {
            bookrenderer::server::run(args).await.context("serve")?;
        }
        bookrenderer::cli::Command::Index(args) => {
            bookrenderer::indexer::run(args).await.context("index")?;
        }
    }

    Ok(())
}
