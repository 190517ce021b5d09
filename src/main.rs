mod cli;

use anyhow::Result;
use clap::Parser;
use parasol_core::Config;
use parasol_remote::RemoteSession;
use parasol_weather::FixedLocator;

use crate::cli::{Action, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse first: --help and bad arguments exit before anything starts
    let cli = Cli::parse();

    parasol_core::init()?;

    // Warnings are logged while loading
    let (config, _) = match &cli.config {
        Some(path) => Config::load_validated_from(path)?,
        None => Config::load_validated()?,
    };

    let session = RemoteSession::from_config(&config)
        .map_err(|e| anyhow::anyhow!("{}: {}", e.user_message(), e))?;

    tracing::info!("Parasol started, device at {}", config.device.base_url);

    session.start();
    session.wait_ready().await;

    run(&session, cli.action).await;

    // Graceful shutdown
    session.shutdown().await;

    println!("{}", session.view());
    Ok(())
}

async fn run(session: &RemoteSession<FixedLocator>, action: Option<Action>) {
    match action {
        None => {}
        Some(Action::Toggle) => session.toggle(),
        Some(Action::Send { command }) => session.press(command),
        Some(Action::Watch) => {
            println!("{}\n", session.view());
            let mut watcher = session.watch();
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    view = watcher.changed() => match view {
                        Some(view) => println!("{}\n", view),
                        None => break,
                    },
                }
            }
        }
    }
}
