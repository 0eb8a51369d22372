mod commands;
mod terminal;

use std::sync::Arc;

use dashboard_client::{ApiClient, ClientConfig, Dashboard, PollScheduler};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::commands::{Command, HELP};
use crate::terminal::TerminalView;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the dashboard on stdout stays readable
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashboard=info,dashboard_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env()?;
    info!(
        api_base = %config.api_base,
        poll_ms = config.poll_interval.as_millis() as u64,
        "dashboard starting"
    );

    let api = ApiClient::new(&config)?;
    match api.health().await {
        Ok(health) if health.ok => info!("api is healthy"),
        Ok(_) => warn!("api reports unhealthy"),
        Err(e) => warn!("health check failed: {e}"),
    }

    let dashboard = Dashboard::new(api, Arc::new(TerminalView::new()));
    dashboard.bootstrap().await;
    let poller = PollScheduler::spawn(dashboard.clone(), config.poll_interval);

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            line = lines.next_line() => line?,
        };
        // EOF
        let Some(line) = line else { break };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };
        match command {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            command => {
                if let Err(e) = commands::execute(&dashboard, command).await {
                    warn!("command failed: {e:#}");
                }
            }
        }
    }

    poller.shutdown().await;
    info!("dashboard stopped");
    Ok(())
}
