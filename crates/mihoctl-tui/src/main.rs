//! `mihoctl-tui`: real-time terminal dashboard for a mihomo daemon.
//!
//! Built on [ratatui](https://ratatui.rs). Pages are navigable via number
//! keys (1-6): Nodes, Connections, Logs, Rules, Settings, and Help. The
//! connections and logs pages run the daemon's push streams while open.
//!
//! Logs are written to a file (default `/tmp/mihoctl-tui.log`) to avoid
//! corrupting the terminal UI.

mod app;
mod event;
mod screens;
mod theme;
mod tui;
mod ui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use mihoctl_config::Config;
use mihoctl_core::{Controller, SettingKey};

use crate::app::App;

/// Terminal dashboard for a mihomo proxy daemon.
#[derive(Parser, Debug)]
#[command(name = "mihoctl-tui", version, about)]
struct Cli {
    /// External controller address (overrides config)
    #[arg(short = 'a', long, env = "MIHOCTL_API_ADDRESS")]
    api_address: Option<String>,

    /// Controller secret (overrides config)
    #[arg(long, env = "MIHOCTL_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Log file path (defaults to /tmp/mihoctl-tui.log)
    #[arg(long, default_value = "/tmp/mihoctl-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr; that would
/// corrupt the TUI output. The returned guard flushes logs when dropped.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "mihoctl_tui={log_level},mihoctl_core={log_level},mihoctl_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("mihoctl-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Stored config with flag overrides. The first run without any config
/// walks through guided setup before the terminal switches modes.
fn load_config(cli: &Cli) -> Result<Config> {
    if cli.api_address.is_none() && !mihoctl_config::config_exists() {
        mihoctl_config::guided_init(&mihoctl_config::config_path())?;
    }

    let mut cfg = mihoctl_config::load_config()?;
    if let Some(address) = &cli.api_address {
        cfg.set(SettingKey::ApiAddress, address)?;
    }
    if let Some(secret) = &cli.secret {
        cfg.set(SettingKey::Secret, secret)?;
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let config = load_config(&cli)?;
    info!(address = %config.api_address, "starting mihoctl-tui");

    let (controller, events) = Controller::new(config.to_client_config()?)?;
    App::new(controller, events, config.entries()).run().await
}
