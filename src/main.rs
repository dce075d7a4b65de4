mod config;
mod errors;
mod logging;
mod mcp;
mod remote;
mod server;
mod tools;


use crate::config::Config;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::{error, info};

const DEFAULT_CONFIG: &str = "learn-mcp.toml";

#[tokio::main]
async fn main() {
    logging::init();

    let outcome = tokio::select! {
        r = run() => r,
        sig = shutdown_signal() => {
            info!(signal = sig, "received signal, shutting down");
            std::process::exit(0);
        }
    };

    if let Err(e) = outcome {
        error!(error = %format!("{e:#}"), "fatal error running server");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cfg = resolve_config(&args)?;

    let registry = mcp::registry::ToolRegistry::new(&cfg).context("building tool registry")?;

    info!(
        name = %cfg.server.name,
        endpoint = %cfg.remote.endpoint,
        timeout_ms = cfg.remote.timeout_ms,
        tools = ?registry.list_names(),
        "running on stdio"
    );

    server::serve(server::AppState::new(cfg, registry)).await
}

/// Builds the validated config from CLI arguments (program name excluded).
fn resolve_config(args: &[String]) -> anyhow::Result<Config> {
    let mut config_path: Option<PathBuf> = None;
    let mut endpoint: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.get(i).context("--config requires a path")?;
                config_path = Some(PathBuf::from(path));
            }
            "--endpoint" => {
                i += 1;
                endpoint = Some(args.get(i).context("--endpoint requires a url")?.clone());
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
        i += 1;
    }

    let mut cfg = match config_path {
        Some(path) => Config::load(&path).with_context(|| format!("loading config {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG).is_file() => {
            Config::load(Path::new(DEFAULT_CONFIG)).context("loading config")?
        }
        None => Config::default(),
    };
    if let Some(endpoint) = endpoint {
        cfg.remote.endpoint = endpoint;
    }
    cfg.validate().context("validating config")?;
    Ok(cfg)
}

#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut term) => tokio::select! {
            Ok(()) = tokio::signal::ctrl_c() => "SIGINT",
            _ = term.recv() => "SIGTERM",
        },
        Err(e) => {
            error!(error = %e, "cannot install SIGTERM handler");
            wait_ctrl_c().await
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    wait_ctrl_c().await
}

// A failed handler registration must not look like a signal.
async fn wait_ctrl_c() -> &'static str {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    "SIGINT"
}
