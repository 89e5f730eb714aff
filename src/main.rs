// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;

use html_validator::config::Config;
use html_validator::lint::ValidationFinding;
use html_validator::proxy::{self, Forward};
use html_validator::validator::Validator;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "html-validator", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reverse proxy that validates the HTML an upstream application serves
    Serve {
        /// Listen address, e.g. 127.0.0.1:3000
        #[arg(long)]
        listen: Option<String>,

        /// Upstream application base URI, e.g. http://127.0.0.1:8080
        #[arg(long)]
        upstream: Option<String>,

        /// Optional config TOML path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory searched for .htmlValidate.json
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Validate a single HTML file
    Check {
        file: PathBuf,

        /// Write the diagnostic page here when validation fails
        #[arg(long)]
        page: Option<PathBuf>,

        /// Optional config TOML path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory searched for .htmlValidate.json
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

async fn load_config(path: Option<&Path>, root: Option<PathBuf>) -> anyhow::Result<Config> {
    let mut cfg = match path {
        Some(p) => Config::load_from_path(p).await?,
        None => Config::default(),
    };
    if root.is_some() {
        cfg.general.root = root;
    }
    Ok(cfg)
}

fn format_finding(file: &str, f: &ValidationFinding) -> String {
    format!("{}:{}:{}: {} [{}]", file, f.line, f.column, f.message, f.rule)
}

/// Validate `file`, print its findings and return whether it passed.
async fn run_check(cfg: &Config, file: &Path, page: Option<&Path>) -> anyhow::Result<bool> {
    let validator = Validator::from_options(&cfg.options, &cfg.project_root()?)?;
    let markup = tokio::fs::read_to_string(file).await?;
    let report = validator.report(&markup)?;

    let name = file.display().to_string();
    for f in &report.findings {
        println!("{}", format_finding(&name, f));
    }

    if !report.valid {
        if let Some(out) = page {
            let html = validator.render_failure(&markup, &report.findings)?;
            tokio::fs::write(out, html).await?;
            info!(page = %out.display(), "wrote diagnostic page");
        }
    }
    Ok(report.valid)
}

async fn run_serve(cfg: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = cfg.general.listen.parse()?;
    let upstream = cfg.general.upstream.as_deref().ok_or_else(|| {
        anyhow::anyhow!("an upstream is required (--upstream or [general] upstream)")
    })?;

    let validator = Arc::new(Validator::from_options(&cfg.options, &cfg.project_root()?)?);
    let forward = Forward::new(upstream)?;

    let server = proxy::run_proxy(addr, forward, validator);

    tokio::select! {
        res = server => {
            if let Err(e) = res {
                error!(%e, "server error");
                return Err(e);
            }
        }
        _ = signal::ctrl_c() => {
            info!("shutting down");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            listen,
            upstream,
            config,
            root,
        } => {
            let mut cfg = load_config(config.as_deref(), root).await?;
            if let Some(listen) = listen {
                cfg.general.listen = listen;
            }
            if upstream.is_some() {
                cfg.general.upstream = upstream;
            }
            run_serve(cfg).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check {
            file,
            page,
            config,
            root,
        } => {
            let cfg = load_config(config.as_deref(), root).await?;
            if run_check(&cfg, &file, page.as_deref()).await? {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(1))
            }
        }
    }
}
