//! # Log Server Example
//!
//! Starts a `Loggr` and writes one line through every entry point, which is a
//! quick way to look at the console colors and the resulting
//! `root/YYYY/MM/DD/` tree.
//!
//! ## Usage
//! ```text
//! server_log [--config loggr.json5] [--root ./logs] [--quiet] [--custom audit]
//! ```
//! Set `RUST_LOG=debug` to see the logger's own diagnostics (sink opens,
//! rotations) through `env_logger`.

use anyhow::{Context, Result};
use clap::Parser;
use lib_loggr::{Color, ConsoleStyle, Loggr, LoggrOptions, load_options};
use serde_json::json;
use std::path::PathBuf;

/// Command line flags.
#[derive(Parser, Debug)]
#[command(name = "server_log", about = "Writes sample lines through every loggr entry point")]
struct Args {
    /// JSON / JSON5 options file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log root, overrides the options file.
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Do not mirror lines to the console.
    #[arg(short, long)]
    quiet: bool,

    /// Extra custom severity to create and log under.
    #[arg(long, default_value = "audit")]
    custom: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut options = match &args.config {
        Some(path) => load_options(path)
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => LoggrOptions::default(),
    };
    if let Some(root) = args.root {
        options.root = root;
    }
    if args.quiet {
        options.console = false;
    }
    log::info!("Starting with {}", options);

    let loggr = Loggr::start(options).await;

    loggr.log("server_log started").await;
    loggr.debug(json!({"pid": std::process::id()})).await;
    loggr.info((json!({"a": 1}), "json")).await;
    loggr.notice("notice line").await;
    loggr.warning(("warning", json!({"disk": "85%"}), "pretty")).await;
    loggr.err("disk full").await;
    loggr.crit("critical line").await;
    loggr.alert("alert line").await;
    loggr.emerg("emergency line").await;

    loggr.recolor().info(ConsoleStyle::fg(Color::Black).on(Color::BrightGreen));
    loggr.info("recolored info").await;

    if loggr.create(&args.custom).await {
        loggr.custom(&args.custom, "custom severity line").await;
    }

    // A usage error: reported on the console, nothing written.
    loggr.log(()).await;

    if let Some(dir) = loggr.current_dir() {
        println!("Wrote {} sinks under {}", loggr.open_sinks().len(), dir.display());
    }
    Ok(())
}
