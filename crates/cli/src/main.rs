//! Marquee command-line demo.
//!
//! Searches the bundled `movies` and `actors` indices through the search
//! sequencer, paging with `load_more` and printing facets.

mod config;
mod render;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::search::SearchArgs;

/// Marquee command line arguments.
#[derive(Parser, Debug)]
#[command(name = "marquee", version)]
#[command(about = "Search the bundled movies and actors indices")]
struct Args {
	/// Configuration file
	#[arg(short, long, value_name = "PATH", global = true)]
	config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Run a query and print its hits
	Search(SearchArgs),
	/// Print the effective configuration as TOML
	Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let config = Config::load(args.config.as_deref())?;
	match args.command {
		Command::Search(search) => search::run(search, &config).await,
		Command::Config => {
			print!("{}", config.to_toml()?);
			Ok(())
		}
	}
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::fmt::format::FmtSpan;
	use tracing_subscriber::prelude::*;

	let filter = || {
		EnvFilter::try_from_env("MARQUEE_LOG").unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("marquee=debug,warn")
			} else {
				EnvFilter::new("marquee=info,warn")
			}
		})
	};

	if let Some(log_dir) = std::env::var("MARQUEE_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("marquee.{}.log", std::process::id()));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_span_events(FmtSpan::CLOSE)
				.with_target(true);

			tracing_subscriber::registry().with(filter()).with(file_layer).init();

			tracing::info!(path = ?log_path, "marquee tracing initialized");
			return;
		}
	}

	tracing_subscriber::fmt()
		.with_env_filter(filter())
		.with_writer(std::io::stderr)
		.init();
}
