//! `atext` command-line tool.
//!
//! Reads documents and changesets in their JSON wire forms, runs one
//! operation and prints the JSON result on stdout.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let output = commands::run(&cli.command)?;
	let rendered = if cli.pretty {
		serde_json::to_string_pretty(&output)?
	} else {
		serde_json::to_string(&output)?
	};
	println!("{rendered}");
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("ATEXT_LOG").unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("atext=debug,atext_changeset=debug,atext_ot=debug")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();
}
