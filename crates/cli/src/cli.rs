use std::path::PathBuf;

use atext_changeset::Side;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "atext")]
#[command(about = "Apply, compose and transform attributed text changesets")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Debug logging (overridden by ATEXT_LOG)
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Pretty-print JSON output
	#[arg(long, global = true)]
	pub pretty: bool,

	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
///
/// `DOC` and `OP` arguments are JSON files in wire form; `-` reads stdin.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Create a document from plain text
	Create {
		/// Initial text
		#[arg(long)]
		text: Option<String>,
	},
	/// Apply a changeset to a document
	Apply {
		#[arg(value_name = "DOC")]
		doc: PathBuf,
		#[arg(value_name = "OP")]
		op: PathBuf,
	},
	/// Compose two sequential changesets
	Compose {
		#[arg(value_name = "OP")]
		first: PathBuf,
		#[arg(value_name = "OP")]
		second: PathBuf,
	},
	/// Rebase a changeset over a concurrent one
	Transform {
		#[arg(value_name = "OP")]
		op: PathBuf,
		#[arg(value_name = "OTHER")]
		other: PathBuf,
		/// Tie-break side: left or right
		#[arg(long, default_value = "left")]
		side: Side,
	},
	/// Invert a changeset
	Invert {
		#[arg(value_name = "OP")]
		op: PathBuf,
	},
	/// Move a cursor position through a changeset
	Position {
		#[arg(value_name = "OP")]
		op: PathBuf,
		/// Char offset within the line
		#[arg(long, default_value_t = 0)]
		ch: usize,
		/// Line index
		#[arg(long, default_value_t = 0)]
		line: usize,
		/// Tie-break side: left or right
		#[arg(long, default_value = "left")]
		side: Side,
	},
}
