use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use atext_changeset::{Changeset, PackedChangeset, PackedDocument, Position};
use atext_ot::{AText, Operation, OtType, Snapshot};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cli::Command;

/// Reads and decodes a JSON input; `-` is stdin.
fn read_json<T: DeserializeOwned>(path: &Path, stdin: &mut bool) -> Result<T> {
	let raw = if path.as_os_str() == "-" {
		if std::mem::replace(stdin, true) {
			bail!("stdin can only be used for one input");
		}
		let mut raw = String::new();
		std::io::stdin().read_to_string(&mut raw).context("reading stdin")?;
		raw
	} else {
		std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
	};
	serde_json::from_str(&raw).with_context(|| format!("decoding {}", path.display()))
}

fn read_op(path: &Path, stdin: &mut bool) -> Result<Operation> {
	Ok(Operation::Packed(read_json::<PackedChangeset>(path, stdin)?))
}

fn packed_op(op: Operation) -> Result<Value> {
	Ok(serde_json::to_value(op.to_packed()?)?)
}

/// Runs `command` and returns its JSON output.
pub fn run(command: &Command) -> Result<Value> {
	let mut stdin = false;
	match command {
		Command::Create { text } => {
			let doc = AText::create(text.as_deref())?.into_packed();
			Ok(serde_json::to_value(doc)?)
		}
		Command::Apply { doc, op: op_path } => {
			let doc: PackedDocument = read_json(doc, &mut stdin)?;
			let op = read_op(op_path, &mut stdin)?;
			let applied = AText::apply(Snapshot::Packed(doc), &op)?.into_packed();
			tracing::debug!(lines = applied.lines.len(), "applied");
			Ok(serde_json::to_value(applied)?)
		}
		Command::Compose { first, second } => {
			let (first, second) = (read_op(first, &mut stdin)?, read_op(second, &mut stdin)?);
			packed_op(AText::compose(&first, &second)?)
		}
		Command::Transform { op: op_path, other, side } => {
			let (this, other) = (read_op(op_path, &mut stdin)?, read_op(other, &mut stdin)?);
			packed_op(AText::transform(&this, &other, *side)?)
		}
		Command::Invert { op: op_path } => packed_op(AText::invert(&read_op(op_path, &mut stdin)?)?),
		Command::Position {
			op: op_path,
			ch,
			line,
			side,
		} => {
			let packed: PackedChangeset = read_json(op_path, &mut stdin)?;
			let moved = Changeset::unpack(&packed)?.transform_position(Position::new(*ch, *line), *side);
			Ok(serde_json::to_value(moved)?)
		}
	}
}
