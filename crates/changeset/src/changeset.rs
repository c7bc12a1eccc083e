//! Versioned edit scripts and their algebra.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::align::{Alignment, zip};
use crate::builder::Builder;
use crate::codec::{Lexer, to_base36};
use crate::component::{OpComponent, Opcode};
use crate::components::ComponentList;
use crate::document::Document;
use crate::error::{ChangesetError, ParseSideError, Result};
use crate::pool::AttributePool;
use crate::position::Position;
use crate::wire::PackedChangeset;

/// Tie-break for concurrent inserts at the same position.
///
/// `Left` treats the other changeset as applied first, as a server does when
/// rebasing an incoming changeset over one it already committed. `Right`
/// treats this changeset as applied first, as the originating client does
/// when rebasing the server's changeset over its own pending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
	Left,
	Right,
}

impl FromStr for Side {
	type Err = ParseSideError;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s {
			"left" => Ok(Self::Left),
			"right" => Ok(Self::Right),
			other => Err(ParseSideError(other.to_string())),
		}
	}
}

impl fmt::Display for Side {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Left => "left",
			Self::Right => "right",
		})
	}
}

fn shifted(old_len: usize, delta: isize) -> Result<usize> {
	old_len
		.checked_add_signed(delta)
		.ok_or(ChangesetError::LengthUnderflow { old_len, delta })
}

/// An edit script over a document of known length.
///
/// Components are kept in canonical order (REMOVEs before INSERTs between
/// KEEPs). A trailing KEEP is implicit: ops may cover less than `old_len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changeset {
	ops: ComponentList,
	old_len: usize,
	new_len: usize,
	author: Option<String>,
}

impl Changeset {
	/// Creates a changeset, deriving `new_len` from the ops.
	pub fn new(mut ops: ComponentList, old_len: usize, author: Option<String>) -> Result<Self> {
		ops.reorder();
		let new_len = shifted(old_len, ops.delta_len())?;
		Ok(Self {
			ops,
			old_len,
			new_len,
			author,
		})
	}

	pub(crate) fn from_parts(mut ops: ComponentList, old_len: usize, new_len: usize, author: Option<String>) -> Self {
		ops.reorder();
		Self {
			ops,
			old_len,
			new_len,
			author,
		}
	}

	/// Starts recording a changeset against `doc`.
	pub fn builder(doc: &Document, author: Option<&str>) -> Builder {
		Builder::new(doc, author)
	}

	/// Parses the wire form. Lengths are taken from the header as declared.
	pub fn unpack(packed: &PackedChangeset) -> Result<Self> {
		let (ops, text) = packed.op.split_once('$').unwrap_or((packed.op.as_str(), ""));
		let mut lexer = Lexer::new(ops);
		let header = lexer.header()?;
		let ops = ComponentList::unpack_from(&mut lexer, text, &packed.pool)?;
		let new_len = shifted(header.old_len, header.delta)?;
		Ok(Self::from_parts(ops, header.old_len, new_len, packed.author.clone()))
	}

	/// Packs against a fresh pool.
	pub fn pack(&self) -> Result<PackedChangeset> {
		let mut pool = AttributePool::new();
		let op = self.pack_into(&mut pool)?;
		Ok(PackedChangeset {
			op,
			pool,
			author: self.author.clone(),
		})
	}

	/// Packs against `pool`, interning any missing pairs, and returns the op
	/// string.
	///
	/// # Errors
	/// [`ChangesetError::DeltaMismatch`] if the ops disagree with the lengths.
	pub fn pack_into(&self, pool: &mut AttributePool) -> Result<String> {
		let packed = self.ops.pack(pool)?;
		let declared = self.new_len as isize - self.old_len as isize;
		if declared != packed.delta_len {
			return Err(ChangesetError::DeltaMismatch {
				declared,
				actual: packed.delta_len,
			});
		}
		let sign = if packed.delta_len >= 0 { '>' } else { '<' };
		let mut op = format!(
			"X:{}{sign}{}{}",
			to_base36(self.old_len),
			to_base36(packed.delta_len.unsigned_abs()),
			packed.ops
		);
		if !packed.text.is_empty() {
			op.push('$');
			op.push_str(&packed.text);
		}
		Ok(op)
	}

	/// Length of the document this changeset applies to.
	pub fn old_len(&self) -> usize {
		self.old_len
	}

	/// Length of the document after applying.
	pub fn new_len(&self) -> usize {
		self.new_len
	}

	/// Author id, if any.
	pub fn author(&self) -> Option<&str> {
		self.author.as_deref()
	}

	/// Components in canonical order.
	pub fn ops(&self) -> &ComponentList {
		&self.ops
	}

	/// Replays the changeset on `doc`.
	///
	/// Removed content is checked against the recorded REMOVEs, so a stale
	/// changeset fails with [`ChangesetError::RemovedMismatch`]. On error the
	/// document is lost.
	pub fn apply_to(&self, doc: Document) -> Result<Document> {
		tracing::trace!(old_len = self.old_len, new_len = self.new_len, ops = self.ops.len(), "changeset.apply");
		let mut mutator = doc.mutate();
		for op in &self.ops {
			if op.is_empty() {
				continue;
			}
			match op.opcode {
				Opcode::Insert => mutator.insert(op)?,
				Opcode::Remove => {
					let mut removed = OpComponent::empty();
					for part in mutator.remove(op.chars, op.lines)? {
						removed.append(&part).map_err(|_| ChangesetError::RemovedMismatch)?;
					}
					if !removed.matches(op, true) {
						tracing::debug!(expected = %op.text, actual = %removed.text, "changeset.apply.mismatch");
						return Err(ChangesetError::RemovedMismatch);
					}
				}
				Opcode::Keep if op.attribs.is_empty() => mutator.skip(op.chars, op.lines)?,
				Opcode::Keep => mutator.apply_format(op)?,
			}
		}
		let doc = mutator.finish()?;
		let actual = doc.length();
		if actual != self.new_len {
			tracing::debug!(expected = self.new_len, actual, "changeset.apply.length");
			return Err(ChangesetError::FinalLengthMismatch {
				expected: self.new_len,
				actual,
			});
		}
		Ok(doc)
	}

	/// Sequential combination: applying the result equals applying `self`
	/// then `other`.
	pub fn compose(&self, other: &Self) -> Result<Self> {
		if self.new_len != other.old_len {
			tracing::debug!(new_len = self.new_len, old_len = other.old_len, "changeset.compose.refused");
			return Err(ChangesetError::NotComposable {
				new_len: self.new_len,
				old_len: other.old_len,
			});
		}
		tracing::trace!(left = self.ops.len(), right = other.ops.len(), "changeset.compose");
		let ops = zip(&self.ops, &other.ops, Alignment::Compose)?;
		Ok(Self::from_parts(ops, self.old_len, other.new_len, self.author.clone()))
	}

	/// Rebases `self` so it applies after the concurrent `other`.
	///
	/// For concurrent `a` and `b`, applying `a` then `b.transform(a, Right)`
	/// converges with applying `b` then `a.transform(b, Left)`.
	pub fn transform(&self, other: &Self, side: Side) -> Result<Self> {
		if self.old_len != other.old_len {
			tracing::debug!(left = self.old_len, right = other.old_len, "changeset.transform.refused");
			return Err(ChangesetError::NotTransformable {
				left: self.old_len,
				right: other.old_len,
			});
		}
		tracing::trace!(%side, left = self.ops.len(), right = other.ops.len(), "changeset.transform");
		let ops = zip(&self.ops, &other.ops, Alignment::Transform(side))?;
		let new_len = shifted(other.new_len, ops.delta_len())?;
		Ok(Self::from_parts(ops, other.new_len, new_len, self.author.clone()))
	}

	/// The changeset that undoes `self`.
	pub fn invert(&self) -> Self {
		let mut ops = self.ops.clone();
		ops.invert();
		Self::from_parts(ops, self.new_len, self.old_len, self.author.clone())
	}

	/// Projects a cursor position through the changeset.
	///
	/// An insert exactly at `pos` pushes it forward only for [`Side::Right`].
	/// A removal spanning `pos` collapses it to the removal's start.
	pub fn transform_position(&self, pos: Position, side: Side) -> Position {
		let mut res = pos;
		let mut cursor = Position::default();
		for op in &self.ops {
			match op.opcode {
				Opcode::Insert => {
					if cursor < res || (cursor == res && side == Side::Right) {
						if op.lines > 0 && res.line == cursor.line {
							res.subtract(cursor.ch, 0).add(0, op.lines);
						} else {
							res.add(op.chars, op.lines);
						}
					}
					cursor.advance(op.chars, op.lines);
				}
				Opcode::Remove => {
					let mut end = cursor;
					end.advance(op.chars, op.lines);
					let in_range = cursor < res && res < end;
					if in_range {
						res = cursor;
					} else if cursor < res {
						// A multi-line removal can join the position's line onto the cursor's.
						if op.lines > 0 && cursor.line + op.lines == res.line {
							res.add(cursor.ch, 0);
							res.line = cursor.line;
						} else {
							res.subtract(op.chars, op.lines);
						}
					}
				}
				Opcode::Keep => {
					cursor.advance(op.chars, op.lines);
				}
			}
			if res < cursor {
				break;
			}
		}
		res
	}
}

#[cfg(test)]
mod tests;
