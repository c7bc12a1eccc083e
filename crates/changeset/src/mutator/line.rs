use crate::component::{OpComponent, Opcode};
use crate::components::{ComponentCursor, ComponentList, check_len};
use crate::document::Line;
use crate::error::{ChangesetError, Result};
use crate::pool::AttributePool;

/// Cursor-based editor for a single attributed line.
///
/// A line holds INSERT components only, with at most one newline, as its
/// final char. Content read with [`take`](Self::take) and content written
/// with [`insert`](Self::insert) is recorded in a replay list; removed content
/// is not. [`finish`](Self::finish) repacks the replay list when anything
/// changed.
#[derive(Debug, Clone)]
pub struct LineMutator {
	original: Line,
	source: ComponentCursor,
	current: Option<OpComponent>,
	replay: ComponentList,
	len: usize,
	pos: usize,
	mutated: bool,
	has_newline: bool,
}

impl LineMutator {
	/// Opens `line` for editing, decoding it against `pool`.
	pub fn new(line: Line, pool: &AttributePool) -> Result<Self> {
		let components = line.unpack(pool)?;
		Ok(Self {
			source: components.cursor(),
			current: None,
			replay: ComponentList::new(),
			len: line.char_len(),
			pos: 0,
			mutated: false,
			has_newline: line.text.contains('\n'),
			original: line,
		})
	}

	/// Chars consumed so far.
	pub fn position(&self) -> usize {
		self.pos
	}

	/// Chars left after the cursor.
	pub fn remaining(&self) -> usize {
		self.len.saturating_sub(self.pos)
	}

	/// Current line length, including pending edits.
	pub fn length(&self) -> usize {
		self.len
	}

	/// True once anything was removed, inserted or reformatted.
	pub fn is_mutated(&self) -> bool {
		self.mutated
	}

	/// Pulls `n` chars from the source, splitting the component under the
	/// cursor if needed.
	fn pull(&mut self, mut n: usize) -> Result<Vec<OpComponent>> {
		let mut taken = Vec::new();
		while n > 0 {
			let Some(current) = self.current.as_mut() else {
				self.current = Some(self.source.next().ok_or(ChangesetError::UnexpectedEnd)?);
				continue;
			};
			let single_line = current.lines == 0 || (current.lines == 1 && !self.source.has_next());
			if current.opcode != Opcode::Insert || !single_line {
				return Err(ChangesetError::NotAttributedString);
			}
			if current.chars <= n {
				n -= current.chars;
				taken.extend(self.current.take());
			} else {
				let mut head = current.clone();
				head.trim_right(n, 0)?;
				current.trim_left(n, 0)?;
				taken.push(head);
				n = 0;
			}
		}
		Ok(taken)
	}

	fn validate_insert(&mut self, op: &OpComponent) -> Result<()> {
		if op.opcode != Opcode::Insert {
			return Err(ChangesetError::BadInsertOpcode(op.opcode));
		}
		if op.lines > 0 {
			if op.lines != 1 || self.remaining() != 0 {
				return Err(ChangesetError::NewlineNotAtEnd);
			}
			if self.has_newline {
				return Err(ChangesetError::AlreadyHasNewline);
			}
			self.has_newline = true;
		}
		Ok(())
	}

	/// Reads `n` chars and advances past them.
	pub fn take(&mut self, n: usize) -> Result<Vec<OpComponent>> {
		let taken = self.pull(n)?;
		self.pos += n;
		self.replay.extend(taken.iter().cloned());
		Ok(taken)
	}

	/// Advances past `n` chars.
	pub fn skip(&mut self, n: usize) -> Result<()> {
		self.take(n).map(drop)
	}

	/// Reads everything after the cursor.
	pub fn take_remaining(&mut self) -> Result<Vec<OpComponent>> {
		self.take(self.remaining())
	}

	/// Removes `n` chars at the cursor and returns them.
	pub fn remove(&mut self, n: usize) -> Result<Vec<OpComponent>> {
		let removed = self.pull(n)?;
		self.mutated = true;
		self.len = self.len.saturating_sub(n);
		if removed.last().is_some_and(|op| op.lines > 0) {
			self.has_newline = false;
		}
		Ok(removed)
	}

	/// Inserts `op` at the cursor and advances past it.
	///
	/// A newline may only be inserted at the end of a line that has none.
	pub fn insert(&mut self, op: OpComponent) -> Result<()> {
		self.validate_insert(&op)?;
		self.mutated = true;
		self.len += op.chars;
		self.pos += op.chars;
		self.replay.push(op);
		Ok(())
	}

	/// Like [`insert`](Self::insert), but places `op` in front of the unread
	/// content without advancing. Used to join the next line's content.
	pub fn inject(&mut self, op: OpComponent) -> Result<()> {
		self.validate_insert(&op)?;
		self.mutated = true;
		self.len += op.chars;
		self.source.put_back(op);
		Ok(())
	}

	/// Applies the attribute delta of a KEEP over the next `op.chars` chars.
	pub fn apply_format(&mut self, op: &OpComponent) -> Result<()> {
		let fits = op.lines == 0 || (op.lines == 1 && op.chars == self.remaining());
		if op.opcode != Opcode::Keep || !fits {
			return Err(ChangesetError::BadFormat);
		}
		let removed = self.remove(op.chars)?;
		check_len(&removed, op.chars)?;
		for mut part in removed {
			part.compose_attributes(&op.attribs)?;
			self.insert(part)?;
		}
		Ok(())
	}

	/// Returns the line record. Unchanged lines come back as they were.
	pub fn finish(mut self, pool: &mut AttributePool) -> Result<Line> {
		if !self.mutated {
			return Ok(self.original);
		}
		self.take_remaining()?;
		let (attribs, text) = self.replay.pack_line(pool)?;
		Ok(Line { attribs, text })
	}
}

#[cfg(test)]
mod tests;
