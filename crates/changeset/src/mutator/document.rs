use super::LineMutator;
use crate::component::OpComponent;
use crate::components::{ComponentList, check_len};
use crate::document::{Document, Line};
use crate::error::{ChangesetError, Result};
use crate::pool::AttributePool;
use crate::position::Position;

/// Multi-line editor over a document's line records.
///
/// Owns the document while open, so there is never more than one writer.
/// Single-line operations go to a lazily opened [`LineMutator`] for the
/// current line; multi-line operations splice whole line records. Storage is
/// unspecified after an error; drop the mutator.
#[derive(Debug)]
pub struct DocumentMutator {
	lines: Vec<Line>,
	pool: AttributePool,
	line: usize,
	current: Option<LineMutator>,
}

impl DocumentMutator {
	pub(crate) fn new(lines: Vec<Line>, pool: AttributePool) -> Self {
		Self {
			lines,
			pool,
			line: 0,
			current: None,
		}
	}

	/// Takes the open line mutator, or opens one for the current line.
	///
	/// Past the last line this is an empty line, which is appended on close
	/// if anything was written to it.
	fn open(&mut self) -> Result<LineMutator> {
		match self.current.take() {
			Some(current) => Ok(current),
			None => {
				let line = self.lines.get(self.line).cloned().unwrap_or_default();
				LineMutator::new(line, &self.pool)
			}
		}
	}

	fn current(&mut self) -> Result<&mut LineMutator> {
		let current = self.open()?;
		Ok(self.current.insert(current))
	}

	fn close_current(&mut self) -> Result<()> {
		let Some(current) = self.current.take() else {
			return Ok(());
		};
		let mutated = current.is_mutated();
		let line = current.finish(&mut self.pool)?;
		if let Some(slot) = self.lines.get_mut(self.line) {
			*slot = line;
		} else if mutated {
			self.lines.push(line);
		}
		Ok(())
	}

	fn next_line(&mut self) -> Result<()> {
		self.close_current()?;
		self.line += 1;
		Ok(())
	}

	fn check_lines(&self, lines: usize) -> Result<()> {
		let requested = self.line + lines;
		if requested > self.lines.len() {
			return Err(ChangesetError::LineOutOfRange {
				requested,
				available: self.lines.len(),
			});
		}
		Ok(())
	}

	/// Skips `chars` chars spanning `lines` newlines.
	///
	/// Whole lines are skipped by their stored length without parsing.
	pub fn skip(&mut self, chars: usize, lines: usize) -> Result<()> {
		if lines == 0 {
			return self.current()?.skip(chars);
		}
		self.check_lines(lines)?;
		let mut skipped = 0;
		let mut whole = lines;
		if let Some(current) = &self.current {
			skipped += current.remaining();
			self.next_line()?;
			whole -= 1;
		}
		let end = (self.line + whole).min(self.lines.len());
		skipped += self.lines[self.line.min(end)..end].iter().map(Line::char_len).sum::<usize>();
		self.line = end;
		if skipped != chars {
			return Err(ChangesetError::LengthMismatch {
				expected: chars,
				actual: skipped,
			});
		}
		Ok(())
	}

	/// Reads `chars` chars spanning `lines` newlines without changing anything.
	pub fn take(&mut self, chars: usize, lines: usize) -> Result<Vec<OpComponent>> {
		if lines == 0 {
			return self.current()?.take(chars);
		}
		self.check_lines(lines)?;
		let mut taken = Vec::new();
		for _ in 0..lines {
			taken.extend(self.current()?.take_remaining()?);
			self.next_line()?;
		}
		check_len(&taken, chars)?;
		Ok(taken)
	}

	/// Removes `chars` chars spanning `lines` newlines and returns them.
	///
	/// A multi-line removal takes the rest of the current line, drops the
	/// following `lines - 1` records and joins what is left of the line after
	/// that onto the current one. A current line left empty is dropped
	/// instead.
	pub fn remove(&mut self, chars: usize, lines: usize) -> Result<Vec<OpComponent>> {
		if lines == 0 {
			return self.current()?.remove(chars);
		}
		let mut current = self.open()?;
		let mut removed = current.remove(current.remaining())?;
		for index in self.line + 1..self.line + lines {
			let line = self.lines.get(index).ok_or(ChangesetError::LineOutOfRange {
				requested: index,
				available: self.lines.len(),
			})?;
			removed.extend(line.unpack(&self.pool)?);
		}

		let keep_current = current.length() > 0;
		let start = (self.line + usize::from(keep_current)).min(self.lines.len());
		let end = (start + lines).min(self.lines.len());
		let mut spliced: Vec<Line> = self.lines.drain(start..end).collect();
		let next = if spliced.len() == lines { spliced.pop() } else { None };
		if keep_current {
			if let Some(next) = next {
				for op in next.unpack(&self.pool)?.into_iter().rev() {
					current.inject(op)?;
				}
			}
			self.current = Some(current);
		}
		tracing::trace!(line = self.line, lines, dropped = end - start, "mutator.splice");

		check_len(&removed, chars)?;
		Ok(removed)
	}

	/// Inserts `op` at the cursor.
	///
	/// A multi-line insert is split per line. Inserting mid-line breaks the
	/// current line in two: the head gains the first inserted line, and the
	/// tail becomes a record after the inserted lines. The cursor ends up at
	/// the start of the line following the last inserted newline.
	pub fn insert(&mut self, op: &OpComponent) -> Result<()> {
		if op.lines == 0 {
			return self.current()?.insert(op.clone());
		}
		let mut op = op.clone();
		let added = op.lines;
		let mut current = self.open()?;
		let mut new_lines = Vec::with_capacity(added + 1);
		let mut replaced = 1;
		let mut tail = None;
		if current.position() != 0 || current.is_mutated() {
			let rest: ComponentList = current.remove(current.remaining())?.into_iter().collect();
			let (attribs, text) = rest.pack_line(&mut self.pool)?;
			if !attribs.is_empty() {
				tail = Some(Line { attribs, text });
			}
			current.insert(op.take_line())?;
			new_lines.push(current.finish(&mut self.pool)?);
		} else {
			replaced = 0;
		}
		while !op.is_empty() {
			new_lines.push(Line::from_components([op.take_line()], &mut self.pool)?);
		}
		new_lines.extend(tail);

		let start = self.line.min(self.lines.len());
		let end = (start + replaced).min(self.lines.len());
		tracing::trace!(line = self.line, inserted = new_lines.len(), replaced = end - start, "mutator.splice");
		self.lines.splice(start..end, new_lines);
		self.line += added;
		Ok(())
	}

	/// Applies a KEEP's attribute delta, line by line for multi-line KEEPs.
	pub fn apply_format(&mut self, op: &OpComponent) -> Result<()> {
		if op.lines == 0 {
			return self.current()?.apply_format(op);
		}
		let mut op = op.clone();
		let requested = op.chars;
		while !op.is_empty() {
			let current = self.current()?;
			let len = current.remaining();
			let mut part = op.clone();
			part.trim_right(len, 1)?;
			current.apply_format(&part)?;
			op.trim_left(len, 1)?;
			self.next_line()?;
		}
		if op.lines != 0 {
			return Err(ChangesetError::LengthMismatch {
				expected: requested,
				actual: requested - op.chars,
			});
		}
		Ok(())
	}

	/// Document length, counting pending edits on the open line.
	pub fn length(&self) -> usize {
		let stored: usize = self
			.lines
			.iter()
			.enumerate()
			.filter(|(index, _)| self.current.is_none() || *index != self.line)
			.map(|(_, line)| line.char_len())
			.sum();
		stored + self.current.as_ref().map_or(0, LineMutator::length)
	}

	/// Cursor as a (char, line) position.
	pub fn position(&self) -> Position {
		Position::new(self.current.as_ref().map_or(0, LineMutator::position), self.line)
	}

	/// Lines from the current one to the end, inclusive.
	pub fn remaining_lines(&self) -> usize {
		self.lines.len().saturating_sub(self.line)
	}

	/// Chars left on the current line.
	pub fn line_remaining(&mut self) -> Result<usize> {
		Ok(self.current()?.remaining())
	}

	/// Closes the open line and returns the edited document.
	pub fn finish(mut self) -> Result<Document> {
		self.close_current()?;
		Ok(Document::from_parts(self.lines, self.pool))
	}
}
