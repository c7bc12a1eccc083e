//! A single run of document content within a changeset.

use std::fmt;

use crate::attributes::AttributeList;
use crate::codec::to_base36;
use crate::error::{ChangesetError, Result};
use crate::pool::AttributePool;

/// Component instruction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
	/// Insert literal text (`+`).
	Insert,
	/// Remove literal text (`-`).
	Remove,
	/// Keep existing text, optionally reformatting it (`=`).
	Keep,
}

impl Opcode {
	/// Wire symbol.
	pub const fn symbol(self) -> char {
		match self {
			Self::Insert => '+',
			Self::Remove => '-',
			Self::Keep => '=',
		}
	}
}

impl fmt::Display for Opcode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.symbol())
	}
}

/// Byte offset of the `n`th char, clamped to the end of `text`.
fn char_offset(text: &str, n: usize) -> usize {
	text.char_indices().nth(n).map_or(text.len(), |(i, _)| i)
}

/// Packed form of a component or component list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedOps {
	/// Attribute/opcode stream, e.g. `*0|1+6`.
	pub ops: String,
	/// Concatenated INSERT/REMOVE text.
	pub text: String,
	/// Net length change.
	pub delta_len: isize,
}

/// One run-length encoded instruction.
///
/// `chars` counts Unicode scalar values and `lines` counts the embedded
/// newlines. INSERT and REMOVE carry their literal text; KEEP never does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpComponent {
	pub(crate) opcode: Opcode,
	pub(crate) chars: usize,
	pub(crate) lines: usize,
	pub(crate) attribs: AttributeList,
	pub(crate) text: String,
}

impl OpComponent {
	/// Creates a component, validating the text against the counts.
	///
	/// # Errors
	/// - [`ChangesetError::MultilineWithoutNewline`] if `lines > 0` and the text
	///   of an INSERT or REMOVE does not end with `'\n'`.
	/// - [`ChangesetError::TextLengthMismatch`] if an INSERT or REMOVE text is
	///   not exactly `chars` long.
	pub fn new(
		opcode: Opcode,
		chars: usize,
		lines: usize,
		attribs: AttributeList,
		text: impl Into<String>,
	) -> Result<Self> {
		let mut text = text.into();
		match opcode {
			Opcode::Insert | Opcode::Remove => {
				if lines > 0 && !text.ends_with('\n') {
					return Err(ChangesetError::MultilineWithoutNewline);
				}
				let actual = text.chars().count();
				if actual != chars {
					return Err(ChangesetError::TextLengthMismatch { expected: chars, actual });
				}
			}
			Opcode::Keep => text.clear(),
		}
		Ok(Self {
			opcode,
			chars,
			lines,
			attribs,
			text,
		})
	}

	/// A KEEP of `chars`/`lines`.
	pub fn keep(chars: usize, lines: usize, attribs: AttributeList) -> Self {
		Self {
			opcode: Opcode::Keep,
			chars,
			lines,
			attribs,
			text: String::new(),
		}
	}

	/// An INSERT of `text`, deriving the counts from it.
	pub fn insert(text: impl Into<String>, attribs: AttributeList) -> Result<Self> {
		let text = text.into();
		let chars = text.chars().count();
		let lines = text.matches('\n').count();
		Self::new(Opcode::Insert, chars, lines, attribs, text)
	}

	/// A zero-length placeholder that absorbs whatever is appended first.
	pub fn empty() -> Self {
		Self::keep(0, 0, AttributeList::new())
	}

	/// Instruction kind.
	pub fn opcode(&self) -> Opcode {
		self.opcode
	}

	/// Length in chars.
	pub fn chars(&self) -> usize {
		self.chars
	}

	/// Number of newlines covered.
	pub fn lines(&self) -> usize {
		self.lines
	}

	/// Attribute delta (KEEP) or attribute state (INSERT, REMOVE).
	pub fn attribs(&self) -> &AttributeList {
		&self.attribs
	}

	/// Literal text; empty for KEEP.
	pub fn text(&self) -> &str {
		&self.text
	}

	/// True for zero-length components, which are no-ops everywhere.
	pub fn is_empty(&self) -> bool {
		self.chars == 0
	}

	/// Clone with a different opcode. Text is dropped when the result is KEEP.
	pub fn with_opcode(&self, opcode: Opcode) -> Self {
		let mut op = self.clone();
		op.opcode = opcode;
		if opcode == Opcode::Keep {
			op.text.clear();
		}
		op
	}

	/// Swaps INSERT and REMOVE; a KEEP inverts its attributes instead.
	pub fn invert(&mut self) -> &mut Self {
		match self.opcode {
			Opcode::Insert => self.opcode = Opcode::Remove,
			Opcode::Remove => self.opcode = Opcode::Insert,
			Opcode::Keep => self.attribs = self.attribs.invert(),
		}
		self
	}

	fn check_trim(&self, chars: usize, lines: usize) -> Result<()> {
		if self.chars < chars || self.lines < lines {
			return Err(ChangesetError::TrimOutOfRange {
				chars: self.chars,
				lines: self.lines,
				requested_chars: chars,
				requested_lines: lines,
			});
		}
		Ok(())
	}

	/// Drops the first `chars`/`lines` of this component.
	pub fn trim_left(&mut self, chars: usize, lines: usize) -> Result<&mut Self> {
		self.check_trim(chars, lines)?;
		self.chars -= chars;
		self.lines -= lines;
		let at = char_offset(&self.text, chars);
		self.text.drain(..at);
		Ok(self)
	}

	/// Keeps only the first `chars`/`lines` of this component.
	pub fn trim_right(&mut self, chars: usize, lines: usize) -> Result<&mut Self> {
		self.check_trim(chars, lines)?;
		self.chars = chars;
		self.lines = lines;
		let at = char_offset(&self.text, chars);
		self.text.truncate(at);
		Ok(self)
	}

	/// Extends this run with `other`.
	///
	/// Empty `other` is ignored. An empty `self` adopts `other`'s opcode and
	/// attributes; otherwise both must agree.
	pub fn append(&mut self, other: &Self) -> Result<&mut Self> {
		if other.is_empty() {
			return Ok(self);
		}
		if self.is_empty() {
			self.opcode = other.opcode;
			self.attribs = other.attribs.clone();
		} else if self.opcode != other.opcode || self.attribs != other.attribs {
			return Err(ChangesetError::AppendMismatch);
		}
		self.chars += other.chars;
		self.lines += other.lines;
		self.text.push_str(&other.text);
		Ok(self)
	}

	/// Structural comparison.
	///
	/// With `ignore_opcode`, opcodes are not compared and neither is text when
	/// either side is a KEEP.
	pub fn matches(&self, other: &Self, ignore_opcode: bool) -> bool {
		let skip_text = ignore_opcode && (self.opcode == Opcode::Keep || other.opcode == Opcode::Keep);
		(ignore_opcode || self.opcode == other.opcode)
			&& self.chars == other.chars
			&& self.lines == other.lines
			&& (skip_text || self.text == other.text)
			&& self.attribs == other.attribs
	}

	/// Splits off the leading line, up to and including the first newline.
	///
	/// Single-line components are taken whole and `self` is left empty.
	pub fn take_line(&mut self) -> Self {
		let mut line = self.clone();
		let newline = if self.lines > 0 { self.text.find('\n') } else { None };
		match newline {
			Some(byte) => {
				let chars = self.text[..byte].chars().count() + 1;
				line.chars = chars;
				line.lines = 1;
				line.text.truncate(byte + 1);
				self.chars -= chars;
				self.lines -= 1;
				self.text.drain(..=byte);
			}
			None => *self = Self::empty(),
		}
		line
	}

	/// Net length change: `+chars` for INSERT, `-chars` for REMOVE.
	pub fn delta_len(&self) -> isize {
		let chars = self.chars as isize;
		match self.opcode {
			Opcode::Insert => chars,
			Opcode::Remove => -chars,
			Opcode::Keep => 0,
		}
	}

	/// Serializes as `<attribs>[|<lines>]<opcode><chars>` plus text.
	pub fn pack(&self, pool: &mut AttributePool) -> Result<PackedOps> {
		if self.is_empty() {
			return Ok(PackedOps::default());
		}
		let mut ops = self.attribs.pack(pool)?;
		if self.lines > 0 {
			ops.push('|');
			ops.push_str(&to_base36(self.lines));
		}
		ops.push(self.opcode.symbol());
		ops.push_str(&to_base36(self.chars));
		Ok(PackedOps {
			ops,
			text: self.text.clone(),
			delta_len: self.delta_len(),
		})
	}

	/// Composes `other` onto the attributes.
	///
	/// KEEPs compose algebraically; INSERT/REMOVE hold concrete state, so
	/// removing an absent attribute fails.
	pub fn compose_attributes(&mut self, other: &AttributeList) -> Result<&mut Self> {
		self.attribs = self.attribs.compose(other, self.opcode == Opcode::Keep)?;
		Ok(self)
	}

	/// Rebases the attributes over a concurrent delta.
	pub fn transform_attributes(&mut self, other: &AttributeList) -> Result<&mut Self> {
		self.attribs = self.attribs.transform(other)?;
		Ok(self)
	}

	/// Replaces the attributes with the delta that applies `format` to them.
	pub fn format_attributes(&mut self, format: &AttributeList) -> &mut Self {
		self.attribs = self.attribs.format(format);
		self
	}

	/// Flips every attribute op not in `except`.
	pub fn invert_attributes(&mut self, except: &AttributeList) -> &mut Self {
		self.attribs = self.attribs.invert_except(except);
		self
	}
}

#[cfg(test)]
mod tests;
