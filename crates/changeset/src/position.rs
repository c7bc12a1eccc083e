use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A cursor location: char offset within a line, and line index.
///
/// Ordered by line first, then char. Line arithmetic follows changeset
/// semantics: adding or removing whole lines leaves the char offset alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
	pub ch: usize,
	pub line: usize,
}

impl Position {
	pub const fn new(ch: usize, line: usize) -> Self {
		Self { ch, line }
	}

	/// Moves down `lines` lines, or right `chars` chars when `lines` is zero.
	pub fn add(&mut self, chars: usize, lines: usize) -> &mut Self {
		if lines > 0 {
			self.line += lines;
		} else {
			self.ch += chars;
		}
		self
	}

	/// Like [`add`](Self::add), but crossing a line boundary resets the char
	/// offset to the start of the new line.
	pub fn advance(&mut self, chars: usize, lines: usize) -> &mut Self {
		self.add(chars, lines);
		if lines > 0 {
			self.ch = 0;
		}
		self
	}

	/// Inverse of [`add`](Self::add), saturating at zero.
	pub fn subtract(&mut self, chars: usize, lines: usize) -> &mut Self {
		if lines > 0 {
			self.line = self.line.saturating_sub(lines);
		} else {
			self.ch = self.ch.saturating_sub(chars);
		}
		self
	}
}

impl Ord for Position {
	fn cmp(&self, other: &Self) -> Ordering {
		(self.line, self.ch).cmp(&(other.line, other.ch))
	}
}

impl PartialOrd for Position {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}
