//! Lexer for the packed changeset grammar.
//!
//! ```text
//! changeset := "X:" <old:b36> ('>' | '<') <delta:b36> component* ('$' <text>)?
//! component := attrib* ('|' <lines:b36>)? opcode <chars:b36>
//! attrib    := ('*' | '^') <pool-index:b36>
//! opcode    := '+' | '-' | '='
//! ```

use crate::attributes::AttribOpcode;
use crate::component::Opcode;
use crate::error::{ChangesetError, Result};

/// Formats `n` in lowercase base 36.
pub fn to_base36(mut n: usize) -> String {
	const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
	if n == 0 {
		return "0".to_string();
	}
	let mut buf = Vec::new();
	while n > 0 {
		buf.push(DIGITS[n % 36]);
		n /= 36;
	}
	buf.reverse();
	buf.into_iter().map(char::from).collect()
}

/// Parses a lowercase base 36 number. Returns `None` on bad digits or overflow.
pub fn parse_base36(s: &str) -> Option<usize> {
	if s.is_empty() {
		return None;
	}
	s.bytes().try_fold(0usize, |acc, b| {
		let digit = base36_digit(b)?;
		acc.checked_mul(36)?.checked_add(digit)
	})
}

fn base36_digit(b: u8) -> Option<usize> {
	match b {
		b'0'..=b'9' => Some(usize::from(b - b'0')),
		b'a'..=b'z' => Some(usize::from(b - b'a') + 10),
		_ => None,
	}
}

/// Changeset header: old length and signed delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Header {
	pub old_len: usize,
	pub delta: isize,
}

/// A component as written on the wire, before pool and text resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawComponent {
	pub attribs: Vec<(AttribOpcode, usize)>,
	pub lines: usize,
	pub opcode: Opcode,
	pub chars: usize,
}

/// Byte-level cursor over packed ops.
pub(crate) struct Lexer<'a> {
	src: &'a [u8],
	pos: usize,
}

impl<'a> Lexer<'a> {
	pub fn new(src: &'a str) -> Self {
		Self {
			src: src.as_bytes(),
			pos: 0,
		}
	}

	pub fn offset(&self) -> usize {
		self.pos
	}

	pub fn is_at_end(&self) -> bool {
		self.pos >= self.src.len()
	}

	fn peek(&self) -> Option<u8> {
		self.src.get(self.pos).copied()
	}

	fn error(&self, reason: &'static str) -> ChangesetError {
		ChangesetError::Malformed {
			offset: self.pos,
			reason,
		}
	}

	fn expect(&mut self, byte: u8, reason: &'static str) -> Result<()> {
		if self.peek() == Some(byte) {
			self.pos += 1;
			Ok(())
		} else {
			Err(self.error(reason))
		}
	}

	fn number(&mut self) -> Result<usize> {
		let start = self.pos;
		while self.peek().and_then(base36_digit).is_some() {
			self.pos += 1;
		}
		let digits = std::str::from_utf8(&self.src[start..self.pos]).map_err(|_| self.error("expected base36 number"))?;
		parse_base36(digits).ok_or_else(|| ChangesetError::Malformed {
			offset: start,
			reason: "expected base36 number",
		})
	}

	/// Reads the `X:<old><sign><delta>` header.
	pub fn header(&mut self) -> Result<Header> {
		self.expect(b'X', "expected changeset header")?;
		self.expect(b':', "expected ':' after 'X'")?;
		let old_len = self.number()?;
		let positive = match self.peek() {
			Some(b'>') => true,
			Some(b'<') => false,
			_ => return Err(self.error("expected '>' or '<'")),
		};
		self.pos += 1;
		let magnitude = self.number()?;
		let magnitude = isize::try_from(magnitude).map_err(|_| self.error("length delta overflow"))?;
		Ok(Header {
			old_len,
			delta: if positive { magnitude } else { -magnitude },
		})
	}

	/// Reads a run of `*n`/`^n` attribute references.
	pub fn attribs(&mut self) -> Result<Vec<(AttribOpcode, usize)>> {
		let mut attribs = Vec::new();
		loop {
			let opcode = match self.peek() {
				Some(b'*') => AttribOpcode::Set,
				Some(b'^') => AttribOpcode::Remove,
				_ => return Ok(attribs),
			};
			self.pos += 1;
			attribs.push((opcode, self.number()?));
		}
	}

	/// Reads the next component, or `None` at end of input.
	pub fn component(&mut self) -> Result<Option<RawComponent>> {
		// '?' is a legacy no-op marker.
		while self.peek() == Some(b'?') {
			self.pos += 1;
		}
		if self.is_at_end() {
			return Ok(None);
		}
		let attribs = self.attribs()?;
		let lines = if self.peek() == Some(b'|') {
			self.pos += 1;
			self.number()?
		} else {
			0
		};
		let opcode = match self.peek() {
			Some(b'+') => Opcode::Insert,
			Some(b'-') => Opcode::Remove,
			Some(b'=') => Opcode::Keep,
			_ => return Err(self.error("expected opcode '+', '-' or '='")),
		};
		self.pos += 1;
		let chars = self.number()?;
		Ok(Some(RawComponent {
			attribs,
			lines,
			opcode,
			chars,
		}))
	}
}
