//! Ordered component sequences and their packed form.

use std::collections::VecDeque;

use crate::attributes::AttributeList;
use crate::codec::Lexer;
use crate::component::{OpComponent, Opcode, PackedOps};
use crate::error::{ChangesetError, Result};
use crate::pool::AttributePool;

/// Ordered sequence of non-empty [`OpComponent`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentList {
	items: Vec<OpComponent>,
}

impl ComponentList {
	/// Creates an empty list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses packed ops against a text bank.
	///
	/// INSERT and REMOVE components consume their `chars` from `text` in
	/// order; KEEPs consume nothing.
	pub fn unpack(ops: &str, text: &str, pool: &AttributePool) -> Result<Self> {
		Self::unpack_from(&mut Lexer::new(ops), text, pool)
	}

	pub(crate) fn unpack_from(lexer: &mut Lexer<'_>, text: &str, pool: &AttributePool) -> Result<Self> {
		let mut bank = text.chars();
		let mut list = Self::new();
		while let Some(raw) = lexer.component()? {
			let attribs = AttributeList::from_pool_refs(&raw.attribs, pool)?;
			let text: String = match raw.opcode {
				Opcode::Keep => String::new(),
				Opcode::Insert | Opcode::Remove => bank.by_ref().take(raw.chars).collect(),
			};
			list.push(OpComponent::new(raw.opcode, raw.chars, raw.lines, attribs, text)?);
		}
		Ok(list)
	}

	/// Appends `op`; zero-length components are dropped.
	pub fn push(&mut self, op: OpComponent) -> &mut Self {
		if !op.is_empty() {
			self.items.push(op);
		}
		self
	}

	/// Appends every op, dropping zero-length ones.
	pub fn extend(&mut self, ops: impl IntoIterator<Item = OpComponent>) -> &mut Self {
		for op in ops {
			self.push(op);
		}
		self
	}

	/// Number of components.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Returns true if the list holds no components.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Iterates components in order.
	pub fn iter(&self) -> std::slice::Iter<'_, OpComponent> {
		self.items.iter()
	}

	/// Owned cursor over a copy of the list.
	pub fn cursor(&self) -> ComponentCursor {
		ComponentCursor::new(self.items.iter().cloned())
	}

	/// Inverts every component in place.
	pub fn invert(&mut self) -> &mut Self {
		for op in &mut self.items {
			op.invert();
		}
		self
	}

	/// Net length change of all components.
	pub fn delta_len(&self) -> isize {
		self.items.iter().map(OpComponent::delta_len).sum()
	}

	/// Total chars covered, regardless of opcode.
	pub fn char_len(&self) -> usize {
		self.items.iter().map(OpComponent::chars).sum()
	}

	/// Canonical order: within each run of non-KEEP components, all REMOVEs
	/// precede all INSERTs. KEEPs stay where they are.
	pub fn reorder(&mut self) -> &mut Self {
		self.items = regroup(std::mem::take(&mut self.items), |op| op.opcode);
		self
	}

	/// Merges neighbours in canonical order and serializes into `pool`.
	///
	/// Adjacent components with equal opcode and attributes merge. Inline runs
	/// that follow a multi-line run are buffered and fold into it when another
	/// multi-line run arrives, so `a\n` `b` `c\n` packs as one component. A
	/// trailing KEEP without attributes is implicit and dropped.
	pub fn pack(&self, pool: &mut AttributePool) -> Result<PackedOps> {
		let mut packer = Packer::default();
		for op in regroup(&self.items, |op| op.opcode) {
			packer.append(op, pool)?;
		}
		packer.finish(pool)
	}

	/// Packed `(ops, text)` pair as stored in a line record.
	pub fn pack_line(&self, pool: &mut AttributePool) -> Result<(String, String)> {
		let packed = self.pack(pool)?;
		Ok((packed.ops, packed.text))
	}
}

/// Moves REMOVEs ahead of INSERTs inside every run between KEEPs.
fn regroup<T>(items: impl IntoIterator<Item = T>, opcode: impl Fn(&T) -> Opcode) -> Vec<T> {
	let items = items.into_iter();
	let mut ordered = Vec::with_capacity(items.size_hint().0);
	let mut removes = Vec::new();
	let mut inserts = Vec::new();
	for item in items {
		match opcode(&item) {
			Opcode::Keep => {
				ordered.append(&mut removes);
				ordered.append(&mut inserts);
				ordered.push(item);
			}
			Opcode::Remove => removes.push(item),
			Opcode::Insert => inserts.push(item),
		}
	}
	ordered.append(&mut removes);
	ordered.append(&mut inserts);
	ordered
}

impl FromIterator<OpComponent> for ComponentList {
	fn from_iter<I: IntoIterator<Item = OpComponent>>(iter: I) -> Self {
		let mut list = Self::new();
		list.extend(iter);
		list
	}
}

impl IntoIterator for ComponentList {
	type Item = OpComponent;
	type IntoIter = std::vec::IntoIter<OpComponent>;

	fn into_iter(self) -> Self::IntoIter {
		self.items.into_iter()
	}
}

impl<'a> IntoIterator for &'a ComponentList {
	type Item = &'a OpComponent;
	type IntoIter = std::slice::Iter<'a, OpComponent>;

	fn into_iter(self) -> Self::IntoIter {
		self.items.iter()
	}
}

/// Merge buffers for [`ComponentList::pack`].
#[derive(Default)]
struct Packer {
	out: PackedOps,
	last: Option<OpComponent>,
	inner: Option<OpComponent>,
}

impl Packer {
	fn append(&mut self, op: &OpComponent, pool: &mut AttributePool) -> Result<()> {
		let Some(last) = self.last.as_mut().filter(|last| last.opcode == op.opcode && last.attribs == op.attribs)
		else {
			self.flush(pool)?;
			self.last = Some(op.clone());
			return Ok(());
		};
		if op.lines > 0 {
			if let Some(inner) = self.inner.take() {
				last.append(&inner)?;
			}
			last.append(op)?;
		} else if last.lines == 0 {
			last.append(op)?;
		} else {
			match self.inner.as_mut() {
				Some(inner) => {
					inner.append(op)?;
				}
				None => self.inner = Some(op.clone()),
			}
		}
		Ok(())
	}

	fn emit(&mut self, op: &OpComponent, pool: &mut AttributePool) -> Result<()> {
		let packed = op.pack(pool)?;
		self.out.ops.push_str(&packed.ops);
		self.out.text.push_str(&packed.text);
		self.out.delta_len += packed.delta_len;
		Ok(())
	}

	fn flush(&mut self, pool: &mut AttributePool) -> Result<()> {
		if let Some(last) = self.last.take() {
			self.emit(&last, pool)?;
			if let Some(inner) = self.inner.take() {
				self.emit(&inner, pool)?;
			}
		}
		Ok(())
	}

	fn finish(mut self, pool: &mut AttributePool) -> Result<PackedOps> {
		let implicit_keep = self
			.last
			.as_ref()
			.is_some_and(|last| last.opcode == Opcode::Keep && last.attribs.is_empty());
		if !implicit_keep {
			self.flush(pool)?;
		}
		Ok(self.out)
	}
}

/// Owned cursor over components with push-back.
#[derive(Debug, Clone, Default)]
pub struct ComponentCursor {
	items: VecDeque<OpComponent>,
}

impl ComponentCursor {
	/// Creates a cursor over `items`.
	pub fn new(items: impl IntoIterator<Item = OpComponent>) -> Self {
		Self {
			items: items.into_iter().collect(),
		}
	}

	/// Returns `op` to the front; it is yielded next.
	pub fn put_back(&mut self, op: OpComponent) {
		self.items.push_front(op);
	}

	/// Returns true while components remain.
	pub fn has_next(&self) -> bool {
		!self.items.is_empty()
	}

	/// Drains the rest into a list.
	pub fn collect_rest(&mut self) -> ComponentList {
		self.items.drain(..).collect()
	}
}

impl Iterator for ComponentCursor {
	type Item = OpComponent;

	fn next(&mut self) -> Option<Self::Item> {
		self.items.pop_front()
	}
}

/// Sums `chars` across `ops` and checks it against `expected`.
pub(crate) fn check_len(ops: &[OpComponent], expected: usize) -> Result<()> {
	let actual = ops.iter().map(OpComponent::chars).sum();
	if actual != expected {
		return Err(ChangesetError::LengthMismatch { expected, actual });
	}
	Ok(())
}
