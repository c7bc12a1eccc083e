//! Attribute operations and the attribute-list algebra.
//!
//! An [`AttributeList`] is a delta over a set of `(key, value)` attributes:
//! each [`AttributeOp`] either sets or removes one pair. Lists are treated as
//! immutable values; every algebra operation returns a new list. Only
//! [`AttributeList::push`] mutates in place.

use std::fmt;

use smallvec::SmallVec;

use crate::codec::{Lexer, to_base36};
use crate::error::{ChangesetError, Result};
use crate::pool::AttributePool;

/// Attribute instruction kind.
///
/// Variant order is the packing order: removals sort before sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttribOpcode {
	/// Remove the pair (`^` on the wire).
	Remove,
	/// Set the pair (`*` on the wire).
	Set,
}

impl AttribOpcode {
	/// Wire symbol.
	pub const fn symbol(self) -> char {
		match self {
			Self::Remove => '^',
			Self::Set => '*',
		}
	}

	/// The opposite instruction.
	pub const fn inverted(self) -> Self {
		match self {
			Self::Remove => Self::Set,
			Self::Set => Self::Remove,
		}
	}
}

/// One atomic attribute instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeOp {
	/// Set or remove.
	pub opcode: AttribOpcode,
	/// Attribute key.
	pub key: String,
	/// Attribute value.
	pub value: String,
}

impl AttributeOp {
	/// Creates an op with an explicit opcode.
	pub fn new(opcode: AttribOpcode, key: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			opcode,
			key: key.into(),
			value: value.into(),
		}
	}

	/// Creates a SET op.
	pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
		Self::new(AttribOpcode::Set, key, value)
	}

	/// Creates a REMOVE op.
	pub fn remove(key: impl Into<String>, value: impl Into<String>) -> Self {
		Self::new(AttribOpcode::Remove, key, value)
	}

	/// Returns the op with SET and REMOVE swapped.
	pub fn inverted(&self) -> Self {
		Self::new(self.opcode.inverted(), self.key.clone(), self.value.clone())
	}

	/// True if `other` is this op with the opposite opcode.
	fn is_opposite(&self, other: &Self) -> bool {
		self.opcode != other.opcode && self.key == other.key && self.value == other.value
	}
}

impl fmt::Display for AttributeOp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}={}", self.opcode.symbol(), self.key, self.value)
	}
}

/// Unordered collection of attribute operations.
///
/// Equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct AttributeList {
	ops: SmallVec<[AttributeOp; 2]>,
}

impl AttributeList {
	/// Creates an empty list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a packed attribute string such as `^0*1a` against `pool`.
	pub fn unpack(packed: &str, pool: &AttributePool) -> Result<Self> {
		let mut lexer = Lexer::new(packed);
		let refs = lexer.attribs()?;
		if !lexer.is_at_end() {
			return Err(ChangesetError::Malformed {
				offset: lexer.offset(),
				reason: "expected attribute reference",
			});
		}
		Self::from_pool_refs(&refs, pool)
	}

	pub(crate) fn from_pool_refs(refs: &[(AttribOpcode, usize)], pool: &AttributePool) -> Result<Self> {
		refs.iter()
			.map(|&(opcode, index)| {
				let (key, value) = pool.get(index).ok_or(ChangesetError::MissingPoolEntry(index))?;
				Ok(AttributeOp::new(opcode, key, value))
			})
			.collect()
	}

	/// Appends an op.
	pub fn push(&mut self, op: AttributeOp) -> &mut Self {
		self.ops.push(op);
		self
	}

	/// Builder-style [`push`](Self::push).
	pub fn with(mut self, op: AttributeOp) -> Self {
		self.ops.push(op);
		self
	}

	/// Returns true if the list holds no ops.
	pub fn is_empty(&self) -> bool {
		self.ops.is_empty()
	}

	/// Number of ops.
	pub fn len(&self) -> usize {
		self.ops.len()
	}

	/// Iterates ops in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = &AttributeOp> {
		self.ops.iter()
	}

	/// Returns true if the exact op is present.
	pub fn contains(&self, op: &AttributeOp) -> bool {
		self.ops.contains(op)
	}

	/// Folds `other` into this list.
	///
	/// An op in `other` replaces an op with the same opcode and key but a
	/// different value; otherwise it is appended. Used to stamp authorship.
	pub fn merge(&self, other: &Self) -> Result<Self> {
		let mut ops = self.ops.clone();
		let base_len = ops.len();
		for new_op in &other.ops {
			let mut replaced = false;
			for op in ops[..base_len].iter_mut() {
				if op.opcode == new_op.opcode && op.key == new_op.key && op.value != new_op.value {
					*op = new_op.clone();
					replaced = true;
					break;
				}
				if op.is_opposite(new_op) {
					return Err(ChangesetError::MutualOps { key: new_op.key.clone() });
				}
			}
			if !replaced {
				ops.push(new_op.clone());
			}
		}
		Ok(Self { ops })
	}

	/// Combines two deltas.
	///
	/// Opposite ops cancel. With `is_composition` false the result is applied
	/// to concrete state, so removing an absent attribute is an error.
	pub fn compose(&self, other: &Self, is_composition: bool) -> Result<Self> {
		let mut base: SmallVec<[AttributeOp; 2]> = self.ops.clone();
		let mut appended: SmallVec<[AttributeOp; 2]> = SmallVec::new();
		for other_op in &other.ops {
			let mut opposite = None;
			for (i, op) in base.iter().enumerate() {
				if op == other_op {
					return Err(ChangesetError::DuplicateOperation {
						key: other_op.key.clone(),
					});
				}
				if op.is_opposite(other_op) {
					opposite = Some(i);
					break;
				}
			}
			if let Some(i) = opposite {
				base.remove(i);
			} else {
				if !is_composition && other_op.opcode == AttribOpcode::Remove {
					return Err(ChangesetError::RemoveNonExisting {
						key: other_op.key.clone(),
					});
				}
				appended.push(other_op.clone());
			}
		}
		base.extend(appended);
		Ok(Self { ops: base })
	}

	/// Rebases this delta over `other`, both issued against the same state.
	///
	/// Identical ops are dropped. Competing SETs of one key keep the
	/// lexically smaller value: the winner removes the loser's value first,
	/// the loser drops its SET.
	pub fn transform(&self, other: &Self) -> Result<Self> {
		let mut ops = SmallVec::new();
		for this_op in &self.ops {
			let mut skip = false;
			for other_op in &other.ops {
				if this_op == other_op {
					skip = true;
				} else if this_op.key == other_op.key
					&& this_op.opcode == other_op.opcode
					&& this_op.opcode == AttribOpcode::Set
				{
					if this_op.value < other_op.value {
						ops.push(AttributeOp::remove(other_op.key.clone(), other_op.value.clone()));
						ops.push(this_op.clone());
					}
					skip = true;
				} else if this_op.key == other_op.key
					&& (this_op.value == other_op.value || this_op.opcode == AttribOpcode::Remove)
				{
					return Err(ChangesetError::InvalidTransform {
						key: this_op.key.clone(),
					});
				}
				if skip {
					break;
				}
			}
			if !skip {
				ops.push(this_op.clone());
			}
		}
		Ok(Self { ops })
	}

	/// Computes the delta that applies `format` to this concrete state.
	///
	/// SETs already present are dropped, SETs over another value of the same
	/// key become a replacement, REMOVEs of absent pairs are dropped.
	pub fn format(&self, format: &Self) -> Self {
		let mut ops = SmallVec::new();
		for format_op in &format.ops {
			let mut handled = false;
			for op in &self.ops {
				if format_op.key == op.key && format_op.value == op.value {
					if format_op.opcode == AttribOpcode::Remove {
						ops.push(format_op.clone());
					}
					handled = true;
					break;
				}
				if format_op.key == op.key && format_op.opcode == AttribOpcode::Set {
					ops.push(AttributeOp::remove(op.key.clone(), op.value.clone()));
					ops.push(format_op.clone());
					handled = true;
					break;
				}
			}
			if !handled && format_op.opcode == AttribOpcode::Set {
				ops.push(format_op.clone());
			}
		}
		Self { ops }
	}

	/// Flips every op.
	pub fn invert(&self) -> Self {
		Self {
			ops: self.ops.iter().map(AttributeOp::inverted).collect(),
		}
	}

	/// Flips every op not present in `except`; those pass through unchanged.
	pub fn invert_except(&self, except: &Self) -> Self {
		Self {
			ops: self
				.ops
				.iter()
				.map(|op| if except.contains(op) { op.clone() } else { op.inverted() })
				.collect(),
		}
	}

	/// Serializes into `pool`, interning pairs as needed.
	///
	/// Output is sorted REMOVE before SET, then by ascending pool index. Two
	/// ops on one pool index, or more than one net SET or REMOVE per key, are
	/// rejected.
	pub fn pack(&self, pool: &mut AttributePool) -> Result<String> {
		let mut mapped: SmallVec<[(AttribOpcode, usize, &AttributeOp); 4]> = self
			.ops
			.iter()
			.map(|op| (op.opcode, pool.intern(&op.key, &op.value), op))
			.collect();
		mapped.sort_by_key(|&(opcode, index, _)| (opcode, index));

		let mut packed = String::new();
		let mut seen_indices: SmallVec<[usize; 4]> = SmallVec::new();
		let mut key_counts: SmallVec<[(&str, i32); 4]> = SmallVec::new();
		for (opcode, index, op) in mapped {
			if seen_indices.contains(&index) {
				return Err(ChangesetError::DuplicatePoolIndex { key: op.key.clone() });
			}
			seen_indices.push(index);

			let step = match opcode {
				AttribOpcode::Set => 1,
				AttribOpcode::Remove => -1,
			};
			let count = match key_counts.iter_mut().find(|(key, _)| *key == op.key) {
				Some((_, count)) => {
					*count += step;
					*count
				}
				None => {
					key_counts.push((op.key.as_str(), step));
					step
				}
			};
			if !(-1..=1).contains(&count) {
				return Err(ChangesetError::ConflictingKey { key: op.key.clone() });
			}

			packed.push(opcode.symbol());
			packed.push_str(&to_base36(index));
		}
		Ok(packed)
	}
}

impl PartialEq for AttributeList {
	fn eq(&self, other: &Self) -> bool {
		self.ops.len() == other.ops.len() && self.ops.iter().all(|op| other.ops.contains(op))
	}
}

impl Eq for AttributeList {}

impl FromIterator<AttributeOp> for AttributeList {
	fn from_iter<I: IntoIterator<Item = AttributeOp>>(iter: I) -> Self {
		Self {
			ops: iter.into_iter().collect(),
		}
	}
}

impl<'a> IntoIterator for &'a AttributeList {
	type Item = &'a AttributeOp;
	type IntoIter = std::slice::Iter<'a, AttributeOp>;

	fn into_iter(self) -> Self::IntoIter {
		self.ops.iter()
	}
}
