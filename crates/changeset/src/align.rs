//! Lock-step alignment of two component streams.
//!
//! Compose and transform both walk two changesets side by side, slicing the
//! longer of two facing components so each step sees equal-length pieces, and
//! then decide a single output component for the pair. Only the split and
//! combine rules differ; they are the two [`Alignment`] variants.

use crate::attributes::AttributeList;
use crate::changeset::Side;
use crate::component::{OpComponent, Opcode};
use crate::components::ComponentList;
use crate::error::{ChangesetError, Result};

/// Rule set for [`zip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Alignment {
	/// `a` then `b`, applied in sequence.
	Compose,
	/// `a` rebased over the concurrent `b`.
	Transform(Side),
}

impl Alignment {
	fn needs_split(self, a: &OpComponent, b: &OpComponent) -> bool {
		match self {
			Self::Compose => {
				if a.opcode == Opcode::Remove || b.opcode == Opcode::Insert {
					return false;
				}
				a.opcode == Opcode::Keep
					|| b.opcode == Opcode::Keep
					|| (a.opcode != b.opcode && (a.opcode == Opcode::Remove || b.opcode == Opcode::Remove))
			}
			Self::Transform(_) => a.opcode != Opcode::Insert && b.opcode != Opcode::Insert,
		}
	}

	/// Consumes one or both sides and returns the output for this step.
	fn combine(self, a: &mut Option<OpComponent>, b: &mut Option<OpComponent>) -> Result<Option<OpComponent>> {
		match self {
			Self::Compose => compose_step(a, b),
			Self::Transform(side) => transform_step(a, b, side),
		}
	}
}

fn compose_step(a: &mut Option<OpComponent>, b: &mut Option<OpComponent>) -> Result<Option<OpComponent>> {
	let a_remove = a.as_ref().is_some_and(|a| a.opcode == Opcode::Remove);
	if a_remove || b.is_none() {
		return Ok(a.take());
	}
	let b_insert = b.as_ref().is_some_and(|b| b.opcode == Opcode::Insert);
	if b_insert || a.is_none() {
		return Ok(b.take());
	}
	let (Some(this), Some(other)) = (a.take(), b.take()) else {
		return Ok(None);
	};
	match other.opcode {
		Opcode::Remove => {
			// KEEPs carry no final attributes, so only inserted content is compared.
			if this.opcode == Opcode::Keep {
				let mut out = other;
				out.compose_attributes(&this.attribs.invert())?;
				Ok(Some(out))
			} else if this.matches(&other, true) {
				Ok(None)
			} else {
				tracing::debug!(removed = %other.text, inserted = %this.text, "changeset.compose.mismatch");
				Err(ChangesetError::ComposeRemoveMismatch)
			}
		}
		Opcode::Keep => {
			let mut out = this;
			out.compose_attributes(&other.attribs)?;
			Ok(Some(out))
		}
		Opcode::Insert => Ok(None),
	}
}

fn transform_step(a: &mut Option<OpComponent>, b: &mut Option<OpComponent>, side: Side) -> Result<Option<OpComponent>> {
	if let (Some(this), Some(other)) = (a.as_ref(), b.as_ref())
		&& (this.opcode == Opcode::Insert || other.opcode == Opcode::Insert)
	{
		let this_first = this.text.chars().next();
		let other_first = other.text.chars().next();
		let other_goes_first = if this.opcode != other.opcode {
			other.opcode == Opcode::Insert
		} else if this_first != other_first && (this_first == Some('\n') || other_first == Some('\n')) {
			// Inserts starting with a newline go last so lines are not split.
			other_first != Some('\n')
		} else {
			side == Side::Left
		};
		if other_goes_first {
			let out = OpComponent::keep(other.chars, other.lines, AttributeList::new());
			*b = None;
			return Ok(Some(out));
		}
		return Ok(a.take());
	}

	let this = a.take();
	let other = b.take();
	let Some(mut out) = this else {
		return Ok(None);
	};
	match other {
		Some(other) if other.opcode == Opcode::Remove => Ok(None),
		Some(other) => {
			match out.opcode {
				Opcode::Remove => {
					out.compose_attributes(&other.attribs)?;
				}
				Opcode::Keep => {
					out.transform_attributes(&other.attribs)?;
				}
				Opcode::Insert => {}
			}
			Ok(Some(out))
		}
		None => Ok(Some(out)),
	}
}

/// Pending component for one side: the current one, or a remainder left
/// over from a split, or the next from the stream.
fn pull(current: &mut Option<OpComponent>, remainder: &mut Option<OpComponent>, stream: &mut impl Iterator<Item = OpComponent>) {
	if current.is_none() {
		*current = remainder.take().or_else(|| stream.next());
	}
}

/// Walks `a` and `b` together under `alignment`.
pub(crate) fn zip(a: &ComponentList, b: &ComponentList, alignment: Alignment) -> Result<ComponentList> {
	let mut a_stream = a.iter().cloned();
	let mut b_stream = b.iter().cloned();
	let (mut a_op, mut a_rest) = (None, None);
	let (mut b_op, mut b_rest) = (None, None);
	let mut out = ComponentList::new();

	loop {
		pull(&mut a_op, &mut a_rest, &mut a_stream);
		pull(&mut b_op, &mut b_rest, &mut b_stream);
		if a_op.is_none() && b_op.is_none() {
			break;
		}

		if let (Some(this), Some(other)) = (a_op.as_mut(), b_op.as_mut())
			&& alignment.needs_split(this, other)
		{
			if this.chars > other.chars {
				let mut rest = this.clone();
				rest.trim_left(other.chars, other.lines)?;
				this.trim_right(other.chars, other.lines)?;
				a_rest = Some(rest);
			} else if this.chars < other.chars {
				let mut rest = other.clone();
				rest.trim_left(this.chars, this.lines)?;
				other.trim_right(this.chars, this.lines)?;
				b_rest = Some(rest);
			}
		}

		if let Some(op) = alignment.combine(&mut a_op, &mut b_op)? {
			out.push(op);
		}
	}
	Ok(out)
}
