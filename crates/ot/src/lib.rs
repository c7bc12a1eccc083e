//! Operational-transform type over attributed text.
//!
//! [`AText`] adapts the changeset engine to the generic OT type contract:
//! `create`, `apply`, `compose`, `transform` and `invert`. Every input may be
//! either an engine value or its wire form. When any input arrives in wire
//! form the result is packed too, so callers get back what they send.

use atext_changeset::{Changeset, ChangesetError, Document, PackedChangeset, PackedDocument, Side};
use thiserror::Error;

/// Errors raised by the OT adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OtError {
	/// The engine refused the operation.
	#[error(transparent)]
	Changeset(#[from] ChangesetError),
}

/// Result type for OT operations.
pub type Result<T> = std::result::Result<T, OtError>;

/// Generic operational-transform type.
pub trait OtType {
	/// Short type name peers use to agree on the type.
	const NAME: &'static str;
	/// Globally unique type identifier.
	const URI: &'static str;

	type Snapshot;
	type Op;

	/// Creates a snapshot, optionally seeded with text.
	fn create(initial: Option<&str>) -> Result<Self::Snapshot>;
	/// Applies `op` to `snapshot`.
	fn apply(snapshot: Self::Snapshot, op: &Self::Op) -> Result<Self::Snapshot>;
	/// Combines `a` then `b` into one op.
	fn compose(a: &Self::Op, b: &Self::Op) -> Result<Self::Op>;
	/// Rebases `op` over the concurrent `other`.
	fn transform(op: &Self::Op, other: &Self::Op, side: Side) -> Result<Self::Op>;
	/// Returns the op that undoes `op`.
	fn invert(op: &Self::Op) -> Result<Self::Op>;
}

/// A changeset, unpacked or in wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
	Changeset(Changeset),
	Packed(PackedChangeset),
}

impl Operation {
	/// True for the wire form.
	pub fn is_packed(&self) -> bool {
		matches!(self, Self::Packed(_))
	}

	/// Engine form of this operation.
	pub fn to_changeset(&self) -> Result<Changeset> {
		match self {
			Self::Changeset(cs) => Ok(cs.clone()),
			Self::Packed(packed) => Ok(Changeset::unpack(packed)?),
		}
	}

	/// Wire form of this operation.
	pub fn to_packed(&self) -> Result<PackedChangeset> {
		match self {
			Self::Changeset(cs) => Ok(cs.pack()?),
			Self::Packed(packed) => Ok(packed.clone()),
		}
	}

	/// Wraps `cs`, packing it when `packed` is set.
	fn output(cs: Changeset, packed: bool) -> Result<Self> {
		if packed {
			Ok(Self::Packed(cs.pack()?))
		} else {
			Ok(Self::Changeset(cs))
		}
	}
}

impl From<Changeset> for Operation {
	fn from(cs: Changeset) -> Self {
		Self::Changeset(cs)
	}
}

impl From<PackedChangeset> for Operation {
	fn from(packed: PackedChangeset) -> Self {
		Self::Packed(packed)
	}
}

/// A document, unpacked or in storage form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
	Document(Document),
	Packed(PackedDocument),
}

impl Snapshot {
	/// Engine form of this snapshot.
	pub fn into_document(self) -> Document {
		match self {
			Self::Document(doc) => doc,
			Self::Packed(packed) => Document::unpack(packed),
		}
	}

	/// Storage form of this snapshot.
	pub fn into_packed(self) -> PackedDocument {
		match self {
			Self::Document(doc) => doc.pack(),
			Self::Packed(packed) => packed,
		}
	}
}

impl From<Document> for Snapshot {
	fn from(doc: Document) -> Self {
		Self::Document(doc)
	}
}

impl From<PackedDocument> for Snapshot {
	fn from(packed: PackedDocument) -> Self {
		Self::Packed(packed)
	}
}

/// The `atext` OT type.
#[derive(Debug, Clone, Copy, Default)]
pub struct AText;

impl OtType for AText {
	const NAME: &'static str = "atext";
	const URI: &'static str = "https://github.com/dmitryuv/atext-changeset";

	type Snapshot = Snapshot;
	type Op = Operation;

	fn create(initial: Option<&str>) -> Result<Snapshot> {
		Ok(Snapshot::Document(Document::from_text(initial.unwrap_or_default(), None)?))
	}

	/// Always returns an unpacked document.
	fn apply(snapshot: Snapshot, op: &Operation) -> Result<Snapshot> {
		let doc = op.to_changeset()?.apply_to(snapshot.into_document())?;
		Ok(Snapshot::Document(doc))
	}

	fn compose(a: &Operation, b: &Operation) -> Result<Operation> {
		let packed = a.is_packed() || b.is_packed();
		tracing::trace!(packed, "ot.compose");
		let cs = a.to_changeset()?.compose(&b.to_changeset()?)?;
		Operation::output(cs, packed)
	}

	fn transform(op: &Operation, other: &Operation, side: Side) -> Result<Operation> {
		let packed = op.is_packed() || other.is_packed();
		tracing::trace!(packed, %side, "ot.transform");
		let cs = op.to_changeset()?.transform(&other.to_changeset()?, side)?;
		Operation::output(cs, packed)
	}

	fn invert(op: &Operation) -> Result<Operation> {
		Operation::output(op.to_changeset()?.invert(), op.is_packed())
	}
}
