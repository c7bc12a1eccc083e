//! Error types for changeset operations.

use thiserror::Error;

use crate::component::Opcode;

/// Structural failures raised by the changeset engine.
///
/// Every variant is fatal for the operation that raised it. Errors raised
/// while a [`DocumentMutator`](crate::DocumentMutator) is open leave the
/// mutated document in an unspecified state; discard it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangesetError {
	/// `merge` met a SET and a REMOVE of the same key and value.
	#[error("cannot merge mutual ops on key {key:?}, use compose or format instead")]
	MutualOps {
		/// Attribute key.
		key: String,
	},

	/// `compose` met the same attribute operation on both sides.
	#[error("duplicate operation: trying to compose identical attribute ops on key {key:?}")]
	DuplicateOperation {
		/// Attribute key.
		key: String,
	},

	/// Applying a REMOVE of an attribute that is not present.
	#[error("trying to remove non-existing attribute {key:?}")]
	RemoveNonExisting {
		/// Attribute key.
		key: String,
	},

	/// Concurrent attribute deltas that cannot both be honored.
	#[error("invalid operation for transform on key {key:?}")]
	InvalidTransform {
		/// Attribute key.
		key: String,
	},

	/// A pool index appears twice in one attribute list.
	#[error("multiple operations on the same attrib key: {key:?}")]
	DuplicatePoolIndex {
		/// Attribute key.
		key: String,
	},

	/// More than one net SET or REMOVE for one key.
	#[error("multiple insertions or deletions of attribute with key: {key:?}")]
	ConflictingKey {
		/// Attribute key.
		key: String,
	},

	/// A packed attribute references an index missing from the pool.
	#[error("attribute not found in the pool: {0}")]
	MissingPoolEntry(usize),

	/// A multi-line component whose text does not end with a newline.
	#[error("for multiline components text should end with newline")]
	MultilineWithoutNewline,

	/// Text length disagrees with the component's char count.
	#[error("text length should match chars in operation: expected {expected}, got {actual}")]
	TextLengthMismatch {
		/// Chars declared by the component.
		expected: usize,
		/// Chars actually present.
		actual: usize,
	},

	/// A trim asked for more than the component holds.
	#[error("component is too short to trim: has {chars}/{lines}, requested {requested_chars}/{requested_lines}")]
	TrimOutOfRange {
		/// Component chars.
		chars: usize,
		/// Component lines.
		lines: usize,
		/// Requested chars.
		requested_chars: usize,
		/// Requested lines.
		requested_lines: usize,
	},

	/// Appending components with different opcodes or attributes.
	#[error("cannot append component with different attributes or opcode")]
	AppendMismatch,

	/// A line record contains something other than single-line inserts.
	#[error("cannot iterate over non-attributed-string")]
	NotAttributedString,

	/// Reading past the end of a line.
	#[error("unexpected end of attributed string")]
	UnexpectedEnd,

	/// Only INSERT components may be inserted into a line.
	#[error("bad opcode for insertion: {0}")]
	BadInsertOpcode(Opcode),

	/// A newline inserted anywhere but at the end of a line.
	#[error("single newline is accepted only at the end of the string")]
	NewlineNotAtEnd,

	/// Inserting a second newline into one line.
	#[error("attributed string already has a newline")]
	AlreadyHasNewline,

	/// A format component that is not a KEEP or does not fit the line.
	#[error("bad format component")]
	BadFormat,

	/// A multi-line operation runs past the last line.
	#[error("line position {requested} became greater than lines count {available}")]
	LineOutOfRange {
		/// Line index requested.
		requested: usize,
		/// Lines in the document.
		available: usize,
	},

	/// The chars touched by a multi-line op disagree with the op.
	#[error("{expected} chars requested but {actual} chars found in multiline op")]
	LengthMismatch {
		/// Chars declared by the operation.
		expected: usize,
		/// Chars actually found.
		actual: usize,
	},

	/// Removed document content differs from the changeset's record.
	#[error("actual does not match removed")]
	RemovedMismatch,

	/// Composition removes content that the first changeset did not produce.
	#[error("removed in composition does not match original")]
	ComposeRemoveMismatch,

	/// The document length after apply disagrees with the changeset.
	#[error("final document length {actual} does not match expected {expected}")]
	FinalLengthMismatch {
		/// The changeset's `new_len`.
		expected: usize,
		/// The document's length after apply.
		actual: usize,
	},

	/// `compose` with `self.new_len != other.old_len`.
	#[error("changesets from different document versions are not composable: {new_len} != {old_len}")]
	NotComposable {
		/// Length produced by the first changeset.
		new_len: usize,
		/// Length expected by the second changeset.
		old_len: usize,
	},

	/// `transform` with different `old_len`s.
	#[error("changesets from different document versions cannot be transformed: {left} != {right}")]
	NotTransformable {
		/// `old_len` of the changeset being transformed.
		left: usize,
		/// `old_len` of the other changeset.
		right: usize,
	},

	/// The declared length delta disagrees with the ops.
	#[error("changeset internal state broken: declared delta {declared}, ops delta {actual}")]
	DeltaMismatch {
		/// `new_len - old_len`.
		declared: isize,
		/// Sum of op deltas.
		actual: isize,
	},

	/// Lengths that would fall below zero.
	#[error("changeset length underflow: {old_len} {delta:+}")]
	LengthUnderflow {
		/// Starting length.
		old_len: usize,
		/// Applied delta.
		delta: isize,
	},

	/// The wire text could not be parsed.
	#[error("malformed changeset at offset {offset}: {reason}")]
	Malformed {
		/// Byte offset of the failure.
		offset: usize,
		/// What the lexer expected.
		reason: &'static str,
	},
}

/// Result type for changeset operations.
pub type Result<T> = std::result::Result<T, ChangesetError>;

/// A side name other than `left` or `right`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("side should be 'left' or 'right', got {0:?}")]
pub struct ParseSideError(pub String);
