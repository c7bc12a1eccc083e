//! Changeset engine for collaboratively edited attributed text.
//!
//! A [`Document`] is a list of attributed lines plus an [`AttributePool`].
//! A [`Changeset`] is a run-length encoded edit script over a document of
//! known length, with the usual operational-transform algebra:
//! [`apply_to`](Changeset::apply_to), [`compose`](Changeset::compose),
//! [`transform`](Changeset::transform), [`invert`](Changeset::invert) and
//! [`transform_position`](Changeset::transform_position).
//!
//! ```
//! use atext_changeset::{Changeset, Document, Side};
//!
//! let doc = Document::from_text("abc\n", None)?;
//!
//! let mut a = Changeset::builder(&doc, Some("alice"));
//! a.insert("X", None)?;
//! let a = a.finish()?;
//!
//! let mut b = Changeset::builder(&doc, Some("bob"));
//! b.keep(3, 0)?.insert("Y", None)?;
//! let b = b.finish()?;
//!
//! let left = b.transform(&a, Side::Right)?.apply_to(a.apply_to(doc.clone())?)?;
//! let right = a.transform(&b, Side::Left)?.apply_to(b.apply_to(doc)?)?;
//! assert_eq!(left.text(), "XabcY\n");
//! assert_eq!(left.text(), right.text());
//! # Ok::<(), atext_changeset::ChangesetError>(())
//! ```

mod align;
/// Attribute operations and the attribute-list algebra.
pub mod attributes;
/// Changeset recording against a document.
pub mod builder;
/// Changesets and the side tie-break.
pub mod changeset;
mod codec;
/// Single components.
pub mod component;
/// Component sequences.
pub mod components;
/// Attributed documents and line records.
pub mod document;
/// Error types.
pub mod error;
/// Line and document editors.
pub mod mutator;
/// Attribute pool.
pub mod pool;
/// Cursor positions.
pub mod position;
/// Wire types.
pub mod wire;

pub use attributes::{AttribOpcode, AttributeList, AttributeOp};
pub use builder::{AUTHOR_KEY, Builder};
pub use changeset::{Changeset, Side};
pub use codec::{parse_base36, to_base36};
pub use component::{OpComponent, Opcode, PackedOps};
pub use components::{ComponentCursor, ComponentList};
pub use document::{Document, Line};
pub use error::{ChangesetError, ParseSideError, Result};
pub use mutator::{DocumentMutator, LineMutator};
pub use pool::AttributePool;
pub use position::Position;
pub use wire::{PackedChangeset, PackedDocument};
