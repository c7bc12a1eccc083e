//! In-place editors for document storage.
//!
//! [`LineMutator`] edits one attributed line; [`DocumentMutator`] drives line
//! mutators across a whole document and handles multi-line operations by
//! splicing line records.

mod document;
mod line;

pub use document::DocumentMutator;
pub use line::LineMutator;
