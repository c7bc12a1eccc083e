use serde::{Deserialize, Serialize};

use crate::builder::Builder;
use crate::component::OpComponent;
use crate::components::ComponentList;
use crate::error::Result;
use crate::mutator::DocumentMutator;
use crate::pool::AttributePool;
use crate::wire::PackedDocument;

/// One stored line: packed attribute ops and the line's text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
	/// Packed INSERT components, e.g. `*0+1|1+3`.
	#[serde(rename = "a")]
	pub attribs: String,
	/// Line text, including the trailing newline if any.
	#[serde(rename = "s")]
	pub text: String,
}

impl Line {
	pub fn new(attribs: impl Into<String>, text: impl Into<String>) -> Self {
		Self {
			attribs: attribs.into(),
			text: text.into(),
		}
	}

	/// Packs `components` into a line record.
	pub fn from_components(
		components: impl IntoIterator<Item = OpComponent>,
		pool: &mut AttributePool,
	) -> Result<Self> {
		let (attribs, text) = components.into_iter().collect::<ComponentList>().pack_line(pool)?;
		Ok(Self { attribs, text })
	}

	/// Length in chars.
	pub fn char_len(&self) -> usize {
		self.text.chars().count()
	}

	/// Decodes the line into INSERT components against `pool`.
	pub fn unpack(&self, pool: &AttributePool) -> Result<ComponentList> {
		ComponentList::unpack(&self.attribs, &self.text, pool)
	}
}

/// Attributed text: line records plus the pool their attributes refer to.
///
/// Edits go through [`Document::mutate`], which consumes the document, or
/// through [`Changeset::apply_to`](crate::Changeset::apply_to).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
	lines: Vec<Line>,
	pool: AttributePool,
}

impl Document {
	/// Creates an empty document.
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn from_parts(lines: Vec<Line>, pool: AttributePool) -> Self {
		Self { lines, pool }
	}

	/// Builds a document holding `text`, attributed to `author` if given.
	pub fn from_text(text: &str, author: Option<&str>) -> Result<Self> {
		let doc = Self::new();
		if text.is_empty() {
			return Ok(doc);
		}
		let mut builder = Builder::new(&doc, author);
		builder.insert(text, None)?;
		builder.finish()?.apply_to(doc)
	}

	/// Restores a document from its storage form.
	pub fn unpack(packed: PackedDocument) -> Self {
		Self::from_parts(packed.lines, packed.pool)
	}

	/// Storage form.
	///
	/// One trailing empty line is dropped, so an empty document and a document
	/// holding a single empty line pack the same. A document without lines
	/// packs with an empty pool.
	pub fn pack(mut self) -> PackedDocument {
		if self.lines.last().is_some_and(|line| line.text.is_empty()) {
			self.lines.pop();
		}
		if self.lines.is_empty() {
			self.pool = AttributePool::new();
		}
		PackedDocument {
			lines: self.lines,
			pool: self.pool,
		}
	}

	/// Length in chars, newlines included.
	pub fn length(&self) -> usize {
		self.lines.iter().map(Line::char_len).sum()
	}

	/// Number of line records.
	pub fn line_count(&self) -> usize {
		self.lines.len()
	}

	/// Line records in order.
	pub fn lines(&self) -> &[Line] {
		&self.lines
	}

	/// Pool the line records refer to.
	pub fn pool(&self) -> &AttributePool {
		&self.pool
	}

	/// Lines `start..=end`, clamped to the document.
	pub fn range(&self, start: usize, end: usize) -> &[Line] {
		let end = end.saturating_add(1).min(self.lines.len());
		&self.lines[start.min(end)..end]
	}

	/// Plain text content.
	pub fn text(&self) -> String {
		self.lines.iter().map(|line| line.text.as_str()).collect()
	}

	/// Repacks every line into a fresh pool holding only referenced pairs.
	pub fn compact(&self) -> Result<Self> {
		let mut pool = AttributePool::new();
		let lines = self
			.lines
			.iter()
			.map(|line| {
				let (attribs, text) = line.unpack(&self.pool)?.pack_line(&mut pool)?;
				Ok(Line { attribs, text })
			})
			.collect::<Result<Vec<_>>>()?;
		tracing::debug!(before = self.pool.len(), after = pool.len(), "document.compact");
		Ok(Self { lines, pool })
	}

	/// Opens the document for editing.
	pub fn mutate(self) -> DocumentMutator {
		DocumentMutator::new(self.lines, self.pool)
	}
}
