use crate::attributes::{AttributeList, AttributeOp};
use crate::changeset::Changeset;
use crate::component::{OpComponent, Opcode};
use crate::components::ComponentList;
use crate::document::Document;
use crate::error::Result;
use crate::mutator::DocumentMutator;

/// Attribute key stamped on every insert and format made by an author.
pub const AUTHOR_KEY: &str = "author";

/// Records a changeset by walking a document.
///
/// The builder reads a private copy of the document; the document itself is
/// left untouched. Every attribute-bearing operation is stamped with the
/// builder's author, replacing any author attribute the caller passed.
///
/// ```
/// # use atext_changeset::{Changeset, Document};
/// let doc = Document::from_text("hello\n", None)?;
/// let mut builder = Changeset::builder(&doc, Some("x"));
/// builder.keep(5, 0)?.insert(" world", None)?;
/// let cs = builder.finish()?;
/// assert_eq!(cs.apply_to(doc)?.text(), "hello world\n");
/// # Ok::<(), atext_changeset::ChangesetError>(())
/// ```
#[derive(Debug)]
pub struct Builder {
	ops: ComponentList,
	old_len: usize,
	cursor: DocumentMutator,
	author: AttributeList,
	author_id: Option<String>,
}

impl Builder {
	pub fn new(doc: &Document, author: Option<&str>) -> Self {
		let stamp = author
			.map(|id| AttributeList::new().with(AttributeOp::set(AUTHOR_KEY, id)))
			.unwrap_or_default();
		Self {
			ops: ComponentList::new(),
			old_len: doc.length(),
			cursor: doc.clone().mutate(),
			author: stamp,
			author_id: author.map(str::to_owned),
		}
	}

	/// Keeps `chars` chars spanning `lines` newlines unchanged.
	pub fn keep(&mut self, chars: usize, lines: usize) -> Result<&mut Self> {
		self.cursor.skip(chars, lines)?;
		self.ops.push(OpComponent::keep(chars, lines, AttributeList::new()));
		Ok(self)
	}

	/// Applies `attribs` to the next `chars` chars.
	///
	/// SETs already in place and REMOVEs of absent pairs are dropped per run.
	pub fn format(&mut self, chars: usize, lines: usize, attribs: &AttributeList) -> Result<&mut Self> {
		self.reformat(chars, lines, attribs, false)
	}

	/// Strips every attribute from the next `chars` chars, then stamps the
	/// author.
	pub fn remove_all_format(&mut self, chars: usize, lines: usize) -> Result<&mut Self> {
		self.reformat(chars, lines, &AttributeList::new(), true)
	}

	fn reformat(&mut self, chars: usize, lines: usize, attribs: &AttributeList, clear: bool) -> Result<&mut Self> {
		let attribs = attribs.merge(&self.author)?;
		for part in self.cursor.take(chars, lines)? {
			let mut keep = part.with_opcode(Opcode::Keep);
			if clear {
				keep.invert_attributes(&AttributeList::new())
					.compose_attributes(&attribs)?;
			} else {
				keep.format_attributes(&attribs);
			}
			self.ops.push(keep);
		}
		Ok(self)
	}

	/// Inserts `text` at the cursor.
	///
	/// Text up to the last newline becomes one multi-line INSERT and the rest
	/// an inline INSERT.
	pub fn insert(&mut self, text: &str, attribs: Option<&AttributeList>) -> Result<&mut Self> {
		let attribs = match attribs {
			Some(attribs) => attribs.merge(&self.author)?,
			None => self.author.clone(),
		};
		let (head, tail) = match text.rfind('\n') {
			Some(newline) => text.split_at(newline + 1),
			None => ("", text),
		};
		self.ops.push(OpComponent::insert(head, attribs.clone())?);
		self.ops.push(OpComponent::insert(tail, attribs)?);
		Ok(self)
	}

	/// Removes the next `chars` chars spanning `lines` newlines.
	pub fn remove(&mut self, chars: usize, lines: usize) -> Result<&mut Self> {
		for mut part in self.cursor.take(chars, lines)? {
			part.invert();
			self.ops.push(part);
		}
		Ok(self)
	}

	pub fn finish(self) -> Result<Changeset> {
		Changeset::new(self.ops, self.old_len, self.author_id)
	}
}
