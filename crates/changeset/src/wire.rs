//! Serialized forms exchanged with storage and peers.

use serde::{Deserialize, Serialize};

use crate::document::Line;
use crate::pool::AttributePool;

/// A changeset on the wire: `{"op": "X:...", "p": [[k, v], ...], "u": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedChangeset {
	/// `X:<old><'>'|'<'><delta><ops>['$'<text>]`.
	pub op: String,
	/// Pool the op string's attribute indices refer to.
	#[serde(rename = "p", default)]
	pub pool: AttributePool,
	/// Author id.
	#[serde(rename = "u", default, skip_serializing_if = "Option::is_none")]
	pub author: Option<String>,
}

impl PackedChangeset {
	pub fn new(op: impl Into<String>, pool: AttributePool) -> Self {
		Self {
			op: op.into(),
			pool,
			author: None,
		}
	}

	pub fn with_author(mut self, author: impl Into<String>) -> Self {
		self.author = Some(author.into());
		self
	}
}

/// A document in storage: `{"lines": [{"a": ..., "s": ...}], "pool": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedDocument {
	pub lines: Vec<Line>,
	#[serde(default)]
	pub pool: AttributePool,
}
