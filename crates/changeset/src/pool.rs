use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

/// Append-only dictionary of `(key, value)` attribute pairs.
///
/// Packed attribute strings refer to pool entries by index, so entries are
/// never reordered or removed. [`Document::compact`](crate::Document::compact)
/// rebuilds a pool holding only referenced pairs.
///
/// Values are strings. On decode, boolean and number values written by
/// dynamically typed peers (`["bold", true]`) are read as their string form
/// (`"true"`) and are written back as strings. A peer comparing values by type
/// sees `"true"` and `true` as distinct pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributePool {
	#[serde(deserialize_with = "deserialize_entries")]
	entries: Vec<(String, String)>,
}

impl AttributePool {
	/// Creates an empty pool.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the pair stored at `index`.
	pub fn get(&self, index: usize) -> Option<(&str, &str)> {
		self.entries.get(index).map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Returns the index of `(key, value)`, appending it when absent.
	pub fn intern(&mut self, key: &str, value: &str) -> usize {
		if let Some(index) = self.position(key, value) {
			return index;
		}
		self.entries.push((key.to_string(), value.to_string()));
		self.entries.len() - 1
	}

	/// Returns the index of `(key, value)` without inserting.
	pub fn position(&self, key: &str, value: &str) -> Option<usize> {
		self.entries.iter().position(|(k, v)| k == key && v == value)
	}

	/// Number of pairs in the pool.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if the pool holds no pairs.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates pairs in index order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributePool {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
		}
	}
}

fn deserialize_entries<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
	D: Deserializer<'de>,
{
	let entries = Vec::<(String, ScalarValue)>::deserialize(deserializer)?;
	Ok(entries.into_iter().map(|(key, ScalarValue(value))| (key, value)).collect())
}

/// A pool value read from a string, boolean or number.
struct ScalarValue(String);

impl<'de> Deserialize<'de> for ScalarValue {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserializer.deserialize_any(ScalarVisitor)
	}
}

struct ScalarVisitor;

impl<'de> Visitor<'de> for ScalarVisitor {
	type Value = ScalarValue;

	fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
		formatter.write_str("a string, boolean or number attribute value")
	}

	fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
		Ok(ScalarValue(value.to_owned()))
	}

	fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
		Ok(ScalarValue(value))
	}

	fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
		Ok(ScalarValue(value.to_string()))
	}

	fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
		Ok(ScalarValue(value.to_string()))
	}

	fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
		Ok(ScalarValue(value.to_string()))
	}

	fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
		Ok(ScalarValue(value.to_string()))
	}
}
