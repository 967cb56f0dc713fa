//! Multi-valued form data

use indexmap::IndexMap;
use indexmap::map::Entry;

/// An ordered multi-valued string map, the shape form handling code expects
///
/// Keys keep their first insertion position.
///
/// # Examples
///
/// ```
/// use dynamic_response_core::parsers::QueryDict;
///
/// let mut form = QueryDict::new();
/// form.append("tags", "1");
/// form.append("tags", "2");
/// form.set("title", "Hi");
///
/// assert_eq!(form.get("tags"), Some("2"));
/// assert_eq!(form.get_list("tags"), &["1", "2"]);
/// assert_eq!(form.get("title"), Some("Hi"));
/// assert_eq!(form.get("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDict {
	entries: IndexMap<String, Vec<String>>,
}

impl QueryDict {
	pub fn new() -> Self {
		Self::default()
	}

	/// Last value stored under `key`
	pub fn get(&self, key: &str) -> Option<&str> {
		self.entries
			.get(key)
			.and_then(|values| values.last())
			.map(String::as_str)
	}

	/// Every value stored under `key` (empty when absent)
	pub fn get_list(&self, key: &str) -> &[String] {
		self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Replace the values of `key` with a single value
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.entries.insert(key.into(), vec![value.into()]);
	}

	/// Add a value to `key`, keeping the existing ones
	pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
		match self.entries.entry(key.into()) {
			Entry::Occupied(mut entry) => entry.get_mut().push(value.into()),
			Entry::Vacant(entry) => {
				entry.insert(vec![value.into()]);
			}
		}
	}

	/// Append every value of `other`
	pub fn update(&mut self, other: QueryDict) {
		for (key, values) in other.entries {
			for value in values {
				self.append(key.clone(), value);
			}
		}
	}

	pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
		self.entries.shift_remove(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	/// `(key, last value)` pairs
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries.iter().filter_map(|(key, values)| {
			values.last().map(|value| (key.as_str(), value.as_str()))
		})
	}

	/// `(key, value)` pairs, one per stored value
	pub fn iter_lists(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries.iter().flat_map(|(key, values)| {
			values.iter().map(move |value| (key.as_str(), value.as_str()))
		})
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryDict {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut dict = QueryDict::new();
		for (key, value) in iter {
			dict.append(key, value);
		}
		dict
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_set_replaces_all_values() {
		let mut form: QueryDict = [("a", "1"), ("a", "2")].into_iter().collect();
		form.set("a", "3");
		assert_eq!(form.get_list("a"), &["3"]);
	}

	#[rstest]
	fn test_update_appends() {
		let mut form: QueryDict = [("a", "1")].into_iter().collect();
		form.update([("a", "2"), ("b", "x")].into_iter().collect());
		assert_eq!(form.get_list("a"), &["1", "2"]);
		assert_eq!(form.keys().collect::<Vec<_>>(), vec!["a", "b"]);
	}

	#[rstest]
	fn test_iteration() {
		let form: QueryDict = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
		assert_eq!(form.iter().collect::<Vec<_>>(), vec![("a", "3"), ("b", "2")]);
		assert_eq!(form.iter_lists().count(), 3);
		assert_eq!(form.len(), 2);
	}

	#[rstest]
	fn test_remove() {
		let mut form: QueryDict = [("a", "1"), ("b", "2")].into_iter().collect();
		assert_eq!(form.remove("a"), Some(vec!["1".to_string()]));
		assert!(!form.contains_key("a"));
		assert!(form.get_list("a").is_empty());
	}
}
