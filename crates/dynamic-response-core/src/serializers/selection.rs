//! Field selections
//!
//! A [`FieldSelection`] names the members to emit for a model: plain field,
//! relation or accessor names, and `(relation, selection)` pairs for nested
//! sub-selection. Specs are kept in insertion order and de-duplicated by
//! name, so each one is consumed at most once.

/// Fields a sensitive identity is always restricted to
pub const SENSITIVE_IDENTITY_FIELDS: [&str; 3] = ["id", "email", "first_name"];

/// A single entry of a [`FieldSelection`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
	/// A field, relation or computed accessor name
	Name(String),
	/// A relation paired with the selection applied to its members
	Nested(String, FieldSelection),
}

impl FieldSpec {
	pub fn name(&self) -> &str {
		match self {
			FieldSpec::Name(name) | FieldSpec::Nested(name, _) => name,
		}
	}

	pub fn is_nested(&self) -> bool {
		matches!(self, FieldSpec::Nested(..))
	}
}

impl From<&str> for FieldSpec {
	fn from(name: &str) -> Self {
		FieldSpec::Name(name.to_string())
	}
}

impl From<String> for FieldSpec {
	fn from(name: String) -> Self {
		FieldSpec::Name(name)
	}
}

impl<S: Into<String>> From<(S, FieldSelection)> for FieldSpec {
	fn from((name, selection): (S, FieldSelection)) -> Self {
		FieldSpec::Nested(name.into(), selection)
	}
}

/// An ordered set of field specs
///
/// # Examples
///
/// ```
/// use dynamic_response_core::serializers::FieldSelection;
///
/// let selection = FieldSelection::new()
///     .field("id")
///     .field("title")
///     .field("id")
///     .nested("comments", FieldSelection::from(["id", "text"]));
///
/// assert_eq!(selection.len(), 3);
/// assert!(selection.contains_name("title"));
/// assert!(!selection.contains_name("comments"));
/// assert!(selection.contains("comments"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelection {
	specs: Vec<FieldSpec>,
}

impl FieldSelection {
	pub fn new() -> Self {
		Self::default()
	}

	/// The fixed selection applied to sensitive identities
	pub fn sensitive_identity() -> Self {
		SENSITIVE_IDENTITY_FIELDS.into_iter().collect()
	}

	/// Add a plain name (builder form of [`push`](Self::push))
	pub fn field(mut self, name: impl Into<String>) -> Self {
		self.push(FieldSpec::Name(name.into()));
		self
	}

	/// Add a nested sub-selection for a relation
	pub fn nested(mut self, name: impl Into<String>, selection: FieldSelection) -> Self {
		self.push(FieldSpec::Nested(name.into(), selection));
		self
	}

	/// Append a spec. Returns `false` when a spec with the same name is already present.
	pub fn push(&mut self, spec: FieldSpec) -> bool {
		if self.contains(spec.name()) {
			return false;
		}
		self.specs.push(spec);
		true
	}

	pub fn iter(&self) -> std::slice::Iter<'_, FieldSpec> {
		self.specs.iter()
	}

	pub fn len(&self) -> usize {
		self.specs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.specs.is_empty()
	}

	/// Whether a spec of any kind uses `name`
	pub fn contains(&self, name: &str) -> bool {
		self.specs.iter().any(|s| s.name() == name)
	}

	/// Whether `name` is requested as a plain name (not a nested pair)
	pub fn contains_name(&self, name: &str) -> bool {
		self.specs
			.iter()
			.any(|s| matches!(s, FieldSpec::Name(n) if n == name))
	}

	pub fn get(&self, name: &str) -> Option<&FieldSpec> {
		self.specs.iter().find(|s| s.name() == name)
	}

	pub fn names(&self) -> Vec<&str> {
		self.specs.iter().map(FieldSpec::name).collect()
	}
}

impl<S: Into<FieldSpec>> FromIterator<S> for FieldSelection {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		let mut selection = FieldSelection::new();
		for spec in iter {
			selection.push(spec.into());
		}
		selection
	}
}

impl<S: Into<FieldSpec>, const N: usize> From<[S; N]> for FieldSelection {
	fn from(specs: [S; N]) -> Self {
		specs.into_iter().collect()
	}
}

impl<S: Into<FieldSpec>> From<Vec<S>> for FieldSelection {
	fn from(specs: Vec<S>) -> Self {
		specs.into_iter().collect()
	}
}

impl<'a> IntoIterator for &'a FieldSelection {
	type Item = &'a FieldSpec;
	type IntoIter = std::slice::Iter<'a, FieldSpec>;

	fn into_iter(self) -> Self::IntoIter {
		self.specs.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_duplicates_are_dropped() {
		let mut selection = FieldSelection::from(["id", "title"]);
		assert!(!selection.push(FieldSpec::from("id")));
		assert!(!selection.push(FieldSpec::from(("title", FieldSelection::new()))));
		assert_eq!(selection.names(), vec!["id", "title"]);
	}

	#[rstest]
	fn test_insertion_order_is_kept() {
		let selection: FieldSelection = vec!["text", "id", "title"].into_iter().collect();
		assert_eq!(selection.names(), vec!["text", "id", "title"]);
	}

	#[rstest]
	fn test_nested_spec() {
		let selection =
			FieldSelection::new().nested("comments", FieldSelection::from(["id", "text"]));
		let spec = selection.get("comments").unwrap();
		assert!(spec.is_nested());
		assert!(!selection.contains_name("comments"));
	}

	#[rstest]
	fn test_sensitive_identity_selection() {
		let selection = FieldSelection::sensitive_identity();
		assert_eq!(selection.names(), vec!["id", "email", "first_name"]);
	}
}
