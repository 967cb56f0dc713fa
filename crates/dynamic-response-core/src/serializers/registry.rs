//! Per-type serialization overrides
//!
//! The registry maps a model name to a fixed field list and to named computed
//! accessors. It is assembled once through [`TypeRegistryBuilder`] during
//! start-up and is read-only afterwards; share it with `Arc<TypeRegistry>`.

use super::model::Model;
use super::selection::{FieldSelection, FieldSpec};
use super::value::Serializable;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Handler attribute names that are never treated as computed accessors
pub const RESERVED_FIELDS: [&str; 9] = [
	"read",
	"update",
	"create",
	"delete",
	"model",
	"anonymous",
	"allowed_methods",
	"fields",
	"exclude",
];

/// A computed accessor, invoked with the object being serialized
pub type Accessor = Arc<dyn Fn(&dyn Model) -> Serializable + Send + Sync>;

/// Overrides registered for one model type
#[derive(Clone, Default)]
pub struct TypeOverride {
	fields: Option<FieldSelection>,
	accessors: IndexMap<String, Accessor>,
}

impl TypeOverride {
	pub fn new() -> Self {
		Self::default()
	}

	/// Always serialize this type with `fields`, whatever the caller asks for
	pub fn fields(mut self, fields: impl Into<FieldSelection>) -> Self {
		self.fields = Some(fields.into());
		self
	}

	/// Register a computed accessor under `name`
	///
	/// An accessor shadows a stored attribute of the same name.
	pub fn accessor<F>(mut self, name: impl Into<String>, f: F) -> Self
	where
		F: Fn(&dyn Model) -> Serializable + Send + Sync + 'static,
	{
		self.accessors.insert(name.into(), Arc::new(f));
		self
	}

	pub fn fixed_fields(&self) -> Option<&FieldSelection> {
		self.fields.as_ref()
	}

	pub fn get_accessor(&self, name: &str) -> Option<&Accessor> {
		self.accessors.get(name)
	}

	pub fn accessor_names(&self) -> Vec<&str> {
		self.accessors.keys().map(String::as_str).collect()
	}
}

impl fmt::Debug for TypeOverride {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeOverride")
			.field("fields", &self.fields)
			.field("accessors", &self.accessor_names())
			.finish()
	}
}

/// Frozen set of per-type overrides
///
/// # Examples
///
/// ```
/// use dynamic_response_core::serializers::{Serializable, TypeOverride, TypeRegistry};
///
/// let registry = TypeRegistry::builder()
///     .register(
///         "blog.post",
///         TypeOverride::new()
///             .fields(["id", "title"])
///             .accessor("title", |_| Serializable::from("computed")),
///     )
///     .build();
///
/// assert!(registry.contains("blog.post"));
/// assert!(registry.fixed_fields("blog.post").is_some());
/// assert!(registry.fixed_fields("blog.comment").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
	overrides: HashMap<String, TypeOverride>,
}

impl TypeRegistry {
	/// A registry without any override
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn builder() -> TypeRegistryBuilder {
		TypeRegistryBuilder::default()
	}

	pub fn get(&self, model_name: &str) -> Option<&TypeOverride> {
		self.overrides.get(model_name)
	}

	pub fn contains(&self, model_name: &str) -> bool {
		self.overrides.contains_key(model_name)
	}

	pub fn len(&self) -> usize {
		self.overrides.len()
	}

	pub fn is_empty(&self) -> bool {
		self.overrides.is_empty()
	}

	pub fn fixed_fields(&self, model_name: &str) -> Option<&FieldSelection> {
		self.get(model_name).and_then(TypeOverride::fixed_fields)
	}

	/// Accessors of `model_name` requested by plain names in `selection`
	///
	/// Reserved handler names are never resolved to accessors.
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::serializers::{
	///     FieldSelection, Serializable, TypeOverride, TypeRegistry,
	/// };
	///
	/// let registry = TypeRegistry::builder()
	///     .register(
	///         "blog.post",
	///         TypeOverride::new()
	///             .accessor("summary", |_| Serializable::Null)
	///             .accessor("fields", |_| Serializable::Null),
	///     )
	///     .build();
	///
	/// let selection = FieldSelection::from(["id", "summary", "fields"]);
	/// let methods = registry.method_fields("blog.post", &selection);
	/// assert_eq!(methods.keys().copied().collect::<Vec<_>>(), vec!["summary"]);
	/// ```
	pub fn method_fields<'a>(
		&'a self,
		model_name: &str,
		selection: &FieldSelection,
	) -> IndexMap<&'a str, &'a Accessor> {
		let Some(entry) = self.get(model_name) else {
			return IndexMap::new();
		};

		entry
			.accessors
			.iter()
			.filter(|(name, _)| !RESERVED_FIELDS.contains(&name.as_str()))
			.filter(|(name, _)| {
				selection
					.iter()
					.any(|spec| matches!(spec, FieldSpec::Name(n) if n == *name))
			})
			.map(|(name, accessor)| (name.as_str(), accessor))
			.collect()
	}
}

/// Collects overrides before freezing them into a [`TypeRegistry`]
#[derive(Debug, Default)]
pub struct TypeRegistryBuilder {
	overrides: HashMap<String, TypeOverride>,
}

impl TypeRegistryBuilder {
	/// Register (or replace) the overrides of `model_name`
	pub fn register(mut self, model_name: impl Into<String>, entry: TypeOverride) -> Self {
		self.overrides.insert(model_name.into(), entry);
		self
	}

	/// Set the fixed field list of `model_name`, keeping its accessors
	pub fn fields(
		mut self,
		model_name: impl Into<String>,
		fields: impl Into<FieldSelection>,
	) -> Self {
		let entry = self.overrides.entry(model_name.into()).or_default();
		entry.fields = Some(fields.into());
		self
	}

	/// Add a computed accessor to `model_name`, keeping its other overrides
	pub fn accessor<F>(
		mut self,
		model_name: impl Into<String>,
		name: impl Into<String>,
		f: F,
	) -> Self
	where
		F: Fn(&dyn Model) -> Serializable + Send + Sync + 'static,
	{
		let entry = self.overrides.entry(model_name.into()).or_default();
		entry.accessors.insert(name.into(), Arc::new(f));
		self
	}

	pub fn build(self) -> TypeRegistry {
		tracing::debug!(types = self.overrides.len(), "Type registry built");
		TypeRegistry {
			overrides: self.overrides,
		}
	}

	/// Build and wrap in an `Arc` for sharing across handlers
	pub fn build_shared(self) -> Arc<TypeRegistry> {
		Arc::new(self.build())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_builder_merges_fields_and_accessors() {
		let registry = TypeRegistry::builder()
			.fields("blog.post", ["id"])
			.accessor("blog.post", "summary", |_| Serializable::from("s"))
			.build();

		let entry = registry.get("blog.post").unwrap();
		assert_eq!(entry.fixed_fields().unwrap().names(), vec!["id"]);
		assert_eq!(entry.accessor_names(), vec!["summary"]);
	}

	#[rstest]
	fn test_register_replaces_entry() {
		let registry = TypeRegistry::builder()
			.fields("blog.post", ["id"])
			.register("blog.post", TypeOverride::new())
			.build();

		assert!(registry.fixed_fields("blog.post").is_none());
		assert_eq!(registry.len(), 1);
	}

	#[rstest]
	fn test_method_fields_ignore_nested_specs() {
		let registry = TypeRegistry::builder()
			.accessor("blog.post", "comments", |_| Serializable::Null)
			.build();
		let selection = FieldSelection::new().nested("comments", FieldSelection::from(["id"]));

		assert!(registry.method_fields("blog.post", &selection).is_empty());
	}

	#[rstest]
	fn test_method_fields_unknown_model() {
		let registry = TypeRegistry::empty();
		assert!(registry.is_empty());
		assert!(
			registry
				.method_fields("blog.post", &FieldSelection::from(["id"]))
				.is_empty()
		);
	}
}
