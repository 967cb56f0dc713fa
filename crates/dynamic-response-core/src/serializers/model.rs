//! Reflection seam between the emitter and a model layer
//!
//! The emitter does not know how models store their data. It asks a
//! [`Model`] for its declared fields, for attribute values and for related
//! objects, and decides on its own which of them end up in the output.

use super::selection::FieldSelection;
use super::value::Serializable;
use std::sync::Arc;

/// How a declared field relates to other models
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
	/// A stored scalar column
	Plain,
	/// Single-valued reference to another model
	ForeignKey,
	/// Multi-valued relation
	ManyToMany,
}

/// Metadata of one declared model field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
	/// Field name (`author`)
	pub name: String,
	/// Stored attribute name (`author_id` for foreign keys, `name` otherwise)
	pub attname: String,
	pub kind: FieldKind,
	/// Whether the field takes part in serialization at all
	pub serialize: bool,
}

impl FieldMeta {
	/// Declare a plain stored field
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::serializers::{FieldKind, FieldMeta};
	///
	/// let field = FieldMeta::plain("title");
	/// assert_eq!(field.attname, "title");
	/// assert_eq!(field.kind, FieldKind::Plain);
	/// ```
	pub fn plain(name: impl Into<String>) -> Self {
		let name = name.into();
		Self {
			attname: name.clone(),
			name,
			kind: FieldKind::Plain,
			serialize: true,
		}
	}

	/// Declare a foreign key. Its stored attribute is `<name>_id`.
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::serializers::FieldMeta;
	///
	/// let field = FieldMeta::foreign_key("author");
	/// assert_eq!(field.name, "author");
	/// assert_eq!(field.attname, "author_id");
	/// ```
	pub fn foreign_key(name: impl Into<String>) -> Self {
		let name = name.into();
		Self {
			attname: format!("{}_id", name),
			name,
			kind: FieldKind::ForeignKey,
			serialize: true,
		}
	}

	pub fn many_to_many(name: impl Into<String>) -> Self {
		let name = name.into();
		Self {
			attname: name.clone(),
			name,
			kind: FieldKind::ManyToMany,
			serialize: true,
		}
	}

	/// Exclude the field from serialization
	pub fn non_serializable(mut self) -> Self {
		self.serialize = false;
		self
	}

	pub fn is_relation(&self) -> bool {
		self.kind != FieldKind::Plain
	}
}

/// A related object or collection, as returned by [`Model::get_related`]
#[derive(Clone)]
pub enum Relation {
	One(Arc<dyn Model>),
	Many(Arc<dyn Manager>),
}

/// Materializes a many-valued relation
pub trait Manager: Send + Sync {
	/// Fetch every member of the relation
	fn all(&self) -> Vec<Arc<dyn Model>>;
}

impl Manager for Vec<Arc<dyn Model>> {
	fn all(&self) -> Vec<Arc<dyn Model>> {
		self.clone()
	}
}

/// A structured object the emitter can introspect
///
/// Implementors declare their fields explicitly; the emitter never guesses.
/// Names starting with `_` are treated as internal and skipped by the default
/// field set.
///
/// # Examples
///
/// ```
/// use dynamic_response_core::serializers::{Emitter, FieldMeta, Model, Serializable};
/// use serde_json::json;
///
/// struct Post { id: i64, title: String, secret: String }
///
/// impl Model for Post {
///     fn model_name(&self) -> &str { "blog.post" }
///
///     fn fields(&self) -> Vec<FieldMeta> {
///         vec![FieldMeta::plain("id"), FieldMeta::plain("title"), FieldMeta::plain("_secret")]
///     }
///
///     fn get_attribute(&self, name: &str) -> Option<Serializable> {
///         match name {
///             "id" => Some(self.id.into()),
///             "title" => Some(self.title.clone().into()),
///             "_secret" => Some(self.secret.clone().into()),
///             _ => None,
///         }
///     }
/// }
///
/// let post = Serializable::object(Post { id: 1, title: "Hi".into(), secret: "x".into() });
/// let emitted = Emitter::default().construct(&post, None).unwrap();
/// assert_eq!(emitted, json!({"id": 1, "title": "Hi"}));
/// ```
pub trait Model: Send + Sync {
	/// Identifier of the model type, used as the registry key (`app.model`)
	fn model_name(&self) -> &str;

	/// Declared fields in declaration order
	fn fields(&self) -> Vec<FieldMeta>;

	/// Value of a stored attribute or zero-argument accessor
	fn get_attribute(&self, name: &str) -> Option<Serializable>;

	/// Related object(s) reachable through `name`
	fn get_related(&self, _name: &str) -> Option<Relation> {
		None
	}

	/// Fixed field list this type always serializes with
	fn serialization_fields(&self) -> Option<FieldSelection> {
		None
	}

	/// Whether this type identifies a principal and must be redacted
	fn is_sensitive_identity(&self) -> bool {
		false
	}

	/// Accessors emitted by the default field set in addition to declared fields
	fn extra_members(&self) -> Vec<String> {
		Vec::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_field_meta_constructors() {
		let fk = FieldMeta::foreign_key("author");
		assert!(fk.is_relation());
		assert_eq!(fk.attname, "author_id");

		let m2m = FieldMeta::many_to_many("tags");
		assert_eq!(m2m.kind, FieldKind::ManyToMany);
		assert_eq!(m2m.attname, "tags");

		let hidden = FieldMeta::plain("password").non_serializable();
		assert!(!hidden.serialize);
		assert!(!hidden.is_relation());
	}
}
