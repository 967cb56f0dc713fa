//! # Serializers
//!
//! Generic, model-aware serialization into JSON-safe trees.
//!
//! The [`Emitter`] walks a [`Serializable`] value and dispatches on its shape:
//! pages, lists and maps are traversed, decimals become exact strings,
//! models are resolved through the field-selection policy, and lazy values
//! (callables, emittable hooks, relation managers) are materialized on the way.
//!
//! ## Field selection
//!
//! - A model's own `serialization_fields`, or a fixed list registered in the
//!   [`TypeRegistry`], replaces whatever the caller asked for
//! - Sensitive identities (users) are clamped to `id`, `first_name`, `email`
//! - Otherwise an explicit [`FieldSelection`] is honored exactly, missing
//!   fields included as `null`
//! - Without a selection every public field is emitted
//!
//! ## Example
//!
//! ```
//! use dynamic_response_core::serializers::{Emitter, Serializable};
//! use serde_json::json;
//!
//! let value = Serializable::from(vec![
//!     Serializable::from(1),
//!     Serializable::from("a"),
//!     Serializable::from(true),
//! ]);
//! let emitted = Emitter::default().construct(&value, None).unwrap();
//! assert_eq!(emitted, json!([1, "a", true]));
//! ```

pub mod emitter;
pub mod error;
pub mod model;
pub mod recursive;
pub mod registry;
pub mod renderer;
pub mod selection;
pub mod value;

pub use emitter::Emitter;
pub use error::{SerializerError, SerializerResult};
pub use model::{FieldKind, FieldMeta, Manager, Model, Relation};
pub use recursive::SerializationContext;
pub use registry::{Accessor, RESERVED_FIELDS, TypeOverride, TypeRegistry, TypeRegistryBuilder};
pub use renderer::JsonRenderer;
pub use selection::{FieldSelection, FieldSpec};
pub use value::{Callable, Emittable, Serializable};
