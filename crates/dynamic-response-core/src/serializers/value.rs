//! The dispatch target of the emitter
//!
//! [`Serializable`] is a closed sum over every shape the emitter knows how to
//! walk. Framework values are converted into it at the edge (models are
//! wrapped in `Arc`, lazy values in [`Callable`] or [`Emittable`]) so the
//! emitter itself never needs runtime type probing.

use super::model::{Manager, Model};
use crate::pagination::Page;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

/// Caller-defined types that know how to turn themselves into a serializable value.
///
/// This is the extension point for values the emitter has no dedicated
/// variant for.
///
/// # Examples
///
/// ```
/// use dynamic_response_core::serializers::{Emittable, Emitter, Serializable};
/// use serde_json::json;
///
/// struct Point { x: i64, y: i64 }
///
/// impl Emittable for Point {
///     fn emittable(&self) -> Option<Serializable> {
///         Some(Serializable::from(vec![self.x, self.y]))
///     }
/// }
///
/// let value = Serializable::emittable(Point { x: 1, y: 2 });
/// assert_eq!(Emitter::default().construct(&value, None).unwrap(), json!([1, 2]));
/// ```
pub trait Emittable: Send + Sync {
	/// Produces the value to serialize in place of `self`.
	///
	/// Returns `None` when the hook cannot be invoked without extra
	/// arguments; the emitter then renders `null`.
	fn emittable(&self) -> Option<Serializable>;
}

/// A lazily computed value
#[derive(Clone)]
pub enum Callable {
	/// Zero-argument callable, invoked once per visit
	Nullary(Arc<dyn Fn() -> Serializable + Send + Sync>),
	/// Callable needing arguments beyond its receiver. Never invoked.
	RequiresArgs { name: String, arity: usize },
}

impl Callable {
	/// Wrap a zero-argument closure
	pub fn new<F>(f: F) -> Self
	where
		F: Fn() -> Serializable + Send + Sync + 'static,
	{
		Callable::Nullary(Arc::new(f))
	}

	/// Describe a callable that takes `arity` arguments
	pub fn requires_args(name: impl Into<String>, arity: usize) -> Self {
		Callable::RequiresArgs {
			name: name.into(),
			arity,
		}
	}

	/// Invoke the callable if it takes no arguments
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::serializers::{Callable, Serializable};
	///
	/// let lazy = Callable::new(|| Serializable::from(42));
	/// assert!(lazy.call().is_some());
	///
	/// let method = Callable::requires_args("get_absolute_url", 1);
	/// assert!(method.call().is_none());
	/// ```
	pub fn call(&self) -> Option<Serializable> {
		match self {
			Callable::Nullary(f) => Some(f()),
			Callable::RequiresArgs { .. } => None,
		}
	}
}

impl fmt::Debug for Callable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Callable::Nullary(_) => f.write_str("Callable::Nullary(..)"),
			Callable::RequiresArgs { name, arity } => f
				.debug_struct("Callable::RequiresArgs")
				.field("name", name)
				.field("arity", arity)
				.finish(),
		}
	}
}

/// Any value the emitter accepts
#[derive(Clone)]
pub enum Serializable {
	Null,
	Bool(bool),
	Int(i64),
	UInt(u64),
	Float(f64),
	/// Arbitrary precision decimal, emitted as its canonical text
	Decimal(Decimal),
	Text(String),
	DateTime(NaiveDateTime),
	Date(NaiveDate),
	Time(NaiveTime),
	/// Raw bytes, decoded lossily as UTF-8
	Bytes(Vec<u8>),
	/// A value that is already JSON-safe
	Json(serde_json::Value),
	List(Vec<Serializable>),
	/// A paginated window; only its items are emitted
	Page(Box<Page<Serializable>>),
	Map(IndexMap<String, Serializable>),
	Object(Arc<dyn Model>),
	Callable(Callable),
	Emittable(Arc<dyn Emittable>),
	/// An unevaluated many-valued relation
	Related(Arc<dyn Manager>),
	/// Anything else with a text form
	Opaque(Arc<dyn fmt::Display + Send + Sync>),
	/// A failure value. Refused by the emitter at the top level.
	Error(Arc<dyn std::error::Error + Send + Sync>),
}

impl Serializable {
	/// Wrap a model instance
	pub fn object<M: Model + 'static>(model: M) -> Self {
		Serializable::Object(Arc::new(model))
	}

	/// Wrap a zero-argument closure
	pub fn callable<F>(f: F) -> Self
	where
		F: Fn() -> Serializable + Send + Sync + 'static,
	{
		Serializable::Callable(Callable::new(f))
	}

	pub fn emittable<E: Emittable + 'static>(value: E) -> Self {
		Serializable::Emittable(Arc::new(value))
	}

	pub fn related<R: Manager + 'static>(manager: R) -> Self {
		Serializable::Related(Arc::new(manager))
	}

	pub fn opaque<D: fmt::Display + Send + Sync + 'static>(value: D) -> Self {
		Serializable::Opaque(Arc::new(value))
	}

	pub fn error<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
		Serializable::Error(Arc::new(error))
	}

	/// Build a map from key/value pairs, keeping their order
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::serializers::Serializable;
	///
	/// let map = Serializable::map([("id", Serializable::from(1)), ("title", "Hi".into())]);
	/// assert!(matches!(map, Serializable::Map(ref m) if m.len() == 2));
	/// ```
	pub fn map<K, V, I>(entries: I) -> Self
	where
		K: Into<String>,
		V: Into<Serializable>,
		I: IntoIterator<Item = (K, V)>,
	{
		Serializable::Map(
			entries
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		)
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Serializable::Null)
	}

	pub fn is_error(&self) -> bool {
		matches!(self, Serializable::Error(_))
	}
}

impl fmt::Debug for Serializable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Serializable::Null => f.write_str("Null"),
			Serializable::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
			Serializable::Int(v) => f.debug_tuple("Int").field(v).finish(),
			Serializable::UInt(v) => f.debug_tuple("UInt").field(v).finish(),
			Serializable::Float(v) => f.debug_tuple("Float").field(v).finish(),
			Serializable::Decimal(v) => f.debug_tuple("Decimal").field(v).finish(),
			Serializable::Text(v) => f.debug_tuple("Text").field(v).finish(),
			Serializable::DateTime(v) => f.debug_tuple("DateTime").field(v).finish(),
			Serializable::Date(v) => f.debug_tuple("Date").field(v).finish(),
			Serializable::Time(v) => f.debug_tuple("Time").field(v).finish(),
			Serializable::Bytes(v) => f.debug_tuple("Bytes").field(&v.len()).finish(),
			Serializable::Json(v) => f.debug_tuple("Json").field(v).finish(),
			Serializable::List(v) => f.debug_tuple("List").field(v).finish(),
			Serializable::Page(p) => f
				.debug_struct("Page")
				.field("number", &p.number)
				.field("object_list", &p.object_list)
				.finish(),
			Serializable::Map(v) => f.debug_tuple("Map").field(v).finish(),
			Serializable::Object(m) => f.debug_tuple("Object").field(&m.model_name()).finish(),
			Serializable::Callable(c) => c.fmt(f),
			Serializable::Emittable(_) => f.write_str("Emittable(..)"),
			Serializable::Related(_) => f.write_str("Related(..)"),
			Serializable::Opaque(v) => f.debug_tuple("Opaque").field(&v.to_string()).finish(),
			Serializable::Error(e) => f.debug_tuple("Error").field(&e.to_string()).finish(),
		}
	}
}

macro_rules! impl_from_signed {
	($($t:ty),*) => {
		$(impl From<$t> for Serializable {
			fn from(value: $t) -> Self {
				Serializable::Int(i64::from(value))
			}
		})*
	};
}

macro_rules! impl_from_unsigned {
	($($t:ty),*) => {
		$(impl From<$t> for Serializable {
			fn from(value: $t) -> Self {
				Serializable::UInt(u64::from(value))
			}
		})*
	};
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

impl From<bool> for Serializable {
	fn from(value: bool) -> Self {
		Serializable::Bool(value)
	}
}

impl From<f32> for Serializable {
	fn from(value: f32) -> Self {
		Serializable::Float(f64::from(value))
	}
}

impl From<f64> for Serializable {
	fn from(value: f64) -> Self {
		Serializable::Float(value)
	}
}

impl From<Decimal> for Serializable {
	fn from(value: Decimal) -> Self {
		Serializable::Decimal(value)
	}
}

impl From<&str> for Serializable {
	fn from(value: &str) -> Self {
		Serializable::Text(value.to_string())
	}
}

impl From<String> for Serializable {
	fn from(value: String) -> Self {
		Serializable::Text(value)
	}
}

impl From<NaiveDateTime> for Serializable {
	fn from(value: NaiveDateTime) -> Self {
		Serializable::DateTime(value)
	}
}

impl From<NaiveDate> for Serializable {
	fn from(value: NaiveDate) -> Self {
		Serializable::Date(value)
	}
}

impl From<NaiveTime> for Serializable {
	fn from(value: NaiveTime) -> Self {
		Serializable::Time(value)
	}
}

impl From<serde_json::Value> for Serializable {
	fn from(value: serde_json::Value) -> Self {
		Serializable::Json(value)
	}
}

impl From<Callable> for Serializable {
	fn from(value: Callable) -> Self {
		Serializable::Callable(value)
	}
}

impl From<Arc<dyn Model>> for Serializable {
	fn from(value: Arc<dyn Model>) -> Self {
		Serializable::Object(value)
	}
}

impl From<Arc<dyn Manager>> for Serializable {
	fn from(value: Arc<dyn Manager>) -> Self {
		Serializable::Related(value)
	}
}

impl<T: Into<Serializable>> From<Option<T>> for Serializable {
	fn from(value: Option<T>) -> Self {
		value.map_or(Serializable::Null, Into::into)
	}
}

impl<T: Into<Serializable>> From<Vec<T>> for Serializable {
	fn from(value: Vec<T>) -> Self {
		Serializable::List(value.into_iter().map(Into::into).collect())
	}
}

impl<T: Into<Serializable>> From<IndexMap<String, T>> for Serializable {
	fn from(value: IndexMap<String, T>) -> Self {
		Serializable::Map(value.into_iter().map(|(k, v)| (k, v.into())).collect())
	}
}

impl<T: Into<Serializable>> From<Page<T>> for Serializable {
	fn from(page: Page<T>) -> Self {
		Serializable::Page(Box::new(page.map_items(Into::into)))
	}
}
