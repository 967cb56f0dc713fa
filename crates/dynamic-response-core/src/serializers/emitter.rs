//! The generic emitter
//!
//! Dispatch order, first match wins:
//!
//! 1. pages, unwrapped to their items
//! 2. lists
//! 3. maps (keys are kept verbatim)
//! 4. decimals, as exact strings
//! 5. models, resolved through the field-selection policy
//! 6. zero-argument callables
//! 7. emittable hooks
//! 8. relation managers
//! 9. everything else, coerced to text or passed through as a JSON scalar

use super::error::{SerializerError, SerializerResult};
use super::model::{FieldKind, FieldMeta, Model, Relation};
use super::recursive::SerializationContext;
use super::registry::TypeRegistry;
use super::selection::{FieldSelection, FieldSpec};
use super::value::Serializable;
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Converts [`Serializable`] values into JSON-safe trees
///
/// The emitter holds no per-call state; one instance can serve any number of
/// concurrent requests.
///
/// # Examples
///
/// ```
/// use dynamic_response_core::serializers::{Emitter, Serializable, TypeRegistry};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let emitter = Emitter::new(Arc::new(TypeRegistry::empty()));
/// let value = Serializable::map([("ok", Serializable::from(true))]);
/// assert_eq!(emitter.construct(&value, None).unwrap(), json!({"ok": true}));
/// ```
#[derive(Debug, Clone)]
pub struct Emitter {
	registry: Arc<TypeRegistry>,
	max_depth: Option<usize>,
}

impl Default for Emitter {
	fn default() -> Self {
		Self::new(Arc::new(TypeRegistry::empty()))
	}
}

impl Emitter {
	pub fn new(registry: Arc<TypeRegistry>) -> Self {
		Self {
			registry,
			max_depth: None,
		}
	}

	/// Fail with `CycleOrDepthExceeded` instead of recursing past `max_depth` levels
	///
	/// Enabling the guard also rejects a model reached again through itself.
	pub fn with_max_depth(mut self, max_depth: usize) -> Self {
		self.max_depth = Some(max_depth);
		self
	}

	pub fn registry(&self) -> &TypeRegistry {
		&self.registry
	}

	pub fn max_depth(&self) -> Option<usize> {
		self.max_depth
	}

	/// Serialize `value`, applying `fields` to the models it contains
	///
	/// # Errors
	///
	/// Returns [`SerializerError::UnserializableInput`] when `value` is an
	/// error value, and [`SerializerError::CycleOrDepthExceeded`] when the
	/// depth guard is enabled and trips.
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::serializers::{Emitter, Serializable};
	///
	/// let failure = Serializable::error(std::io::Error::other("not found"));
	/// assert!(Emitter::default().construct(&failure, None).is_err());
	/// ```
	pub fn construct(
		&self,
		value: &Serializable,
		fields: Option<&FieldSelection>,
	) -> SerializerResult<Value> {
		if let Serializable::Error(err) = value {
			return Err(SerializerError::UnserializableInput {
				message: err.to_string(),
			});
		}

		let mut context = SerializationContext::new(self.max_depth);
		self.any(value, fields, &mut context)
	}

	/// Resolve the members of a single model
	pub fn resolve_fields(
		&self,
		data: &Arc<dyn Model>,
		fields: Option<&FieldSelection>,
	) -> SerializerResult<Value> {
		let mut context = SerializationContext::new(self.max_depth);
		self.model(data, fields, &mut context)
	}

	fn any(
		&self,
		thing: &Serializable,
		fields: Option<&FieldSelection>,
		ctx: &mut SerializationContext,
	) -> SerializerResult<Value> {
		ctx.enter()?;
		let result = self.dispatch(thing, fields, ctx);
		ctx.leave();
		result
	}

	fn dispatch(
		&self,
		thing: &Serializable,
		fields: Option<&FieldSelection>,
		ctx: &mut SerializationContext,
	) -> SerializerResult<Value> {
		match thing {
			Serializable::Page(page) => self.list(&page.object_list, fields, ctx),
			Serializable::List(items) => self.list(items, fields, ctx),
			Serializable::Map(map) => self.dict(map, fields, ctx),
			Serializable::Decimal(d) => Ok(Value::String(d.to_string())),
			Serializable::Object(model) => self.model(model, fields, ctx),
			Serializable::Callable(callable) => match callable.call() {
				Some(value) => self.any(&value, None, ctx),
				None => {
					tracing::trace!(
						callable = ?callable,
						"Skipping callable that requires arguments"
					);
					Ok(Value::Null)
				}
			},
			Serializable::Emittable(hook) => match hook.emittable() {
				Some(value) => self.any(&value, None, ctx),
				None => {
					tracing::trace!("Skipping emittable hook that requires arguments");
					Ok(Value::Null)
				}
			},
			Serializable::Related(manager) => manager
				.all()
				.iter()
				.map(|m| self.model(m, fields, ctx))
				.collect::<SerializerResult<Vec<_>>>()
				.map(Value::Array),
			scalar => Ok(Self::scalar(scalar)),
		}
	}

	fn scalar(thing: &Serializable) -> Value {
		match thing {
			Serializable::Null => Value::Null,
			Serializable::Bool(b) => Value::Bool(*b),
			Serializable::Int(i) => Value::from(*i),
			Serializable::UInt(u) => Value::from(*u),
			Serializable::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
			Serializable::Decimal(d) => Value::String(d.to_string()),
			Serializable::Text(s) => Value::String(s.clone()),
			Serializable::DateTime(dt) => Value::String(dt.format(DATETIME_FORMAT).to_string()),
			Serializable::Date(d) => Value::String(d.format(DATE_FORMAT).to_string()),
			Serializable::Time(t) => Value::String(t.format(TIME_FORMAT).to_string()),
			Serializable::Bytes(bytes) => {
				Value::String(String::from_utf8_lossy(bytes).into_owned())
			}
			Serializable::Json(value) => value.clone(),
			Serializable::Opaque(display) => Value::String(display.to_string()),
			Serializable::Error(err) => {
				tracing::trace!(error = %err, "Coercing nested error value to text");
				Value::String(err.to_string())
			}
			// Handled by `dispatch`
			Serializable::List(_)
			| Serializable::Page(_)
			| Serializable::Map(_)
			| Serializable::Object(_)
			| Serializable::Callable(_)
			| Serializable::Emittable(_)
			| Serializable::Related(_) => Value::Null,
		}
	}

	fn list(
		&self,
		items: &[Serializable],
		fields: Option<&FieldSelection>,
		ctx: &mut SerializationContext,
	) -> SerializerResult<Value> {
		items
			.iter()
			.map(|item| self.any(item, fields, ctx))
			.collect::<SerializerResult<Vec<_>>>()
			.map(Value::Array)
	}

	fn dict(
		&self,
		map: &IndexMap<String, Serializable>,
		fields: Option<&FieldSelection>,
		ctx: &mut SerializationContext,
	) -> SerializerResult<Value> {
		let mut ret = Map::with_capacity(map.len());
		for (key, value) in map {
			ret.insert(key.clone(), self.any(value, fields, ctx)?);
		}
		Ok(Value::Object(ret))
	}

	fn model(
		&self,
		data: &Arc<dyn Model>,
		fields: Option<&FieldSelection>,
		ctx: &mut SerializationContext,
	) -> SerializerResult<Value> {
		let id = Arc::as_ptr(data) as *const () as usize;
		ctx.visit(id, data.model_name())?;
		let result = self.resolve(data.as_ref(), fields, ctx);
		ctx.unvisit(id);
		result
	}

	fn resolve(
		&self,
		data: &dyn Model,
		fields: Option<&FieldSelection>,
		ctx: &mut SerializationContext,
	) -> SerializerResult<Value> {
		match self.effective_selection(data, fields) {
			Some(selection) if !selection.is_empty() => self.explicit_fields(data, &selection, ctx),
			_ => self.default_fields(data, ctx),
		}
	}

	/// Type overrides first, then the identity clamp, then the caller's selection
	fn effective_selection<'a>(
		&'a self,
		data: &dyn Model,
		fields: Option<&'a FieldSelection>,
	) -> Option<Cow<'a, FieldSelection>> {
		if data.is_sensitive_identity() {
			return Some(Cow::Owned(FieldSelection::sensitive_identity()));
		}
		if let Some(own) = data.serialization_fields() {
			return Some(Cow::Owned(own));
		}
		if let Some(fixed) = self.registry.fixed_fields(data.model_name()) {
			return Some(Cow::Borrowed(fixed));
		}
		fields.map(Cow::Borrowed)
	}

	fn explicit_fields(
		&self,
		data: &dyn Model,
		selection: &FieldSelection,
		ctx: &mut SerializationContext,
	) -> SerializerResult<Value> {
		let mut ret = Map::new();
		// Identity models expose stored values only
		let met_fields = if data.is_sensitive_identity() {
			IndexMap::new()
		} else {
			self.registry.method_fields(data.model_name(), selection)
		};
		let mut consumed: HashSet<String> = HashSet::new();
		let declared = data.fields();

		let shadowed = |f: &FieldMeta| {
			met_fields.contains_key(f.attname.as_str()) || met_fields.contains_key(f.name.as_str())
		};

		for field in declared.iter().filter(|f| f.serialize && !shadowed(f)) {
			match field.kind {
				FieldKind::Plain if selection.contains_name(&field.attname) => {
					let value = data.get_attribute(&field.attname).unwrap_or(Serializable::Null);
					ret.insert(field.attname.clone(), self.any(&value, None, ctx)?);
					consumed.insert(field.attname.clone());
				}
				FieldKind::ForeignKey if selection.contains_name(&field.name) => {
					ret.insert(field.name.clone(), self.related(data, &field.name, ctx)?);
					consumed.insert(field.name.clone());
				}
				_ => {}
			}
		}

		for field in declared
			.iter()
			.filter(|f| f.kind == FieldKind::ManyToMany && f.serialize && !shadowed(f))
		{
			if selection.contains_name(&field.name) {
				ret.insert(field.name.clone(), self.related(data, &field.name, ctx)?);
				consumed.insert(field.name.clone());
			}
		}

		for spec in selection {
			match spec {
				FieldSpec::Nested(name, nested) => {
					ret.insert(name.clone(), self.nested(data, name, nested, ctx)?);
				}
				FieldSpec::Name(name) if consumed.contains(name) => {}
				FieldSpec::Name(name) => {
					let value = match met_fields.get(name.as_str()) {
						// Accessors shadow stored attributes of the same name
						Some(accessor) => self.any(&accessor(data), None, ctx)?,
						None => self.attribute(data, name, ctx)?,
					};
					ret.insert(name.clone(), value);
				}
			}
		}

		Ok(Value::Object(ret))
	}

	fn default_fields(
		&self,
		data: &dyn Model,
		ctx: &mut SerializationContext,
	) -> SerializerResult<Value> {
		let mut ret = Map::new();
		let declared = data.fields();
		let public = |f: &&FieldMeta| f.serialize && !f.attname.starts_with('_');

		for field in declared
			.iter()
			.filter(|f| f.kind != FieldKind::ManyToMany)
			.filter(public)
		{
			let value = data.get_attribute(&field.attname).unwrap_or(Serializable::Null);
			ret.insert(field.attname.clone(), self.any(&value, None, ctx)?);
		}

		for field in declared
			.iter()
			.filter(|f| f.kind == FieldKind::ManyToMany)
			.filter(public)
		{
			ret.insert(field.name.clone(), self.related(data, &field.name, ctx)?);
		}

		for name in data.extra_members() {
			if name.starts_with('_') || ret.contains_key(&name) {
				continue;
			}
			let value = self.attribute(data, &name, ctx)?;
			ret.insert(name, value);
		}

		Ok(Value::Object(ret))
	}

	/// Related object(s) with their own default field set
	fn related(
		&self,
		data: &dyn Model,
		name: &str,
		ctx: &mut SerializationContext,
	) -> SerializerResult<Value> {
		match data.get_related(name) {
			Some(Relation::One(model)) => self.model(&model, None, ctx),
			Some(Relation::Many(manager)) => manager
				.all()
				.iter()
				.map(|m| self.model(m, None, ctx))
				.collect::<SerializerResult<Vec<_>>>()
				.map(Value::Array),
			None => Ok(Value::Null),
		}
	}

	fn nested(
		&self,
		data: &dyn Model,
		name: &str,
		selection: &FieldSelection,
		ctx: &mut SerializationContext,
	) -> SerializerResult<Value> {
		match data.get_related(name) {
			Some(Relation::Many(manager)) => manager
				.all()
				.iter()
				.map(|m| self.model(m, Some(selection), ctx))
				.collect::<SerializerResult<Vec<_>>>()
				.map(Value::Array),
			Some(Relation::One(model)) => self.model(&model, Some(selection), ctx),
			None => match data.get_attribute(name) {
				Some(Serializable::Callable(callable)) => match callable.call() {
					Some(value) => self.any(&value, Some(selection), ctx),
					None => Ok(Value::Null),
				},
				Some(value) => self.any(&value, Some(selection), ctx),
				None => Ok(Value::Null),
			},
		}
	}

	/// A named member that is neither a declared field nor an accessor
	fn attribute(
		&self,
		data: &dyn Model,
		name: &str,
		ctx: &mut SerializationContext,
	) -> SerializerResult<Value> {
		match data.get_attribute(name) {
			Some(value) => self.any(&value, None, ctx),
			None if data.get_related(name).is_some() => self.related(data, name, ctx),
			None => Ok(Value::Null),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pagination::Page;
	use rstest::rstest;
	use rust_decimal::Decimal;
	use serde_json::json;
	use std::str::FromStr;

	struct Note {
		id: i64,
		body: String,
	}

	impl Model for Note {
		fn model_name(&self) -> &str {
			"tests.note"
		}

		fn fields(&self) -> Vec<FieldMeta> {
			vec![FieldMeta::plain("id"), FieldMeta::plain("body")]
		}

		fn get_attribute(&self, name: &str) -> Option<Serializable> {
			match name {
				"id" => Some(self.id.into()),
				"body" => Some(self.body.clone().into()),
				_ => None,
			}
		}
	}

	fn note(id: i64) -> Serializable {
		Serializable::object(Note {
			id,
			body: format!("note {}", id),
		})
	}

	#[rstest]
	fn test_sequence_preserves_order() {
		let value = Serializable::from(vec![
			Serializable::from(1),
			Serializable::from("a"),
			Serializable::from(true),
		]);
		let emitted = Emitter::default().construct(&value, None).unwrap();
		assert_eq!(emitted, json!([1, "a", true]));
	}

	#[rstest]
	#[case("12.345")]
	#[case("0.1")]
	#[case("100000000000000000000.000000001")]
	fn test_decimal_is_exact(#[case] text: &str) {
		let value = Serializable::from(Decimal::from_str(text).unwrap());
		let emitted = Emitter::default().construct(&value, None).unwrap();
		assert_eq!(emitted, Value::String(text.to_string()));
	}

	#[rstest]
	fn test_map_keys_are_verbatim() {
		let value = Serializable::map([("Mixed Case", 1), ("_private", 2)]);
		let emitted = Emitter::default().construct(&value, None).unwrap();
		assert_eq!(emitted, json!({"Mixed Case": 1, "_private": 2}));
	}

	#[rstest]
	fn test_page_applies_selection_per_item() {
		let page = Page::new(vec![note(1), note(2)], 1, 1, 2, 10);
		let selection = FieldSelection::from(["id"]);
		let emitted = Emitter::default()
			.construct(&Serializable::from(page), Some(&selection))
			.unwrap();
		assert_eq!(emitted, json!([{"id": 1}, {"id": 2}]));
	}

	#[rstest]
	fn test_list_applies_selection_per_item() {
		let value = Serializable::from(vec![note(1), note(2)]);
		let selection = FieldSelection::from(["body"]);
		let emitted = Emitter::default().construct(&value, Some(&selection)).unwrap();
		assert_eq!(emitted, json!([{"body": "note 1"}, {"body": "note 2"}]));
	}

	#[rstest]
	fn test_callable_is_invoked_once() {
		use std::sync::atomic::{AtomicUsize, Ordering};
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = Arc::clone(&calls);
		let value = Serializable::callable(move || {
			counter.fetch_add(1, Ordering::SeqCst);
			Serializable::from("lazy")
		});

		let emitted = Emitter::default().construct(&value, None).unwrap();
		assert_eq!(emitted, json!("lazy"));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[rstest]
	fn test_callable_with_arguments_is_skipped() {
		let value = Serializable::from(crate::serializers::Callable::requires_args("get_url", 1));
		let emitted = Emitter::default().construct(&value, None).unwrap();
		assert_eq!(emitted, Value::Null);
	}

	struct Hook(Option<&'static str>);

	impl crate::serializers::Emittable for Hook {
		fn emittable(&self) -> Option<Serializable> {
			self.0.map(Serializable::from)
		}
	}

	#[rstest]
	#[case::needs_arguments(None, json!({"h": null}))]
	#[case::ready(Some("signed"), json!({"h": "signed"}))]
	fn test_emittable_hook_in_map(#[case] output: Option<&'static str>, #[case] expected: Value) {
		let value = Serializable::map([("h", Serializable::emittable(Hook(output)))]);
		let emitted = Emitter::default().construct(&value, None).unwrap();
		assert_eq!(emitted, expected);
	}

	#[rstest]
	fn test_scalars() {
		let date = chrono::NaiveDate::from_ymd_opt(2010, 3, 4).unwrap();
		let datetime = date.and_hms_opt(5, 6, 7).unwrap();
		let value = Serializable::map([
			("null", Serializable::Null),
			("float", Serializable::from(1.5)),
			("nan", Serializable::from(f64::NAN)),
			("date", Serializable::from(date)),
			("datetime", Serializable::from(datetime)),
			("time", Serializable::from(datetime.time())),
			("bytes", Serializable::Bytes(b"caf\xc3\xa9 \xff".to_vec())),
			("json", Serializable::from(json!({"a": [1]}))),
			("opaque", Serializable::opaque(std::net::Ipv4Addr::LOCALHOST)),
		]);

		let emitted = Emitter::default().construct(&value, None).unwrap();
		assert_eq!(
			emitted,
			json!({
				"null": null,
				"float": 1.5,
				"nan": null,
				"date": "2010-03-04",
				"datetime": "2010-03-04 05:06:07",
				"time": "05:06:07",
				"bytes": "café \u{fffd}",
				"json": {"a": [1]},
				"opaque": "127.0.0.1",
			})
		);
	}

	#[rstest]
	fn test_top_level_error_is_refused() {
		let value = Serializable::error(std::io::Error::other("db down"));
		let err = Emitter::default().construct(&value, None).unwrap_err();
		assert!(matches!(
			err,
			SerializerError::UnserializableInput { ref message } if message == "db down"
		));
	}

	#[rstest]
	fn test_nested_error_is_coerced_to_text() {
		let value = Serializable::from(vec![Serializable::error(std::io::Error::other("db down"))]);
		let emitted = Emitter::default().construct(&value, None).unwrap();
		assert_eq!(emitted, json!(["db down"]));
	}

	#[rstest]
	fn test_depth_guard() {
		let mut value = Serializable::from(0);
		for _ in 0..10 {
			value = Serializable::from(vec![value]);
		}
		assert!(Emitter::default().construct(&value, None).is_ok());

		let err = Emitter::default()
			.with_max_depth(5)
			.construct(&value, None)
			.unwrap_err();
		assert!(err.is_depth_error());
	}
}
