//! Flattening of JSON payloads into form data
//!
//! Rules, applied to every member of the top-level object:
//!
//! - an array spreads its items: object items are flattened under the
//!   `{key}-{index}-` prefix (the formset convention) and their truthy `id`
//!   is appended under `key`, other items are appended under `key` directly
//!   (the multiple-choice convention)
//! - an object is stored under `key` as its `id`, or as its JSON text when it
//!   has none (the model-choice convention)
//! - anything else is stored as text: `null` becomes the empty string,
//!   booleans are `true`/`false`, numbers keep their JSON form

use super::query_dict::QueryDict;
use serde_json::{Map, Value};

/// Flatten a decoded JSON body
///
/// Inputs other than an object yield an empty dict.
///
/// # Examples
///
/// ```
/// use dynamic_response_core::parsers::flatten_json;
/// use serde_json::json;
///
/// let form = flatten_json(&json!({
///     "title": "Hi",
///     "author": {"id": 3, "name": "x"},
///     "tags": [1, 2],
///     "items": [{"id": 7, "qty": 2}],
/// }));
///
/// assert_eq!(form.get("title"), Some("Hi"));
/// assert_eq!(form.get("author"), Some("3"));
/// assert_eq!(form.get_list("tags"), &["1", "2"]);
/// assert_eq!(form.get("items-0-qty"), Some("2"));
/// assert_eq!(form.get("items"), Some("7"));
/// ```
pub fn flatten_json(value: &Value) -> QueryDict {
	match value {
		Value::Object(map) => flatten_object(map, ""),
		other => {
			tracing::debug!(kind = kind_of(other), "Ignoring non-object JSON payload");
			QueryDict::new()
		}
	}
}

fn flatten_object(map: &Map<String, Value>, prefix: &str) -> QueryDict {
	let mut encoded = QueryDict::new();

	for (key, value) in map {
		let item_key = format!("{}{}", prefix, key);

		match value {
			Value::Array(items) => {
				for (index, item) in items.iter().enumerate() {
					match item {
						Value::Object(nested) => {
							let item_prefix = format!("{}-{}-", item_key, index);
							encoded.update(flatten_object(nested, &item_prefix));

							if let Some(id) = nested.get("id").filter(|id| is_truthy(id)) {
								encoded.append(item_key.clone(), stringify(id));
							}
						}
						scalar => encoded.append(item_key.clone(), stringify(scalar)),
					}
				}
			}
			Value::Object(nested) => {
				let stored = match nested.get("id") {
					Some(id) => stringify(id),
					None => value.to_string(),
				};
				encoded.set(item_key, stored);
			}
			scalar => encoded.set(item_key, stringify(scalar)),
		}
	}

	encoded
}

fn stringify(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
		Value::String(s) => !s.is_empty(),
		Value::Array(a) => !a.is_empty(),
		Value::Object(o) => !o.is_empty(),
	}
}

fn kind_of(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "bool",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}
