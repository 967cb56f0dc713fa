//! JSON responses

use crate::{Response, Result};
use bytes::Bytes;
use dynamic_response_conf::Settings;
use dynamic_response_core::serializers::{
	Emitter, FieldSelection, JsonRenderer, Serializable, TypeRegistry,
};
use http::StatusCode;
use std::sync::Arc;

/// A serialized payload ready to be sent
///
/// The body is indented by four spaces when `settings.debug` is set, and the
/// content type names `settings.default_charset`.
///
/// # Examples
///
/// ```
/// use dynamic_response_conf::Settings;
/// use dynamic_response_core::serializers::{Serializable, TypeRegistry};
/// use dynamic_response_http::{JsonResponse, Response};
/// use std::sync::Arc;
///
/// let value = Serializable::map([("ok", true)]);
/// let registry = Arc::new(TypeRegistry::empty());
/// let json = JsonResponse::new(&value, &Settings::default(), &registry).unwrap();
/// let response = Response::from(json);
///
/// assert_eq!(response.body, r#"{"ok":true}"#);
/// assert_eq!(response.content_type(), Some("application/json; charset=utf-8"));
/// ```
#[derive(Debug, Clone)]
pub struct JsonResponse {
	pub status: StatusCode,
	pub content_type: String,
	pub body: Bytes,
}

impl JsonResponse {
	pub fn new(
		value: &Serializable,
		settings: &Settings,
		registry: &Arc<TypeRegistry>,
	) -> Result<Self> {
		Self::with_fields(value, None, settings, registry)
	}

	/// Serialize with a field selection applied to the models in `value`
	pub fn with_fields(
		value: &Serializable,
		fields: Option<&FieldSelection>,
		settings: &Settings,
		registry: &Arc<TypeRegistry>,
	) -> Result<Self> {
		let emitter = Emitter::new(registry.clone());
		Self::from_emitter(&emitter, value, fields, settings)
	}

	pub fn from_emitter(
		emitter: &Emitter,
		value: &Serializable,
		fields: Option<&FieldSelection>,
		settings: &Settings,
	) -> Result<Self> {
		let tree = emitter.construct(value, fields)?;
		let text = JsonRenderer::for_debug(settings.debug).render(&tree)?;

		Ok(Self {
			status: StatusCode::OK,
			content_type: settings.json_content_type(),
			body: Bytes::from(text),
		})
	}

	pub fn with_status(mut self, status: StatusCode) -> Self {
		self.status = status;
		self
	}
}

impl From<JsonResponse> for Response {
	fn from(json: JsonResponse) -> Self {
		Response::new(json.status)
			.with_content_type(&json.content_type)
			.with_body(json.body)
	}
}
