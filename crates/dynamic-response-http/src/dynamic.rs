//! Responses that adapt to the client
//!
//! A view builds a [`DynamicResponse`] without knowing who asked. The format
//! middleware later calls [`DynamicResponse::render_response`], which picks
//! JSON for API requests and a template or redirect for browsers.

use crate::{Error, JsonResponse, Request, Response, Result, TemplateRenderer};
use dynamic_response_conf::Settings;
use dynamic_response_core::serializers::{Emitter, FieldSelection, Serializable, TypeRegistry};
use http::StatusCode;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Outcome of a view, as reported to API clients
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
	#[default]
	Ok,
	InvalidData,
	NotFound,
	Confirm,
	Deleted,
	RequiresUpgrade,
}

impl ResponseStatus {
	pub fn code(&self) -> StatusCode {
		match self {
			ResponseStatus::Ok => StatusCode::OK,
			ResponseStatus::InvalidData => StatusCode::BAD_REQUEST,
			ResponseStatus::NotFound => StatusCode::NOT_FOUND,
			ResponseStatus::Confirm => StatusCode::METHOD_NOT_ALLOWED,
			ResponseStatus::Deleted => StatusCode::NO_CONTENT,
			ResponseStatus::RequiresUpgrade => StatusCode::PAYMENT_REQUIRED,
		}
	}

	pub fn label(&self) -> &'static str {
		match self {
			ResponseStatus::Ok => "OK",
			ResponseStatus::InvalidData => "INVALID",
			ResponseStatus::NotFound => "NOT_FOUND",
			ResponseStatus::Confirm => "CONFIRM",
			ResponseStatus::Deleted => "DELETED",
			ResponseStatus::RequiresUpgrade => "REQUIRES_UPGRADE",
		}
	}
}

impl fmt::Display for ResponseStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.label(), self.code().as_u16())
	}
}

/// What a browser gets back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseKind {
	/// Render `template` with the full context
	SerializeOrRender { template: String },
	/// Redirect to `url`
	SerializeOrRedirect { url: String },
	/// JSON for everybody
	Serialize,
}

/// Everything needed to turn a [`DynamicResponse`] into bytes
///
/// Built once at startup and shared between requests.
#[derive(Clone)]
pub struct ResponseRenderer {
	settings: Arc<Settings>,
	emitter: Emitter,
	templates: Option<Arc<dyn TemplateRenderer>>,
}

impl ResponseRenderer {
	pub fn new(settings: Arc<Settings>, registry: Arc<TypeRegistry>) -> Self {
		Self {
			settings,
			emitter: Emitter::new(registry),
			templates: None,
		}
	}

	pub fn with_templates<T: TemplateRenderer + 'static>(mut self, templates: T) -> Self {
		self.templates = Some(Arc::new(templates));
		self
	}

	/// Bound the nesting depth of serialized output
	pub fn with_max_depth(mut self, max_depth: usize) -> Self {
		self.emitter = self.emitter.with_max_depth(max_depth);
		self
	}

	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	pub fn emitter(&self) -> &Emitter {
		&self.emitter
	}

	fn render_template(
		&self,
		template: &str,
		context: &Serializable,
		request: &Request,
	) -> Result<String> {
		let templates = self
			.templates
			.as_ref()
			.ok_or_else(|| {
				Error::Template(format!("no template renderer configured for '{}'", template))
			})?;
		let context = self.emitter.construct(context, None)?;
		templates.render(template, &context, request)
	}
}

impl fmt::Debug for ResponseRenderer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ResponseRenderer")
			.field("settings", &self.settings)
			.field("emitter", &self.emitter)
			.field("templates", &self.templates.is_some())
			.finish()
	}
}

/// A view result whose representation depends on the request
///
/// # Examples
///
/// ```
/// use dynamic_response_core::serializers::Serializable;
/// use dynamic_response_http::{DynamicResponse, ResponseStatus};
///
/// let response = DynamicResponse::serialize_or_render("posts/edit.html")
///     .with_context("form_errors", Serializable::from(vec!["title is required"]))
///     .with_status(ResponseStatus::InvalidData)
///     .with_extra("page_title", "Edit post");
///
/// assert_eq!(response.status.code(), http::StatusCode::BAD_REQUEST);
/// assert_eq!(response.full_context().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct DynamicResponse {
	pub kind: ResponseKind,
	/// Serialized for API clients
	pub context: IndexMap<String, Serializable>,
	pub status: ResponseStatus,
	/// Template-only additions to the context
	pub extra: IndexMap<String, Serializable>,
	pub extra_headers: Vec<(String, String)>,
	pub fields: Option<FieldSelection>,
	/// Per-field validation messages, reported to API clients on
	/// `InvalidData` when `json_form_errors` is enabled
	pub form_errors: Option<IndexMap<String, Serializable>>,
}

impl DynamicResponse {
	fn with_kind(kind: ResponseKind) -> Self {
		Self {
			kind,
			context: IndexMap::new(),
			status: ResponseStatus::Ok,
			extra: IndexMap::new(),
			extra_headers: Vec::new(),
			fields: None,
			form_errors: None,
		}
	}

	pub fn serialize_or_render(template: impl Into<String>) -> Self {
		Self::with_kind(ResponseKind::SerializeOrRender {
			template: template.into(),
		})
	}

	pub fn serialize_or_redirect(url: impl Into<String>) -> Self {
		Self::with_kind(ResponseKind::SerializeOrRedirect { url: url.into() })
	}

	pub fn serialize() -> Self {
		Self::with_kind(ResponseKind::Serialize)
	}

	pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Serializable>) -> Self {
		self.context.insert(key.into(), value.into());
		self
	}

	pub fn with_status(mut self, status: ResponseStatus) -> Self {
		self.status = status;
		self
	}

	pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Serializable>) -> Self {
		self.extra.insert(key.into(), value.into());
		self
	}

	/// Set a header on whatever response is produced
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra_headers.push((name.into(), value.into()));
		self
	}

	/// Field selection applied to models in the serialized context
	pub fn with_fields(mut self, fields: impl Into<FieldSelection>) -> Self {
		self.fields = Some(fields.into());
		self
	}

	pub fn with_form_errors(mut self, errors: IndexMap<String, Serializable>) -> Self {
		self.form_errors = Some(errors);
		self
	}

	/// Context overlaid with the extra entries
	pub fn full_context(&self) -> IndexMap<String, Serializable> {
		let mut full = self.context.clone();
		for (key, value) in &self.extra {
			full.insert(key.clone(), value.clone());
		}
		full
	}

	/// JSON of the context when the status is OK, an empty response otherwise
	///
	/// With `json_form_errors` enabled, an `InvalidData` response carrying
	/// form errors becomes `{"field_errors": {...}}` with status 400.
	pub fn serialize_response(&self, renderer: &ResponseRenderer) -> Result<Response> {
		let code = self.status.code();
		if code != StatusCode::OK {
			if let Some(errors) = self.reported_form_errors(renderer.settings()) {
				let payload =
					Serializable::map([("field_errors", Serializable::Map(errors.clone()))]);
				let json = JsonResponse::from_emitter(
					renderer.emitter(),
					&payload,
					None,
					renderer.settings(),
				)?;
				return Ok(json.with_status(code).into());
			}
			return Ok(Response::new(code));
		}

		let context = Serializable::Map(self.context.clone());
		let json = JsonResponse::from_emitter(
			renderer.emitter(),
			&context,
			self.fields.as_ref(),
			renderer.settings(),
		)?;
		Ok(json.into())
	}

	fn reported_form_errors(&self, settings: &Settings) -> Option<&IndexMap<String, Serializable>> {
		if !settings.json_form_errors || self.status != ResponseStatus::InvalidData {
			return None;
		}
		self.form_errors.as_ref().filter(|errors| !errors.is_empty())
	}

	/// Produce the final response for `request`
	///
	/// # Errors
	///
	/// Serialization failures are returned as [`Error::Serialization`]. A
	/// browser request for a template fails with [`Error::Template`] when the
	/// renderer has no template engine.
	pub fn render_response(
		&self,
		request: &Request,
		renderer: &ResponseRenderer,
	) -> Result<Response> {
		let response = match &self.kind {
			_ if request.is_api => self.serialize_response(renderer)?,
			ResponseKind::Serialize => self.serialize_response(renderer)?,
			ResponseKind::SerializeOrRedirect { url } => Response::redirect(url),
			ResponseKind::SerializeOrRender { template } => {
				let context = Serializable::Map(self.full_context());
				let html = renderer.render_template(template, &context, request)?;
				Response::new(self.status.code())
					.with_content_type(&format!(
						"text/html; charset={}",
						renderer.settings().default_charset
					))
					.with_body(html)
			}
		};

		tracing::debug!(
			status = %self.status,
			is_api = request.is_api,
			"Rendered dynamic response"
		);

		Ok(self
			.extra_headers
			.iter()
			.fold(response, |response, (name, value)| response.with_header(name, value)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::header::CONTENT_TYPE;
	use rstest::{fixture, rstest};

	#[fixture]
	fn renderer() -> ResponseRenderer {
		ResponseRenderer::new(Arc::new(Settings::default()), Arc::new(TypeRegistry::empty()))
	}

	fn api_request() -> Request {
		let mut request = Request::get("/posts/");
		request.is_api = true;
		request
	}

	#[rstest]
	#[case(ResponseStatus::Ok, 200, "OK")]
	#[case(ResponseStatus::InvalidData, 400, "INVALID")]
	#[case(ResponseStatus::NotFound, 404, "NOT_FOUND")]
	#[case(ResponseStatus::Confirm, 405, "CONFIRM")]
	#[case(ResponseStatus::Deleted, 204, "DELETED")]
	#[case(ResponseStatus::RequiresUpgrade, 402, "REQUIRES_UPGRADE")]
	fn test_status_table(#[case] status: ResponseStatus, #[case] code: u16, #[case] label: &str) {
		assert_eq!(status.code().as_u16(), code);
		assert_eq!(status.label(), label);
	}

	#[rstest]
	fn test_full_context_overlays_extra() {
		let response = DynamicResponse::serialize()
			.with_context("a", 1)
			.with_context("b", 2)
			.with_extra("b", 20)
			.with_extra("c", 30);
		let full = response.full_context();
		let keys: Vec<&str> = full.keys().map(String::as_str).collect();
		assert_eq!(keys, vec!["a", "b", "c"]);
		assert!(matches!(full["b"], Serializable::Int(20)));
	}

	#[rstest]
	fn test_non_ok_status_has_empty_body(renderer: ResponseRenderer) {
		let response = DynamicResponse::serialize_or_redirect("/posts/")
			.with_context("title", "ignored")
			.with_status(ResponseStatus::NotFound)
			.render_response(&api_request(), &renderer)
			.unwrap();
		assert_eq!(response.status, StatusCode::NOT_FOUND);
		assert!(response.body.is_empty());
		assert!(response.content_type().is_none());
	}

	#[rstest]
	fn test_extra_is_not_serialized(renderer: ResponseRenderer) {
		let response = DynamicResponse::serialize()
			.with_context("id", 1)
			.with_extra("page_title", "Post")
			.render_response(&Request::get("/"), &renderer)
			.unwrap();
		assert_eq!(response.body, r#"{"id":1}"#);
	}

	#[rstest]
	fn test_browser_redirect(renderer: ResponseRenderer) {
		let response = DynamicResponse::serialize_or_redirect("/posts/")
			.with_header("X-Saved", "1")
			.render_response(&Request::post("/posts/new/"), &renderer)
			.unwrap();
		assert_eq!(response.status, StatusCode::FOUND);
		assert_eq!(response.location(), Some("/posts/"));
		assert_eq!(response.header("x-saved"), Some("1"));
	}

	#[rstest]
	fn test_browser_template(renderer: ResponseRenderer) {
		let renderer = renderer.with_templates(
			|template: &str, context: &serde_json::Value, _: &Request| -> Result<String> {
				Ok(format!("{}:{}", template, context))
			},
		);
		let response = DynamicResponse::serialize_or_render("post.html")
			.with_context("id", 1)
			.with_extra("title", "Hi")
			.render_response(&Request::get("/posts/1/"), &renderer)
			.unwrap();
		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(response.body, r#"post.html:{"id":1,"title":"Hi"}"#);
		assert_eq!(response.header(CONTENT_TYPE.as_str()), Some("text/html; charset=utf-8"));
	}

	#[rstest]
	fn test_missing_template_engine(renderer: ResponseRenderer) {
		let result = DynamicResponse::serialize_or_render("post.html")
			.render_response(&Request::get("/"), &renderer);
		assert!(matches!(result, Err(Error::Template(_))));
	}

	#[rstest]
	fn test_fields_apply_to_context(renderer: ResponseRenderer) {
		use dynamic_response_core::auth::User;

		let response = DynamicResponse::serialize()
			.with_context("user", Serializable::object(User::new(3, "dave")))
			.with_fields(["id"])
			.serialize_response(&renderer)
			.unwrap();
		assert_eq!(response.body, r#"{"user":{"id":3,"first_name":"","email":""}}"#);
	}
}
