//! Incoming requests

use bytes::Bytes;
use dynamic_response_core::auth::User;
use dynamic_response_core::parsers::QueryDict;
use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, Method, Uri};

/// An HTTP request plus the state attached to it by the middleware
#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub headers: HeaderMap,
	pub body: Bytes,
	/// Set when the `Accept` header lists an API media type
	pub is_api: bool,
	/// Accepted media types, parameters stripped, in header order
	pub accepts: Vec<String>,
	/// The authenticated user, if any
	pub user: Option<User>,
	/// Form data, filled from JSON payloads by the format middleware
	pub post: QueryDict,
}

impl Request {
	pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
		Self {
			method,
			uri,
			headers,
			body,
			is_api: false,
			accepts: Vec::new(),
			user: None,
			post: QueryDict::new(),
		}
	}

	/// A bodiless request for `uri`
	///
	/// An unparseable `uri` falls back to `/`.
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_http::Request;
	///
	/// let request = Request::get("/posts/?page=2").with_header("Accept", "application/json");
	/// assert_eq!(request.path(), "/posts/");
	/// assert_eq!(request.header("accept"), Some("application/json"));
	/// assert!(!request.is_authenticated());
	/// ```
	pub fn get(uri: &str) -> Self {
		Self::with_method(Method::GET, uri)
	}

	pub fn post(uri: &str) -> Self {
		Self::with_method(Method::POST, uri)
	}

	pub fn with_method(method: Method, uri: &str) -> Self {
		let uri = uri.parse::<Uri>().unwrap_or_else(|_| Uri::from_static("/"));
		Self::new(method, uri, HeaderMap::new(), Bytes::new())
	}

	/// Add a header; invalid names or values are ignored
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let Ok(name) = HeaderName::from_bytes(name.as_bytes())
			&& let Ok(value) = HeaderValue::from_str(value)
		{
			self.headers.insert(name, value);
		}
		self
	}

	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// A JSON body with the matching `Content-Type`
	pub fn with_json_body(self, body: impl Into<Bytes>) -> Self {
		self.with_header(CONTENT_TYPE.as_str(), "application/json")
			.with_body(body)
	}

	pub fn with_user(mut self, user: User) -> Self {
		self.user = Some(user);
		self
	}

	pub fn path(&self) -> &str {
		self.uri.path()
	}

	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}

	pub fn content_type(&self) -> Option<&str> {
		self.header(CONTENT_TYPE.as_str())
	}

	pub fn authorization(&self) -> Option<&str> {
		self.header(AUTHORIZATION.as_str())
	}

	pub fn is_authenticated(&self) -> bool {
		self.user.is_some()
	}
}
