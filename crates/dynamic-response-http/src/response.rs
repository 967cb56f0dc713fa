//! Outgoing responses

use crate::dynamic::DynamicResponse;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue, LOCATION, WWW_AUTHENTICATE};
use http::{HeaderMap, StatusCode};

/// An HTTP response, possibly still carrying an unrendered [`DynamicResponse`]
#[derive(Debug)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
	dynamic: Option<Box<DynamicResponse>>,
}

impl Response {
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
			dynamic: None,
		}
	}

	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	pub fn bad_request() -> Self {
		Self::new(StatusCode::BAD_REQUEST)
	}

	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	/// `302 Found` to `location`
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_http::Response;
	///
	/// let response = Response::redirect("/accounts/login/?next=/posts/");
	/// assert!(response.is_redirect());
	/// assert_eq!(response.location(), Some("/accounts/login/?next=/posts/"));
	/// ```
	pub fn redirect(location: &str) -> Self {
		Self::new(StatusCode::FOUND).with_location(location)
	}

	/// `401 Unauthorized` asking for Basic credentials in `realm`
	pub fn basic_challenge(realm: &str) -> Self {
		Self::new(StatusCode::UNAUTHORIZED)
			.with_header(WWW_AUTHENTICATE.as_str(), &format!("Basic realm=\"{}\"", realm))
	}

	/// A response whose content is decided later by the format middleware
	pub fn dynamic(dynamic: DynamicResponse) -> Self {
		let mut response = Self::ok();
		response.dynamic = Some(Box::new(dynamic));
		response
	}

	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
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

	pub fn with_location(self, location: &str) -> Self {
		self.with_header(LOCATION.as_str(), location)
	}

	pub fn with_content_type(self, content_type: &str) -> Self {
		self.with_header(CONTENT_TYPE.as_str(), content_type)
	}

	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}

	pub fn location(&self) -> Option<&str> {
		self.header(LOCATION.as_str())
	}

	pub fn content_type(&self) -> Option<&str> {
		self.header(CONTENT_TYPE.as_str())
	}

	pub fn is_redirect(&self) -> bool {
		self.status.is_redirection()
	}

	pub fn is_dynamic(&self) -> bool {
		self.dynamic.is_some()
	}

	pub fn dynamic_response(&self) -> Option<&DynamicResponse> {
		self.dynamic.as_deref()
	}

	/// Remove the pending dynamic response, leaving a plain response behind
	pub fn take_dynamic(&mut self) -> Option<DynamicResponse> {
		self.dynamic.take().map(|d| *d)
	}
}

impl From<DynamicResponse> for Response {
	fn from(dynamic: DynamicResponse) -> Self {
		Self::dynamic(dynamic)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_basic_challenge() {
		let response = Response::basic_challenge("API");
		assert_eq!(response.status, StatusCode::UNAUTHORIZED);
		assert_eq!(response.header("www-authenticate"), Some("Basic realm=\"API\""));
		assert!(response.body.is_empty());
	}

	#[rstest]
	fn test_take_dynamic() {
		let mut response = Response::from(DynamicResponse::serialize());
		assert!(response.is_dynamic());
		assert!(response.take_dynamic().is_some());
		assert!(!response.is_dynamic());
		assert!(response.take_dynamic().is_none());
	}

	#[rstest]
	#[case(StatusCode::MOVED_PERMANENTLY, true)]
	#[case(StatusCode::FOUND, true)]
	#[case(StatusCode::OK, false)]
	fn test_is_redirect(#[case] status: StatusCode, #[case] expected: bool) {
		assert_eq!(Response::new(status).is_redirect(), expected);
	}
}
