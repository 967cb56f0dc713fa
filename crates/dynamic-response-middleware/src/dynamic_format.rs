//! JSON payloads in, dynamic responses out

use async_trait::async_trait;
use dynamic_response_core::negotiation::MediaType;
use dynamic_response_core::parsers::{JSONParser, flatten_json};
use dynamic_response_http::{Handler, Middleware, Request, Response, ResponseRenderer, Result};
use http::StatusCode;
use http::header::CONTENT_LENGTH;
use std::sync::Arc;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Content negotiation for request bodies and responses
///
/// On the way in, a non-empty `application/json` body replaces
/// `request.post` with its flattened form; a body that does not parse is
/// answered with `400 Invalid JSON`. On the way out, a response carrying a
/// pending [`DynamicResponse`](dynamic_response_http::DynamicResponse) is
/// rendered for the request.
pub struct DynamicFormatMiddleware {
	renderer: ResponseRenderer,
	parser: JSONParser,
}

impl DynamicFormatMiddleware {
	pub fn new(renderer: ResponseRenderer) -> Self {
		Self {
			renderer,
			parser: JSONParser::new(),
		}
	}

	pub fn with_parser(mut self, parser: JSONParser) -> Self {
		self.parser = parser;
		self
	}

	fn is_json(request: &Request) -> bool {
		request
			.content_type()
			.and_then(MediaType::parse)
			.is_some_and(|media_type| media_type.essence() == JSON_CONTENT_TYPE)
	}

	/// `Content-Length` when sent, the body size otherwise
	fn content_length(request: &Request) -> usize {
		request
			.header(CONTENT_LENGTH.as_str())
			.and_then(|value| value.trim().parse().ok())
			.unwrap_or(request.body.len())
	}

	fn decode_body(&self, request: &mut Request) -> std::result::Result<(), Response> {
		if !Self::is_json(request) || Self::content_length(request) == 0 {
			return Ok(());
		}

		match self.parser.parse_slice(&request.body) {
			Ok(value) => {
				request.post = flatten_json(&value);
				tracing::debug!(
					fields = request.post.len(),
					path = %request.path(),
					"Flattened JSON payload"
				);
				Ok(())
			}
			Err(err) => {
				tracing::warn!(error = %err, path = %request.path(), "Rejected JSON payload");
				Err(Response::new(StatusCode::BAD_REQUEST)
					.with_content_type("text/plain; charset=utf-8")
					.with_body("Invalid JSON"))
			}
		}
	}
}

#[async_trait]
impl Middleware for DynamicFormatMiddleware {
	async fn process(&self, mut request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		if let Err(rejection) = self.decode_body(&mut request) {
			return Ok(rejection);
		}

		// The handler consumes the request; rendering needs is_api and user
		let rendering_request = request.clone();
		let mut response = next.handle(request).await?;

		match response.take_dynamic() {
			Some(dynamic) => dynamic.render_response(&rendering_request, &self.renderer),
			None => Ok(response),
		}
	}
}
