use async_trait::async_trait;
use chrono::Utc;
use dynamic_response_http::{Handler, Middleware, Request, Response, Result};
use std::sync::Arc;

/// Logs method, path, status and duration of every request
///
/// Successful responses are logged at `info`, handler errors at `error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl Middleware for LoggingMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let start = Utc::now();
		let method = request.method.to_string();
		let path = request.path().to_string();
		let is_api = request.is_api;

		let result = next.handle(request).await;

		let elapsed_ms = Utc::now().signed_duration_since(start).num_milliseconds();
		match &result {
			Ok(response) => tracing::info!(
				%method,
				%path,
				is_api,
				status = response.status.as_u16(),
				elapsed_ms,
				"Request completed"
			),
			Err(err) => tracing::error!(
				%method,
				%path,
				is_api,
				error = %err,
				elapsed_ms,
				"Request failed"
			),
		}

		result
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use dynamic_response_http::Error;
	use rstest::rstest;

	struct Failing;

	#[async_trait]
	impl Handler for Failing {
		async fn handle(&self, _request: Request) -> Result<Response> {
			Err(Error::Internal("boom".to_string()))
		}
	}

	struct Created;

	#[async_trait]
	impl Handler for Created {
		async fn handle(&self, _request: Request) -> Result<Response> {
			Ok(Response::new(http::StatusCode::CREATED))
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_passes_response_through() {
		let response = LoggingMiddleware::new()
			.process(Request::post("/posts/"), Arc::new(Created))
			.await
			.unwrap();
		assert_eq!(response.status, http::StatusCode::CREATED);
	}

	#[rstest]
	#[tokio::test]
	async fn test_passes_error_through() {
		let result = LoggingMiddleware::new().process(Request::get("/"), Arc::new(Failing)).await;
		assert!(matches!(result, Err(Error::Internal(ref message)) if message == "boom"));
	}
}
