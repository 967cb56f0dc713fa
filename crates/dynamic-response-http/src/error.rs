//! Errors of the HTTP layer

use crate::Response;
use dynamic_response_core::auth::AuthenticationError;
use dynamic_response_core::parsers::ParseError;
use dynamic_response_core::serializers::SerializerError;
use http::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Serialization error: {0}")]
	Serialization(#[from] SerializerError),

	#[error("{0}")]
	Parse(#[from] ParseError),

	#[error("Authentication error: {0}")]
	Authentication(#[from] AuthenticationError),

	#[error("Template error: {0}")]
	Template(String),

	#[error("HTTP error: {0}")]
	Http(#[from] http::Error),

	#[error("Internal error: {0}")]
	Internal(String),
}

impl Error {
	pub fn status_code(&self) -> StatusCode {
		match self {
			Error::Parse(_) => StatusCode::BAD_REQUEST,
			Error::Authentication(_) => StatusCode::UNAUTHORIZED,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

/// The message is only exposed for client errors
impl From<Error> for Response {
	fn from(error: Error) -> Self {
		let status = error.status_code();
		let response = Response::new(status).with_content_type("text/plain; charset=utf-8");
		if status.is_server_error() {
			response.with_body(status.canonical_reason().unwrap_or("Internal Server Error"))
		} else {
			response.with_body(error.to_string())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_server_errors_hide_details() {
		let response = Response::from(Error::Template("missing post.html".to_string()));
		assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(response.body, "Internal Server Error");
	}

	#[rstest]
	fn test_parse_error_is_client_error() {
		let error = Error::from(ParseError::ParseError("Invalid JSON".to_string()));
		assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(Response::from(error).body, "Parse error: Invalid JSON");
	}
}
