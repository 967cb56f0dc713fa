//! The parser seam

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use super::query_dict::QueryDict;

pub type ParseResult<T> = Result<T, ParseError>;

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
	#[error("Parse error: {0}")]
	ParseError(String),
	#[error("Unsupported media type: {0}")]
	UnsupportedMediaType(String),
}

/// Output of a [`Parser`]
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedData {
	Json(Value),
	Form(QueryDict),
}

impl ParsedData {
	/// Form view of the data; JSON values are flattened
	pub fn into_form(self) -> QueryDict {
		match self {
			ParsedData::Json(value) => super::flatten_json(&value),
			ParsedData::Form(form) => form,
		}
	}
}

/// Turns a request body into structured data
#[async_trait]
pub trait Parser: Send + Sync {
	/// Media ranges this parser handles
	fn media_types(&self) -> Vec<String>;

	async fn parse(&self, content_type: Option<&str>, body: Bytes) -> ParseResult<ParsedData>;

	/// Whether `content_type` (parameters ignored) is handled by this parser
	fn can_parse(&self, content_type: &str) -> bool {
		let Some(requested) = crate::negotiation::MediaType::parse(content_type) else {
			return false;
		};
		self.media_types()
			.iter()
			.filter_map(|mt| crate::negotiation::MediaType::parse(mt))
			.any(|supported| supported.same_essence(&requested))
	}
}
