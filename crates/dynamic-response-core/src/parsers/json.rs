use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use super::parser::{ParseError, ParseResult, ParsedData, Parser};

/// JSON parser for `application/json` bodies
#[derive(Debug, Clone)]
pub struct JSONParser {
	/// Whether to allow empty bodies (returns null)
	pub allow_empty: bool,
	/// Whether to reject non-finite numbers
	pub strict: bool,
}

impl Default for JSONParser {
	fn default() -> Self {
		Self {
			allow_empty: false,
			strict: true,
		}
	}
}

impl JSONParser {
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::parsers::JSONParser;
	///
	/// let parser = JSONParser::new();
	/// assert!(!parser.allow_empty);
	/// assert!(parser.strict);
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	pub fn allow_empty(mut self, allow: bool) -> Self {
		self.allow_empty = allow;
		self
	}

	pub fn strict(mut self, strict: bool) -> Self {
		self.strict = strict;
		self
	}

	/// Synchronous parse used by middleware that already holds the body
	pub fn parse_slice(&self, body: &[u8]) -> ParseResult<Value> {
		if body.is_empty() {
			return if self.allow_empty {
				Ok(Value::Null)
			} else {
				Err(ParseError::ParseError("Empty request body".to_string()))
			};
		}

		let value = serde_json::from_slice::<Value>(body)
			.map_err(|e| ParseError::ParseError(format!("Invalid JSON: {}", e)))?;
		if self.strict {
			Self::validate_strict_json(&value)?;
		}
		Ok(value)
	}

	fn validate_strict_json(value: &Value) -> ParseResult<()> {
		match value {
			Value::Number(n) => {
				if let Some(f) = n.as_f64()
					&& !f.is_finite()
				{
					return Err(ParseError::ParseError(
						"Non-finite numbers are not allowed in strict mode".to_string(),
					));
				}
			}
			Value::Array(arr) => {
				for item in arr {
					Self::validate_strict_json(item)?;
				}
			}
			Value::Object(obj) => {
				for value in obj.values() {
					Self::validate_strict_json(value)?;
				}
			}
			_ => {}
		}
		Ok(())
	}
}

#[async_trait]
impl Parser for JSONParser {
	fn media_types(&self) -> Vec<String> {
		vec!["application/json".to_string()]
	}

	async fn parse(&self, _content_type: Option<&str>, body: Bytes) -> ParseResult<ParsedData> {
		self.parse_slice(&body).map(ParsedData::Json)
	}
}
