//! JSON text rendering

use super::error::SerializerResult;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Indentation used for debug output
pub const DEBUG_INDENT: usize = 4;

/// Turns an emitted tree into JSON text
///
/// Compact by default. Non-ASCII characters are written as-is unless
/// [`ensure_ascii`](Self::ensure_ascii) is enabled, in which case they are
/// escaped as `\uXXXX` (with surrogate pairs outside the BMP).
///
/// # Examples
///
/// ```
/// use dynamic_response_core::serializers::JsonRenderer;
/// use serde_json::json;
///
/// let value = json!({"name": "café"});
/// assert_eq!(JsonRenderer::new().render(&value).unwrap(), r#"{"name":"café"}"#);
/// assert_eq!(
///     JsonRenderer::new().ensure_ascii(true).render(&value).unwrap(),
///     r#"{"name":"caf\u00e9"}"#
/// );
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonRenderer {
	indent: Option<usize>,
	ensure_ascii: bool,
}

impl JsonRenderer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Pretty-print with `indent` spaces per level
	pub fn pretty(mut self, indent: usize) -> Self {
		self.indent = Some(indent);
		self
	}

	/// Renderer matching the debug flag: indented by four spaces when set
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::serializers::JsonRenderer;
	/// use serde_json::json;
	///
	/// let text = JsonRenderer::for_debug(true).render(&json!({"a": 1})).unwrap();
	/// assert_eq!(text, "{\n    \"a\": 1\n}");
	/// ```
	pub fn for_debug(debug: bool) -> Self {
		if debug {
			Self::new().pretty(DEBUG_INDENT)
		} else {
			Self::new()
		}
	}

	pub fn ensure_ascii(mut self, ensure_ascii: bool) -> Self {
		self.ensure_ascii = ensure_ascii;
		self
	}

	pub fn indent(&self) -> Option<usize> {
		self.indent
	}

	pub fn render(&self, value: &Value) -> SerializerResult<String> {
		let text = match self.indent {
			Some(width) => {
				let indent = " ".repeat(width);
				let mut buf = Vec::new();
				let formatter = PrettyFormatter::with_indent(indent.as_bytes());
				let mut serializer = Serializer::with_formatter(&mut buf, formatter);
				value.serialize(&mut serializer)?;
				String::from_utf8_lossy(&buf).into_owned()
			}
			None => serde_json::to_string(value)?,
		};

		if self.ensure_ascii {
			Ok(escape_non_ascii(&text))
		} else {
			Ok(text)
		}
	}

	pub fn render_bytes(&self, value: &Value) -> SerializerResult<Vec<u8>> {
		self.render(value).map(String::into_bytes)
	}
}

/// Non-ASCII characters only ever appear inside JSON strings, so escaping the
/// rendered text is equivalent to escaping every string.
fn escape_non_ascii(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		if c.is_ascii() {
			out.push(c);
		} else {
			let mut units = [0u16; 2];
			for unit in c.encode_utf16(&mut units) {
				out.push_str(&format!("\\u{:04x}", unit));
			}
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_compact_keeps_key_order() {
		let value = json!({"z": 1, "a": [true, null]});
		assert_eq!(
			JsonRenderer::new().render(&value).unwrap(),
			r#"{"z":1,"a":[true,null]}"#
		);
	}

	#[rstest]
	fn test_pretty_nested() {
		let value = json!({"a": [1]});
		let text = JsonRenderer::new().pretty(2).render(&value).unwrap();
		assert_eq!(text, "{\n  \"a\": [\n    1\n  ]\n}");
	}

	#[rstest]
	#[case("é", r#""\u00e9""#)]
	#[case("😀", r#""\ud83d\ude00""#)]
	#[case("plain", r#""plain""#)]
	fn test_ensure_ascii(#[case] input: &str, #[case] expected: &str) {
		let text = JsonRenderer::new()
			.ensure_ascii(true)
			.render(&json!(input))
			.unwrap();
		assert_eq!(text, expected);
	}

	#[rstest]
	fn test_for_debug_flag() {
		assert_eq!(JsonRenderer::for_debug(false).indent(), None);
		assert_eq!(JsonRenderer::for_debug(true).indent(), Some(DEBUG_INDENT));
	}
}
