//! API request detection
//!
//! A request is an API request when any media type listed in its `Accept`
//! header is one of the configured API types. Parameters and quality values
//! play no part in the decision.

use super::media_type::MediaType;

/// Media types that mark a request as an API request unless configured otherwise
pub const DEFAULT_API_TYPES: [&str; 1] = ["application/json"];

/// Outcome of inspecting an `Accept` header
///
/// # Examples
///
/// ```
/// use dynamic_response_core::negotiation::ApiDetection;
///
/// let accept = Some("text/html, application/json;q=0.9");
/// let detection = ApiDetection::detect(accept, &["application/json"]);
/// assert!(detection.is_api);
/// assert_eq!(detection.accepts, vec!["text/html", "application/json"]);
///
/// let browser = ApiDetection::detect(Some("text/html"), &["application/json"]);
/// assert!(!browser.is_api);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiDetection {
	/// Accepted media types, parameters stripped, in header order
	pub accepts: Vec<String>,
	pub is_api: bool,
}

impl ApiDetection {
	pub fn detect<S: AsRef<str>>(accept: Option<&str>, api_types: &[S]) -> Self {
		let accepts: Vec<String> = accept
			.unwrap_or_default()
			.split(',')
			.filter_map(|entry| entry.split(';').next())
			.map(|essence| essence.trim().to_ascii_lowercase())
			.filter(|essence| !essence.is_empty())
			.collect();

		let is_api = accepts.iter().any(|accepted| {
			api_types
				.iter()
				.any(|api| api.as_ref().trim().eq_ignore_ascii_case(accepted))
		});

		Self { accepts, is_api }
	}

	/// Detection against [`DEFAULT_API_TYPES`]
	pub fn detect_default(accept: Option<&str>) -> Self {
		Self::detect(accept, &DEFAULT_API_TYPES)
	}

	/// Whether `media_type` is listed, ignoring its parameters
	pub fn accepts(&self, media_type: &str) -> bool {
		let wanted = MediaType::parse(media_type).map(|mt| mt.essence());
		match wanted {
			Some(wanted) => self.accepts.iter().any(|a| *a == wanted),
			None => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(None, false)]
	#[case(Some(""), false)]
	#[case(Some("text/html,application/xhtml+xml"), false)]
	#[case(Some("application/json"), true)]
	#[case(Some("text/html, Application/JSON; charset=utf-8"), true)]
	#[case(Some("*/*"), false)]
	fn test_detect_default(#[case] accept: Option<&str>, #[case] expected: bool) {
		assert_eq!(ApiDetection::detect_default(accept).is_api, expected);
	}

	#[rstest]
	fn test_custom_api_types() {
		let types = vec!["application/vnd.api+json".to_string()];
		let detection = ApiDetection::detect(Some("application/vnd.api+json"), &types);
		assert!(detection.is_api);
		assert!(!ApiDetection::detect(Some("application/json"), &types).is_api);
	}

	#[rstest]
	fn test_accepts_ignores_parameters() {
		let detection = ApiDetection::detect_default(Some("text/html;level=1, application/json"));
		assert!(detection.accepts("text/html"));
		assert!(detection.accepts("application/json; charset=utf-8"));
		assert!(!detection.accepts("text/plain"));
	}
}
