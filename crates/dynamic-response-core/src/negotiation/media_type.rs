//! Media types

use std::fmt;

/// A parsed media range such as `application/json; charset=utf-8; q=0.8`
#[derive(Debug, Clone, PartialEq)]
pub struct MediaType {
	pub type_: String,
	pub subtype: String,
	/// Parameters other than `q`, in header order
	pub parameters: Vec<(String, String)>,
	pub quality: f32,
}

impl MediaType {
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::negotiation::MediaType;
	///
	/// let json = MediaType::new("application", "json");
	/// assert_eq!(json.to_string(), "application/json");
	/// assert_eq!(json.quality, 1.0);
	/// ```
	pub fn new(type_: impl Into<String>, subtype: impl Into<String>) -> Self {
		Self {
			type_: type_.into(),
			subtype: subtype.into(),
			parameters: Vec::new(),
			quality: 1.0,
		}
	}

	pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.parameters.push((name.into(), value.into()));
		self
	}

	pub fn with_quality(mut self, quality: f32) -> Self {
		self.quality = quality;
		self
	}

	/// Parse a single media range
	///
	/// Returns `None` when the `type/subtype` part is missing or empty.
	/// A malformed quality value falls back to 1.0.
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::negotiation::MediaType;
	///
	/// let mt = MediaType::parse("text/html; level=1; q=0.5").unwrap();
	/// assert_eq!(mt.type_, "text");
	/// assert_eq!(mt.subtype, "html");
	/// assert_eq!(mt.quality, 0.5);
	/// assert_eq!(mt.param("level"), Some("1"));
	/// assert!(MediaType::parse("garbage").is_none());
	/// ```
	pub fn parse(s: &str) -> Option<Self> {
		let mut parts = s.split(';');
		let essence = parts.next()?.trim();
		let (type_, subtype) = essence.split_once('/')?;
		let (type_, subtype) = (type_.trim(), subtype.trim());
		if type_.is_empty() || subtype.is_empty() {
			return None;
		}

		let mut media_type = Self::new(type_.to_ascii_lowercase(), subtype.to_ascii_lowercase());
		for param in parts {
			let Some((name, value)) = param.split_once('=') else {
				continue;
			};
			let name = name.trim().to_ascii_lowercase();
			let value = value.trim().trim_matches('"');
			if name == "q" {
				media_type.quality = value
					.parse::<f32>()
					.ok()
					.filter(|q| (0.0..=1.0).contains(q))
					.unwrap_or(1.0);
			} else {
				media_type.parameters.push((name, value.to_string()));
			}
		}
		Some(media_type)
	}

	pub fn param(&self, name: &str) -> Option<&str> {
		self.parameters
			.iter()
			.find(|(n, _)| n.eq_ignore_ascii_case(name))
			.map(|(_, v)| v.as_str())
	}

	/// `type/subtype` without parameters
	pub fn essence(&self) -> String {
		format!("{}/{}", self.type_, self.subtype)
	}

	/// Wildcard-aware match (`*/*`, `text/*`)
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::negotiation::MediaType;
	///
	/// let any_text = MediaType::new("text", "*");
	/// assert!(any_text.matches(&MediaType::new("text", "html")));
	/// assert!(!any_text.matches(&MediaType::new("application", "json")));
	/// ```
	pub fn matches(&self, other: &MediaType) -> bool {
		let type_matches = self.type_ == "*" || other.type_ == "*" || self.type_ == other.type_;
		let subtype_matches =
			self.subtype == "*" || other.subtype == "*" || self.subtype == other.subtype;
		type_matches && subtype_matches
	}

	/// Same `type/subtype`, ignoring parameters and quality
	pub fn same_essence(&self, other: &MediaType) -> bool {
		self.type_ == other.type_ && self.subtype == other.subtype
	}
}

impl fmt::Display for MediaType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.type_, self.subtype)?;
		for (name, value) in &self.parameters {
			write!(f, "; {}={}", name, value)?;
		}
		Ok(())
	}
}
