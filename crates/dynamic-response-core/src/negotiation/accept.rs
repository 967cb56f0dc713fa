//! Accept header parsing

use super::media_type::MediaType;

/// Represents an Accept header
#[derive(Debug, Clone, Default)]
pub struct AcceptHeader {
	pub media_types: Vec<MediaType>,
}

impl AcceptHeader {
	/// Parses an Accept header, ordering entries by quality (highest first)
	///
	/// Entries of equal quality keep their header order. Unparseable entries
	/// are dropped.
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::negotiation::AcceptHeader;
	///
	/// let accept = AcceptHeader::parse("text/html, application/json; q=0.8, */*; q=0.1");
	/// assert_eq!(accept.media_types.len(), 3);
	/// assert_eq!(accept.media_types[0].subtype, "html");
	/// assert_eq!(accept.media_types[2].quality, 0.1);
	/// ```
	pub fn parse(header: &str) -> Self {
		let mut media_types: Vec<MediaType> = header
			.split(',')
			.filter_map(|s| MediaType::parse(s.trim()))
			.collect();

		media_types.sort_by(|a, b| b.quality.total_cmp(&a.quality));

		Self { media_types }
	}

	pub fn empty() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.media_types.is_empty()
	}

	/// Finds the best matching media type from available options
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::negotiation::{AcceptHeader, MediaType};
	///
	/// let accept = AcceptHeader::parse("application/json, text/html");
	/// let available = vec![MediaType::new("text", "html"), MediaType::new("application", "xml")];
	/// assert_eq!(accept.find_best_match(&available).unwrap().subtype, "html");
	///
	/// let no_match = AcceptHeader::parse("application/json");
	/// assert!(no_match.find_best_match(&available).is_none());
	/// ```
	pub fn find_best_match(&self, available: &[MediaType]) -> Option<MediaType> {
		self.media_types
			.iter()
			.filter(|accepted| accepted.quality > 0.0)
			.find_map(|accepted| available.iter().find(|a| accepted.matches(a)))
			.cloned()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_equal_quality_is_stable() {
		let accept = AcceptHeader::parse("text/plain;q=0.5, application/xml, application/json");
		let order: Vec<String> = accept.media_types.iter().map(MediaType::essence).collect();
		assert_eq!(order, vec!["application/xml", "application/json", "text/plain"]);
	}

	#[rstest]
	fn test_zero_quality_is_never_chosen() {
		let accept = AcceptHeader::parse("application/json;q=0, */*;q=0.1");
		let available = vec![MediaType::new("application", "json")];
		let best = accept.find_best_match(&available).unwrap();
		assert_eq!(best.essence(), "application/json");

		let refused = AcceptHeader::parse("application/json;q=0");
		assert!(refused.find_best_match(&available).is_none());
	}

	#[rstest]
	fn test_empty_header() {
		assert!(AcceptHeader::parse("").is_empty());
		assert!(AcceptHeader::empty().is_empty());
	}
}
