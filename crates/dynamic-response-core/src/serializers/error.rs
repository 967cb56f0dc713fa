//! Serialization errors

/// Result type for emitter operations
pub type SerializerResult<T> = Result<T, SerializerError>;

/// Errors that can occur while emitting or rendering
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SerializerError {
	/// The value handed to the emitter is itself a failure
	#[error("Unserializable input: {message}")]
	UnserializableInput { message: String },

	/// The depth guard tripped, or a model was reached again through itself
	#[error(
		"Cycle or depth limit exceeded at depth {depth} (max {max_depth}){}",
		.model.as_ref().map(|m| format!(" in '{}'", m)).unwrap_or_default()
	)]
	CycleOrDepthExceeded {
		depth: usize,
		max_depth: usize,
		model: Option<String>,
	},

	/// JSON text encoding failed
	#[error("Render error: {0}")]
	Render(#[from] serde_json::Error),
}

impl SerializerError {
	pub fn is_depth_error(&self) -> bool {
		matches!(self, SerializerError::CycleOrDepthExceeded { .. })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_display() {
		let err = SerializerError::UnserializableInput {
			message: "boom".to_string(),
		};
		assert_eq!(err.to_string(), "Unserializable input: boom");

		let err = SerializerError::CycleOrDepthExceeded {
			depth: 4,
			max_depth: 3,
			model: None,
		};
		assert_eq!(err.to_string(), "Cycle or depth limit exceeded at depth 4 (max 3)");
		assert!(err.is_depth_error());

		let err = SerializerError::CycleOrDepthExceeded {
			depth: 2,
			max_depth: 8,
			model: Some("blog.post".to_string()),
		};
		assert_eq!(
			err.to_string(),
			"Cycle or depth limit exceeded at depth 2 (max 8) in 'blog.post'"
		);
	}
}
