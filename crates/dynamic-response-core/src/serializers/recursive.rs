//! Recursion tracking for the emitter
//!
//! Unbounded by default: the emitter walks whatever graph it is given. A
//! bounded context enforces a maximum nesting depth and also rejects a model
//! that is reached again while it is still being serialized.

use super::error::{SerializerError, SerializerResult};
use std::collections::HashSet;

/// Depth and visited-object bookkeeping for one `construct` call
#[derive(Debug, Clone, Default)]
pub struct SerializationContext {
	/// Current depth level (0 = nothing entered yet)
	current_depth: usize,
	/// Maximum allowed depth; `None` disables every check
	max_depth: Option<usize>,
	/// Identities (pointer addresses) of the models on the current path
	visited: HashSet<usize>,
}

impl SerializationContext {
	/// Create a context; `None` means no guard
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::serializers::SerializationContext;
	///
	/// let context = SerializationContext::new(Some(3));
	/// assert_eq!(context.current_depth(), 0);
	/// assert_eq!(context.max_depth(), Some(3));
	/// assert!(context.is_guarded());
	/// ```
	pub fn new(max_depth: Option<usize>) -> Self {
		Self {
			current_depth: 0,
			max_depth,
			visited: HashSet::new(),
		}
	}

	pub fn unbounded() -> Self {
		Self::new(None)
	}

	pub fn bounded(max_depth: usize) -> Self {
		Self::new(Some(max_depth))
	}

	pub fn current_depth(&self) -> usize {
		self.current_depth
	}

	pub fn max_depth(&self) -> Option<usize> {
		self.max_depth
	}

	pub fn is_guarded(&self) -> bool {
		self.max_depth.is_some()
	}

	/// Levels left before the guard trips (`None` when unguarded)
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::serializers::SerializationContext;
	///
	/// let mut context = SerializationContext::bounded(3);
	/// assert_eq!(context.remaining_depth(), Some(3));
	/// context.enter().unwrap();
	/// assert_eq!(context.remaining_depth(), Some(2));
	/// ```
	pub fn remaining_depth(&self) -> Option<usize> {
		self.max_depth
			.map(|max| max.saturating_sub(self.current_depth))
	}

	/// Descend one level
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::serializers::SerializationContext;
	///
	/// let mut context = SerializationContext::bounded(1);
	/// assert!(context.enter().is_ok());
	/// assert!(context.enter().is_err());
	/// ```
	pub fn enter(&mut self) -> SerializerResult<()> {
		if let Some(max_depth) = self.max_depth
			&& self.current_depth >= max_depth
		{
			return Err(SerializerError::CycleOrDepthExceeded {
				depth: self.current_depth + 1,
				max_depth,
				model: None,
			});
		}
		self.current_depth += 1;
		Ok(())
	}

	/// Ascend one level
	pub fn leave(&mut self) {
		self.current_depth = self.current_depth.saturating_sub(1);
	}

	/// Mark an object as being serialized
	///
	/// Fails when the same object is already on the current path. Always
	/// succeeds on an unguarded context.
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::serializers::SerializationContext;
	///
	/// let mut context = SerializationContext::bounded(8);
	/// assert!(context.visit(0x10, "blog.post").is_ok());
	/// assert!(context.visit(0x10, "blog.post").is_err());
	/// context.unvisit(0x10);
	/// assert!(context.visit(0x10, "blog.post").is_ok());
	/// ```
	pub fn visit(&mut self, id: usize, model_name: &str) -> SerializerResult<()> {
		let Some(max_depth) = self.max_depth else {
			return Ok(());
		};
		if !self.visited.insert(id) {
			return Err(SerializerError::CycleOrDepthExceeded {
				depth: self.current_depth,
				max_depth,
				model: Some(model_name.to_string()),
			});
		}
		Ok(())
	}

	/// Unmark an object once its serialization is complete
	pub fn unvisit(&mut self, id: usize) {
		self.visited.remove(&id);
	}

	/// Reset the context to initial state
	pub fn reset(&mut self) {
		self.current_depth = 0;
		self.visited.clear();
	}
}
