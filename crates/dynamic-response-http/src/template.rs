//! The template rendering seam

use crate::{Request, Result};
use serde_json::Value;

/// Renders a named template with a JSON context
///
/// Browser requests answered by a "serialize or render" response go through
/// this trait. The context has already been serialized by the emitter.
pub trait TemplateRenderer: Send + Sync {
	fn render(&self, template: &str, context: &Value, request: &Request) -> Result<String>;
}

impl<F> TemplateRenderer for F
where
	F: Fn(&str, &Value, &Request) -> Result<String> + Send + Sync,
{
	fn render(&self, template: &str, context: &Value, request: &Request) -> Result<String> {
		self(template, context, request)
	}
}
