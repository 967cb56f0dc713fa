//! Handler and middleware composition
//!
//! A [`MiddlewareChain`] wraps a [`Handler`] in middleware. Middleware added
//! first is outermost: it sees the request first and the response last.

use crate::{Request, Response, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Produces a response for a request
#[async_trait]
pub trait Handler: Send + Sync {
	async fn handle(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response> {
		(**self).handle(request).await
	}
}

/// Wraps the rest of the chain
#[async_trait]
pub trait Middleware: Send + Sync {
	/// Process `request`, usually delegating to `next`
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response>;

	/// Skip this middleware for `request` when `false`
	fn should_continue(&self, _request: &Request) -> bool {
		true
	}
}

/// Composes middleware around a handler
///
/// # Examples
///
/// ```
/// use dynamic_response_http::{Handler, MiddlewareChain, Request, Response, Result};
/// use std::sync::Arc;
///
/// struct Hello;
///
/// #[async_trait::async_trait]
/// impl Handler for Hello {
///     async fn handle(&self, _request: Request) -> Result<Response> {
///         Ok(Response::ok().with_body("hello"))
///     }
/// }
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let chain = MiddlewareChain::new(Arc::new(Hello));
/// let response = chain.handle(Request::get("/")).await.unwrap();
/// assert_eq!(response.body, "hello");
/// # });
/// ```
pub struct MiddlewareChain {
	middlewares: Vec<Arc<dyn Middleware>>,
	handler: Arc<dyn Handler>,
}

impl MiddlewareChain {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			middlewares: Vec::new(),
			handler,
		}
	}

	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}

	pub fn add_middleware(&mut self, middleware: Arc<dyn Middleware>) {
		self.middlewares.push(middleware);
	}

	pub fn len(&self) -> usize {
		self.middlewares.len()
	}

	pub fn is_empty(&self) -> bool {
		self.middlewares.is_empty()
	}
}

#[async_trait]
impl Handler for MiddlewareChain {
	async fn handle(&self, request: Request) -> Result<Response> {
		let mut current: Arc<dyn Handler> = self.handler.clone();

		for middleware in self
			.middlewares
			.iter()
			.rev()
			.filter(|mw| mw.should_continue(&request))
		{
			current = Arc::new(ComposedHandler {
				middleware: middleware.clone(),
				next: current,
			});
		}

		current.handle(request).await
	}
}

struct ComposedHandler {
	middleware: Arc<dyn Middleware>,
	next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for ComposedHandler {
	async fn handle(&self, request: Request) -> Result<Response> {
		self.middleware.process(request, self.next.clone()).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::Mutex;

	struct EchoPath;

	#[async_trait]
	impl Handler for EchoPath {
		async fn handle(&self, request: Request) -> Result<Response> {
			Ok(Response::ok().with_body(request.path().to_string()))
		}
	}

	struct Recorder {
		name: &'static str,
		log: Arc<Mutex<Vec<String>>>,
		skip_path: Option<&'static str>,
	}

	#[async_trait]
	impl Middleware for Recorder {
		async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
			self.log.lock().unwrap().push(format!("{} in", self.name));
			let response = next.handle(request).await;
			self.log.lock().unwrap().push(format!("{} out", self.name));
			response
		}

		fn should_continue(&self, request: &Request) -> bool {
			self.skip_path != Some(request.path())
		}
	}

	fn recorder(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<dyn Middleware> {
		Arc::new(Recorder {
			name,
			log: log.clone(),
			skip_path: None,
		})
	}

	#[tokio::test]
	async fn test_empty_chain_calls_handler() {
		let chain = MiddlewareChain::new(Arc::new(EchoPath));
		assert!(chain.is_empty());
		let response = chain.handle(Request::get("/a/")).await.unwrap();
		assert_eq!(response.body, "/a/");
	}

	#[tokio::test]
	async fn test_first_added_is_outermost() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let chain = MiddlewareChain::new(Arc::new(EchoPath))
			.with_middleware(recorder("outer", &log))
			.with_middleware(recorder("inner", &log));

		chain.handle(Request::get("/")).await.unwrap();
		assert_eq!(
			*log.lock().unwrap(),
			vec!["outer in", "inner in", "inner out", "outer out"]
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_should_continue_skips_middleware() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let mut chain = MiddlewareChain::new(Arc::new(EchoPath));
		chain.add_middleware(Arc::new(Recorder {
			name: "skipped",
			log: log.clone(),
			skip_path: Some("/health/"),
		}));

		chain.handle(Request::get("/health/")).await.unwrap();
		assert!(log.lock().unwrap().is_empty());

		chain.handle(Request::get("/other/")).await.unwrap();
		assert_eq!(log.lock().unwrap().len(), 2);
	}
}
