//! # dynamic-response-middleware
//!
//! Middleware that makes one view serve both browsers and API clients.
//!
//! - [`ApiMiddleware`] flags API requests from their `Accept` header and
//!   signs API clients in with HTTP Basic credentials
//! - [`HttpBasicAuthenticationMiddleware`] signs in any client that sends
//!   Basic credentials
//! - [`DynamicFormatMiddleware`] turns JSON bodies into form data and renders
//!   pending dynamic responses
//! - [`LoggingMiddleware`] records one line per request
//!
//! ## Ordering
//!
//! [`ApiMiddleware`] must wrap [`DynamicFormatMiddleware`]: the format
//! middleware needs `request.is_api` and the API middleware rewrites the
//! redirects the format middleware produces.
//!
//! ```
//! use dynamic_response_conf::Settings;
//! use dynamic_response_core::auth::StaticAuthenticator;
//! use dynamic_response_core::serializers::{Serializable, TypeRegistry};
//! use dynamic_response_http::{
//!     DynamicResponse, Handler, MiddlewareChain, Request, Response, ResponseRenderer, Result,
//! };
//! use dynamic_response_middleware::{ApiMiddleware, DynamicFormatMiddleware};
//! use std::sync::Arc;
//!
//! struct Greeting;
//!
//! #[async_trait::async_trait]
//! impl Handler for Greeting {
//!     async fn handle(&self, _request: Request) -> Result<Response> {
//!         Ok(DynamicResponse::serialize_or_redirect("/")
//!             .with_context("greeting", Serializable::from("hello"))
//!             .into())
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let settings = Arc::new(Settings::default());
//! let renderer = ResponseRenderer::new(settings.clone(), Arc::new(TypeRegistry::empty()));
//! let authenticator = Arc::new(StaticAuthenticator::new());
//! let chain = MiddlewareChain::new(Arc::new(Greeting))
//!     .with_middleware(Arc::new(ApiMiddleware::new(settings, authenticator)))
//!     .with_middleware(Arc::new(DynamicFormatMiddleware::new(renderer)));
//!
//! let api = chain
//!     .handle(Request::get("/").with_header("Accept", "application/json"))
//!     .await
//!     .unwrap();
//! assert_eq!(api.body, r#"{"greeting":"hello"}"#);
//!
//! let browser = chain.handle(Request::get("/")).await.unwrap();
//! assert_eq!(browser.status, http::StatusCode::FOUND);
//! # });
//! ```

pub mod api;
pub mod basic_auth;
pub mod dynamic_format;
pub mod logging;

pub use api::{API_REALM, ApiMiddleware};
pub use basic_auth::{HttpBasicAuthenticationMiddleware, sign_in};
pub use dynamic_format::DynamicFormatMiddleware;
pub use logging::LoggingMiddleware;
