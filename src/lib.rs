//! # dynamic-response
//!
//! One view, two audiences. Views describe their result once, as a
//! [`DynamicResponse`]; browsers receive a rendered template or a redirect
//! while API clients receive the same context as JSON.
//!
//! The pieces:
//!
//! - a recursive, model-aware JSON serializer with per-model field selection
//!   ([`serializers`])
//! - `Accept` header based API detection ([`negotiation`])
//! - JSON request bodies flattened into form data ([`parsers`])
//! - HTTP Basic authentication for API clients ([`auth`])
//! - the middleware tying it together ([`middleware`])
//!
//! ## Feature Flags
//!
//! - `core` - serializer, negotiation, parsers, authentication primitives
//! - `conf` - layered settings and `tracing` initialization
//! - `http` - requests, responses, dynamic responses and the handler chain
//! - `middleware` - API, Basic authentication, format and logging middleware
//! - `full` (default) - everything
//!
//! ## Quick Start
//!
//! ```
//! use dynamic_response::prelude::*;
//! use std::sync::Arc;
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Handler for Hello {
//!     async fn handle(&self, request: Request) -> Result<Response> {
//!         let name = request.post.get("name").unwrap_or("world").to_string();
//!         Ok(DynamicResponse::serialize_or_redirect("/")
//!             .with_context("greeting", format!("hello {}", name))
//!             .into())
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let settings = Settings::default().into_shared();
//! let renderer = ResponseRenderer::new(settings.clone(), Arc::new(TypeRegistry::empty()));
//! let authenticator = Arc::new(StaticAuthenticator::new());
//! let app = MiddlewareChain::new(Arc::new(Hello))
//!     .with_middleware(Arc::new(ApiMiddleware::new(settings, authenticator)))
//!     .with_middleware(Arc::new(DynamicFormatMiddleware::new(renderer)));
//!
//! let request = Request::post("/")
//!     .with_header("Accept", "application/json")
//!     .with_json_body(r#"{"name": "api"}"#);
//! let response = app.handle(request).await.unwrap();
//! assert_eq!(response.body, r#"{"greeting":"hello api"}"#);
//! # });
//! ```

#[cfg(feature = "core")]
pub use dynamic_response_core::{auth, negotiation, pagination, parsers, serializers};

#[cfg(feature = "conf")]
pub use dynamic_response_conf as conf;

#[cfg(feature = "middleware")]
pub use dynamic_response_middleware as middleware;

#[cfg(feature = "core")]
pub use dynamic_response_core::{
	AcceptHeader, ApiDetection, AuthenticationError, Authenticator, BasicCredentials, Emitter,
	FieldSelection, FieldSpec, JSONParser, JsonRenderer, MediaType, Model, Page, QueryDict,
	Serializable, SerializerError, StaticAuthenticator, TypeRegistry, User, flatten_json,
};

#[cfg(feature = "core")]
pub use dynamic_response_core::serializers::{Callable, FieldMeta, Manager, Relation, TypeOverride};

#[cfg(feature = "conf")]
pub use dynamic_response_conf::{LogFormat, LoggingSettings, Settings, SettingsError, init_tracing};

#[cfg(feature = "http")]
pub use dynamic_response_http::{
	DynamicResponse, Error, Handler, JsonResponse, Middleware, MiddlewareChain, Request, Response,
	ResponseKind, ResponseRenderer, ResponseStatus, Result, TemplateRenderer,
};

#[cfg(feature = "http")]
pub use http::StatusCode;

#[cfg(feature = "middleware")]
pub use dynamic_response_middleware::{
	ApiMiddleware, DynamicFormatMiddleware, HttpBasicAuthenticationMiddleware, LoggingMiddleware,
};

/// Everything a view module usually needs
pub mod prelude {
	#[cfg(feature = "core")]
	pub use crate::{
		Authenticator, FieldMeta, FieldSelection, Model, Relation, Serializable,
		StaticAuthenticator, TypeRegistry, User,
	};

	#[cfg(feature = "conf")]
	pub use crate::Settings;

	#[cfg(feature = "http")]
	pub use crate::{
		DynamicResponse, Error, Handler, Middleware, MiddlewareChain, Request, Response,
		ResponseRenderer, ResponseStatus, Result, StatusCode,
	};

	#[cfg(feature = "http")]
	pub use async_trait::async_trait;

	#[cfg(feature = "middleware")]
	pub use crate::{
		ApiMiddleware, DynamicFormatMiddleware, HttpBasicAuthenticationMiddleware,
		LoggingMiddleware,
	};
}
