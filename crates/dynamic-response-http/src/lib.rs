//! # dynamic-response-http
//!
//! The HTTP-facing half of the response layer.
//!
//! Views return a [`DynamicResponse`] wrapped in a [`Response`]. Once the
//! request is known to be an API request or a browser request, the pending
//! value is turned into JSON, a rendered template, or a redirect.
//!
//! ## Example
//!
//! ```
//! use dynamic_response_conf::Settings;
//! use dynamic_response_core::serializers::{Serializable, TypeRegistry};
//! use dynamic_response_http::{DynamicResponse, Request, ResponseRenderer};
//! use std::sync::Arc;
//!
//! let renderer = ResponseRenderer::new(
//!     Arc::new(Settings::default()),
//!     Arc::new(TypeRegistry::empty()),
//! );
//! let mut request = Request::get("/posts/1/");
//! request.is_api = true;
//!
//! let dynamic = DynamicResponse::serialize_or_redirect("/posts/")
//!     .with_context("title", Serializable::from("Hi"));
//! let response = dynamic.render_response(&request, &renderer).unwrap();
//!
//! assert_eq!(response.status, http::StatusCode::OK);
//! assert_eq!(response.body, r#"{"title":"Hi"}"#);
//! ```

pub mod dynamic;
pub mod error;
pub mod json_response;
pub mod middleware;
pub mod request;
pub mod response;
pub mod template;

pub use dynamic::{DynamicResponse, ResponseKind, ResponseRenderer, ResponseStatus};
pub use error::{Error, Result};
pub use json_response::JsonResponse;
pub use middleware::{Handler, Middleware, MiddlewareChain};
pub use request::Request;
pub use response::Response;
pub use template::TemplateRenderer;
