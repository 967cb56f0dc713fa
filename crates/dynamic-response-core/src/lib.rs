//! # dynamic-response-core
//!
//! Framework-independent building blocks of the dynamic response layer.
//!
//! ## Modules
//!
//! - [`serializers`]: the generic emitter turning models, collections and
//!   scalars into JSON-safe trees, plus the field-selection policy
//! - [`negotiation`]: media type and `Accept` header parsing, API detection
//! - [`parsers`]: JSON body parsing and form-data flattening
//! - [`pagination`]: the `Page` window unwrapped by the emitter
//! - [`auth`]: the user model, Basic credentials and the authenticator seam
//!
//! ## Example
//!
//! ```
//! use dynamic_response_core::serializers::{Emitter, Serializable};
//! use rust_decimal::Decimal;
//! use std::str::FromStr;
//!
//! let emitter = Emitter::default();
//! let value = Serializable::from(Decimal::from_str("12.345").unwrap());
//! assert_eq!(emitter.construct(&value, None).unwrap(), "12.345");
//! ```

pub mod auth;
pub mod negotiation;
pub mod pagination;
pub mod parsers;
pub mod serializers;

pub use auth::{AuthenticationError, Authenticator, BasicCredentials, StaticAuthenticator, User};
pub use negotiation::{AcceptHeader, ApiDetection, MediaType};
pub use pagination::Page;
pub use parsers::{JSONParser, QueryDict, flatten_json};
pub use serializers::{
	Emitter, FieldSelection, FieldSpec, JsonRenderer, Model, Serializable, SerializerError,
	TypeRegistry,
};
