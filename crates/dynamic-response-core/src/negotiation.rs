//! Content negotiation
//!
//! Parses `Accept` headers and decides whether a request talks to the API
//! (wants JSON back) or to the browser-facing views.

pub mod accept;
pub mod detection;
pub mod media_type;

pub use accept::AcceptHeader;
pub use detection::{ApiDetection, DEFAULT_API_TYPES};
pub use media_type::MediaType;
