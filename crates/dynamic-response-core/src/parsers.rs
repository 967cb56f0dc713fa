//! Request body parsing
//!
//! JSON payloads are parsed with [`JSONParser`] and then flattened into a
//! [`QueryDict`] so that form validation code written for urlencoded posts
//! works unchanged for API clients.

pub mod flatten;
pub mod json;
pub mod parser;
pub mod query_dict;

pub use flatten::flatten_json;
pub use json::JSONParser;
pub use parser::{ParseError, ParseResult, ParsedData, Parser};
pub use query_dict::QueryDict;
