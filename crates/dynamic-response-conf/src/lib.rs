//! # dynamic-response-conf
//!
//! Settings consumed by the response layer, loaded in layers:
//!
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. `DYNRESP_`-prefixed environment variables
//!
//! Later layers win. [`init_tracing`] installs a `tracing-subscriber`
//! formatter configured from [`LoggingSettings`].
//!
//! ## Example
//!
//! ```
//! use dynamic_response_conf::Settings;
//!
//! let settings = Settings::default();
//! assert!(!settings.debug);
//! assert_eq!(settings.default_charset, "utf-8");
//! assert_eq!(settings.login_url, "/accounts/login/");
//! assert_eq!(settings.api_accept_types, vec!["application/json"]);
//! ```

pub mod logging;
pub mod settings;
pub mod sources;

pub use logging::{LogFormat, LoggingSettings, init_tracing};
pub use settings::{Settings, SettingsBuilder, SettingsError};
pub use sources::{ConfigSource, DefaultSource, ENV_PREFIX, EnvSource, SourceError, TomlFileSource};
