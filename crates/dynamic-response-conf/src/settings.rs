//! The settings object and its layered builder

use crate::logging::LoggingSettings;
use crate::sources::{ConfigSource, DefaultSource, EnvSource, SourceError, TomlFileSource};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Failed to load {source_name}: {error}")]
	Source {
		source_name: String,
		#[source]
		error: SourceError,
	},

	#[error("Invalid settings: {0}")]
	Deserialize(#[from] serde_json::Error),

	#[error("Invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },

	#[error("Failed to initialize logging: {0}")]
	Logging(String),
}

/// Settings of the response layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Pretty-print JSON responses
	pub debug: bool,
	/// Charset announced in the `Content-Type` of JSON responses
	pub default_charset: String,
	/// Redirects to this path are turned into 401 responses for API clients
	pub login_url: String,
	/// `Accept` media types that mark a request as an API request
	pub api_accept_types: Vec<String>,
	/// Report form errors of `InvalidData` responses to API clients as
	/// `{"field_errors": ...}`
	pub json_form_errors: bool,
	pub logging: LoggingSettings,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			debug: false,
			default_charset: "utf-8".to_string(),
			login_url: "/accounts/login/".to_string(),
			api_accept_types: vec!["application/json".to_string()],
			json_form_errors: false,
			logging: LoggingSettings::default(),
		}
	}
}

impl Settings {
	pub fn builder() -> SettingsBuilder {
		SettingsBuilder::new()
	}

	/// Defaults, then `path` when given, then the environment
	pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
		let mut builder = SettingsBuilder::new().add_source(DefaultSource);
		if let Some(path) = path {
			builder = builder.add_source(TomlFileSource::new(path));
		}
		builder.add_source(EnvSource::new()).build()
	}

	pub fn with_debug(mut self, debug: bool) -> Self {
		self.debug = debug;
		self
	}

	pub fn with_default_charset(mut self, charset: impl Into<String>) -> Self {
		self.default_charset = charset.into();
		self
	}

	pub fn with_login_url(mut self, login_url: impl Into<String>) -> Self {
		self.login_url = login_url.into();
		self
	}

	pub fn with_api_accept_types<S: Into<String>>(
		mut self,
		types: impl IntoIterator<Item = S>,
	) -> Self {
		self.api_accept_types = types.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_json_form_errors(mut self, enabled: bool) -> Self {
		self.json_form_errors = enabled;
		self
	}

	pub fn into_shared(self) -> Arc<Self> {
		Arc::new(self)
	}

	/// `application/json; charset=<default_charset>`
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_conf::Settings;
	///
	/// let settings = Settings::default().with_default_charset("iso-8859-1");
	/// assert_eq!(settings.json_content_type(), "application/json; charset=iso-8859-1");
	/// ```
	pub fn json_content_type(&self) -> String {
		format!("application/json; charset={}", self.default_charset)
	}

	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.default_charset.trim().is_empty() {
			return Err(SettingsError::InvalidValue {
				key: "default_charset".to_string(),
				message: "must not be empty".to_string(),
			});
		}
		if !self.login_url.starts_with('/') && !self.login_url.contains("://") {
			return Err(SettingsError::InvalidValue {
				key: "login_url".to_string(),
				message: format!("'{}' is neither an absolute path nor a URL", self.login_url),
			});
		}
		if let Some(bad) = self.api_accept_types.iter().find(|t| !t.contains('/')) {
			return Err(SettingsError::InvalidValue {
				key: "api_accept_types".to_string(),
				message: format!("'{}' is not a media type", bad),
			});
		}
		Ok(())
	}
}

/// Merges configuration sources into [`Settings`]
///
/// # Examples
///
/// ```
/// use dynamic_response_conf::{DefaultSource, EnvSource, Settings};
///
/// let settings = Settings::builder()
///     .add_source(DefaultSource)
///     .add_source(EnvSource::from_vars([("DYNRESP_DEBUG", "1")]))
///     .build()
///     .unwrap();
/// assert!(settings.debug);
/// assert_eq!(settings.default_charset, "utf-8");
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	pub fn build(mut self) -> Result<Settings, SettingsError> {
		// Stable: sources of equal priority keep insertion order
		self.sources.sort_by_key(|s| s.priority());

		let mut merged: IndexMap<String, Value> = IndexMap::new();
		for source in &self.sources {
			let layer = source.load().map_err(|error| SettingsError::Source {
				source_name: source.description(),
				error,
			})?;
			tracing::debug!(
				source = %source.description(),
				keys = layer.len(),
				"Settings layer loaded"
			);
			for (key, value) in layer {
				merge_into(&mut merged, key, value);
			}
		}

		let object: serde_json::Map<String, Value> = merged.into_iter().collect();
		let settings: Settings = serde_json::from_value(Value::Object(object))?;
		settings.validate()?;
		Ok(settings)
	}
}

/// Objects merge key by key; everything else is replaced
fn merge_into(target: &mut IndexMap<String, Value>, key: String, value: Value) {
	if let (Some(Value::Object(existing)), Value::Object(incoming)) =
		(target.get_mut(&key), &value)
	{
		for (k, v) in incoming {
			existing.insert(k.clone(), v.clone());
		}
		return;
	}
	target.insert(key, value);
}
