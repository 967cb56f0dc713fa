//! Configuration sources
//!
//! Each source yields a flat-or-nested JSON object; [`SettingsBuilder`]
//! merges them in priority order before deserializing into
//! [`Settings`](crate::Settings).
//!
//! [`SettingsBuilder`]: crate::SettingsBuilder

use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of the environment variables read by [`EnvSource`]
pub const ENV_PREFIX: &str = "DYNRESP_";

/// A layer of configuration
pub trait ConfigSource: Send + Sync {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError>;

	/// Higher priority sources override lower ones
	fn priority(&self) -> u8;

	fn description(&self) -> String;
}

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },
}

/// Built-in defaults
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSource;

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		match serde_json::to_value(crate::Settings::default())? {
			Value::Object(map) => Ok(map.into_iter().collect()),
			_ => Ok(IndexMap::new()),
		}
	}

	fn priority(&self) -> u8 {
		0
	}

	fn description(&self) -> String {
		"defaults".to_string()
	}
}

/// A TOML settings file
///
/// A missing file is an empty layer unless the source is marked required.
#[derive(Debug, Clone)]
pub struct TomlFileSource {
	path: PathBuf,
	required: bool,
}

impl TomlFileSource {
	pub fn new(path: impl AsRef<Path>) -> Self {
		Self {
			path: path.as_ref().to_path_buf(),
			required: false,
		}
	}

	pub fn required(mut self, required: bool) -> Self {
		self.required = required;
		self
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.path.exists() && !self.required {
			tracing::debug!(path = %self.path.display(), "Settings file not found, skipping");
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path)?;
		let table: toml::Table = toml::from_str(&content)?;
		match serde_json::to_value(table)? {
			Value::Object(map) => Ok(map.into_iter().collect()),
			_ => Ok(IndexMap::new()),
		}
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// `DYNRESP_`-prefixed environment variables
///
/// | Variable                    | Setting            |
/// |-----------------------------|--------------------|
/// | `DYNRESP_DEBUG`             | `debug`            |
/// | `DYNRESP_DEFAULT_CHARSET`   | `default_charset`  |
/// | `DYNRESP_LOGIN_URL`         | `login_url`        |
/// | `DYNRESP_API_ACCEPT_TYPES`  | `api_accept_types` (comma separated) |
/// | `DYNRESP_JSON_FORM_ERRORS`  | `json_form_errors` |
/// | `DYNRESP_LOG_LEVEL`         | `logging.level`    |
/// | `DYNRESP_LOG_FORMAT`        | `logging.format`   |
///
/// Unknown variables are ignored.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
	vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
	/// Read the process environment
	pub fn new() -> Self {
		Self::default()
	}

	/// Read a fixed set of variables instead of the process environment
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_conf::{ConfigSource, EnvSource};
	/// use serde_json::json;
	///
	/// let source = EnvSource::from_vars([("DYNRESP_DEBUG", "yes"), ("HOME", "/root")]);
	/// let layer = source.load().unwrap();
	/// assert_eq!(layer.get("debug"), Some(&json!(true)));
	/// assert_eq!(layer.len(), 1);
	/// ```
	pub fn from_vars<K, V, I>(vars: I) -> Self
	where
		K: Into<String>,
		V: Into<String>,
		I: IntoIterator<Item = (K, V)>,
	{
		Self {
			vars: Some(
				vars.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
		}
	}

	fn vars(&self) -> Vec<(String, String)> {
		match &self.vars {
			Some(vars) => vars.clone(),
			None => std::env::vars().collect(),
		}
	}
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SourceError> {
	match value.trim().to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Ok(true),
		"false" | "0" | "no" | "off" | "" => Ok(false),
		other => Err(SourceError::InvalidValue {
			key: key.to_string(),
			message: format!("'{}' is not a boolean", other),
		}),
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let mut config = IndexMap::new();
		let mut logging = serde_json::Map::new();

		for (key, value) in self.vars() {
			let Some(name) = key.strip_prefix(ENV_PREFIX) else {
				continue;
			};

			match name.to_ascii_lowercase().as_str() {
				"debug" => {
					config.insert("debug".to_string(), Value::Bool(parse_bool(&key, &value)?));
				}
				"default_charset" => {
					config.insert("default_charset".to_string(), Value::String(value));
				}
				"login_url" => {
					config.insert("login_url".to_string(), Value::String(value));
				}
				"api_accept_types" => {
					let types = value
						.split(',')
						.map(str::trim)
						.filter(|t| !t.is_empty())
						.map(|t| Value::String(t.to_string()))
						.collect();
					config.insert("api_accept_types".to_string(), Value::Array(types));
				}
				"json_form_errors" => {
					config.insert(
						"json_form_errors".to_string(),
						Value::Bool(parse_bool(&key, &value)?),
					);
				}
				"log_level" => {
					logging.insert("level".to_string(), Value::String(value));
				}
				"log_format" => {
					logging.insert("format".to_string(), Value::String(value.to_ascii_lowercase()));
				}
				other => {
					tracing::trace!(
						variable = %key,
						name = other,
						"Ignoring unknown settings variable"
					);
				}
			}
		}

		if !logging.is_empty() {
			config.insert("logging".to_string(), Value::Object(logging));
		}
		Ok(config)
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		format!("environment ({}*)", ENV_PREFIX)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;
	use std::io::Write;

	#[rstest]
	fn test_defaults_cover_every_setting() {
		let layer = DefaultSource.load().unwrap();
		let keys: Vec<&str> = layer.keys().map(String::as_str).collect();
		assert_eq!(
			keys,
			vec![
				"debug",
				"default_charset",
				"login_url",
				"api_accept_types",
				"json_form_errors",
				"logging",
			]
		);
	}

	#[rstest]
	fn test_missing_optional_file_is_empty() {
		let source = TomlFileSource::new("/nonexistent/dynresp.toml");
		assert!(source.load().unwrap().is_empty());
		assert!(source.clone().required(true).load().is_err());
	}

	#[rstest]
	fn test_toml_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "debug = true\n[logging]\nlevel = \"debug\"").unwrap();

		let layer = TomlFileSource::new(file.path()).load().unwrap();
		assert_eq!(layer.get("debug"), Some(&json!(true)));
		assert_eq!(layer.get("logging"), Some(&json!({"level": "debug"})));
	}

	#[rstest]
	fn test_invalid_toml() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "debug = ").unwrap();
		assert!(matches!(
			TomlFileSource::new(file.path()).load(),
			Err(SourceError::Toml(_))
		));
	}

	#[rstest]
	fn test_env_list_and_logging() {
		let source = EnvSource::from_vars([
			("DYNRESP_API_ACCEPT_TYPES", "application/json, application/vnd.api+json,"),
			("DYNRESP_LOG_LEVEL", "warn"),
			("DYNRESP_LOG_FORMAT", "Compact"),
		]);
		let layer = source.load().unwrap();
		assert_eq!(
			layer.get("api_accept_types"),
			Some(&json!(["application/json", "application/vnd.api+json"]))
		);
		assert_eq!(
			layer.get("logging"),
			Some(&json!({"level": "warn", "format": "compact"}))
		);
	}

	#[rstest]
	#[case("on", true)]
	#[case("0", false)]
	fn test_env_json_form_errors(#[case] value: &str, #[case] expected: bool) {
		let source = EnvSource::from_vars([("DYNRESP_JSON_FORM_ERRORS", value)]);
		let layer = source.load().unwrap();
		assert_eq!(layer.get("json_form_errors"), Some(&json!(expected)));
	}

	#[rstest]
	#[case("maybe")]
	#[case("2")]
	fn test_env_invalid_bool(#[case] value: &str) {
		let source = EnvSource::from_vars([("DYNRESP_DEBUG", value)]);
		assert!(matches!(
			source.load(),
			Err(SourceError::InvalidValue { .. })
		));
	}
}
