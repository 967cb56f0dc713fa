//! Tracing subscriber setup

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::settings::SettingsError;

/// Output layout of the formatter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Full,
	Compact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
	/// An `EnvFilter` directive such as `info` or `dynamic_response=debug,warn`
	pub level: String,
	pub format: LogFormat,
	/// Include the event target (module path) in each line
	pub with_target: bool,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Full,
			with_target: true,
		}
	}
}

impl LoggingSettings {
	pub fn env_filter(&self) -> Result<EnvFilter, SettingsError> {
		EnvFilter::try_new(&self.level).map_err(|e| SettingsError::InvalidValue {
			key: "logging.level".to_string(),
			message: e.to_string(),
		})
	}
}

/// Install the global subscriber
///
/// Fails when the filter directive does not parse or a global subscriber is
/// already installed.
pub fn init_tracing(settings: &LoggingSettings) -> Result<(), SettingsError> {
	let filter = settings.env_filter()?;
	let builder = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(settings.with_target);

	let result = match settings.format {
		LogFormat::Full => builder.try_init(),
		LogFormat::Compact => builder.compact().try_init(),
	};

	result.map_err(|e| SettingsError::Logging(e.to_string()))?;
	tracing::debug!(level = %settings.level, format = ?settings.format, "Tracing initialized");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("info")]
	#[case("dynamic_response=debug,warn")]
	fn test_valid_filters(#[case] level: &str) {
		let settings = LoggingSettings {
			level: level.to_string(),
			..Default::default()
		};
		assert!(settings.env_filter().is_ok());
	}

	#[rstest]
	fn test_invalid_filter() {
		let settings = LoggingSettings {
			level: "dynamic_response=notalevel".to_string(),
			..Default::default()
		};
		assert!(matches!(
			settings.env_filter(),
			Err(SettingsError::InvalidValue { .. })
		));
	}

	#[rstest]
	fn test_format_from_toml() {
		let settings: LoggingSettings = toml::from_str("format = \"compact\"").unwrap();
		assert_eq!(settings.format, LogFormat::Compact);
		assert_eq!(settings.level, "info");
	}
}
