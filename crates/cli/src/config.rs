//! TOML configuration of the `marquee` binary.
//!
//! Looked up at `--config <path>`, else `$XDG_CONFIG_HOME/marquee/config.toml`.
//! A missing default file means defaults; a missing explicit file is an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use marquee_results::Origin;
use marquee_searcher::SearcherConfig;
use marquee_transport::SimulatedLatency;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("TOML serialize error: {0}")]
	Serialize(#[from] toml::ser::Error),

	/// A value parsed but is out of range.
	#[error("invalid configuration: {0}")]
	Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	pub search: SearchSection,
	pub transport: TransportSection,
	pub facets: FacetSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchSection {
	pub hits_per_page: usize,
	/// `0` disables the slow-request watchdog.
	pub slow_request_threshold_ms: u64,
	pub event_buffer: usize,
}

impl Default for SearchSection {
	fn default() -> Self {
		Self {
			hits_per_page: 20,
			slow_request_threshold_ms: 1000,
			event_buffer: 64,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportSection {
	pub latency_ms: u64,
	pub jitter_ms: u64,
	pub origin: Origin,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FacetSection {
	/// Facets combined with OR from the start.
	pub disjunctive: Vec<String>,
}

impl Config {
	/// `$XDG_CONFIG_HOME/marquee/config.toml`, when a config directory exists.
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join("marquee").join("config.toml"))
	}

	/// Loads `explicit`, or the default path when present, or defaults.
	pub fn load(explicit: Option<&Path>) -> Result<Self> {
		match explicit {
			Some(path) => Self::from_file(path),
			None => match Self::default_path() {
				Some(path) if path.is_file() => Self::from_file(&path),
				_ => Ok(Self::default()),
			},
		}
	}

	pub fn from_file(path: &Path) -> Result<Self> {
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let config = Self::parse(&text)?;
		tracing::debug!(path = %path.display(), "configuration loaded");
		Ok(config)
	}

	pub fn parse(text: &str) -> Result<Self> {
		let config: Self = toml::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<()> {
		if self.search.hits_per_page == 0 {
			return Err(ConfigError::Invalid("search.hits_per_page must be greater than 0".into()));
		}
		if self.search.event_buffer == 0 {
			return Err(ConfigError::Invalid("search.event_buffer must be greater than 0".into()));
		}
		if let Some(empty) = self.facets.disjunctive.iter().position(|name| name.is_empty()) {
			return Err(ConfigError::Invalid(format!("facets.disjunctive[{empty}] is empty")));
		}
		Ok(())
	}

	pub fn to_toml(&self) -> Result<String> {
		Ok(toml::to_string_pretty(self)?)
	}

	pub fn searcher_config(&self) -> SearcherConfig {
		let threshold = match self.search.slow_request_threshold_ms {
			0 => None,
			ms => Some(Duration::from_millis(ms)),
		};
		SearcherConfig::default()
			.slow_request_threshold(threshold)
			.event_buffer(self.search.event_buffer)
	}

	pub fn latency(&self) -> SimulatedLatency {
		SimulatedLatency::new(
			Duration::from_millis(self.transport.latency_ms),
			Duration::from_millis(self.transport.jitter_ms),
		)
	}
}
