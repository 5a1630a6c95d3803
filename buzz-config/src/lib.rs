//! Loader for `buzz` configuration with YAML + environment overlays.
//!
//! Sources merge in the order they are added, and `BUZZ_`-prefixed environment
//! variables are applied last (`BUZZ_REALTIME__TIMEOUT_SECS=5` sets
//! `realtime.timeout_secs`). Env values are typed by the field they land in.
//! `${VAR}` placeholders in string values are expanded after merging. Every
//! field has a default, so an empty config is valid.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

use buzz_common::observability::{LogConfig, LogFormat};
use buzz_realtime::{
    ClientSettings, DEFAULT_BASE_URL, SearchOptions, SortMode, TransitionOptions,
    transition::{DEFAULT_INTERVAL_SECS, DEFAULT_SPAN_SECS},
};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "BUZZ";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuzzConfig {
    pub realtime: RealtimeSection,
    pub search: SearchSection,
    pub transition: TransitionSection,
    pub logging: LoggingSection,
}

/// Where the site lives and how requests are sent.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RealtimeSection {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Default for RealtimeSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 15,
            user_agent: None,
        }
    }
}

impl RealtimeSection {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Defaults for new search sessions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub sort: SortMode,
    pub media_only: bool,
}

impl SearchSection {
    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            media_only: self.media_only,
            sort: self.sort,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransitionSection {
    pub interval_secs: u64,
    pub span_secs: u64,
}

impl Default for TransitionSection {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            span_secs: DEFAULT_SPAN_SECS,
        }
    }
}

impl TransitionSection {
    pub fn options(&self, media_only: bool) -> TransitionOptions {
        TransitionOptions {
            media_only,
            interval_secs: self.interval_secs,
            span_secs: self.span_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
    pub emit_stderr: bool,
    /// Used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            emit_stderr: false,
            filter: "info".into(),
        }
    }
}

impl LoggingSection {
    pub fn log_config(&self, app_name: &'static str) -> LogConfig {
        LogConfig {
            app_name,
            log_dir: self.dir.clone(),
            emit_stderr: self.emit_stderr,
            format: self.format,
            default_filter: self.filter.clone(),
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct BuzzConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for BuzzConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl BuzzConfigLoader {
    /// Empty loader; `load` alone yields the defaults plus any `BUZZ_` overrides.
    ///
    /// ```
    /// use buzz_config::BuzzConfigLoader;
    ///
    /// let config = BuzzConfigLoader::new()
    ///     .with_yaml_str("search:\n  sort: popularity\n")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.search.sort, buzz_realtime::SortMode::Popularity);
    /// assert_eq!(config.transition.interval_secs, 900);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Apply env overrides, expand `${VAR}` placeholders and deserialize.
    ///
    /// ```
    /// use buzz_config::BuzzConfigLoader;
    ///
    /// unsafe { std::env::set_var("BUZZ_DOC_UA", "buzz-doc/1.0"); }
    ///
    /// let config = BuzzConfigLoader::new()
    ///     .with_yaml_str("realtime:\n  user_agent: \"${BUZZ_DOC_UA}\"\n")
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.realtime.user_agent.as_deref(), Some("buzz-doc/1.0"));
    ///
    /// unsafe { std::env::remove_var("BUZZ_DOC_UA"); }
    /// ```
    pub fn load(self) -> Result<BuzzConfig, ConfigError> {
        let merged = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut v: Value = merged.try_deserialize()?;
        expand_env_in_value(&mut v);

        // Env values arrive as strings; `config` coerces them per target field
        // (`"30"` into a u64, `"12345"` stays a user agent).
        Config::try_from(&v)?.try_deserialize()
    }
}
