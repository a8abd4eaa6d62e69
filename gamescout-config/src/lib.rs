//! Loader for gamescout configuration with YAML + environment overlays.
//!
//! Every field has a compiled-in default, so an empty configuration is a
//! valid one. Sources are merged in the order they are attached, with the
//! `GAMESCOUT_` environment overlay always winning:
//!
//! ```text
//! GAMESCOUT_SEARCH__TIMEOUT_SECS=5      -> search.timeout_secs = 5
//! GAMESCOUT_LOGGING__FORMAT=json        -> logging.format = json
//! ```
//!
//! String values may reference other environment variables as `${VAR}`;
//! expansion is recursive and capped at [`MAXIMUM_ENV_EXPANSION_DEPTH`] hops.
use config::{Config, Environment, File};
use gamescout_common::observability::LogFormat;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub use config::ConfigError;

pub const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Placeholder replaced by the console name in [`SearchSettings::query_template`].
pub const CONSOLE_PLACEHOLDER: &str = "{console}";
/// Placeholder replaced by the encoded query in [`SearchSettings::url_template`].
pub const QUERY_PLACEHOLDER: &str = "{query}";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GamescoutConfig {
    pub version: Option<String>,
    pub search: SearchSettings,
    pub logging: LoggingSettings,
}

/// How a search request is built and how its page is read back.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Natural-language query; `{console}` is replaced by the user's input.
    pub query_template: String,
    /// Search endpoint; `{query}` is replaced by the percent-encoded query.
    pub url_template: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub rules: ExtractionRules,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            query_template: format!("most popular video game for {CONSOLE_PLACEHOLDER}"),
            url_template: format!("https://www.google.com/search?q={QUERY_PLACEHOLDER}"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10,
            rules: ExtractionRules::default(),
        }
    }
}

/// Selector table for the result page.
///
/// These selectors track undocumented third-party markup. When the page
/// changes, this table is the only thing that needs touching.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionRules {
    /// Single-match panels, checked in order (featured snippet, answer box).
    pub answers: Vec<AnswerRule>,
    pub organic: OrganicRule,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            answers: vec![
                AnswerRule {
                    label: "Featured Answer".into(),
                    selector: "div.hgKElc".into(),
                },
                AnswerRule {
                    label: "Answer".into(),
                    selector: "div.IZ6rdc".into(),
                },
            ],
            organic: OrganicRule::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnswerRule {
    pub label: String,
    pub selector: String,
}

/// Organic results: `title` and `snippet` are looked up inside each `container`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrganicRule {
    pub container: String,
    pub title: String,
    pub snippet: String,
    pub limit: usize,
}

impl Default for OrganicRule {
    fn default() -> Self {
        Self {
            container: "div.g".into(),
            title: "h3".into(),
            snippet: "div.VwiC3b".into(),
            limit: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
    pub filter: String,
    pub stderr: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            filter: "info".into(),
            stderr: false,
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
pub struct GamescoutConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for GamescoutConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl GamescoutConfigLoader {
    /// Start from compiled-in defaults.
    ///
    /// ```
    /// use gamescout_config::GamescoutConfigLoader;
    ///
    /// let cfg = GamescoutConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(cfg.version.as_deref(), Some("1"));
    /// assert_eq!(cfg.search.timeout_secs, 10);
    /// assert_eq!(cfg.search.rules.organic.limit, 3);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests to merge inline YAML snippets.
    ///
    /// ```
    /// use gamescout_config::GamescoutConfigLoader;
    ///
    /// let cfg = GamescoutConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// search:
    ///   rules:
    ///     answers:
    ///       - label: "Top Pick"
    ///         selector: "div.pick"
    ///     organic:
    ///       container: "li.result"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.search.rules.answers.len(), 1);
    /// assert_eq!(cfg.search.rules.answers[0].label, "Top Pick");
    /// assert_eq!(cfg.search.rules.organic.container, "li.result");
    /// assert_eq!(cfg.search.rules.organic.title, "h3");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// `GAMESCOUT_`-prefixed environment variables are layered on top of every
    /// attached source, then `${VAR}` placeholders are expanded.
    pub fn load(self) -> Result<GamescoutConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("GAMESCOUT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
