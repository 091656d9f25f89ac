//! Configuration management for parley.
//!
//! Loads configuration from ${PARLEY_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `backend.base_url`.
pub const BASE_URL_ENV: &str = "PARLEY_BASE_URL";

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, run `cargo xtask update-default-config`.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for parley configuration and data files.
    //!
    //! PARLEY_HOME resolution order:
    //! 1. PARLEY_HOME environment variable (if set)
    //! 2. ~/.config/parley (default)
    //! 3. ./.parley when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the parley home directory.
    pub fn parley_home() -> PathBuf {
        if let Ok(home) = std::env::var("PARLEY_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".parley"),
            |h| h.join(".config").join("parley"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        parley_home().join("config.toml")
    }

    /// Returns the path to the file holding the stored session identifier.
    pub fn session_path() -> PathBuf {
        parley_home().join("session.json")
    }

    /// Returns the default log file path.
    pub fn log_path() -> PathBuf {
        parley_home().join("parley.log")
    }
}

/// Assistant backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL that the `api/...` paths are joined onto.
    pub base_url: String,
    /// Request timeout in seconds. 0 disables the timeout.
    pub timeout_secs: u32,
    /// Custom User-Agent header.
    pub user_agent: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: Config::DEFAULT_BASE_URL.to_string(),
            timeout_secs: Config::DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

/// File logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `PARLEY_LOG` is not set.
    pub level: String,
    /// Log file path. Defaults to `$PARLEY_HOME/parley.log`.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Assistant reply appended when a send fails
    pub fallback_reply: String,

    /// Seconds before a failure notice dismisses itself (0 = never)
    pub notice_timeout_secs: u32,

    /// Example prompts offered while the conversation is empty
    pub prompts: Vec<String>,

    pub backend: BackendConfig,

    pub log: LogConfig,
}

impl Config {
    const DEFAULT_BASE_URL: &str = "http://localhost:5000/";
    const DEFAULT_TIMEOUT_SECS: u32 = 60;
    const DEFAULT_NOTICE_TIMEOUT_SECS: u32 = 5;
    pub const DEFAULT_FALLBACK_REPLY: &str = "I'm sorry, I don't understand that.";
    const DEFAULT_PROMPTS: [&str; 4] = [
        "Who are the characters of the Harry Potter Books?",
        "What are the differences of the Harry Potter books and movies?",
        "Who are the main characters of the Harry Potter books?",
        "What happened after the Harry Potter books?",
    ];

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Resolves the backend base URL.
    ///
    /// Precedence: explicit override > `PARLEY_BASE_URL` > config file.
    /// The result always ends with `/` so relative endpoints join under it.
    ///
    /// # Errors
    /// Returns an error if the URL does not parse or is not http(s).
    pub fn effective_base_url(&self, override_url: Option<&str>) -> Result<url::Url> {
        let env_url = std::env::var(BASE_URL_ENV).ok();
        let raw = override_url
            .or(env_url.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.backend.base_url.trim());

        let mut url =
            url::Url::parse(raw).with_context(|| format!("Invalid backend base URL: {raw}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("Backend base URL must use http or https: {raw}");
        }
        // `Url::join` replaces the last path segment unless the base ends with '/'.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Returns the request timeout, or None when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.backend.timeout_secs > 0)
            .then(|| Duration::from_secs(u64::from(self.backend.timeout_secs)))
    }

    /// Returns how long a failure notice stays visible, or None to keep it.
    pub fn notice_timeout(&self) -> Option<Duration> {
        (self.notice_timeout_secs > 0)
            .then(|| Duration::from_secs(u64::from(self.notice_timeout_secs)))
    }

    /// Returns the log file path, falling back to `$PARLEY_HOME/parley.log`.
    pub fn log_file(&self) -> PathBuf {
        self.log.file.clone().unwrap_or_else(paths::log_path)
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// Used by `xtask update-default-config` to keep `default_config.toml`
    /// in sync with the defaults declared here. The embedded template
    /// provides structure and comments; values come from `Config::default()`.
    pub fn generate() -> Result<String> {
        use toml_edit::DocumentMut;

        let generated_toml = toml::to_string(&Config::default())
            .context("Failed to serialize default config to TOML")?;

        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;
        let generated_doc: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        merge_items(doc.as_table_mut(), generated_doc.as_table());

        Ok(doc.to_string())
    }

    /// Writes config content to a file, creating parent directories as needed.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to move {} into place at {}",
                tmp_path.display(),
                path.display()
            )
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fallback_reply: Self::DEFAULT_FALLBACK_REPLY.to_string(),
            notice_timeout_secs: Self::DEFAULT_NOTICE_TIMEOUT_SECS,
            prompts: Self::DEFAULT_PROMPTS.iter().map(ToString::to_string).collect(),
            backend: BackendConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// Recursively overlays values from `source` onto `target`, keeping
/// `target`'s comments and layout.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source {
        match value {
            Item::Value(v) => {
                if let Some(Item::Value(existing)) = target.get_mut(key) {
                    merge_value(existing, v);
                } else {
                    target[key] = Item::Value(v.clone());
                }
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(arr) => {
                target[key] = Item::ArrayOfTables(arr.clone());
            }
            Item::None => {}
        }
    }
}

/// Replaces `target`'s value with `source`'s, keeping `target`'s decor.
fn merge_value(target: &mut toml_edit::Value, source: &toml_edit::Value) {
    if let (toml_edit::Value::Array(target), toml_edit::Value::Array(source)) =
        (&mut *target, source)
    {
        merge_array(target, source);
        return;
    }

    let decor = target.decor().clone();
    *target = source.clone();
    *target.decor_mut() = decor;
}

/// Swaps array elements while keeping the template's one-per-line layout.
///
/// Element `i` takes the decor of the template's element `i`; extra elements
/// reuse the first element's decor.
fn merge_array(target: &mut toml_edit::Array, source: &toml_edit::Array) {
    let decors: Vec<toml_edit::Decor> = target.iter().map(|v| v.decor().clone()).collect();
    let trailing = target.trailing().clone();
    let trailing_comma = target.trailing_comma();

    target.clear();
    for (i, value) in source.iter().enumerate() {
        let mut value = value.clone();
        if let Some(decor) = decors.get(i).or_else(|| decors.first()) {
            *value.decor_mut() = decor.clone();
        }
        target.push_formatted(value);
    }

    target.set_trailing(trailing);
    target.set_trailing_comma(trailing_comma);
}
