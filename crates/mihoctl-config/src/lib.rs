//! Persisted configuration for the mihoctl CLI and TUI.
//!
//! One flat TOML document (address, secret, probe URL, timeout) at a
//! per-user location, overridable through `MIHOCTL_*` environment
//! variables, and translated into `mihoctl_core::ClientConfig`. A missing
//! file is not an error: loaders fall back to defaults and the binaries
//! offer the guided initializer.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use mihoctl_core::{ClientConfig, SettingKey};

/// Environment variable that points at an alternate config file.
pub const CONFIG_PATH_ENV: &str = "MIHOCTL_CONFIG";
const ENV_PREFIX: &str = "MIHOCTL_";

const DEFAULT_API_ADDRESS: &str = "http://127.0.0.1:9090";
const DEFAULT_TEST_URL: &str = "http://www.gstatic.com/generate_204";
const DEFAULT_TIMEOUT_MS: u64 = 5000;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown config key '{key}' (valid keys: api_address, secret, test_url, timeout)")]
    UnknownKey { key: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("prompt failed: {0}")]
    Prompt(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<dialoguer::Error> for ConfigError {
    fn from(err: dialoguer::Error) -> Self {
        Self::Prompt(err.to_string())
    }
}

// ── Config ──────────────────────────────────────────────────────────

/// The persisted settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// External controller root, e.g. `http://127.0.0.1:9090`.
    #[serde(default = "default_api_address")]
    pub api_address: String,

    /// Controller secret; empty means no auth.
    #[serde(default)]
    pub secret: String,

    /// URL every latency probe fetches.
    #[serde(default = "default_test_url")]
    pub test_url: String,

    /// Request and probe timeout in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_address: default_api_address(),
            secret: String::new(),
            test_url: default_test_url(),
            timeout: default_timeout(),
        }
    }
}

fn default_api_address() -> String {
    DEFAULT_API_ADDRESS.into()
}
fn default_test_url() -> String {
    DEFAULT_TEST_URL.into()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Config {
    /// Current value of one setting as text.
    pub fn get(&self, key: SettingKey) -> String {
        match key {
            SettingKey::ApiAddress => self.api_address.clone(),
            SettingKey::Secret => self.secret.clone(),
            SettingKey::TestUrl => self.test_url.clone(),
            SettingKey::Timeout => self.timeout.to_string(),
        }
    }

    /// Every setting in display order.
    pub fn entries(&self) -> Vec<(SettingKey, String)> {
        SettingKey::ALL.iter().map(|&k| (k, self.get(k))).collect()
    }

    /// Validate and assign one setting. The value is trimmed.
    pub fn set(&mut self, key: SettingKey, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            SettingKey::ApiAddress => {
                validate_url("api_address", value, &["http", "https"])?;
                self.api_address = value.trim_end_matches('/').to_owned();
            }
            SettingKey::Secret => self.secret = value.to_owned(),
            SettingKey::TestUrl => {
                validate_url("test_url", value, &["http", "https"])?;
                self.test_url = value.to_owned();
            }
            SettingKey::Timeout => {
                self.timeout = match value.parse::<u64>() {
                    Ok(ms) if ms > 0 => ms,
                    _ => {
                        return Err(ConfigError::Validation {
                            field: "timeout".into(),
                            reason: format!("must be a positive number of milliseconds, got '{value}'"),
                        });
                    }
                };
            }
        }
        Ok(())
    }

    /// Like [`set`](Self::set), with the key given by name
    /// (`api_address` or `api-address`, and so on).
    pub fn set_by_name(&mut self, key: &str, value: &str) -> Result<SettingKey, ConfigError> {
        let parsed: SettingKey = key.parse().map_err(|_| ConfigError::UnknownKey {
            key: key.to_owned(),
        })?;
        self.set(parsed, value)?;
        Ok(parsed)
    }

    /// Check every field, as loaded from disk or the environment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("api_address", &self.api_address, &["http", "https"])?;
        validate_url("test_url", &self.test_url, &["http", "https"])?;
        if self.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "timeout".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Build the runtime connection settings.
    pub fn to_client_config(&self) -> Result<ClientConfig, ConfigError> {
        self.validate()?;
        let api_address = url::Url::parse(&self.api_address).map_err(|e| ConfigError::Validation {
            field: "api_address".into(),
            reason: e.to_string(),
        })?;

        let mut client = ClientConfig::new(api_address);
        client.secret = (!self.secret.is_empty()).then(|| SecretString::from(self.secret.clone()));
        client.test_url.clone_from(&self.test_url);
        client.timeout = Duration::from_millis(self.timeout);
        Ok(client)
    }
}

fn validate_url(field: &str, value: &str, schemes: &[&str]) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::Validation {
        field: field.into(),
        reason,
    };
    let url = url::Url::parse(value).map_err(|e| invalid(format!("'{value}' is not a URL: {e}")))?;
    if !schemes.contains(&url.scheme()) {
        return Err(invalid(format!(
            "scheme must be one of {}, got '{}'",
            schemes.join("/"),
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(invalid(format!("'{value}' has no host")));
    }
    Ok(())
}

/// Render a secret for display: `(not set)`, `****` for short values,
/// else the first and last three characters around `****`.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    match chars.len() {
        0 => "(not set)".into(),
        1..=6 => "****".into(),
        n => {
            let head: String = chars[..3].iter().collect();
            let tail: String = chars[n - 3..].iter().collect();
            format!("{head}****{tail}")
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `$MIHOCTL_CONFIG` if set, else the
/// platform config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("", "", "mihoctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("mihoctl");
    p
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load from the canonical path plus environment overrides.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing is fine) plus `MIHOCTL_*` overrides.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

/// Load only what is stored in `path`, without environment overrides.
/// Use this before writing back so env values never get persisted.
pub fn load_stored(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .extract()?;
    Ok(config)
}

/// Load config, returning defaults if it is missing or unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

pub fn config_exists() -> bool {
    config_path().is_file()
}

// ── Saving ──────────────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    debug!(path = %path.display(), "config saved");
    Ok(())
}

/// Load, change one setting, and write back. Returns the new value as
/// stored.
pub fn update_setting(key: SettingKey, value: &str) -> Result<String, ConfigError> {
    let path = config_path();
    let mut cfg = load_stored(&path)?;
    cfg.set(key, value)?;
    save_config_to(&cfg, &path)?;
    Ok(cfg.get(key))
}

// ── Guided init ─────────────────────────────────────────────────────

/// Interactive first-run setup. Writes the defaults first so a cancelled
/// run still leaves a usable file, then prompts for each field.
pub fn guided_init(path: &Path) -> Result<Config, ConfigError> {
    let mut cfg = Config::default();
    save_config_to(&cfg, path)?;

    eprintln!("mihoctl setup");
    eprintln!("   Config path: {}\n", path.display());

    let address: String = dialoguer::Input::new()
        .with_prompt("mihomo API address")
        .default(cfg.api_address.clone())
        .validate_with(|input: &String| -> Result<(), String> {
            validate_url("api_address", input, &["http", "https"]).map_err(|e| e.to_string())
        })
        .interact_text()?;
    cfg.set(SettingKey::ApiAddress, &address)?;

    let secret = rpassword::prompt_password("API secret (leave empty for none): ")
        .map_err(|e| ConfigError::Prompt(e.to_string()))?;
    cfg.set(SettingKey::Secret, &secret)?;

    let test_url: String = dialoguer::Input::new()
        .with_prompt("Latency test URL")
        .default(cfg.test_url.clone())
        .validate_with(|input: &String| -> Result<(), String> {
            validate_url("test_url", input, &["http", "https"]).map_err(|e| e.to_string())
        })
        .interact_text()?;
    cfg.set(SettingKey::TestUrl, &test_url)?;

    let timeout: u64 = dialoguer::Input::new()
        .with_prompt("Timeout (ms)")
        .default(cfg.timeout)
        .validate_with(|input: &u64| -> Result<(), &str> {
            if *input > 0 { Ok(()) } else { Err("must be greater than zero") }
        })
        .interact_text()?;
    cfg.timeout = timeout;

    save_config_to(&cfg, path)?;
    eprintln!("\n✓ Configuration written to {}", path.display());
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn defaults_match_a_stock_daemon() {
        let cfg = Config::default();
        assert_eq!(cfg.api_address, "http://127.0.0.1:9090");
        assert_eq!(cfg.secret, "");
        assert_eq!(cfg.test_url, "http://www.gstatic.com/generate_204");
        assert_eq!(cfg.timeout, 5000);
    }

    #[test]
    fn set_validates_each_key() {
        let mut cfg = Config::default();
        cfg.set(SettingKey::ApiAddress, " http://10.0.0.1:9090/ ").unwrap();
        assert_eq!(cfg.api_address, "http://10.0.0.1:9090");

        assert!(matches!(
            cfg.set(SettingKey::ApiAddress, "not a url"),
            Err(ConfigError::Validation { .. })
        ));
        assert!(cfg.set(SettingKey::TestUrl, "ftp://example.com").is_err());
        assert!(cfg.set(SettingKey::Timeout, "0").is_err());
        assert!(cfg.set(SettingKey::Timeout, "abc").is_err());
        cfg.set(SettingKey::Timeout, "2500").unwrap();
        assert_eq!(cfg.timeout, 2500);
    }

    #[test]
    fn set_by_name_accepts_both_spellings() {
        let mut cfg = Config::default();
        assert_eq!(
            cfg.set_by_name("test-url", "https://cp.cloudflare.com/").unwrap(),
            SettingKey::TestUrl
        );
        assert_eq!(
            cfg.set_by_name("api_address", "http://router:9090").unwrap(),
            SettingKey::ApiAddress
        );
        assert!(matches!(
            cfg.set_by_name("port", "1"),
            Err(ConfigError::UnknownKey { .. })
        ));
    }

    #[test]
    fn mask_secret_shapes() {
        assert_eq!(mask_secret(""), "(not set)");
        assert_eq!(mask_secret("abc"), "****");
        assert_eq!(mask_secret("abcdef"), "****");
        assert_eq!(mask_secret("abcdefgh"), "abc****fgh");
    }

    #[test]
    fn client_config_carries_every_field() {
        let cfg = Config {
            api_address: "http://127.0.0.1:9097".into(),
            secret: "s3cret".into(),
            test_url: "https://cp.cloudflare.com/".into(),
            timeout: 1500,
        };
        let client = cfg.to_client_config().unwrap();
        assert_eq!(client.api_address.as_str(), "http://127.0.0.1:9097/");
        assert_eq!(client.secret.unwrap().expose_secret(), "s3cret");
        assert_eq!(client.test_url, "https://cp.cloudflare.com/");
        assert_eq!(client.timeout, Duration::from_millis(1500));

        let open = Config::default().to_client_config().unwrap();
        assert!(open.secret.is_none());
    }

    // Anything that loads reads `MIHOCTL_*`; run it inside a Jail.

    #[test]
    fn save_then_load_round_trips_through_disk() {
        figment::Jail::expect_with(|jail| {
            let path = jail.directory().join("nested").join("config.toml");
            let mut cfg = Config::default();
            cfg.set(SettingKey::Secret, "hunter22").map_err(|e| e.to_string())?;
            save_config_to(&cfg, &path).map_err(|e| e.to_string())?;

            let raw = std::fs::read_to_string(&path).map_err(|e| e.to_string())?;
            assert!(raw.contains("secret = \"hunter22\""));
            assert_eq!(load_config_from(&path).map_err(|e| e.to_string())?, cfg);
            Ok(())
        });
    }

    #[test]
    fn missing_file_loads_defaults() {
        figment::Jail::expect_with(|jail| {
            let cfg = load_config_from(&jail.directory().join("absent.toml"))
                .map_err(|e| e.to_string())?;
            assert_eq!(cfg, Config::default());
            Ok(())
        });
    }

    #[test]
    fn stored_config_ignores_environment() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "timeout = 800\n")?;
            jail.set_env("MIHOCTL_TIMEOUT", "1200");

            let stored = load_stored(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(stored.timeout, 800);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "api_address = \"http://10.0.0.1:9090\"\ntimeout = 800\n")?;
            jail.set_env("MIHOCTL_TIMEOUT", "1200");
            jail.set_env("MIHOCTL_CONFIG", "config.toml");

            let cfg = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg.api_address, "http://10.0.0.1:9090");
            assert_eq!(cfg.timeout, 1200);
            assert_eq!(cfg.test_url, DEFAULT_TEST_URL);
            Ok(())
        });
    }

    #[test]
    fn invalid_file_is_rejected() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "api_address = \"gopher://x\"\n")?;
            assert!(matches!(
                load_config_from(Path::new("config.toml")),
                Err(ConfigError::Validation { .. })
            ));
            Ok(())
        });
    }
}
