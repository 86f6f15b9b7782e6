//! Configuration of the playlist loader
//!
//! Values are layered, later sources winning:
//!
//! 1. the embedded defaults (`pmoyoutube.yaml`);
//! 2. `config.yaml` in the configuration directory, if present;
//! 3. `PMOYOUTUBE_CONFIG__SECTION__KEY=value` environment variables;
//! 4. `YOUTUBE_API_KEY` and `YOUTUBE_PLAYLIST_ID`.
//!
//! The configuration directory is, in order: the explicit argument,
//! `$PMOYOUTUBE_CONFIG`, `./.pmoyoutube`, `~/.pmoyoutube`. Nothing is ever
//! written back.
//!
//! ```no_run
//! use pmoyoutube::YouTubeConfig;
//!
//! # fn main() -> pmoyoutube::Result<()> {
//! let config = YouTubeConfig::load(None)?;
//! let client = config.client()?;
//! # Ok(())
//! # }
//! ```

use crate::client::YouTubeClient;
use crate::error::{Error, Result};
use dirs::home_dir;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};
use tracing::{debug, info};

const DEFAULT_CONFIG: &str = include_str!("pmoyoutube.yaml");

const CONFIG_FILE: &str = "config.yaml";
const LOCAL_CONFIG_DIR: &str = ".pmoyoutube";

const ENV_CONFIG_DIR: &str = "PMOYOUTUBE_CONFIG";
const ENV_PREFIX: &str = "PMOYOUTUBE_CONFIG__";

/// Environment variable holding the API key (secret)
pub const ENV_API_KEY: &str = "YOUTUBE_API_KEY";

/// Environment variable holding the playlist id
pub const ENV_PLAYLIST_ID: &str = "YOUTUBE_PLAYLIST_ID";

/// Settings of the YouTube loader
#[derive(Clone, Deserialize)]
pub struct YouTubeConfig {
    pub api_base: String,
    pub api_key: String,
    pub playlist_id: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Deserialize)]
struct ConfigFile {
    youtube: YouTubeConfig,
}

impl std::fmt::Debug for YouTubeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("playlist_id", &self.playlist_id)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl YouTubeConfig {
    /// Load and validate the configuration from the process environment
    pub fn load(directory: Option<&Path>) -> Result<Self> {
        Self::load_with_env(directory, env::vars())
    }

    /// Load and validate the configuration with an explicit environment
    pub fn load_with_env<I>(directory: Option<&Path>, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();

        let external = match find_config_dir(directory, &vars) {
            Some(dir) => read_config_file(&dir)?,
            None => None,
        };

        let config = Self::from_sources(external.as_deref(), vars)?;
        config.validate()?;
        Ok(config)
    }

    /// Build the configuration from an optional YAML document and environment
    /// variables, without validating it
    pub fn from_sources<I>(external: Option<&str>, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        if let Some(yaml) = external {
            let external: Value = serde_yaml::from_str(yaml)?;
            merge_yaml(&mut value, &lower_keys(external));
        }

        apply_env_overrides(&mut value, vars);

        let file: ConfigFile = serde_yaml::from_value(value)?;
        Ok(file.youtube)
    }

    /// Fail if the API key or the playlist id is missing
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::MissingSetting(ENV_API_KEY));
        }
        if self.playlist_id.trim().is_empty() {
            return Err(Error::MissingSetting(ENV_PLAYLIST_ID));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Build an HTTP client from these settings
    pub fn client(&self) -> Result<YouTubeClient> {
        YouTubeClient::builder()
            .api_base(&self.api_base)
            .api_key(&self.api_key)
            .playlist_id(&self.playlist_id)
            .timeout(self.request_timeout())
            .user_agent(&self.user_agent)
            .build()
    }
}

fn find_config_dir(directory: Option<&Path>, vars: &[(String, String)]) -> Option<PathBuf> {
    if let Some(dir) = directory {
        return Some(dir.to_path_buf());
    }

    if let Some((_, dir)) = vars.iter().find(|(k, _)| k == ENV_CONFIG_DIR) {
        info!(env_var = ENV_CONFIG_DIR, path = %dir, "Using config directory from env");
        return Some(PathBuf::from(dir));
    }

    let local = Path::new(LOCAL_CONFIG_DIR);
    if local.is_dir() {
        return Some(local.to_path_buf());
    }

    home_dir()
        .map(|home| home.join(LOCAL_CONFIG_DIR))
        .filter(|dir| dir.is_dir())
}

fn read_config_file(dir: &Path) -> Result<Option<String>> {
    let path = dir.join(CONFIG_FILE);
    if !path.is_file() {
        debug!(config_file = %path.display(), "Config file not found, using defaults");
        return Ok(None);
    }

    info!(config_file = %path.display(), "Loaded config file");
    Ok(Some(fs::read_to_string(&path)?))
}

/// Apply `PMOYOUTUBE_CONFIG__*` overrides, then the canonical credential
/// variables, so the latter always win
fn apply_env_overrides<I>(config: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    let vars: Vec<(String, String)> = vars.into_iter().collect();

    for (key, value) in &vars {
        if let Some(path) = key.strip_prefix(ENV_PREFIX) {
            let path: Vec<&str> = path.split("__").collect();
            let value = convert_env_value(get_value(config, &path), value);
            set_value(config, &path, value);
        }
    }

    for (key, value) in vars {
        if key == ENV_API_KEY {
            set_value(config, &["youtube", "api_key"], Value::String(value));
        } else if key == ENV_PLAYLIST_ID {
            set_value(config, &["youtube", "playlist_id"], Value::String(value));
        }
    }
}

/// Parse an env value as YAML, unless the setting it replaces is a string
fn convert_env_value(current: Option<&Value>, value: &str) -> Value {
    if let Some(Value::String(_)) = current {
        return Value::String(value.to_string());
    }
    serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn get_value<'a>(data: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(data, |node, key| {
        node.as_mapping()?
            .get(Value::String(key.to_lowercase()))
    })
}

fn set_value(data: &mut Value, path: &[&str], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        *data = value;
        return;
    };

    if !data.is_mapping() {
        *data = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(map) = data {
        let entry = map
            .entry(Value::String(first.to_lowercase()))
            .or_insert(Value::Null);
        set_value(entry, rest, value);
    }
}

fn lower_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| match k {
                    Value::String(s) => (Value::String(s.to_lowercase()), lower_keys(v)),
                    k => (k, lower_keys(v)),
                })
                .collect(),
        ),
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys).collect()),
        other => other,
    }
}

/// Recursively merge `external` into `default`; scalars and sequences are replaced
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = YouTubeConfig::from_sources(None, vars(&[])).unwrap();
        assert_eq!(config.api_base, crate::client::DEFAULT_API_BASE);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_missing_credentials_fail_fast() {
        let config = YouTubeConfig::from_sources(None, vars(&[])).unwrap();
        assert!(matches!(
            config.validate(),
            Err(Error::MissingSetting(ENV_API_KEY))
        ));

        let config =
            YouTubeConfig::from_sources(None, vars(&[(ENV_API_KEY, "key"), (ENV_PLAYLIST_ID, " ")]))
                .unwrap();
        assert!(matches!(
            config.validate(),
            Err(Error::MissingSetting(ENV_PLAYLIST_ID))
        ));
    }

    #[test]
    fn test_file_then_env_precedence() {
        let yaml = "YouTube:\n  playlist_id: PLfile\n  request_timeout_secs: 10\n";
        let config = YouTubeConfig::from_sources(
            Some(yaml),
            vars(&[
                (ENV_API_KEY, "AIzaKey"),
                ("PMOYOUTUBE_CONFIG__YOUTUBE__REQUEST_TIMEOUT_SECS", "60"),
                ("UNRELATED", "ignored"),
            ]),
        )
        .unwrap();

        assert_eq!(config.playlist_id, "PLfile");
        assert_eq!(config.api_key, "AIzaKey");
        assert_eq!(config.request_timeout_secs, 60);
        config.validate().unwrap();
    }

    #[test]
    fn test_numeric_playlist_id_stays_a_string() {
        let config = YouTubeConfig::from_sources(
            None,
            vars(&[(ENV_API_KEY, "k"), (ENV_PLAYLIST_ID, "12345")]),
        )
        .unwrap();
        assert_eq!(config.playlist_id, "12345");
    }

    #[test]
    fn test_canonical_variables_win_whatever_the_order() {
        let config = YouTubeConfig::from_sources(
            None,
            vars(&[
                (ENV_API_KEY, "canonical"),
                ("PMOYOUTUBE_CONFIG__YOUTUBE__API_KEY", "generic"),
                (ENV_PLAYLIST_ID, "PLcanonical"),
                ("PMOYOUTUBE_CONFIG__YOUTUBE__PLAYLIST_ID", "PLgeneric"),
            ]),
        )
        .unwrap();

        assert_eq!(config.api_key, "canonical");
        assert_eq!(config.playlist_id, "PLcanonical");
    }

    #[test]
    fn test_prefixed_override_keeps_string_settings_as_text() {
        let config = YouTubeConfig::from_sources(
            None,
            vars(&[
                ("PMOYOUTUBE_CONFIG__YOUTUBE__API_KEY", "k"),
                ("PMOYOUTUBE_CONFIG__YOUTUBE__PLAYLIST_ID", "012345"),
                ("PMOYOUTUBE_CONFIG__YOUTUBE__REQUEST_TIMEOUT_SECS", "45"),
            ]),
        )
        .unwrap();

        assert_eq!(config.playlist_id, "012345");
        assert_eq!(config.request_timeout_secs, 45);
        config.validate().unwrap();
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "youtube:\n  api_key: filekey\n  playlist_id: PLdir\n",
        )
        .unwrap();

        let config = YouTubeConfig::load_with_env(Some(dir.path()), vars(&[])).unwrap();
        assert_eq!(config.playlist_id, "PLdir");

        let client = config.client().unwrap();
        assert_eq!(client.playlist_id(), "PLdir");
    }

    #[test]
    fn test_load_from_env_directory_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let env = vars(&[
            (ENV_CONFIG_DIR, dir.path().to_str().unwrap()),
            (ENV_API_KEY, "k"),
            (ENV_PLAYLIST_ID, "PL"),
        ]);

        let config = YouTubeConfig::load_with_env(None, env).unwrap();
        assert_eq!(config.playlist_id, "PL");
    }

    #[test]
    fn test_invalid_yaml_is_reported() {
        let result = YouTubeConfig::from_sources(Some("youtube: [unclosed"), vars(&[]));
        assert!(matches!(result, Err(Error::Yaml(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config =
            YouTubeConfig::from_sources(None, vars(&[(ENV_API_KEY, "topsecret")])).unwrap();
        assert!(!format!("{config:?}").contains("topsecret"));
    }
}
