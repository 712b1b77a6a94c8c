//! Mount configuration.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Mount configuration loaded from a TOML file.
///
/// The pod root and identity provider are required; credentials are
/// optional and their absence means anonymous access.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Pod root identifier to mount.
    pub pod: String,
    /// Identity provider base URI.
    pub idp: String,
    /// Account name.
    pub username: Option<String>,
    /// Account password.
    pub password: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Config file path
    pub fn load(path: &Path) -> Result<Self> {
        let text: String = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_config() {
        let config: Config = toml::from_str(
            r#"
            pod = "https://alice.example/"
            idp = "https://login.example"
            username = "alice"
            password = "hunter2"
            "#,
        )
        .unwrap();
        assert_eq!(config.pod, "https://alice.example/");
        assert_eq!(config.idp, "https://login.example");
        assert_eq!(config.username.as_deref(), Some("alice"));
        assert_eq!(config.password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn credentials_are_optional() {
        let config: Config = toml::from_str(
            r#"
            pod = "https://alice.example/"
            idp = "https://login.example"
            "#,
        )
        .unwrap();
        assert!(config.username.is_none());
        assert!(config.password.is_none());
    }

    #[test]
    fn pod_and_idp_are_required() {
        assert!(toml::from_str::<Config>(r#"idp = "https://login.example""#).is_err());
        assert!(toml::from_str::<Config>(r#"pod = "https://alice.example/""#).is_err());
    }
}
