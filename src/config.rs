//! CLI and client settings loaded from TOML
//!
//! ```toml
//! rpc_url = "https://sepolia.base.org"
//! rpc_user = "alice"
//! rpc_password = "secret"
//! from = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
//! log_filter = "batch_sender_sdk=debug,info"
//! ```
//!
//! Accepted networks, the fee collector and the gas constant are protocol
//! constants and are not configurable.

use crate::address::parse_address;
use crate::error::{Error, Result};
use alloy_primitives::Address;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings file contents. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub rpc_url: Option<String>,
    pub rpc_user: Option<String>,
    pub rpc_password: Option<String>,
    /// Account to send from; defaults to the endpoint's first account
    pub from: Option<String>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rpc_url: None,
            rpc_user: None,
            rpc_password: None,
            from: None,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(text).map_err(|e| Error::Config(format!("Invalid settings: {}", e)))?;
        settings.from_address()?;
        Ok(settings)
    }

    /// Load settings from `path`, or from the default location when `path` is `None`.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };

        let text = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn from_address(&self) -> Result<Option<Address>> {
        self.from.as_deref().map(parse_address).transpose()
    }

    /// Credentials, only when both user and password are set
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.rpc_user, &self.rpc_password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        }
    }
}

/// `<config dir>/batch-sender/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("batch-sender").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_settings() {
        let settings = Settings::from_toml_str(
            r#"
            rpc_url = "http://localhost:8545"
            rpc_user = "user"
            rpc_password = "pass"
            from = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
            log_filter = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(settings.rpc_url.as_deref(), Some("http://localhost:8545"));
        assert_eq!(settings.credentials(), Some(("user".into(), "pass".into())));
        assert!(settings.from_address().unwrap().is_some());
        assert_eq!(settings.log_filter, "debug");
    }

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.credentials(), None);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(matches!(
            Settings::from_toml_str("rpc_port = 1"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Settings::from_toml_str("from = \"0x1234\""),
            Err(Error::Address(_))
        ));
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rpc_url = \"https://sepolia.base.org\"").unwrap();
        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.rpc_url.as_deref(), Some("https://sepolia.base.org"));

        assert!(Settings::load(Some(Path::new("/no/such/config.toml"))).is_err());
    }
}
