//! Configuration management for samlkit.
//!
//! Configuration is loaded from environment variables with sensible defaults:
//!
//! | Variable | Default |
//! |---|---|
//! | `SAMLKIT_KEY_ALGORITHM` | `rsa` |
//! | `SAMLKIT_FIPS` | `false` |
//! | `SAMLKIT_XML_INDENT` | `2` |
//! | `SAMLKIT_KEYSTORE` | unset |
//! | `SAMLKIT_KEYSTORE_PASSWORD` | unset |
//! | `SAMLKIT_KEYSTORE_ALIAS` | unset |

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest indentation width the serializer accepts.
pub const MAX_XML_INDENT: usize = 8;

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cryptographic provider configuration.
    pub crypto: CryptoConfig,
    /// XML toolkit configuration.
    pub xml: XmlConfig,
    /// Default keystore used when a caller supplies none.
    pub keystore: KeystoreConfig,
}

/// Cryptographic configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Algorithm assumed for raw key bytes when the caller names none.
    pub default_key_algorithm: String,
    /// Whether the provider must run in FIPS mode.
    pub fips_mode: bool,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            default_key_algorithm: "rsa".to_string(),
            fips_mode: false,
        }
    }
}

/// XML serialization configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlConfig {
    /// Number of spaces per nesting level when pretty-printing.
    pub indent: usize,
}

impl Default for XmlConfig {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// Keystore location and entry selection.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeystoreConfig {
    /// Path to a PKCS#12 keystore file.
    pub path: Option<PathBuf>,
    /// Keystore password.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Alias of the entry holding the signing key.
    pub alias: Option<String>,
}

impl fmt::Debug for KeystoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeystoreConfig")
            .field("path", &self.path)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("alias", &self.alias)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Unset variables fall back to their defaults; set but unparsable
    /// variables are rejected rather than silently ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let default_key_algorithm = lookup("SAMLKIT_KEY_ALGORITHM")
            .map(|v| v.trim().to_lowercase())
            .unwrap_or(defaults.crypto.default_key_algorithm);

        let fips_mode = match lookup("SAMLKIT_FIPS") {
            Some(v) => parse_flag("SAMLKIT_FIPS", &v)?,
            None => defaults.crypto.fips_mode,
        };

        let indent = match lookup("SAMLKIT_XML_INDENT") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| Error::invalid("SAMLKIT_XML_INDENT", format!("not a number: {v}")))?,
            None => defaults.xml.indent,
        };

        let keystore = KeystoreConfig {
            path: lookup("SAMLKIT_KEYSTORE").map(PathBuf::from),
            password: lookup("SAMLKIT_KEYSTORE_PASSWORD"),
            alias: lookup("SAMLKIT_KEYSTORE_ALIAS"),
        };

        let config = Self {
            crypto: CryptoConfig {
                default_key_algorithm,
                fips_mode,
            },
            xml: XmlConfig { indent },
            keystore,
        };
        config.validate()?;

        tracing::debug!(
            key_algorithm = %config.crypto.default_key_algorithm,
            fips = config.crypto.fips_mode,
            keystore = config.keystore.path.is_some(),
            "Loaded configuration"
        );

        Ok(config)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty algorithm name, an indentation wider
    /// than [`MAX_XML_INDENT`], or keystore credentials without a keystore.
    pub fn validate(&self) -> Result<()> {
        if self.crypto.default_key_algorithm.is_empty() {
            return Err(Error::invalid(
                "SAMLKIT_KEY_ALGORITHM",
                "algorithm name must not be empty",
            ));
        }
        if self.xml.indent > MAX_XML_INDENT {
            return Err(Error::invalid(
                "SAMLKIT_XML_INDENT",
                format!("must be at most {MAX_XML_INDENT}"),
            ));
        }
        if self.keystore.path.is_none()
            && (self.keystore.alias.is_some() || self.keystore.password.is_some())
        {
            return Err(Error::Config(
                "keystore alias or password given without SAMLKIT_KEYSTORE".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::invalid(key, format!("not a boolean: {other}"))),
    }
}
