//! Keystore access.
//!
//! A [`KeystoreDescriptor`] names a PKCS#12 keystore (an already loaded
//! handle, or a file) plus the password and alias used to pull one entry out
//! of it. A descriptor that points nowhere resolves to `None` rather than an
//! error.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use p12_keystore::{KeyStore, KeyStoreEntry};
use samlkit_core::KeystoreConfig;

use crate::certificate::Certificate;
use crate::error::{CryptoError, CryptoResult};
use crate::keys::PrivateKey;
use crate::provider;

/// Keystore handle or location, plus entry selection.
#[derive(Clone, Default)]
pub struct KeystoreDescriptor {
    keystore: Option<Arc<KeyStore>>,
    filename: Option<PathBuf>,
    password: Option<String>,
    alias: Option<String>,
}

impl KeystoreDescriptor {
    /// Creates an empty descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a descriptor for a keystore file.
    #[must_use]
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            filename: Some(path.into()),
            ..Self::default()
        }
    }

    /// Creates a descriptor around an already loaded keystore.
    ///
    /// The handle stays owned by the caller; it is shared, never closed.
    #[must_use]
    pub fn from_keystore(keystore: Arc<KeyStore>) -> Self {
        Self {
            keystore: Some(keystore),
            ..Self::default()
        }
    }

    /// Creates a descriptor from the keystore section of the configuration.
    #[must_use]
    pub fn from_config(config: &KeystoreConfig) -> Self {
        Self {
            keystore: None,
            filename: config.path.clone(),
            password: config.password.clone(),
            alias: config.alias.clone(),
        }
    }

    /// Sets the keystore password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the entry alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Returns the keystore file, if any.
    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Returns the entry alias, if any.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Returns true if a password was supplied.
    #[must_use]
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    fn password_or_empty(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }
}

impl fmt::Debug for KeystoreDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeystoreDescriptor")
            .field("keystore", &self.keystore.as_ref().map(|k| k.entries_count()))
            .field("filename", &self.filename)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("alias", &self.alias)
            .finish()
    }
}

/// Opens the keystore a descriptor names.
///
/// A supplied handle is returned as is. Otherwise an existing file is read
/// and decoded with the descriptor's password (empty if absent). With
/// neither, the result is `None`.
///
/// # Errors
///
/// Returns [`CryptoError::Keystore`] if the file exists but cannot be read
/// or decrypted.
pub fn open_keystore(descriptor: &KeystoreDescriptor) -> CryptoResult<Option<Arc<KeyStore>>> {
    if let Some(keystore) = &descriptor.keystore {
        return Ok(Some(Arc::clone(keystore)));
    }

    let Some(path) = descriptor.filename.as_deref() else {
        tracing::debug!("Keystore descriptor names neither a handle nor a file");
        return Ok(None);
    };
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "Keystore file does not exist");
        return Ok(None);
    }

    let data = {
        let mut file = File::open(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        data
    };

    let keystore = KeyStore::from_pkcs12(&data, descriptor.password_or_empty()).map_err(|e| {
        CryptoError::Keystore(format!("cannot load {}: {e}", path.display()))
    })?;
    tracing::debug!(
        path = %path.display(),
        entries = keystore.entries_count(),
        "Loaded keystore"
    );

    Ok(Some(Arc::new(keystore)))
}

/// Entry pulled from a keystore by alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeystoreEntry {
    /// Private key with its leaf certificate (if the chain has one).
    PrivateKey {
        /// The private key.
        key: PrivateKey,
        /// Leaf certificate of the chain.
        certificate: Option<Certificate>,
    },
    /// Trusted certificate without a key.
    Certificate(Certificate),
}

impl KeystoreEntry {
    /// Returns the entry's certificate.
    #[must_use]
    pub fn certificate(&self) -> Option<&Certificate> {
        match self {
            Self::PrivateKey { certificate, .. } => certificate.as_ref(),
            Self::Certificate(cert) => Some(cert),
        }
    }
}

/// Looks up the descriptor's alias in its keystore.
///
/// Returns `None` if there is no alias, no keystore, or no entry under the
/// alias.
///
/// # Errors
///
/// Returns an error if the keystore cannot be opened or the entry's key or
/// certificate cannot be decoded.
pub fn load_entry(descriptor: &KeystoreDescriptor) -> CryptoResult<Option<KeystoreEntry>> {
    let Some(alias) = descriptor.alias.as_deref() else {
        tracing::debug!("Keystore descriptor has no alias");
        return Ok(None);
    };
    let Some(keystore) = open_keystore(descriptor)? else {
        return Ok(None);
    };
    let Some(entry) = keystore.entry(alias) else {
        tracing::debug!(alias, "Alias not found in keystore");
        return Ok(None);
    };

    let entry = match entry {
        KeyStoreEntry::PrivateKeyChain(chain) => {
            let certificate = chain
                .chain()
                .first()
                .map(|c| provider::certificate_factory(c.as_der()))
                .transpose()?;
            let family = certificate.as_ref().map(Certificate::key_family);
            let key = provider::pkcs8_key(family, chain.key())?;
            KeystoreEntry::PrivateKey { key, certificate }
        }
        KeyStoreEntry::Certificate(cert) => {
            KeystoreEntry::Certificate(provider::certificate_factory(cert.as_der())?)
        }
    };
    Ok(Some(entry))
}

/// Resolves the private key stored under the descriptor's alias.
///
/// # Errors
///
/// Returns [`CryptoError::WrongEntryType`] if the alias names a
/// certificate-only entry, or any [`load_entry`] error.
pub fn load_private_key(descriptor: &KeystoreDescriptor) -> CryptoResult<Option<PrivateKey>> {
    match load_entry(descriptor)? {
        Some(KeystoreEntry::PrivateKey { key, .. }) => Ok(Some(key)),
        Some(KeystoreEntry::Certificate(_)) => Err(wrong_entry_type(descriptor)),
        None => Ok(None),
    }
}

/// Resolves the certificate stored under the descriptor's alias.
///
/// # Errors
///
/// Returns any [`load_entry`] error.
pub fn load_certificate(descriptor: &KeystoreDescriptor) -> CryptoResult<Option<Certificate>> {
    Ok(load_entry(descriptor)?.and_then(|entry| entry.certificate().cloned()))
}

pub(crate) fn wrong_entry_type(descriptor: &KeystoreDescriptor) -> CryptoError {
    let alias = descriptor.alias.clone().unwrap_or_default();
    tracing::warn!(alias = %alias, "Keystore entry holds no private key");
    CryptoError::WrongEntryType { alias }
}
