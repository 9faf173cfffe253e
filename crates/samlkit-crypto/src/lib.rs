//! # samlkit-crypto
//!
//! Key material normalization for samlkit, built on aws-lc-rs, x509-parser
//! and p12-keystore.
//!
//! Callers hand over keys, certificates and credentials in whatever shape
//! they have (raw DER, base64 or PEM text, native objects, keystore aliases,
//! public/private pairs) and get back one canonical object:
//!
//! - [`to_private_key`] produces a [`PrivateKey`]
//! - [`to_certificate`] produces a [`Certificate`]
//! - [`to_credential`] produces a [`Credential`]
//!
//! An absent input always yields an absent output.
//!
//! ```rust,ignore
//! use samlkit_crypto::{to_credential, KeyMaterial, KeystoreDescriptor};
//!
//! let descriptor = KeystoreDescriptor::from_file("keystore.jks")
//!     .with_password("123456")
//!     .with_alias("sp");
//! let credential = to_credential(Some(&descriptor.into()), None)?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod algorithm;
pub mod bootstrap;
pub mod certificate;
pub mod coerce;
pub mod credential;
pub mod encoding;
pub mod error;
pub mod hash;
pub mod keys;
pub mod keystore;
pub mod provider;

pub use algorithm::{key_from_bytes, AlgorithmRegistry};
pub use bootstrap::ensure_initialized;
pub use certificate::Certificate;
pub use coerce::{to_certificate, to_credential, to_private_key, KeyMaterial};
pub use credential::Credential;
pub use error::{CryptoError, CryptoResult};
pub use keys::{EcCurve, EcPrivateKey, KeyFamily, PrivateKey, PublicKey, RsaPrivateKey, SecretKey};
pub use keystore::{open_keystore, KeystoreDescriptor, KeystoreEntry};

pub use p12_keystore::KeyStore;
