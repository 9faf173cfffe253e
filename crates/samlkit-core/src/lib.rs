//! # samlkit-core
//!
//! Configuration and error handling shared by the samlkit crates.
//!
//! The crypto and XML layers read their tunables (default key algorithm,
//! FIPS mode, serializer indentation, default keystore) from [`Config`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod error;

pub use config::{Config, CryptoConfig, KeystoreConfig, XmlConfig};
pub use error::{Error, Result};
