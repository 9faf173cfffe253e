//! One-time cryptographic provider registration.
//!
//! Every coercion entry point calls [`ensure_initialized`]. The first call
//! registers the provider; later calls return the cached outcome, including
//! a cached failure.

use std::sync::OnceLock;

use samlkit_core::CryptoConfig;

use crate::algorithm;
use crate::error::{CryptoError, CryptoResult};

/// Algorithm assumed for raw key bytes when nothing else is configured.
pub const DEFAULT_KEY_ALGORITHM: &str = "rsa";

#[derive(Debug)]
struct Provider {
    default_key_algorithm: String,
    fips: bool,
}

static PROVIDER: OnceLock<Result<Provider, CryptoError>> = OnceLock::new();

/// Registers the provider with explicit configuration.
///
/// Only the first call (from here or from [`ensure_initialized`]) decides
/// the configuration; later calls observe its result.
///
/// # Errors
///
/// Returns [`CryptoError::Bootstrap`] if FIPS mode was requested and the
/// linked AWS-LC build is not FIPS validated.
pub fn initialize(config: &CryptoConfig) -> CryptoResult<()> {
    PROVIDER
        .get_or_init(|| register_provider(config))
        .as_ref()
        .map(|_| ())
        .map_err(Clone::clone)
}

/// Registers the provider with default configuration unless already done.
///
/// # Errors
///
/// Returns the cached [`CryptoError::Bootstrap`] if registration failed.
pub fn ensure_initialized() -> CryptoResult<()> {
    if let Some(state) = PROVIDER.get() {
        return state.as_ref().map(|_| ()).map_err(Clone::clone);
    }
    initialize(&CryptoConfig::default())
}

/// Returns true once registration has succeeded.
#[must_use]
pub fn is_initialized() -> bool {
    matches!(PROVIDER.get(), Some(Ok(_)))
}

/// Returns true if the provider was registered in FIPS mode.
#[must_use]
pub fn is_fips() -> bool {
    matches!(PROVIDER.get(), Some(Ok(p)) if p.fips)
}

/// Returns the configured algorithm for raw key bytes.
#[must_use]
pub fn default_key_algorithm() -> &'static str {
    match PROVIDER.get() {
        Some(Ok(p)) => &p.default_key_algorithm,
        _ => DEFAULT_KEY_ALGORITHM,
    }
}

fn register_provider(config: &CryptoConfig) -> Result<Provider, CryptoError> {
    aws_lc_rs::init();

    if config.fips_mode {
        if let Err(e) = aws_lc_rs::try_fips_mode() {
            tracing::error!(error = e, "FIPS mode requested but unavailable");
            return Err(CryptoError::Bootstrap(e.to_string()));
        }
    }

    let registry = algorithm::global();
    let default_key_algorithm = config.default_key_algorithm.to_ascii_lowercase();
    if !registry.is_registered(&default_key_algorithm) {
        tracing::warn!(
            algorithm = %default_key_algorithm,
            "Default key algorithm has no registered handler"
        );
    }

    tracing::info!(
        fips = config.fips_mode,
        algorithms = ?registry.algorithms(),
        "Crypto provider registered"
    );

    Ok(Provider {
        default_key_algorithm,
        fips: config.fips_mode,
    })
}
