//! Algorithm registry: algorithm name to key-construction function.
//!
//! The process-wide registry starts with handlers for `rsa`, `ec` and `aes`.
//! Hosts add families with [`register`]; a name without a handler falls
//! through to the provider's generic [`key_factory`](crate::provider::key_factory).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::error::{CryptoError, CryptoResult};
use crate::keys::PrivateKey;
use crate::provider;

/// Builds a key from encoded bytes.
pub type KeyHandler = Arc<dyn Fn(&[u8]) -> CryptoResult<PrivateKey> + Send + Sync>;

/// Registry of key-construction handlers keyed by lowercase algorithm name.
#[derive(Default)]
pub struct AlgorithmRegistry {
    handlers: RwLock<HashMap<String, KeyHandler>>,
}

impl AlgorithmRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in handlers.
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register("rsa", provider::rsa_key);
        registry.register("ec", provider::ec_key);
        registry.register("aes", provider::aes_key);
        registry
    }

    /// Registers (or replaces) the handler for an algorithm.
    pub fn register<F>(&self, algorithm: &str, handler: F)
    where
        F: Fn(&[u8]) -> CryptoResult<PrivateKey> + Send + Sync + 'static,
    {
        let name = algorithm.to_ascii_lowercase();
        tracing::debug!(algorithm = %name, "Registering key algorithm handler");
        self.handlers.write().insert(name, Arc::new(handler));
    }

    /// Removes the handler for an algorithm. Returns true if one existed.
    pub fn deregister(&self, algorithm: &str) -> bool {
        self.handlers
            .write()
            .remove(&algorithm.to_ascii_lowercase())
            .is_some()
    }

    /// Returns true if a handler is registered for the algorithm.
    #[must_use]
    pub fn is_registered(&self, algorithm: &str) -> bool {
        self.handlers
            .read()
            .contains_key(&algorithm.to_ascii_lowercase())
    }

    /// Lists registered algorithm names in sorted order.
    #[must_use]
    pub fn algorithms(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Builds a key from bytes using the handler for `algorithm`.
    ///
    /// Without a registered handler the provider's generic key factory is
    /// tried with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::UnsupportedAlgorithm`] if neither a handler
    /// nor the provider knows the algorithm, or the handler's error.
    pub fn key_from_bytes(&self, bytes: &[u8], algorithm: &str) -> CryptoResult<PrivateKey> {
        let name = algorithm.to_ascii_lowercase();
        // Clone the handler out so it runs without the lock held.
        let handler = self.handlers.read().get(&name).cloned();

        match handler {
            Some(handler) => handler(bytes),
            None => {
                tracing::debug!(algorithm = %name, "No handler registered, using provider key factory");
                provider::key_factory(&name, bytes).inspect_err(|e| {
                    if matches!(e, CryptoError::UnsupportedAlgorithm(_)) {
                        tracing::warn!(algorithm = %name, "Unsupported key algorithm");
                    }
                })
            }
        }
    }
}

impl fmt::Debug for AlgorithmRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmRegistry")
            .field("algorithms", &self.algorithms())
            .finish()
    }
}

/// Returns the process-wide registry, creating it on first use.
pub fn global() -> &'static AlgorithmRegistry {
    static REGISTRY: OnceLock<AlgorithmRegistry> = OnceLock::new();
    REGISTRY.get_or_init(AlgorithmRegistry::with_builtins)
}

/// Builds a key from bytes through the process-wide registry.
///
/// # Errors
///
/// See [`AlgorithmRegistry::key_from_bytes`].
pub fn key_from_bytes(bytes: &[u8], algorithm: &str) -> CryptoResult<PrivateKey> {
    global().key_from_bytes(bytes, algorithm)
}

/// Registers a handler in the process-wide registry.
pub fn register<F>(algorithm: &str, handler: F)
where
    F: Fn(&[u8]) -> CryptoResult<PrivateKey> + Send + Sync + 'static,
{
    global().register(algorithm, handler);
}
