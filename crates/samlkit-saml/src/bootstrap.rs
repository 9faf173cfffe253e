//! One-time initialization of the XML toolkit.
//!
//! The toolkit owns the object registry and the serializer settings. It is
//! built on first use, after the crypto provider has been registered, and
//! lives for the rest of the process.

use std::sync::OnceLock;

use samlkit_core::Config;
use samlkit_crypto::CryptoError;

use crate::error::SamlResult;
use crate::marshal::ObjectRegistry;

/// Process-wide XML toolkit state.
#[derive(Debug)]
pub struct Toolkit {
    registry: ObjectRegistry,
    indent: usize,
}

impl Toolkit {
    /// Returns the marshaller registry.
    #[must_use]
    pub const fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    /// Returns the serializer indentation width.
    #[must_use]
    pub const fn indent(&self) -> usize {
        self.indent
    }
}

static TOOLKIT: OnceLock<Toolkit> = OnceLock::new();

/// Initializes the crypto provider and the XML toolkit with explicit
/// configuration.
///
/// The first successful call decides the configuration; later calls return
/// the toolkit it built.
///
/// # Errors
///
/// Returns a bootstrap error if the configuration is invalid or the crypto
/// provider could not be registered.
pub fn initialize(config: &Config) -> SamlResult<&'static Toolkit> {
    if let Some(toolkit) = TOOLKIT.get() {
        return Ok(toolkit);
    }

    config
        .validate()
        .map_err(|e| CryptoError::Bootstrap(e.to_string()))?;
    samlkit_crypto::bootstrap::initialize(&config.crypto)?;

    Ok(TOOLKIT.get_or_init(|| {
        let registry = ObjectRegistry::with_builtins();
        tracing::info!(indent = config.xml.indent, ?registry, "XML toolkit initialized");
        Toolkit {
            registry,
            indent: config.xml.indent,
        }
    }))
}

/// Initializes everything with default configuration unless already done.
///
/// Every coercion entry point calls this first.
///
/// # Errors
///
/// Returns the cached crypto bootstrap failure, if any.
pub fn ensure_initialized() -> SamlResult<&'static Toolkit> {
    match TOOLKIT.get() {
        Some(toolkit) => Ok(toolkit),
        None => initialize(&Config::default()),
    }
}

/// Returns the shared object registry, initializing on first use.
///
/// Hosts register custom marshallers through this.
///
/// # Errors
///
/// Returns the bootstrap failure, if any.
pub fn registry() -> SamlResult<&'static ObjectRegistry> {
    ensure_initialized().map(Toolkit::registry)
}
