//! Key and certificate factories backed by aws-lc-rs and x509-parser.
//!
//! These are the provider's generic entry points: the algorithm registry
//! routes to them for its built-in families and falls back to
//! [`key_factory`] for names nobody registered.

use crate::certificate::Certificate;
use crate::error::{CryptoError, CryptoResult};
use crate::keys::{EcPrivateKey, KeyFamily, PrivateKey, RsaPrivateKey, SecretKey};

/// Builds a private key from encoded bytes for a provider algorithm name.
///
/// Names are matched case-insensitively. The provider understands `rsa`,
/// `ec` (alias `ecdsa`) and `aes`; asymmetric keys are PKCS#8, AES keys are
/// raw.
///
/// # Errors
///
/// Returns [`CryptoError::UnsupportedAlgorithm`] for other names and
/// [`CryptoError::MalformedKey`] when the bytes are rejected.
pub fn key_factory(algorithm: &str, encoded: &[u8]) -> CryptoResult<PrivateKey> {
    match algorithm.to_ascii_lowercase().as_str() {
        "rsa" => rsa_key(encoded),
        "ec" | "ecdsa" => ec_key(encoded),
        "aes" => aes_key(encoded),
        _ => Err(CryptoError::UnsupportedAlgorithm(algorithm.to_string())),
    }
}

/// Builds an RSA private key from PKCS#8 DER.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedKey`] if the bytes are rejected.
pub fn rsa_key(pkcs8_der: &[u8]) -> CryptoResult<PrivateKey> {
    RsaPrivateKey::from_pkcs8(pkcs8_der).map(PrivateKey::Rsa)
}

/// Builds an EC private key from PKCS#8 DER.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedKey`] if the bytes are rejected.
pub fn ec_key(pkcs8_der: &[u8]) -> CryptoResult<PrivateKey> {
    EcPrivateKey::from_pkcs8(pkcs8_der).map(PrivateKey::Ec)
}

/// Builds an AES secret key from raw bytes.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedKey`] for an invalid key length.
pub fn aes_key(raw: &[u8]) -> CryptoResult<PrivateKey> {
    SecretKey::aes(raw).map(PrivateKey::Secret)
}

/// Builds a private key of a known family from PKCS#8 DER.
///
/// With no family hint, RSA is tried before EC.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedKey`] if no candidate family accepts the
/// bytes, or [`CryptoError::UnsupportedAlgorithm`] for a family without a
/// PKCS#8 form.
pub fn pkcs8_key(family: Option<KeyFamily>, pkcs8_der: &[u8]) -> CryptoResult<PrivateKey> {
    match family {
        Some(KeyFamily::Rsa) => rsa_key(pkcs8_der),
        Some(KeyFamily::Ec) => ec_key(pkcs8_der),
        Some(other) => Err(CryptoError::UnsupportedAlgorithm(other.to_string())),
        None => rsa_key(pkcs8_der).or_else(|_| ec_key(pkcs8_der)),
    }
}

/// Parses a DER X.509 certificate.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedCertificate`] if the bytes do not parse.
pub fn certificate_factory(der: &[u8]) -> CryptoResult<Certificate> {
    Certificate::from_der(der)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSA_PKCS8: &[u8] = include_bytes!("../../../tests/fixtures/sp.key.der");
    const EC_PKCS8: &[u8] = include_bytes!("../../../tests/fixtures/ec.key.der");

    #[test]
    fn key_factory_is_case_insensitive() {
        assert_eq!(key_factory("RSA", RSA_PKCS8).unwrap().algorithm(), "RSA");
        assert_eq!(key_factory("EcDsA", EC_PKCS8).unwrap().algorithm(), "EC");
    }

    #[test]
    fn unknown_names_are_unsupported() {
        assert_eq!(
            key_factory("dsa", RSA_PKCS8).unwrap_err(),
            CryptoError::UnsupportedAlgorithm("dsa".to_string())
        );
    }

    #[test]
    fn pkcs8_without_hint_tries_both_families() {
        assert_eq!(pkcs8_key(None, RSA_PKCS8).unwrap().family(), KeyFamily::Rsa);
        assert_eq!(pkcs8_key(None, EC_PKCS8).unwrap().family(), KeyFamily::Ec);
        assert!(pkcs8_key(None, b"junk").is_err());
    }
}
