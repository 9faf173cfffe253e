//! Native key objects.
//!
//! Private keys wrap aws-lc-rs key pairs and keep their PKCS#8 encoding so
//! they can be compared, cloned cheaply and re-exported. Public keys are
//! held as DER `SubjectPublicKeyInfo`.
//!
//! ## Supported families
//!
//! - RSA (PKCS#8)
//! - EC on P-256, P-384 and P-521 (PKCS#8)
//! - AES secret keys (raw 128, 192 or 256 bit)

use std::fmt;
use std::sync::Arc;

use aws_lc_rs::constant_time;
use aws_lc_rs::encoding::AsDer;
use aws_lc_rs::signature::{
    EcdsaKeyPair, EcdsaSigningAlgorithm, KeyPair, RsaKeyPair, ECDSA_P256_SHA256_ASN1_SIGNING,
    ECDSA_P384_SHA384_ASN1_SIGNING, ECDSA_P521_SHA512_ASN1_SIGNING,
};
use base64::Engine;
use x509_parser::prelude::FromDer;
use x509_parser::public_key::PublicKey as ParsedPublicKey;
use x509_parser::x509::SubjectPublicKeyInfo;

use crate::error::{CryptoError, CryptoResult};

/// Key family shared by the two halves of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    /// RSA.
    Rsa,
    /// Elliptic curve.
    Ec,
    /// AES secret key.
    Aes,
    /// A public key family this crate cannot build private keys for.
    Other,
}

impl KeyFamily {
    /// Returns the provider's canonical algorithm name.
    #[must_use]
    pub const fn algorithm_name(self) -> &'static str {
        match self {
            Self::Rsa => "RSA",
            Self::Ec => "EC",
            Self::Aes => "AES",
            Self::Other => "UNKNOWN",
        }
    }
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.algorithm_name())
    }
}

/// A private (or secret) key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivateKey {
    /// RSA private key.
    Rsa(RsaPrivateKey),
    /// ECDSA private key.
    Ec(EcPrivateKey),
    /// Symmetric secret key.
    Secret(SecretKey),
}

impl PrivateKey {
    /// Returns the algorithm name: `"RSA"`, `"EC"` or `"AES"`.
    #[must_use]
    pub const fn algorithm(&self) -> &'static str {
        self.family().algorithm_name()
    }

    /// Returns the key family.
    #[must_use]
    pub const fn family(&self) -> KeyFamily {
        match self {
            Self::Rsa(_) => KeyFamily::Rsa,
            Self::Ec(_) => KeyFamily::Ec,
            Self::Secret(_) => KeyFamily::Aes,
        }
    }

    /// Returns the matching public key, if the key is asymmetric.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot encode the public key.
    pub fn public_key(&self) -> CryptoResult<Option<PublicKey>> {
        match self {
            Self::Rsa(key) => key.public_key().map(Some),
            Self::Ec(key) => key.public_key().map(Some),
            Self::Secret(_) => Ok(None),
        }
    }

    /// Returns the encoded key: PKCS#8 for asymmetric keys, raw bytes for
    /// secret keys.
    #[must_use]
    pub fn encoded(&self) -> &[u8] {
        match self {
            Self::Rsa(key) => key.as_pkcs8(),
            Self::Ec(key) => key.as_pkcs8(),
            Self::Secret(key) => key.as_bytes(),
        }
    }
}

/// RSA private key.
#[derive(Clone)]
pub struct RsaPrivateKey {
    pkcs8: Arc<[u8]>,
    key_pair: Arc<RsaKeyPair>,
}

impl RsaPrivateKey {
    /// Creates an RSA key from PKCS#8 DER.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedKey`] if aws-lc rejects the key.
    pub fn from_pkcs8(pkcs8_der: &[u8]) -> CryptoResult<Self> {
        let key_pair = RsaKeyPair::from_pkcs8(pkcs8_der)
            .map_err(|e| CryptoError::malformed_key("RSA", e))?;

        Ok(Self {
            pkcs8: Arc::from(pkcs8_der),
            key_pair: Arc::new(key_pair),
        })
    }

    /// Returns the PKCS#8 encoding.
    #[must_use]
    pub fn as_pkcs8(&self) -> &[u8] {
        &self.pkcs8
    }

    /// Returns the modulus size in bits.
    #[must_use]
    pub fn modulus_bits(&self) -> usize {
        self.key_pair.public_modulus_len() * 8
    }

    /// Returns the big-endian public modulus without leading zeros.
    #[must_use]
    pub fn public_modulus(&self) -> Vec<u8> {
        self.key_pair
            .public_key()
            .modulus()
            .big_endian_without_leading_zero()
            .to_vec()
    }

    /// Returns the big-endian public exponent without leading zeros.
    #[must_use]
    pub fn public_exponent(&self) -> Vec<u8> {
        self.key_pair
            .public_key()
            .exponent()
            .big_endian_without_leading_zero()
            .to_vec()
    }

    /// Synthesizes the matching public key from the modulus and exponent.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot encode the public key.
    pub fn public_key(&self) -> CryptoResult<PublicKey> {
        let der = self
            .key_pair
            .public_key()
            .as_der()
            .map_err(|_| CryptoError::malformed_key("RSA", "cannot encode public key"))?;
        let spki: &[u8] = der.as_ref();
        PublicKey::from_spki_der(spki)
    }
}

impl PartialEq for RsaPrivateKey {
    fn eq(&self, other: &Self) -> bool {
        constant_time::verify_slices_are_equal(&self.pkcs8, &other.pkcs8).is_ok()
    }
}

impl Eq for RsaPrivateKey {}

impl fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPrivateKey")
            .field("bits", &self.modulus_bits())
            .field("key", &"<KEY>")
            .finish()
    }
}

/// Named curves accepted for EC keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcCurve {
    /// NIST P-256.
    P256,
    /// NIST P-384.
    P384,
    /// NIST P-521.
    P521,
}

impl EcCurve {
    const ALL: [Self; 3] = [Self::P256, Self::P384, Self::P521];

    fn signing_algorithm(self) -> &'static EcdsaSigningAlgorithm {
        match self {
            Self::P256 => &ECDSA_P256_SHA256_ASN1_SIGNING,
            Self::P384 => &ECDSA_P384_SHA384_ASN1_SIGNING,
            Self::P521 => &ECDSA_P521_SHA512_ASN1_SIGNING,
        }
    }

    /// Returns the JOSE-style curve name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }
}

/// ECDSA private key.
#[derive(Clone)]
pub struct EcPrivateKey {
    pkcs8: Arc<[u8]>,
    curve: EcCurve,
    key_pair: Arc<EcdsaKeyPair>,
}

impl EcPrivateKey {
    /// Creates an EC key from PKCS#8 DER, detecting the curve.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedKey`] if no supported curve accepts
    /// the key.
    pub fn from_pkcs8(pkcs8_der: &[u8]) -> CryptoResult<Self> {
        let mut last_error = None;
        for curve in EcCurve::ALL {
            match EcdsaKeyPair::from_pkcs8(curve.signing_algorithm(), pkcs8_der) {
                Ok(key_pair) => {
                    return Ok(Self {
                        pkcs8: Arc::from(pkcs8_der),
                        curve,
                        key_pair: Arc::new(key_pair),
                    });
                }
                Err(e) => last_error = Some(e.to_string()),
            }
        }
        Err(CryptoError::malformed_key(
            "EC",
            last_error.unwrap_or_else(|| "no curve accepted the key".to_string()),
        ))
    }

    /// Returns the PKCS#8 encoding.
    #[must_use]
    pub fn as_pkcs8(&self) -> &[u8] {
        &self.pkcs8
    }

    /// Returns the curve.
    #[must_use]
    pub const fn curve(&self) -> EcCurve {
        self.curve
    }

    /// Returns the matching public key.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot encode the public key.
    pub fn public_key(&self) -> CryptoResult<PublicKey> {
        let der = self
            .key_pair
            .public_key()
            .as_der()
            .map_err(|_| CryptoError::malformed_key("EC", "cannot encode public key"))?;
        let spki: &[u8] = der.as_ref();
        PublicKey::from_spki_der(spki)
    }
}

impl PartialEq for EcPrivateKey {
    fn eq(&self, other: &Self) -> bool {
        constant_time::verify_slices_are_equal(&self.pkcs8, &other.pkcs8).is_ok()
    }
}

impl Eq for EcPrivateKey {}

impl fmt::Debug for EcPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcPrivateKey")
            .field("curve", &self.curve)
            .field("key", &"<KEY>")
            .finish()
    }
}

/// Symmetric secret key.
#[derive(Clone)]
pub struct SecretKey {
    bytes: Arc<[u8]>,
}

impl SecretKey {
    /// Creates an AES key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedKey`] unless the key is 16, 24 or 32
    /// bytes long.
    pub fn aes(bytes: &[u8]) -> CryptoResult<Self> {
        if !matches!(bytes.len(), 16 | 24 | 32) {
            return Err(CryptoError::malformed_key(
                "AES",
                format!("invalid key length {} bytes", bytes.len()),
            ));
        }
        Ok(Self {
            bytes: Arc::from(bytes),
        })
    }

    /// Returns the algorithm name, always `"AES"`.
    #[must_use]
    pub const fn algorithm(&self) -> &'static str {
        "AES"
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the key size in bits.
    #[must_use]
    pub fn bits(&self) -> usize {
        self.bytes.len() * 8
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        constant_time::verify_slices_are_equal(&self.bytes, &other.bytes).is_ok()
    }
}

impl Eq for SecretKey {}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("bits", &self.bits())
            .field("key", &"<KEY>")
            .finish()
    }
}

/// Public key in DER `SubjectPublicKeyInfo` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    family: KeyFamily,
    spki: Vec<u8>,
}

impl PublicKey {
    /// Parses a DER `SubjectPublicKeyInfo`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedKey`] if the structure does not parse.
    pub fn from_spki_der(der: &[u8]) -> CryptoResult<Self> {
        let (_, spki) = SubjectPublicKeyInfo::from_der(der)
            .map_err(|e| CryptoError::malformed_key("public", e))?;
        Ok(Self {
            family: family_of(&spki),
            spki: der.to_vec(),
        })
    }

    /// Returns the algorithm name.
    #[must_use]
    pub const fn algorithm(&self) -> &'static str {
        self.family.algorithm_name()
    }

    /// Returns the key family.
    #[must_use]
    pub const fn family(&self) -> KeyFamily {
        self.family
    }

    /// Returns the DER `SubjectPublicKeyInfo`.
    #[must_use]
    pub fn as_der(&self) -> &[u8] {
        &self.spki
    }

    /// Returns the RSA modulus and exponent, without leading zeros.
    #[must_use]
    pub fn rsa_components(&self) -> Option<(Vec<u8>, Vec<u8>)> {
        let (_, spki) = SubjectPublicKeyInfo::from_der(&self.spki).ok()?;
        match spki.parsed().ok()? {
            ParsedPublicKey::RSA(rsa) => Some((
                strip_leading_zeros(rsa.modulus).to_vec(),
                strip_leading_zeros(rsa.exponent).to_vec(),
            )),
            _ => None,
        }
    }

    /// Returns a short identifier derived from the key's SHA-256 digest.
    #[must_use]
    pub fn key_id(&self) -> String {
        let hash = crate::hash::sha256(&self.spki);
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&hash[..8])
    }
}

fn family_of(spki: &SubjectPublicKeyInfo<'_>) -> KeyFamily {
    match spki.parsed() {
        Ok(ParsedPublicKey::RSA(_)) => KeyFamily::Rsa,
        Ok(ParsedPublicKey::EC(_)) => KeyFamily::Ec,
        _ => KeyFamily::Other,
    }
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}
