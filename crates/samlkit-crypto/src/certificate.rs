//! X.509 certificates.

use chrono::{DateTime, Utc};
use x509_parser::prelude::*;

use crate::encoding;
use crate::error::{CryptoError, CryptoResult};
use crate::hash;
use crate::keys::{KeyFamily, PublicKey};

/// Parsed, immutable X.509 certificate.
///
/// Equality is equality of the DER encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Certificate {
    der: Vec<u8>,
    subject: String,
    issuer: String,
    serial: String,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    public_key: PublicKey,
}

impl Certificate {
    /// Parses a DER-encoded certificate.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedCertificate`] if the bytes are not a
    /// single DER certificate.
    pub fn from_der(der: &[u8]) -> CryptoResult<Self> {
        let (rest, cert) = X509Certificate::from_der(der)
            .map_err(|e| CryptoError::MalformedCertificate(e.to_string()))?;
        if !rest.is_empty() {
            return Err(CryptoError::MalformedCertificate(format!(
                "{} trailing bytes after certificate",
                rest.len()
            )));
        }

        let spki = cert.public_key();
        let public_key = PublicKey::from_spki_der(spki.raw)
            .map_err(|e| CryptoError::MalformedCertificate(e.to_string()))?;

        let validity = cert.validity();
        Ok(Self {
            der: der.to_vec(),
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            serial: cert.raw_serial_as_string(),
            not_before: timestamp(validity.not_before.timestamp())?,
            not_after: timestamp(validity.not_after.timestamp())?,
            public_key,
        })
    }

    /// Returns the DER encoding.
    #[must_use]
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    /// Returns the subject distinguished name.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the issuer distinguished name.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the serial number as colon-separated hex.
    #[must_use]
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Returns the start of the validity period.
    #[must_use]
    pub const fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    /// Returns the end of the validity period.
    #[must_use]
    pub const fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// Returns true if `now` lies within the validity period.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.not_before <= now && now <= self.not_after
    }

    /// Returns the subject public key.
    #[must_use]
    pub const fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Returns the family of the subject public key.
    #[must_use]
    pub const fn key_family(&self) -> KeyFamily {
        self.public_key.family()
    }

    /// Returns the certificate as single-line base64, the form embedded in
    /// `ds:X509Certificate` elements.
    #[must_use]
    pub fn to_base64(&self) -> String {
        encoding::encode_base64(&self.der)
    }

    /// Returns the certificate as PEM.
    #[must_use]
    pub fn to_pem(&self) -> String {
        encoding::to_pem(&self.der, "CERTIFICATE")
    }

    /// Returns the SHA-256 fingerprint as colon-separated hex.
    #[must_use]
    pub fn sha256_fingerprint(&self) -> String {
        hash::fingerprint(&hash::sha256(&self.der))
    }
}

fn timestamp(secs: i64) -> CryptoResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| CryptoError::MalformedCertificate(format!("timestamp out of range: {secs}")))
}
