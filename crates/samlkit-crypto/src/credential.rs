//! Credentials: a public certificate or key, optionally paired with its
//! private key, or a symmetric secret key.

use crate::certificate::Certificate;
use crate::error::{CryptoError, CryptoResult};
use crate::keys::{KeyFamily, PrivateKey, PublicKey, SecretKey};

/// Key material consumed by signing, verification and decryption.
///
/// Constructors reject a private key whose family differs from the public
/// half, so a credential never pairs, say, an EC key with an RSA
/// certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Certificate with an optional private key.
    X509 {
        /// The certificate carrying the public key.
        certificate: Certificate,
        /// The matching private key.
        private_key: Option<PrivateKey>,
    },
    /// Bare public key with an optional private key.
    Basic {
        /// The public key.
        public_key: PublicKey,
        /// The matching private key.
        private_key: Option<PrivateKey>,
    },
    /// Symmetric secret key.
    Symmetric {
        /// The secret key.
        secret_key: SecretKey,
    },
}

impl Credential {
    /// Creates a certificate-backed credential.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyMismatch`] if the private key's family
    /// differs from the certificate's.
    pub fn x509(certificate: Certificate, private_key: Option<PrivateKey>) -> CryptoResult<Self> {
        check_family(certificate.key_family(), private_key.as_ref())?;
        Ok(Self::X509 {
            certificate,
            private_key,
        })
    }

    /// Creates a credential from a bare public key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyMismatch`] if the private key's family
    /// differs from the public key's.
    pub fn basic(public_key: PublicKey, private_key: Option<PrivateKey>) -> CryptoResult<Self> {
        check_family(public_key.family(), private_key.as_ref())?;
        Ok(Self::Basic {
            public_key,
            private_key,
        })
    }

    /// Creates a symmetric credential.
    #[must_use]
    pub const fn symmetric(secret_key: SecretKey) -> Self {
        Self::Symmetric { secret_key }
    }

    /// Returns a copy with the private half replaced.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyMismatch`] for a family mismatch or when
    /// adding a private key to a symmetric credential.
    pub fn with_private_key(self, private_key: PrivateKey) -> CryptoResult<Self> {
        match self {
            Self::X509 { certificate, .. } => Self::x509(certificate, Some(private_key)),
            Self::Basic { public_key, .. } => Self::basic(public_key, Some(private_key)),
            Self::Symmetric { .. } => Err(CryptoError::KeyMismatch {
                public: KeyFamily::Aes.to_string(),
                private: private_key.algorithm().to_string(),
            }),
        }
    }

    /// Returns the certificate, if the credential has one.
    #[must_use]
    pub const fn certificate(&self) -> Option<&Certificate> {
        match self {
            Self::X509 { certificate, .. } => Some(certificate),
            _ => None,
        }
    }

    /// Returns the public key, from the certificate if there is one.
    #[must_use]
    pub const fn public_key(&self) -> Option<&PublicKey> {
        match self {
            Self::X509 { certificate, .. } => Some(certificate.public_key()),
            Self::Basic { public_key, .. } => Some(public_key),
            Self::Symmetric { .. } => None,
        }
    }

    /// Returns the private key, if any.
    #[must_use]
    pub const fn private_key(&self) -> Option<&PrivateKey> {
        match self {
            Self::X509 { private_key, .. } | Self::Basic { private_key, .. } => {
                private_key.as_ref()
            }
            Self::Symmetric { .. } => None,
        }
    }

    /// Returns the secret key of a symmetric credential.
    #[must_use]
    pub const fn secret_key(&self) -> Option<&SecretKey> {
        match self {
            Self::Symmetric { secret_key } => Some(secret_key),
            _ => None,
        }
    }

    /// Returns true if the credential can sign or decrypt.
    #[must_use]
    pub const fn has_private_key(&self) -> bool {
        self.private_key().is_some()
    }

    /// Returns the key family of the credential.
    #[must_use]
    pub const fn family(&self) -> KeyFamily {
        match self {
            Self::X509 { certificate, .. } => certificate.key_family(),
            Self::Basic { public_key, .. } => public_key.family(),
            Self::Symmetric { .. } => KeyFamily::Aes,
        }
    }
}

fn check_family(public: KeyFamily, private_key: Option<&PrivateKey>) -> CryptoResult<()> {
    match private_key {
        Some(key) if key.family() != public => Err(CryptoError::KeyMismatch {
            public: public.to_string(),
            private: key.algorithm().to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{EcPrivateKey, RsaPrivateKey};

    const SP_KEY: &[u8] = include_bytes!("../../../tests/fixtures/sp.key.der");
    const SP_CERT: &[u8] = include_bytes!("../../../tests/fixtures/sp.crt.der");
    const EC_KEY: &[u8] = include_bytes!("../../../tests/fixtures/ec.key.der");

    fn rsa() -> PrivateKey {
        PrivateKey::Rsa(RsaPrivateKey::from_pkcs8(SP_KEY).unwrap())
    }

    #[test]
    fn certificate_only() {
        let credential = Credential::x509(Certificate::from_der(SP_CERT).unwrap(), None).unwrap();
        assert!(!credential.has_private_key());
        assert_eq!(credential.family(), KeyFamily::Rsa);
        assert_eq!(credential.public_key().unwrap().algorithm(), "RSA");
    }

    #[test]
    fn certificate_with_key() {
        let credential =
            Credential::x509(Certificate::from_der(SP_CERT).unwrap(), Some(rsa())).unwrap();
        assert_eq!(credential.private_key(), Some(&rsa()));
    }

    #[test]
    fn family_mismatch_is_rejected() {
        let ec = PrivateKey::Ec(EcPrivateKey::from_pkcs8(EC_KEY).unwrap());
        let err = Credential::x509(Certificate::from_der(SP_CERT).unwrap(), Some(ec)).unwrap_err();
        assert_eq!(
            err,
            CryptoError::KeyMismatch {
                public: "RSA".to_string(),
                private: "EC".to_string()
            }
        );
    }

    #[test]
    fn symmetric_has_no_public_half() {
        let credential = Credential::symmetric(SecretKey::aes(&[9u8; 32]).unwrap());
        assert!(credential.public_key().is_none());
        assert!(credential.secret_key().is_some());
        assert!(credential.with_private_key(rsa()).is_err());
    }

    #[test]
    fn basic_from_synthesized_public_key() {
        let key = rsa();
        let public = key.public_key().unwrap().unwrap();
        let credential = Credential::basic(public.clone(), Some(key)).unwrap();
        assert_eq!(credential.public_key(), Some(&public));
        assert!(credential.certificate().is_none());
    }
}
