//! Coercion of heterogeneous key material into canonical objects.
//!
//! Every entry point takes `Option<&KeyMaterial>`: `None` in gives `Ok(None)`
//! out, and a canonical input comes back unchanged. Each operation accepts
//! a documented subset of [`KeyMaterial`] and rejects the rest with
//! [`CryptoError::UnsupportedCoercionInput`].

use std::sync::Arc;

use p12_keystore::KeyStore;

use crate::algorithm;
use crate::bootstrap;
use crate::certificate::Certificate;
use crate::credential::Credential;
use crate::encoding;
use crate::error::{CryptoError, CryptoResult};
use crate::keys::{PrivateKey, PublicKey, SecretKey};
use crate::keystore::{self, KeystoreDescriptor, KeystoreEntry};
use crate::provider;

const TARGET_PRIVATE_KEY: &str = "private key";
const TARGET_CERTIFICATE: &str = "certificate";
const TARGET_CREDENTIAL: &str = "credential";

/// Key material in any of the shapes callers hand over.
#[derive(Debug, Clone)]
pub enum KeyMaterial {
    /// Raw DER or raw key bytes.
    Bytes(Vec<u8>),
    /// Base64 text, optionally PEM armored.
    Base64(String),
    /// Native private or secret key.
    PrivateKey(PrivateKey),
    /// Native public key.
    PublicKey(PublicKey),
    /// Native symmetric key.
    SecretKey(SecretKey),
    /// Native certificate.
    Certificate(Certificate),
    /// Existing credential.
    Credential(Credential),
    /// Keystore handle or file plus alias and password.
    Keystore(KeystoreDescriptor),
    /// Two-element pair: (tag, key) for key coercion, (public, private)
    /// for credential coercion.
    Pair(Box<KeyMaterial>, Box<KeyMaterial>),
}

impl KeyMaterial {
    /// Builds a pair variant.
    #[must_use]
    pub fn pair(first: impl Into<Self>, second: impl Into<Self>) -> Self {
        Self::Pair(Box::new(first.into()), Box::new(second.into()))
    }

    /// Returns a short name of the variant for diagnostics.
    #[must_use]
    pub const fn variant_name(&self) -> &'static str {
        match self {
            Self::Bytes(_) => "bytes",
            Self::Base64(_) => "base64 text",
            Self::PrivateKey(_) => "private key",
            Self::PublicKey(_) => "public key",
            Self::SecretKey(_) => "secret key",
            Self::Certificate(_) => "certificate",
            Self::Credential(_) => "credential",
            Self::Keystore(_) => "keystore descriptor",
            Self::Pair(..) => "pair",
        }
    }
}

impl From<Vec<u8>> for KeyMaterial {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for KeyMaterial {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<String> for KeyMaterial {
    fn from(text: String) -> Self {
        Self::Base64(text)
    }
}

impl From<&str> for KeyMaterial {
    fn from(text: &str) -> Self {
        Self::Base64(text.to_string())
    }
}

impl From<PrivateKey> for KeyMaterial {
    fn from(key: PrivateKey) -> Self {
        Self::PrivateKey(key)
    }
}

impl From<PublicKey> for KeyMaterial {
    fn from(key: PublicKey) -> Self {
        Self::PublicKey(key)
    }
}

impl From<SecretKey> for KeyMaterial {
    fn from(key: SecretKey) -> Self {
        Self::SecretKey(key)
    }
}

impl From<Certificate> for KeyMaterial {
    fn from(cert: Certificate) -> Self {
        Self::Certificate(cert)
    }
}

impl From<Credential> for KeyMaterial {
    fn from(credential: Credential) -> Self {
        Self::Credential(credential)
    }
}

impl From<KeystoreDescriptor> for KeyMaterial {
    fn from(descriptor: KeystoreDescriptor) -> Self {
        Self::Keystore(descriptor)
    }
}

impl From<Arc<KeyStore>> for KeyMaterial {
    fn from(keystore: Arc<KeyStore>) -> Self {
        Self::Keystore(KeystoreDescriptor::from_keystore(keystore))
    }
}

/// Coerces key material to a private key.
///
/// | Input | Result |
/// |---|---|
/// | base64 text | decoded, then as bytes |
/// | bytes | built by the `algorithm` handler |
/// | private key | unchanged |
/// | secret key | wrapped as [`PrivateKey::Secret`] |
/// | credential | its private key (`algorithm` ignored) |
/// | keystore descriptor | the private key under its alias |
/// | pair | the second component, recursively |
///
/// # Errors
///
/// Returns [`CryptoError::UnsupportedCoercionInput`] for public keys and
/// certificates, [`CryptoError::WrongEntryType`] for a certificate-only
/// keystore entry, and the decoding or algorithm errors of the chosen path.
pub fn to_private_key(
    input: Option<&KeyMaterial>,
    algorithm: &str,
) -> CryptoResult<Option<PrivateKey>> {
    bootstrap::ensure_initialized()?;
    let Some(input) = input else {
        return Ok(None);
    };

    match input {
        KeyMaterial::Base64(text) => {
            let bytes = encoding::decode_base64(text)?;
            algorithm::key_from_bytes(&bytes, algorithm).map(Some)
        }
        KeyMaterial::Bytes(bytes) => algorithm::key_from_bytes(bytes, algorithm).map(Some),
        KeyMaterial::PrivateKey(key) => Ok(Some(key.clone())),
        KeyMaterial::SecretKey(key) => Ok(Some(PrivateKey::Secret(key.clone()))),
        KeyMaterial::Credential(credential) => Ok(credential
            .private_key()
            .cloned()
            .or_else(|| credential.secret_key().cloned().map(PrivateKey::Secret))),
        KeyMaterial::Keystore(descriptor) => keystore::load_private_key(descriptor),
        KeyMaterial::Pair(_, key) => to_private_key(Some(key.as_ref()), algorithm),
        KeyMaterial::PublicKey(_) | KeyMaterial::Certificate(_) => {
            Err(unsupported(TARGET_PRIVATE_KEY, input))
        }
    }
}

/// Coerces key material to a certificate.
///
/// Accepts base64 text, DER bytes, certificates (unchanged) and credentials
/// (their certificate, or `None` if they carry a bare key).
///
/// # Errors
///
/// Returns [`CryptoError::MalformedCertificate`] for bytes that do not
/// parse and [`CryptoError::UnsupportedCoercionInput`] for other variants.
pub fn to_certificate(input: Option<&KeyMaterial>) -> CryptoResult<Option<Certificate>> {
    bootstrap::ensure_initialized()?;
    let Some(input) = input else {
        return Ok(None);
    };

    match input {
        KeyMaterial::Base64(text) => {
            let der = encoding::decode_base64(text)?;
            provider::certificate_factory(&der).map(Some)
        }
        KeyMaterial::Bytes(der) => provider::certificate_factory(der).map(Some),
        KeyMaterial::Certificate(cert) => Ok(Some(cert.clone())),
        KeyMaterial::Credential(credential) => Ok(credential.certificate().cloned()),
        _ => Err(unsupported(TARGET_CERTIFICATE, input)),
    }
}

/// Coerces a public half and an optional private half to a credential.
///
/// Resolution order for `public`:
///
/// 1. `None` gives `None`.
/// 2. An existing credential is returned unchanged, or with its private
///    key replaced by an explicitly supplied one.
/// 3. A keystore descriptor without `private` yields the entry's
///    certificate and key; a missing alias or password, or an unknown
///    alias, gives `None`.
/// 4. A keystore descriptor with `private` pairs the entry's certificate
///    with the explicitly supplied key. A key entry without a chain
///    contributes the public half of its stored key instead.
/// 5. A pair is split into (public, private) and resolved again.
/// 6. A public key gives a key-only credential.
/// 7. A secret key gives a symmetric credential.
/// 8. An asymmetric private key supplies its own public half.
/// 9. Anything else goes through [`to_certificate`], and `private` through
///    [`to_private_key`].
///
/// # Errors
///
/// Returns [`CryptoError::KeyMismatch`] if the halves belong to different
/// key families, plus any error of the nested coercions.
pub fn to_credential(
    public: Option<&KeyMaterial>,
    private: Option<&KeyMaterial>,
) -> CryptoResult<Option<Credential>> {
    bootstrap::ensure_initialized()?;
    let Some(public) = public else {
        return Ok(None);
    };

    match public {
        KeyMaterial::Credential(credential) => match explicit_private_key(private)? {
            Some(key) => credential.clone().with_private_key(key).map(Some),
            None => Ok(Some(credential.clone())),
        },
        KeyMaterial::Keystore(descriptor) if private.is_none() => keystore_credential(descriptor),
        KeyMaterial::Keystore(descriptor) => {
            let Some(entry) = keystore::load_entry(descriptor)? else {
                return Ok(None);
            };
            let key = explicit_private_key(private)?;
            match entry {
                KeystoreEntry::Certificate(certificate)
                | KeystoreEntry::PrivateKey {
                    certificate: Some(certificate),
                    ..
                } => Credential::x509(certificate, key).map(Some),
                KeystoreEntry::PrivateKey {
                    key: stored,
                    certificate: None,
                } => match stored.public_key()? {
                    Some(public_key) => Credential::basic(public_key, key).map(Some),
                    None => Err(keystore::wrong_entry_type(descriptor)),
                },
            }
        }
        KeyMaterial::Pair(first, second) => {
            if private.is_some() {
                return Err(CryptoError::unsupported(
                    TARGET_CREDENTIAL,
                    "pair with a separate private key",
                ));
            }
            to_credential(Some(first.as_ref()), Some(second.as_ref()))
        }
        KeyMaterial::PublicKey(key) => {
            Credential::basic(key.clone(), explicit_private_key(private)?).map(Some)
        }
        KeyMaterial::SecretKey(key) | KeyMaterial::PrivateKey(PrivateKey::Secret(key)) => {
            symmetric_credential(key, private)
        }
        KeyMaterial::PrivateKey(key) => {
            let Some(public_key) = key.public_key()? else {
                return Err(unsupported(TARGET_CREDENTIAL, public));
            };
            let private_key = match explicit_private_key(private)? {
                Some(explicit) => explicit,
                None => key.clone(),
            };
            tracing::debug!(algorithm = key.algorithm(), "Synthesized public key for credential");
            Credential::basic(public_key, Some(private_key)).map(Some)
        }
        _ => {
            let Some(certificate) = to_certificate(Some(public))? else {
                return Ok(None);
            };
            Credential::x509(certificate, explicit_private_key(private)?).map(Some)
        }
    }
}

fn explicit_private_key(private: Option<&KeyMaterial>) -> CryptoResult<Option<PrivateKey>> {
    to_private_key(private, bootstrap::default_key_algorithm())
}

fn keystore_credential(descriptor: &KeystoreDescriptor) -> CryptoResult<Option<Credential>> {
    if descriptor.alias().is_none() || !descriptor.has_password() {
        tracing::debug!("Keystore credential needs both an alias and a password");
        return Ok(None);
    }

    match keystore::load_entry(descriptor)? {
        Some(KeystoreEntry::PrivateKey {
            key,
            certificate: Some(certificate),
        }) => Credential::x509(certificate, Some(key)).map(Some),
        Some(KeystoreEntry::PrivateKey {
            key,
            certificate: None,
        }) => match key.public_key()? {
            Some(public_key) => Credential::basic(public_key, Some(key)).map(Some),
            None => Err(keystore::wrong_entry_type(descriptor)),
        },
        Some(KeystoreEntry::Certificate(_)) => Err(keystore::wrong_entry_type(descriptor)),
        None => Ok(None),
    }
}

fn symmetric_credential(
    key: &SecretKey,
    private: Option<&KeyMaterial>,
) -> CryptoResult<Option<Credential>> {
    match explicit_private_key(private)? {
        Some(PrivateKey::Secret(other)) if &other == key => {
            Ok(Some(Credential::symmetric(key.clone())))
        }
        Some(other) => Err(CryptoError::KeyMismatch {
            public: key.algorithm().to_string(),
            private: other.algorithm().to_string(),
        }),
        None => Ok(Some(Credential::symmetric(key.clone()))),
    }
}

fn unsupported(target: &'static str, input: &KeyMaterial) -> CryptoError {
    tracing::debug!(coercion = target, input = input.variant_name(), "Unsupported coercion input");
    CryptoError::unsupported(target, input.variant_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyFamily;

    const SP_KEY: &[u8] = include_bytes!("../../../tests/fixtures/sp.key.der");
    const SP_CERT: &[u8] = include_bytes!("../../../tests/fixtures/sp.crt.der");
    const IDP_CERT: &[u8] = include_bytes!("../../../tests/fixtures/idp.crt.der");
    const EC_KEY: &[u8] = include_bytes!("../../../tests/fixtures/ec.key.der");

    fn rsa_key() -> PrivateKey {
        provider::rsa_key(SP_KEY).unwrap()
    }

    fn sp_cert() -> Certificate {
        Certificate::from_der(SP_CERT).unwrap()
    }

    #[test]
    fn absent_in_absent_out() {
        assert!(to_private_key(None, "rsa").unwrap().is_none());
        assert!(to_certificate(None).unwrap().is_none());
        assert!(to_credential(None, None).unwrap().is_none());
        assert!(to_credential(None, Some(&KeyMaterial::from(SP_KEY))).unwrap().is_none());
    }

    #[test]
    fn private_key_from_bytes_and_base64() {
        let from_bytes = to_private_key(Some(&SP_KEY.into()), "rsa").unwrap().unwrap();
        assert_eq!(from_bytes.algorithm(), "RSA");

        let text = encoding::encode_base64(SP_KEY);
        let from_text = to_private_key(Some(&text.as_str().into()), "rsa").unwrap().unwrap();
        assert_eq!(from_text, from_bytes);

        let pem = encoding::to_pem(SP_KEY, "PRIVATE KEY");
        let from_pem = to_private_key(Some(&pem.into()), "RSA").unwrap().unwrap();
        assert_eq!(from_pem, from_bytes);
    }

    #[test]
    fn private_key_identity_and_pair() {
        let key = rsa_key();
        let same = to_private_key(Some(&key.clone().into()), "ignored").unwrap();
        assert_eq!(same, Some(key.clone()));

        let pair = KeyMaterial::pair("signing", key.clone());
        assert_eq!(to_private_key(Some(&pair), "rsa").unwrap(), Some(key));
    }

    #[test]
    fn private_key_from_credential_ignores_algorithm() {
        let credential = Credential::x509(sp_cert(), Some(rsa_key())).unwrap();
        let key = to_private_key(Some(&credential.into()), "aes").unwrap();
        assert_eq!(key, Some(rsa_key()));

        let public_only = Credential::x509(sp_cert(), None).unwrap();
        assert!(to_private_key(Some(&public_only.into()), "rsa").unwrap().is_none());
    }

    #[test]
    fn private_key_rejects_public_material() {
        let err = to_private_key(Some(&sp_cert().into()), "rsa").unwrap_err();
        assert_eq!(err, CryptoError::unsupported("private key", "certificate"));

        let public = rsa_key().public_key().unwrap().unwrap();
        let err = to_private_key(Some(&public.into()), "rsa").unwrap_err();
        assert_eq!(err, CryptoError::unsupported("private key", "public key"));
    }

    #[test]
    fn private_key_unknown_algorithm() {
        let err = to_private_key(Some(&SP_KEY.into()), "rot13").unwrap_err();
        assert_eq!(err, CryptoError::UnsupportedAlgorithm("rot13".to_string()));
    }

    #[test]
    fn certificate_from_base64_equals_from_bytes() {
        let from_bytes = to_certificate(Some(&SP_CERT.into())).unwrap().unwrap();
        let text = encoding::encode_base64(SP_CERT);
        let from_text = to_certificate(Some(&text.into())).unwrap().unwrap();
        assert_eq!(from_bytes, from_text);
        assert_eq!(
            to_certificate(Some(&from_bytes.clone().into())).unwrap(),
            Some(from_bytes)
        );
    }

    #[test]
    fn certificate_rejects_garbage_and_keys() {
        assert!(matches!(
            to_certificate(Some(&KeyMaterial::Bytes(vec![1, 2, 3]))),
            Err(CryptoError::MalformedCertificate(_))
        ));
        assert!(matches!(
            to_certificate(Some(&rsa_key().into())),
            Err(CryptoError::UnsupportedCoercionInput { .. })
        ));
    }

    #[test]
    fn credential_from_certificate_has_no_private_key() {
        let credential = to_credential(Some(&SP_CERT.into()), None).unwrap().unwrap();
        assert!(!credential.has_private_key());
        assert_eq!(credential.certificate(), Some(&sp_cert()));
    }

    #[test]
    fn credential_from_certificate_and_key() {
        let credential = to_credential(Some(&SP_CERT.into()), Some(&SP_KEY.into()))
            .unwrap()
            .unwrap();
        assert_eq!(credential.private_key(), Some(&rsa_key()));
    }

    #[test]
    fn credential_from_pair() {
        let pair = KeyMaterial::pair(sp_cert(), rsa_key());
        let credential = to_credential(Some(&pair), None).unwrap().unwrap();
        assert!(credential.has_private_key());

        let err = to_credential(Some(&pair), Some(&SP_KEY.into())).unwrap_err();
        assert!(matches!(err, CryptoError::UnsupportedCoercionInput { .. }));
    }

    #[test]
    fn credential_from_rsa_private_key_synthesizes_public_half() {
        let key = rsa_key();
        let credential = to_credential(Some(&key.clone().into()), None).unwrap().unwrap();
        assert_eq!(credential.private_key(), Some(&key));
        assert_eq!(
            credential.public_key().and_then(PublicKey::rsa_components),
            sp_cert().public_key().rsa_components(),
            "synthesized key should match the certificate's key"
        );
    }

    #[test]
    fn credential_from_public_and_secret_keys() {
        let public = sp_cert().public_key().clone();
        let credential = to_credential(Some(&public.clone().into()), None).unwrap().unwrap();
        assert_eq!(credential, Credential::basic(public, None).unwrap());

        let secret = SecretKey::aes(&[3u8; 16]).unwrap();
        let credential = to_credential(Some(&secret.clone().into()), None).unwrap().unwrap();
        assert_eq!(credential.secret_key(), Some(&secret));
    }

    #[test]
    fn credential_is_identity() {
        let credential = Credential::x509(sp_cert(), Some(rsa_key())).unwrap();
        let same = to_credential(Some(&credential.clone().into()), None).unwrap();
        assert_eq!(same, Some(credential));
    }

    #[test]
    fn credential_takes_explicit_private_key() {
        let public_only = KeyMaterial::from(Credential::x509(sp_cert(), None).unwrap());
        let credential = to_credential(Some(&public_only), Some(&SP_KEY.into()))
            .unwrap()
            .unwrap();
        assert_eq!(credential.certificate(), Some(&sp_cert()));
        assert_eq!(credential.private_key(), Some(&rsa_key()));

        let ec = KeyMaterial::from(provider::ec_key(EC_KEY).unwrap());
        let err = to_credential(Some(&public_only), Some(&ec)).unwrap_err();
        assert!(matches!(err, CryptoError::KeyMismatch { .. }));
    }

    #[test]
    fn credential_family_mismatch() {
        let err = to_credential(Some(&SP_CERT.into()), Some(&KeyMaterial::pair("ec", EC_KEY)))
            .unwrap_err();
        // The pair's key is decoded with the default algorithm, RSA.
        assert!(matches!(err, CryptoError::MalformedKey { .. }));

        let ec = provider::ec_key(EC_KEY).unwrap();
        let err = to_credential(Some(&IDP_CERT.into()), Some(&ec.into())).unwrap_err();
        assert!(matches!(err, CryptoError::KeyMismatch { .. }));
    }

    #[test]
    fn credential_from_keystore_handle() {
        let mut store = KeyStore::new();
        store.add_entry(
            "sp",
            p12_keystore::KeyStoreEntry::PrivateKeyChain(p12_keystore::PrivateKeyChain::new(
                SP_KEY,
                b"sp",
                vec![p12_keystore::Certificate::from_der(SP_CERT).unwrap()],
            )),
        );
        let store = Arc::new(store);

        let descriptor = KeystoreDescriptor::from_keystore(Arc::clone(&store))
            .with_alias("sp")
            .with_password("123456");
        let credential = to_credential(Some(&descriptor.clone().into()), None)
            .unwrap()
            .unwrap();
        assert_eq!(credential.family(), KeyFamily::Rsa);
        assert!(credential.has_private_key());

        let no_password = KeystoreDescriptor::from_keystore(store).with_alias("sp");
        assert!(to_credential(Some(&no_password.into()), None).unwrap().is_none());

        let missing = descriptor.with_alias("missing");
        assert!(to_credential(Some(&missing.into()), None).unwrap().is_none());
    }

    #[test]
    fn chainless_keystore_entry_with_explicit_key() {
        let mut store = KeyStore::new();
        store.add_entry(
            "bare",
            p12_keystore::KeyStoreEntry::PrivateKeyChain(p12_keystore::PrivateKeyChain::new(
                SP_KEY,
                b"bare",
                Vec::<p12_keystore::Certificate>::new(),
            )),
        );
        let descriptor = KeystoreDescriptor::from_keystore(Arc::new(store))
            .with_alias("bare")
            .with_password("123456");

        let explicit = KeyMaterial::from(rsa_key());
        let credential = to_credential(Some(&descriptor.into()), Some(&explicit))
            .unwrap()
            .unwrap();
        assert!(credential.certificate().is_none());
        assert_eq!(credential.private_key(), Some(&rsa_key()));
        assert_eq!(credential.public_key(), rsa_key().public_key().unwrap().as_ref());
    }
}
