//! Private key and certificate coercion.

use base64::Engine;
use samlkit_crypto::{to_certificate, to_private_key, CryptoError, KeyMaterial, KeystoreDescriptor};

use crate::common::{
    self, KeystoreFixture, EC_KEY, IDP_CERT, IDP_KEY, KEYSTORE_PASSWORD, SP_CERT, SP_KEY,
};

fn base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[test]
fn pkcs8_rsa_bytes_give_rsa_key() -> anyhow::Result<()> {
    common::init_tracing();

    let key = to_private_key(Some(&KeyMaterial::from(SP_KEY)), "rsa")?
        .ok_or_else(|| anyhow::anyhow!("no key"))?;
    assert_eq!(key.algorithm(), "RSA");
    assert_eq!(key.encoded(), SP_KEY);
    Ok(())
}

#[test]
fn fixture_keys_pair_with_their_certificates() -> anyhow::Result<()> {
    for (key, cert) in [(SP_KEY, SP_CERT), (IDP_KEY, IDP_CERT)] {
        let key = to_private_key(Some(&KeyMaterial::from(key)), "RSA")?
            .ok_or_else(|| anyhow::anyhow!("no key"))?;
        let public = key.public_key()?.ok_or_else(|| anyhow::anyhow!("no public half"))?;
        let cert = to_certificate(Some(&KeyMaterial::from(cert)))?
            .ok_or_else(|| anyhow::anyhow!("no certificate"))?;
        assert_eq!(public.rsa_components(), cert.public_key().rsa_components());
    }
    Ok(())
}

#[test]
fn base64_key_matches_bytes() -> anyhow::Result<()> {
    let from_text = to_private_key(Some(&KeyMaterial::from(base64(SP_KEY))), "rsa")?;
    let from_bytes = to_private_key(Some(&KeyMaterial::from(SP_KEY)), "rsa")?;
    assert_eq!(from_text, from_bytes);
    Ok(())
}

#[test]
fn ec_key_through_ec_handler() -> anyhow::Result<()> {
    let key = to_private_key(Some(&KeyMaterial::from(EC_KEY)), "EC")?
        .ok_or_else(|| anyhow::anyhow!("no key"))?;
    assert_eq!(key.algorithm(), "EC");

    let err = to_private_key(Some(&KeyMaterial::from(EC_KEY)), "rsa").unwrap_err();
    assert!(matches!(err, CryptoError::MalformedKey { .. }));
    Ok(())
}

#[test]
fn unknown_algorithm_is_rejected() {
    let err = to_private_key(Some(&KeyMaterial::from(SP_KEY)), "dsa").unwrap_err();
    assert_eq!(err, CryptoError::UnsupportedAlgorithm("dsa".to_string()));
}

#[test]
fn base64_certificate_matches_bytes() -> anyhow::Result<()> {
    let from_text = to_certificate(Some(&KeyMaterial::from(base64(SP_CERT))))?;
    let from_bytes = to_certificate(Some(&KeyMaterial::from(SP_CERT)))?;
    assert!(from_text.is_some());
    assert_eq!(from_text, from_bytes);
    Ok(())
}

#[test]
fn pem_certificate_matches_bytes() -> anyhow::Result<()> {
    let pem = samlkit_crypto::encoding::to_pem(SP_CERT, "CERTIFICATE");
    let from_pem = to_certificate(Some(&KeyMaterial::from(pem)))?;
    assert_eq!(from_pem, to_certificate(Some(&KeyMaterial::from(SP_CERT)))?);
    Ok(())
}

#[test]
fn keystore_private_key() -> anyhow::Result<()> {
    let fixture = KeystoreFixture::new()?;
    let descriptor = KeystoreDescriptor::from_file(&fixture.path).with_password(KEYSTORE_PASSWORD);

    let sp = KeyMaterial::from(descriptor.clone().with_alias("sp"));
    let key = to_private_key(Some(&sp), "rsa")?.ok_or_else(|| anyhow::anyhow!("no key"))?;
    assert_eq!(key.encoded(), SP_KEY);

    let idp = KeyMaterial::from(descriptor.clone().with_alias("idp"));
    assert_eq!(
        to_private_key(Some(&idp), "rsa").unwrap_err(),
        CryptoError::WrongEntryType {
            alias: "idp".to_string()
        }
    );

    let missing = KeyMaterial::from(descriptor.with_alias("missing"));
    assert!(to_private_key(Some(&missing), "rsa")?.is_none());
    Ok(())
}

#[test]
fn certificate_is_not_a_private_key() -> anyhow::Result<()> {
    let cert = to_certificate(Some(&KeyMaterial::from(SP_CERT)))?
        .ok_or_else(|| anyhow::anyhow!("no certificate"))?;
    let err = to_private_key(Some(&KeyMaterial::from(cert)), "rsa").unwrap_err();
    assert!(matches!(err, CryptoError::UnsupportedCoercionInput { .. }));
    Ok(())
}
