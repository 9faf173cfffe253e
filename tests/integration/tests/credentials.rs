//! Credential coercion.

use samlkit_crypto::{
    to_certificate, to_credential, to_private_key, CryptoError, KeyMaterial, KeystoreDescriptor,
};

use crate::common::{KeystoreFixture, EC_KEY, IDP_CERT, KEYSTORE_PASSWORD, SP_CERT, SP_KEY};

fn descriptor(fixture: &KeystoreFixture, alias: &str) -> KeyMaterial {
    KeystoreDescriptor::from_file(&fixture.path)
        .with_password(KEYSTORE_PASSWORD)
        .with_alias(alias)
        .into()
}

#[test]
fn keystore_credential_has_both_halves() -> anyhow::Result<()> {
    let fixture = KeystoreFixture::new()?;

    let credential = to_credential(Some(&descriptor(&fixture, "sp")), None)?
        .ok_or_else(|| anyhow::anyhow!("no credential"))?;
    assert!(credential.has_private_key());
    assert_eq!(credential.certificate().map(|c| c.as_der()), Some(SP_CERT));
    assert_eq!(credential.private_key().map(|k| k.encoded()), Some(SP_KEY));

    assert!(to_credential(Some(&descriptor(&fixture, "missing")), None)?.is_none());
    Ok(())
}

#[test]
fn keystore_without_password_is_absent() -> anyhow::Result<()> {
    let fixture = KeystoreFixture::new()?;
    let input = KeyMaterial::from(KeystoreDescriptor::from_file(&fixture.path).with_alias("sp"));
    assert!(to_credential(Some(&input), None)?.is_none());
    Ok(())
}

#[test]
fn explicit_private_key_wins_over_keystore() -> anyhow::Result<()> {
    let fixture = KeystoreFixture::new()?;
    let private = KeyMaterial::from(SP_KEY);

    let credential = to_credential(Some(&descriptor(&fixture, "idp")), Some(&private))?
        .ok_or_else(|| anyhow::anyhow!("no credential"))?;
    assert_eq!(credential.certificate().map(|c| c.as_der()), Some(IDP_CERT));
    assert_eq!(credential.private_key().map(|k| k.encoded()), Some(SP_KEY));

    assert!(to_credential(Some(&descriptor(&fixture, "missing")), Some(&private))?.is_none());
    Ok(())
}

#[test]
fn certificate_only_credential() -> anyhow::Result<()> {
    let credential = to_credential(Some(&KeyMaterial::from(SP_CERT)), None)?
        .ok_or_else(|| anyhow::anyhow!("no credential"))?;
    assert!(!credential.has_private_key());

    let with_key = to_credential(Some(&KeyMaterial::from(SP_CERT)), Some(&KeyMaterial::from(SP_KEY)))?
        .ok_or_else(|| anyhow::anyhow!("no credential"))?;
    let expected = to_private_key(Some(&KeyMaterial::from(SP_KEY)), "rsa")?;
    assert_eq!(with_key.private_key(), expected.as_ref());
    Ok(())
}

#[test]
fn pair_is_split_into_halves() -> anyhow::Result<()> {
    let pair = KeyMaterial::pair(SP_CERT, SP_KEY);
    let credential = to_credential(Some(&pair), None)?
        .ok_or_else(|| anyhow::anyhow!("no credential"))?;
    assert!(credential.has_private_key());
    assert_eq!(
        credential.certificate().cloned(),
        to_certificate(Some(&KeyMaterial::from(SP_CERT)))?
    );
    Ok(())
}

#[test]
fn private_key_supplies_public_half() -> anyhow::Result<()> {
    let key = to_private_key(Some(&KeyMaterial::from(SP_KEY)), "rsa")?
        .ok_or_else(|| anyhow::anyhow!("no key"))?;
    let credential = to_credential(Some(&KeyMaterial::from(key.clone())), None)?
        .ok_or_else(|| anyhow::anyhow!("no credential"))?;
    assert!(credential.public_key().is_some());
    assert_eq!(credential.private_key(), Some(&key));
    Ok(())
}

#[test]
fn mismatched_families_are_rejected() -> anyhow::Result<()> {
    let ec = to_private_key(Some(&KeyMaterial::from(EC_KEY)), "ec")?
        .ok_or_else(|| anyhow::anyhow!("no key"))?;
    let err = to_credential(Some(&KeyMaterial::from(SP_CERT)), Some(&KeyMaterial::from(ec)))
        .unwrap_err();
    assert!(matches!(err, CryptoError::KeyMismatch { .. }));
    Ok(())
}
