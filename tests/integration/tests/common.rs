//! Common test utilities and fixtures.

use std::path::PathBuf;

use p12_keystore::{Certificate, KeyStore, KeyStoreEntry, PrivateKeyChain};
use tempfile::TempDir;

pub const SP_KEY: &[u8] = include_bytes!("../../fixtures/sp.key.der");
pub const SP_CERT: &[u8] = include_bytes!("../../fixtures/sp.crt.der");
pub const IDP_KEY: &[u8] = include_bytes!("../../fixtures/idp.key.der");
pub const IDP_CERT: &[u8] = include_bytes!("../../fixtures/idp.crt.der");
pub const EC_KEY: &[u8] = include_bytes!("../../fixtures/ec.key.der");

pub const KEYSTORE_PASSWORD: &str = "123456";

/// Installs a test subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("samlkit_crypto=debug,samlkit_saml=debug")
        .with_test_writer()
        .try_init();
}

/// A PKCS#12 keystore written to a temporary directory.
///
/// Holds `sp` (private key and certificate) and `idp` (certificate only).
pub struct KeystoreFixture {
    _dir: TempDir,
    pub path: PathBuf,
}

impl KeystoreFixture {
    pub fn new() -> anyhow::Result<Self> {
        init_tracing();

        let mut keystore = KeyStore::new();
        keystore.add_entry(
            "sp",
            KeyStoreEntry::PrivateKeyChain(PrivateKeyChain::new(
                SP_KEY,
                b"sp-key",
                vec![Certificate::from_der(SP_CERT)?],
            )),
        );
        keystore.add_entry("idp", KeyStoreEntry::Certificate(Certificate::from_der(IDP_CERT)?));

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("keystore.jks");
        std::fs::write(&path, keystore.writer(KEYSTORE_PASSWORD).write()?)?;

        Ok(Self { _dir: dir, path })
    }
}
