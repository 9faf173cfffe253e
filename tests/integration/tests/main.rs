//! End-to-end coercion tests.
//!
//! These tests drive the public coercion entry points of `samlkit-crypto`
//! and `samlkit-saml` against DER fixtures and keystores written to
//! temporary directories.

mod common;
mod credentials;
mod key_coercion;
mod xml_coercion;
