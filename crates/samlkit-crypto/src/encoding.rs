//! Base64 and PEM text handling.

use base64::Engine;

use crate::error::CryptoResult;

/// Decodes base64 text, tolerating PEM armor and embedded whitespace.
///
/// Text such as `-----BEGIN CERTIFICATE-----\nMIIC...\n-----END CERTIFICATE-----`
/// and a bare single-line base64 string decode to the same bytes.
///
/// # Errors
///
/// Returns [`crate::CryptoError::Base64`] if the payload is not base64.
pub fn decode_base64(text: &str) -> CryptoResult<Vec<u8>> {
    let payload: String = strip_pem_armor(text)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

/// Encodes bytes as single-line standard base64.
#[must_use]
pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Wraps DER bytes in PEM armor with the given label.
#[must_use]
pub fn to_pem(der: &[u8], label: &str) -> String {
    let encoded = encode_base64(der);
    let mut pem = format!("-----BEGIN {label}-----\n");
    for line in encoded.as_bytes().chunks(64) {
        pem.push_str(&String::from_utf8_lossy(line));
        pem.push('\n');
    }
    pem.push_str(&format!("-----END {label}-----\n"));
    pem
}

fn strip_pem_armor(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("-----BEGIN ") {
        return trimmed;
    }
    let body_start = trimmed
        .find('\n')
        .map_or(trimmed.len(), |i| i + 1);
    let body_end = trimmed.rfind("-----END ").unwrap_or(trimmed.len());
    if body_end < body_start {
        return "";
    }
    &trimmed[body_start..body_end]
}
