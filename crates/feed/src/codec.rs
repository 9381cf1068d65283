//! Provider transport layer: Base64 around a single-byte XOR.
//!
//! The XOR only hides the payload from casual inspection. The key is a
//! protocol constant, not a secret.

use base64::Engine as _;

use crate::error::DecodeError;

pub const XOR_KEY: u8 = 0x4B;

/// XORs every byte with `key`. Applying it twice restores the input.
pub fn xor_in_place(bytes: &mut [u8], key: u8) {
    for b in bytes.iter_mut() {
        *b ^= key;
    }
}

/// Base64 → XOR → UTF-8.
///
/// Surrounding ASCII whitespace and one pair of enclosing double quotes are
/// ignored, so a JSON-string response body decodes the same as a bare one.
pub fn deobfuscate(raw: &[u8]) -> Result<String, DecodeError> {
    let body = strip_transport_wrapping(raw);
    let mut bytes = base64::engine::general_purpose::STANDARD
        .decode(body)
        .map_err(|e| DecodeError::Encoding(e.to_string()))?;
    xor_in_place(&mut bytes, XOR_KEY);
    String::from_utf8(bytes).map_err(|e| DecodeError::TextEncoding {
        valid_up_to: e.utf8_error().valid_up_to(),
    })
}

/// Inverse of [`deobfuscate`]; produces what the provider sends.
pub fn obfuscate(text: &str) -> String {
    let mut bytes = text.as_bytes().to_vec();
    xor_in_place(&mut bytes, XOR_KEY);
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn strip_transport_wrapping(raw: &[u8]) -> &[u8] {
    let trimmed = raw.trim_ascii();
    match trimmed {
        [b'"', inner @ .., b'"'] => inner,
        _ => trimmed,
    }
}
