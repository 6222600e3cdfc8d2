use crate::foundation::{CovaultError, Hash32};

pub fn decode_hex(s: &str) -> Result<Vec<u8>, CovaultError> {
    hex::decode(strip_0x(s)).map_err(|e| e.into())
}

pub fn parse_hex_32bytes(s: &str) -> Result<Hash32, CovaultError> {
    let bytes = decode_hex(s.trim())?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| CovaultError::EncodingError(format!("expected 32-byte hex value, got {} bytes", bytes.len())))
}

pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

/// Normalize an externally supplied hex signature: trim, drop any `0x`
/// prefix, lowercase, and reject anything that is not plain even-length hex.
/// The cohort's condition evaluator consumes the raw hex form.
pub fn normalize_signature_hex(s: &str) -> Result<String, CovaultError> {
    let stripped = strip_0x(s.trim());
    if stripped.is_empty() {
        return Err(CovaultError::InvalidRequest("signature must not be empty".to_string()));
    }
    if stripped.len() % 2 != 0 {
        return Err(CovaultError::InvalidRequest("signature hex must have even length".to_string()));
    }
    if !stripped.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CovaultError::InvalidRequest("signature must be hex encoded".to_string()));
    }
    Ok(stripped.to_ascii_lowercase())
}
