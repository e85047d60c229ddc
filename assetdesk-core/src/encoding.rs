//! HTML-safe identifiers for filter keys
//!
//! User-defined and registry filter names are free text. Forms address them
//! through an URL-safe base64 identifier instead of the raw key.

use crate::ValidationError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Encode a filter key as an URL-safe, unpadded base64 identifier.
pub fn encode_field_name(name: &str) -> String {
    URL_SAFE_NO_PAD.encode(name.as_bytes())
}

/// Decode an identifier produced by [`encode_field_name`].
pub fn decode_field_name(encoded: &str) -> Result<String, ValidationError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded.as_bytes())
        .map_err(|e| ValidationError::InvalidEncoding {
            reason: e.to_string(),
        })?;
    String::from_utf8(bytes).map_err(|e| ValidationError::InvalidEncoding {
        reason: e.to_string(),
    })
}
