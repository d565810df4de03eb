//! Base64 envelope of the stored document.
//!
//! The content API embeds file bodies as Base64, wrapped with line breaks on
//! the hosted service. Decoding ignores any ASCII whitespace.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::errors::SyncError;
use crate::models::Document;

/// Line width used when the store wraps Base64 bodies.
pub const LINE_WIDTH: usize = 60;

/// Serialize a document as pretty JSON and Base64-encode it.
pub fn encode_document(document: &Document) -> Result<String, SyncError> {
    let json = serde_json::to_vec_pretty(document)?;
    Ok(STANDARD.encode(json))
}

/// Decode a Base64 payload into a document.
pub fn decode_document(encoded: &str) -> Result<Document, SyncError> {
    let bytes = decode_base64(encoded)?;
    let document = serde_json::from_slice(&bytes)?;
    Ok(document)
}

/// Decode Base64, tolerating line breaks and other whitespace.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD.decode(compact)
}

/// Encode bytes as Base64 broken into lines of [`LINE_WIDTH`] characters.
pub fn encode_wrapped(bytes: &[u8]) -> String {
    let encoded = STANDARD.encode(bytes);
    let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / LINE_WIDTH + 1);
    for (i, c) in encoded.chars().enumerate() {
        if i > 0 && i % LINE_WIDTH == 0 {
            wrapped.push('\n');
        }
        wrapped.push(c);
    }
    wrapped.push('\n');
    wrapped
}
