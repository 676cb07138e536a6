//! Data URI encoding of file content.
//!
//! A data URI here always has the shape `data:<mime>;base64,<payload>`, with
//! `payload` in the standard padded base64 alphabet.

use crate::bridge::chunker::{self, ChunkedContent};
use crate::bridge::error::{BridgeError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// MIME type used when the extension says nothing useful
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// An immutable, fully assembled data URI and its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    pub mime_type: String,
    pub payload: String,
    pub data_uri: String,
    /// Length of the raw bytes before encoding
    pub byte_len: usize,
    /// Hex SHA-256 of the raw bytes
    pub sha256: String,
}

impl EncodedImage {
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Result<Self> {
        validate_mime_type(mime_type)?;
        Ok(Self::assemble(
            mime_type,
            BASE64.encode(bytes),
            bytes.len(),
            chunker::hash_data(bytes),
        ))
    }

    pub(crate) fn from_content(mime_type: &str, content: &ChunkedContent) -> Result<Self> {
        validate_mime_type(mime_type)?;
        Ok(Self::assemble(
            mime_type,
            BASE64.encode(&content.data),
            content.data.len(),
            content.sha256.clone(),
        ))
    }

    fn assemble(mime_type: &str, payload: String, byte_len: usize, sha256: String) -> Self {
        let data_uri = format!("{SCHEME}{mime_type}{BASE64_MARKER}{payload}");
        EncodedImage {
            mime_type: mime_type.to_string(),
            payload,
            data_uri,
            byte_len,
            sha256,
        }
    }

    /// Parses a `data:<mime>;base64,<payload>` string back into its parts.
    pub fn parse(data_uri: &str) -> Result<Self> {
        let data_uri = data_uri.trim();
        let rest = data_uri
            .strip_prefix(SCHEME)
            .ok_or_else(|| BridgeError::Encoding("missing `data:` scheme".to_string()))?;
        let (mime_type, payload) = rest.split_once(BASE64_MARKER).ok_or_else(|| {
            BridgeError::Encoding("only base64 data URIs are supported".to_string())
        })?;

        let bytes = decode_payload(payload)?;
        EncodedImage::from_bytes(mime_type, &bytes)
    }

    /// Reverses the base64 step, yielding the original bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        decode_payload(&self.payload)
    }
}

impl fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data_uri)
    }
}

fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(payload)
        .map_err(|e| BridgeError::Encoding(format!("invalid base64 payload: {e}")))
}

/// Rejects MIME types that would produce an ambiguous or malformed URI.
pub fn validate_mime_type(mime_type: &str) -> Result<()> {
    let invalid = |why: &str| Err(BridgeError::Encoding(format!("MIME type {mime_type:?} {why}")));

    if mime_type.is_empty() {
        return invalid("is empty");
    }
    if mime_type
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == ';' || c == ',')
    {
        return invalid("contains a separator or whitespace");
    }
    match mime_type.split_once('/') {
        Some((kind, subtype)) if !kind.is_empty() && !subtype.is_empty() && !subtype.contains('/') => {
            Ok(())
        }
        _ => invalid("is not of the form type/subtype"),
    }
}

/// Guesses an image MIME type from the file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "heic" | "heif" => "image/heic",
        _ => FALLBACK_MIME,
    }
}
