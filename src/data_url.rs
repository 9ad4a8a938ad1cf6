//! `data:<mime>;base64,<payload>` strings.
//!
//! The source image travels through the pipeline as a data URL, the same
//! representation a browser `FileReader` produces. This module owns the
//! prefix grammar so that ingestion (which builds the URL) and inspection
//! (which reads the MIME type back out) cannot drift apart.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// MIME type assumed when a string carries no recognizable data-URL prefix.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

const PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";
const LINE_TERMINATORS: [char; 4] = ['\n', '\r', '\u{2028}', '\u{2029}'];

#[derive(Error, Debug)]
pub enum DataUrlError {
    #[error("Not a base64 data URL")]
    MissingPrefix,
    #[error("Invalid base64 payload: {0}")]
    Payload(#[from] base64::DecodeError),
}

/// Build a data URL from a MIME type and raw bytes.
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    let payload = STANDARD.encode(bytes);
    let mut url = String::with_capacity(PREFIX.len() + mime_type.len() + BASE64_MARKER.len() + payload.len());
    url.push_str(PREFIX);
    url.push_str(mime_type);
    url.push_str(BASE64_MARKER);
    url.push_str(&payload);
    url
}

/// Split a data URL into its MIME type and payload text.
///
/// The MIME type is everything between `data:` and the last `;base64,`
/// marker; it must be non-empty and free of line terminators.
fn split(data_url: &str) -> Option<(&str, &str)> {
    let rest = data_url.strip_prefix(PREFIX)?;
    let marker = rest.rfind(BASE64_MARKER)?;
    let mime = &rest[..marker];
    if mime.is_empty() || mime.contains(LINE_TERMINATORS) {
        return None;
    }
    Some((mime, &rest[marker + BASE64_MARKER.len()..]))
}

/// Decode a data URL back into `(mime_type, bytes)`.
pub fn decode(data_url: &str) -> Result<(String, Vec<u8>), DataUrlError> {
    let (mime, payload) = split(data_url).ok_or(DataUrlError::MissingPrefix)?;
    let bytes = STANDARD.decode(payload)?;
    Ok((mime.to_string(), bytes))
}

/// MIME type embedded in a data URL, or [`DEFAULT_MIME_TYPE`] when the string
/// does not follow the `data:<mime>;base64,...` grammar.
///
/// This inspects an already-encoded *source* image. The output encoding is
/// chosen separately by the [`Encoder`](crate::encode::Encoder).
pub fn detect_mime_type(data_url: &str) -> String {
    split(data_url)
        .map(|(mime, _)| mime)
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string()
}
