//! Charset resolution, detection and decoding.

use encoding_rs::Encoding;

use crate::error::{ConfigError, ConfigResult};

/// Label requesting charset detection instead of an explicit name.
pub const AUTO_CHARSET: &str = "auto";

/// Resolve an IANA charset label (case-insensitive, surrounding
/// whitespace ignored).
///
/// Labels that only map to the replacement decoder (ISO-2022-KR, HZ and
/// similar) are rejected, since decoding with it discards the input.
pub fn resolve_charset(name: &str) -> ConfigResult<&'static Encoding> {
    Encoding::for_label_no_replacement(name.trim().as_bytes())
        .ok_or_else(|| ConfigError::UnknownCharset(name.to_string()))
}

/// Detect the charset of raw bytes using chardet.
pub fn detect_charset(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "UTF-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "ISO-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Resolve `name`, running detection over `bytes` when it is [`AUTO_CHARSET`].
///
/// A detected label the decoder does not know falls back to UTF-8.
pub fn resolve_or_detect(name: &str, bytes: &[u8]) -> ConfigResult<&'static Encoding> {
    if name.trim().eq_ignore_ascii_case(AUTO_CHARSET) {
        let detected = detect_charset(bytes);
        return Ok(resolve_charset(&detected).unwrap_or(encoding_rs::UTF_8));
    }
    resolve_charset(name)
}

/// Decode bytes, replacing malformed sequences. A byte order mark
/// overrides `encoding`.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}
