use super::{ExtractError, Method};
use encoding_rs::{UTF_16BE, UTF_16LE};
use tracing::trace;

pub(crate) const METHODS: &[Method] = &[("text", extract_text)];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    Ok(decode_text(bytes))
}

/// Decoders tried in order; the first that accepts the bytes wins
const DECODERS: &[(&str, fn(&[u8]) -> Option<String>)] = &[
    ("utf-8", decode_utf8),
    ("utf-16", decode_utf16),
    ("latin-1", decode_latin1),
];

/// Decodes plain text, trying encodings in a fixed order
///
/// 1. UTF-8 (a leading BOM is dropped)
/// 2. UTF-16, only when the data starts with a byte order mark
/// 3. Latin-1, which maps every byte
///
/// UTF-8 with invalid sequences replaced is the last resort.
///
/// # Examples
///
/// ```
/// use webharvest::extract::decode_text;
///
/// assert_eq!(decode_text(b"caf\xe9"), "café");
/// ```
pub fn decode_text(bytes: &[u8]) -> String {
    DECODERS
        .iter()
        .find_map(|(name, decode)| {
            let text = decode(bytes)?;
            trace!("Decoded {} bytes as {}", bytes.len(), name);
            Some(text)
        })
        .unwrap_or_else(|| String::from_utf8_lossy(bytes).into_owned())
}

fn decode_utf8(bytes: &[u8]) -> Option<String> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    std::str::from_utf8(body).ok().map(str::to_string)
}

fn decode_utf16(bytes: &[u8]) -> Option<String> {
    let (encoding, body) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (UTF_16LE, rest),
        [0xFE, 0xFF, rest @ ..] => (UTF_16BE, rest),
        _ => return None,
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
}

fn decode_latin1(bytes: &[u8]) -> Option<String> {
    Some(bytes.iter().map(|&b| b as char).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8() {
        assert_eq!(decode_text("héllo wörld".as_bytes()), "héllo wörld");
    }

    #[test]
    fn test_utf8_bom_stripped() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFhello"), "hello");
    }

    #[test]
    fn test_utf16_with_bom() {
        assert_eq!(decode_text(&[0xFF, 0xFE, b'h', 0, b'i', 0]), "hi");
        assert_eq!(decode_text(&[0xFE, 0xFF, 0, b'h', 0, b'i']), "hi");
    }

    #[test]
    fn test_invalid_utf8_valid_latin1() {
        assert_eq!(decode_text(b"Stra\xdfe na\xefve"), "Straße naïve");
    }

    #[test]
    fn test_c1_bytes_decoded_as_latin1() {
        assert_eq!(decode_text(b"\x93quoted\x94 \x80"), "\u{93}quoted\u{94} \u{80}");
    }

    #[test]
    fn test_empty() {
        assert_eq!(decode_text(b""), "");
    }

    #[test]
    fn test_odd_utf16_falls_through() {
        // BOM followed by a truncated code unit is not valid UTF-16
        let text = decode_text(&[0xFF, 0xFE, b'h']);
        assert!(!text.is_empty());
    }
}
