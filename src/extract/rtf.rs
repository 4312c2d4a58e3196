use super::{ExtractError, Method};
use regex::Regex;
use std::sync::OnceLock;

pub(crate) const METHODS: &[Method] = &[("rtf", extract_text)];

fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    Ok(strip_rtf(bytes))
}

fn control_word() -> &'static Regex {
    static CONTROL_WORD: OnceLock<Regex> = OnceLock::new();
    CONTROL_WORD.get_or_init(|| Regex::new(r"\\[a-z]+\d*").expect("static regex"))
}

/// Best-effort plain text from RTF: control words and braces removed,
/// whitespace collapsed. Not a full RTF parser.
///
/// # Examples
///
/// ```
/// use webharvest::extract::strip_rtf;
///
/// assert_eq!(strip_rtf(br"{\rtf1\ansi {\b Bold} text}"), "Bold text");
/// ```
pub fn strip_rtf(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes).replace('\u{FFFD}', "");
    let text = control_word().replace_all(&text, "");
    let text = text.replace(['{', '}'], "");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
