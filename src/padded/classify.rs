//! Padding-line classification.

use std::sync::LazyLock;

use regex::bytes::Regex;

/// One or more empty quoted fields joined by commas: `""`, `"",""`, ...
static EMPTY_QUOTED_FIELDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^""(,"")*$"#).expect("static regex is valid"));

/// Returns `true` if `line` carries no tabular content.
///
/// A padding line is blank / whitespace-only, or consists solely of empty quoted fields
/// (`""`, `"",""`, ...). The line terminator and surrounding whitespace are ignored. For a
/// UTF-8 line that includes Unicode whitespace such as U+00A0; other encodings fall back to
/// ASCII whitespace only.
///
/// ```rust
/// use padded_csv_upload::padded::is_padding;
///
/// assert!(is_padding("\r\n"));
/// assert!(is_padding("\"\",\"\",\"\"\n"));
/// assert!(!is_padding("\"\",\"x\"\n"));
/// ```
pub fn is_padding(line: impl AsRef<[u8]>) -> bool {
    let bytes = line.as_ref();
    let trimmed = match std::str::from_utf8(bytes) {
        Ok(text) => text.trim().as_bytes(),
        Err(_) => bytes.trim_ascii(),
    };
    trimmed.is_empty() || EMPTY_QUOTED_FIELDS.is_match(trimmed)
}
