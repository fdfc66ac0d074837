//! Document input decoding.
//!
//! Markup arrives as bytes with a declared, sniffed, or unknown character
//! encoding. Decoding never fails: invalid sequences are replaced with
//! U+FFFD and the caller learns about it through `had_errors`, so a bad
//! byte in the middle of a document cannot abort a conversion.
//!
//! Supported encodings are intentionally few: UTF-8 (with or without BOM)
//! and Latin-1/windows-1252 treated as ISO-8859-1. Anything else declared
//! falls back to UTF-8 with replacement.

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Result of decoding a document byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    /// True when any byte sequence was replaced during decoding.
    pub had_errors: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Charset {
    Utf8,
    Latin1,
}

fn charset_from_label(label: &str) -> Option<Charset> {
    let label = label.trim().trim_matches(|c| c == '"' || c == '\'');
    if label.eq_ignore_ascii_case("utf-8") || label.eq_ignore_ascii_case("utf8") {
        return Some(Charset::Utf8);
    }
    if label.eq_ignore_ascii_case("iso-8859-1")
        || label.eq_ignore_ascii_case("latin1")
        || label.eq_ignore_ascii_case("latin-1")
        || label.eq_ignore_ascii_case("windows-1252")
    {
        return Some(Charset::Latin1);
    }
    None
}

/// Sniff a charset label from the first bytes of a document.
///
/// Looks for a UTF-8 BOM, then for `charset=` inside the first 1024 bytes
/// (covers `<meta charset="...">` and `<meta http-equiv` content values).
/// Returns a normalized label, or `None` when nothing was found.
pub fn sniff_charset(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(UTF8_BOM) {
        return Some("utf-8");
    }
    let head_len = bytes.len().min(1024);
    let head = &bytes[..head_len];
    let needle = b"charset=";
    let mut i = 0;
    while i + needle.len() <= head.len() {
        if head[i..i + needle.len()].eq_ignore_ascii_case(needle) {
            let mut rest = &head[i + needle.len()..];
            if let Some((&first, tail)) = rest.split_first()
                && (first == b'"' || first == b'\'')
            {
                rest = tail;
            }
            let end = rest
                .iter()
                .position(|&b| {
                    b == b'"' || b == b'\'' || b.is_ascii_whitespace() || b == b'>' || b == b';'
                })
                .unwrap_or(rest.len());
            let label = String::from_utf8_lossy(&rest[..end]);
            return match charset_from_label(&label) {
                Some(Charset::Utf8) => Some("utf-8"),
                Some(Charset::Latin1) => Some("iso-8859-1"),
                None => None,
            };
        }
        i += 1;
    }
    None
}

/// Decode a document byte buffer into text.
///
/// `declared` is the transport-level charset label (for example from a
/// `Content-Type` header); a sniffed in-document label is used when no
/// declaration is given. Unknown labels decode as UTF-8 with replacement.
pub fn decode_document(bytes: &[u8], declared: Option<&str>) -> DecodedText {
    let charset = declared
        .and_then(charset_from_label)
        .or_else(|| sniff_charset(bytes).and_then(charset_from_label))
        .unwrap_or(Charset::Utf8);

    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    match charset {
        Charset::Latin1 => DecodedText {
            // Latin-1 maps bytes 0x00..=0xFF directly onto the first 256
            // scalar values; this decode cannot fail.
            text: bytes.iter().map(|&b| b as char).collect(),
            had_errors: false,
        },
        Charset::Utf8 => decode_utf8_lossy(bytes),
    }
}

fn decode_utf8_lossy(mut bytes: &[u8]) -> DecodedText {
    let mut text = String::with_capacity(bytes.len());
    let mut had_errors = false;

    loop {
        match std::str::from_utf8(bytes) {
            Ok(s) => {
                text.push_str(s);
                break;
            }
            Err(e) => {
                let valid_up_to = e.valid_up_to();
                if valid_up_to > 0 {
                    // The error marks everything before `valid_up_to` as valid.
                    text.push_str(std::str::from_utf8(&bytes[..valid_up_to]).expect("valid prefix"));
                }
                text.push('\u{FFFD}');
                had_errors = true;
                match e.error_len() {
                    Some(len) => bytes = &bytes[valid_up_to + len..],
                    None => break, // truncated sequence at end of input
                }
            }
        }
    }

    DecodedText { text, had_errors }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_decodes_unchanged() {
        let out = decode_document(b"<p>hello</p>", None);
        assert_eq!(out.text, "<p>hello</p>");
        assert!(!out.had_errors);
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("caf\u{E9}".as_bytes());
        let out = decode_document(&bytes, None);
        assert_eq!(out.text, "caf\u{E9}");
    }

    #[test]
    fn invalid_utf8_replaces_and_continues() {
        let out = decode_document(&[b'a', 0xFF, b'b'], None);
        assert_eq!(out.text, "a\u{FFFD}b");
        assert!(out.had_errors);
    }

    #[test]
    fn truncated_sequence_at_end_is_replaced() {
        // First two bytes of a three-byte sequence.
        let out = decode_document(&[b'x', 0xE2, 0x82], None);
        assert_eq!(out.text, "x\u{FFFD}");
        assert!(out.had_errors);
    }

    #[test]
    fn declared_latin1_maps_high_bytes() {
        let out = decode_document(&[b'n', 0xE9, b'e'], Some("iso-8859-1"));
        assert_eq!(out.text, "n\u{E9}e");
        assert!(!out.had_errors);
    }

    #[test]
    fn meta_charset_is_sniffed() {
        let doc = br#"<html><head><meta charset="iso-8859-1"></head>"#;
        assert_eq!(sniff_charset(doc), Some("iso-8859-1"));
        let out = decode_document(&[b'<', b'p', b'>', 0xE9], Some("latin1"));
        assert_eq!(out.text, "<p>\u{E9}");
    }

    #[test]
    fn unknown_declared_label_falls_back_to_utf8() {
        let out = decode_document("caf\u{E9}".as_bytes(), Some("koi8-r"));
        assert_eq!(out.text, "caf\u{E9}");
    }
}
