//! Tolerant markup tokenizer with a constrained, practical tag-name
//! character set.
//!
//! Supported tag-name characters (ASCII only): `[A-Za-z0-9:_-]`; attribute
//! names use the same class. Tag and attribute names are interned
//! ASCII-lowercase.
//!
//! The tokenizer never fails. Recovery behavior, in full:
//! - `<` not followed by a name, `!`, or `/` is literal text;
//! - a tag still open at end of input is re-emitted as literal text;
//! - an unterminated comment runs to end of input;
//! - a `<!...>` construct that is not a comment or doctype is consumed as
//!   a bogus comment;
//! - `<script>` and `<style>` bodies are raw text up to a case-insensitive
//!   close tag; a missing close tag implies one at end of input.
//! Each recovery records a `MalformedMarkup` diagnostic.
use crate::entities::decode_entities;
use crate::types::{AtomId, AtomTable, Token, TokenStream};
use core_types::{DiagnosticKind, Diagnostics};
use memchr::memchr;

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

// Rawtext close-tag scanning only ever matches at an ASCII `<`, which
// cannot appear inside a UTF-8 continuation byte.
const SCRIPT_CLOSE: &[u8] = b"</script";
const STYLE_CLOSE: &[u8] = b"</style";

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn starts_with_ignore_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

/// Find the close tag for a rawtext element in `haystack`.
///
/// Returns `(body_end, resume)`: the byte offset where the rawtext body
/// ends and the offset just past the close tag's `>`. Only ASCII
/// whitespace may sit between the tag name and `>`.
fn find_rawtext_close(haystack: &str, close_tag: &[u8]) -> Option<(usize, usize)> {
    let bytes = haystack.as_bytes();
    let len = bytes.len();
    let n = close_tag.len();
    let mut i = 0;
    while i + n <= len {
        let rel = memchr(b'<', &bytes[i..])?;
        i += rel;
        if i + n > len {
            return None;
        }
        if bytes[i + 1] == b'/' && starts_with_ignore_case_at(bytes, i, close_tag) {
            let mut k = i + n;
            while k < len && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && bytes[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

/// Tokenize a document into a token stream with interned names.
///
/// Never fails; recovered problems land in `diags`.
pub fn tokenize(input: &str, diags: &mut Diagnostics) -> TokenStream {
    let mut out: Vec<Token> = Vec::new();
    let mut atoms = AtomTable::new();
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut i = 0;

    // Slice endpoints are always UTF-8 boundaries: we cut only at ASCII
    // structural bytes or positions reached by scanning ASCII-only names.
    while i < len {
        if bytes[i] != b'<' {
            let start = i;
            i += memchr(b'<', &bytes[i..]).unwrap_or(len - i);
            let decoded = decode_entities(&input[start..i]);
            if !decoded.is_empty() {
                out.push(Token::Text(decoded));
            }
            continue;
        }

        if input[i..].starts_with(COMMENT_OPEN) {
            let body_start = i + COMMENT_OPEN.len();
            match input[body_start..].find(COMMENT_CLOSE) {
                Some(end) => {
                    out.push(Token::Comment(input[body_start..body_start + end].to_string()));
                    i = body_start + end + COMMENT_CLOSE.len();
                }
                None => {
                    diags.record(DiagnosticKind::MalformedMarkup, "unterminated comment");
                    out.push(Token::Comment(input[body_start..].to_string()));
                    i = len;
                }
            }
            continue;
        }

        if starts_with_ignore_case_at(bytes, i, b"<!doctype") {
            let rest = &input[i + 2..];
            match rest.find('>') {
                Some(end) => {
                    out.push(Token::Doctype(rest[..end].trim().to_string()));
                    i += 2 + end + 1;
                }
                None => {
                    diags.record(DiagnosticKind::MalformedMarkup, "unterminated doctype");
                    i = len;
                }
            }
            continue;
        }

        if i + 1 < len && bytes[i + 1] == b'!' {
            // Bogus markup declaration (<!foo>, <![CDATA[, ...): swallow it.
            diags.record(DiagnosticKind::MalformedMarkup, "bogus markup declaration");
            match memchr(b'>', &bytes[i..]) {
                Some(rel) => i += rel + 1,
                None => i = len,
            }
            continue;
        }

        if i + 1 < len && bytes[i + 1] == b'/' {
            match scan_end_tag(input, i, &mut atoms, diags) {
                Some((token, next)) => {
                    if let Some(token) = token {
                        out.push(token);
                    }
                    i = next;
                }
                None => {
                    // Unterminated: the rest of the input is text.
                    out.push(Token::Text(decode_entities(&input[i..])));
                    i = len;
                }
            }
            continue;
        }

        if i + 1 < len && is_name_byte(bytes[i + 1]) {
            match scan_start_tag(input, i, &mut atoms) {
                Some((token, name, self_closing, next)) => {
                    out.push(token);
                    i = next;
                    if self_closing {
                        continue;
                    }
                    let tag = atoms.resolve(name);
                    let close: &[u8] = match tag {
                        "script" => SCRIPT_CLOSE,
                        "style" => STYLE_CLOSE,
                        _ => continue,
                    };
                    // Rawtext body: no entity decoding, no nested tags.
                    match find_rawtext_close(&input[i..], close) {
                        Some((body_end, resume)) => {
                            if body_end > 0 {
                                out.push(Token::Text(input[i..i + body_end].to_string()));
                            }
                            out.push(Token::EndTag(name));
                            i += resume;
                        }
                        None => {
                            diags.record_about(
                                DiagnosticKind::MalformedMarkup,
                                "rawtext element not closed before end of input",
                                tag.to_string(),
                            );
                            if i < len {
                                out.push(Token::Text(input[i..].to_string()));
                            }
                            out.push(Token::EndTag(name));
                            i = len;
                        }
                    }
                }
                None => {
                    diags.record(
                        DiagnosticKind::MalformedMarkup,
                        "tag still open at end of input",
                    );
                    out.push(Token::Text(decode_entities(&input[i..])));
                    i = len;
                }
            }
            continue;
        }

        // Lone '<' (e.g. "a < b"): literal text.
        out.push(Token::Text("<".to_string()));
        i += 1;
    }

    TokenStream::new(out, atoms)
}

/// Scan `</name ... >` starting at the `<` at byte `i`.
///
/// Returns `Some((token, next))` when the tag closes before end of input
/// (`token` is `None` for an ignorable `</>`), `None` when unterminated.
fn scan_end_tag(
    input: &str,
    i: usize,
    atoms: &mut AtomTable,
    diags: &mut Diagnostics,
) -> Option<(Option<Token>, usize)> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let name_start = i + 2;
    let mut j = name_start;
    while j < len && is_name_byte(bytes[j]) {
        j += 1;
    }
    let name_end = j;
    while j < len && bytes[j] != b'>' {
        j += 1;
    }
    if j >= len {
        diags.record(DiagnosticKind::MalformedMarkup, "unterminated end tag");
        return None;
    }
    if name_end == name_start {
        diags.record(DiagnosticKind::MalformedMarkup, "end tag with no name");
        return Some((None, j + 1));
    }
    let name = atoms.intern_ascii_lowercase(&input[name_start..name_end]);
    Some((Some(Token::EndTag(name)), j + 1))
}

/// Scan a start tag at byte `i`. Returns the token, interned name, the
/// effective self-closing flag, and the resume offset; `None` when the tag
/// never closes.
fn scan_start_tag(
    input: &str,
    i: usize,
    atoms: &mut AtomTable,
) -> Option<(Token, AtomId, bool, usize)> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let name_start = i + 1;
    let mut j = name_start;
    while j < len && is_name_byte(bytes[j]) {
        j += 1;
    }
    let name = atoms.intern_ascii_lowercase(&input[name_start..j]);

    let mut attributes: Vec<(AtomId, Option<String>)> = Vec::new();
    let mut self_closing = false;
    let mut closed = false;
    let mut k = j;

    while k < len {
        while k < len && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        if k >= len {
            break;
        }
        if bytes[k] == b'>' {
            k += 1;
            closed = true;
            break;
        }
        if bytes[k] == b'/' {
            if k + 1 < len && bytes[k + 1] == b'>' {
                self_closing = true;
                closed = true;
                k += 2;
                break;
            }
            // Stray slash inside the tag: best-effort, skip it.
            k += 1;
            continue;
        }

        let attr_start = k;
        while k < len && is_name_byte(bytes[k]) {
            k += 1;
        }
        if attr_start == k {
            // Junk byte that is neither name, slash, nor '>': skip it.
            k += 1;
            continue;
        }
        let attr_name = atoms.intern_ascii_lowercase(&input[attr_start..k]);

        while k < len && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        let value = if k < len && bytes[k] == b'=' {
            k += 1;
            while k < len && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                let quote = bytes[k];
                k += 1;
                let vstart = k;
                while k < len && bytes[k] != quote {
                    k += 1;
                }
                let raw = &input[vstart..k];
                if k < len {
                    k += 1; // closing quote
                }
                Some(decode_entities(raw))
            } else {
                let vstart = k;
                while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                    if bytes[k] == b'/' && k + 1 < len && bytes[k + 1] == b'>' {
                        break;
                    }
                    k += 1;
                }
                Some(decode_entities(&input[vstart..k]))
            }
        } else {
            None
        };
        attributes.push((attr_name, value));
    }

    if !closed {
        return None;
    }

    if is_void_element(atoms.resolve(name)) {
        self_closing = true;
    }

    let token = Token::StartTag {
        name,
        attributes,
        self_closing,
    };
    Some((token, name, self_closing, k))
}
