//! List marker formatting.

use css::ListStyleType;

/// Format the marker label for one list item. `index` is 1-based.
/// Returns `None` for `list-style-type: none`.
pub fn marker_label(style: ListStyleType, index: usize) -> Option<String> {
    let label = match style {
        ListStyleType::None => return None,
        ListStyleType::Disc => "\u{2022}".to_string(),
        ListStyleType::Circle => "\u{25E6}".to_string(),
        ListStyleType::Square => "\u{25AA}".to_string(),
        ListStyleType::Decimal => format!("{index}."),
        ListStyleType::DecimalLeadingZero => format!("{index:02}."),
        ListStyleType::LowerAlpha => format!("{}.", alpha_label(index)),
        ListStyleType::UpperAlpha => format!("{}.", alpha_label(index).to_ascii_uppercase()),
    };
    Some(label)
}

/// Bijective base-26 letters: 1 => "a", 26 => "z", 27 => "aa".
fn alpha_label(mut n: usize) -> String {
    debug_assert!(n >= 1);
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).expect("ASCII letters")
}
