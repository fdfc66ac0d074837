//! Property value types and their parsers.
//!
//! Values are classified into a closed set of variants at parse time;
//! anything unrecognized is retained as `Value::Unsupported` so the data
//! survives even though the cascade will not apply it. Relative lengths
//! (`em`, `%`) keep their unit tag here; resolution to absolute pixels
//! happens during cascade where the parent context is known.

/// Color normalized to RGBA.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba { r: 0, g: 0, b: 0, a: 255 };
    pub const TRANSPARENT: Rgba = Rgba { r: 0, g: 0, b: 0, a: 0 };

    pub const fn opaque(r: u8, g: u8, b: u8) -> Rgba {
        Rgba { r, g, b, a: 255 }
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }
}

/// Length with its unit tag preserved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    Px(f32),
    Pt(f32),
    Em(f32),
    Percent(f32),
}

impl Length {
    /// Resolve to pixels. `reference_px` is the font size relative units
    /// resolve against (the parent's for `font-size`, the element's own
    /// for everything else).
    pub fn resolve(self, reference_px: f32) -> f32 {
        match self {
            Length::Px(v) => v,
            Length::Pt(v) => v * 4.0 / 3.0,
            Length::Em(v) => v * reference_px,
            Length::Percent(v) => v / 100.0 * reference_px,
        }
    }

    /// True when resolution needs a reference font size.
    pub fn is_relative(self) -> bool {
        matches!(self, Length::Em(_) | Length::Percent(_))
    }
}

/// A classified declaration value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Length(Length),
    Color(Rgba),
    Number(f32),
    /// Single identifier or quoted string (original case preserved).
    Keyword(String),
    /// Comma- or space-separated items (font stacks, decoration lists).
    List(Vec<String>),
    /// Retained raw text the cascade will not apply.
    Unsupported(String),
}

/// Classify a raw declaration value.
pub fn classify_value(raw: &str) -> Value {
    let t = raw.trim();
    if t.is_empty() {
        return Value::Unsupported(String::new());
    }
    if let Some(color) = parse_color(t) {
        return Value::Color(color);
    }
    if let Some(length) = parse_length(t) {
        return Value::Length(length);
    }
    if let Ok(n) = t.parse::<f32>() {
        if n.is_finite() {
            return Value::Number(n);
        }
        return Value::Unsupported(t.to_string());
    }
    if t.contains(',') {
        let items: Vec<String> = t
            .split(',')
            .map(|s| unquote(s.trim()).to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if items.is_empty() {
            return Value::Unsupported(t.to_string());
        }
        return Value::List(items);
    }
    let tokens: Vec<&str> = t.split_whitespace().collect();
    if tokens.len() > 1 {
        return Value::List(tokens.iter().map(|s| unquote(s).to_string()).collect());
    }
    let single = unquote(tokens[0]);
    if single.is_empty() {
        return Value::Unsupported(t.to_string());
    }
    if single.contains('(') {
        // Unhandled functional notation (url(), calc(), ...).
        return Value::Unsupported(t.to_string());
    }
    Value::Keyword(single.to_string())
}

fn unquote(s: &str) -> &str {
    let b = s.as_bytes();
    if b.len() >= 2 && (b[0] == b'"' || b[0] == b'\'') && b[b.len() - 1] == b[0] {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Parse a color: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()`, or a
/// named color. Returns `None` for anything else.
pub fn parse_color(value: &str) -> Option<Rgba> {
    let s = value.trim();

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex);
    }

    let lower = s.to_ascii_lowercase();
    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }
        let channel = |p: &str| -> Option<u8> {
            let n: f32 = p.parse().ok()?;
            if !(0.0..=255.0).contains(&n) {
                return None;
            }
            Some(n.round() as u8)
        };
        let r = channel(parts[0])?;
        let g = channel(parts[1])?;
        let b = channel(parts[2])?;
        let a = if parts.len() == 4 {
            let alpha: f32 = parts[3].parse().ok()?;
            if !(0.0..=1.0).contains(&alpha) {
                return None;
            }
            (alpha * 255.0).round() as u8
        } else {
            255
        };
        return Some(Rgba { r, g, b, a });
    }

    named_color(&lower)
}

fn parse_hex_color(hex: &str) -> Option<Rgba> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
            Some(Rgba::opaque(r * 17, g * 17, b * 17))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgba::opaque(r, g, b))
        }
        8 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
            Some(Rgba { r, g, b, a })
        }
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Rgba> {
    let c = match name {
        "black" => Rgba::opaque(0, 0, 0),
        "silver" => Rgba::opaque(192, 192, 192),
        "gray" | "grey" => Rgba::opaque(128, 128, 128),
        "white" => Rgba::opaque(255, 255, 255),
        "maroon" => Rgba::opaque(128, 0, 0),
        "red" => Rgba::opaque(255, 0, 0),
        "purple" => Rgba::opaque(128, 0, 128),
        "fuchsia" | "magenta" => Rgba::opaque(255, 0, 255),
        "green" => Rgba::opaque(0, 128, 0),
        "lime" => Rgba::opaque(0, 255, 0),
        "olive" => Rgba::opaque(128, 128, 0),
        "yellow" => Rgba::opaque(255, 255, 0),
        "navy" => Rgba::opaque(0, 0, 128),
        "blue" => Rgba::opaque(0, 0, 255),
        "teal" => Rgba::opaque(0, 128, 128),
        "aqua" | "cyan" => Rgba::opaque(0, 255, 255),
        "orange" => Rgba::opaque(255, 165, 0),
        "brown" => Rgba::opaque(165, 42, 42),
        "pink" => Rgba::opaque(255, 192, 203),
        "darkgray" | "darkgrey" => Rgba::opaque(169, 169, 169),
        "lightgray" | "lightgrey" => Rgba::opaque(211, 211, 211),
        "transparent" => Rgba::TRANSPARENT,
        _ => return None,
    };
    Some(c)
}

/// Parse a length with unit suffix `px`, `pt`, `em`, or `%`. A bare `0`
/// is accepted as zero pixels.
pub fn parse_length(value: &str) -> Option<Length> {
    let v = value.trim();
    if v == "0" {
        return Some(Length::Px(0.0));
    }
    let (num_str, unit): (&str, fn(f32) -> Length) = if let Some(n) = v.strip_suffix("px") {
        (n, Length::Px)
    } else if let Some(n) = v.strip_suffix("pt") {
        (n, Length::Pt)
    } else if let Some(n) = v.strip_suffix("em") {
        (n, Length::Em)
    } else if let Some(n) = v.strip_suffix('%') {
        (n, Length::Percent)
    } else {
        return None;
    };
    let num = num_str.trim().parse::<f32>().ok()?;
    if !num.is_finite() {
        return None;
    }
    Some(unit(num))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_expand_correctly() {
        assert_eq!(parse_color("#fff"), Some(Rgba::opaque(255, 255, 255)));
        assert_eq!(parse_color("#f00"), Some(Rgba::opaque(255, 0, 0)));
        assert_eq!(parse_color("#1a2b3c"), Some(Rgba::opaque(0x1A, 0x2B, 0x3C)));
        assert_eq!(
            parse_color("#11223344"),
            Some(Rgba { r: 0x11, g: 0x22, b: 0x33, a: 0x44 })
        );
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#ggg"), None);
    }

    #[test]
    fn functional_colors_parse() {
        assert_eq!(parse_color("rgb(255, 0, 0)"), Some(Rgba::opaque(255, 0, 0)));
        assert_eq!(
            parse_color("rgba(0, 0, 255, 0.5)"),
            Some(Rgba { r: 0, g: 0, b: 255, a: 128 })
        );
        assert_eq!(parse_color("rgb(300, 0, 0)"), None);
        assert_eq!(parse_color("rgba(0,0,0,2)"), None);
    }

    #[test]
    fn named_colors_include_transparent() {
        assert_eq!(parse_color("RED"), Some(Rgba::opaque(255, 0, 0)));
        assert_eq!(parse_color("transparent"), Some(Rgba::TRANSPARENT));
        assert_eq!(parse_color("vermilion"), None);
    }

    #[test]
    fn lengths_keep_unit_tags() {
        assert_eq!(parse_length("12px"), Some(Length::Px(12.0)));
        assert_eq!(parse_length("10pt"), Some(Length::Pt(10.0)));
        assert_eq!(parse_length("1.5em"), Some(Length::Em(1.5)));
        assert_eq!(parse_length("120%"), Some(Length::Percent(120.0)));
        assert_eq!(parse_length("0"), Some(Length::Px(0.0)));
        assert_eq!(parse_length("12"), None);
        assert_eq!(parse_length("12vw"), None);
    }

    #[test]
    fn relative_lengths_resolve_against_reference() {
        assert_eq!(Length::Em(1.5).resolve(16.0), 24.0);
        assert_eq!(Length::Percent(150.0).resolve(16.0), 24.0);
        assert_eq!(Length::Pt(12.0).resolve(16.0), 16.0);
        assert!(Length::Em(1.0).is_relative());
        assert!(!Length::Px(1.0).is_relative());
    }

    #[test]
    fn classification_covers_the_variants() {
        assert_eq!(classify_value("12px"), Value::Length(Length::Px(12.0)));
        assert_eq!(classify_value("#000"), Value::Color(Rgba::BLACK));
        assert_eq!(classify_value("700"), Value::Number(700.0));
        assert_eq!(classify_value("bold"), Value::Keyword("bold".to_string()));
        assert_eq!(
            classify_value("'Helvetica Neue', Arial"),
            Value::List(vec!["Helvetica Neue".to_string(), "Arial".to_string()])
        );
        assert_eq!(
            classify_value("underline line-through"),
            Value::List(vec!["underline".to_string(), "line-through".to_string()])
        );
        assert_eq!(
            classify_value("url(x.png)"),
            Value::Unsupported("url(x.png)".to_string())
        );
    }
}
