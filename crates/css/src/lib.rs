//! CSS parsing, selector matching, cascade resolution, and computed
//! styles for the conversion pipeline.

pub mod cascade;
pub mod computed;
pub mod select;
pub mod syntax;
pub mod values;

pub use crate::cascade::{Specificity, cascade_declarations};
pub use crate::computed::{
    ComputedStyle, Display, ListStylePosition, ListStyleType, Margins, StyledNode, TextAlign,
    VerticalAlign, WhiteSpace, compute_style, default_display_for, resolve_styles,
};
pub use crate::select::{ElementView, matches_complex, matches_compound};
pub use crate::syntax::{
    Combinator, ComplexSelector, CompoundSelector, Declaration, PseudoClass, Rule,
    SimpleSelector, Stylesheet, parse_declarations, parse_selector_list, parse_stylesheet,
};
pub use crate::values::{Length, Rgba, Value, classify_value, parse_color, parse_length};

/// True when a content-type label names a stylesheet.
pub fn is_stylesheet(content_type: Option<&str>) -> bool {
    content_type
        .map(|s| s.trim_start().to_ascii_lowercase().starts_with("text/css"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stylesheet_content_types_match() {
        assert!(is_stylesheet(Some("text/css")));
        assert!(is_stylesheet(Some("  Text/CSS; charset=utf-8")));
        assert!(!is_stylesheet(Some("text/html")));
        assert!(!is_stylesheet(None));
    }
}
