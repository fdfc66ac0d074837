//! Style mapping: computed CSS style to a platform-neutral run
//! descriptor.
//!
//! This is a pure function of the computed style plus the caller's text
//! defaults; nothing here touches the tree or the platform. Font
//! availability is the renderer's problem — the descriptor carries an
//! ordered fallback list, always terminated by the default family, never
//! a single name.

use css::{ComputedStyle, Rgba, VerticalAlign};

/// Caller-level text defaults fed into descriptor mapping.
#[derive(Clone, Debug)]
pub struct TextDefaults {
    /// Family appended to every fallback list.
    pub font_family: String,
    /// Multiplier applied to font sizes and spacings after CSS
    /// resolution.
    pub text_scale: f32,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            font_family: "Times New Roman".to_string(),
            text_scale: 1.0,
        }
    }
}

/// Font lookup request: ordered family preferences plus the concrete
/// face parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct FontRequest {
    pub families: Vec<String>,
    /// Size in px, text scale already applied.
    pub size: f32,
    /// CSS numeric weight, 100..=900.
    pub weight: u16,
    pub italic: bool,
    pub small_caps: bool,
}

/// Platform-neutral presentation attributes for one run. Immutable once
/// emitted.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleDescriptor {
    pub font: FontRequest,
    pub color: Rgba,
    pub background: Rgba,
    pub underline: bool,
    pub strikethrough: bool,
    /// px, text scale applied.
    pub letter_spacing: f32,
    pub word_spacing: f32,
    /// px; positive raises above the baseline (superscript).
    pub baseline_offset: f32,
    /// Resolved hyperlink target when the run sits inside an anchor.
    pub link: Option<String>,
}

// Sub/superscript shrink factor and baseline shifts, as fractions of the
// unshrunk size.
const SCRIPT_SIZE_FACTOR: f32 = 0.83;
const SUPERSCRIPT_RISE: f32 = 0.35;
const SUBSCRIPT_DROP: f32 = 0.20;

/// Map one computed style to a run descriptor.
pub fn map_descriptor(
    style: &ComputedStyle,
    defaults: &TextDefaults,
    link: Option<&str>,
) -> StyleDescriptor {
    let mut families = style.font_families.clone();
    let has_default = families
        .iter()
        .any(|f| f.eq_ignore_ascii_case(&defaults.font_family));
    if !has_default {
        families.push(defaults.font_family.clone());
    }

    let base_size = style.font_size * defaults.text_scale;
    let (size, baseline_offset) = match style.vertical_align {
        VerticalAlign::Baseline => (base_size, 0.0),
        VerticalAlign::Super => (base_size * SCRIPT_SIZE_FACTOR, base_size * SUPERSCRIPT_RISE),
        VerticalAlign::Sub => (base_size * SCRIPT_SIZE_FACTOR, -base_size * SUBSCRIPT_DROP),
    };

    StyleDescriptor {
        font: FontRequest {
            families,
            size,
            weight: style.font_weight,
            italic: style.italic,
            small_caps: style.small_caps,
        },
        color: style.color,
        background: style.background,
        underline: style.underline,
        strikethrough: style.strikethrough,
        letter_spacing: style.letter_spacing * defaults.text_scale,
        word_spacing: style.word_spacing * defaults.text_scale,
        baseline_offset,
        link: link.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_list_always_ends_with_default_family() {
        let mut style = ComputedStyle::initial();
        style.font_families = vec!["Georgia".to_string(), "serif".to_string()];
        let d = map_descriptor(&style, &TextDefaults::default(), None);
        assert_eq!(d.font.families, vec!["Georgia", "serif", "Times New Roman"]);
    }

    #[test]
    fn default_family_is_not_duplicated() {
        let mut style = ComputedStyle::initial();
        style.font_families = vec!["times new roman".to_string()];
        let d = map_descriptor(&style, &TextDefaults::default(), None);
        assert_eq!(d.font.families.len(), 1);
    }

    #[test]
    fn text_scale_multiplies_size_and_spacing() {
        let mut style = ComputedStyle::initial();
        style.font_size = 10.0;
        style.letter_spacing = 1.0;
        let defaults = TextDefaults {
            text_scale: 2.0,
            ..TextDefaults::default()
        };
        let d = map_descriptor(&style, &defaults, None);
        assert_eq!(d.font.size, 20.0);
        assert_eq!(d.letter_spacing, 2.0);
    }

    #[test]
    fn superscript_shrinks_and_raises() {
        let mut style = ComputedStyle::initial();
        style.font_size = 20.0;
        style.vertical_align = VerticalAlign::Super;
        let d = map_descriptor(&style, &TextDefaults::default(), None);
        assert!((d.font.size - 16.6).abs() < 1e-3);
        assert!((d.baseline_offset - 7.0).abs() < 1e-3);

        style.vertical_align = VerticalAlign::Sub;
        let d = map_descriptor(&style, &TextDefaults::default(), None);
        assert!(d.baseline_offset < 0.0);
    }

    #[test]
    fn link_target_is_carried() {
        let style = ComputedStyle::initial();
        let d = map_descriptor(&style, &TextDefaults::default(), Some("https://e.com/a"));
        assert_eq!(d.link.as_deref(), Some("https://e.com/a"));
    }
}
