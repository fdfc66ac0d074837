//! Conversion configuration and cancellation.

use css::Rgba;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;

/// Caller-supplied document conversion options: base text appearance,
/// link defaults, base URL, and hard limits.
#[derive(Clone, Debug)]
pub struct ConvertConfig {
    /// Family terminating every font fallback list.
    pub default_font_family: String,
    /// Base font size in px before any CSS applies.
    pub default_font_size: f32,
    pub default_text_color: Rgba,
    /// Multiplier applied after CSS size resolution, so callers can
    /// scale documents that use fixed px sizes.
    pub text_scale: f32,
    /// Color applied to `<a href>` content unless author CSS overrides
    /// it. `None` leaves link color alone entirely.
    pub link_color: Option<Rgba>,
    pub link_underline: bool,
    /// Base for resolving stylesheet hrefs, image sources, and link
    /// targets.
    pub base_url: Option<Url>,
    /// Apply the built-in element default stylesheet below author rules.
    pub apply_default_styles: bool,
    /// Open-element depth limit; deeper markup is flattened.
    pub max_tree_depth: usize,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            default_font_family: "Times New Roman".to_string(),
            default_font_size: 16.0,
            default_text_color: Rgba::BLACK,
            text_scale: 1.0,
            link_color: Some(Rgba::opaque(0x00, 0x00, 0xEE)),
            link_underline: true,
            base_url: None,
            apply_default_styles: true,
            max_tree_depth: 256,
        }
    }
}

/// Cooperative cancellation flag, checked between pipeline stages only.
/// Each stage is a bounded synchronous transform, so stage boundaries
/// are the only useful cancellation points.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_token_is_shared_across_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
