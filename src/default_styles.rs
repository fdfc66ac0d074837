//! Built-in element default stylesheet.
//!
//! Seeds the cascade below all author rules, the way a browser's UA
//! sheet does. Everything in here must stay within the supported
//! selector and value subset so it parses without diagnostics.

use crate::config::ConvertConfig;
use css::{
    ComplexSelector, CompoundSelector, Declaration, Rule, SimpleSelector, Stylesheet, Value,
};

pub const DEFAULT_STYLESHEET: &str = "\
h1 { font-size: 2em; font-weight: bold; margin: 0.67em 0 }
h2 { font-size: 1.5em; font-weight: bold; margin: 0.83em 0 }
h3 { font-size: 1.17em; font-weight: bold; margin: 1em 0 }
h4 { font-weight: bold; margin: 1.33em 0 }
h5 { font-size: 0.83em; font-weight: bold; margin: 1.67em 0 }
h6 { font-size: 0.67em; font-weight: bold; margin: 2.33em 0 }
p { margin: 1em 0 }
b, strong { font-weight: bold }
i, em, cite, var, dfn { font-style: italic }
u, ins { text-decoration: underline }
s, strike, del { text-decoration: line-through }
code, kbd, samp, tt { font-family: Courier, monospace }
pre { font-family: Courier, monospace; white-space: pre; margin: 1em 0 }
blockquote { margin: 1em 2.5em }
sub { vertical-align: sub }
sup { vertical-align: super }
small { font-size: smaller }
big { font-size: larger }
center { text-align: center }
th { font-weight: bold; text-align: center }
ul { list-style-type: disc; margin: 1em 0 }
ol { list-style-type: decimal; margin: 1em 0 }
ul ul { list-style-type: circle; margin: 0 }
ul ul ul { list-style-type: square }
mark { background-color: yellow }
";

/// Build the configurable link-appearance rule (`a[href] { ... }`),
/// appended after the default sheet so author rules still override it
/// by specificity or order.
pub fn link_rule(config: &ConvertConfig) -> Option<Rule> {
    let mut declarations = Vec::new();
    if let Some(color) = config.link_color {
        declarations.push(Declaration {
            name: "color".to_string(),
            value: Value::Color(color),
            important: false,
        });
    }
    if config.link_underline {
        declarations.push(Declaration {
            name: "text-decoration".to_string(),
            value: Value::Keyword("underline".to_string()),
            important: false,
        });
    }
    if declarations.is_empty() {
        return None;
    }
    Some(Rule {
        selectors: vec![ComplexSelector {
            key: CompoundSelector {
                parts: vec![
                    SimpleSelector::Type("a".to_string()),
                    SimpleSelector::Attr {
                        name: "href".to_string(),
                        value: None,
                    },
                ],
            },
            ancestors: Vec::new(),
        }],
        declarations,
    })
}

/// The default sheet plus the link rule, in cascade order.
pub fn base_stylesheet(config: &ConvertConfig) -> Stylesheet {
    let mut sheet = Stylesheet::new();
    if config.apply_default_styles {
        let mut diags = core_types::Diagnostics::new();
        sheet = css::parse_stylesheet(DEFAULT_STYLESHEET, &mut diags);
        debug_assert!(diags.is_empty(), "default stylesheet must parse clean: {diags:?}");
    }
    if let Some(rule) = link_rule(config) {
        sheet.rules.push(rule);
    }
    sheet
}
