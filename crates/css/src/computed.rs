//! Computed styles: inheritance, per-element defaults, and resolution of
//! relative units into absolute pixels.
//!
//! After [`resolve_styles`] every element carries exactly one fully
//! resolved [`ComputedStyle`]: no `em`, `%`, or `inherit` survives past
//! this point. `font-size` resolves against the parent's computed size;
//! every other relative length resolves against the element's own
//! resolved size.

use crate::cascade::cascade_declarations;
use crate::select::ElementView;
use crate::syntax::Stylesheet;
use crate::values::{Length, Rgba, Value};
use core_types::{DiagnosticKind, Diagnostics};
use markup::Node;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Display {
    Block,
    Inline,
    InlineBlock,
    ListItem,
    None,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WhiteSpace {
    #[default]
    Normal,
    Pre,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerticalAlign {
    #[default]
    Baseline,
    Sub,
    Super,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListStyleType {
    #[default]
    Disc,
    Circle,
    Square,
    Decimal,
    DecimalLeadingZero,
    LowerAlpha,
    UpperAlpha,
    None,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListStylePosition {
    Inside,
    #[default]
    Outside,
}

/// Margins in CSS px.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

/// Fully resolved style for one element. All lengths are absolute px.
#[derive(Clone, Debug, PartialEq)]
pub struct ComputedStyle {
    /// Inherited. Initial: black.
    pub color: Rgba,
    /// Not inherited. Initial: transparent.
    pub background: Rgba,
    /// Inherited. Ordered preference list; empty means "default family".
    pub font_families: Vec<String>,
    /// Inherited. Initial: 16px.
    pub font_size: f32,
    /// Inherited. CSS numeric weight, 100..=900. Initial: 400.
    pub font_weight: u16,
    pub italic: bool,
    pub small_caps: bool,
    // Decorations propagate visually to descendants, which this model
    // expresses as plain inheritance.
    pub underline: bool,
    pub strikethrough: bool,
    /// Inherited, px. Initial: 0.
    pub letter_spacing: f32,
    pub word_spacing: f32,
    pub text_align: TextAlign,
    pub white_space: WhiteSpace,
    /// Not inherited.
    pub vertical_align: VerticalAlign,
    /// Not inherited; seeded from the per-element default.
    pub display: Display,
    pub list_style_type: ListStyleType,
    pub list_style_position: ListStylePosition,
    /// Not inherited, px.
    pub margin: Margins,
}

impl ComputedStyle {
    pub fn initial() -> Self {
        ComputedStyle {
            color: Rgba::BLACK,
            background: Rgba::TRANSPARENT,
            font_families: Vec::new(),
            font_size: 16.0,
            font_weight: 400,
            italic: false,
            small_caps: false,
            underline: false,
            strikethrough: false,
            letter_spacing: 0.0,
            word_spacing: 0.0,
            text_align: TextAlign::Left,
            white_space: WhiteSpace::Normal,
            vertical_align: VerticalAlign::Baseline,
            display: Display::Block,
            list_style_type: ListStyleType::Disc,
            list_style_position: ListStylePosition::Outside,
            margin: Margins::default(),
        }
    }
}

/// HTML default display per tag, used when no `display` declaration
/// applies.
pub fn default_display_for(tag: &str) -> Display {
    if matches!(
        tag,
        "a" | "abbr"
            | "b"
            | "bdi"
            | "bdo"
            | "br"
            | "cite"
            | "code"
            | "data"
            | "dfn"
            | "em"
            | "i"
            | "img"
            | "kbd"
            | "mark"
            | "q"
            | "s"
            | "samp"
            | "small"
            | "big"
            | "span"
            | "strike"
            | "strong"
            | "sub"
            | "sup"
            | "time"
            | "u"
            | "var"
            | "wbr"
    ) {
        return Display::Inline;
    }
    if tag == "li" {
        return Display::ListItem;
    }
    Display::Block
}

/// Compute the final style for one element from its winning declarations
/// and its parent's computed style.
pub fn compute_style(
    element_name: &str,
    specified: &[(String, Value)],
    parent: Option<&ComputedStyle>,
    diags: &mut Diagnostics,
) -> ComputedStyle {
    let mut result = ComputedStyle::initial();

    if let Some(p) = parent {
        result.color = p.color;
        result.font_families = p.font_families.clone();
        result.font_size = p.font_size;
        result.font_weight = p.font_weight;
        result.italic = p.italic;
        result.small_caps = p.small_caps;
        result.underline = p.underline;
        result.strikethrough = p.strikethrough;
        result.letter_spacing = p.letter_spacing;
        result.word_spacing = p.word_spacing;
        result.text_align = p.text_align;
        result.white_space = p.white_space;
        result.list_style_type = p.list_style_type;
        result.list_style_position = p.list_style_position;
    }

    result.display = default_display_for(element_name);

    let parent_font_size = parent.map_or(16.0, |p| p.font_size);

    // font-size first: every other relative length resolves against it.
    for (name, value) in specified {
        if name == "font-size" {
            apply_font_size(value, parent_font_size, &mut result, diags);
        }
    }

    for (name, value) in specified {
        if name != "font-size" {
            apply_declaration(name, value, parent, &mut result, diags);
        }
    }

    result
}

fn resolve_failure(property: &str, diags: &mut Diagnostics) {
    diags.record_about(
        DiagnosticKind::UnresolvedProperty,
        "value not resolvable, falling back",
        property.to_string(),
    );
}

fn apply_font_size(
    value: &Value,
    parent_font_size: f32,
    result: &mut ComputedStyle,
    diags: &mut Diagnostics,
) {
    let resolved = match value {
        Value::Length(len) => Some(len.resolve(parent_font_size)),
        Value::Keyword(kw) => font_size_keyword(kw, parent_font_size),
        _ => None,
    };
    match resolved {
        Some(px) if px.is_finite() && px > 0.0 => result.font_size = px,
        _ => resolve_failure("font-size", diags),
    }
}

fn font_size_keyword(kw: &str, parent: f32) -> Option<f32> {
    let px = match kw.to_ascii_lowercase().as_str() {
        "xx-small" => 9.0,
        "x-small" => 10.0,
        "small" => 13.0,
        "medium" => 16.0,
        "large" => 18.0,
        "x-large" => 24.0,
        "xx-large" => 32.0,
        "larger" => parent * 1.25,
        "smaller" => parent * 0.8,
        _ => return None,
    };
    Some(px)
}

fn apply_declaration(
    name: &str,
    value: &Value,
    parent: Option<&ComputedStyle>,
    result: &mut ComputedStyle,
    diags: &mut Diagnostics,
) {
    match name {
        "color" => match value {
            Value::Color(c) => result.color = *c,
            Value::Keyword(kw) if kw.eq_ignore_ascii_case("inherit") => {
                result.color = parent.map_or(Rgba::BLACK, |p| p.color);
            }
            _ => resolve_failure(name, diags),
        },
        "background-color" => match value {
            Value::Color(c) => result.background = *c,
            _ => resolve_failure(name, diags),
        },
        "font-family" => match value {
            Value::List(items) => result.font_families = items.clone(),
            Value::Keyword(kw) => result.font_families = vec![kw.clone()],
            _ => resolve_failure(name, diags),
        },
        "font-weight" => match value {
            Value::Keyword(kw) => match kw.to_ascii_lowercase().as_str() {
                "normal" => result.font_weight = 400,
                "bold" => result.font_weight = 700,
                "bolder" => {
                    result.font_weight = (parent.map_or(400, |p| p.font_weight) + 300).min(900);
                }
                "lighter" => {
                    result.font_weight =
                        parent.map_or(400, |p| p.font_weight).saturating_sub(300).max(100);
                }
                _ => resolve_failure(name, diags),
            },
            Value::Number(n) if (100.0..=900.0).contains(n) => {
                result.font_weight = ((n / 100.0).round() as u16) * 100;
            }
            _ => resolve_failure(name, diags),
        },
        "font-style" => match value {
            Value::Keyword(kw) => match kw.to_ascii_lowercase().as_str() {
                "normal" => result.italic = false,
                "italic" | "oblique" => result.italic = true,
                _ => resolve_failure(name, diags),
            },
            _ => resolve_failure(name, diags),
        },
        "font-variant" => match value {
            Value::Keyword(kw) => match kw.to_ascii_lowercase().as_str() {
                "normal" => result.small_caps = false,
                "small-caps" => result.small_caps = true,
                _ => resolve_failure(name, diags),
            },
            _ => resolve_failure(name, diags),
        },
        "text-decoration" | "text-decoration-line" => {
            let words: Vec<String> = match value {
                Value::Keyword(kw) => vec![kw.to_ascii_lowercase()],
                Value::List(items) => items.iter().map(|s| s.to_ascii_lowercase()).collect(),
                _ => {
                    resolve_failure(name, diags);
                    return;
                }
            };
            for word in words {
                match word.as_str() {
                    "none" => {
                        result.underline = false;
                        result.strikethrough = false;
                    }
                    "underline" => result.underline = true,
                    "line-through" => result.strikethrough = true,
                    // overline and friends: known property, unmapped value
                    _ => {}
                }
            }
        }
        "letter-spacing" | "word-spacing" => {
            let px = match value {
                Value::Length(len) => Some(len.resolve(result.font_size)),
                Value::Keyword(kw) if kw.eq_ignore_ascii_case("normal") => Some(0.0),
                _ => None,
            };
            match px {
                Some(px) if px.is_finite() => {
                    if name == "letter-spacing" {
                        result.letter_spacing = px;
                    } else {
                        result.word_spacing = px;
                    }
                }
                _ => resolve_failure(name, diags),
            }
        }
        "text-align" => match value {
            Value::Keyword(kw) => match kw.to_ascii_lowercase().as_str() {
                "left" | "start" => result.text_align = TextAlign::Left,
                "right" | "end" => result.text_align = TextAlign::Right,
                "center" => result.text_align = TextAlign::Center,
                "justify" => result.text_align = TextAlign::Justify,
                _ => resolve_failure(name, diags),
            },
            _ => resolve_failure(name, diags),
        },
        "white-space" => match value {
            Value::Keyword(kw) => match kw.to_ascii_lowercase().as_str() {
                "normal" | "nowrap" => result.white_space = WhiteSpace::Normal,
                "pre" | "pre-wrap" | "pre-line" => result.white_space = WhiteSpace::Pre,
                _ => resolve_failure(name, diags),
            },
            _ => resolve_failure(name, diags),
        },
        "vertical-align" => match value {
            Value::Keyword(kw) => match kw.to_ascii_lowercase().as_str() {
                "baseline" => result.vertical_align = VerticalAlign::Baseline,
                "sub" => result.vertical_align = VerticalAlign::Sub,
                "super" => result.vertical_align = VerticalAlign::Super,
                // top/middle/bottom are box alignment, not baseline shifts
                _ => {}
            },
            _ => resolve_failure(name, diags),
        },
        "display" => match value {
            Value::Keyword(kw) => match kw.to_ascii_lowercase().as_str() {
                "block" => result.display = Display::Block,
                "inline" => result.display = Display::Inline,
                "inline-block" => result.display = Display::InlineBlock,
                "list-item" => result.display = Display::ListItem,
                "none" => result.display = Display::None,
                _ => resolve_failure(name, diags),
            },
            _ => resolve_failure(name, diags),
        },
        "list-style-type" => match value {
            Value::Keyword(kw) => match kw.to_ascii_lowercase().as_str() {
                "disc" => result.list_style_type = ListStyleType::Disc,
                "circle" => result.list_style_type = ListStyleType::Circle,
                "square" => result.list_style_type = ListStyleType::Square,
                "decimal" => result.list_style_type = ListStyleType::Decimal,
                "decimal-leading-zero" => {
                    result.list_style_type = ListStyleType::DecimalLeadingZero;
                }
                "lower-alpha" | "lower-latin" => {
                    result.list_style_type = ListStyleType::LowerAlpha;
                }
                "upper-alpha" | "upper-latin" => {
                    result.list_style_type = ListStyleType::UpperAlpha;
                }
                "none" => result.list_style_type = ListStyleType::None,
                _ => resolve_failure(name, diags),
            },
            _ => resolve_failure(name, diags),
        },
        "list-style-position" => match value {
            Value::Keyword(kw) => match kw.to_ascii_lowercase().as_str() {
                "inside" => result.list_style_position = ListStylePosition::Inside,
                "outside" => result.list_style_position = ListStylePosition::Outside,
                _ => resolve_failure(name, diags),
            },
            _ => resolve_failure(name, diags),
        },
        "margin-top" | "margin-right" | "margin-bottom" | "margin-left" => {
            let px = match value {
                // Percentage margins resolve against the containing block,
                // which this pipeline does not model.
                Value::Length(Length::Percent(_)) => None,
                Value::Length(len) => Some(len.resolve(result.font_size)),
                _ => None,
            };
            match px {
                Some(px) if px.is_finite() => match name {
                    "margin-top" => result.margin.top = px,
                    "margin-right" => result.margin.right = px,
                    "margin-bottom" => result.margin.bottom = px,
                    _ => result.margin.left = px,
                },
                _ => resolve_failure(name, diags),
            }
        }
        // Unknown property: ignored without affecting anything else.
        _ => {}
    }
}

/// A node in the style tree: pairs a document node with its computed
/// style. Text and comment nodes carry their parent's style.
pub struct StyledNode<'a> {
    pub node: &'a Node,
    pub style: ComputedStyle,
    pub children: Vec<StyledNode<'a>>,
}

/// Build the style tree for a document.
///
/// `base` is the caller's base style (default font, size, color); every
/// element inherits from it through the cascade.
pub fn resolve_styles<'a>(
    root: &'a Node,
    sheet: &Stylesheet,
    base: &ComputedStyle,
    diags: &mut Diagnostics,
) -> StyledNode<'a> {
    let mut ancestors: Vec<ElementView<'a>> = Vec::new();
    resolve_node(root, sheet, base, &mut ancestors, true, true, diags)
}

fn resolve_node<'a>(
    node: &'a Node,
    sheet: &Stylesheet,
    parent_style: &ComputedStyle,
    ancestors: &mut Vec<ElementView<'a>>,
    first_child: bool,
    last_child: bool,
    diags: &mut Diagnostics,
) -> StyledNode<'a> {
    match node {
        Node::Element {
            name, attributes, ..
        } => {
            let view = ElementView {
                name: name.as_ref(),
                attributes,
                first_child,
                last_child,
            };
            let inline_style = node.attr("style");
            let specified = cascade_declarations(&view, ancestors, sheet, inline_style, diags);
            let style = compute_style(name, &specified, Some(parent_style), diags);

            ancestors.push(view);
            let children = resolve_children(node, sheet, &style, ancestors, diags);
            ancestors.pop();

            StyledNode {
                node,
                style,
                children,
            }
        }
        Node::Document { .. } => {
            let style = parent_style.clone();
            let children = resolve_children(node, sheet, &style, ancestors, diags);
            StyledNode {
                node,
                style,
                children,
            }
        }
        Node::Text { .. } | Node::Comment { .. } => StyledNode {
            node,
            style: parent_style.clone(),
            children: Vec::new(),
        },
    }
}

fn resolve_children<'a>(
    node: &'a Node,
    sheet: &Stylesheet,
    parent_style: &ComputedStyle,
    ancestors: &mut Vec<ElementView<'a>>,
    diags: &mut Diagnostics,
) -> Vec<StyledNode<'a>> {
    let children = node.children();
    let element_positions: Vec<usize> = children
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, Node::Element { .. }))
        .map(|(i, _)| i)
        .collect();
    let first_element = element_positions.first().copied();
    let last_element = element_positions.last().copied();

    children
        .iter()
        .enumerate()
        .map(|(i, child)| {
            resolve_node(
                child,
                sheet,
                parent_style,
                ancestors,
                first_element == Some(i),
                last_element == Some(i),
                diags,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_stylesheet;
    use markup::{TreeBuilderConfig, build_tree, tokenize};

    fn styled<'a>(tree: &'a Node, css: &str) -> StyledNode<'a> {
        let mut diags = Diagnostics::new();
        let sheet = parse_stylesheet(css, &mut diags);
        resolve_styles(tree, &sheet, &ComputedStyle::initial(), &mut diags)
    }

    fn parse(input: &str) -> Node {
        let mut diags = Diagnostics::new();
        let stream = tokenize(input, &mut diags);
        build_tree(&stream, &TreeBuilderConfig::default(), &mut diags)
    }

    /// Find the styled node for the first element with the given name.
    fn find<'a, 'b>(node: &'b StyledNode<'a>, name: &str) -> Option<&'b StyledNode<'a>> {
        if node.node.is_element_named(name) {
            return Some(node);
        }
        node.children.iter().find_map(|c| find(c, name))
    }

    #[test]
    fn color_inherits_into_children() {
        let tree = parse(r#"<p style="color: red"><b>x</b></p>"#);
        let root = styled(&tree, "");
        let b = find(&root, "b").unwrap();
        assert_eq!(b.style.color, Rgba::opaque(255, 0, 0));
    }

    #[test]
    fn background_does_not_inherit() {
        let tree = parse(r#"<div style="background-color: #ff0000"><p>x</p></div>"#);
        let root = styled(&tree, "");
        let p = find(&root, "p").unwrap();
        assert_eq!(p.style.background, Rgba::TRANSPARENT);
        let div = find(&root, "div").unwrap();
        assert_eq!(div.style.background, Rgba::opaque(255, 0, 0));
    }

    #[test]
    fn em_font_size_resolves_against_parent() {
        let tree = parse(r#"<div style="font-size: 20px"><p style="font-size: 1.5em">x</p></div>"#);
        let root = styled(&tree, "");
        let p = find(&root, "p").unwrap();
        assert_eq!(p.style.font_size, 30.0);
    }

    #[test]
    fn percent_font_size_resolves_against_parent() {
        let tree = parse(r#"<div style="font-size: 20px"><p style="font-size: 50%">x</p></div>"#);
        let root = styled(&tree, "");
        let p = find(&root, "p").unwrap();
        assert_eq!(p.style.font_size, 10.0);
    }

    #[test]
    fn em_spacing_resolves_against_own_font_size() {
        let tree = parse(r#"<p style="font-size: 20px; letter-spacing: 0.1em">x</p>"#);
        let root = styled(&tree, "");
        let p = find(&root, "p").unwrap();
        assert!((p.style.letter_spacing - 2.0).abs() < 1e-4);
    }

    #[test]
    fn pt_sizes_convert_to_px() {
        let tree = parse(r#"<p style="font-size: 12pt">x</p>"#);
        let root = styled(&tree, "");
        let p = find(&root, "p").unwrap();
        assert_eq!(p.style.font_size, 16.0);
    }

    #[test]
    fn unresolvable_value_falls_back_with_diagnostic() {
        let mut diags = Diagnostics::new();
        let sheet = parse_stylesheet("p { font-size: banana }", &mut diags);
        let tree = parse("<p>x</p>");
        let root = resolve_styles(&tree, &sheet, &ComputedStyle::initial(), &mut diags);
        let p = find(&root, "p").unwrap();
        assert_eq!(p.style.font_size, 16.0);
        assert!(diags.has_kind(DiagnosticKind::UnresolvedProperty));
    }

    #[test]
    fn display_defaults_follow_tag_and_yield_to_declarations() {
        let tree = parse(r#"<span>a</span><div>b</div><li>c</li><em style="display: block">d</em>"#);
        let root = styled(&tree, "");
        assert_eq!(find(&root, "span").unwrap().style.display, Display::Inline);
        assert_eq!(find(&root, "div").unwrap().style.display, Display::Block);
        assert_eq!(find(&root, "li").unwrap().style.display, Display::ListItem);
        assert_eq!(find(&root, "em").unwrap().style.display, Display::Block);
    }

    #[test]
    fn font_weight_numbers_and_keywords() {
        let tree = parse(
            r#"<b style="font-weight: 600"><i style="font-weight: bolder">x</i></b>"#,
        );
        let root = styled(&tree, "b { font-weight: bold }");
        assert_eq!(find(&root, "b").unwrap().style.font_weight, 600);
        assert_eq!(find(&root, "i").unwrap().style.font_weight, 900);
    }

    #[test]
    fn text_decorations_accumulate_and_reset() {
        let tree = parse(
            r#"<u><s>both</s></u><u style="text-decoration: none">off</u>"#,
        );
        let css = "u { text-decoration: underline } s { text-decoration: line-through }";
        let root = styled(&tree, css);
        let s = find(&root, "s").unwrap();
        assert!(s.style.underline, "underline inherited from u");
        assert!(s.style.strikethrough);
        // second <u>: the inline `none` wins over the stylesheet underline
        let doc_children = &root.children;
        let second_u = doc_children
            .iter()
            .filter(|c| c.node.is_element_named("u"))
            .nth(1)
            .unwrap();
        assert!(!second_u.style.underline);
    }

    #[test]
    fn descendant_rules_need_the_ancestor() {
        let tree = parse("<div><p>in</p></div><p>out</p>");
        let root = styled(&tree, "div p { color: red }");
        let inside = find(&root, "div").and_then(|d| find(d, "p")).unwrap();
        assert_eq!(inside.style.color, Rgba::opaque(255, 0, 0));
        let outside = root
            .children
            .iter()
            .find(|c| c.node.is_element_named("p"))
            .unwrap();
        assert_eq!(outside.style.color, Rgba::BLACK);
    }

    #[test]
    fn first_child_pseudo_sees_element_position() {
        let tree = parse("<ul>text<li>a</li><li>b</li></ul>");
        let root = styled(&tree, "li:first-child { color: red }");
        let ul = find(&root, "ul").unwrap();
        let items: Vec<_> = ul
            .children
            .iter()
            .filter(|c| c.node.is_element_named("li"))
            .collect();
        assert_eq!(items[0].style.color, Rgba::opaque(255, 0, 0));
        assert_eq!(items[1].style.color, Rgba::BLACK);
    }

    #[test]
    fn text_nodes_carry_parent_style() {
        let tree = parse(r#"<p style="color: red">x</p>"#);
        let root = styled(&tree, "");
        let p = find(&root, "p").unwrap();
        let text = &p.children[0];
        assert!(matches!(text.node, Node::Text { .. }));
        assert_eq!(text.style.color, Rgba::opaque(255, 0, 0));
    }
}
