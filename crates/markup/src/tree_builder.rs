//! Document tree construction over an open-element stack.
//!
//! The builder consumes a token stream and produces one `Node::Document`.
//! It never fails: structural problems are repaired according to the
//! recovery rules below and recorded as diagnostics.
//!
//! Recovery dialect. This is a deliberately finite subset of consumer
//! HTML parsing, not the WHATWG algorithm:
//! - an incoming start tag implicitly closes the top of the stack per the
//!   [`implicitly_closed_by`] table (repeatedly, while the table matches);
//!   because only the top of the stack is ever closed this way, scope
//!   boundaries hold structurally — an open `ul` shields an outer `li`,
//!   an open `table` shields an outer `td`;
//! - an end tag closes the nearest matching open element; elements above
//!   it on the stack are closed implicitly; an end tag with no matching
//!   open element is ignored (diagnostic, never an error);
//! - end of input closes all remaining open elements in LIFO order;
//! - implicit and end-of-input closes are diagnosed only for elements
//!   whose end tag is NOT optional in HTML (closing an open `li` via
//!   `</ul>` is structure, closing an open `span` is a repair);
//! - consecutive text children merge into one text node;
//! - elements deeper than `TreeBuilderConfig::max_depth` are materialized
//!   but not pushed, so their would-be children flatten into the deepest
//!   allowed ancestor.

use crate::types::{Node, Token, TokenStream};
use core_types::{DiagnosticKind, Diagnostics};
use std::sync::Arc;

/// Tree-builder knobs. `Default` matches production use.
#[derive(Clone, Copy, Debug)]
pub struct TreeBuilderConfig {
    /// Maximum open-element depth before flattening kicks in.
    pub max_depth: usize,
}

impl Default for TreeBuilderConfig {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

/// The implicit-close rule table.
///
/// `open` is the element currently on top of the stack, `incoming` the
/// start tag being inserted. True means `open` is closed before
/// `incoming` is handled.
fn implicitly_closed_by(open: &str, incoming: &str) -> bool {
    match open {
        "p" => closes_paragraph(incoming),
        "li" => incoming == "li",
        "dt" | "dd" => matches!(incoming, "dt" | "dd"),
        "td" | "th" => matches!(incoming, "td" | "th" | "tr"),
        "tr" => incoming == "tr",
        "option" => incoming == "option",
        _ => false,
    }
}

/// Block-level start tags that close an open paragraph.
fn closes_paragraph(incoming: &str) -> bool {
    if is_heading(incoming) {
        return true;
    }
    matches!(
        incoming,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "div"
            | "dl"
            | "fieldset"
            | "figure"
            | "footer"
            | "header"
            | "hr"
            | "li"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "ul"
    )
}

fn is_heading(name: &str) -> bool {
    let b = name.as_bytes();
    b.len() == 2 && b[0] == b'h' && (b'1'..=b'6').contains(&b[1])
}

/// Elements whose end tag HTML declares optional. Closing one of these
/// implicitly (by an outer end tag or by end of input) is normal
/// structure, not a repair, and is not diagnosed.
fn end_tag_is_optional(name: &str) -> bool {
    matches!(
        name,
        "p" | "li" | "dt" | "dd" | "td" | "th" | "tr" | "option" | "tbody" | "thead" | "tfoot"
            | "html" | "head" | "body"
    )
}

struct OpenElement {
    name: Arc<str>,
    attributes: Vec<(String, Option<String>)>,
    children: Vec<Node>,
}

struct Builder {
    stack: Vec<OpenElement>,
    root_children: Vec<Node>,
    doctype: Option<String>,
}

impl Builder {
    fn new() -> Self {
        Self {
            stack: Vec::new(),
            root_children: Vec::new(),
            doctype: None,
        }
    }

    fn current_children(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(open) => &mut open.children,
            None => &mut self.root_children,
        }
    }

    fn append(&mut self, node: Node) {
        let children = self.current_children();
        if let (Node::Text { text }, Some(Node::Text { text: prev })) =
            (&node, children.last_mut())
        {
            prev.push_str(text);
            return;
        }
        children.push(node);
    }

    fn close_top(&mut self) {
        let open = self.stack.pop().expect("close_top requires an open element");
        self.append(Node::Element {
            name: open.name,
            attributes: open.attributes,
            children: open.children,
        });
    }

    fn has_open(&self, target: &str) -> bool {
        self.stack.iter().any(|open| &*open.name == target)
    }
}

/// Build a document tree from a token stream.
pub fn build_tree(
    stream: &TokenStream,
    config: &TreeBuilderConfig,
    diags: &mut Diagnostics,
) -> Node {
    let atoms = stream.atoms();
    let mut b = Builder::new();

    for token in stream.tokens() {
        match token {
            Token::Doctype(s) => {
                if b.doctype.is_none() {
                    b.doctype = Some(s.clone());
                }
            }
            Token::Comment(text) => {
                b.append(Node::Comment { text: text.clone() });
            }
            Token::Text(text) => {
                if !text.is_empty() {
                    b.append(Node::Text { text: text.clone() });
                }
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let name = atoms.resolve_arc(*name);

                while let Some(top) = b.stack.last() {
                    if implicitly_closed_by(&top.name, &name) {
                        b.close_top();
                    } else {
                        break;
                    }
                }

                let attributes: Vec<(String, Option<String>)> = attributes
                    .iter()
                    .map(|(k, v)| (atoms.resolve(*k).to_string(), v.clone()))
                    .collect();

                if *self_closing {
                    b.append(Node::Element {
                        name,
                        attributes,
                        children: Vec::new(),
                    });
                } else if b.stack.len() >= config.max_depth {
                    diags.record_about(
                        DiagnosticKind::MalformedMarkup,
                        "element nesting too deep, flattening",
                        name.to_string(),
                    );
                    b.append(Node::Element {
                        name,
                        attributes,
                        children: Vec::new(),
                    });
                } else {
                    b.stack.push(OpenElement {
                        name,
                        attributes,
                        children: Vec::new(),
                    });
                }
            }
            Token::EndTag(name) => {
                let target = atoms.resolve(*name);
                if !b.has_open(target) {
                    diags.record_about(
                        DiagnosticKind::MalformedMarkup,
                        "unmatched end tag ignored",
                        target.to_string(),
                    );
                    continue;
                }
                loop {
                    let top_name = Arc::clone(&b.stack.last().expect("matched above").name);
                    if &*top_name == target {
                        b.close_top();
                        break;
                    }
                    if !end_tag_is_optional(&top_name) {
                        diags.record_about(
                            DiagnosticKind::MalformedMarkup,
                            format!("element implicitly closed by </{target}>"),
                            top_name.to_string(),
                        );
                    }
                    b.close_top();
                }
            }
        }
    }

    while let Some(open) = b.stack.last() {
        if !end_tag_is_optional(&open.name) {
            diags.record_about(
                DiagnosticKind::MalformedMarkup,
                "element not closed at end of input",
                open.name.to_string(),
            );
        }
        b.close_top();
    }

    Node::Document {
        doctype: b.doctype,
        children: b.root_children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn build(input: &str) -> (Node, Diagnostics) {
        let mut diags = Diagnostics::new();
        let stream = tokenize(input, &mut diags);
        let tree = build_tree(&stream, &TreeBuilderConfig::default(), &mut diags);
        (tree, diags)
    }

    fn child_names(node: &Node) -> Vec<&str> {
        node.children()
            .iter()
            .filter_map(|c| c.element_name())
            .collect()
    }

    #[test]
    fn nested_elements_round_trip() {
        let (tree, diags) = build("<div><span>text</span></div>");
        assert!(diags.is_empty());
        let div = &tree.children()[0];
        assert!(div.is_element_named("div"));
        let span = &div.children()[0];
        assert!(span.is_element_named("span"));
        assert_eq!(span.children(), &[Node::Text { text: "text".to_string() }]);
    }

    #[test]
    fn new_paragraph_closes_open_paragraph() {
        let (tree, diags) = build("<p>one<p>two");
        assert_eq!(child_names(&tree), vec!["p", "p"]);
        // Paragraph end tags are optional; nothing here is a repair.
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn block_element_closes_open_paragraph() {
        let (tree, diags) = build("<p>a<div>b</div>");
        assert_eq!(child_names(&tree), vec!["p", "div"]);
        assert!(diags.is_empty());
    }

    #[test]
    fn list_items_close_each_other_within_list() {
        let (tree, _) = build("<ul><li>a<li>b</ul>");
        let ul = &tree.children()[0];
        assert_eq!(child_names(ul), vec!["li", "li"]);
    }

    #[test]
    fn nested_list_keeps_inner_items_inside() {
        let (tree, _) = build("<ul><li>a<ul><li>b</ul></ul>");
        let outer = &tree.children()[0];
        assert_eq!(child_names(outer), vec!["li"]);
        let li = &outer.children()[0];
        let inner_ul = li
            .children()
            .iter()
            .find(|c| c.is_element_named("ul"))
            .expect("inner ul nested in outer li");
        assert_eq!(child_names(inner_ul), vec!["li"]);
    }

    #[test]
    fn table_cells_close_each_other() {
        let (tree, _) = build("<table><tr><td>a<td>b<tr><td>c</table>");
        let table = &tree.children()[0];
        assert_eq!(child_names(table), vec!["tr", "tr"]);
        let first_row = &table.children()[0];
        assert_eq!(child_names(first_row), vec!["td", "td"]);
    }

    #[test]
    fn unmatched_end_tag_is_ignored_with_diagnostic() {
        let (tree, diags) = build("<div>a</span>b</div>");
        let div = &tree.children()[0];
        assert_eq!(div.children(), &[Node::Text { text: "ab".to_string() }]);
        assert!(diags.has_kind(DiagnosticKind::MalformedMarkup));
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn end_tag_closes_intermediate_elements() {
        let (tree, diags) = build("<div><b>x</div>");
        let div = &tree.children()[0];
        assert_eq!(child_names(div), vec!["b"]);
        let closed_b = diags
            .iter()
            .any(|d| d.subject.as_deref() == Some("b") && d.message.contains("</div>"));
        assert!(closed_b, "expected implicit-close diagnostic, got: {diags:?}");
    }

    #[test]
    fn unterminated_elements_auto_close_at_eof() {
        let (tree, diags) = build("<div><span>text");
        let div = &tree.children()[0];
        assert!(div.is_element_named("div"));
        let span = &div.children()[0];
        assert!(span.is_element_named("span"));
        assert_eq!(span.children(), &[Node::Text { text: "text".to_string() }]);
        // one diagnostic per unclosed element
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn consecutive_text_children_merge() {
        let (tree, _) = build("a</i>b");
        assert_eq!(tree.children(), &[Node::Text { text: "ab".to_string() }]);
    }

    #[test]
    fn doctype_is_captured_once() {
        let (tree, _) = build("<!doctype html><p>x</p>");
        let Node::Document { doctype, .. } = &tree else {
            panic!("expected document root");
        };
        assert_eq!(doctype.as_deref(), Some("doctype html"));
    }

    #[test]
    fn depth_limit_flattens_instead_of_nesting() {
        let mut diags = Diagnostics::new();
        let input = "<a1><a2><a3><a4><a5><a6>x";
        let stream = tokenize(input, &mut diags);
        let config = TreeBuilderConfig { max_depth: 4 };
        let tree = build_tree(&stream, &config, &mut diags);

        let mut depth = 0;
        let mut current = &tree;
        loop {
            let elements: Vec<_> = current
                .children()
                .iter()
                .filter(|c| c.element_name().is_some())
                .collect();
            if elements.is_empty() {
                break;
            }
            depth += 1;
            current = elements[0];
        }
        assert_eq!(depth, 5, "four pushed levels plus one flattened leaf");
        assert!(diags.has_kind(DiagnosticKind::MalformedMarkup));
    }

    #[test]
    fn void_elements_become_childless_children() {
        let (tree, diags) = build("<p>a<br>b</p>");
        let p = &tree.children()[0];
        let kinds: Vec<_> = p.children().iter().map(|c| c.element_name()).collect();
        assert_eq!(kinds, vec![None, Some("br"), None]);
        assert!(diags.is_empty());
    }

    #[test]
    fn rebuilding_same_input_is_identical() {
        let input = "<div><p>a<p>b<ul><li>x<li>y</ul></div>";
        let (first, _) = build(input);
        let (second, _) = build(input);
        assert_eq!(first, second);
    }
}
