//! Tree queries used by the conversion pipeline: embedded style text,
//! external stylesheet references, image references, and visible text.

use crate::types::Node;

/// Elements that never contribute runs: document metadata and scripting.
pub fn is_non_rendering_element(name: &str) -> bool {
    name.eq_ignore_ascii_case("head")
        || name.eq_ignore_ascii_case("style")
        || name.eq_ignore_ascii_case("script")
        || name.eq_ignore_ascii_case("title")
        || name.eq_ignore_ascii_case("meta")
        || name.eq_ignore_ascii_case("link")
        || name.eq_ignore_ascii_case("template")
}

/// Concatenate the text content of every `<style>` element, in document
/// order, separated by newlines.
pub fn collect_style_texts(node: &Node, out: &mut String) {
    match node {
        Node::Element { children, .. } if node.is_element_named("style") => {
            for c in children {
                if let Node::Text { text } = c {
                    out.push_str(text);
                    out.push('\n');
                }
            }
        }
        Node::Element { children, .. } | Node::Document { children, .. } => {
            for c in children {
                collect_style_texts(c, out);
            }
        }
        _ => {}
    }
}

/// Collect `<link rel="stylesheet" href="...">` href values in document
/// order.
pub fn collect_stylesheet_hrefs(node: &Node, out: &mut Vec<String>) {
    if let Node::Element { .. } = node {
        if node.is_element_named("link")
            && node.attr_has_token("rel", "stylesheet")
            && let Some(href) = node.attr("href")
        {
            let href = href.trim();
            if !href.is_empty() {
                out.push(href.to_string());
            }
        }
    }
    for c in node.children() {
        collect_stylesheet_hrefs(c, out);
    }
}

/// Collect `<img src="...">` src values in document order.
pub fn collect_image_srcs(node: &Node, out: &mut Vec<String>) {
    if let Node::Element { .. } = node {
        if node.is_element_named("img")
            && let Some(src) = node.attr("src")
        {
            let src = src.trim();
            if !src.is_empty() {
                out.push(src.to_string());
            }
        }
    }
    for c in node.children() {
        collect_image_srcs(c, out);
    }
}

fn is_blockish(name: &str) -> bool {
    let b = name.as_bytes();
    if b.len() == 2 && b[0] == b'h' && (b'1'..=b'6').contains(&b[1]) {
        return true;
    }
    matches!(
        name,
        "p" | "div"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "blockquote"
            | "pre"
            | "ul"
            | "ol"
            | "li"
            | "table"
            | "tr"
            | "td"
            | "th"
            | "br"
            | "hr"
    )
}

/// Collect the visible text of a tree, whitespace-collapsed: runs of
/// whitespace become single spaces, leading/trailing whitespace per
/// block is dropped, and non-rendering subtrees are skipped. This is
/// the plain-text shadow of the run sequence.
pub fn collect_text_collapsed(root: &Node) -> String {
    fn walk(node: &Node, out: &mut String, pending: &mut bool) {
        match node {
            Node::Text { text } => {
                let mut words = text.split_whitespace();
                let Some(first) = words.next() else {
                    if !text.is_empty() {
                        *pending = true;
                    }
                    return;
                };
                let leading = text.chars().next().is_some_and(char::is_whitespace);
                if !out.is_empty() && (*pending || leading) {
                    out.push(' ');
                }
                out.push_str(first);
                for word in words {
                    out.push(' ');
                    out.push_str(word);
                }
                *pending = text.chars().last().is_some_and(char::is_whitespace);
            }
            Node::Element { name, children, .. } => {
                if is_non_rendering_element(name) {
                    return;
                }
                let blockish = is_blockish(name);
                if blockish {
                    *pending = true;
                }
                for c in children {
                    walk(c, out, pending);
                }
                if blockish {
                    *pending = true;
                }
            }
            Node::Document { children, .. } => {
                for c in children {
                    walk(c, out, pending);
                }
            }
            Node::Comment { .. } => {}
        }
    }

    let mut out = String::new();
    let mut pending = false;
    walk(root, &mut out, &mut pending);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;
    use crate::tree_builder::{TreeBuilderConfig, build_tree};
    use core_types::Diagnostics;

    fn build(input: &str) -> Node {
        let mut diags = Diagnostics::new();
        let stream = tokenize(input, &mut diags);
        build_tree(&stream, &TreeBuilderConfig::default(), &mut diags)
    }

    #[test]
    fn style_texts_concatenate_in_order() {
        let tree = build("<style>p{}</style><div><style>b{}</style></div>");
        let mut out = String::new();
        collect_style_texts(&tree, &mut out);
        assert_eq!(out, "p{}\nb{}\n");
    }

    #[test]
    fn stylesheet_links_require_rel_token() {
        let tree = build(
            r#"<link rel="stylesheet" href="a.css">
               <link rel="icon" href="fav.ico">
               <link rel="preload stylesheet" href="b.css">"#,
        );
        let mut hrefs = Vec::new();
        collect_stylesheet_hrefs(&tree, &mut hrefs);
        assert_eq!(hrefs, vec!["a.css".to_string(), "b.css".to_string()]);
    }

    #[test]
    fn image_srcs_skip_empty_values() {
        let tree = build(r#"<img src="one.png"><img src="  "><img alt=x>"#);
        let mut srcs = Vec::new();
        collect_image_srcs(&tree, &mut srcs);
        assert_eq!(srcs, vec!["one.png".to_string()]);
    }

    #[test]
    fn collapsed_text_joins_words_and_skips_metadata() {
        let tree = build(
            "<head><title>T</title><style>p{}</style></head>\
             <p>  Hello \n  <b>world</b>  </p><script>x()</script>",
        );
        assert_eq!(collect_text_collapsed(&tree), "Hello world");
    }
}
