//! Run emission: depth-first, pre-order walk of the style tree.
//!
//! The walk keeps a style implicitly through the style tree, a
//! block-context stack, a link stack, and a list-nesting stack. It emits
//! one styled run per contiguous text node (whitespace-collapsed unless
//! `white-space: pre`) interleaved with structural markers so the
//! consumer can reconstruct paragraph, list, and table layout without
//! re-walking the tree.
//!
//! Marker discipline: every marker is itself a block boundary. An
//! explicit `ParagraphBreak` is emitted only between two runs that would
//! otherwise touch; it never appears next to another marker.

use crate::descriptor::{StyleDescriptor, TextDefaults, map_descriptor};
use crate::list::marker_label;
use css::{Display, StyledNode, WhiteSpace};
use markup::Node;
use markup::collect::is_non_rendering_element;
use url::Url;

/// Block-level context a run was emitted under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockContext {
    Paragraph,
    Heading(u8),
    ListItem { depth: u8 },
    TableCell,
    Preformatted,
    Quote,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Image,
    Iframe,
    Video,
}

/// Replaced inline content: layout metadata instead of text.
#[derive(Clone, Debug, PartialEq)]
pub struct InlineObject {
    pub kind: ObjectKind,
    /// Source URL, resolved against the base URL when one is set.
    pub source: Option<String>,
    /// Intrinsic size hint from markup attributes, px.
    pub width: Option<f32>,
    pub height: Option<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RunContent {
    Text(String),
    Object(InlineObject),
}

/// A contiguous span with its fully resolved presentation style.
#[derive(Clone, Debug, PartialEq)]
pub struct StyledRun {
    pub content: RunContent,
    pub style: StyleDescriptor,
    pub context: BlockContext,
}

/// Structural layout hints interleaved with runs.
#[derive(Clone, Debug, PartialEq)]
pub enum BlockMarker {
    /// Separates two adjacent blocks of runs.
    ParagraphBreak,
    /// Explicit line break (`<br>`, or a newline in preformatted text).
    LineBreak,
    HorizontalRule,
    ListStart { ordered: bool, depth: u8 },
    ListEnd { depth: u8 },
    /// Starts one list item; `label` is the formatted marker text.
    ItemMarker { label: String, depth: u8 },
    TableStart,
    RowEnd,
    CellEnd,
    TableEnd,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OutputItem {
    Run(StyledRun),
    Marker(BlockMarker),
}

struct ListState {
    counter: usize,
}

struct Walker<'a> {
    defaults: &'a TextDefaults,
    base_url: Option<&'a Url>,
    items: Vec<OutputItem>,
    contexts: Vec<BlockContext>,
    links: Vec<String>,
    lists: Vec<ListState>,
    /// A paragraph break is owed before the next run.
    pending_break: bool,
    /// Collapsed trailing whitespace is owed before the next word.
    pending_space: bool,
    /// A run has been emitted since the last block boundary.
    line_has_content: bool,
}

/// Walk a style tree and emit the ordered run/marker sequence.
pub fn build_runs(
    root: &StyledNode<'_>,
    defaults: &TextDefaults,
    base_url: Option<&Url>,
) -> Vec<OutputItem> {
    let mut walker = Walker {
        defaults,
        base_url,
        items: Vec::new(),
        contexts: Vec::new(),
        links: Vec::new(),
        lists: Vec::new(),
        pending_break: false,
        pending_space: false,
        line_has_content: false,
    };
    walker.walk(root);
    walker.items
}

impl<'a> Walker<'a> {
    fn context(&self) -> BlockContext {
        self.contexts.last().copied().unwrap_or(BlockContext::Paragraph)
    }

    fn descriptor(&self, style: &css::ComputedStyle) -> StyleDescriptor {
        map_descriptor(style, self.defaults, self.links.last().map(String::as_str))
    }

    fn resolve_url(&self, raw: &str) -> String {
        match self.base_url {
            Some(base) => base
                .join(raw)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| raw.to_string()),
            None => raw.to_string(),
        }
    }

    fn reset_line(&mut self) {
        self.pending_space = false;
        self.line_has_content = false;
    }

    /// Entering or leaving a block-level element: owe a break if runs
    /// would otherwise touch, and start a fresh line.
    fn block_boundary(&mut self) {
        if matches!(self.items.last(), Some(OutputItem::Run(_))) {
            self.pending_break = true;
        }
        self.reset_line();
    }

    fn flush_break(&mut self) {
        if self.pending_break {
            self.items.push(OutputItem::Marker(BlockMarker::ParagraphBreak));
            self.pending_break = false;
        }
    }

    /// Markers are block boundaries themselves; an owed paragraph break
    /// is dropped, not emitted next to them.
    fn push_marker(&mut self, marker: BlockMarker) {
        self.pending_break = false;
        self.items.push(OutputItem::Marker(marker));
        self.reset_line();
    }

    fn push_run(&mut self, content: RunContent, style: &css::ComputedStyle) {
        self.flush_break();
        let run = StyledRun {
            content,
            style: self.descriptor(style),
            context: self.context(),
        };
        self.items.push(OutputItem::Run(run));
        self.line_has_content = true;
    }

    fn walk(&mut self, styled: &StyledNode<'_>) {
        match styled.node {
            Node::Document { .. } => {
                for child in &styled.children {
                    self.walk(child);
                }
            }
            Node::Text { text } => self.emit_text(text, styled),
            Node::Comment { .. } => {}
            Node::Element { name, .. } => self.walk_element(name, styled),
        }
    }

    fn walk_element(&mut self, name: &str, styled: &StyledNode<'_>) {
        if is_non_rendering_element(name) || styled.style.display == Display::None {
            return;
        }

        match name {
            "br" => {
                self.push_marker(BlockMarker::LineBreak);
                return;
            }
            "hr" => {
                self.push_marker(BlockMarker::HorizontalRule);
                return;
            }
            "img" => {
                self.emit_object(styled, ObjectKind::Image);
                return;
            }
            "iframe" => {
                // Fallback children are not rendered when the frame is.
                self.emit_object(styled, ObjectKind::Iframe);
                return;
            }
            "video" => {
                self.emit_object(styled, ObjectKind::Video);
                return;
            }
            "ul" | "ol" => {
                self.block_boundary();
                let depth = (self.lists.len() + 1).min(u8::MAX as usize) as u8;
                self.push_marker(BlockMarker::ListStart {
                    ordered: name == "ol",
                    depth,
                });
                self.lists.push(ListState { counter: 0 });
                for child in &styled.children {
                    self.walk(child);
                }
                self.lists.pop();
                self.push_marker(BlockMarker::ListEnd { depth });
                self.block_boundary();
                return;
            }
            "li" => {
                let depth = self.lists.len().max(1).min(u8::MAX as usize) as u8;
                let counter = match self.lists.last_mut() {
                    Some(list) => {
                        list.counter += 1;
                        list.counter
                    }
                    // List item outside any list: tolerated as a
                    // one-item line.
                    None => 1,
                };
                match marker_label(styled.style.list_style_type, counter) {
                    Some(label) => self.push_marker(BlockMarker::ItemMarker { label, depth }),
                    None => {
                        self.pending_break = false;
                        self.reset_line();
                    }
                }
                self.contexts.push(BlockContext::ListItem { depth });
                for child in &styled.children {
                    self.walk(child);
                }
                self.contexts.pop();
                self.block_boundary();
                return;
            }
            "table" => {
                self.block_boundary();
                self.push_marker(BlockMarker::TableStart);
                for child in &styled.children {
                    self.walk(child);
                }
                self.push_marker(BlockMarker::TableEnd);
                self.block_boundary();
                return;
            }
            "tr" => {
                for child in &styled.children {
                    self.walk(child);
                }
                self.push_marker(BlockMarker::RowEnd);
                return;
            }
            "td" | "th" => {
                self.contexts.push(BlockContext::TableCell);
                for child in &styled.children {
                    self.walk(child);
                }
                self.contexts.pop();
                self.push_marker(BlockMarker::CellEnd);
                return;
            }
            "a" => {
                let pushed = match styled.node.attr("href") {
                    Some(href) if !href.trim().is_empty() => {
                        let resolved = self.resolve_url(href.trim());
                        self.links.push(resolved);
                        true
                    }
                    _ => false,
                };
                for child in &styled.children {
                    self.walk(child);
                }
                if pushed {
                    self.links.pop();
                }
                return;
            }
            _ => {}
        }

        let block = matches!(styled.style.display, Display::Block | Display::ListItem);
        if block {
            self.block_boundary();
        }

        let pushed_context = match name {
            "pre" => Some(BlockContext::Preformatted),
            "blockquote" => Some(BlockContext::Quote),
            _ => heading_level(name).map(BlockContext::Heading),
        };
        if let Some(ctx) = pushed_context {
            self.contexts.push(ctx);
        }

        for child in &styled.children {
            self.walk(child);
        }

        if pushed_context.is_some() {
            self.contexts.pop();
        }
        if block {
            self.block_boundary();
        }
    }

    fn emit_text(&mut self, text: &str, styled: &StyledNode<'_>) {
        if styled.style.white_space == WhiteSpace::Pre {
            self.emit_preformatted(text, styled);
            return;
        }

        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            if self.line_has_content && !text.is_empty() {
                self.pending_space = true;
            }
            return;
        }

        let leading = text.chars().next().is_some_and(char::is_whitespace);
        let trailing = text.chars().last().is_some_and(char::is_whitespace);

        let mut span = String::new();
        if self.line_has_content && (self.pending_space || leading) {
            span.push(' ');
        }
        span.push_str(&words.join(" "));

        self.push_run(RunContent::Text(span), &styled.style);
        self.pending_space = trailing;
    }

    fn emit_preformatted(&mut self, text: &str, styled: &StyledNode<'_>) {
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                self.push_marker(BlockMarker::LineBreak);
            }
            let segment = segment.strip_suffix('\r').unwrap_or(segment);
            if !segment.is_empty() {
                self.push_run(RunContent::Text(segment.to_string()), &styled.style);
            }
        }
        self.pending_space = false;
    }

    fn emit_object(&mut self, styled: &StyledNode<'_>, kind: ObjectKind) {
        let source = styled
            .node
            .attr("src")
            .map(|s| self.resolve_url(s.trim()));
        let width = styled
            .node
            .attr("width")
            .and_then(|v| v.trim().parse::<f32>().ok());
        let height = styled
            .node
            .attr("height")
            .and_then(|v| v.trim().parse::<f32>().ok());
        self.push_run(
            RunContent::Object(InlineObject {
                kind,
                source,
                width,
                height,
            }),
            &styled.style,
        );
    }
}

fn heading_level(name: &str) -> Option<u8> {
    let b = name.as_bytes();
    if b.len() == 2 && b[0] == b'h' && (b'1'..=b'6').contains(&b[1]) {
        Some(b[1] - b'0')
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TextDefaults;
    use core_types::Diagnostics;
    use css::{ComputedStyle, Rgba, parse_stylesheet, resolve_styles};
    use markup::{TreeBuilderConfig, build_tree, tokenize};

    fn runs_for(html: &str, sheet: &str) -> Vec<OutputItem> {
        runs_with_base(html, sheet, None)
    }

    fn runs_with_base(html: &str, sheet: &str, base: Option<&str>) -> Vec<OutputItem> {
        let mut diags = Diagnostics::new();
        let stream = tokenize(html, &mut diags);
        let tree = build_tree(&stream, &TreeBuilderConfig::default(), &mut diags);
        let sheet = parse_stylesheet(sheet, &mut diags);
        let styled = resolve_styles(&tree, &sheet, &ComputedStyle::initial(), &mut diags);
        let base = base.map(|b| Url::parse(b).unwrap());
        build_runs(&styled, &TextDefaults::default(), base.as_ref())
    }

    fn text_runs(items: &[OutputItem]) -> Vec<&StyledRun> {
        items
            .iter()
            .filter_map(|i| match i {
                OutputItem::Run(r) if matches!(r.content, RunContent::Text(_)) => Some(r),
                _ => None,
            })
            .collect()
    }

    fn joined_text(items: &[OutputItem]) -> String {
        items
            .iter()
            .filter_map(|i| match i {
                OutputItem::Run(StyledRun {
                    content: RunContent::Text(t),
                    ..
                }) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn inherited_color_and_bold_yield_one_run() {
        let items = runs_for(
            r#"<p style="color: red"><b>x</b></p>"#,
            "b { font-weight: bold }",
        );
        let runs = text_runs(&items);
        assert_eq!(runs.len(), 1);
        let run = runs[0];
        assert_eq!(run.content, RunContent::Text("x".to_string()));
        assert_eq!(run.style.color, Rgba::opaque(255, 0, 0));
        assert_eq!(run.style.font.weight, 700);
        assert_eq!(run.context, BlockContext::Paragraph);
    }

    #[test]
    fn whitespace_collapses_across_inline_boundaries() {
        let items = runs_for("<p>  Hello \n  <b>world</b>  </p>", "");
        assert_eq!(joined_text(&items), "Hello world");
    }

    #[test]
    fn paragraphs_are_separated_by_one_break() {
        let items = runs_for("<p>one</p><p>two</p>", "");
        let expect_break = items
            .iter()
            .filter(|i| matches!(i, OutputItem::Marker(BlockMarker::ParagraphBreak)))
            .count();
        assert_eq!(expect_break, 1);
        assert_eq!(joined_text(&items), "onetwo");
        assert!(matches!(
            items[1],
            OutputItem::Marker(BlockMarker::ParagraphBreak)
        ));
    }

    #[test]
    fn line_break_element_emits_marker_and_resets_spacing() {
        let items = runs_for("<p>a<br>  b</p>", "");
        assert_eq!(items.len(), 3);
        assert!(matches!(items[1], OutputItem::Marker(BlockMarker::LineBreak)));
        let runs = text_runs(&items);
        assert_eq!(runs[0].content, RunContent::Text("a".to_string()));
        // leading whitespace after a line break is dropped
        assert_eq!(runs[1].content, RunContent::Text("b".to_string()));
    }

    #[test]
    fn ordered_list_emits_counted_markers() {
        let items = runs_for(
            "<ol><li>first</li><li>second</li></ol>",
            "ol { list-style-type: decimal }",
        );
        let labels: Vec<&str> = items
            .iter()
            .filter_map(|i| match i {
                OutputItem::Marker(BlockMarker::ItemMarker { label, .. }) => {
                    Some(label.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["1.", "2."]);
        assert!(matches!(
            items[0],
            OutputItem::Marker(BlockMarker::ListStart { ordered: true, depth: 1 })
        ));
        assert!(matches!(
            items.last(),
            Some(OutputItem::Marker(BlockMarker::ListEnd { depth: 1 }))
        ));
    }

    #[test]
    fn nested_lists_carry_depth_in_markers_and_context() {
        let items = runs_for(
            "<ul><li>a<ul><li>b</li></ul></li></ul>",
            "ul { list-style-type: disc }",
        );
        let depths: Vec<u8> = items
            .iter()
            .filter_map(|i| match i {
                OutputItem::Marker(BlockMarker::ItemMarker { depth, .. }) => Some(*depth),
                _ => None,
            })
            .collect();
        assert_eq!(depths, vec![1, 2]);
        let runs = text_runs(&items);
        assert_eq!(runs[0].context, BlockContext::ListItem { depth: 1 });
        assert_eq!(runs[1].context, BlockContext::ListItem { depth: 2 });
    }

    #[test]
    fn table_walk_emits_cell_and_row_markers() {
        let items = runs_for(
            "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table>",
            "",
        );
        let shape: Vec<&str> = items
            .iter()
            .map(|i| match i {
                OutputItem::Run(_) => "run",
                OutputItem::Marker(BlockMarker::TableStart) => "table",
                OutputItem::Marker(BlockMarker::CellEnd) => "cell",
                OutputItem::Marker(BlockMarker::RowEnd) => "row",
                OutputItem::Marker(BlockMarker::TableEnd) => "end",
                _ => "?",
            })
            .collect();
        assert_eq!(
            shape,
            vec![
                "table", "run", "cell", "run", "cell", "row", "run", "cell", "row", "end"
            ]
        );
        let runs = text_runs(&items);
        assert!(runs.iter().all(|r| r.context == BlockContext::TableCell));
    }

    #[test]
    fn image_emits_placeholder_with_intrinsic_size() {
        let items = runs_with_base(
            r#"<p><img src="pic.png" width="120" height="80"></p>"#,
            "",
            Some("https://host.example/dir/page.html"),
        );
        let object = items
            .iter()
            .find_map(|i| match i {
                OutputItem::Run(StyledRun {
                    content: RunContent::Object(o),
                    ..
                }) => Some(o),
                _ => None,
            })
            .expect("placeholder run");
        assert_eq!(object.kind, ObjectKind::Image);
        assert_eq!(
            object.source.as_deref(),
            Some("https://host.example/dir/pic.png")
        );
        assert_eq!(object.width, Some(120.0));
        assert_eq!(object.height, Some(80.0));
    }

    #[test]
    fn links_resolve_against_base_and_attach_to_runs() {
        let items = runs_with_base(
            r#"<p><a href="/docs">read</a> more</p>"#,
            "",
            Some("https://host.example/dir/page.html"),
        );
        let runs = text_runs(&items);
        assert_eq!(runs[0].style.link.as_deref(), Some("https://host.example/docs"));
        assert_eq!(runs[1].style.link, None);
    }

    #[test]
    fn preformatted_text_keeps_whitespace_and_breaks_lines() {
        let items = runs_for(
            "<pre>first  line\n  second</pre>",
            "pre { white-space: pre }",
        );
        let runs = text_runs(&items);
        assert_eq!(runs[0].content, RunContent::Text("first  line".to_string()));
        assert_eq!(runs[1].content, RunContent::Text("  second".to_string()));
        assert_eq!(runs[0].context, BlockContext::Preformatted);
        assert!(
            items
                .iter()
                .any(|i| matches!(i, OutputItem::Marker(BlockMarker::LineBreak)))
        );
    }

    #[test]
    fn display_none_subtrees_and_metadata_are_skipped() {
        let items = runs_for(
            r#"<head><title>T</title></head><p>seen<span style="display: none">hidden</span></p>"#,
            "",
        );
        assert_eq!(joined_text(&items), "seen");
    }

    #[test]
    fn heading_context_carries_level() {
        let items = runs_for("<h2>title</h2>", "");
        let runs = text_runs(&items);
        assert_eq!(runs[0].context, BlockContext::Heading(2));
    }

    #[test]
    fn run_emission_is_deterministic() {
        let html = r#"<div><p>a <b>b</b></p><ul><li>x</li></ul><img src="i.png"></div>"#;
        let first = runs_for(html, "b { font-weight: bold }");
        let second = runs_for(html, "b { font-weight: bold }");
        assert_eq!(first, second);
    }
}
