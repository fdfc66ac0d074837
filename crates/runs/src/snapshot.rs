//! Stable text rendering of a run sequence, for golden tests.
//!
//! One line per output item. The format is deliberately lossy in the
//! direction of readability: style fields appear only when they differ
//! from the neutral default, so a snapshot diff points straight at the
//! property that changed.

use crate::builder::{BlockContext, BlockMarker, OutputItem, RunContent, StyledRun};
use css::Rgba;
use std::fmt::Write;

pub fn snapshot_runs(items: &[OutputItem]) -> String {
    let mut out = String::new();
    for item in items {
        match item {
            OutputItem::Run(run) => write_run(&mut out, run),
            OutputItem::Marker(marker) => write_marker(&mut out, marker),
        }
        out.push('\n');
    }
    out
}

fn context_name(context: BlockContext) -> String {
    match context {
        BlockContext::Paragraph => "paragraph".to_string(),
        BlockContext::Heading(level) => format!("h{level}"),
        BlockContext::ListItem { depth } => format!("list-item/{depth}"),
        BlockContext::TableCell => "cell".to_string(),
        BlockContext::Preformatted => "pre".to_string(),
        BlockContext::Quote => "quote".to_string(),
    }
}

fn color_hex(c: Rgba) -> String {
    if c.a == 255 {
        format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a)
    }
}

fn write_run(out: &mut String, run: &StyledRun) {
    match &run.content {
        RunContent::Text(text) => {
            let _ = write!(out, "text {:?}", text);
        }
        RunContent::Object(object) => {
            let _ = write!(out, "object {:?}", object.kind);
            if let Some(src) = &object.source {
                let _ = write!(out, " src={src}");
            }
            if let (Some(w), Some(h)) = (object.width, object.height) {
                let _ = write!(out, " {w}x{h}");
            }
        }
    }
    let _ = write!(out, " [{}]", context_name(run.context));

    let style = &run.style;
    let _ = write!(out, " size={}", style.font.size);
    if style.font.weight != 400 {
        let _ = write!(out, " weight={}", style.font.weight);
    }
    if style.font.italic {
        out.push_str(" italic");
    }
    if style.font.small_caps {
        out.push_str(" small-caps");
    }
    if style.color != Rgba::BLACK {
        let _ = write!(out, " color={}", color_hex(style.color));
    }
    if !style.background.is_transparent() {
        let _ = write!(out, " bg={}", color_hex(style.background));
    }
    if style.underline {
        out.push_str(" underline");
    }
    if style.strikethrough {
        out.push_str(" strike");
    }
    if style.letter_spacing != 0.0 {
        let _ = write!(out, " letter={}", style.letter_spacing);
    }
    if style.word_spacing != 0.0 {
        let _ = write!(out, " word={}", style.word_spacing);
    }
    if style.baseline_offset != 0.0 {
        let _ = write!(out, " baseline={}", style.baseline_offset);
    }
    if let Some(link) = &style.link {
        let _ = write!(out, " link={link}");
    }
}

fn write_marker(out: &mut String, marker: &BlockMarker) {
    match marker {
        BlockMarker::ParagraphBreak => out.push('\u{00B6}'),
        BlockMarker::LineBreak => out.push_str("br"),
        BlockMarker::HorizontalRule => out.push_str("hr"),
        BlockMarker::ListStart { ordered, depth } => {
            let kind = if *ordered { "ol" } else { "ul" };
            let _ = write!(out, "list-start {kind} depth={depth}");
        }
        BlockMarker::ListEnd { depth } => {
            let _ = write!(out, "list-end depth={depth}");
        }
        BlockMarker::ItemMarker { label, depth } => {
            let _ = write!(out, "item {label:?} depth={depth}");
        }
        BlockMarker::TableStart => out.push_str("table-start"),
        BlockMarker::RowEnd => out.push_str("row-end"),
        BlockMarker::CellEnd => out.push_str("cell-end"),
        BlockMarker::TableEnd => out.push_str("table-end"),
    }
}
