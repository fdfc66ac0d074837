//! The conversion pipeline: markup in, styled runs plus diagnostics out.
//!
//! Content problems never fail a conversion; the only error is
//! caller-initiated cancellation, checked between stages.

use crate::config::{CancelToken, ConvertConfig};
use crate::default_styles::base_stylesheet;
use core_types::{Diagnostic, DiagnosticKind, Diagnostics, ResourceKind};
use css::{ComputedStyle, Stylesheet};
use markup::collect::{collect_image_srcs, collect_style_texts, collect_stylesheet_hrefs};
use markup::{TreeBuilderConfig, build_tree, tokenize};
use runs::{OutputItem, RunContent, StyledRun, TextDefaults, build_runs};
use thiserror::Error;

/// The one fatal path. Malformed content is never fatal (it becomes
/// diagnostics); misuse of the pipeline is unrepresentable by
/// construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("conversion cancelled")]
    Cancelled,
}

/// Source of external resources (stylesheets, images). `load` must not
/// block: return pre-fetched bytes or `None`, and the pipeline emits a
/// `MissingResource` diagnostic and a best-effort result either way.
pub trait ResourceResolver {
    fn load(&self, url: &str, kind: ResourceKind) -> Option<Vec<u8>>;
}

/// Resolver that has nothing; every external reference becomes a
/// `MissingResource` diagnostic.
pub struct NoResources;

impl ResourceResolver for NoResources {
    fn load(&self, _url: &str, _kind: ResourceKind) -> Option<Vec<u8>> {
        None
    }
}

/// Pre-fetched resources keyed by resolved URL. Convenient for callers
/// that fetch everything up front (and for tests).
impl ResourceResolver for std::collections::HashMap<String, Vec<u8>> {
    fn load(&self, url: &str, _kind: ResourceKind) -> Option<Vec<u8>> {
        self.get(url).cloned()
    }
}

/// The conversion result: ordered run/marker sequence plus everything
/// the pipeline recovered from along the way.
#[derive(Clone, Debug, PartialEq)]
pub struct Conversion {
    pub items: Vec<OutputItem>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Conversion {
    /// Concatenated text content of all runs, in order. This is the
    /// plain-text shadow of the document's visible content.
    pub fn plain_text(&self) -> String {
        self.items
            .iter()
            .filter_map(|item| match item {
                OutputItem::Run(StyledRun {
                    content: RunContent::Text(t),
                    ..
                }) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn has_diagnostic(&self, kind: DiagnosticKind) -> bool {
        self.diagnostics.iter().any(|d| d.kind == kind)
    }
}

/// Convert a markup document already decoded to text.
pub fn convert_str(
    input: &str,
    config: &ConvertConfig,
    resolver: &dyn ResourceResolver,
) -> Conversion {
    convert_with_cancel(input, config, resolver, &CancelToken::new())
        .expect("fresh token cannot be cancelled")
}

/// Convert a markup document from bytes, decoding first. `declared`
/// is the transport-level charset label, if any.
pub fn convert_bytes(
    bytes: &[u8],
    declared: Option<&str>,
    config: &ConvertConfig,
    resolver: &dyn ResourceResolver,
) -> Conversion {
    let decoded = tools::decode_document(bytes, declared);
    let mut conversion = convert_str(&decoded.text, config, resolver);
    if decoded.had_errors {
        // Decoding already replaced the bad bytes; surface that it
        // happened in the same channel as other content repairs.
        conversion.diagnostics.insert(
            0,
            Diagnostic {
                kind: DiagnosticKind::MalformedMarkup,
                message: "invalid byte sequences replaced during decoding".to_string(),
                subject: None,
            },
        );
    }
    conversion
}

/// Convert with a cancellation token. Cancellation is only observed
/// between stages; a cancelled call returns `Err(Cancelled)` and drops
/// all intermediate state.
pub fn convert_with_cancel(
    input: &str,
    config: &ConvertConfig,
    resolver: &dyn ResourceResolver,
    cancel: &CancelToken,
) -> Result<Conversion, ConvertError> {
    let mut diags = Diagnostics::new();

    let check = |cancel: &CancelToken| {
        if cancel.is_cancelled() {
            Err(ConvertError::Cancelled)
        } else {
            Ok(())
        }
    };

    check(cancel)?;
    let stream = tokenize(input, &mut diags);

    check(cancel)?;
    let tree_config = TreeBuilderConfig {
        max_depth: config.max_tree_depth,
    };
    let tree = build_tree(&stream, &tree_config, &mut diags);

    check(cancel)?;
    let mut sheet = base_stylesheet(config);
    attach_external_stylesheets(&tree, config, resolver, &mut sheet, &mut diags);
    attach_embedded_styles(&tree, &mut sheet, &mut diags);
    report_missing_images(&tree, config, resolver, &mut diags);

    check(cancel)?;
    let mut base = ComputedStyle::initial();
    base.color = config.default_text_color;
    base.font_size = config.default_font_size;
    let styled = css::resolve_styles(&tree, &sheet, &base, &mut diags);

    check(cancel)?;
    let defaults = TextDefaults {
        font_family: config.default_font_family.clone(),
        text_scale: config.text_scale,
    };
    let items = build_runs(&styled, &defaults, config.base_url.as_ref());

    log::debug!(
        "converted {} bytes of markup into {} items ({} diagnostics)",
        input.len(),
        items.len(),
        diags.len()
    );

    Ok(Conversion {
        items,
        diagnostics: diags.into_vec(),
    })
}

fn resolve_reference(config: &ConvertConfig, raw: &str) -> String {
    match &config.base_url {
        Some(base) => base
            .join(raw)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| raw.to_string()),
        None => raw.to_string(),
    }
}

fn attach_external_stylesheets(
    tree: &markup::Node,
    config: &ConvertConfig,
    resolver: &dyn ResourceResolver,
    sheet: &mut Stylesheet,
    diags: &mut Diagnostics,
) {
    let mut hrefs = Vec::new();
    collect_stylesheet_hrefs(tree, &mut hrefs);
    for href in hrefs {
        let url = resolve_reference(config, &href);
        match resolver.load(&url, ResourceKind::Stylesheet) {
            Some(bytes) => {
                let decoded = tools::decode_document(&bytes, None);
                sheet.merge(css::parse_stylesheet(&decoded.text, diags));
            }
            None => {
                diags.record_about(
                    DiagnosticKind::MissingResource,
                    "external stylesheet unavailable",
                    url,
                );
            }
        }
    }
}

fn attach_embedded_styles(tree: &markup::Node, sheet: &mut Stylesheet, diags: &mut Diagnostics) {
    let mut embedded = String::new();
    collect_style_texts(tree, &mut embedded);
    if !embedded.is_empty() {
        sheet.merge(css::parse_stylesheet(&embedded, diags));
    }
}

/// Images are emitted as deferred placeholder runs either way; this
/// pass only reports which of them the resolver cannot supply.
fn report_missing_images(
    tree: &markup::Node,
    config: &ConvertConfig,
    resolver: &dyn ResourceResolver,
    diags: &mut Diagnostics,
) {
    let mut srcs = Vec::new();
    collect_image_srcs(tree, &mut srcs);
    for src in srcs {
        let url = resolve_reference(config, &src);
        if resolver.load(&url, ResourceKind::Image).is_none() {
            diags.record_about(DiagnosticKind::MissingResource, "image unavailable", url);
        }
    }
}
