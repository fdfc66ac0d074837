//! markrun converts HTML with CSS into an ordered sequence of styled
//! text runs plus block-structure markers, for a rendering backend to
//! lay out.
//!
//! The pipeline is tolerant end to end: malformed markup, bad CSS, and
//! missing resources degrade into diagnostics alongside a best-effort
//! result, never an error. Each conversion is an isolated, synchronous,
//! deterministic transform; separate documents can be converted on
//! separate threads without coordination.
//!
//! ```
//! use markrun::{ConvertConfig, NoResources, convert_str};
//!
//! let conversion = convert_str(
//!     r#"<p style="color: red">Hello <b>world</b></p>"#,
//!     &ConvertConfig::default(),
//!     &NoResources,
//! );
//! assert_eq!(conversion.plain_text(), "Hello world");
//! assert!(conversion.diagnostics.is_empty());
//! ```

mod config;
mod default_styles;
mod pipeline;

pub use crate::config::{CancelToken, ConvertConfig};
pub use crate::default_styles::DEFAULT_STYLESHEET;
pub use crate::pipeline::{
    Conversion, ConvertError, NoResources, ResourceResolver, convert_bytes, convert_str,
    convert_with_cancel,
};

pub use core_types::{Diagnostic, DiagnosticKind, ResourceKind};
pub use css::{ComputedStyle, Rgba};
pub use runs::{
    BlockContext, BlockMarker, FontRequest, InlineObject, ObjectKind, OutputItem, RunContent,
    StyleDescriptor, StyledRun, TextDefaults,
};
