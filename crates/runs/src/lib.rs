//! Styled-run emission: the style mapper and the run builder.

mod builder;
mod descriptor;
mod list;
#[cfg(any(test, feature = "run-snapshot"))]
pub mod snapshot;

pub use crate::builder::{
    BlockContext, BlockMarker, InlineObject, ObjectKind, OutputItem, RunContent, StyledRun,
    build_runs,
};
pub use crate::descriptor::{FontRequest, StyleDescriptor, TextDefaults, map_descriptor};
pub use crate::list::marker_label;
