#![forbid(unsafe_code)]

//! Slopegraph layout and SVG emission.
//!
//! `layout_slopegraph` turns the core pipeline's tables into a fully
//! positioned, serializable layout; `svg::render_svg` emits the SVG
//! document from it. Both are pure and deterministic: same tables and
//! theme, same bytes.

pub mod model;
pub mod slopegraph;
pub mod svg;

pub use slopegraph::layout_slopegraph;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("empty comparison: nothing to plot")]
    EmptyComparison,

    #[error("observation city '{city}' is not part of the comparison pair")]
    UnknownCity { city: String },
}

pub type Result<T> = std::result::Result<T, Error>;
