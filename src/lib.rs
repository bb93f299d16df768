//! SVG Basic - replay simple SVG images as drawing primitives
//!
//! This library parses a small subset of SVG (absolute and relative
//! `M`/`L`/`C` paths, text with a transform, and a flat class stylesheet)
//! into a [`Document`], then renders it by driving a host [`Surface`] with
//! lines, curves, polygon fills and text.
//!
//! # Example
//!
//! ```rust
//! use svg_basic::{parse, render, RecordingSurface};
//!
//! let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
//!   <path d="M0 0 L10 10"/>
//! </svg>"#;
//!
//! let doc = parse(svg.as_bytes()).unwrap();
//! let mut surface = RecordingSurface::new();
//! render(&doc, 1.0, &mut surface);
//!
//! assert!(surface.trace().contains("line 0.00 0.00 -> 10.00 10.00"));
//! ```

pub mod error;
pub mod geometry;
pub mod parser;
pub mod renderer;
pub mod style;

pub use error::{ParseError, PathError};
pub use geometry::{Point, TextPlacement};
pub use parser::{
    parse, parse_with_config, Document, ParseConfig, PathCommand, PathDiagnostic,
    PathErrorPolicy, PathSegment, TextNode,
};
pub use renderer::{
    render, render_with_config, ConfigError, DrawCommand, RecordingSurface, RenderConfig,
    Surface,
};
pub use style::{
    Rgb, SkippedRule, StyleAttributes, StyleResolver, StyleSheet, StylesheetError, TextAnchor,
};
