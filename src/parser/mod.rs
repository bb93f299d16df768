//! Parser for the basic SVG subset

pub mod config;
pub mod document;
pub mod path;
pub(crate) mod scan;

pub use config::{ParseConfig, PathErrorPolicy};
pub use document::{parse, parse_with_config, Document, PathDiagnostic, TextNode};
pub use path::{absolutize, parse_path, PathCommand, PathSegment, PathState, PathToken};
