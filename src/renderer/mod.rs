//! Renderer that replays a parsed document as drawing primitives
//!
//! This module takes a [`Document`](crate::Document) and drives a
//! [`Surface`] with lines, curves, polygon fills and text.

pub mod config;
pub mod surface;
pub mod write;

pub use config::{ConfigError, RenderConfig};
pub use surface::{DrawCommand, RecordingSurface, Surface};
pub use write::{render, render_with_config};
