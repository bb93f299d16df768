//! Structural decode of an SVG buffer into a [`Document`]

use roxmltree::Node;

use crate::error::{ParseError, PathError};
use crate::geometry::TextPlacement;
use crate::parser::config::{ParseConfig, PathErrorPolicy};
use crate::parser::path::{parse_path, PathSegment};
use crate::parser::scan;
use crate::style::{StyleAttributes, StyleSheet};

/// A text element with its derived placement
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    /// Raw `transform` attribute
    pub transform: String,
    /// Non-empty text runs in document order, one per drawn line
    pub lines: Vec<String>,
    pub class: String,
    /// Element-level `style` attribute
    pub style: StyleAttributes,
    pub placement: TextPlacement,
}

impl TextNode {
    pub fn new(transform: &str, lines: Vec<String>, class: &str, style: &str) -> Self {
        Self {
            transform: transform.to_string(),
            lines,
            class: class.to_string(),
            style: StyleAttributes::parse(style),
            placement: TextPlacement::parse(transform),
        }
    }

    /// Class style from the sheet with the element style layered on top
    pub fn effective_style(&self, sheet: &StyleSheet) -> StyleAttributes {
        match sheet.get(&self.class) {
            Some(base) => StyleAttributes::merge(base, &self.style),
            None => self.style.clone(),
        }
    }
}

/// A path dropped under [`PathErrorPolicy::Skip`]
#[derive(Debug, Clone, PartialEq)]
pub struct PathDiagnostic {
    /// Position of the path among all source paths
    pub index: usize,
    pub class: String,
    pub data: String,
    pub error: PathError,
}

/// Parsed basic SVG image
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub width: f64,
    pub height: f64,
    /// Origin offset of the drawing area
    pub x: f64,
    pub y: f64,
    /// One segment list per source path, in document order
    pub paths: Vec<Vec<PathSegment>>,
    pub styles: StyleSheet,
    pub texts: Vec<TextNode>,
    pub diagnostics: Vec<PathDiagnostic>,
}

/// Parse an SVG buffer with the default configuration
pub fn parse(buf: &[u8]) -> Result<Document, ParseError> {
    parse_with_config(buf, &ParseConfig::default())
}

/// Parse an SVG buffer into a [`Document`]
pub fn parse_with_config(buf: &[u8], config: &ParseConfig) -> Result<Document, ParseError> {
    let source = std::str::from_utf8(buf)?;
    let xml = roxmltree::Document::parse(source)?;
    let root = xml.root_element();

    let extent = Extent::from_root(root);
    if !(extent.width > 0.0 && extent.height > 0.0) {
        return Err(ParseError::Extent {
            width: extent.width,
            height: extent.height,
        });
    }

    let mut found = Collected::default();
    found.visit(root);

    let mut styles = StyleSheet::new();
    for (index, css) in found.styles.iter().enumerate() {
        styles
            .add_stylesheet(css)
            .map_err(|source| ParseError::Stylesheet {
                index,
                css: css.clone(),
                source,
            })?;
    }

    let mut paths = Vec::with_capacity(found.paths.len());
    let mut diagnostics = Vec::new();
    for (index, node) in found.paths.iter().enumerate() {
        let data = node.attribute("d").unwrap_or_default();
        let class = node.attribute("class").unwrap_or_default();
        match parse_path(data, class) {
            Ok(segments) => paths.push(segments),
            Err(error) => match config.path_errors {
                PathErrorPolicy::Abort => {
                    return Err(ParseError::Path {
                        index,
                        class: class.to_string(),
                        data: data.to_string(),
                        source: error,
                    });
                }
                PathErrorPolicy::Skip => {
                    tracing::warn!(index, class, %error, "skipping undecodable path");
                    diagnostics.push(PathDiagnostic {
                        index,
                        class: class.to_string(),
                        data: data.to_string(),
                        error,
                    });
                }
            },
        }
    }

    let texts: Vec<TextNode> = found
        .texts
        .iter()
        .map(|node| {
            TextNode::new(
                node.attribute("transform").unwrap_or_default(),
                text_lines(*node),
                node.attribute("class").unwrap_or_default(),
                node.attribute("style").unwrap_or_default(),
            )
        })
        .collect();

    tracing::debug!(
        width = extent.width,
        height = extent.height,
        paths = paths.len(),
        texts = texts.len(),
        selectors = styles.len(),
        skipped = diagnostics.len(),
        "parsed SVG document"
    );

    Ok(Document {
        width: extent.width,
        height: extent.height,
        x: extent.x,
        y: extent.y,
        paths,
        styles,
        texts,
        diagnostics,
    })
}

/// Drawing area of the image
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Extent {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Extent {
    /// `clipPath > rect` when present, else `width`/`height` with `viewBox`
    /// supplying the origin and any missing size.
    fn from_root(root: Node) -> Self {
        let clip_rect = root.descendants().find(|n| {
            is_element(n, "rect") && n.parent_element().map_or(false, |p| is_element(&p, "clipPath"))
        });
        if let Some(rect) = clip_rect {
            return Extent {
                x: number_attr(rect, "x"),
                y: number_attr(rect, "y"),
                width: number_attr(rect, "width"),
                height: number_attr(rect, "height"),
            };
        }

        let view_box: Vec<f64> = root
            .attribute("viewBox")
            .map(|v| scan::decimals(v).take(4).collect())
            .unwrap_or_default();
        let (vx, vy, vw, vh) = match view_box.as_slice() {
            &[x, y, w, h] => (x, y, w, h),
            _ => (0.0, 0.0, 0.0, 0.0),
        };
        Extent {
            x: vx,
            y: vy,
            width: root.attribute("width").and_then(length).unwrap_or(vw),
            height: root.attribute("height").and_then(length).unwrap_or(vh),
        }
    }
}

/// Elements of interest, in document order
#[derive(Default)]
struct Collected<'a, 'input> {
    paths: Vec<Node<'a, 'input>>,
    texts: Vec<Node<'a, 'input>>,
    styles: Vec<String>,
}

impl<'a, 'input> Collected<'a, 'input> {
    fn visit(&mut self, node: Node<'a, 'input>) {
        for child in node.children().filter(|n| n.is_element()) {
            match child.tag_name().name() {
                "path" => self.paths.push(child),
                "text" => self.texts.push(child),
                "g" => self.visit(child),
                "style" => self.styles.push(text_content(child)),
                // only stylesheets are taken from definitions
                "defs" => self.styles.extend(
                    child
                        .descendants()
                        .filter(|n| is_element(n, "style"))
                        .map(text_content),
                ),
                _ => {}
            }
        }
    }
}

fn is_element(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn text_content(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// Trimmed, non-empty text runs and `tspan`s in document order
fn text_lines(node: Node) -> Vec<String> {
    node.children()
        .filter_map(|child| {
            if child.is_text() {
                child.text().map(str::to_string)
            } else if is_element(&child, "tspan") {
                Some(text_content(child))
            } else {
                None
            }
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn length(value: &str) -> Option<f64> {
    value.trim().trim_end_matches("px").trim().parse().ok()
}

fn number_attr(node: Node, name: &str) -> f64 {
    node.attribute(name).and_then(length).unwrap_or(0.0)
}
