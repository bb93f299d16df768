//! Drawing surface abstraction
//!
//! The renderer never draws pixels or PDF operators itself. It drives a
//! [`Surface`], which owns the cursor, the current colours and widths, and
//! an error latch. [`RecordingSurface`] is an in-memory implementation that
//! records every call, used by the command line tool and the tests.

use std::fmt;

use crate::geometry::Point;
use crate::style::Rgb;

/// A host that accepts drawing primitives.
///
/// Once [`set_error`](Surface::set_error) has been called, [`ok`](Surface::ok)
/// returns `false` and implementations are expected to ignore further
/// drawing calls.
pub trait Surface {
    /// Current cursor position
    fn xy(&self) -> Point;
    fn set_xy(&mut self, at: Point);

    fn line(&mut self, from: Point, to: Point);
    /// Cubic Bézier from `from` to `to` with control points `c1` and `c2`
    fn curve(&mut self, from: Point, c1: Point, c2: Point, to: Point);
    /// Fill (without outlining) the polygon through `points`
    fn polygon_fill(&mut self, points: &[Point]);

    fn set_draw_color(&mut self, color: Rgb);
    fn set_fill_color(&mut self, color: Rgb);
    fn fill_color(&self) -> Rgb;
    fn set_text_color(&mut self, color: Rgb);
    fn set_line_width(&mut self, width: f64);
    fn line_width(&self) -> f64;
    fn set_font_size(&mut self, size: f64);
    fn font_size(&self) -> f64;
    fn set_bold(&mut self, bold: bool);
    fn set_alpha(&mut self, alpha: f64);

    /// Width of `text` in the current font
    fn string_width(&self, text: &str) -> f64;
    /// Draw `text` with its baseline starting at `at`
    fn text(&mut self, at: Point, text: &str);

    fn transform_begin(&mut self);
    fn transform_translate(&mut self, dx: f64, dy: f64);
    /// Rotate clockwise by `angle` degrees around `center`
    fn transform_rotate(&mut self, angle: f64, center: Point);
    fn transform_end(&mut self);

    fn ok(&self) -> bool;
    /// Latch an error; only the first one is kept
    fn set_error(&mut self, message: String);
}

/// A single call recorded by [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    MoveTo(Point),
    Line { from: Point, to: Point },
    Curve { from: Point, c1: Point, c2: Point, to: Point },
    PolygonFill(Vec<Point>),
    DrawColor(Rgb),
    FillColor(Rgb),
    TextColor(Rgb),
    LineWidth(f64),
    FontSize(f64),
    Bold(bool),
    Alpha(f64),
    Text { at: Point, text: String },
    TransformBegin,
    Translate { dx: f64, dy: f64 },
    Rotate { angle: f64, center: Point },
    TransformEnd,
}

impl fmt::Display for DrawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawCommand::MoveTo(at) => write!(f, "move {}", at),
            DrawCommand::Line { from, to } => write!(f, "line {} -> {}", from, to),
            DrawCommand::Curve { from, c1, c2, to } => {
                write!(f, "curve {} [{} | {}] -> {}", from, c1, c2, to)
            }
            DrawCommand::PolygonFill(points) => {
                write!(f, "polygon")?;
                for (i, point) in points.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{}{}", sep, point)?;
                }
                Ok(())
            }
            DrawCommand::DrawColor(color) => write!(f, "draw-color {}", color),
            DrawCommand::FillColor(color) => write!(f, "fill-color {}", color),
            DrawCommand::TextColor(color) => write!(f, "text-color {}", color),
            DrawCommand::LineWidth(width) => write!(f, "line-width {:.3}", width),
            DrawCommand::FontSize(size) => write!(f, "font-size {:.2}", size),
            DrawCommand::Bold(bold) => write!(f, "bold {}", bold),
            DrawCommand::Alpha(alpha) => write!(f, "alpha {:.2}", alpha),
            DrawCommand::Text { at, text } => write!(f, "text {} {:?}", at, text),
            DrawCommand::TransformBegin => write!(f, "transform-begin"),
            DrawCommand::Translate { dx, dy } => write!(f, "translate {:.2} {:.2}", dx, dy),
            DrawCommand::Rotate { angle, center } => {
                write!(f, "rotate {:.2} around {}", angle, center)
            }
            DrawCommand::TransformEnd => write!(f, "transform-end"),
        }
    }
}

/// Average glyph advance as a fraction of the font size
pub const DEFAULT_GLYPH_ADVANCE: f64 = 0.5;

/// In-memory surface that records every drawing call.
///
/// Strings are measured as `chars × font size × glyph advance`, which keeps
/// text placement deterministic without any font metrics.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    cursor: Point,
    draw_color: Rgb,
    fill_color: Rgb,
    text_color: Rgb,
    line_width: f64,
    font_size: f64,
    bold: bool,
    alpha: f64,
    glyph_advance: f64,
    transform_depth: usize,
    error: Option<String>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            cursor: Point::default(),
            draw_color: Rgb::BLACK,
            fill_color: Rgb::BLACK,
            text_color: Rgb::BLACK,
            line_width: 0.2,
            font_size: 12.0,
            bold: false,
            alpha: 1.0,
            glyph_advance: DEFAULT_GLYPH_ADVANCE,
            transform_depth: 0,
            error: None,
        }
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the cursor at `origin`
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.cursor = origin;
        self
    }

    /// Start with a specific fill colour
    pub fn with_fill_color(mut self, color: Rgb) -> Self {
        self.fill_color = color;
        self
    }

    /// Set the glyph advance used by [`Surface::string_width`]
    pub fn with_glyph_advance(mut self, advance: f64) -> Self {
        self.glyph_advance = advance;
        self
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    /// The latched error, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn draw_color(&self) -> Rgb {
        self.draw_color
    }

    pub fn text_color(&self) -> Rgb {
        self.text_color
    }

    pub fn bold(&self) -> bool {
        self.bold
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Number of open transform scopes
    pub fn transform_depth(&self) -> usize {
        self.transform_depth
    }

    /// One line per recorded command
    pub fn trace(&self) -> String {
        let mut out = String::new();
        for command in &self.commands {
            out.push_str(&command.to_string());
            out.push('\n');
        }
        out
    }

    fn record(&mut self, command: DrawCommand) -> bool {
        if self.error.is_some() {
            return false;
        }
        self.commands.push(command);
        true
    }
}

impl Surface for RecordingSurface {
    fn xy(&self) -> Point {
        self.cursor
    }

    fn set_xy(&mut self, at: Point) {
        if self.record(DrawCommand::MoveTo(at)) {
            self.cursor = at;
        }
    }

    fn line(&mut self, from: Point, to: Point) {
        self.record(DrawCommand::Line { from, to });
    }

    fn curve(&mut self, from: Point, c1: Point, c2: Point, to: Point) {
        self.record(DrawCommand::Curve { from, c1, c2, to });
    }

    fn polygon_fill(&mut self, points: &[Point]) {
        self.record(DrawCommand::PolygonFill(points.to_vec()));
    }

    fn set_draw_color(&mut self, color: Rgb) {
        if self.record(DrawCommand::DrawColor(color)) {
            self.draw_color = color;
        }
    }

    fn set_fill_color(&mut self, color: Rgb) {
        if self.record(DrawCommand::FillColor(color)) {
            self.fill_color = color;
        }
    }

    fn fill_color(&self) -> Rgb {
        self.fill_color
    }

    fn set_text_color(&mut self, color: Rgb) {
        if self.record(DrawCommand::TextColor(color)) {
            self.text_color = color;
        }
    }

    fn set_line_width(&mut self, width: f64) {
        if self.record(DrawCommand::LineWidth(width)) {
            self.line_width = width;
        }
    }

    fn line_width(&self) -> f64 {
        self.line_width
    }

    fn set_font_size(&mut self, size: f64) {
        if self.record(DrawCommand::FontSize(size)) {
            self.font_size = size;
        }
    }

    fn font_size(&self) -> f64 {
        self.font_size
    }

    fn set_bold(&mut self, bold: bool) {
        if self.record(DrawCommand::Bold(bold)) {
            self.bold = bold;
        }
    }

    fn set_alpha(&mut self, alpha: f64) {
        if self.record(DrawCommand::Alpha(alpha)) {
            self.alpha = alpha;
        }
    }

    fn string_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.font_size * self.glyph_advance
    }

    fn text(&mut self, at: Point, text: &str) {
        self.record(DrawCommand::Text {
            at,
            text: text.to_string(),
        });
    }

    fn transform_begin(&mut self) {
        if self.record(DrawCommand::TransformBegin) {
            self.transform_depth += 1;
        }
    }

    fn transform_translate(&mut self, dx: f64, dy: f64) {
        self.record(DrawCommand::Translate { dx, dy });
    }

    fn transform_rotate(&mut self, angle: f64, center: Point) {
        self.record(DrawCommand::Rotate { angle, center });
    }

    fn transform_end(&mut self) {
        if self.transform_depth == 0 {
            self.set_error("transform end without matching begin".to_string());
            return;
        }
        if self.record(DrawCommand::TransformEnd) {
            self.transform_depth -= 1;
        }
    }

    fn ok(&self) -> bool {
        self.error.is_none()
    }

    fn set_error(&mut self, message: String) {
        if self.error.is_none() {
            tracing::debug!(%message, "surface error latched");
            self.error = Some(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_records_calls_in_order() {
        let mut surface = RecordingSurface::new();
        surface.set_xy(Point::new(1.0, 2.0));
        surface.line(Point::new(1.0, 2.0), Point::new(3.0, 4.0));
        surface.set_draw_color(Rgb::new(255, 0, 0));

        assert_eq!(
            surface.commands(),
            &[
                DrawCommand::MoveTo(Point::new(1.0, 2.0)),
                DrawCommand::Line {
                    from: Point::new(1.0, 2.0),
                    to: Point::new(3.0, 4.0)
                },
                DrawCommand::DrawColor(Rgb::new(255, 0, 0)),
            ]
        );
        assert_eq!(surface.xy(), Point::new(1.0, 2.0));
        assert_eq!(surface.draw_color(), Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_error_latch_ignores_later_calls() {
        let mut surface = RecordingSurface::new();
        surface.set_xy(Point::new(1.0, 1.0));
        surface.set_error("first".to_string());
        surface.set_error("second".to_string());
        surface.set_xy(Point::new(5.0, 5.0));
        surface.line(Point::default(), Point::new(1.0, 0.0));

        assert!(!surface.ok());
        assert_eq!(surface.error(), Some("first"));
        assert_eq!(surface.commands().len(), 1);
        assert_eq!(surface.xy(), Point::new(1.0, 1.0));
    }

    #[test]
    fn test_string_width_uses_font_size() {
        let mut surface = RecordingSurface::new().with_glyph_advance(0.5);
        surface.set_font_size(4.0);
        assert_eq!(surface.string_width("abcd"), 8.0);
        assert_eq!(surface.string_width(""), 0.0);
    }

    #[test]
    fn test_unbalanced_transform_end_latches_error() {
        let mut surface = RecordingSurface::new();
        surface.transform_begin();
        surface.transform_translate(1.0, 2.0);
        surface.transform_end();
        assert!(surface.ok());
        assert_eq!(surface.transform_depth(), 0);

        surface.transform_end();
        assert!(!surface.ok());
    }

    #[test]
    fn test_trace_format() {
        let mut surface = RecordingSurface::new();
        surface.set_line_width(0.1);
        surface.curve(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        );
        surface.polygon_fill(&[Point::new(0.0, 0.0), Point::new(2.0, 0.0)]);
        surface.text(Point::new(1.5, 2.0), "hi");

        assert_eq!(
            surface.trace(),
            "line-width 0.100\n\
             curve 0.00 0.00 [1.00 0.00 | 1.00 1.00] -> 0.00 1.00\n\
             polygon 0.00 0.00, 2.00 0.00\n\
             text 1.50 2.00 \"hi\"\n"
        );
    }
}
