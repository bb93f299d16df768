//! End-to-end tests: parse a document and replay it onto a recording surface

use pretty_assertions::assert_eq;
use svg_basic::{
    parse, render, render_with_config, DrawCommand, Point, RecordingSurface, RenderConfig, Rgb,
    Surface,
};

const BADGE: &str = r##"<svg width="50" height="40">
  <defs><style>
    .edge { stroke: #336699; stroke-width: 2px }
    text.note { fill: #cc0000 }
  </style></defs>
  <path class="edge" d="M0 0 l10 0 0 10 z"/>
  <text class="note" transform="matrix(1 0 0 1 5 30)">hi</text>
</svg>"##;

#[test]
fn test_badge_trace() {
    let doc = parse(BADGE.as_bytes()).expect("Should parse");
    let mut surface = RecordingSurface::new();
    render(&doc, 1.0, &mut surface);

    assert!(surface.ok());
    insta::assert_snapshot!(surface.trace().trim_end(), @r###"
    draw-color #336699
    line-width 0.200
    alpha 1.00
    move 0.00 0.00
    line 0.00 0.00 -> 10.00 0.00
    line 10.00 0.00 -> 10.00 10.00
    polygon 0.00 0.00, 10.00 0.00, 10.00 10.00
    fill-color #cc0000
    text-color #cc0000
    bold false
    alpha 1.00
    font-size 4.00
    text 5.00 30.00 "hi"
    "###);
}

#[test]
fn test_scale_and_origin() {
    let doc = parse(BADGE.as_bytes()).expect("Should parse");
    let mut surface = RecordingSurface::new().with_origin(Point::new(100.0, 200.0));
    render(&doc, 2.0, &mut surface);

    let lines: Vec<(Point, Point)> = surface
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Line { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        lines,
        vec![
            (Point::new(100.0, 200.0), Point::new(120.0, 200.0)),
            (Point::new(120.0, 200.0), Point::new(120.0, 220.0)),
        ]
    );

    // text anchors are scaled but not offset
    let text = surface
        .commands()
        .iter()
        .find_map(|c| match c {
            DrawCommand::Text { at, .. } => Some(*at),
            _ => None,
        });
    assert_eq!(text, Some(Point::new(10.0, 60.0)));
}

#[test]
fn test_config_scales_widths_and_fonts() {
    let doc = parse(BADGE.as_bytes()).expect("Should parse");
    let config = RenderConfig::new()
        .with_base_line_width(0.5)
        .with_base_font_size(10.0);
    let mut surface = RecordingSurface::new();
    render_with_config(&doc, 1.0, &mut surface, &config);

    assert_eq!(surface.line_width(), 1.0);
    assert_eq!(surface.font_size(), 10.0);
}

#[test]
fn test_dashed_guide() {
    let svg = r#"<svg width="20" height="20">
  <style>.guide { stroke-dasharray: 6 12 }</style>
  <path class="guide" d="M0 0 L0 7"/>
</svg>"#;
    let doc = parse(svg.as_bytes()).expect("Should parse");
    let mut surface = RecordingSurface::new();
    render(&doc, 1.0, &mut surface);

    let lines: Vec<(Point, Point)> = surface
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Line { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        lines,
        vec![
            (Point::new(0.0, 0.0), Point::new(0.0, 1.0)),
            (Point::new(0.0, 3.0), Point::new(0.0, 4.0)),
            (Point::new(0.0, 6.0), Point::new(0.0, 7.0)),
        ]
    );
    let drawn: f64 = lines.iter().map(|(a, b)| a.distance(*b)).sum();
    assert!(drawn <= 7.0);
}

#[test]
fn test_white_fill_suppresses_polygon() {
    let svg = r#"<svg width="20" height="20">
  <style>.paper { fill: #fff }</style>
  <path class="paper" d="M0 0 L5 0 L5 5 Z"/>
</svg>"#;
    let doc = parse(svg.as_bytes()).expect("Should parse");
    let mut surface = RecordingSurface::new();
    render(&doc, 1.0, &mut surface);

    assert_eq!(surface.fill_color(), Rgb::WHITE);
    assert!(!surface
        .commands()
        .iter()
        .any(|c| matches!(c, DrawCommand::PolygonFill(_))));
}

#[test]
fn test_multiline_rotated_text() {
    let svg = r#"<svg width="20" height="20">
  <text transform="matrix(0 -2 2 0 4 8)"><tspan>one</tspan><tspan>two</tspan></text>
</svg>"#;
    let doc = parse(svg.as_bytes()).expect("Should parse");
    let mut surface = RecordingSurface::new();
    render(&doc, 1.0, &mut surface);

    let placed: Vec<String> = surface
        .commands()
        .iter()
        .filter(|c| {
            matches!(
                c,
                DrawCommand::TransformBegin
                    | DrawCommand::Rotate { .. }
                    | DrawCommand::Text { .. }
                    | DrawCommand::TransformEnd
            )
        })
        .map(|c| c.to_string())
        .collect();
    assert_eq!(
        placed,
        vec![
            "transform-begin",
            "rotate -90.00 around 4.00 8.00",
            "text 4.00 8.00 \"one\"",
            "text 4.00 16.00 \"two\"",
            "transform-end",
        ]
    );
    assert_eq!(surface.font_size(), 8.0);
}

/// Host that fails once a given number of lines have been drawn
struct FlakySurface {
    inner: RecordingSurface,
    budget: usize,
}

impl Surface for FlakySurface {
    fn xy(&self) -> Point {
        self.inner.xy()
    }
    fn set_xy(&mut self, at: Point) {
        self.inner.set_xy(at)
    }
    fn line(&mut self, from: Point, to: Point) {
        if self.budget == 0 {
            self.inner.set_error("out of ink".to_string());
            return;
        }
        self.budget -= 1;
        self.inner.line(from, to)
    }
    fn curve(&mut self, from: Point, c1: Point, c2: Point, to: Point) {
        self.inner.curve(from, c1, c2, to)
    }
    fn polygon_fill(&mut self, points: &[Point]) {
        self.inner.polygon_fill(points)
    }
    fn set_draw_color(&mut self, color: Rgb) {
        self.inner.set_draw_color(color)
    }
    fn set_fill_color(&mut self, color: Rgb) {
        self.inner.set_fill_color(color)
    }
    fn fill_color(&self) -> Rgb {
        self.inner.fill_color()
    }
    fn set_text_color(&mut self, color: Rgb) {
        self.inner.set_text_color(color)
    }
    fn set_line_width(&mut self, width: f64) {
        self.inner.set_line_width(width)
    }
    fn line_width(&self) -> f64 {
        self.inner.line_width()
    }
    fn set_font_size(&mut self, size: f64) {
        self.inner.set_font_size(size)
    }
    fn font_size(&self) -> f64 {
        self.inner.font_size()
    }
    fn set_bold(&mut self, bold: bool) {
        self.inner.set_bold(bold)
    }
    fn set_alpha(&mut self, alpha: f64) {
        self.inner.set_alpha(alpha)
    }
    fn string_width(&self, text: &str) -> f64 {
        self.inner.string_width(text)
    }
    fn text(&mut self, at: Point, text: &str) {
        self.inner.text(at, text)
    }
    fn transform_begin(&mut self) {
        self.inner.transform_begin()
    }
    fn transform_translate(&mut self, dx: f64, dy: f64) {
        self.inner.transform_translate(dx, dy)
    }
    fn transform_rotate(&mut self, angle: f64, center: Point) {
        self.inner.transform_rotate(angle, center)
    }
    fn transform_end(&mut self) {
        self.inner.transform_end()
    }
    fn ok(&self) -> bool {
        self.inner.ok()
    }
    fn set_error(&mut self, message: String) {
        self.inner.set_error(message)
    }
}

#[test]
fn test_host_error_stops_rendering() {
    let svg = r#"<svg width="20" height="20">
  <path d="M0 0 L1 0 L2 0 L3 0"/>
  <path d="M5 5 L6 6"/>
  <text transform="matrix(1 0 0 1 1 1)">never</text>
</svg>"#;
    let doc = parse(svg.as_bytes()).expect("Should parse");
    let mut surface = FlakySurface {
        inner: RecordingSurface::new(),
        budget: 2,
    };
    render(&doc, 1.0, &mut surface);

    assert_eq!(surface.inner.error(), Some("out of ink"));
    let lines = surface
        .inner
        .commands()
        .iter()
        .filter(|c| matches!(c, DrawCommand::Line { .. }))
        .count();
    assert_eq!(lines, 2);
    let commands = surface.inner.commands();
    assert!(!commands.iter().any(|c| matches!(c, DrawCommand::Text { .. })));
    assert!(!commands.contains(&DrawCommand::MoveTo(Point::new(5.0, 5.0))));
}
