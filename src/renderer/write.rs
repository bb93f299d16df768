//! Replay a parsed [`Document`] onto a [`Surface`]
//!
//! Paths are drawn first, then text. Styles are looked up by class through a
//! [`StyleResolver`] and only pushed to the surface when they differ from
//! what was last applied.

use tracing::{debug, trace};

use crate::geometry::{dash_segments, Point};
use crate::parser::{Document, PathCommand, PathSegment};
use crate::renderer::config::RenderConfig;
use crate::renderer::surface::Surface;
use crate::style::{Rgb, StyleAttributes, StyleResolver, TextAnchor};

/// Render with the default [`RenderConfig`]
pub fn render<S: Surface + ?Sized>(doc: &Document, scale: f64, surface: &mut S) {
    render_with_config(doc, scale, surface, &RenderConfig::default())
}

/// Draw every path and text of `doc`, scaling coordinates by `scale`.
///
/// Path coordinates are offset by the surface cursor at the time of the
/// call. Drawing stops as soon as the surface reports an error; a relative
/// path command left in the document latches one.
pub fn render_with_config<S: Surface + ?Sized>(
    doc: &Document,
    scale: f64,
    surface: &mut S,
    config: &RenderConfig,
) {
    let mut resolver = StyleResolver::new(&doc.styles);

    write_paths(doc, scale, surface, config, &mut resolver);
    write_texts(doc, scale, surface, config, &mut resolver);

    debug!(
        paths = doc.paths.len(),
        texts = doc.texts.len(),
        classes = resolver.cached(),
        ok = surface.ok(),
        "rendered document"
    );
}

fn write_paths<S: Surface + ?Sized>(
    doc: &Document,
    scale: f64,
    surface: &mut S,
    config: &RenderConfig,
    resolver: &mut StyleResolver,
) {
    let origin = surface.xy();
    let place = |p: &Point| Point::new(origin.x + scale * p.x, origin.y + scale * p.y);

    let mut applied = AppliedStyle::default();
    let mut cursor = origin;

    for (index, path) in doc.paths.iter().enumerate() {
        if !surface.ok() {
            return;
        }
        trace!(index, segments = path.len(), "drawing path");

        let mut polygon = is_polygon(path).then(Vec::new);
        for segment in path {
            if !surface.ok() {
                return;
            }
            let style = resolver.resolve(&segment.class);
            applied.apply_path_style(style, config, surface);

            let points: Vec<Point> = segment.points().iter().map(&place).collect();
            match (segment.command, points.as_slice()) {
                (PathCommand::MoveTo, &[to]) => {
                    cursor = to;
                    surface.set_xy(cursor);
                }
                (PathCommand::LineTo, &[to]) => {
                    match style.dash_pattern() {
                        Some(pattern) => {
                            for (from, end) in dash_segments(cursor, to, pattern) {
                                surface.line(from, end);
                            }
                        }
                        None => surface.line(cursor, to),
                    }
                    cursor = to;
                }
                (PathCommand::CurveTo, &[c1, c2, to]) => {
                    surface.curve(cursor, c1, c2, to);
                    cursor = to;
                }
                (other, _) => {
                    surface.set_error(format!("unexpected path command '{}'", other.letter()));
                    return;
                }
            }

            if let Some(points) = polygon.as_mut() {
                points.push(cursor);
            }
        }

        if let Some(points) = polygon {
            // white fills are never painted
            if !points.is_empty() && surface.ok() && surface.fill_color() != Rgb::WHITE {
                surface.polygon_fill(&points);
            }
        }
    }
}

fn is_polygon(path: &[PathSegment]) -> bool {
    path.first().map_or(false, |segment| segment.polygon)
}

fn write_texts<S: Surface + ?Sized>(
    doc: &Document,
    scale: f64,
    surface: &mut S,
    config: &RenderConfig,
    resolver: &mut StyleResolver,
) {
    let mut applied = AppliedStyle::default();

    for text in &doc.texts {
        if !surface.ok() {
            return;
        }
        if text.lines.is_empty() {
            continue;
        }

        let style = StyleAttributes::merge(resolver.resolve(&text.class), &text.style);
        applied.apply_text_style(&style, surface);

        let font_size = config.base_font_size * text.placement.scale;
        if surface.font_size() != font_size {
            surface.set_font_size(font_size);
        }
        let line_height = font_size * config.line_spacing;
        let anchor = Point::new(text.placement.x * scale, text.placement.y * scale);

        let rotated = text.placement.is_rotated();
        if rotated {
            surface.transform_begin();
            surface.transform_rotate(text.placement.rotation, anchor);
        }

        for (i, line) in text.lines.iter().enumerate() {
            if !surface.ok() {
                break;
            }
            let width = surface.string_width(line);
            let mut dx = width * style.baseline_shift() / 100.0;
            match style.text_anchor() {
                TextAnchor::Start => {}
                TextAnchor::Middle => dx -= width / 2.0,
                TextAnchor::End => dx -= width,
            }
            trace!(line = %line, width, "drawing text line");
            surface.text(
                Point::new(anchor.x + dx, anchor.y + i as f64 * line_height),
                line,
            );
        }

        if rotated {
            surface.transform_end();
        }
    }
}

/// What has already been pushed to the surface
#[derive(Debug, Default)]
struct AppliedStyle {
    stroke: Option<Rgb>,
    line_width: Option<f64>,
    fill: Option<Rgb>,
    bold: Option<bool>,
    alpha: Option<f64>,
}

impl AppliedStyle {
    fn apply_path_style<S: Surface + ?Sized>(
        &mut self,
        style: &StyleAttributes,
        config: &RenderConfig,
        surface: &mut S,
    ) {
        if style.has_stroke() && self.stroke != Some(style.stroke()) {
            surface.set_draw_color(style.stroke());
            self.stroke = Some(style.stroke());
        }

        let width = config.base_line_width * style.stroke_width();
        if self.line_width != Some(width) {
            surface.set_line_width(width);
            self.line_width = Some(width);
        }

        self.apply_fill(style, surface);
        self.apply_alpha(style, surface);
    }

    fn apply_text_style<S: Surface + ?Sized>(&mut self, style: &StyleAttributes, surface: &mut S) {
        self.apply_fill(style, surface);

        if self.bold != Some(style.bold()) {
            surface.set_bold(style.bold());
            self.bold = Some(style.bold());
        }

        self.apply_alpha(style, surface);
    }

    fn apply_fill<S: Surface + ?Sized>(&mut self, style: &StyleAttributes, surface: &mut S) {
        if style.has_fill() && self.fill != Some(style.fill()) {
            surface.set_fill_color(style.fill());
            surface.set_text_color(style.fill());
            self.fill = Some(style.fill());
        }
    }

    fn apply_alpha<S: Surface + ?Sized>(&mut self, style: &StyleAttributes, surface: &mut S) {
        if self.alpha != Some(style.opacity()) {
            surface.set_alpha(style.opacity());
            self.alpha = Some(style.opacity());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::renderer::surface::{DrawCommand, RecordingSurface};
    use pretty_assertions::assert_eq;

    fn svg(body: &str) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">{}</svg>"#,
            body
        )
    }

    fn draw(body: &str, scale: f64) -> RecordingSurface {
        let doc = parse(svg(body).as_bytes()).expect("Should parse");
        let mut surface = RecordingSurface::new();
        render(&doc, scale, &mut surface);
        surface
    }

    fn lines(surface: &RecordingSurface) -> Vec<(Point, Point)> {
        surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Line { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_move_and_line_scaled() {
        let surface = draw(r#"<path d="M1 2 L3 4"/>"#, 2.0);
        assert_eq!(
            surface.commands().iter().filter(|c| matches!(c, DrawCommand::MoveTo(_))).count(),
            1
        );
        assert_eq!(lines(&surface), vec![(Point::new(2.0, 4.0), Point::new(6.0, 8.0))]);
    }

    #[test]
    fn test_paths_are_offset_by_surface_cursor() {
        let doc = parse(svg(r#"<path d="M0 0 L1 0"/>"#).as_bytes()).expect("Should parse");
        let mut surface = RecordingSurface::new().with_origin(Point::new(10.0, 20.0));
        render(&doc, 1.0, &mut surface);
        assert_eq!(lines(&surface), vec![(Point::new(10.0, 20.0), Point::new(11.0, 20.0))]);
    }

    #[test]
    fn test_curve_uses_current_point() {
        let surface = draw(r#"<path d="M1 1 C2 2 3 3 4 4"/>"#, 1.0);
        let curve = surface
            .commands()
            .iter()
            .find(|c| matches!(c, DrawCommand::Curve { .. }))
            .cloned();
        assert_eq!(
            curve,
            Some(DrawCommand::Curve {
                from: Point::new(1.0, 1.0),
                c1: Point::new(2.0, 2.0),
                c2: Point::new(3.0, 3.0),
                to: Point::new(4.0, 4.0),
            })
        );
    }

    #[test]
    fn test_styles_are_not_reapplied() {
        let surface = draw(
            r#"<style>.a { stroke: #ff0000; stroke-width: 2 }</style>
               <path class="a" d="M0 0 L1 1 L2 2"/>
               <path class="a" d="M5 5 L6 6"/>"#,
            1.0,
        );
        let colors = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::DrawColor(_)))
            .count();
        let widths: Vec<&DrawCommand> = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::LineWidth(_)))
            .collect();
        assert_eq!(colors, 1);
        assert_eq!(widths.len(), 1);
        assert_eq!(surface.line_width(), 0.2);
    }

    #[test]
    fn test_dashed_line() {
        let surface = draw(
            r#"<style>.d { stroke-dasharray: 6 6 }</style>
               <path class="d" d="M0 0 L3 0"/>"#,
            1.0,
        );
        assert_eq!(
            lines(&surface),
            vec![
                (Point::new(0.0, 0.0), Point::new(1.0, 0.0)),
                (Point::new(2.0, 0.0), Point::new(3.0, 0.0)),
            ]
        );
    }

    #[test]
    fn test_polygon_filled_with_non_white_fill() {
        let surface = draw(
            r#"<style>.p { fill: #00ff00 }</style>
               <path class="p" d="M0 0 L4 0 L4 4 z"/>"#,
            1.0,
        );
        let polygon = surface
            .commands()
            .iter()
            .find(|c| matches!(c, DrawCommand::PolygonFill(_)))
            .cloned();
        assert_eq!(
            polygon,
            Some(DrawCommand::PolygonFill(vec![
                Point::new(0.0, 0.0),
                Point::new(4.0, 0.0),
                Point::new(4.0, 4.0),
            ]))
        );
    }

    #[test]
    fn test_white_polygon_fill_is_suppressed() {
        let surface = draw(
            r#"<style>.p { fill: #ffffff }</style>
               <path class="p" d="M0 0 L4 0 L4 4 z"/>"#,
            1.0,
        );
        assert!(!surface
            .commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::PolygonFill(_))));
        // the outline is still drawn
        assert_eq!(lines(&surface).len(), 2);
    }

    #[test]
    fn test_relative_command_latches_error() {
        let mut doc = parse(svg(r#"<path d="M0 0 L1 1"/>"#).as_bytes()).expect("Should parse");
        doc.paths[0][1].command = PathCommand::LineToRel;

        let mut surface = RecordingSurface::new();
        render(&doc, 1.0, &mut surface);
        assert_eq!(surface.error(), Some("unexpected path command 'l'"));
        assert!(lines(&surface).is_empty());
    }

    #[test]
    fn test_error_stops_output() {
        let doc = parse(
            svg(r#"<path d="M0 0 L1 1"/><text transform="matrix(1 0 0 1 5 5)">hi</text>"#)
                .as_bytes(),
        )
        .expect("Should parse");
        let mut surface = RecordingSurface::new();
        surface.set_error("host failure".to_string());
        render(&doc, 1.0, &mut surface);
        assert!(surface.commands().is_empty());
        assert_eq!(surface.error(), Some("host failure"));
    }

    #[test]
    fn test_multiline_text() {
        let surface = draw(
            r#"<text transform="matrix(2 0 0 2 10 20)"><tspan>ab</tspan><tspan>cd</tspan></text>"#,
            1.0,
        );
        let texts: Vec<DrawCommand> = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Text { .. } | DrawCommand::FontSize(_)))
            .cloned()
            .collect();
        assert_eq!(
            texts,
            vec![
                DrawCommand::FontSize(8.0),
                DrawCommand::Text {
                    at: Point::new(10.0, 20.0),
                    text: "ab".to_string()
                },
                DrawCommand::Text {
                    at: Point::new(10.0, 28.0),
                    text: "cd".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_baseline_shift_and_anchor() {
        // "abcd" at font size 4 measures 8 units
        let surface = draw(
            r#"<style>.s { baseline-shift: 50% } .m { text-anchor: middle }</style>
               <text class="s" transform="matrix(1 0 0 1 10 0)">abcd</text>
               <text class="m" transform="matrix(1 0 0 1 10 0)">abcd</text>"#,
            1.0,
        );
        let positions: Vec<Point> = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { at, .. } => Some(*at),
                _ => None,
            })
            .collect();
        assert_eq!(positions, vec![Point::new(14.0, 0.0), Point::new(6.0, 0.0)]);
    }

    #[test]
    fn test_rotated_text_is_wrapped_in_transform() {
        let surface = draw(
            r#"<text transform="matrix(0 1 -1 0 10 20)">up</text>"#,
            1.0,
        );
        let kinds: Vec<String> = surface
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
            kinds,
            vec![
                "transform-begin".to_string(),
                "rotate 90.00 around 10.00 20.00".to_string(),
                "text 10.00 20.00 \"up\"".to_string(),
                "transform-end".to_string(),
            ]
        );
        assert_eq!(surface.transform_depth(), 0);
    }

    #[test]
    fn test_text_fill_sets_text_color() {
        let surface = draw(
            r#"<text style="fill:#0000ff;font-weight:bold">x</text>"#,
            1.0,
        );
        assert_eq!(surface.text_color(), Rgb::new(0, 0, 255));
        assert!(surface.bold());
    }

    #[test]
    fn test_unstyled_polygon_on_white_host_is_not_filled() {
        let doc = parse(svg(r#"<path d="M0 0 L4 0 L4 4 z"/>"#).as_bytes()).expect("Should parse");
        let mut surface = RecordingSurface::new().with_fill_color(Rgb::WHITE);
        render(&doc, 1.0, &mut surface);

        let commands = surface.into_commands();
        let outline = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count();
        assert_eq!(outline, 2);
        assert!(!commands
            .iter()
            .any(|c| matches!(c, DrawCommand::PolygonFill(_))));
    }

    /// Host that refuses every text call after the first one
    struct OneLineSurface {
        inner: RecordingSurface,
        text_calls: usize,
        transform_ends: usize,
    }

    impl Surface for OneLineSurface {
        fn xy(&self) -> Point {
            self.inner.xy()
        }
        fn set_xy(&mut self, at: Point) {
            self.inner.set_xy(at)
        }
        fn line(&mut self, from: Point, to: Point) {
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
            self.text_calls += 1;
            self.inner.text(at, text);
            self.inner.set_error("page full".to_string());
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
            self.transform_ends += 1;
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
    fn test_host_error_stops_remaining_text_lines() {
        let doc = parse(
            svg(r#"<text transform="matrix(0 1 -1 0 10 20)"><tspan>a</tspan><tspan>b</tspan><tspan>c</tspan></text>"#)
                .as_bytes(),
        )
        .expect("Should parse");
        let mut surface = OneLineSurface {
            inner: RecordingSurface::new(),
            text_calls: 0,
            transform_ends: 0,
        };
        render(&doc, 1.0, &mut surface);

        assert_eq!(surface.text_calls, 1);
        // the rotation scope is still closed
        assert_eq!(surface.transform_ends, 1);
        assert_eq!(surface.inner.error(), Some("page full"));
    }

    #[test]
    fn test_empty_text_is_skipped() {
        let surface = draw(r#"<text transform="matrix(1 0 0 1 0 0)">   </text>"#, 1.0);
        assert!(surface.commands().is_empty());
    }
}
