// Minimal SVG line/band chart renderer.

use std::fmt::Write;

pub const WIDTH: f64 = 864.0;
pub const HEIGHT: f64 = 432.0;
const PADDING: f64 = 48.0;
const TITLE_OFFSET: f64 = 20.0;
const GRID_COLOR: &str = "#e5e5e5";
const AXIS_COLOR: &str = "#000";

pub struct LineSeries {
    pub label: Option<String>,
    pub color: &'static str,
    pub stroke_width: f64,
    pub dash: bool,
    pub points: Vec<(f64, f64)>,
}

/// Filled area between two curves sharing x positions
pub struct BandArea {
    pub label: Option<String>,
    pub color: &'static str,
    pub opacity: f64,
    pub points: Vec<(f64, f64, f64)>, // (x, lower, upper)
}

pub struct HorizontalGuide {
    pub value: f64,
    pub color: &'static str,
    pub width: f64,
}

pub struct Chart<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub x_range: (f64, f64),
    pub x_ticks: Vec<(f64, String)>,
    pub bands: Vec<BandArea>,
    pub lines: Vec<LineSeries>,
    pub guides: Vec<HorizontalGuide>,
}

struct Frame {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Frame {
    fn x(&self, value: f64) -> f64 {
        let inner = WIDTH - 2.0 * PADDING;
        if (self.x_max - self.x_min).abs() < f64::EPSILON {
            return PADDING + inner / 2.0;
        }
        PADDING + (value - self.x_min) / (self.x_max - self.x_min) * inner
    }

    fn y(&self, value: f64) -> f64 {
        let top = PADDING + TITLE_OFFSET;
        let inner = HEIGHT - PADDING - top;
        let norm = (value - self.y_min) / (self.y_max - self.y_min);
        top + (1.0 - norm) * inner
    }

    fn in_x_range(&self, x: f64) -> bool {
        x >= self.x_min && x <= self.x_max
    }
}

impl Chart<'_> {
    pub fn render(&self) -> String {
        let frame = match self.frame() {
            Some(frame) => frame,
            None => return self.render_empty(),
        };

        let mut svg = svg_header();
        self.draw_title(&mut svg);
        self.draw_grid(&mut svg, &frame);

        for band in &self.bands {
            draw_band(&mut svg, &frame, band);
        }
        for guide in &self.guides {
            let y = frame.y(guide.value);
            let _ = write!(
                svg,
                r#"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{color}" stroke-width="{width}" />"#,
                x1 = PADDING,
                x2 = WIDTH - PADDING,
                color = guide.color,
                width = guide.width,
            );
        }
        for line in &self.lines {
            draw_line(&mut svg, &frame, line);
        }

        self.draw_axes(&mut svg, &frame);
        self.draw_legend(&mut svg);
        svg.push_str(svg_footer());
        svg
    }

    fn frame(&self) -> Option<Frame> {
        let (x_min, x_max) = self.x_range;
        let in_range = |x: f64| x >= x_min && x <= x_max;

        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        let mut extend = |v: f64| {
            if v.is_finite() {
                y_min = y_min.min(v);
                y_max = y_max.max(v);
            }
        };

        for line in &self.lines {
            line.points.iter().filter(|(x, _)| in_range(*x)).for_each(|(_, y)| extend(*y));
        }
        for band in &self.bands {
            for (x, lower, upper) in &band.points {
                if in_range(*x) {
                    extend(*lower);
                    extend(*upper);
                }
            }
        }
        for guide in &self.guides {
            extend(guide.value);
        }

        if !y_min.is_finite() || !y_max.is_finite() {
            return None;
        }
        if y_min == y_max {
            let adjust = if y_min == 0.0 { 1.0 } else { y_min.abs() * 0.1 }; // widen flat ranges
            y_min -= adjust;
            y_max += adjust;
        }

        Some(Frame { x_min, x_max, y_min, y_max })
    }

    fn render_empty(&self) -> String {
        let mut svg = svg_header();
        self.draw_title(&mut svg);
        let _ = write!(
            svg,
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">No data</text>"#,
            x = WIDTH / 2.0,
            y = HEIGHT / 2.0,
        );
        svg.push_str(svg_footer());
        svg
    }

    fn draw_title(&self, svg: &mut String) {
        let _ = write!(
            svg,
            r#"<text class="title" x="{x:.2}" y="{y:.2}" text-anchor="middle">{title}</text>"#,
            x = WIDTH / 2.0,
            y = PADDING - 8.0,
            title = escape(self.title),
        );
    }

    fn draw_grid(&self, svg: &mut String, frame: &Frame) {
        for (x, _) in self.x_ticks.iter().filter(|(x, _)| frame.in_x_range(*x)) {
            let _ = write!(
                svg,
                r#"<line x1="{x:.2}" y1="{y1:.2}" x2="{x:.2}" y2="{y2:.2}" stroke="{GRID_COLOR}" stroke-width="0.5" />"#,
                x = frame.x(*x),
                y1 = PADDING + TITLE_OFFSET,
                y2 = HEIGHT - PADDING,
            );
        }
    }

    fn draw_axes(&self, svg: &mut String, frame: &Frame) {
        let axis_y = HEIGHT - PADDING;
        let _ = write!(
            svg,
            r#"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{AXIS_COLOR}" stroke-width="1" />"#,
            x1 = PADDING,
            x2 = WIDTH - PADDING,
            y = axis_y,
        );
        let _ = write!(
            svg,
            r#"<line x1="{x:.2}" y1="{y1:.2}" x2="{x:.2}" y2="{y2:.2}" stroke="{AXIS_COLOR}" stroke-width="1" />"#,
            x = PADDING,
            y1 = PADDING + TITLE_OFFSET,
            y2 = axis_y,
        );

        for (x, label) in self.x_ticks.iter().filter(|(x, _)| frame.in_x_range(*x)) {
            let _ = write!(
                svg,
                r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"#,
                x = frame.x(*x),
                y = axis_y + 14.0,
                label = escape(label),
            );
        }

        for i in 0..=4 {
            let value = frame.y_min + (frame.y_max - frame.y_min) * i as f64 / 4.0;
            let _ = write!(
                svg,
                r#"<text x="{x:.2}" y="{y:.2}" text-anchor="end">{value}</text>"#,
                x = PADDING - 4.0,
                y = frame.y(value) + 3.0,
                value = format_tick(value),
            );
        }

        let _ = write!(
            svg,
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"#,
            x = WIDTH / 2.0,
            y = HEIGHT - 12.0,
            label = escape(self.x_label),
        );
        let _ = write!(
            svg,
            r#"<text x="14" y="{y:.2}" text-anchor="middle" transform="rotate(-90 14 {y:.2})">{label}</text>"#,
            y = HEIGHT / 2.0,
            label = escape(self.y_label),
        );
    }

    fn draw_legend(&self, svg: &mut String) {
        let x = WIDTH - PADDING - 110.0;
        let mut y = PADDING + TITLE_OFFSET + 12.0;

        for band in &self.bands {
            let Some(label) = &band.label else { continue };
            let _ = write!(
                svg,
                r#"<rect x="{x:.2}" y="{ry:.2}" width="20" height="8" fill="{color}" fill-opacity="{opacity}" />"#,
                ry = y - 8.0,
                color = band.color,
                opacity = band.opacity,
            );
            legend_label(svg, x, y, label);
            y += 16.0;
        }
        for line in &self.lines {
            let Some(label) = &line.label else { continue };
            let _ = write!(
                svg,
                r#"<line x1="{x:.2}" y1="{ly:.2}" x2="{x2:.2}" y2="{ly:.2}" stroke="{color}" stroke-width="2" stroke-dasharray="{dash}" />"#,
                x2 = x + 20.0,
                ly = y - 4.0,
                color = line.color,
                dash = dash_attr(line.dash),
            );
            legend_label(svg, x, y, label);
            y += 16.0;
        }
    }
}

/// One polyline per run of drawable points; a NaN value or a clipped point ends the run
fn draw_line(svg: &mut String, frame: &Frame, line: &LineSeries) {
    let runs = line
        .points
        .split(|(x, y)| !(frame.in_x_range(*x) && y.is_finite()))
        .filter(|run| !run.is_empty());

    for run in runs {
        let points = run
            .iter()
            .map(|(x, y)| format!("{:.2},{:.2}", frame.x(*x), frame.y(*y)))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = write!(
            svg,
            r#"<polyline fill="none" stroke="{color}" stroke-width="{width}" stroke-dasharray="{dash}" points="{points}" />"#,
            color = line.color,
            width = line.stroke_width,
            dash = dash_attr(line.dash),
        );
    }
}

fn draw_band(svg: &mut String, frame: &Frame, band: &BandArea) {
    let runs = band
        .points
        .split(|(x, lower, upper)| !(frame.in_x_range(*x) && lower.is_finite() && upper.is_finite()))
        .filter(|run| !run.is_empty());

    for run in runs {
        // Upper edge left to right, then lower edge back
        let upper = run.iter().map(|(x, _, u)| (frame.x(*x), frame.y(*u)));
        let lower = run.iter().rev().map(|(x, l, _)| (frame.x(*x), frame.y(*l)));
        let points = upper
            .chain(lower)
            .map(|(x, y)| format!("{x:.2},{y:.2}"))
            .collect::<Vec<_>>()
            .join(" ");

        let _ = write!(
            svg,
            r#"<polygon class="band" fill="{color}" fill-opacity="{opacity}" stroke="none" points="{points}" />"#,
            color = band.color,
            opacity = band.opacity,
        );
    }
}

fn legend_label(svg: &mut String, x: f64, y: f64, label: &str) {
    let _ = write!(
        svg,
        r##"<text x="{x:.2}" y="{y:.2}" text-anchor="start" fill="#333">{label}</text>"##,
        x = x + 26.0,
        label = escape(label),
    );
}

fn svg_header() -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><style>text{{font-family:Arial,sans-serif;font-size:10px;fill:#666}} .title{{font-size:14px;fill:#222}}</style><rect width="100%" height="100%" fill="white" />"#,
        w = WIDTH,
        h = HEIGHT
    )
}

fn svg_footer() -> &'static str {
    "</svg>"
}

fn dash_attr(dash: bool) -> &'static str {
    if dash { "6 4" } else { "0" }
}

fn format_tick(value: f64) -> String {
    if value.abs() >= 100.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
