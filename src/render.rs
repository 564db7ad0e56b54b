//! Chart rendering to PNG.
//!
//! A chart has one primary trace on the left value axis and an optional
//! secondary trace on an independent right axis; both share the time axis.
//! This is how an error signal and a controller output are compared: the
//! output is drawn as a step trace and a zero reference is drawn on the
//! left axis.

use image::{Rgba, RgbaImage};
use std::path::Path;
use strum::{AsRefStr, EnumString};
use thiserror::Error;

use crate::state::{CHART_COLORS, DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH};
use crate::store::Series;

const MARGIN_LEFT: u32 = 60;
const MARGIN_RIGHT: u32 = 60;
const MARGIN_TOP: u32 = 30;
const MARGIN_BOTTOM: u32 = 40;

const BACKGROUND: Rgba<u8> = Rgba([30, 30, 30, 255]);
const PLOT_BACKGROUND: Rgba<u8> = Rgba([40, 40, 40, 255]);
const FRAME: Rgba<u8> = Rgba([90, 90, 90, 255]);
const ZERO_LINE: Rgba<u8> = Rgba([160, 160, 160, 255]);

/// Errors that can occur while rendering a chart
#[derive(Debug, Error)]
pub enum RenderError {
    /// No finite points to draw
    #[error("Series has no drawable points")]
    EmptySeries,

    /// Image too small to hold the plot area
    #[error("Chart size {width}x{height} is too small")]
    TooSmall { width: u32, height: u32 },

    /// Failed to encode or write the image
    #[error("Failed to write image: {0}")]
    ImageError(#[from] image::ImageError),
}

/// How a trace connects its points
#[derive(AsRefStr, Clone, Copy, Debug, Default, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum TraceStyle {
    /// Isolated markers
    #[default]
    Scatter,
    /// Straight segments between consecutive points
    Line,
    /// Each value held until the next sample
    Step,
}

/// A series plus its drawing style
#[derive(Clone, Copy, Debug)]
pub struct Trace<'a> {
    pub series: &'a Series,
    pub style: TraceStyle,
    pub color: [u8; 3],
}

impl<'a> Trace<'a> {
    pub fn new(series: &'a Series, style: TraceStyle, color: [u8; 3]) -> Self {
        Self {
            series,
            style,
            color,
        }
    }
}

/// Linear mapping of a data range onto pixels
#[derive(Clone, Copy, Debug, PartialEq)]
struct Axis {
    min: f64,
    max: f64,
}

impl Axis {
    fn new(min: f64, max: f64) -> Self {
        if (max - min).abs() < f64::EPSILON {
            Self {
                min: min - 0.5,
                max: max + 0.5,
            }
        } else {
            Self { min, max }
        }
    }

    fn including(self, value: f64) -> Self {
        Self::new(self.min.min(value), self.max.max(value))
    }

    fn ratio(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }
}

/// Pixel rectangle of the plot area
#[derive(Clone, Copy, Debug)]
struct PlotArea {
    left: u32,
    right: u32,
    top: u32,
    bottom: u32,
}

impl PlotArea {
    fn x(&self, axis: &Axis, time: f64) -> u32 {
        let width = (self.right - self.left) as f64;
        let offset = (axis.ratio(time) * width).round().clamp(0.0, width);
        self.left + offset as u32
    }

    fn y(&self, axis: &Axis, value: f64) -> u32 {
        let height = (self.bottom - self.top) as f64;
        let offset = (axis.ratio(value) * height).round().clamp(0.0, height);
        self.bottom - offset as u32
    }
}

/// A time-series chart with up to two value axes
#[derive(Clone, Debug)]
pub struct Chart<'a> {
    width: u32,
    height: u32,
    primary: Trace<'a>,
    secondary: Option<Trace<'a>>,
    zero_line: bool,
}

impl<'a> Chart<'a> {
    pub fn new(primary: Trace<'a>) -> Self {
        Self {
            width: DEFAULT_CHART_WIDTH,
            height: DEFAULT_CHART_HEIGHT,
            primary,
            secondary: None,
            zero_line: false,
        }
    }

    /// Build the usual comparison chart: a signal on the left axis and a
    /// control output as a step trace on the right axis
    pub fn comparison(signal: &'a Series, output: &'a Series) -> Self {
        Self::new(Trace::new(signal, TraceStyle::Line, CHART_COLORS[0]))
            .with_secondary(Trace::new(output, TraceStyle::Step, CHART_COLORS[1]))
            .with_zero_line(true)
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_secondary(mut self, trace: Trace<'a>) -> Self {
        self.secondary = Some(trace);
        self
    }

    pub fn with_zero_line(mut self, zero_line: bool) -> Self {
        self.zero_line = zero_line;
        self
    }

    pub fn render(&self) -> Result<RgbaImage, RenderError> {
        if self.width <= MARGIN_LEFT + MARGIN_RIGHT || self.height <= MARGIN_TOP + MARGIN_BOTTOM {
            return Err(RenderError::TooSmall {
                width: self.width,
                height: self.height,
            });
        }

        let (mut time_axis, left_axis) = trace_axes(&self.primary)?;
        let left_axis = if self.zero_line {
            left_axis.including(0.0)
        } else {
            left_axis
        };

        let right_axis = match &self.secondary {
            Some(trace) => {
                let (t, v) = trace_axes(trace)?;
                time_axis = Axis::new(time_axis.min.min(t.min), time_axis.max.max(t.max));
                Some(v)
            }
            None => None,
        };

        let area = PlotArea {
            left: MARGIN_LEFT,
            right: self.width - MARGIN_RIGHT,
            top: MARGIN_TOP,
            bottom: self.height - MARGIN_BOTTOM,
        };

        let mut img = RgbaImage::from_pixel(self.width, self.height, BACKGROUND);
        fill_rect(&mut img, &area, PLOT_BACKGROUND);
        draw_frame(&mut img, &area);

        if self.zero_line {
            let y = area.y(&left_axis, 0.0);
            draw_dashed_hline(&mut img, area.left, area.right, y, ZERO_LINE);
        }

        // Axis spines take the color of the trace they belong to
        draw_line(&mut img, area.left, area.top, area.left, area.bottom, rgba(self.primary.color));
        draw_trace(&mut img, &area, &time_axis, &left_axis, &self.primary);

        if let (Some(trace), Some(axis)) = (&self.secondary, &right_axis) {
            draw_line(&mut img, area.right, area.top, area.right, area.bottom, rgba(trace.color));
            draw_trace(&mut img, &area, &time_axis, axis, trace);
        }

        Ok(img)
    }

    pub fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        let img = self.render()?;
        img.save_with_format(path, image::ImageFormat::Png)?;
        tracing::info!("Wrote chart to {}", path.display());
        Ok(())
    }
}

fn trace_axes(trace: &Trace<'_>) -> Result<(Axis, Axis), RenderError> {
    let mut points = finite_points(trace.series);
    let (t0, v0) = points.next().ok_or(RenderError::EmptySeries)?;
    let (t_min, t_max, v_min, v_max) = points.fold((t0, t0, v0, v0), |(a, b, c, d), (t, v)| {
        (a.min(t), b.max(t), c.min(v), d.max(v))
    });
    Ok((Axis::new(t_min, t_max), Axis::new(v_min, v_max)))
}

fn finite_points(series: &Series) -> impl Iterator<Item = (f64, f64)> + '_ {
    series
        .points()
        .filter(|(t, v)| t.is_finite() && v.is_finite())
}

fn rgba(color: [u8; 3]) -> Rgba<u8> {
    Rgba([color[0], color[1], color[2], 255])
}

fn draw_trace(
    img: &mut RgbaImage,
    area: &PlotArea,
    time_axis: &Axis,
    value_axis: &Axis,
    trace: &Trace<'_>,
) {
    let color = rgba(trace.color);
    let pixels = finite_points(trace.series)
        .map(|(t, v)| (area.x(time_axis, t), area.y(value_axis, v)));

    let mut prev: Option<(u32, u32)> = None;
    for (x, y) in pixels {
        match (trace.style, prev) {
            (TraceStyle::Scatter, _) => draw_marker(img, x, y, color),
            (TraceStyle::Line, Some((px, py))) => draw_line(img, px, py, x, y, color),
            (TraceStyle::Step, Some((px, py))) => {
                draw_line(img, px, py, x, py, color);
                draw_line(img, x, py, x, y, color);
            }
            (_, None) => draw_marker(img, x, y, color),
        }
        prev = Some((x, y));
    }
}

fn fill_rect(img: &mut RgbaImage, area: &PlotArea, color: Rgba<u8>) {
    for y in area.top..=area.bottom {
        for x in area.left..=area.right {
            img.put_pixel(x, y, color);
        }
    }
}

fn draw_frame(img: &mut RgbaImage, area: &PlotArea) {
    draw_line(img, area.left, area.top, area.right, area.top, FRAME);
    draw_line(img, area.left, area.bottom, area.right, area.bottom, FRAME);
    draw_line(img, area.left, area.top, area.left, area.bottom, FRAME);
    draw_line(img, area.right, area.top, area.right, area.bottom, FRAME);
}

fn draw_dashed_hline(img: &mut RgbaImage, x0: u32, x1: u32, y: u32, color: Rgba<u8>) {
    for x in x0..=x1 {
        if (x - x0) % 12 < 6 {
            put_pixel_checked(img, x as i32, y as i32, color);
        }
    }
}

/// Draw a 3x3 point marker
fn draw_marker(img: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>) {
    for dy in -1..=1 {
        for dx in -1..=1 {
            put_pixel_checked(img, x as i32 + dx, y as i32 + dy, color);
        }
    }
}

fn put_pixel_checked(img: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    let (width, height) = img.dimensions();
    if x >= 0 && x < width as i32 && y >= 0 && y < height as i32 {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Draw a line between two points using Bresenham's algorithm
fn draw_line(img: &mut RgbaImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgba<u8>) {
    let dx = (x1 as i32 - x0 as i32).abs();
    let dy = -(y1 as i32 - y0 as i32).abs();
    let sx: i32 = if x0 < x1 { 1 } else { -1 };
    let sy: i32 = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0 as i32;
    let mut y = y0 as i32;

    loop {
        put_pixel_checked(img, x, y, color);

        if x == x1 as i32 && y == y1 as i32 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
