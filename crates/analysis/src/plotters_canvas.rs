//! [`Canvas`] on top of a plotters drawing area, plus one-call helpers that
//! render a trajectory straight to an SVG or PNG.

use std::path::Path;

use model::{Point2, SessionStats, Surface, TrajectoryPoint};
use plotters::backend::{BitMapBackend, DrawingBackend, SVGBackend};
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{Circle, PathElement};
use plotters::style::{Color as _, RGBColor, ShapeStyle};

use crate::canvas::{Canvas, Color, Stroke};
use crate::style::RenderStyle;

#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("drawing backend failed: {0}")]
    Backend(String),
}

impl CanvasError {
    fn backend(e: impl std::fmt::Display) -> Self {
        CanvasError::Backend(e.to_string())
    }
}

pub struct PlottersCanvas<DB: DrawingBackend> {
    area: DrawingArea<DB, Shift>,
}

impl<DB: DrawingBackend> PlottersCanvas<DB> {
    pub fn new(area: DrawingArea<DB, Shift>) -> Self {
        Self { area }
    }

    /// Flush the backend. Must be called once drawing is done.
    pub fn finish(self) -> Result<(), CanvasError> {
        self.area.present().map_err(CanvasError::backend)
    }
}

fn rgb(c: Color) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

fn px(p: Point2) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}

fn stroke_style(s: Stroke) -> ShapeStyle {
    rgb(s.color).stroke_width(s.width.round().max(1.0) as u32)
}

impl<DB: DrawingBackend> Canvas for PlottersCanvas<DB> {
    type Error = CanvasError;

    fn clear(&mut self, _surface: &Surface, color: Color) -> Result<(), Self::Error> {
        self.area.fill(&rgb(color)).map_err(CanvasError::backend)
    }

    fn line(&mut self, from: Point2, to: Point2, stroke: Stroke) -> Result<(), Self::Error> {
        self.area
            .draw(&PathElement::new(vec![px(from), px(to)], stroke_style(stroke)))
            .map_err(CanvasError::backend)
    }

    fn polyline(&mut self, points: &[Point2], stroke: Stroke) -> Result<(), Self::Error> {
        let coords: Vec<(i32, i32)> = points.iter().copied().map(px).collect();
        self.area
            .draw(&PathElement::new(coords, stroke_style(stroke)))
            .map_err(CanvasError::backend)
    }

    fn circle(&mut self, center: Point2, radius: f64, fill: Color) -> Result<(), Self::Error> {
        let r = radius.round().max(1.0) as i32;
        self.area
            .draw(&Circle::new(px(center), r, rgb(fill).filled()))
            .map_err(CanvasError::backend)
    }
}

pub fn render_svg_file(
    path: &Path,
    points: &[TrajectoryPoint],
    stats: Option<&SessionStats>,
    surface: &Surface,
    style: &RenderStyle,
) -> Result<(), CanvasError> {
    let area = SVGBackend::new(path, (surface.width, surface.height)).into_drawing_area();
    let mut canvas = PlottersCanvas::new(area);
    crate::render(&mut canvas, points, stats, surface, style)?;
    canvas.finish()
}

pub fn render_svg_string(
    points: &[TrajectoryPoint],
    stats: Option<&SessionStats>,
    surface: &Surface,
    style: &RenderStyle,
) -> Result<String, CanvasError> {
    let mut out = String::new();
    {
        let area = SVGBackend::with_string(&mut out, (surface.width, surface.height)).into_drawing_area();
        let mut canvas = PlottersCanvas::new(area);
        crate::render(&mut canvas, points, stats, surface, style)?;
        canvas.finish()?;
    }
    Ok(out)
}

pub fn render_png_file(
    path: &Path,
    points: &[TrajectoryPoint],
    stats: Option<&SessionStats>,
    surface: &Surface,
    style: &RenderStyle,
) -> Result<(), CanvasError> {
    let area = BitMapBackend::new(path, (surface.width, surface.height)).into_drawing_area();
    let mut canvas = PlottersCanvas::new(area);
    crate::render(&mut canvas, points, stats, surface, style)?;
    canvas.finish()
}
