//! Trajectory visualization engine.
//!
//! Turns the positional samples of one driving session into drawing calls
//! on a fixed-size [`Canvas`]: a reference grid, the full-resolution path and
//! a decimated set of markers. The pipeline is
//! bounds → projection → draw, re-run from scratch on every call.

pub mod bounds;
pub mod canvas;
pub mod plotters_canvas;
pub mod projection;
pub mod style;

use model::{Point2, SessionStats, Surface, TrajectoryPoint};
use tracing::{debug, trace, warn};

pub use bounds::resolve_bounds;
pub use canvas::{Canvas, Color, DrawCommand, DrawList, Stroke};
pub use plotters_canvas::{render_png_file, render_svg_file, render_svg_string, CanvasError, PlottersCanvas};
pub use projection::Projection;
pub use style::RenderStyle;

/// Divisions of the reference grid on each axis.
pub const GRID_DIVISIONS: u32 = 10;

/// Rough upper bound on the number of intermediate markers per render.
pub const MARKER_BUDGET: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Start,
    End,
    Intermediate,
}

/// Stride between intermediate markers for a trajectory of `len` points.
pub fn marker_step(len: usize) -> usize {
    (len / MARKER_BUDGET).max(1)
}

/// Marker drawn at `index`, if any. Start and end take precedence over the
/// stride rule.
pub fn marker_kind(index: usize, len: usize, step: usize) -> Option<MarkerKind> {
    if index == 0 {
        Some(MarkerKind::Start)
    } else if index + 1 == len {
        Some(MarkerKind::End)
    } else if index % step == 0 {
        Some(MarkerKind::Intermediate)
    } else {
        None
    }
}

/// Draw `points` onto `canvas`.
///
/// Bounds come from `stats` when present, otherwise from the points. An
/// empty trajectory draws nothing and is not an error. Samples with a
/// non-finite coordinate are left out of the path and the markers.
pub fn render<C: Canvas>(
    canvas: &mut C,
    points: &[TrajectoryPoint],
    stats: Option<&SessionStats>,
    surface: &Surface,
    style: &RenderStyle,
) -> Result<(), C::Error> {
    let Some(bounds) = resolve_bounds(points, stats.map(|s| &s.bounds)) else {
        trace!("empty trajectory, nothing to draw");
        return Ok(());
    };
    let projection = Projection::new(&bounds, surface);

    canvas.clear(surface, style.background)?;
    draw_grid(canvas, surface, style)?;

    let path: Vec<Point2> = points
        .iter()
        .filter(|p| p.is_finite())
        .map(|p| projection.project(p.x, p.y))
        .collect();
    if path.len() < points.len() {
        warn!(skipped = points.len() - path.len(), "non-finite samples left out of the path");
    }
    canvas.polyline(&path, style.path_stroke())?;

    let step = marker_step(path.len());
    let mut intermediate = 0usize;
    for (i, at) in path.iter().enumerate() {
        match marker_kind(i, path.len(), step) {
            Some(MarkerKind::Start) => canvas.circle(*at, style.endpoint_radius, style.start)?,
            Some(MarkerKind::End) => canvas.circle(*at, style.endpoint_radius, style.end)?,
            Some(MarkerKind::Intermediate) => {
                intermediate += 1;
                canvas.circle(*at, style.intermediate_radius, style.intermediate)?
            }
            None => {}
        }
    }

    debug!(
        points = path.len(),
        scale = projection.scale(),
        step,
        intermediate,
        "rendered trajectory"
    );
    Ok(())
}

fn draw_grid<C: Canvas>(canvas: &mut C, surface: &Surface, style: &RenderStyle) -> Result<(), C::Error> {
    let pad = surface.padding;
    let (w, h) = (surface.width as f64, surface.height as f64);
    let stroke = style.grid_stroke();
    for i in 0..=GRID_DIVISIONS {
        let f = i as f64 / GRID_DIVISIONS as f64;
        let x = pad + f * surface.drawable_width();
        let y = pad + f * surface.drawable_height();
        canvas.line(Point2 { x, y: pad }, Point2 { x, y: h - pad }, stroke)?;
        canvas.line(Point2 { x: pad, y }, Point2 { x: w - pad, y }, stroke)?;
    }
    Ok(())
}
