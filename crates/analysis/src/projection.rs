use model::{Bounds, Point2, Surface};

/// World-to-surface mapping for one render pass.
///
/// The scale is uniform on both axes and the Y axis is flipped, so world
/// "up" lands toward the top of the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    min_x: f64,
    min_y: f64,
    scale: f64,
    padding: f64,
    height: f64,
}

impl Projection {
    pub fn new(bounds: &Bounds, surface: &Surface) -> Self {
        let sx = axis_scale(surface.drawable_width(), bounds.width());
        let sy = axis_scale(surface.drawable_height(), bounds.height());
        let scale = match (sx, sy) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => 1.0,
        };
        Self {
            min_x: bounds.min_x,
            min_y: bounds.min_y,
            scale,
            padding: surface.padding,
            height: surface.height as f64,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn project(&self, x: f64, y: f64) -> Point2 {
        Point2 {
            x: self.padding + (x - self.min_x) * self.scale,
            y: self.height - self.padding - (y - self.min_y) * self.scale,
        }
    }
}

// zero-width or non-finite spans put no constraint on the scale
fn axis_scale(extent: f64, span: f64) -> Option<f64> {
    if !(span.is_finite() && span > 0.0) {
        return None;
    }
    let s = extent / span;
    s.is_finite().then_some(s)
}
