//! Drawing targets for the trajectory renderer.
//!
//! [`Canvas`] is the seam between the renderer and whatever ends up holding
//! the pixels. [`DrawList`] just records the calls, which is what the tests
//! and any caller that wants raw primitives use.
//!
//! Coordinates are surface coordinates: origin top-left, Y growing down.

use std::convert::Infallible;
use std::fmt;

use model::{Point2, Surface};
use serde::{Deserialize, Serialize};

/// Opaque RGB color, written as `#rrggbb` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self { r: channel(0)?, g: channel(2)?, b: channel(4)? })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Color::from_hex(&s).ok_or_else(|| format!("invalid color {s:?}, expected #rrggbb"))
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

/// A fixed-size surface the renderer draws onto.
pub trait Canvas {
    type Error;

    /// Fill the whole surface with `color`.
    fn clear(&mut self, surface: &Surface, color: Color) -> Result<(), Self::Error>;

    /// Draw one straight segment.
    fn line(&mut self, from: Point2, to: Point2, stroke: Stroke) -> Result<(), Self::Error>;

    /// Draw `points` as one continuous stroke, in order.
    fn polyline(&mut self, points: &[Point2], stroke: Stroke) -> Result<(), Self::Error>;

    /// Draw a filled disc.
    fn circle(&mut self, center: Point2, radius: f64, fill: Color) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear { width: u32, height: u32, color: Color },
    Line { from: Point2, to: Point2, stroke: Stroke },
    Polyline { points: Vec<Point2>, stroke: Stroke },
    Circle { center: Point2, radius: f64, fill: Color },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = (&Point2, &Point2)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Line { from, to, .. } => Some((from, to)),
            _ => None,
        })
    }

    pub fn circles(&self) -> impl Iterator<Item = (&Point2, f64, Color)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Circle { center, radius, fill } => Some((center, *radius, *fill)),
            _ => None,
        })
    }

    pub fn polylines(&self) -> impl Iterator<Item = &[Point2]> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Polyline { points, .. } => Some(points.as_slice()),
            _ => None,
        })
    }

    /// Every coordinate and radius in the list, for finiteness checks.
    pub fn scalars(&self) -> Vec<f64> {
        let mut out = Vec::new();
        for c in &self.commands {
            match c {
                DrawCommand::Clear { .. } => {}
                DrawCommand::Line { from, to, stroke } => {
                    out.extend([from.x, from.y, to.x, to.y, stroke.width]);
                }
                DrawCommand::Polyline { points, stroke } => {
                    out.extend(points.iter().flat_map(|p| [p.x, p.y]));
                    out.push(stroke.width);
                }
                DrawCommand::Circle { center, radius, .. } => {
                    out.extend([center.x, center.y, *radius]);
                }
            }
        }
        out
    }
}

impl Canvas for DrawList {
    type Error = Infallible;

    fn clear(&mut self, surface: &Surface, color: Color) -> Result<(), Self::Error> {
        self.commands.push(DrawCommand::Clear { width: surface.width, height: surface.height, color });
        Ok(())
    }

    fn line(&mut self, from: Point2, to: Point2, stroke: Stroke) -> Result<(), Self::Error> {
        self.commands.push(DrawCommand::Line { from, to, stroke });
        Ok(())
    }

    fn polyline(&mut self, points: &[Point2], stroke: Stroke) -> Result<(), Self::Error> {
        self.commands.push(DrawCommand::Polyline { points: points.to_vec(), stroke });
        Ok(())
    }

    fn circle(&mut self, center: Point2, radius: f64, fill: Color) -> Result<(), Self::Error> {
        self.commands.push(DrawCommand::Circle { center, radius, fill });
        Ok(())
    }
}
