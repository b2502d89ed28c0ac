use serde::{Deserialize, Serialize};

use crate::canvas::{Color, Stroke};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    pub background: Color,
    pub grid: Color,
    pub grid_width: f64,
    pub path: Color,
    pub path_width: f64,
    pub start: Color,
    pub end: Color,
    pub intermediate: Color,
    pub endpoint_radius: f64,
    pub intermediate_radius: f64,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: Color::rgb(0x11, 0x18, 0x27),
            grid: Color::rgb(0x37, 0x41, 0x51),
            grid_width: 1.0,
            path: Color::rgb(0x00, 0xf0, 0xff),
            path_width: 2.0,
            start: Color::rgb(0x10, 0xb9, 0x81),
            end: Color::rgb(0xef, 0x44, 0x44),
            intermediate: Color::rgb(0x00, 0xf0, 0xff),
            endpoint_radius: 6.0,
            intermediate_radius: 2.0,
        }
    }
}

impl RenderStyle {
    pub fn grid_stroke(&self) -> Stroke {
        Stroke { color: self.grid, width: self.grid_width }
    }

    pub fn path_stroke(&self) -> Stroke {
        Stroke { color: self.path, width: self.path_width }
    }
}
