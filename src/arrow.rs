//! Level arrow shape, as an outline for vector drawing or a 300 DPI raster.

use std::str::FromStr;

use ::image::{Rgba, RgbaImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

use crate::level::LevelIndicator;

/// Raster resolution for arrow images
pub const ARROW_DPI: f32 = 300.0;

// Arrow proportions, as fractions of the square side
const SHAFT_WIDTH: f32 = 0.2;
const SHAFT_LENGTH: f32 = 0.6;
const HEAD_WIDTH: f32 = 0.5;
const HEAD_LENGTH: f32 = 0.2;
const TAIL_OFFSET: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowDirection {
    Down,
    Up,
}

impl ArrowDirection {
    pub fn for_level(level: LevelIndicator) -> Option<Self> {
        match level {
            LevelIndicator::Down => Some(ArrowDirection::Down),
            LevelIndicator::Up => Some(ArrowDirection::Up),
            LevelIndicator::None => None,
        }
    }
}

impl FromStr for ArrowDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "down" => Ok(ArrowDirection::Down),
            "up" => Ok(ArrowDirection::Up),
            other => Err(format!("invalid arrow direction '{}'", other)),
        }
    }
}

/// Side length in pixels of an arrow image `size_mm` wide.
pub fn arrow_pixels(size_mm: f32) -> u32 {
    (size_mm / 25.4 * ARROW_DPI).round().max(1.0) as u32
}

/// Arrow outline in unit-square coordinates, y growing downwards.
/// The down arrow's tip is at the bottom; the up arrow is its mirror.
pub fn arrow_outline(direction: ArrowDirection) -> [(f32, f32); 7] {
    let shaft_left = 0.5 - SHAFT_WIDTH / 2.0;
    let shaft_right = 0.5 + SHAFT_WIDTH / 2.0;
    let head_left = 0.5 - HEAD_WIDTH / 2.0;
    let head_right = 0.5 + HEAD_WIDTH / 2.0;
    let tail = TAIL_OFFSET;
    let head_base = TAIL_OFFSET + SHAFT_LENGTH;
    let tip = head_base + HEAD_LENGTH;

    let down = [
        (shaft_left, tail),
        (shaft_right, tail),
        (shaft_right, head_base),
        (head_right, head_base),
        (0.5, tip),
        (head_left, head_base),
        (shaft_left, head_base),
    ];

    match direction {
        ArrowDirection::Down => down,
        ArrowDirection::Up => down.map(|(x, y)| (x, 1.0 - y)),
    }
}

/// Render a filled black arrow on a transparent square canvas.
pub fn arrow_image(direction: ArrowDirection, size_mm: f32) -> RgbaImage {
    let side = arrow_pixels(size_mm);
    let mut canvas = RgbaImage::from_pixel(side, side, Rgba([0, 0, 0, 0]));

    let scale = side as f32;
    let points: Vec<Point<i32>> = arrow_outline(direction)
        .iter()
        .map(|&(x, y)| Point::new((x * scale).round() as i32, (y * scale).round() as i32))
        .collect();

    draw_polygon_mut(&mut canvas, &points, Rgba([0, 0, 0, 255]));
    canvas
}
