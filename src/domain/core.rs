//! Core domain types and operations
//!
//! This module defines pure geometric types in canvas pixels. They have
//! no knowledge of Win32 coordinates or DPI concepts.

/// Point in canvas pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Creates a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in canvas pixel coordinates
///
/// This is the fundamental building block for layout and hit testing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// Creates a new rectangle
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Creates a square of the given side centered on `center`
    pub fn centered_square(center: Point, side: f32) -> Self {
        let half = side / 2.0;
        Self::new(center.x - half, center.y - half, side, side)
    }

    /// Returns the right edge coordinate
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Returns the bottom edge coordinate
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Returns the center of the rectangle
    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Returns true if this rectangle contains the given point
    ///
    /// The left and top edges are inclusive, the right and bottom edges exclusive.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}
