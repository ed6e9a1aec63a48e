//! Geometry primitives for laid-out screens.
//!
//! All values are physical pixels (density already applied).

use std::ops::{Add, Sub};

/// A point in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// A 2D size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle in screen content coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Build from left/top/right/bottom edges.
    #[inline]
    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Vertical overlap test against the half-open band `[top, bottom)`.
    /// Touching edges do not count. A zero-height rect is a point on the
    /// y axis and intersects when `top <= y < bottom`.
    #[inline]
    pub fn intersects_y(&self, top: f32, bottom: f32) -> bool {
        if self.height <= 0.0 {
            return self.y >= top && self.y < bottom;
        }
        self.y < bottom && self.bottom() > top
    }

    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    #[inline]
    pub fn translate(&self, offset: Point) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_and_translate() {
        let rect = Rect::from_edges(10.0, 20.0, 110.0, 70.0);
        assert_eq!(rect, Rect::new(10.0, 20.0, 100.0, 50.0));
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 70.0);

        let moved = rect.translate(Point::new(0.0, 30.0));
        assert_eq!(moved.origin(), Point::new(10.0, 50.0));
        assert_eq!(moved.size(), rect.size());
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(0.0, 100.0, 100.0, 100.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Rect::new(50.0, 99.0, 10.0, 10.0)));
        assert!(a.intersects_y(99.5, 200.0));
        assert!(!a.intersects_y(100.0, 200.0));
        assert!(a.contains(Point::ORIGIN));
    }

    #[test]
    fn zero_height_rect_intersects_at_band_top() {
        let flat = Rect::new(0.0, 100.0, 50.0, 0.0);
        assert!(flat.intersects_y(100.0, 200.0));
        assert!(flat.intersects_y(0.0, 101.0));
        assert!(!flat.intersects_y(0.0, 100.0));
        assert!(!flat.intersects_y(100.5, 200.0));
    }
}
