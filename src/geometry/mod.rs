//! Geometric primitives for bounding boxes.
//!
//! Bounding boxes in this crate are `Option<Rect>`: `None` is the undefined
//! box ("extent could not be determined"), which is distinct from a
//! zero-area rectangle.

use serde::Serialize;

/// A 2D point in document space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in document space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    /// X coordinate of the minimum corner
    pub x: f32,
    /// Y coordinate of the minimum corner
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_structure::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from two corner points.
    pub fn from_points(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// Create a rectangle from two opposite corners given in any order.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_structure::geometry::Rect;
    ///
    /// let rect = Rect::from_corners(110.0, 70.0, 10.0, 20.0);
    /// assert_eq!(rect, Rect::new(10.0, 20.0, 100.0, 50.0));
    /// ```
    pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self::from_points(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }

    /// Get the left edge x-coordinate.
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the top edge y-coordinate.
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Compute the union of this rectangle with another.
    ///
    /// Returns the smallest rectangle that contains both rectangles.
    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.left().min(other.left());
        let y0 = self.top().min(other.top());
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::from_points(x0, y0, x1, y1)
    }
}

/// Smallest rectangle enclosing every given rectangle.
///
/// The union of zero rectangles is undefined (`None`), not an empty box.
///
/// ```
/// use pdf_structure::geometry::{bound_rects, Rect};
///
/// assert_eq!(bound_rects(std::iter::empty()), None);
/// let both = bound_rects([Rect::new(0.0, 0.0, 1.0, 1.0), Rect::new(2.0, 2.0, 1.0, 1.0)]);
/// assert_eq!(both, Some(Rect::new(0.0, 0.0, 3.0, 3.0)));
/// ```
pub fn bound_rects(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|acc, r| acc.union(&r))
}

/// Affine transformation matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Matrix {
    /// Horizontal scaling
    pub a: f32,
    /// Rotation / skew
    pub b: f32,
    /// Rotation / skew
    pub c: f32,
    /// Vertical scaling
    pub d: f32,
    /// Horizontal translation
    pub e: f32,
    /// Vertical translation
    pub f: f32,
}

impl Matrix {
    /// The identity transform.
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Create a matrix from its six components.
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Apply the transform to a point.
    pub fn transform_point(&self, x: f32, y: f32) -> Point {
        Point::new(
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Transform a rectangle, returning the axis-aligned box enclosing
    /// its four transformed corners.
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let corners = [
            self.transform_point(rect.left(), rect.top()),
            self.transform_point(rect.right(), rect.top()),
            self.transform_point(rect.left(), rect.bottom()),
            self.transform_point(rect.right(), rect.bottom()),
        ];
        let (mut x0, mut y0) = (f32::INFINITY, f32::INFINITY);
        let (mut x1, mut y1) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for p in corners {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Rect::from_points(x0, y0, x1, y1)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}
