use crate::point::Point;

/// Defines the rectangular bounding box a Voronoi diagram is clipped and
/// closed against.
///
/// Coordinates follow the screen convention: y grows downward, so
/// `top < bottom`. Unbounded Voronoi edges are connected to this box and every
/// cell is closed along its perimeter.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new_centered_square(2.0) // square from [-1, 1] on xy
    }
}

impl BoundingBox {
    /// Constructs a new bounding box from its four boundary coordinates.
    ///
    /// # Arguments
    ///
    /// * `left` - The x coordinate of the left boundary
    /// * `right` - The x coordinate of the right boundary
    /// * `top` - The y coordinate of the top boundary
    /// * `bottom` - The y coordinate of the bottom boundary
    ///
    /// `left < right` and `top < bottom` must hold for the box to be usable;
    /// [crate::Voronoi::compute] rejects degenerate boxes.
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self { left, right, top, bottom }
    }

    /// Constructs a new bounding box centered at origin with the provided width and height.
    pub fn new_centered(width: f64, height: f64) -> Self {
        Self::new(-width / 2.0, width / 2.0, -height / 2.0, height / 2.0)
    }

    /// Constructs a new square bounding box centered at origin with the provided width.
    pub fn new_centered_square(width: f64) -> Self {
        Self::new_centered(width, width)
    }

    /// Gets the x coordinate of the left boundary.
    #[inline]
    pub fn left(&self) -> f64 {
        self.left
    }

    /// Gets the x coordinate of the right boundary.
    #[inline]
    pub fn right(&self) -> f64 {
        self.right
    }

    /// Gets the y coordinate of the top boundary.
    #[inline]
    pub fn top(&self) -> f64 {
        self.top
    }

    /// Gets the y coordinate of the bottom boundary.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    /// Gets the width of the bounding box.
    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Gets the height of the bounding box.
    #[inline]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Returns whether a given point is inside (or on the edges) of the bounding box.
    #[inline]
    pub fn is_inside(&self, point: &Point) -> bool {
        let horizontal_ok = self.left <= point.x && point.x <= self.right;
        let vertical_ok = self.top <= point.y && point.y <= self.bottom;

        horizontal_ok && vertical_ok
    }

    /// Same as inside, but returns false if point is on the box edge.
    #[inline]
    pub fn is_exclusively_inside(&self, point: &Point) -> bool {
        let horizontal_ok = self.left < point.x && point.x < self.right;
        let vertical_ok = self.top < point.y && point.y < self.bottom;

        horizontal_ok && vertical_ok
    }

    /// Returns the four corners of the bounding box, clockwise from top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point { x: self.left, y: self.top },
            Point { x: self.right, y: self.top },
            Point { x: self.right, y: self.bottom },
            Point { x: self.left, y: self.bottom },
        ]
    }

    pub(crate) fn is_degenerate(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_tests() {
        let bbox = BoundingBox::new(0.0, 10.0, 0.0, 6.0);

        assert!(bbox.is_inside(&Point { x: 5.0, y: 3.0 }));
        assert!(bbox.is_inside(&Point { x: 0.0, y: 0.0 }), "Corners are inside");
        assert!(bbox.is_inside(&Point { x: 10.0, y: 6.0 }), "Corners are inside");
        assert!(!bbox.is_inside(&Point { x: -0.1, y: 3.0 }));
        assert!(!bbox.is_inside(&Point { x: 5.0, y: 6.1 }));

        assert!(bbox.is_exclusively_inside(&Point { x: 5.0, y: 3.0 }));
        assert!(!bbox.is_exclusively_inside(&Point { x: 0.0, y: 3.0 }), "Edge points are not exclusively inside");
    }

    #[test]
    fn dimension_tests() {
        let bbox = BoundingBox::new_centered(4.0, 2.0);
        assert_eq!(4.0, bbox.width());
        assert_eq!(2.0, bbox.height());
        assert_eq!(-2.0, bbox.left());
        assert_eq!(2.0, bbox.right());
        assert_eq!(-1.0, bbox.top());
        assert_eq!(1.0, bbox.bottom());
        assert!(!bbox.is_degenerate());

        assert!(BoundingBox::new(1.0, 1.0, 0.0, 2.0).is_degenerate());
        assert!(BoundingBox::new(0.0, 2.0, 3.0, 1.0).is_degenerate());
    }

    #[test]
    fn corners_are_inside() {
        let bbox = BoundingBox::new(-3.0, 7.0, 2.0, 11.0);
        for corner in bbox.corners().iter() {
            assert!(bbox.is_inside(corner), "Corner {:?} must be inside", corner);
        }
    }
}
