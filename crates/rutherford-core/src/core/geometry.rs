use nalgebra::{Point2, Rotation2, Vector2};

/// Rotates `point` counterclockwise by `angle` radians around `pivot`.
pub fn rotated_about_point(point: &Point2<f64>, pivot: &Point2<f64>, angle: f64) -> Point2<f64> {
    pivot + Rotation2::new(angle) * (point - pivot)
}

/// Angle of `vector` measured counterclockwise from the positive x axis.
pub fn angle_of(vector: &Vector2<f64>) -> f64 {
    vector.y.atan2(vector.x)
}

/// Unit vector pointing along `angle`.
pub fn unit_from_angle(angle: f64) -> Vector2<f64> {
    Vector2::new(angle.cos(), angle.sin())
}

/// Maps `value` from the range `from` onto the range `to`, extrapolating outside of it.
pub fn linear_map(from: (f64, f64), to: (f64, f64), value: f64) -> f64 {
    let (a1, a2) = from;
    let (b1, b2) = to;
    if (a2 - a1).abs() < f64::EPSILON {
        return b1;
    }
    b1 + (value - a1) * (b2 - b1) / (a2 - a1)
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl Rect {
    pub fn centered(center: Point2<f64>, width: f64, height: f64) -> Self {
        let half = Vector2::new(width / 2.0, height / 2.0);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point2<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Boundary points count as inside.
    pub fn contains_point(&self, point: &Point2<f64>) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// True when the interiors overlap. Rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// The rectangle rotated by `angle` radians around `pivot`.
    pub fn rotated_about(&self, pivot: &Point2<f64>, angle: f64) -> OrientedRect {
        OrientedRect {
            center: rotated_about_point(&self.center(), pivot, angle),
            half_extents: Vector2::new(self.width() / 2.0, self.height() / 2.0),
            angle,
        }
    }
}

/// A rectangle rotated by `angle` radians around its own center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedRect {
    pub center: Point2<f64>,
    pub half_extents: Vector2<f64>,
    pub angle: f64,
}

impl OrientedRect {
    pub fn contains_point(&self, point: &Point2<f64>) -> bool {
        let local = Rotation2::new(-self.angle) * (point - self.center);
        local.x.abs() <= self.half_extents.x && local.y.abs() <= self.half_extents.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point2<f64>,
    pub radius: f64,
}

impl Circle {
    /// The smallest circle containing every point of `rect`.
    pub fn circumscribing(rect: &Rect) -> Self {
        Self {
            center: rect.center(),
            radius: (rect.max - rect.min).norm() / 2.0,
        }
    }

    pub fn contains_point(&self, point: &Point2<f64>) -> bool {
        (point - self.center).norm_squared() <= self.radius * self.radius
    }
}
