use std::cmp::Ordering;
use std::f64::consts::PI;

/// A coordinate in the frame established by the enclosing frame message's
/// sensor dimensions. May or may not be normalized to `[0, 1]`; the core
/// preserves whichever convention the caller uses without loss.
pub type Coord = f64;
/// Coordinate units per second.
pub type Velocity = f64;
/// Coordinate units per second squared.
pub type Accel = f64;
/// Radians. Implementations may keep values unreduced; see [`strip_angle_period`].
pub type Angle = f64;

fn total_cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Reduces an angle into `[0, 2*PI)`.
pub fn strip_angle_period(angle: Angle) -> Angle {
    let wrapped = angle % (2.0 * PI);
    if wrapped < 0.0 {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    pub x: Coord,
    pub y: Coord,
}

impl Point2 {
    pub fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point2) -> Coord {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn translate(self, dx: Coord, dy: Coord) -> Point2 {
        Point2::new(self.x + dx, self.y + dy)
    }

    pub fn scale(self, sx: f64, sy: f64) -> Point2 {
        Point2::new(self.x * sx, self.y * sy)
    }

    /// Rotates around `center` by `theta` radians: `C + R(theta) * (P - C)`.
    pub fn rotate_around(self, center: Point2, theta: Angle) -> Point2 {
        let (sin, cos) = theta.sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Point2::new(
            center.x + dx * cos - dy * sin,
            center.y + dx * sin + dy * cos,
        )
    }
}

impl Eq for Point2 {}

impl PartialOrd for Point2 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point2 {
    fn cmp(&self, other: &Self) -> Ordering {
        total_cmp_f64(self.x, other.x).then_with(|| total_cmp_f64(self.y, other.y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    pub x: Coord,
    pub y: Coord,
    pub z: Coord,
}

impl Point3 {
    pub fn new(x: Coord, y: Coord, z: Coord) -> Self {
        Self { x, y, z }
    }

    pub fn xy(self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    pub fn distance(self, other: Point3) -> Coord {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2)).sqrt()
    }

    pub fn translate(self, dx: Coord, dy: Coord, dz: Coord) -> Point3 {
        Point3::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn scale(self, sx: f64, sy: f64, sz: f64) -> Point3 {
        Point3::new(self.x * sx, self.y * sy, self.z * sz)
    }

    /// Rotates around `center` axis-by-axis: yaw about Z, pitch about Y, roll about X.
    pub fn rotate_around(self, center: Point3, yaw: Angle, pitch: Angle, roll: Angle) -> Point3 {
        let mut p = self;

        // yaw: rotate X/Y about Z
        let (sy_, cy_) = yaw.sin_cos();
        let dx = p.x - center.x;
        let dy = p.y - center.y;
        p.x = center.x + dx * cy_ - dy * sy_;
        p.y = center.y + dx * sy_ + dy * cy_;

        // pitch: rotate Z/X about Y
        let (sp, cp) = pitch.sin_cos();
        let dz = p.z - center.z;
        let dx2 = p.x - center.x;
        p.z = center.z + dz * cp - dx2 * sp;
        p.x = center.x + dz * sp + dx2 * cp;

        // roll: rotate Y/Z about X
        let (sr, cr) = roll.sin_cos();
        let dy2 = p.y - center.y;
        let dz2 = p.z - center.z;
        p.y = center.y + dy2 * cr - dz2 * sr;
        p.z = center.z + dy2 * sr + dz2 * cr;

        p
    }
}

impl Eq for Point3 {}

impl PartialOrd for Point3 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point3 {
    fn cmp(&self, other: &Self) -> Ordering {
        total_cmp_f64(self.x, other.x)
            .then_with(|| total_cmp_f64(self.y, other.y))
            .then_with(|| total_cmp_f64(self.z, other.z))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity2 {
    pub x: Velocity,
    pub y: Velocity,
}

impl Velocity2 {
    pub fn magnitude(self) -> Velocity {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity3 {
    pub x: Velocity,
    pub y: Velocity,
    pub z: Velocity,
}

impl Velocity3 {
    pub fn magnitude(self) -> Velocity {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Yaw/pitch/roll triple, in radians. Values may be unreduced; callers apply
/// [`strip_angle_period`] explicitly when a canonical range is needed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngleTriple {
    pub yaw: Angle,
    pub pitch: Angle,
    pub roll: Angle,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationVelocityTriple {
    pub yaw: Velocity,
    pub pitch: Velocity,
    pub roll: Velocity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_point_around_center_by_half_turn() {
        let p = Point2::new(2.0, 0.0);
        let center = Point2::new(0.0, 0.0);
        let rotated = p.rotate_around(center, PI);
        assert!((rotated.x - (-2.0)).abs() < 1e-9);
        assert!((rotated.y - 0.0).abs() < 1e-9);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn lexicographic_order_on_x_then_y() {
        assert!(Point2::new(1.0, 5.0) < Point2::new(2.0, 0.0));
        assert!(Point2::new(1.0, 0.0) < Point2::new(1.0, 5.0));
    }

    #[test]
    fn strip_angle_period_wraps_negative() {
        assert!((strip_angle_period(-PI / 2.0) - (1.5 * PI)).abs() < 1e-9);
    }
}
