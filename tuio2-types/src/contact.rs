use std::collections::VecDeque;

use crate::coords::{Accel, Angle, Coord, Point2, Point3, Velocity2, Velocity3};
use crate::ids::{ComponentId, SessionId, TypeId, UserId};

const HISTORY_CAPACITY: usize = 5;

/// A contact's 2D-or-3D position, carried without loss regardless of which
/// convention the producing sensor uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    D2(Point2),
    D3(Point3),
}

impl Position {
    pub fn as_point3(self) -> Point3 {
        match self {
            Position::D2(p) => Point3::new(p.x, p.y, 0.0),
            Position::D3(p) => p,
        }
    }

    pub fn x(self) -> Coord {
        self.as_point3().x
    }

    pub fn y(self) -> Coord {
        self.as_point3().y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Only2D,
    Only3D,
    Both,
}

/// Bounded ring of up to five `(timestamp, position)` samples, used to
/// estimate velocity and acceleration. Plain owned storage inside the
/// contact — no aliasing, no shared pointers into it.
#[derive(Debug, Clone, Default)]
pub struct History {
    samples: VecDeque<(f64, Point3)>,
}

impl History {
    pub fn push(&mut self, timestamp: f64, position: Point3) {
        self.samples.push_back((timestamp, position));
        while self.samples.len() > HISTORY_CAPACITY {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Forward difference over the last two samples. `None` before the
    /// second sample arrives (the estimator is zero on the first sample by
    /// not yet being computable at all, per the spec's "no estimate
    /// available" reading of the source's dead-code path).
    pub fn velocity_estimate(&self) -> Option<Velocity3> {
        let k = self.samples.len();
        if k < 2 {
            return None;
        }
        let (t1, p1) = self.samples[k - 2];
        let (t2, p2) = self.samples[k - 1];
        let dt = t2 - t1;
        if dt <= 0.0 {
            return None;
        }
        Some(Velocity3 {
            x: (p2.x - p1.x) / dt,
            y: (p2.y - p1.y) / dt,
            z: (p2.z - p1.z) / dt,
        })
    }

    pub fn velocity_estimate_2d(&self) -> Option<Velocity2> {
        self.velocity_estimate().map(|v| Velocity2 { x: v.x, y: v.y })
    }

    /// Lagrange-polynomial derivative of the magnitude-of-velocity series
    /// at the last 3 samples, evaluated at the most recent point. Requires
    /// at least 4 position samples (3 velocity segments).
    pub fn acceleration_estimate(&self) -> Option<Accel> {
        let k = self.samples.len();
        if k < 4 {
            return None;
        }
        let window: Vec<(f64, Point3)> = self.samples.iter().copied().skip(k - 4).collect();

        let segment = |i: usize| -> (f64, f64) {
            let (t0, p0) = window[i];
            let (t1, p1) = window[i + 1];
            let dt = t1 - t0;
            let speed = p0.distance(p1) / dt;
            (t1, speed)
        };

        let (t0, v0) = segment(0);
        let (t1, v1) = segment(1);
        let (t2, v2) = segment(2);

        if t0 == t1 || t1 == t2 || t0 == t2 {
            return None;
        }

        // Derivative of the degree-2 Lagrange interpolant through
        // (t0,v0),(t1,v1),(t2,v2), evaluated at t2.
        let d0 = ((t2 - t2) + (t2 - t1)) / ((t0 - t1) * (t0 - t2));
        let d1 = ((t2 - t2) + (t2 - t0)) / ((t1 - t0) * (t1 - t2));
        let d2 = ((t2 - t1) + (t2 - t0)) / ((t2 - t0) * (t2 - t1));

        Some(v0 * d0 + v1 * d1 + v2 * d2)
    }
}

/// The tracker's primary entity: a single physical touch point or tracked
/// object from first sensor observation through release.
#[derive(Debug, Clone)]
pub struct Contact {
    pub session_id: SessionId,
    pub position: Position,
    pub velocity: Option<Velocity3>,
    pub acceleration: Option<Accel>,
    pub angle: Option<Angle>,
    pub rotation_velocity: Option<f64>,
    pub rotation_acceleration: Option<f64>,
    pub shape_major: Option<f64>,
    pub shape_minor: Option<f64>,
    pub orientation: Option<Angle>,
    pub pressure: Option<f64>,
    pub width: Option<f64>,
    pub type_id: TypeId,
    pub user_id: UserId,
    pub component_id: ComponentId,
    pub output_mode: OutputMode,
    pub history: History,
}

impl Contact {
    pub fn new(session_id: SessionId, position: Position) -> Self {
        Self {
            session_id,
            position,
            velocity: None,
            acceleration: None,
            angle: None,
            rotation_velocity: None,
            rotation_acceleration: None,
            shape_major: None,
            shape_minor: None,
            orientation: None,
            pressure: None,
            width: None,
            type_id: TypeId::default(),
            user_id: UserId::NONE,
            component_id: ComponentId::default(),
            output_mode: OutputMode::Only2D,
            history: History::default(),
        }
    }

    /// Records a position sample and refreshes the derived velocity and
    /// acceleration estimates from history.
    pub fn observe(&mut self, timestamp: f64, position: Position) {
        self.position = position;
        self.history.push(timestamp, position.as_point3());
        self.velocity = self.history.velocity_estimate();
        self.acceleration = self.history.acceleration_estimate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_unavailable_before_second_sample() {
        let mut h = History::default();
        h.push(0.0, Point3::new(0.0, 0.0, 0.0));
        assert!(h.velocity_estimate().is_none());
    }

    #[test]
    fn velocity_converges_for_constant_speed() {
        let mut h = History::default();
        for i in 0..3 {
            h.push(i as f64, Point3::new(i as f64 * 2.0, 0.0, 0.0));
        }
        let v = h.velocity_estimate().unwrap();
        assert!((v.x - 2.0).abs() < 1e-9);
    }

    #[test]
    fn acceleration_unavailable_before_fourth_sample() {
        let mut h = History::default();
        for i in 0..3 {
            h.push(i as f64, Point3::new(i as f64, 0.0, 0.0));
        }
        assert!(h.acceleration_estimate().is_none());
    }

    #[test]
    fn acceleration_is_zero_for_constant_velocity() {
        let mut h = History::default();
        for i in 0..5 {
            h.push(i as f64, Point3::new(i as f64 * 3.0, 0.0, 0.0));
        }
        let a = h.acceleration_estimate().unwrap();
        assert!(a.abs() < 1e-9);
    }

    #[test]
    fn history_ring_is_bounded() {
        let mut h = History::default();
        for i in 0..10 {
            h.push(i as f64, Point3::new(i as f64, 0.0, 0.0));
        }
        assert_eq!(h.len(), HISTORY_CAPACITY);
    }
}
