//! Sensor-topology metadata: the static description of how a sensor relates
//! to its neighbours, groups, and coordinate-translation convention. Carried
//! on the wire by the `/dtuio/sensor`, `/dtuio/viewport`, `/dtuio/group` and
//! `/dtuio/neighbour` messages (see [`crate::message`]).

use crate::coords::{Angle, Point2};
use crate::ids::Uuid128;

/// How a sensor's raw coordinates relate to the shared coordinate frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationMode {
    /// Coordinates are already in the shared frame; no translation applied.
    Intact,
    /// Translated once at startup against a fixed reference.
    SetupOnce,
    /// Continuously re-translated, e.g. tracking a moving projector.
    SetupContinuous,
}

/// A sensor's role in the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorPurpose {
    Source,
    Observer,
    Tagger,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighbourDeclaration {
    pub neighbour_uuid: Uuid128,
    pub azimuth: Angle,
    pub altitude: Angle,
    pub distance: f64,
}

/// Per-sensor topology metadata, as assembled by the publisher and carried
/// across the wire in the sensor/group/neighbour message family.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorTopology {
    pub uuid: Uuid128,
    pub translation_mode: TranslationMode,
    pub purpose: SensorPurpose,
    pub groups: Vec<Uuid128>,
    pub neighbours: Vec<NeighbourDeclaration>,
}

impl SensorTopology {
    pub fn new(uuid: Uuid128, translation_mode: TranslationMode, purpose: SensorPurpose) -> Self {
        Self {
            uuid,
            translation_mode,
            purpose,
            groups: Vec::new(),
            neighbours: Vec::new(),
        }
    }

    pub fn joins_group(&mut self, group_uuid: Uuid128) {
        self.groups.push(group_uuid);
    }

    pub fn declares_neighbour(&mut self, declaration: NeighbourDeclaration) {
        self.neighbours.push(declaration);
    }
}

/// A viewport projection target: center, orientation and size of a rectangle
/// in the shared coordinate frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub uuid: Uuid128,
    pub width: f64,
    pub height: f64,
    pub center: Point2,
    pub orientation: Angle,
}

impl Viewport {
    pub fn new(uuid: Uuid128, width: f64, height: f64, center: Point2, orientation: Angle) -> Self {
        Self {
            uuid,
            width,
            height,
            center,
            orientation,
        }
    }

    /// Whether `p` falls within the viewport's axis-aligned bounds before
    /// rotation is considered (cheap pre-check used by the projector
    /// adaptor's strip-outside-box option).
    pub fn contains_unrotated(&self, p: Point2) -> bool {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        (p.x - self.center.x).abs() <= half_w && (p.y - self.center.y).abs() <= half_h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_topology_accumulates_groups_and_neighbours() {
        let mut sensor = SensorTopology::new(Uuid128(1), TranslationMode::Intact, SensorPurpose::Source);
        sensor.joins_group(Uuid128(2));
        sensor.declares_neighbour(NeighbourDeclaration {
            neighbour_uuid: Uuid128(3),
            azimuth: 0.0,
            altitude: 0.0,
            distance: 1.5,
        });
        assert_eq!(sensor.groups, vec![Uuid128(2)]);
        assert_eq!(sensor.neighbours.len(), 1);
    }

    #[test]
    fn viewport_contains_center_not_far_corner() {
        let vp = Viewport::new(Uuid128(1), 10.0, 10.0, Point2::new(0.0, 0.0), 0.0);
        assert!(vp.contains_unrotated(Point2::new(0.0, 0.0)));
        assert!(!vp.contains_unrotated(Point2::new(100.0, 100.0)));
    }
}
