//! `muse_config` XML loading (§6): a root `muse_config` element containing
//! one or more `wrapper` elements, each carrying a generic `config`
//! sub-element (`target`, `device`, `ui`) plus zero or more per-sensor
//! blocks (`uuid`, `viewport`, `active_quadrangle`, `mapping`, `group`,
//! `neighbour`). Device-specific options (depth-sensor resolution, blob
//! size range, …) are out of scope here — no depth-camera wrapper is
//! built by this core (§1).
//!
//! Parsed with `quick-xml`'s serde support, the way the config schema is
//! just another serde-shaped document, no different in kind from the trace
//! fixtures `tuio2-wire::testutil` builds by hand.

use std::collections::HashMap;

use serde::Deserialize;

use tuio2_types::coords::{Angle, Point2};
use tuio2_types::ids::Uuid128;
use tuio2_types::topology::{NeighbourDeclaration, SensorPurpose, SensorTopology, TranslationMode, Viewport};

use crate::axis::{AxisMapping, LogicalAxis};
use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct MuseConfig {
    #[serde(rename = "wrapper", default)]
    pub wrappers: Vec<WrapperConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WrapperConfig {
    #[serde(rename = "@name")]
    pub name: String,
    pub config: WrapperOptions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WrapperOptions {
    pub target: Option<String>,
    pub device: Option<String>,
    pub ui: Option<String>,
    #[serde(rename = "sensor", default)]
    pub sensors: Vec<SensorConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SensorConfig {
    pub uuid: String,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub translation_mode: Option<String>,
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub active_quadrangle: Option<QuadrangleConfig>,
    #[serde(default)]
    pub mapping: MappingConfig,
    #[serde(rename = "group", default)]
    pub groups: Vec<GroupConfig>,
    #[serde(rename = "neighbour", default)]
    pub neighbours: Vec<NeighbourConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub center_x: f64,
    #[serde(default)]
    pub center_y: f64,
    #[serde(default)]
    pub orientation: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuadrangleConfig {
    pub top_left: PointConfig,
    pub top_right: PointConfig,
    pub bottom_left: PointConfig,
    pub bottom_right: PointConfig,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointConfig {
    #[serde(rename = "@x")]
    pub x: f64,
    #[serde(rename = "@y")]
    pub y: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MappingConfig {
    #[serde(rename = "virtual_axis", default)]
    pub virtual_axis: Vec<VirtualAxisConfig>,
    #[serde(rename = "ignore", default)]
    pub ignore: Vec<IgnoreConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VirtualAxisConfig {
    #[serde(rename = "@code")]
    pub code: i32,
    #[serde(rename = "@logical")]
    pub logical: String,
    #[serde(rename = "@priority", default)]
    pub priority: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IgnoreConfig {
    #[serde(rename = "@code")]
    pub code: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupConfig {
    pub uuid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NeighbourConfig {
    pub uuid: String,
    pub azimuth: Angle,
    pub altitude: Angle,
    pub distance: f64,
}

/// Parses a `muse_config` document from its serialized form.
pub fn parse_config(path: &str, xml: &str) -> Result<MuseConfig, ConfigError> {
    quick_xml::de::from_str(xml).map_err(|e| ConfigError::Malformed {
        path: path.to_owned(),
        reason: e.to_string(),
    })
}

pub fn load_config(path: &str) -> Result<MuseConfig, ConfigError> {
    let xml = std::fs::read_to_string(path).map_err(|e| ConfigError::Malformed {
        path: path.to_owned(),
        reason: e.to_string(),
    })?;
    parse_config(path, &xml)
}

fn parse_uuid128(path: &str, element: &str, raw: &str) -> Result<Uuid128, ConfigError> {
    let trimmed = raw.trim().trim_start_matches("0x");
    u128::from_str_radix(trimmed, 16)
        .map(Uuid128)
        .map_err(|e| ConfigError::Invalid {
            path: path.to_owned(),
            element: element.to_owned(),
            reason: format!("not a 128-bit hex uuid: {e}"),
        })
}

fn parse_purpose(path: &str, raw: Option<&str>) -> Result<SensorPurpose, ConfigError> {
    match raw.unwrap_or("source") {
        "source" => Ok(SensorPurpose::Source),
        "observer" => Ok(SensorPurpose::Observer),
        "tagger" => Ok(SensorPurpose::Tagger),
        other => Err(ConfigError::Invalid {
            path: path.to_owned(),
            element: "purpose".to_owned(),
            reason: format!("unknown sensor purpose {other:?}"),
        }),
    }
}

fn parse_translation_mode(path: &str, raw: Option<&str>) -> Result<TranslationMode, ConfigError> {
    match raw.unwrap_or("intact") {
        "intact" => Ok(TranslationMode::Intact),
        "setup_once" => Ok(TranslationMode::SetupOnce),
        "setup_continuous" => Ok(TranslationMode::SetupContinuous),
        other => Err(ConfigError::Invalid {
            path: path.to_owned(),
            element: "translation_mode".to_owned(),
            reason: format!("unknown translation mode {other:?}"),
        }),
    }
}

fn parse_logical_axis(path: &str, raw: &str) -> Result<LogicalAxis, ConfigError> {
    match raw {
        "x" => Ok(LogicalAxis::X),
        "y" => Ok(LogicalAxis::Y),
        "z" => Ok(LogicalAxis::Z),
        "pressure" => Ok(LogicalAxis::Pressure),
        "major" => Ok(LogicalAxis::Major),
        "minor" => Ok(LogicalAxis::Minor),
        "orientation" => Ok(LogicalAxis::Orientation),
        "width" => Ok(LogicalAxis::Width),
        "tracking_id" => Ok(LogicalAxis::TrackingId),
        "slot" => Ok(LogicalAxis::Slot),
        other => Err(ConfigError::Invalid {
            path: path.to_owned(),
            element: "mapping/virtual_axis".to_owned(),
            reason: format!("unknown logical axis {other:?}"),
        }),
    }
}

/// What the sensor element in one wrapper's config resolves to: topology
/// metadata for the publisher, a viewport for the projector adaptor, and
/// an axis-mapping table for the tracker. Mirrors the original wrapper's
/// per-device setup step, which builds exactly these three things from the
/// same config block before opening the device.
pub struct ResolvedSensor {
    pub uuid: Uuid128,
    pub topology: SensorTopology,
    pub viewport: Viewport,
    pub mapping: AxisMapping,
}

pub fn resolve_sensor(path: &str, sensor: &SensorConfig) -> Result<ResolvedSensor, ConfigError> {
    let uuid = parse_uuid128(path, "sensor/uuid", &sensor.uuid)?;
    let purpose = parse_purpose(path, sensor.purpose.as_deref())?;
    let translation_mode = parse_translation_mode(path, sensor.translation_mode.as_deref())?;

    let mut topology = SensorTopology::new(uuid, translation_mode, purpose);
    for group in &sensor.groups {
        topology.joins_group(parse_uuid128(path, "sensor/group/uuid", &group.uuid)?);
    }
    for neighbour in &sensor.neighbours {
        topology.declares_neighbour(NeighbourDeclaration {
            neighbour_uuid: parse_uuid128(path, "sensor/neighbour/uuid", &neighbour.uuid)?,
            azimuth: neighbour.azimuth,
            altitude: neighbour.altitude,
            distance: neighbour.distance,
        });
    }

    let viewport = Viewport::new(
        uuid,
        sensor.viewport.width,
        sensor.viewport.height,
        Point2::new(sensor.viewport.center_x, sensor.viewport.center_y),
        sensor.viewport.orientation,
    );

    let mut mapping = AxisMapping::new();
    for entry in &sensor.mapping.virtual_axis {
        let logical = parse_logical_axis(path, &entry.logical)?;
        mapping.map_code(entry.code, logical, entry.priority);
    }
    for entry in &sensor.mapping.ignore {
        mapping.map_code(entry.code, LogicalAxis::Ignore, i32::MIN);
    }

    Ok(ResolvedSensor {
        uuid,
        topology,
        viewport,
        mapping,
    })
}

/// Looks up a named wrapper's config block; `config_invalid` (missing
/// element) if no wrapper carries that name.
pub fn find_wrapper<'a>(config: &'a MuseConfig, path: &str, name: &str) -> Result<&'a WrapperConfig, ConfigError> {
    config
        .wrappers
        .iter()
        .find(|w| w.name == name)
        .ok_or_else(|| ConfigError::Invalid {
            path: path.to_owned(),
            element: "wrapper".to_owned(),
            reason: format!("no wrapper named {name:?}"),
        })
}

/// Sensors indexed by uuid, as the topology publisher and the projector
/// chain both want to look a sensor up by identity rather than position.
pub fn sensors_by_uuid(resolved: &[ResolvedSensor]) -> HashMap<Uuid128, usize> {
    resolved.iter().enumerate().map(|(i, s)| (s.uuid, i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <muse_config>
          <wrapper name="mwtouch">
            <config>
              <target>127.0.0.1:3333</target>
              <device>/dev/input/event4</device>
              <ui>console</ui>
              <sensor>
                <uuid>0x1</uuid>
                <purpose>source</purpose>
                <translation_mode>intact</translation_mode>
                <viewport>
                  <width>1920</width>
                  <height>1080</height>
                  <center_x>960</center_x>
                  <center_y>540</center_y>
                  <orientation>0</orientation>
                </viewport>
                <mapping>
                  <virtual_axis code="53" logical="x" priority="0"/>
                  <virtual_axis code="54" logical="y" priority="0"/>
                  <ignore code="47"/>
                </mapping>
                <group>
                  <uuid>0x2</uuid>
                </group>
              </sensor>
            </config>
          </wrapper>
        </muse_config>
    "#;

    #[test]
    fn parses_wrapper_generic_options() {
        let config = parse_config("test.xml", SAMPLE).unwrap();
        let wrapper = find_wrapper(&config, "test.xml", "mwtouch").unwrap();
        assert_eq!(wrapper.config.target.as_deref(), Some("127.0.0.1:3333"));
        assert_eq!(wrapper.config.device.as_deref(), Some("/dev/input/event4"));
        assert_eq!(wrapper.config.ui.as_deref(), Some("console"));
    }

    #[test]
    fn resolves_sensor_topology_viewport_and_mapping() {
        let config = parse_config("test.xml", SAMPLE).unwrap();
        let wrapper = find_wrapper(&config, "test.xml", "mwtouch").unwrap();
        let sensor = &wrapper.config.sensors[0];
        let resolved = resolve_sensor("test.xml", sensor).unwrap();

        assert_eq!(resolved.uuid, Uuid128(1));
        assert_eq!(resolved.topology.groups, vec![Uuid128(2)]);
        assert_eq!(resolved.viewport.width, 1920.0);
        assert_eq!(resolved.mapping.lookup(53), (LogicalAxis::X, 0));
        assert_eq!(resolved.mapping.lookup(47), (LogicalAxis::Ignore, i32::MIN));
    }

    #[test]
    fn unknown_wrapper_name_is_config_invalid() {
        let config = parse_config("test.xml", SAMPLE).unwrap();
        assert!(find_wrapper(&config, "test.xml", "nope").is_err());
    }

    #[test]
    fn malformed_xml_is_rejected() {
        assert!(parse_config("test.xml", "<not-xml").is_err());
    }
}
