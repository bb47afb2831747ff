// The readout is a strict ownership tree: Readout -> Plane -> Module -> Channel -> Pixel.
// Finding the channel that collects a point walks the tree top down:
//   point -> plane (is the point within the drift volume in front of the plane?)
//         -> module (does the projection fall in the module rectangle?)
//         -> pixel  (does it fall in one of the channel's pixels?)
// Each rectangle test is done in the local 2D frame of its parent.
use nalgebra::{Rotation2, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Tag telling what kind of detector a readout plane belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaneType {
    #[default]
    Generic,
    Micromegas,
    Veto,
}

impl Display for PlaneType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generic => write!(f, "generic"),
            Self::Micromegas => write!(f, "micromegas"),
            Self::Veto => write!(f, "veto"),
        }
    }
}

/// Result of resolving a point to a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelHit {
    pub daq_id: i32,
    pub module_id: i32,
    pub channel_id: i32,
}

/// Test if a point lies inside the rectangle [0, size] after moving it into the frame
/// defined by origin and rotation (degrees)
fn is_inside_rectangle(
    point: &Vector2<f64>,
    origin: &Vector2<f64>,
    size: &Vector2<f64>,
    rotation: f64,
) -> bool {
    let mut local = point - origin;
    if rotation != 0.0 {
        local = Rotation2::new(-rotation.to_radians()) * local;
    }
    local.x >= 0.0 && local.x <= size.x && local.y >= 0.0 && local.y <= size.y
}

/// Rectangular pixel, with coordinates relative to the module origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadoutPixel {
    pub origin: Vector2<f64>,
    pub size: Vector2<f64>,
    #[serde(default)]
    pub rotation: f64,
}

impl ReadoutPixel {
    pub fn new(origin: Vector2<f64>, size: Vector2<f64>) -> Self {
        Self {
            origin,
            size,
            rotation: 0.0,
        }
    }

    pub fn contains(&self, module_point: &Vector2<f64>) -> bool {
        is_inside_rectangle(module_point, &self.origin, &self.size, self.rotation)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadoutChannel {
    pub channel_id: i32,
    pub daq_id: i32,
    #[serde(default)]
    pub name: String,
    pub pixels: Vec<ReadoutPixel>,
}

impl ReadoutChannel {
    pub fn contains(&self, module_point: &Vector2<f64>) -> bool {
        self.pixels.iter().any(|p| p.contains(module_point))
    }
}

/// A module is a rectangle on the readout plane, holding channels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadoutModule {
    pub id: i32,
    pub name: String,
    /// Position of the module corner in the plane frame
    pub origin: Vector2<f64>,
    pub size: Vector2<f64>,
    /// Rotation around the origin, in degrees
    #[serde(default)]
    pub rotation: f64,
    pub channels: Vec<ReadoutChannel>,
}

impl ReadoutModule {
    /// Transform plane coordinates to module coordinates
    pub fn to_module_coordinates(&self, plane_point: &Vector2<f64>) -> Vector2<f64> {
        let local = plane_point - self.origin;
        if self.rotation != 0.0 {
            Rotation2::new(-self.rotation.to_radians()) * local
        } else {
            local
        }
    }

    pub fn contains(&self, plane_point: &Vector2<f64>) -> bool {
        is_inside_rectangle(plane_point, &self.origin, &self.size, self.rotation)
    }

    /// Index of the channel collecting the point, if any
    pub fn find_channel(&self, plane_point: &Vector2<f64>) -> Option<usize> {
        let module_point = self.to_module_coordinates(plane_point);
        self.channels.iter().position(|c| c.contains(&module_point))
    }
}

/// A readout plane and the drift volume in front of it
///
/// The drift volume spans from the plane position up to `height` along the normal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadoutPlane {
    pub id: i32,
    #[serde(rename = "type", default)]
    pub kind: PlaneType,
    pub position: Vector3<f64>,
    pub normal: Vector3<f64>,
    pub height: f64,
    pub axis_x: Vector3<f64>,
    pub modules: Vec<ReadoutModule>,
}

impl ReadoutPlane {
    pub fn axis_y(&self) -> Vector3<f64> {
        self.normal.cross(&self.axis_x)
    }

    /// Signed distance of the point from the plane, along the normal
    pub fn distance_to_plane(&self, point: &Vector3<f64>) -> f64 {
        (point - self.position).dot(&self.normal)
    }

    pub fn is_inside_drift_volume(&self, point: &Vector3<f64>) -> bool {
        let distance = self.distance_to_plane(point);
        distance >= 0.0 && distance <= self.height
    }

    /// Project a point onto the plane frame
    pub fn to_plane_coordinates(&self, point: &Vector3<f64>) -> Vector2<f64> {
        let relative = point - self.position;
        Vector2::new(relative.dot(&self.axis_x), relative.dot(&self.axis_y()))
    }

    /// World position of a point given in the plane frame
    pub fn to_world_coordinates(&self, plane_point: &Vector2<f64>) -> Vector3<f64> {
        self.position + self.axis_x * plane_point.x + self.axis_y() * plane_point.y
    }

    /// Resolve the point to a channel of this plane, if any
    pub fn find_hit(&self, point: &Vector3<f64>) -> Option<ChannelHit> {
        if !self.is_inside_drift_volume(point) {
            return None;
        }
        let plane_point = self.to_plane_coordinates(point);
        self.modules
            .iter()
            .filter(|m| m.contains(&plane_point))
            .find_map(|m| {
                m.find_channel(&plane_point).map(|c| ChannelHit {
                    daq_id: m.channels[c].daq_id,
                    module_id: m.id,
                    channel_id: m.channels[c].channel_id,
                })
            })
    }

    pub fn number_of_channels(&self) -> usize {
        self.modules.iter().map(|m| m.channels.len()).sum()
    }

    pub fn channels(&self) -> impl Iterator<Item = &ReadoutChannel> {
        self.modules.iter().flat_map(|m| m.channels.iter())
    }
}

/// The full readout of a detector: an ordered list of planes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Readout {
    pub planes: Vec<ReadoutPlane>,
}

impl Readout {
    pub fn add_plane(&mut self, plane: ReadoutPlane) {
        self.planes.push(plane);
    }

    pub fn number_of_planes(&self) -> usize {
        self.planes.len()
    }

    pub fn number_of_channels(&self) -> usize {
        self.planes.iter().map(|p| p.number_of_channels()).sum()
    }

    pub fn channels(&self) -> impl Iterator<Item = &ReadoutChannel> {
        self.planes.iter().flat_map(|p| p.channels())
    }

    /// Resolve the point against a single plane. None if the plane index is invalid or nothing collects the point.
    pub fn find_hit_at_plane(&self, point: &Vector3<f64>, plane_index: usize) -> Option<ChannelHit> {
        self.planes.get(plane_index)?.find_hit(point)
    }

    /// Resolve the point against every plane, returning (plane index, hit) for each plane claiming it
    pub fn find_hits(&self, point: &Vector3<f64>) -> Vec<(usize, ChannelHit)> {
        self.planes
            .iter()
            .enumerate()
            .filter_map(|(idx, p)| p.find_hit(point).map(|hit| (idx, hit)))
            .collect()
    }

    /// DAQ IDs of every channel, plane by plane
    pub fn daq_ids(&self) -> Vec<Vec<i32>> {
        self.planes
            .iter()
            .map(|p| p.channels().map(|c| c.daq_id).collect())
            .collect()
    }
}

impl Display for Readout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Readout with {} planes and {} channels",
            self.number_of_planes(),
            self.number_of_channels()
        )?;
        for plane in self.planes.iter() {
            writeln!(
                f,
                "  Plane {} ({}) - position: ({}, {}, {}) normal: ({}, {}, {}) height: {} modules: {} channels: {}",
                plane.id,
                plane.kind,
                plane.position.x,
                plane.position.y,
                plane.position.z,
                plane.normal.x,
                plane.normal.y,
                plane.normal.z,
                plane.height,
                plane.modules.len(),
                plane.number_of_channels()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 60 x 60 micromegas plane at the origin with a 2 x 2 grid of channels
    pub(crate) fn micromegas_plane(first_daq_id: i32) -> ReadoutPlane {
        let mut channels = Vec::new();
        for i in 0..2 {
            for j in 0..2 {
                let id = i * 2 + j;
                channels.push(ReadoutChannel {
                    channel_id: id,
                    daq_id: first_daq_id + id,
                    name: format!("strip{id}"),
                    pixels: vec![ReadoutPixel::new(
                        Vector2::new(30.0 * i as f64, 30.0 * j as f64),
                        Vector2::new(30.0, 30.0),
                    )],
                });
            }
        }
        ReadoutPlane {
            id: 0,
            kind: PlaneType::Micromegas,
            position: Vector3::zeros(),
            normal: Vector3::z(),
            height: 300.0,
            axis_x: Vector3::x(),
            modules: vec![ReadoutModule {
                id: 0,
                name: String::from("mm"),
                origin: Vector2::new(-30.0, -30.0),
                size: Vector2::new(60.0, 60.0),
                rotation: 0.0,
                channels,
            }],
        }
    }

    #[test]
    fn test_find_hit() {
        let plane = micromegas_plane(100);
        let hit = plane.find_hit(&Vector3::new(-10.0, -10.0, 5.0)).unwrap();
        assert_eq!(hit.channel_id, 0);
        assert_eq!(hit.daq_id, 100);
        let hit = plane.find_hit(&Vector3::new(-10.0, 10.0, 5.0)).unwrap();
        assert_eq!(hit.channel_id, 1);
        let hit = plane.find_hit(&Vector3::new(10.0, -10.0, 5.0)).unwrap();
        assert_eq!(hit.channel_id, 2);
        let hit = plane.find_hit(&Vector3::new(10.0, 10.0, 299.0)).unwrap();
        assert_eq!(hit.daq_id, 103);
    }

    #[test]
    fn test_outside() {
        let plane = micromegas_plane(100);
        // behind the plane
        assert!(plane.find_hit(&Vector3::new(-10.0, -10.0, -1.0)).is_none());
        // beyond the drift volume
        assert!(plane.find_hit(&Vector3::new(-10.0, -10.0, 301.0)).is_none());
        // outside the module
        assert!(plane.find_hit(&Vector3::new(31.0, 0.0, 5.0)).is_none());
    }

    #[test]
    fn test_rotated_module() {
        let mut plane = micromegas_plane(100);
        // rotate by 90 degrees around the module origin: module now covers x in [-90, -30], y in [-30, 30]
        plane.modules[0].rotation = 90.0;
        assert!(plane.find_hit(&Vector3::new(10.0, 10.0, 5.0)).is_none());
        let hit = plane.find_hit(&Vector3::new(-40.0, -20.0, 5.0));
        assert!(hit.is_some());
    }

    #[test]
    fn test_plane_frame() {
        let mut plane = micromegas_plane(0);
        plane.position = Vector3::new(0.0, 0.0, 10.0);
        plane.normal = -Vector3::z();
        // axis_y = normal x axis_x = -z x x = -y
        assert_eq!(plane.axis_y(), -Vector3::y());
        let world = Vector3::new(3.0, 4.0, 5.0);
        let local = plane.to_plane_coordinates(&world);
        assert_eq!(local, Vector2::new(3.0, -4.0));
        let back = plane.to_world_coordinates(&local);
        assert_eq!(back, Vector3::new(3.0, 4.0, 10.0));
        assert!(plane.is_inside_drift_volume(&world));
    }

    #[test]
    fn test_readout_queries() {
        let mut readout = Readout::default();
        readout.add_plane(micromegas_plane(0));
        let mut shifted = micromegas_plane(10);
        shifted.id = 1;
        shifted.position = Vector3::new(0.0, 0.0, 1000.0);
        readout.add_plane(shifted);

        assert_eq!(readout.number_of_planes(), 2);
        assert_eq!(readout.number_of_channels(), 8);
        assert_eq!(readout.daq_ids(), vec![vec![0, 1, 2, 3], vec![10, 11, 12, 13]]);

        let hits = readout.find_hits(&Vector3::new(10.0, 10.0, 1005.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 1);
        assert_eq!(hits[0].1.daq_id, 13);
        assert!(readout.find_hit_at_plane(&Vector3::new(10.0, 10.0, 1005.0), 0).is_none());
        assert!(readout.find_hit_at_plane(&Vector3::zeros(), 7).is_none());
        assert!(readout.to_string().starts_with("Readout with 2 planes and 8 channels"));
    }
}
