use nalgebra::Vector3;
use std::fmt::Display;

use super::config::Config;
use super::error::GeometryError;
use super::geometry::GeometryInfo;
use super::veto_name::extract_length;

/// Everything needed to build the readout of a single veto.
#[derive(Debug, Clone, PartialEq)]
pub struct VetoInfo {
    /// Physical volume name
    pub volume: String,
    /// Physical light guide volume name
    pub light_guide: String,
    /// Position of the readout in the world frame. This is not the position of the volume,
    /// it is the center of the side of the volume where the light guide is attached.
    pub readout_position: Vector3<f64>,
    /// Unit normal to the readout surface, pointing into the veto
    pub normal: Vector3<f64>,
    /// Distance between the readout and the far end of the veto
    pub height: f64,
}

impl VetoInfo {
    /// Center of the veto volume
    pub fn center(&self) -> Vector3<f64> {
        self.readout_position + self.normal * (self.height / 2.0)
    }

    /// Far end of the veto, opposite to the readout
    pub fn limit(&self) -> Vector3<f64> {
        self.readout_position + self.normal * self.height
    }
}

impl Display for VetoInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "VetoInfo{{volume={}, lightGuide={}, readoutPosition=({}, {}, {}), normal=({}, {}, {}), height={}}}",
            self.volume,
            self.light_guide,
            self.readout_position.x,
            self.readout_position.y,
            self.readout_position.z,
            self.normal.x,
            self.normal.y,
            self.normal.z,
            self.height
        )
    }
}

/// Find every veto and its light guide in the geometry and compute their readout information
///
/// Vetoes and light guides are paired by the order in which they are found
pub fn collect_veto_info(
    geometry: &GeometryInfo,
    config: &Config,
) -> Result<Vec<VetoInfo>, GeometryError> {
    let veto_volumes = geometry.volumes_from_expression(&config.veto_volume_expression)?;
    if veto_volumes.is_empty() {
        return Err(GeometryError::NoVetoVolumes(
            config.veto_volume_expression.clone(),
        ));
    }
    let light_guides = geometry.volumes_from_expression(&config.light_guide_expression)?;
    if light_guides.is_empty() {
        return Err(GeometryError::NoLightGuides(
            config.light_guide_expression.clone(),
        ));
    }
    if veto_volumes.len() != light_guides.len() {
        return Err(GeometryError::MismatchedCounts(
            veto_volumes.len(),
            light_guides.len(),
        ));
    }

    log::info!("Found {} veto volumes", veto_volumes.len());

    let mut veto_info = Vec::with_capacity(veto_volumes.len());
    for (volume, light_guide) in veto_volumes.into_iter().zip(light_guides) {
        let veto_position = geometry.position(&volume)?;
        let normal = (veto_position - geometry.position(&light_guide)?)
            .try_normalize(f64::EPSILON)
            .ok_or_else(|| GeometryError::DegenerateNormal(volume.clone(), light_guide.clone()))?;
        let height = match extract_length(&volume) {
            Some(h) => h,
            None => {
                log::warn!("No length found in veto name {volume}; using a height of 0");
                0.0
            }
        };
        let readout_position = veto_position - normal * (height / 2.0);

        veto_info.push(VetoInfo {
            volume,
            light_guide,
            readout_position,
            normal,
            height,
        });
    }

    Ok(veto_info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PhysicalVolume;

    fn volume(name: &str, logical: &str, position: Vector3<f64>) -> PhysicalVolume {
        PhysicalVolume {
            physical: name.to_string(),
            logical: logical.to_string(),
            alternative_name: None,
            position,
        }
    }

    #[test]
    fn test_collect() {
        let geometry = GeometryInfo {
            volumes: vec![
                volume(
                    "VetoSystem_vetoSystemTop_vetoLayerTop1_assembly-1.veto1_scintillatorVolume-800.0mm-aa",
                    "scintillatorVolume-800.0mm",
                    Vector3::new(0.0, 300.0, 0.0),
                ),
                volume(
                    "VetoSystem_vetoSystemTop_vetoLayerTop1_assembly-1.veto1_scintillatorLightGuideVolume-800.0mm-aa",
                    "scintillatorLightGuideVolume-800.0mm",
                    Vector3::new(0.0, 300.0, -500.0),
                ),
            ],
        };
        let info = collect_veto_info(&geometry, &Config::default()).unwrap();
        assert_eq!(info.len(), 1);
        let veto = &info[0];
        assert_eq!(veto.normal, Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(veto.height, 800.0);
        assert_eq!(veto.readout_position, Vector3::new(0.0, 300.0, -400.0));
        assert_eq!(veto.center(), Vector3::new(0.0, 300.0, 0.0));
        assert_eq!(veto.limit(), Vector3::new(0.0, 300.0, 400.0));
        assert!(veto.to_string().starts_with("VetoInfo{volume=VetoSystem_vetoSystemTop"));
    }

    #[test]
    fn test_mismatched_counts() {
        let geometry = GeometryInfo {
            volumes: vec![
                volume("a", "scintillatorVolume", Vector3::zeros()),
                volume("b", "scintillatorVolume", Vector3::zeros()),
                volume("c", "scintillatorLightGuideVolume", Vector3::x()),
            ],
        };
        assert!(matches!(
            collect_veto_info(&geometry, &Config::default()),
            Err(GeometryError::MismatchedCounts(2, 1))
        ));
    }

    #[test]
    fn test_missing_volumes() {
        let geometry = GeometryInfo {
            volumes: vec![volume("c", "scintillatorLightGuideVolume", Vector3::x())],
        };
        assert!(matches!(
            collect_veto_info(&geometry, &Config::default()),
            Err(GeometryError::NoVetoVolumes(_))
        ));

        let geometry = GeometryInfo {
            volumes: vec![volume("a", "scintillatorVolume", Vector3::x())],
        };
        assert!(matches!(
            collect_veto_info(&geometry, &Config::default()),
            Err(GeometryError::NoLightGuides(_))
        ));
    }

    #[test]
    fn test_degenerate_normal() {
        let geometry = GeometryInfo {
            volumes: vec![
                volume("a", "scintillatorVolume", Vector3::x()),
                volume("b", "scintillatorLightGuideVolume", Vector3::x()),
            ],
        };
        assert!(matches!(
            collect_veto_info(&geometry, &Config::default()),
            Err(GeometryError::DegenerateNormal(_, _))
        ));
    }
}
