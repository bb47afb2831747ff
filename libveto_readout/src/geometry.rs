use nalgebra::Vector3;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::GeometryError;

/// A single physical volume of the simulation geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalVolume {
    /// Physical volume name as given by Geant4
    pub physical: String,
    /// Name of the logical volume this is a placement of
    pub logical: String,
    /// Name given by the geometry description (GDML), if different from the Geant4 name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_name: Option<String>,
    /// Position in the world frame (mm)
    pub position: Vector3<f64>,
}

impl PhysicalVolume {
    /// The name we report the volume by: the alternative name if there is one
    pub fn name(&self) -> &str {
        self.alternative_name.as_deref().unwrap_or(&self.physical)
    }
}

/// GeometryInfo is the geometry metadata extracted from a simulation.
///
/// Volumes are kept in the order they appear in the file; pairing of vetoes and light guides
/// relies on this order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeometryInfo {
    pub volumes: Vec<PhysicalVolume>,
}

impl GeometryInfo {
    /// Read the geometry metadata from a YAML file
    pub fn read_file(path: &Path) -> Result<Self, GeometryError> {
        if !path.exists() {
            return Err(GeometryError::BadFilePath(path.to_path_buf()));
        }
        let yaml_str = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    pub fn physical_volumes_matching(&self, expression: &str) -> Result<Vec<String>, GeometryError> {
        let re = Regex::new(expression)?;
        Ok(self
            .volumes
            .iter()
            .filter(|v| {
                re.is_match(&v.physical)
                    || v.alternative_name
                        .as_deref()
                        .is_some_and(|n| re.is_match(n))
            })
            .map(|v| v.name().to_string())
            .collect())
    }

    /// Unique logical volume names matching the expression, in order of first appearance
    pub fn logical_volumes_matching(&self, expression: &str) -> Result<Vec<String>, GeometryError> {
        let re = Regex::new(expression)?;
        let mut logicals: Vec<String> = Vec::new();
        for volume in self.volumes.iter() {
            if re.is_match(&volume.logical) && !logicals.contains(&volume.logical) {
                logicals.push(volume.logical.clone());
            }
        }
        Ok(logicals)
    }

    pub fn physical_volumes_from_logical<'a>(
        &'a self,
        logical: &'a str,
    ) -> impl Iterator<Item = &'a PhysicalVolume> + 'a {
        self.volumes.iter().filter(move |v| v.logical == logical)
    }

    /// Get all physical volumes matching the expression. The expression can match either the physical volume
    /// name or the logical volume name; physical names take precedence.
    pub fn volumes_from_expression(&self, expression: &str) -> Result<Vec<String>, GeometryError> {
        let mut volumes = self.physical_volumes_matching(expression)?;
        if volumes.is_empty() {
            for logical in self.logical_volumes_matching(expression)? {
                volumes.extend(
                    self.physical_volumes_from_logical(&logical)
                        .map(|v| v.name().to_string()),
                );
            }
        }
        Ok(volumes)
    }

    /// World position of a volume, looked up by either its physical or alternative name
    pub fn position(&self, name: &str) -> Result<Vector3<f64>, GeometryError> {
        self.volumes
            .iter()
            .find(|v| v.physical == name || v.alternative_name.as_deref() == Some(name))
            .map(|v| v.position)
            .ok_or_else(|| GeometryError::UnknownVolume(name.to_string()))
    }
}
