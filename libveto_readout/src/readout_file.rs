use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::error::ReadoutFileError;
use super::readout::Readout;

/// A file holding one or more named readouts, serialized as YAML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadoutFile {
    pub readouts: BTreeMap<String, Readout>,
}

impl ReadoutFile {
    pub fn read(path: &Path) -> Result<Self, ReadoutFileError> {
        if !path.exists() {
            return Err(ReadoutFileError::BadFilePath(path.to_path_buf()));
        }
        let yaml_str = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Write the file, replacing anything already at the path
    pub fn write(&self, path: &Path) -> Result<(), ReadoutFileError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let yaml_str = serde_yaml::to_string(self)?;
        let mut file = File::create(path)?;
        file.write_all(yaml_str.as_bytes())?;
        log::info!(
            "Wrote {} readout(s) to {} ({})",
            self.readouts.len(),
            path.to_string_lossy(),
            human_bytes::human_bytes(yaml_str.len() as f64)
        );
        Ok(())
    }

    pub fn insert(&mut self, name: &str, readout: Readout) {
        self.readouts.insert(name.to_string(), readout);
    }

    pub fn get(&self, name: &str) -> Result<&Readout, ReadoutFileError> {
        self.readouts
            .get(name)
            .ok_or_else(|| ReadoutFileError::MissingReadout(name.to_string()))
    }
}

/// Write a single readout under the given name and read it back from disk
pub fn write_and_reload(
    readout: Readout,
    name: &str,
    path: &Path,
) -> Result<Readout, ReadoutFileError> {
    let mut file = ReadoutFile::default();
    file.insert(name, readout);
    file.write(path)?;

    let mut reloaded = ReadoutFile::read(path)?;
    reloaded
        .readouts
        .remove(name)
        .ok_or_else(|| ReadoutFileError::MissingReadout(name.to_string()))
}
