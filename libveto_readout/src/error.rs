use std::path::PathBuf;
use thiserror::Error;

use super::status::ProcessStatus;

#[derive(Debug, Clone, Error)]
pub enum VetoNameError {
    #[error("Could not find the veto group (vetoSystem<Group>) in volume name {0}")]
    MissingGroup(String),
    #[error("Could not find the veto layer (vetoLayer<...><n>) in volume name {0}")]
    MissingLayer(String),
    #[error("Could not find the veto number (.veto<n>_) in volume name {0}")]
    MissingNumber(String),
}

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Could not open geometry because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Geometry failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Geometry failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Geometry was given an invalid volume expression: {0}")]
    BadExpression(#[from] regex::Error),
    #[error("Geometry has no volume named {0}")]
    UnknownVolume(String),
    #[error("No veto volumes found matching expression {0}")]
    NoVetoVolumes(String),
    #[error("No veto light guides found matching expression {0}")]
    NoLightGuides(String),
    #[error("Number of veto volumes ({0}) and veto light guides ({1}) do not match")]
    MismatchedCounts(usize, usize),
    #[error("Veto {0} and its light guide {1} share the same position; cannot compute a normal")]
    DegenerateNormal(String, String),
}

#[derive(Debug, Error)]
pub enum AliasMapError {
    #[error("AliasMap failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("AliasMap failed to parse an integer: {0}")]
    ParsingError(#[from] std::num::ParseIntError),
    #[error("AliasMap was given a file with the incorrect format; most likely the number of columns is incorrect")]
    BadFileFormat,
    #[error("AliasMap contains alias {0} more than once")]
    DuplicateAlias(String),
    #[error("DAQ ID {0} in alias -> DAQ ID map is not unique")]
    DuplicateDaqID(i32),
    #[error("DAQ ID {0} in alias -> DAQ ID map is not a valid (positive) ID")]
    InvalidDaqID(i32),
}

#[derive(Debug, Error)]
pub enum ReadoutFileError {
    #[error("Could not open readout file because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Readout file failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Readout file failed to convert YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Failed to load readout {0}")]
    MissingReadout(String),
}

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("ReadoutBuilder failed due to alias map error: {0}")]
    AliasError(#[from] AliasMapError),
    #[error("ReadoutBuilder failed to decode veto name: {0}")]
    NameError(#[from] VetoNameError),
    #[error("Channel ID not found for alias {0}")]
    UnknownAlias(String),
    #[error("DAQ ID {0} was assigned to more than one veto (alias {1})")]
    DuplicateDaqID(i32, String),
    #[error("Local X axis of veto {0} is parallel to its normal")]
    DegenerateAxis(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("More than one readout plane ({planes:?}) found for point ({x}, {y}, {z})")]
    MultiplePlanes {
        x: f64,
        y: f64,
        z: f64,
        planes: Vec<usize>,
    },
    #[error("Mismatching channels found for {0} veto volume(s)")]
    MismatchedChannels(usize),
    #[error("Number of channels in readout ({n_channels}) does not match number of unique channels (channel IDs: {n_channel_ids}, DAQ IDs: {n_daq_ids})")]
    NonUniqueChannels {
        n_channels: usize,
        n_channel_ids: usize,
        n_daq_ids: usize,
    },
    #[error("Readout round trip changed the readout: {0}")]
    RoundTrip(String),
    #[error("Plane index {0} is out of range for a readout with {1} planes")]
    BadPlaneIndex(usize, usize),
    #[error("Scan step must be positive, got {0}")]
    BadScanStep(f64),
    #[error("Sampling half extent must be finite and non-negative, got {0}")]
    BadExtent(f64),
}

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Merge failed due to readout file error: {0}")]
    FileError(#[from] ReadoutFileError),
    #[error("Merge failed due to validation error: {0}")]
    ValidationError(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Config has no readout names to merge the veto system into")]
    NoReadoutNames,
    #[error("Config boundary delta must be non-negative, got {0}")]
    BadDelta(f64),
    #[error("Config Monte-Carlo half extent must be finite and non-negative, got {0}")]
    BadExtent(f64),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Processor failed due to Geometry error: {0}")]
    GeometryError(#[from] GeometryError),
    #[error("Processor failed due to AliasMap error: {0}")]
    AliasError(#[from] AliasMapError),
    #[error("Processor failed due to ReadoutBuilder error: {0}")]
    BuilderError(#[from] BuilderError),
    #[error("Processor failed due to readout file error: {0}")]
    FileError(#[from] ReadoutFileError),
    #[error("Processor failed due to validation error: {0}")]
    ValidationError(#[from] ValidationError),
    #[error("Processor failed due to Merge error: {0}")]
    MergeError(#[from] MergeError),
    #[error("Processor failed due to Send error: {0}")]
    SendError(#[from] std::sync::mpsc::SendError<ProcessStatus>),
}
