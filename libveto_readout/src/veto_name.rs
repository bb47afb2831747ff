// Veto volume names carry everything we need to know about a veto. A typical name is
// "VetoSystem_vetoSystemFront_vetoLayerBack3_assembly-22.veto3_scintillatorVolume-800.0mm-f1a5df8a"
// which reads as: group Front, layer 3, veto 3, 800 mm long. The alias used by the DAQ
// wiring table is then "Front_L3_N3".
use regex::Regex;
use std::sync::OnceLock;

use super::error::VetoNameError;

fn length_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+\.\d+mm").unwrap())
}

fn group_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"vetoSystem([A-Z][A-Za-z]*)").unwrap())
}

fn layer_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"vetoLayer[A-Za-z]*(\d+)").unwrap())
}

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.veto(\d+)_").unwrap())
}

/// Extract the length encoded in a volume name, e.g. "...LightGuideVolume-800.0mm-f1a5df8a" -> 800.0
///
/// Returns None if no length is present or it cannot be parsed
pub fn extract_length(input: &str) -> Option<f64> {
    let found = length_regex().find(input)?;
    found.as_str().trim_end_matches("mm").parse::<f64>().ok()
}

/// Top and bottom vetoes are rotated with respect to the others, so their readout plane uses a different local axis
pub fn is_top_or_bottom(name: &str) -> bool {
    name.contains("vetoSystemTop") || name.contains("vetoSystemBottom")
}

/// The decoded position of a veto inside the veto system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VetoName {
    pub group: String,
    pub layer: u32,
    pub number: u32,
    pub alias: String,
}

impl VetoName {
    pub fn parse(volume: &str) -> Result<Self, VetoNameError> {
        let group = group_regex()
            .captures(volume)
            .map(|c| c[1].to_string())
            .ok_or_else(|| VetoNameError::MissingGroup(volume.to_string()))?;
        let layer = layer_regex()
            .captures(volume)
            .and_then(|c| c[1].parse::<u32>().ok())
            .ok_or_else(|| VetoNameError::MissingLayer(volume.to_string()))?;
        let number = number_regex()
            .captures(volume)
            .and_then(|c| c[1].parse::<u32>().ok())
            .ok_or_else(|| VetoNameError::MissingNumber(volume.to_string()))?;

        let alias = format!("{group}_L{layer}_N{number}");
        Ok(Self {
            group,
            layer,
            number,
            alias,
        })
    }
}
