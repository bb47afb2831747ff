// The alias map is the wiring table of the veto system: every veto position label
// (Group_L<layer>_N<number>) is connected to exactly one DAQ channel. The table is fixed
// for a given installation, so a default copy is bundled with the code, but it can be
// overridden with a CSV file of the same format.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use fxhash::{FxHashMap, FxHashSet};

use super::error::AliasMapError;

const ENTRIES_PER_LINE: usize = 2; //alias, daq id

/// Load the default map for windows
#[cfg(target_family = "windows")]
fn load_default_map() -> String {
    String::from(include_str!("data\\default_alias_map.csv"))
}

/// Load the default map for macos and linux
#[cfg(target_family = "unix")]
fn load_default_map() -> String {
    String::from(include_str!("data/default_alias_map.csv"))
}

/// AliasMap contains the mapping of veto position labels (e.g. "Top_L1_N4") to the DAQ channel they are wired to.
///
/// The CSV file has a header line followed by rows of two elements: the alias and the DAQ ID.
/// All DAQ IDs must be positive and pairwise distinct; this is checked on load.
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    map: FxHashMap<String, i32>,
}

impl AliasMap {
    /// Create a new AliasMap
    /// If the path is None, we load the default that is bundled with the library
    pub fn new(path: Option<&Path>) -> Result<Self, AliasMapError> {
        let mut contents = String::new();
        if let Some(p) = path {
            let mut file = File::open(p)?;
            file.read_to_string(&mut contents)?;
        } else {
            contents = load_default_map();
        }
        Self::from_csv(&contents)
    }

    /// Parse the CSV contents (including the header line)
    pub fn from_csv(contents: &str) -> Result<Self, AliasMapError> {
        let mut am = AliasMap::default();

        let mut lines = contents.lines();
        lines.next(); // Skip the header
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let entries: Vec<&str> = line.split_terminator(',').map(str::trim).collect();
            if entries.len() != ENTRIES_PER_LINE {
                return Err(AliasMapError::BadFileFormat);
            }

            let alias = entries[0].to_string();
            let daq_id: i32 = entries[1].parse()?;
            if am.map.insert(alias.clone(), daq_id).is_some() {
                return Err(AliasMapError::DuplicateAlias(alias));
            }
        }

        am.verify_unique()?;
        Ok(am)
    }

    /// Verify that every DAQ ID appears exactly once
    pub fn verify_unique(&self) -> Result<(), AliasMapError> {
        let mut seen = FxHashSet::default();
        for daq_id in self.map.values() {
            if *daq_id <= 0 {
                return Err(AliasMapError::InvalidDaqID(*daq_id));
            }
            if !seen.insert(*daq_id) {
                return Err(AliasMapError::DuplicateDaqID(*daq_id));
            }
        }
        Ok(())
    }

    /// Get the DAQ ID for a given alias.
    ///
    /// If returns None the alias does not exist in the map
    pub fn get_daq_id(&self, alias: &str) -> Option<i32> {
        self.map.get(alias).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
