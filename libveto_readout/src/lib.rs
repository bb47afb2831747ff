//! # veto_readout
//!
//! veto_readout generates the readout description of the IAXO veto system. It takes the
//! geometry metadata of a simulation (the positions of every veto scintillator and its light
//! guide), builds one readout plane per veto, wires each veto channel to its DAQ channel, checks
//! that the result is consistent, and merges it into the existing micromegas readouts.
//!
//! ## Installation
//!
//! The only method of install is from source. If you have not used Rust before, see the
//! [Rust docs](https://www.rust-lang.org/tools/install) for installation instructions of the
//! tool chain.
//!
//! To build and install the CLI use `cargo install --path ./veto_readout_cli` from the top level
//! repository. To use the CLI see the `veto_readout_cli` README.
//!
//! ## Procedure
//!
//! 1. Find all veto volumes (`^scintillatorVolume`) and light guides
//!    (`^scintillatorLightGuideVolume`) in the geometry. Both lists must have the same length; they
//!    are paired by order.
//! 2. For each veto compute the readout position, the normal (pointing from the light guide into
//!    the veto) and the height (the length encoded in the volume name, e.g. `800.0mm`).
//! 3. Build one `veto` readout plane per veto, padded by a small delta so that points on the veto
//!    boundary are still collected. The DAQ ID is looked up from the alias of the veto
//!    (`Top_L1_N4` and friends) in the alias map.
//! 4. Write the veto readout, read it back and check that nothing changed.
//! 5. Check that the center of every veto resolves to the DAQ ID it was given, and sample random
//!    points to make sure no two vetoes overlap.
//! 6. Append the veto planes to each micromegas readout, write the complete readout, read it back
//!    and check that all channel and DAQ IDs are unique.
//!
//! Any failed check stops the procedure with an error.
//!
//! ## Configuration
//!
//! The YAML format of a configuration file is as follows:
//!
//! ```yml
//! geometry_path: geometry.yml
//! micromegas_readout_path: readouts/readoutMicromegas.yml
//! veto_readout_path: readouts/readoutVetoSystem.yml
//! full_readout_path: readouts/readoutComplete.yml
//! readout_names:
//! - iaxoD0Readout
//! - iaxoD1Readout
//! veto_readout_name: vetoSystemReadout
//! alias_map_path: null
//! veto_volume_expression: ^scintillatorVolume
//! light_guide_expression: ^scintillatorLightGuideVolume
//! boundary_delta: 1.0
//! module_width: 200.0
//! module_thickness: 50.0
//! monte_carlo_samples: 5000000
//! monte_carlo_half_extent: 2000.0
//! monte_carlo_seed: null
//! ```
//!
//! Note that if the `alias_map_path` field is set to `null`, the bundled default map will be used.
//! Setting `monte_carlo_samples` to 0 skips the overlap sampling.
//!
//! ### Alias Map Format
//!
//! The alias map is a CSV file with a header line. The columns are as follows:
//!
//! ```csv
//! alias,daq_id
//! ```
//!
//! DAQ IDs must be positive and unique.
//!
//! ### Geometry Format
//!
//! ```yml
//! volumes:
//! - physical: VetoSystem_vetoSystemTop_vetoLayerTop1_assembly-1.veto1_scintillatorVolume-800.0mm-f1a5df8a
//!   logical: scintillatorVolume-800.0mm
//!   position: [0.0, 300.0, 0.0]
//! ```
//!
//! An optional `alternative_name` can be given for volumes whose Geant4 name differs from the
//! name in the geometry description.
//!
//! ## Output
//!
//! Readout files are YAML documents holding one or more named readouts:
//!
//! ```text
//! readouts
//! |---- iaxoD0Readout
//! |    |---- planes - id, type, position, normal, height, axis_x
//! |    |    |---- modules - id, name, origin, size, rotation
//! |    |    |    |---- channels - channel_id, daq_id, name
//! |    |    |    |    |---- pixels - origin, size, rotation
//! ```
pub mod alias_map;
pub mod builder;
pub mod config;
pub mod error;
pub mod geometry;
pub mod merge;
pub mod monte_carlo;
pub mod process;
pub mod readout;
pub mod readout_file;
pub mod scan;
pub mod status;
pub mod validator;
pub mod veto_info;
pub mod veto_name;
