use fxhash::FxHashSet;
use nalgebra::{Vector2, Vector3};
use std::collections::BTreeMap;

use super::alias_map::AliasMap;
use super::config::Config;
use super::error::BuilderError;
use super::readout::{PlaneType, Readout, ReadoutChannel, ReadoutModule, ReadoutPixel, ReadoutPlane};
use super::veto_info::VetoInfo;
use super::veto_name::{is_top_or_bottom, VetoName};

/// Geometry parameters of the generated veto readout planes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuilderParams {
    /// Padding added around every veto. Without it points lying on a veto boundary are not assigned
    /// to the veto. The gap between vetoes must always be larger than this.
    pub delta: f64,
    /// Size of the veto cross section along the plane X axis
    pub module_width: f64,
    /// Size of the veto cross section along the plane Y axis
    pub module_thickness: f64,
}

impl Default for BuilderParams {
    fn default() -> Self {
        Self {
            delta: 1.0,
            module_width: 200.0,
            module_thickness: 50.0,
        }
    }
}

impl From<&Config> for BuilderParams {
    fn from(config: &Config) -> Self {
        Self {
            delta: config.boundary_delta,
            module_width: config.module_width,
            module_thickness: config.module_thickness,
        }
    }
}

/// The DAQ ID each veto volume was given when building the readout. This is the reference the
/// validation compares against.
pub type ReferenceMap = BTreeMap<String, i32>;

/// Project the preferred axis onto the plane, so that it is orthogonal to the normal
fn plane_axis_x(veto: &VetoInfo) -> Result<Vector3<f64>, BuilderError> {
    let preferred = if is_top_or_bottom(&veto.volume) {
        Vector3::x()
    } else {
        Vector3::y()
    };
    (preferred - veto.normal * preferred.dot(&veto.normal))
        .try_normalize(1.0e-9)
        .ok_or_else(|| BuilderError::DegenerateAxis(veto.volume.clone()))
}

/// Build the readout plane for a single veto: one module holding one channel holding one pixel
fn build_plane(
    veto: &VetoInfo,
    plane_id: i32,
    daq_id: i32,
    alias: &str,
    params: &BuilderParams,
) -> Result<ReadoutPlane, BuilderError> {
    let delta = params.delta;
    let size = Vector2::new(params.module_width + delta, params.module_thickness + delta);

    let channel = ReadoutChannel {
        channel_id: daq_id,
        daq_id,
        name: alias.to_string(),
        pixels: vec![ReadoutPixel::new(Vector2::zeros(), size)],
    };

    let module = ReadoutModule {
        id: 0,
        name: veto.volume.clone(),
        origin: -size / 2.0,
        size,
        rotation: 0.0,
        channels: vec![channel],
    };

    Ok(ReadoutPlane {
        id: plane_id,
        kind: PlaneType::Veto,
        position: veto.readout_position - veto.normal * delta,
        normal: veto.normal,
        height: veto.height + delta * 2.0,
        axis_x: plane_axis_x(veto)?,
        modules: vec![module],
    })
}

/// Generate the veto system readout. Every veto gets its own plane, and its channel is wired to the
/// DAQ ID the alias map gives for the veto position.
///
/// Fails if any veto has no DAQ ID or if a DAQ ID would be used twice.
pub fn generate_readout(
    veto_info: &[VetoInfo],
    alias_map: &AliasMap,
    params: &BuilderParams,
) -> Result<(Readout, ReferenceMap), BuilderError> {
    alias_map.verify_unique()?;

    let mut readout = Readout::default();
    let mut reference = ReferenceMap::new();
    let mut used_ids = FxHashSet::default();

    for (idx, veto) in veto_info.iter().enumerate() {
        let name = VetoName::parse(&veto.volume)?;
        let daq_id = match alias_map.get_daq_id(&name.alias) {
            Some(id) if id > 0 => id,
            _ => {
                log::error!("Channel ID not found for alias {}", name.alias);
                return Err(BuilderError::UnknownAlias(name.alias));
            }
        };
        if !used_ids.insert(daq_id) {
            return Err(BuilderError::DuplicateDaqID(daq_id, name.alias));
        }

        readout.add_plane(build_plane(veto, idx as i32, daq_id, &name.alias, params)?);
        reference.insert(veto.volume.clone(), daq_id);
    }

    log::info!(
        "Generated veto readout with {} planes",
        readout.number_of_planes()
    );
    Ok((readout, reference))
}
