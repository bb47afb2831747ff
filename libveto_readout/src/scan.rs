use nalgebra::Vector2;
use std::collections::BTreeMap;

use super::error::ValidationError;
use super::readout::Readout;

/// Result of scanning a grid of points over a readout plane
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaneScan {
    pub n_points: usize,
    pub n_hits: usize,
    /// Every channel found, with its DAQ ID
    pub channel_to_daq_id: BTreeMap<i32, i32>,
}

/// Walk a square grid of side 2 * half_side centered on the plane position, resolving each grid point
/// to a channel. Points are placed just in front of the plane so that they are inside its drift volume.
pub fn scan_plane(
    readout: &Readout,
    plane_index: usize,
    half_side: f64,
    step: f64,
) -> Result<PlaneScan, ValidationError> {
    let plane = readout
        .planes
        .get(plane_index)
        .ok_or(ValidationError::BadPlaneIndex(
            plane_index,
            readout.number_of_planes(),
        ))?;
    if !(step > 0.0) {
        return Err(ValidationError::BadScanStep(step));
    }

    let n_steps = ((2.0 * half_side) / step).ceil() as usize;
    let offset = plane.normal * (plane.height * 1.0e-6);
    let mut scan = PlaneScan::default();
    for i in 0..n_steps {
        let x = -half_side + step * i as f64;
        for j in 0..n_steps {
            let y = -half_side + step * j as f64;
            let point = plane.to_world_coordinates(&Vector2::new(x, y)) + offset;
            scan.n_points += 1;
            if let Some(hit) = plane.find_hit(&point) {
                scan.n_hits += 1;
                scan.channel_to_daq_id.insert(hit.channel_id, hit.daq_id);
            }
        }
    }

    log::info!(
        "Scanned {} points on plane {}: {} hits, {} unique channels",
        scan.n_points,
        plane_index,
        scan.n_hits,
        scan.channel_to_daq_id.len()
    );
    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readout::tests::micromegas_plane;

    #[test]
    fn test_scan_micromegas() {
        let mut readout = Readout::default();
        readout.add_plane(micromegas_plane(100));
        let scan = scan_plane(&readout, 0, 35.0, 0.5).unwrap();
        assert_eq!(scan.n_points, 140 * 140);
        assert_eq!(scan.channel_to_daq_id.len(), 4);
        assert_eq!(scan.channel_to_daq_id.get(&3), Some(&103));
        assert!(scan.n_hits < scan.n_points);
    }

    #[test]
    fn test_scan_errors() {
        let mut readout = Readout::default();
        readout.add_plane(micromegas_plane(100));
        assert!(matches!(
            scan_plane(&readout, 3, 35.0, 0.5),
            Err(ValidationError::BadPlaneIndex(3, 1))
        ));
        assert!(matches!(
            scan_plane(&readout, 0, 35.0, 0.0),
            Err(ValidationError::BadScanStep(_))
        ));
    }
}
