use nalgebra::Vector3;
use std::collections::{BTreeMap, BTreeSet};

use super::builder::ReferenceMap;
use super::error::ValidationError;
use super::readout::{ChannelHit, Readout};
use super::veto_info::VetoInfo;

/// Find the single plane collecting a point. More than one plane claiming the point is an error.
pub fn find_unique_hit(
    readout: &Readout,
    point: &Vector3<f64>,
) -> Result<Option<(usize, ChannelHit)>, ValidationError> {
    let mut hits = readout.find_hits(point);
    if hits.len() > 1 {
        log::error!(
            "More than one readout plane found for point {} {} {}",
            point.x,
            point.y,
            point.z
        );
        return Err(ValidationError::MultiplePlanes {
            x: point.x,
            y: point.y,
            z: point.z,
            planes: hits.iter().map(|(idx, _)| *idx).collect(),
        });
    }
    Ok(hits.pop())
}

/// Check that the center of every veto resolves to the DAQ ID the veto was assigned when building
///
/// Returns the DAQ ID found for every volume (None if no channel collected the center).
pub fn test_readout(
    readout: &Readout,
    veto_info: &[VetoInfo],
    reference: &ReferenceMap,
) -> Result<BTreeMap<String, Option<i32>>, ValidationError> {
    let mut volume_to_daq_id: BTreeMap<String, Option<i32>> = BTreeMap::new();
    for veto in veto_info.iter() {
        let position = veto.center();
        let hit = find_unique_hit(readout, &position)?.map(|(_, hit)| hit);

        log::info!(
            "Name: {} Position: {}, {}, {} Module ID: {} Channel ID: {} DAQ ID: {} Ref DAQ ID: {}",
            veto.volume,
            position.x,
            position.y,
            position.z,
            hit.map_or(-1, |h| h.module_id),
            hit.map_or(-1, |h| h.channel_id),
            hit.map_or(-1, |h| h.daq_id),
            reference.get(&veto.volume).copied().unwrap_or(-1)
        );
        volume_to_daq_id.insert(veto.volume.clone(), hit.map(|h| h.daq_id));
    }

    let mut n_mismatch = 0;
    for (volume, daq_id) in volume_to_daq_id.iter() {
        let expected = reference.get(volume).copied();
        if *daq_id != expected || daq_id.is_none() {
            log::error!(
                "Mismatching channel for volume {volume} DAQ ID: {daq_id:?} Ref DAQ ID: {expected:?}"
            );
            n_mismatch += 1;
        }
    }
    if n_mismatch > 0 {
        return Err(ValidationError::MismatchedChannels(n_mismatch));
    }

    Ok(volume_to_daq_id)
}

/// Check that channel IDs and DAQ IDs are unique across the whole readout
pub fn check_unique_channels(readout: &Readout) -> Result<(), ValidationError> {
    let mut channel_ids = BTreeSet::new();
    let mut daq_ids = BTreeSet::new();
    for channel in readout.channels() {
        channel_ids.insert(channel.channel_id);
        daq_ids.insert(channel.daq_id);
    }

    let n_channels = readout.number_of_channels();
    if channel_ids.len() != n_channels || daq_ids.len() != n_channels || channel_ids.is_empty() {
        log::error!("Number of channels in readout does not match number of unique channels");
        return Err(ValidationError::NonUniqueChannels {
            n_channels,
            n_channel_ids: channel_ids.len(),
            n_daq_ids: daq_ids.len(),
        });
    }

    log::info!("All {n_channels} channel DAQ ids are unique");
    Ok(())
}

/// Check that a readout read back from disk is the one that was written
pub fn verify_round_trip(original: &Readout, reloaded: &Readout) -> Result<(), ValidationError> {
    if original.number_of_planes() != reloaded.number_of_planes() {
        return Err(ValidationError::RoundTrip(format!(
            "plane count changed from {} to {}",
            original.number_of_planes(),
            reloaded.number_of_planes()
        )));
    }
    if original.number_of_channels() != reloaded.number_of_channels() {
        return Err(ValidationError::RoundTrip(format!(
            "channel count changed from {} to {}",
            original.number_of_channels(),
            reloaded.number_of_channels()
        )));
    }
    if original.daq_ids() != reloaded.daq_ids() {
        return Err(ValidationError::RoundTrip(String::from(
            "DAQ ID assignment changed",
        )));
    }
    Ok(())
}
