use std::path::Path;

use super::error::{MergeError, ReadoutFileError};
use super::readout::Readout;
use super::readout_file::ReadoutFile;
use super::validator::check_unique_channels;

/// Append the veto planes to each of the named micromegas readouts and write the result to a new file.
///
/// The merged file is read back from disk and every merged readout is checked for globally unique
/// channel and DAQ IDs. Returns the reloaded file.
pub fn write_readout_with_veto_system(
    veto_readout: &Readout,
    micromegas_path: &Path,
    output_path: &Path,
    readout_names: &[String],
) -> Result<ReadoutFile, MergeError> {
    let mut micromegas = ReadoutFile::read(micromegas_path)?;
    let mut merged = ReadoutFile::default();

    for readout_name in readout_names.iter() {
        let readout = match micromegas.readouts.remove(readout_name) {
            Some(r) => r,
            None => {
                log::error!("Failed to load readout {readout_name}");
                return Err(MergeError::FileError(ReadoutFileError::MissingReadout(
                    readout_name.clone(),
                )));
            }
        };
        merged.insert(readout_name, merge_readouts(readout, veto_readout));
    }

    merged.write(output_path)?;

    let reloaded = ReadoutFile::read(output_path)?;
    for readout_name in readout_names.iter() {
        log::info!("Checking channels of merged readout {readout_name}...");
        check_unique_channels(reloaded.get(readout_name)?)?;
    }

    Ok(reloaded)
}

/// Append the planes of `extra` to `base`
pub fn merge_readouts(mut base: Readout, extra: &Readout) -> Readout {
    for plane in extra.planes.iter() {
        base.add_plane(plane.clone());
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias_map::AliasMap;
    use crate::builder::tests::veto_system;
    use crate::builder::{generate_readout, BuilderParams};
    use crate::error::ValidationError;
    use crate::readout::tests::micromegas_plane;

    fn veto_readout() -> Readout {
        generate_readout(
            &veto_system(),
            &AliasMap::new(None).unwrap(),
            &BuilderParams::default(),
        )
        .unwrap()
        .0
    }

    fn write_micromegas(path: &Path, first_daq_id: i32) {
        let mut file = ReadoutFile::default();
        for name in ["iaxoD0Readout", "iaxoD1Readout"] {
            let mut readout = Readout::default();
            readout.add_plane(micromegas_plane(first_daq_id));
            file.insert(name, readout);
        }
        file.write(path).unwrap();
    }

    fn names() -> Vec<String> {
        vec![String::from("iaxoD0Readout"), String::from("iaxoD1Readout")]
    }

    #[test]
    fn test_merge() {
        let dir = tempfile::tempdir().unwrap();
        let mm_path = dir.path().join("micromegas.yml");
        let out_path = dir.path().join("complete.yml");
        write_micromegas(&mm_path, 0);

        let merged =
            write_readout_with_veto_system(&veto_readout(), &mm_path, &out_path, &names()).unwrap();
        assert_eq!(merged.readouts.len(), 2);
        let d0 = merged.get("iaxoD0Readout").unwrap();
        assert_eq!(d0.number_of_planes(), 5);
        assert_eq!(d0.number_of_channels(), 8);
        assert!(out_path.exists());
    }

    #[test]
    fn test_merge_conflicting_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mm_path = dir.path().join("micromegas.yml");
        let out_path = dir.path().join("complete.yml");
        // micromegas DAQ IDs 4700..4703 collide with the vetoes
        write_micromegas(&mm_path, 4700);

        assert!(matches!(
            write_readout_with_veto_system(&veto_readout(), &mm_path, &out_path, &names()),
            Err(MergeError::ValidationError(
                ValidationError::NonUniqueChannels { .. }
            ))
        ));
    }

    #[test]
    fn test_merge_missing_readout() {
        let dir = tempfile::tempdir().unwrap();
        let mm_path = dir.path().join("micromegas.yml");
        let out_path = dir.path().join("complete.yml");
        write_micromegas(&mm_path, 0);

        let names = vec![String::from("iaxoD2Readout")];
        assert!(matches!(
            write_readout_with_veto_system(&veto_readout(), &mm_path, &out_path, &names),
            Err(MergeError::FileError(ReadoutFileError::MissingReadout(_)))
        ));
    }
}
