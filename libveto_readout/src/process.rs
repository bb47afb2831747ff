use std::sync::mpsc::Sender;

use super::alias_map::AliasMap;
use super::builder::{generate_readout, BuilderParams};
use super::config::Config;
use super::error::ProcessorError;
use super::geometry::GeometryInfo;
use super::merge::write_readout_with_veto_system;
use super::monte_carlo::{check_overlaps, MonteCarloParams, MonteCarloSummary};
use super::readout_file::write_and_reload;
use super::status::{ProcessStatus, Stage};
use super::validator::{check_unique_channels, test_readout, verify_round_trip};
use super::veto_info::collect_veto_info;

/// What a successful run produced
#[derive(Debug, Clone, Default)]
pub struct ProcessSummary {
    pub n_vetoes: usize,
    pub n_merged_readouts: usize,
    pub monte_carlo: Option<MonteCarloSummary>,
}

/// The main routine of veto_readout.
///
/// Reads the geometry, generates the veto system readout, validates it, and merges it into the micromegas
/// readouts. Any inconsistency stops the run with an error. Progress is reported through `tx`.
pub fn process(config: &Config, tx: &Sender<ProcessStatus>) -> Result<ProcessSummary, ProcessorError> {
    config.validate()?;

    tx.send(ProcessStatus::new(0.0, Stage::Geometry))?;
    log::info!("Loading geometry from {}...", config.geometry_path.to_string_lossy());
    let geometry = GeometryInfo::read_file(&config.geometry_path)?;
    let veto_info = collect_veto_info(&geometry, config)?;
    for info in veto_info.iter() {
        let limit = info.limit();
        log::info!("{info}");
        log::info!(
            "  extends from ({}, {}, {}) to ({}, {}, {})",
            info.readout_position.x,
            info.readout_position.y,
            info.readout_position.z,
            limit.x,
            limit.y,
            limit.z
        );
    }
    tx.send(ProcessStatus::new(1.0, Stage::Geometry))?;

    tx.send(ProcessStatus::new(0.0, Stage::Build))?;
    let alias_map = AliasMap::new(config.alias_map_path.as_deref())?;
    let (veto_readout, reference) =
        generate_readout(&veto_info, &alias_map, &BuilderParams::from(config))?;
    check_unique_channels(&veto_readout)?;
    let reloaded = write_and_reload(
        veto_readout.clone(),
        &config.veto_readout_name,
        &config.veto_readout_path,
    )?;
    verify_round_trip(&veto_readout, &reloaded)?;
    tx.send(ProcessStatus::new(1.0, Stage::Build))?;

    tx.send(ProcessStatus::new(0.0, Stage::Validate))?;
    test_readout(&reloaded, &veto_info, &reference)?;
    log::info!("Done testing readout");
    tx.send(ProcessStatus::new(1.0, Stage::Validate))?;

    let monte_carlo = if config.run_monte_carlo() {
        log::info!(
            "Sampling {} random points to look for overlapping vetoes...",
            config.monte_carlo_samples
        );
        let mut send_result = Ok(());
        let summary = check_overlaps(&reloaded, &MonteCarloParams::from(config), |progress| {
            if send_result.is_ok() {
                send_result = tx.send(ProcessStatus::new(progress, Stage::MonteCarlo));
            }
        })?;
        send_result?;
        Some(summary)
    } else {
        log::warn!("Monte-Carlo overlap check disabled (0 samples)");
        None
    };

    tx.send(ProcessStatus::new(0.0, Stage::Merge))?;
    let merged = write_readout_with_veto_system(
        &reloaded,
        &config.micromegas_readout_path,
        &config.full_readout_path,
        &config.readout_names,
    )?;
    for (name, readout) in merged.readouts.iter() {
        log::info!("{name}: {readout}");
    }
    tx.send(ProcessStatus::new(1.0, Stage::Merge))?;

    log::info!("Finished");
    Ok(ProcessSummary {
        n_vetoes: veto_info.len(),
        n_merged_readouts: merged.readouts.len(),
        monte_carlo,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::tests::veto_system;
    use crate::geometry::PhysicalVolume;
    use crate::readout::tests::micromegas_plane;
    use crate::readout::Readout;
    use crate::readout_file::ReadoutFile;
    use std::path::Path;

    /// Turn the test veto system into a geometry file: each veto and its light guide 500 mm behind it
    fn write_geometry(path: &Path) {
        let mut geometry = GeometryInfo::default();
        for veto in veto_system() {
            let center = veto.center();
            geometry.volumes.push(PhysicalVolume {
                physical: veto.volume.clone(),
                logical: String::from("scintillatorVolume-800.0mm"),
                alternative_name: None,
                position: center,
            });
            geometry.volumes.push(PhysicalVolume {
                physical: veto.light_guide.clone(),
                logical: String::from("scintillatorLightGuideVolume-800.0mm"),
                alternative_name: None,
                position: center - veto.normal * 500.0,
            });
        }
        std::fs::write(path, serde_yaml::to_string(&geometry).unwrap()).unwrap();
    }

    #[test]
    fn test_process() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.geometry_path = dir.path().join("geometry.yml");
        config.micromegas_readout_path = dir.path().join("micromegas.yml");
        config.veto_readout_path = dir.path().join("veto.yml");
        config.full_readout_path = dir.path().join("complete.yml");
        config.monte_carlo_samples = 50_000;
        config.monte_carlo_half_extent = 500.0;
        config.monte_carlo_seed = Some(3);

        write_geometry(&config.geometry_path);
        let mut mm = ReadoutFile::default();
        for name in config.readout_names.iter() {
            let mut readout = Readout::default();
            readout.add_plane(micromegas_plane(0));
            mm.insert(name, readout);
        }
        mm.write(&config.micromegas_readout_path).unwrap();

        let (tx, rx) = std::sync::mpsc::channel();
        let summary = process(&config, &tx).unwrap();
        assert_eq!(summary.n_vetoes, 4);
        assert_eq!(summary.n_merged_readouts, 2);
        assert!(summary.monte_carlo.is_some());

        let statuses: Vec<ProcessStatus> = rx.try_iter().collect();
        assert_eq!(statuses.last().map(|s| s.stage), Some(Stage::Merge));

        let veto_file = ReadoutFile::read(&config.veto_readout_path).unwrap();
        assert_eq!(
            veto_file.get("vetoSystemReadout").unwrap().number_of_planes(),
            4
        );
    }

    #[test]
    fn test_process_missing_geometry() {
        let mut config = Config::default();
        config.geometry_path = Path::new("/definitely/not/here.yml").to_path_buf();
        let (tx, _rx) = std::sync::mpsc::channel();
        assert!(matches!(
            process(&config, &tx),
            Err(ProcessorError::GeometryError(_))
        ));
    }
}
