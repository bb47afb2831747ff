use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

use super::config::Config;
use super::error::ValidationError;
use super::readout::{PlaneType, Readout};

/// Parameters of the random sampling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloParams {
    pub samples: u64,
    /// Points are sampled uniformly in the cube [-half_extent, half_extent]^3
    pub half_extent: f64,
    pub seed: Option<u64>,
}

impl From<&Config> for MonteCarloParams {
    fn from(config: &Config) -> Self {
        Self {
            samples: config.monte_carlo_samples,
            half_extent: config.monte_carlo_half_extent,
            seed: config.monte_carlo_seed,
        }
    }
}

/// Outcome of the sampling
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonteCarloSummary {
    pub samples: u64,
    pub inside: u64,
    /// Number of points collected by each DAQ channel
    pub hits_per_daq_id: BTreeMap<i32, u64>,
}

/// Sample random points and check that no point is claimed by more than one veto plane
///
/// `progress` is called with the completed fraction roughly every percent.
pub fn check_overlaps<F>(
    readout: &Readout,
    params: &MonteCarloParams,
    mut progress: F,
) -> Result<MonteCarloSummary, ValidationError>
where
    F: FnMut(f32),
{
    let limit = params.half_extent;
    if !(limit >= 0.0) || !(2.0 * limit).is_finite() {
        return Err(ValidationError::BadExtent(limit));
    }

    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let veto_planes: Vec<usize> = readout
        .planes
        .iter()
        .enumerate()
        .filter(|(_, p)| p.kind == PlaneType::Veto)
        .map(|(idx, _)| idx)
        .collect();

    let mut summary = MonteCarloSummary {
        samples: params.samples,
        ..Default::default()
    };
    let flush_val = (params.samples / 100).max(1);

    for i in 0..params.samples {
        if i % flush_val == 0 {
            progress(i as f32 / params.samples as f32);
        }
        let point = Vector3::new(
            rng.gen_range(-limit..=limit),
            rng.gen_range(-limit..=limit),
            rng.gen_range(-limit..=limit),
        );

        let mut matched_planes: Vec<usize> = Vec::new();
        let mut last_daq_id = -1;
        for idx in veto_planes.iter() {
            if let Some(hit) = readout.planes[*idx].find_hit(&point) {
                matched_planes.push(*idx);
                last_daq_id = hit.daq_id;
            }
        }

        match matched_planes.len() {
            0 => continue, // outside all vetoes
            1 => {
                summary.inside += 1;
                *summary.hits_per_daq_id.entry(last_daq_id).or_insert(0) += 1;
            }
            _ => {
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
                    planes: matched_planes,
                });
            }
        }
    }
    progress(1.0);

    log::info!(
        "Sampled {} points, {} inside a veto, {} vetoes hit",
        summary.samples,
        summary.inside,
        summary.hits_per_daq_id.len()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias_map::AliasMap;
    use crate::builder::tests::{veto, veto_system};
    use crate::builder::{generate_readout, BuilderParams};
    use crate::readout::tests::micromegas_plane;

    fn build(vetoes: &[crate::veto_info::VetoInfo]) -> Readout {
        generate_readout(vetoes, &AliasMap::new(None).unwrap(), &BuilderParams::default())
            .unwrap()
            .0
    }

    #[test]
    fn test_no_overlap() {
        let readout = build(&veto_system());
        let params = MonteCarloParams {
            samples: 200_000,
            half_extent: 500.0,
            seed: Some(42),
        };
        let mut last_progress = 0.0;
        let summary = check_overlaps(&readout, &params, |p| last_progress = p).unwrap();
        assert_eq!(summary.samples, 200_000);
        assert!(summary.inside > 0);
        assert!(summary.hits_per_daq_id.keys().all(|id| (4700..4760).contains(id)));
        assert_eq!(summary.hits_per_daq_id.values().sum::<u64>(), summary.inside);
        assert_eq!(last_progress, 1.0);
    }

    #[test]
    fn test_overlap_detected() {
        let vetoes = vec![
            veto("Top", 1, 1, Vector3::zeros()),
            veto("Top", 1, 2, Vector3::new(20.0, 0.0, 0.0)),
        ];
        let readout = build(&vetoes);
        let params = MonteCarloParams {
            samples: 10_000,
            half_extent: 100.0,
            seed: Some(7),
        };
        assert!(matches!(
            check_overlaps(&readout, &params, |_| ()),
            Err(ValidationError::MultiplePlanes { .. })
        ));
    }

    #[test]
    fn test_bad_extent() {
        let readout = build(&veto_system());
        for half_extent in [f64::INFINITY, f64::NAN, -1.0, f64::MAX] {
            let params = MonteCarloParams {
                samples: 10,
                half_extent,
                seed: Some(1),
            };
            assert!(matches!(
                check_overlaps(&readout, &params, |_| ()),
                Err(ValidationError::BadExtent(_))
            ));
        }
    }

    #[test]
    fn test_ignores_other_planes() {
        // a micromegas plane overlapping a veto is not an error
        let mut readout = build(&[veto("Top", 1, 1, Vector3::zeros())]);
        readout.add_plane(micromegas_plane(0));
        let params = MonteCarloParams {
            samples: 10_000,
            half_extent: 25.0,
            seed: Some(1),
        };
        let summary = check_overlaps(&readout, &params, |_| ()).unwrap();
        assert_eq!(summary.inside, 10_000);
        assert_eq!(summary.hits_per_daq_id.get(&4703), Some(&10_000));
    }
}
