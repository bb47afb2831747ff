/// The stage of the pipeline a status message refers to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Geometry,
    Build,
    Validate,
    MonteCarlo,
    Merge,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Geometry => "geometry",
            Self::Build => "build",
            Self::Validate => "validate",
            Self::MonteCarlo => "monte-carlo",
            Self::Merge => "merge",
        };
        write!(f, "{name}")
    }
}

/// Progress message sent from the processing thread to whoever is watching (typically the cli)
#[derive(Debug, Clone, Default)]
pub struct ProcessStatus {
    pub progress: f32,
    pub stage: Stage,
}

impl ProcessStatus {
    pub fn new(progress: f32, stage: Stage) -> Self {
        Self { progress, stage }
    }
}
