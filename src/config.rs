// THEORY:
// Every stage of the architect reads its knobs from a typed config struct rather
// than from loose key/value bags. `ArchitectConfig` groups them per stage so each
// stage only borrows the part it needs.

use std::fmt;

/// Default maximum distance, in pixels, between corners of the same cluster.
pub const DEFAULT_TOLERANCE: u32 = 10;

/// How the distance between two corner points is measured.
///
/// The same metric is used for the two-image proximity test and for the
/// connectivity pass over larger directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    /// Per-axis difference; two points are close when both `|dx|` and `|dy|`
    /// are within tolerance.
    #[default]
    Chebyshev,
    /// Radial distance `sqrt(dx² + dy²)`.
    Euclidean,
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Chebyshev => write!(f, "chebyshev"),
            DistanceMetric::Euclidean => write!(f, "euclidean"),
        }
    }
}

/// Parameters for the proximity grouper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupingConfig {
    pub tolerance: u32,
    pub metric: DistanceMetric,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            metric: DistanceMetric::default(),
        }
    }
}

/// Screen description written at the top of `structure.xml`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileConfig {
    pub screen_name: String,
    pub screen_width: u32,
    pub screen_height: u32,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            screen_name: "Game".to_string(),
            screen_width: 1280,
            screen_height: 720,
        }
    }
}

/// File names used inside and next to the archive.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub log_file_name: String,
    pub script_name: String,
    pub structure_name: String,
    /// The archive extension, without the dot.
    pub archive_extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_file_name: "vasfa.log".to_string(),
            script_name: "script.asl".to_string(),
            structure_name: "structure.xml".to_string(),
            archive_extension: "vas".to_string(),
        }
    }
}

/// Configuration for a full architect run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchitectConfig {
    pub grouping: GroupingConfig,
    pub profile: ProfileConfig,
    pub output: OutputConfig,
}
