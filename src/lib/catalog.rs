use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Display};
use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::debug;
use serde_derive::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

/// Climate variables published one-directory-per-month under the data root.
///
/// The declaration order is also the classification order: a directory name
/// is assigned to the first variable whose token it contains.
#[allow(clippy::upper_case_acronyms)]
#[derive(
    Debug,
    PartialEq,
    Eq,
    Hash,
    Copy,
    Clone,
    PartialOrd,
    Ord,
    EnumString,
    EnumIter,
    StrumDisplay,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum ClimateVariable {
    /// Monthly total precipitation [mm]
    Ppt,
    /// Monthly mean solar transmittance [0-1]
    Soltrans,
    /// Monthly mean air temperature [°C]
    Tmean,
    /// Monthly mean dew point temperature [°C]
    Tdmean,
}

impl ClimateVariable {
    /// Substring that classifies a directory name to this variable
    /// (matched case-insensitively).
    pub fn token(self) -> &'static str {
        match self {
            ClimateVariable::Ppt => "ppt",
            ClimateVariable::Soltrans => "soltrans",
            ClimateVariable::Tmean => "tmean",
            ClimateVariable::Tdmean => "tdmean",
        }
    }
}

/// Naming conventions recognized for the calendar month token of a directory
/// name. Patterns are tried in order; within a name, segments are scanned
/// left to right and the first valid month (1-12) wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthPattern {
    /// Two-digit month immediately preceding a literal marker segment,
    /// e.g. `PRISM_ppt_30yr_normal_4kmM4_01_bil`.
    TwoDigitBeforeMarker(&'static str),
    /// Six-digit YYYYMM segment anywhere in the name, last two digits taken
    /// as the month, e.g. `prism_tmean_us_25m_202001_avg_30y`.
    YearMonth,
}

/// Patterns in the order they are tried.
pub const MONTH_PATTERNS: [MonthPattern; 2] =
    [MonthPattern::TwoDigitBeforeMarker("bil"), MonthPattern::YearMonth];

impl MonthPattern {
    /// Extract a month from an underscore-delimited directory name, or None
    /// when the pattern does not apply.
    pub fn extract(&self, name: &str) -> Option<u32> {
        let segments: Vec<&str> = name.split('_').collect();
        match self {
            MonthPattern::TwoDigitBeforeMarker(marker) => {
                for i in 1..segments.len() {
                    if !segments[i].eq_ignore_ascii_case(marker) {
                        continue;
                    }
                    let prev = segments[i - 1];
                    if prev.len() == 2 && prev.bytes().all(|b| b.is_ascii_digit()) {
                        let month: u32 = prev.parse().ok()?;
                        if (1..=12).contains(&month) {
                            return Some(month);
                        }
                    }
                }
                None
            }
            MonthPattern::YearMonth => {
                let token = segments
                    .iter()
                    .find(|s| s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit()))?;
                let month: u32 = token[4..6].parse().ok()?;
                (1..=12).contains(&month).then_some(month)
            }
        }
    }
}

/// Month of a directory name, or None when no convention applies. Directories
/// without a recognizable month are silently skipped by the resolver.
pub fn extract_month(name: &str) -> Option<u32> {
    MONTH_PATTERNS.iter().find_map(|p| p.extract(name))
}

/// File extensions accepted as the data file of a classified directory.
pub const RASTER_EXTENSIONS: [&str; 2] = ["bil", "tif"];

/// Directories carrying this resolution marker belong to an alternate
/// high-resolution product and are skipped entirely.
pub const SKIP_RESOLUTION_MARKER: &str = "800m";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read data directory {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
}

/// Lookup table from (variable, month) to the raster file holding its
/// climate normal. Built once by scanning a data directory; read-only
/// afterward. Missing pairs are simply absent, never an error.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: HashMap<ClimateVariable, BTreeMap<u32, PathBuf>>,
}

impl Catalog {
    /// Scan `root` and classify its subdirectories by variable token and
    /// month naming convention.
    ///
    /// Directory entries are visited in name order so that "first file wins"
    /// is stable across runs and filesystems.
    pub fn scan(root: &Path) -> Result<Catalog, CatalogError> {
        let read_dir = fs::read_dir(root).map_err(|e| CatalogError::Io(root.to_path_buf(), e))?;

        let mut dirs: Vec<PathBuf> = read_dir
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();

        let mut entries: HashMap<ClimateVariable, BTreeMap<u32, PathBuf>> = HashMap::new();

        for dir in dirs {
            let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let lower = name.to_lowercase();

            if lower.contains(SKIP_RESOLUTION_MARKER) {
                debug!("skipping alternate-resolution product {name}");
                continue;
            }

            let Some(variable) = ClimateVariable::iter().find(|v| lower.contains(v.token()))
            else {
                continue;
            };

            let Some(month) = extract_month(name) else {
                debug!("no month token in {name}, skipping");
                continue;
            };

            let Some(file) = find_raster_file(&dir) else {
                debug!("no raster file in {name}, skipping");
                continue;
            };

            // first discovered file wins for a (variable, month) pair
            entries.entry(variable).or_default().entry(month).or_insert(file);
        }

        Ok(Catalog { entries })
    }

    pub fn get(&self, variable: ClimateVariable, month: u32) -> Option<&Path> {
        self.entries
            .get(&variable)
            .and_then(|months| months.get(&month))
            .map(PathBuf::as_path)
    }

    /// Months catalogued for a variable, ascending.
    pub fn months(&self, variable: ClimateVariable) -> Vec<u32> {
        self.entries
            .get(&variable)
            .map(|months| months.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(BTreeMap::is_empty)
    }

    /// Which (variable, month) pairs are present against an expected period.
    pub fn coverage(&self, months: &[u32]) -> CoverageReport {
        let mut found = Vec::new();
        let mut missing = Vec::new();
        for variable in ClimateVariable::iter() {
            for &month in months {
                if self.get(variable, month).is_some() {
                    found.push((variable, month));
                } else {
                    missing.push((variable, month));
                }
            }
        }
        CoverageReport { found, missing }
    }
}

fn find_raster_file(dir: &Path) -> Option<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    files.sort();
    files.into_iter().find(|path| {
        path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| RASTER_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
    })
}

/// Coverage of a catalog against an expected set of months, so that
/// incompleteness is observable instead of purely implicit.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    pub found: Vec<(ClimateVariable, u32)>,
    pub missing: Vec<(ClimateVariable, u32)>,
}

impl CoverageReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

impl Display for CoverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} variable-month pairs present",
            self.found.len(),
            self.found.len() + self.missing.len()
        )?;
        if !self.missing.is_empty() {
            let missing = self
                .missing
                .iter()
                .map(|(v, m)| format!("{v}/{m:02}"))
                .join(" ");
            write!(f, ", missing: {missing}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use tempfile::TempDir;

    use super::*;

    fn make_dataset_dir(root: &Path, name: &str, file: Option<&str>) {
        let dir = root.join(name);
        fs::create_dir(&dir).expect("should create dir");
        if let Some(file) = file {
            File::create(dir.join(file)).expect("should create file");
        }
    }

    #[test]
    fn extracts_month_from_bil_convention() {
        assert_eq!(extract_month("PRISM_ppt_30yr_normal_4kmM4_01_bil"), Some(1));
        assert_eq!(extract_month("PRISM_ppt_30yr_normal_4kmM4_12_bil"), Some(12));
    }

    #[test]
    fn extracts_month_from_yearmonth_convention() {
        assert_eq!(extract_month("prism_tmean_us_25m_202001_avg_30y"), Some(1));
        assert_eq!(extract_month("prism_soltrans_us_25m_202410_avg_30y"), Some(10));
    }

    #[test]
    fn rejects_invalid_month_tokens() {
        // 13 is not a calendar month in either convention
        assert_eq!(extract_month("PRISM_ppt_30yr_normal_4kmM4_13_bil"), None);
        assert_eq!(extract_month("prism_tmean_us_25m_202013_avg_30y"), None);
        assert_eq!(extract_month("prism_tmean_us_25m_avg_30y"), None);
    }

    #[test]
    fn bil_marker_needs_a_two_digit_predecessor() {
        assert_eq!(extract_month("PRISM_ppt_normal_4kmM4_1_bil"), None);
        assert_eq!(extract_month("bil_01_something"), None);
    }

    #[test]
    fn scan_classifies_both_conventions() {
        let tmp = TempDir::new().expect("should create tempdir");
        make_dataset_dir(
            tmp.path(),
            "prism_tmean_us_25m_202001_avg_30y",
            Some("tmean.tif"),
        );
        make_dataset_dir(
            tmp.path(),
            "PRISM_ppt_30yr_normal_4kmM4_01_bil",
            Some("ppt.bil"),
        );

        let catalog = Catalog::scan(tmp.path()).expect("should scan");
        assert!(catalog.get(ClimateVariable::Tmean, 1).is_some());
        assert!(catalog.get(ClimateVariable::Ppt, 1).is_some());
        assert!(catalog.get(ClimateVariable::Soltrans, 1).is_none());
    }

    #[test]
    fn scan_skips_alternate_resolution_and_incomplete_dirs() {
        let tmp = TempDir::new().expect("should create tempdir");
        // alternate resolution product
        make_dataset_dir(
            tmp.path(),
            "PRISM_ppt_30yr_normal_800mM4_01_bil",
            Some("ppt.bil"),
        );
        // no month token
        make_dataset_dir(tmp.path(), "prism_tmean_us_25m_avg", Some("tmean.tif"));
        // no raster file
        make_dataset_dir(tmp.path(), "PRISM_tmean_30yr_normal_4kmM4_02_bil", None);
        // stray plain file at the root
        File::create(tmp.path().join("readme.txt")).expect("should create file");

        let catalog = Catalog::scan(tmp.path()).expect("should scan");
        assert!(catalog.is_empty());
    }

    #[test]
    fn scan_first_file_wins_in_name_order() {
        let tmp = TempDir::new().expect("should create tempdir");
        let dir = tmp.path().join("PRISM_ppt_30yr_normal_4kmM4_01_bil");
        fs::create_dir(&dir).expect("should create dir");
        File::create(dir.join("b.bil")).expect("should create file");
        File::create(dir.join("a.bil")).expect("should create file");
        File::create(dir.join("a.hdr")).expect("should create file");

        let catalog = Catalog::scan(tmp.path()).expect("should scan");
        let path = catalog
            .get(ClimateVariable::Ppt, 1)
            .expect("should resolve");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("a.bil"));
    }

    #[test]
    fn coverage_reports_missing_pairs() {
        let tmp = TempDir::new().expect("should create tempdir");
        make_dataset_dir(
            tmp.path(),
            "PRISM_ppt_30yr_normal_4kmM4_01_bil",
            Some("ppt.bil"),
        );

        let catalog = Catalog::scan(tmp.path()).expect("should scan");
        let report = catalog.coverage(&[1, 2]);
        assert!(!report.is_complete());
        assert_eq!(report.found, vec![(ClimateVariable::Ppt, 1)]);
        assert_eq!(report.missing.len(), 7);
        assert!(report.to_string().contains("1/8"));
    }

    #[test]
    fn variable_tokens_parse_back() {
        for variable in ClimateVariable::iter() {
            let parsed: ClimateVariable = variable
                .token()
                .parse()
                .expect("token should parse to the variable");
            assert_eq!(parsed, variable);
        }
    }
}
