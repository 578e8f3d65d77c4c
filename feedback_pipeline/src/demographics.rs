//! Descriptive statistics over the demographic table of the participants.
//!
//! The table must contain an age, a nationality and a gender column. The output tables are meant
//! for a charting layer: age statistics, the age distribution, and nationality by gender
//! cross tabs.

use log::{debug, info};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

pub const AGE_COLUMN: &str = "العمر Age";
pub const NATIONALITY_COLUMN: &str = "الجنسية Nationality";
pub const GENDER_COLUMN: &str = "الجنس Gender";

pub const REQUIRED_COLUMNS: [&str; 3] = [AGE_COLUMN, NATIONALITY_COLUMN, GENDER_COLUMN];

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum DemographicError {
    MissingColumns { missing: Vec<String> },
    /// No row is left after the filters.
    EmptyResult,
}

impl Error for DemographicError {}

impl Display for DemographicError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DemographicError::MissingColumns { missing } => {
                write!(f, "Required columns not found: {}", missing.join(", "))
            }
            DemographicError::EmptyResult => write!(f, "No data after applying filters"),
        }
    }
}

/// The positions of the required columns in a header.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ColumnIndexes {
    pub age: usize,
    pub nationality: usize,
    pub gender: usize,
}

/// Finds the required columns in the header. The names are trimmed before the comparison.
pub fn validate_columns<S: AsRef<str>>(header: &[S]) -> Result<ColumnIndexes, DemographicError> {
    let find = |name: &str| header.iter().position(|h| h.as_ref().trim() == name);
    match (
        find(AGE_COLUMN),
        find(NATIONALITY_COLUMN),
        find(GENDER_COLUMN),
    ) {
        (Some(age), Some(nationality), Some(gender)) => Ok(ColumnIndexes {
            age,
            nationality,
            gender,
        }),
        _ => Err(DemographicError::MissingColumns {
            missing: REQUIRED_COLUMNS
                .iter()
                .filter(|c| find(**c).is_none())
                .map(|c| c.to_string())
                .collect(),
        }),
    }
}

/// The bilingual label for a gender value. None for an unknown value.
pub fn gender_label(gender: &str) -> Option<&'static str> {
    match gender.trim() {
        "أنثى" => Some("أنثى : Female"),
        "ذكر" => Some("ذكر: Male"),
        _ => None,
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct DemographicRecord {
    pub age: Option<f64>,
    pub nationality: Option<String>,
    pub gender: Option<String>,
}

/// Restricts the records to some genders and nationalities. An empty list lets all the values
/// through. Records without a gender or a nationality never pass.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct DemographicFilter {
    pub genders: Vec<String>,
    pub nationalities: Vec<String>,
}

impl DemographicFilter {
    pub fn accepts(&self, r: &DemographicRecord) -> bool {
        let ok = |v: &Option<String>, allowed: &[String]| match v {
            Some(v) => allowed.is_empty() || allowed.iter().any(|a| a == v),
            None => false,
        };
        ok(&r.gender, &self.genders) && ok(&r.nationality, &self.nationalities)
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct AgeStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Sample standard deviation. None with a single age.
    pub std: Option<f64>,
    /// The most frequent age, the smallest one in case of a tie.
    pub mode: f64,
}

impl AgeStats {
    /// Returns None for an empty slice.
    pub fn from_ages(ages: &[f64]) -> Option<AgeStats> {
        if ages.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = ages.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let std = if n > 1 {
            let var = sorted.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            Some(var.sqrt())
        } else {
            None
        };
        let mode = age_distribution(&sorted)
            .iter()
            .fold((sorted[0], 0_u64), |best, &(age, count)| {
                if count > best.1 {
                    (age, count)
                } else {
                    best
                }
            })
            .0;
        Some(AgeStats {
            count: n,
            min: sorted[0],
            max: sorted[n - 1],
            mean,
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            std,
            mode,
        })
    }
}

/// Quantile with linear interpolation between the closest ranks. `sorted` must not be empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// The number of records for each age, by increasing age.
pub fn age_distribution(ages: &[f64]) -> Vec<(f64, u64)> {
    let mut sorted: Vec<f64> = ages.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mut res: Vec<(f64, u64)> = Vec::new();
    for age in sorted {
        match res.last_mut() {
            Some((a, c)) if *a == age => *c += 1,
            _ => res.push((age, 1)),
        }
    }
    res
}

/// Counts for one (nationality, gender) pair.
#[derive(PartialEq, Debug, Clone)]
pub struct GroupStats {
    pub nationality: String,
    /// The bilingual gender label.
    pub gender: String,
    pub rows: u64,
    /// The number of rows with an age.
    pub with_age: u64,
    /// Rounded to 1 decimal digit.
    pub mean_age: Option<f64>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct DemographicSummary {
    pub total_records: usize,
    pub filtered_records: usize,
    pub age_stats: AgeStats,
    pub age_distribution: Vec<(f64, u64)>,
    /// Sorted by nationality, then gender.
    pub groups: Vec<GroupStats>,
}

/// Filters the records and computes all the aggregates.
pub fn summarize(
    records: &[DemographicRecord],
    filter: &DemographicFilter,
) -> Result<DemographicSummary, DemographicError> {
    let filtered: Vec<&DemographicRecord> = records.iter().filter(|r| filter.accepts(r)).collect();
    info!(
        "summarize: {} records, {} after filters",
        records.len(),
        filtered.len()
    );

    let ages: Vec<f64> = filtered.iter().filter_map(|r| r.age).collect();
    let age_stats = AgeStats::from_ages(&ages).ok_or(DemographicError::EmptyResult)?;
    debug!("summarize: age stats: {:?}", age_stats);

    // (nationality, gender label) -> (rows, ages)
    // Genders without a label are left out of the groups, not of the age statistics.
    let mut groups: BTreeMap<(String, String), (u64, Vec<f64>)> = BTreeMap::new();
    for r in filtered.iter() {
        let label = r.gender.as_deref().and_then(gender_label);
        if let (Some(nat), Some(label)) = (&r.nationality, label) {
            let e = groups
                .entry((nat.clone(), label.to_string()))
                .or_default();
            e.0 += 1;
            if let Some(age) = r.age {
                e.1.push(age);
            }
        }
    }
    let groups: Vec<GroupStats> = groups
        .into_iter()
        .map(|((nationality, gender), (rows, ages))| {
            let mean_age = if ages.is_empty() {
                None
            } else {
                let m = ages.iter().sum::<f64>() / ages.len() as f64;
                Some((m * 10.0).round() / 10.0)
            };
            GroupStats {
                nationality,
                gender,
                rows,
                with_age: ages.len() as u64,
                mean_age,
            }
        })
        .collect();

    Ok(DemographicSummary {
        total_records: records.len(),
        filtered_records: filtered.len(),
        age_distribution: age_distribution(&ages),
        age_stats,
        groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(age: Option<f64>, nat: &str, gender: &str) -> DemographicRecord {
        DemographicRecord {
            age,
            nationality: Some(nat.to_string()),
            gender: Some(gender.to_string()),
        }
    }

    fn sample() -> Vec<DemographicRecord> {
        vec![
            rec(Some(30.0), "Egypt", "ذكر"),
            rec(Some(40.0), "Egypt", "أنثى"),
            rec(Some(40.0), "Egypt", "ذكر"),
            rec(Some(25.0), "India", "ذكر"),
            rec(None, "India", "أنثى"),
            DemographicRecord {
                age: Some(99.0),
                nationality: None,
                gender: Some("ذكر".to_string()),
            },
        ]
    }

    #[test]
    fn validates_columns() {
        let header = vec![" العمر Age ", "الجنس Gender", "الجنسية Nationality", "Comments"];
        assert_eq!(
            validate_columns(&header),
            Ok(ColumnIndexes {
                age: 0,
                nationality: 2,
                gender: 1
            })
        );
        let header = vec!["Age", "الجنس Gender"];
        let err = validate_columns(&header).unwrap_err();
        assert_eq!(
            err,
            DemographicError::MissingColumns {
                missing: vec![AGE_COLUMN.to_string(), NATIONALITY_COLUMN.to_string()]
            }
        );
        assert!(err.to_string().starts_with("Required columns not found"));
    }

    #[test]
    fn age_statistics() {
        let s = AgeStats::from_ages(&[40.0, 30.0, 40.0, 25.0]).unwrap();
        assert_eq!(s.count, 4);
        assert_eq!(s.min, 25.0);
        assert_eq!(s.max, 40.0);
        assert_eq!(s.mean, 33.75);
        assert_eq!(s.median, 35.0);
        assert_eq!(s.q1, 28.75);
        assert_eq!(s.q3, 40.0);
        assert_eq!(s.mode, 40.0);
        assert!((s.std.unwrap() - 7.5).abs() < 1e-9);

        let single = AgeStats::from_ages(&[50.0]).unwrap();
        assert_eq!(single.std, None);
        assert_eq!(single.q1, 50.0);
        assert!(AgeStats::from_ages(&[]).is_none());
    }

    #[test]
    fn mode_prefers_the_smallest_age() {
        let s = AgeStats::from_ages(&[60.0, 20.0, 60.0, 20.0, 35.0]).unwrap();
        assert_eq!(s.mode, 20.0);
    }

    #[test]
    fn summary_groups_by_nationality_and_gender() {
        let s = summarize(&sample(), &DemographicFilter::default()).unwrap();
        assert_eq!(s.total_records, 6);
        // The record without nationality is filtered out.
        assert_eq!(s.filtered_records, 5);
        assert_eq!(
            s.age_distribution,
            vec![(25.0, 1), (30.0, 1), (40.0, 2)]
        );
        let keys: Vec<(&str, &str, u64)> = s
            .groups
            .iter()
            .map(|g| (g.nationality.as_str(), g.gender.as_str(), g.rows))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Egypt", "أنثى : Female", 1),
                ("Egypt", "ذكر: Male", 2),
                ("India", "أنثى : Female", 1),
                ("India", "ذكر: Male", 1),
            ]
        );
        assert_eq!(s.groups[1].mean_age, Some(35.0));
        assert_eq!(s.groups[2].with_age, 0);
        assert_eq!(s.groups[2].mean_age, None);
    }

    #[test]
    fn unknown_genders_are_not_grouped() {
        assert_eq!(gender_label(" ذكر "), Some("ذكر: Male"));
        assert_eq!(gender_label("Male"), None);

        let records = vec![rec(Some(30.0), "Egypt", "ذكر"), rec(Some(50.0), "Egypt", "?")];
        let s = summarize(&records, &DemographicFilter::default()).unwrap();
        assert_eq!(s.filtered_records, 2);
        assert_eq!(s.age_stats.count, 2);
        assert_eq!(s.groups.len(), 1);
        assert_eq!(s.groups[0].gender, "ذكر: Male");
        assert_eq!(s.groups[0].rows, 1);
    }

    #[test]
    fn filters_and_empty_result() {
        let f = DemographicFilter {
            genders: vec!["أنثى".to_string()],
            nationalities: vec![],
        };
        let s = summarize(&sample(), &f).unwrap();
        assert_eq!(s.filtered_records, 2);
        assert_eq!(s.age_stats.count, 1);

        let f = DemographicFilter {
            genders: vec![],
            nationalities: vec!["Peru".to_string()],
        };
        assert_eq!(
            summarize(&sample(), &f),
            Err(DemographicError::EmptyResult)
        );
    }
}
