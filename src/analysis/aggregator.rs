//! Aggregation of student records into dashboard statistics.
//!
//! Everything here is a pure function over an immutable record slice:
//! deterministic, idempotent, and total. An empty input degrades every
//! aggregate to zero/empty values instead of erroring.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use crate::models::{
    Aggregates, CurriculumTotal, GpaBucket, ProbationSummary, StatusBucket, StudentRecord, YearRow,
};

/// Curriculum/year fallback for records carrying no value at all.
const UNCATEGORIZED: &str = "Uncategorized";

/// Fixed GPAX histogram ranges: lower-inclusive, upper-exclusive, except the
/// open-ended last range. Bucket order is fixed, not data-dependent.
const GPA_RANGES: [&str; 5] = ["< 2.0", "2.0-2.49", "2.5-2.99", "3.0-3.49", ">= 3.5"];

/// Tunable grouping rules for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardRules {
    /// Students strictly below this GPAX are probation candidates.
    pub probation_gpax_threshold: f64,
    /// Status label marking an actively enrolled student. Probation counts
    /// only students who are still enrolled under this status.
    pub normal_status: String,
}

impl Default for DashboardRules {
    fn default() -> Self {
        Self {
            probation_gpax_threshold: 2.0,
            normal_status: "ปกติ".to_string(),
        }
    }
}

/// Compute every dashboard aggregate from scratch.
pub fn aggregate(records: &[StudentRecord], rules: &DashboardRules) -> Aggregates {
    let unique_curriculums = unique_curriculums(records);

    Aggregates {
        total_records: records.len(),
        mean_gpax: mean_gpax(records),
        status_distribution: status_distribution(records),
        gpa_histogram: gpa_histogram(records, &unique_curriculums),
        year_crosstab: year_crosstab(records, &unique_curriculums),
        curriculum_totals: curriculum_totals(records),
        probation: probation_summary(records, rules),
        unique_curriculums,
    }
}

/// Sorted distinct curriculum labels. Computed once per aggregation and
/// reused by the histogram and the crosstab so every row exposes the same
/// columns in the same order.
pub fn unique_curriculums(records: &[StudentRecord]) -> Vec<String> {
    let mut curriculums: Vec<String> = records
        .iter()
        .map(|record| curriculum_of(record).to_string())
        .collect();
    curriculums.sort();
    curriculums.dedup();
    curriculums
}

/// Arithmetic mean of GPAX over all records; 0 for an empty set.
pub fn mean_gpax(records: &[StudentRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|record| record.gpax).sum::<f64>() / records.len() as f64
}

/// Count records per distinct status value, in first-appearance order.
pub fn status_distribution(records: &[StudentRecord]) -> Vec<StatusBucket> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        match index.get(record.status.as_str()) {
            Some(&position) => order[position].1 += 1,
            None => {
                index.insert(record.status.as_str(), order.len());
                order.push((record.status.clone(), 1));
            }
        }
    }

    order
        .into_iter()
        .map(|(name, count)| StatusBucket {
            percentage: format_percentage(count, records.len()),
            name,
            count,
        })
        .collect()
}

/// Bucket records into the five fixed GPAX ranges, tracking a sub-count per
/// curriculum in `universe` plus the bucket total.
pub fn gpa_histogram(records: &[StudentRecord], universe: &[String]) -> Vec<GpaBucket> {
    let mut buckets: Vec<GpaBucket> = GPA_RANGES
        .iter()
        .map(|range| GpaBucket {
            range: range.to_string(),
            per_curriculum: zeroed_counts(universe),
            total: 0,
        })
        .collect();

    for record in records {
        let bucket = &mut buckets[gpa_bucket_index(record.gpax)];
        bucket.total += 1;
        *bucket
            .per_curriculum
            .entry(curriculum_of(record).to_string())
            .or_insert(0) += 1;
    }

    buckets
}

/// Index into [`GPA_RANGES`] for a GPAX value.
fn gpa_bucket_index(gpax: f64) -> usize {
    if gpax < 2.0 {
        0
    } else if gpax < 2.5 {
        1
    } else if gpax < 3.0 {
        2
    } else if gpax < 3.5 {
        3
    } else {
        4
    }
}

/// Academic-year x curriculum crosstab, rows sorted lexicographically by
/// year. Every row carries a counter for every curriculum in `universe`.
pub fn year_crosstab(records: &[StudentRecord], universe: &[String]) -> Vec<YearRow> {
    let mut rows: BTreeMap<String, YearRow> = BTreeMap::new();

    for record in records {
        let year = if record.academic_year.is_empty() {
            UNCATEGORIZED
        } else {
            record.academic_year.as_str()
        };

        let row = rows.entry(year.to_string()).or_insert_with(|| YearRow {
            academic_year: year.to_string(),
            total: 0,
            per_curriculum: zeroed_counts(universe),
        });
        row.total += 1;
        *row.per_curriculum
            .entry(curriculum_of(record).to_string())
            .or_insert(0) += 1;
    }

    rows.into_values().collect()
}

/// Count records per curriculum, sorted by count descending. Ties keep the
/// order in which the curriculum was first encountered (stable sort).
pub fn curriculum_totals(records: &[StudentRecord]) -> Vec<CurriculumTotal> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let curriculum = curriculum_of(record);
        match index.get(curriculum) {
            Some(&position) => order[position].1 += 1,
            None => {
                index.insert(curriculum.to_string(), order.len());
                order.push((curriculum.to_string(), 1));
            }
        }
    }

    let mut totals: Vec<CurriculumTotal> = order
        .into_iter()
        .map(|(curriculum, count)| CurriculumTotal {
            percentage: format_percentage(count, records.len()),
            curriculum,
            count,
        })
        .collect();
    totals.sort_by_key(|total| Reverse(total.count));
    totals
}

/// Probation summary: actively enrolled students below the GPAX threshold,
/// grouped by curriculum sorted descending by count.
pub fn probation_summary(records: &[StudentRecord], rules: &DashboardRules) -> ProbationSummary {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut total = 0;

    for record in records {
        if record.gpax >= rules.probation_gpax_threshold || record.status != rules.normal_status {
            continue;
        }
        total += 1;

        let curriculum = curriculum_of(record);
        match index.get(curriculum) {
            Some(&position) => order[position].1 += 1,
            None => {
                index.insert(curriculum.to_string(), order.len());
                order.push((curriculum.to_string(), 1));
            }
        }
    }

    order.sort_by_key(|(_, count)| Reverse(*count));
    ProbationSummary {
        total,
        by_curriculum: order,
    }
}

/// Curriculum label with the empty-value fallback applied.
fn curriculum_of(record: &StudentRecord) -> &str {
    if record.curriculum.is_empty() {
        UNCATEGORIZED
    } else {
        &record.curriculum
    }
}

/// A counter map primed with a 0 for every curriculum in the universe.
fn zeroed_counts(universe: &[String]) -> BTreeMap<String, usize> {
    universe
        .iter()
        .map(|curriculum| (curriculum.clone(), 0))
        .collect()
}

/// `count / total * 100`, formatted with exactly two decimal digits.
/// `"0.00"` when the record set is empty.
fn format_percentage(count: usize, total: usize) -> String {
    if total == 0 {
        return "0.00".to_string();
    }
    format!("{:.2}", count as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, status: &str, gpax: f64, curriculum: &str, year: &str) -> StudentRecord {
        StudentRecord {
            student_id: id.to_string(),
            title: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            status: status.to_string(),
            year: 1,
            gpax,
            program: String::new(),
            room: String::new(),
            curriculum: curriculum.to_string(),
            academic_year: year.to_string(),
        }
    }

    fn cohort() -> Vec<StudentRecord> {
        vec![
            record("1", "ปกติ", 1.5, "CS", "2565"),
            record("2", "ปกติ", 2.0, "CS", "2565"),
            record("3", "พ้นสภาพ", 1.2, "IT", "2565"),
            record("4", "ปกติ", 2.49, "IT", "2566"),
            record("5", "ปกติ", 2.5, "CS", "2566"),
            record("6", "ลาออก", 3.0, "CS", "2566"),
            record("7", "ปกติ", 3.49, "IT", "2566"),
            record("8", "ปกติ", 3.5, "CS", "2567"),
            record("9", "ปกติ", 4.0, "", "2567"),
        ]
    }

    #[test]
    fn test_status_distribution_first_appearance_order() {
        let buckets = status_distribution(&cohort());
        let names: Vec<&str> = buckets.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["ปกติ", "พ้นสภาพ", "ลาออก"]);
        assert_eq!(buckets[0].count, 7);
        assert_eq!(buckets[0].percentage, "77.78");
    }

    #[test]
    fn test_status_counts_and_percentages_sum_up() {
        let records = cohort();
        let buckets = status_distribution(&records);

        let count_sum: usize = buckets.iter().map(|b| b.count).sum();
        assert_eq!(count_sum, records.len());

        let pct_sum: f64 = buckets
            .iter()
            .map(|b| b.percentage.parse::<f64>().unwrap())
            .sum();
        assert!((pct_sum - 100.0).abs() < 0.05, "sum was {pct_sum}");
    }

    #[test]
    fn test_gpa_bucket_boundaries() {
        assert_eq!(gpa_bucket_index(0.0), 0);
        assert_eq!(gpa_bucket_index(1.99), 0);
        assert_eq!(gpa_bucket_index(2.0), 1);
        assert_eq!(gpa_bucket_index(2.49), 1);
        assert_eq!(gpa_bucket_index(2.5), 2);
        assert_eq!(gpa_bucket_index(2.99), 2);
        assert_eq!(gpa_bucket_index(3.0), 3);
        assert_eq!(gpa_bucket_index(3.49), 3);
        assert_eq!(gpa_bucket_index(3.5), 4);
        assert_eq!(gpa_bucket_index(4.0), 4);
    }

    #[test]
    fn test_histogram_totals_sum_to_record_count() {
        let records = cohort();
        let universe = unique_curriculums(&records);
        let buckets = gpa_histogram(&records, &universe);

        assert_eq!(buckets.len(), 5);
        let total: usize = buckets.iter().map(|b| b.total).sum();
        assert_eq!(total, records.len());

        let labels: Vec<&str> = buckets.iter().map(|b| b.range.as_str()).collect();
        assert_eq!(labels, vec!["< 2.0", "2.0-2.49", "2.5-2.99", "3.0-3.49", ">= 3.5"]);
    }

    #[test]
    fn test_histogram_exposes_full_curriculum_universe() {
        let records = cohort();
        let universe = unique_curriculums(&records);
        assert_eq!(universe, vec!["CS", "IT", "Uncategorized"]);

        for bucket in gpa_histogram(&records, &universe) {
            let columns: Vec<&String> = bucket.per_curriculum.keys().collect();
            assert_eq!(columns, universe.iter().collect::<Vec<_>>());
            let sub_total: usize = bucket.per_curriculum.values().sum();
            assert_eq!(sub_total, bucket.total);
        }
    }

    #[test]
    fn test_year_crosstab_sorted_with_full_universe() {
        let records = cohort();
        let universe = unique_curriculums(&records);
        let rows = year_crosstab(&records, &universe);

        let years: Vec<&str> = rows.iter().map(|r| r.academic_year.as_str()).collect();
        assert_eq!(years, vec!["2565", "2566", "2567"]);

        let total: usize = rows.iter().map(|r| r.total).sum();
        assert_eq!(total, records.len());

        for row in &rows {
            let columns: Vec<&String> = row.per_curriculum.keys().collect();
            assert_eq!(columns, universe.iter().collect::<Vec<_>>());
        }
        // Curriculums absent for a year are 0, not absent.
        assert_eq!(rows[0].per_curriculum["Uncategorized"], 0);
    }

    #[test]
    fn test_year_crosstab_maps_empty_year_to_uncategorized() {
        let records = vec![record("1", "ปกติ", 3.0, "CS", "")];
        let rows = year_crosstab(&records, &unique_curriculums(&records));
        assert_eq!(rows[0].academic_year, "Uncategorized");
    }

    #[test]
    fn test_curriculum_totals_sorted_desc_with_stable_ties() {
        let records = vec![
            record("1", "ปกติ", 3.0, "IT", "2565"),
            record("2", "ปกติ", 3.0, "CS", "2565"),
            record("3", "ปกติ", 3.0, "CS", "2565"),
            record("4", "ปกติ", 3.0, "SE", "2565"),
        ];

        let totals = curriculum_totals(&records);
        let names: Vec<&str> = totals.iter().map(|t| t.curriculum.as_str()).collect();
        // CS leads on count; IT and SE tie and keep discovery order.
        assert_eq!(names, vec!["CS", "IT", "SE"]);
        assert_eq!(totals[0].percentage, "50.00");
    }

    #[test]
    fn test_probation_requires_normal_status_and_low_gpax() {
        let records = cohort();
        let summary = probation_summary(&records, &DashboardRules::default());

        // Students 1 (ปกติ, 1.5) qualifies; 3 (พ้นสภาพ, 1.2) does not.
        assert_eq!(summary.total, 1);
        assert_eq!(summary.by_curriculum, vec![("CS".to_string(), 1)]);

        let below_threshold = records.iter().filter(|r| r.gpax < 2.0).count();
        assert!(summary.total <= below_threshold);
    }

    #[test]
    fn test_probation_rules_are_configurable() {
        let rules = DashboardRules {
            probation_gpax_threshold: 2.5,
            normal_status: "ปกติ".to_string(),
        };
        let summary = probation_summary(&cohort(), &rules);
        assert_eq!(summary.total, 3);
    }

    #[test]
    fn test_mean_gpax() {
        let records = vec![
            record("1", "ปกติ", 2.0, "CS", "2565"),
            record("2", "ปกติ", 4.0, "CS", "2565"),
        ];
        assert_eq!(mean_gpax(&records), 3.0);
    }

    #[test]
    fn test_empty_input_degrades_to_zero_values() {
        let aggregates = aggregate(&[], &DashboardRules::default());
        assert_eq!(aggregates.total_records, 0);
        assert_eq!(aggregates.mean_gpax, 0.0);
        assert!(aggregates.status_distribution.is_empty());
        assert!(aggregates.year_crosstab.is_empty());
        assert!(aggregates.curriculum_totals.is_empty());
        assert_eq!(aggregates.probation.total, 0);
        assert!(aggregates.unique_curriculums.is_empty());
        // The histogram keeps its fixed shape even with no data.
        assert_eq!(aggregates.gpa_histogram.len(), 5);
        assert!(aggregates.gpa_histogram.iter().all(|b| b.total == 0));
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let records = cohort();
        let rules = DashboardRules::default();
        assert_eq!(aggregate(&records, &rules), aggregate(&records, &rules));
    }
}
