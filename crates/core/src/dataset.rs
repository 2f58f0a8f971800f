//! Training table loading and the stratified train/test split.
//!
//! The table is a CSV file with a header row. Only the `symptoms` and `disease` columns are read;
//! any other columns are ignored.

use crate::constants::{DISEASE_COLUMN, SYMPTOMS_COLUMN};
use crate::error::{CoreError, CoreResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use symcheck_types::NonEmptyText;

/// One labelled example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingRecord {
    pub symptoms: String,
    pub disease: String,
}

impl TrainingRecord {
    pub fn new(symptoms: impl Into<String>, disease: impl Into<String>) -> Self {
        Self {
            symptoms: symptoms.into(),
            disease: disease.into(),
        }
    }
}

/// Reads the training table at `path`.
///
/// # Errors
///
/// Returns `CoreError::DatasetRead` if the file cannot be opened, and the errors of
/// [`read_dataset`] otherwise.
pub fn load_dataset(path: &Path) -> CoreResult<Vec<TrainingRecord>> {
    let file = File::open(path).map_err(|source| CoreError::DatasetRead {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_dataset(file)?;
    tracing::info!(
        path = %path.display(),
        records = records.len(),
        "loaded training dataset"
    );
    Ok(records)
}

/// Reads training records from any CSV source.
///
/// # Errors
///
/// - `CoreError::DatasetParse` for malformed CSV.
/// - `CoreError::TrainingData` if a required column is missing, a row has an empty label, or the
///   table has no rows.
pub fn read_dataset<R: Read>(reader: R) -> CoreResult<Vec<TrainingRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CoreError::TrainingData(format!("dataset has no '{name}' column")))
    };
    let symptoms_at = column(SYMPTOMS_COLUMN)?;
    let disease_at = column(DISEASE_COLUMN)?;

    let mut records = Vec::new();
    for (row, result) in csv_reader.records().enumerate() {
        let record = result?;
        // Header is line 1.
        let line = row + 2;
        let symptoms = record.get(symptoms_at).ok_or_else(|| {
            CoreError::TrainingData(format!("row {line} has no '{SYMPTOMS_COLUMN}' field"))
        })?;
        let disease = NonEmptyText::new(record.get(disease_at).unwrap_or_default())
            .map_err(|e| CoreError::TrainingData(format!("row {line} disease label: {e}")))?;
        records.push(TrainingRecord::new(symptoms, disease.into_inner()));
    }

    if records.is_empty() {
        return Err(CoreError::TrainingData("dataset has no rows".into()));
    }
    Ok(records)
}

/// Number of records per label, ordered by label.
pub fn label_counts(records: &[TrainingRecord]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.disease.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Splits `records` into (train, test) preserving label proportions.
///
/// Each label contributes `round(count * test_fraction)` records to the test set, clamped so
/// that both sides get at least one. Selection within a label is a seeded shuffle, so the split is
/// reproducible. Both outputs keep the input order.
///
/// # Errors
///
/// Returns `CoreError::TrainingData` if `test_fraction` is outside `(0, 1)` or any label has fewer
/// than two records.
pub fn stratified_split(
    records: &[TrainingRecord],
    test_fraction: f64,
    seed: u64,
) -> CoreResult<(Vec<TrainingRecord>, Vec<TrainingRecord>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(CoreError::TrainingData(format!(
            "test fraction must be between 0 and 1, got {test_fraction}"
        )));
    }

    let mut by_label: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, record) in records.iter().enumerate() {
        by_label.entry(record.disease.as_str()).or_default().push(index);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut in_test = vec![false; records.len()];
    for (label, mut indices) in by_label {
        let count = indices.len();
        if count < 2 {
            return Err(CoreError::TrainingData(format!(
                "label '{label}' has {count} record(s); at least 2 are needed to stratify"
            )));
        }
        let n_test = ((count as f64 * test_fraction).round() as usize).clamp(1, count - 1);
        indices.shuffle(&mut rng);
        for &index in &indices[..n_test] {
            in_test[index] = true;
        }
    }

    let mut train = Vec::new();
    let mut test = Vec::new();
    for (record, is_test) in records.iter().zip(in_test) {
        if is_test {
            test.push(record.clone());
        } else {
            train.push(record.clone());
        }
    }
    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
id,symptoms,disease,source
1,\"fever, cough\",Flu (Influenza),a
2,\"runny nose, sneezing\",Common Cold,b
3,\"fever, body ache\",Flu (Influenza),c
";

    #[test]
    fn reads_named_columns_and_ignores_others() {
        let records = read_dataset(CSV.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], TrainingRecord::new("fever, cough", "Flu (Influenza)"));
        assert_eq!(records[1].disease, "Common Cold");
    }

    #[test]
    fn missing_column_is_reported() {
        let err = read_dataset("text,label\nfever,Flu\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("'symptoms'"));
    }

    #[test]
    fn empty_label_is_rejected_with_row_number() {
        let err = read_dataset("symptoms,disease\nfever,Flu\ncough,\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CoreError::TrainingData(ref m) if m.contains("row 3")));
    }

    #[test]
    fn short_row_without_symptoms_is_rejected_with_row_number() {
        let csv = "disease,symptoms\nFlu,fever\nCommon Cold\n";
        let err = read_dataset(csv.as_bytes()).unwrap_err();
        let CoreError::TrainingData(message) = err else {
            panic!("expected a training data error, got {err}");
        };
        assert!(message.contains("row 3"), "{message}");
        assert!(message.contains("'symptoms'"), "{message}");
    }

    #[test]
    fn header_only_table_is_rejected() {
        assert!(matches!(
            read_dataset("symptoms,disease\n".as_bytes()),
            Err(CoreError::TrainingData(_))
        ));
    }

    #[test]
    fn load_dataset_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dataset(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, CoreError::DatasetRead { .. }));
    }

    fn balanced(per_label: usize) -> Vec<TrainingRecord> {
        let mut records = Vec::new();
        for label in ["A", "B", "C"] {
            for i in 0..per_label {
                records.push(TrainingRecord::new(format!("{label} symptom {i}"), label));
            }
        }
        records
    }

    #[test]
    fn split_preserves_label_proportions() {
        let records = balanced(20);
        let (train, test) = stratified_split(&records, 0.15, 42).unwrap();
        assert_eq!(train.len() + test.len(), records.len());
        // round(20 * 0.15) = 3 per label
        for (_, count) in label_counts(&test) {
            assert_eq!(count, 3);
        }
        for (_, count) in label_counts(&train) {
            assert_eq!(count, 17);
        }
    }

    #[test]
    fn split_is_reproducible() {
        let records = balanced(20);
        let a = stratified_split(&records, 0.15, 42).unwrap();
        let b = stratified_split(&records, 0.15, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn every_label_keeps_one_record_on_each_side() {
        let records = balanced(2);
        let (train, test) = stratified_split(&records, 0.15, 1).unwrap();
        assert_eq!(label_counts(&train).values().copied().collect::<Vec<_>>(), vec![1, 1, 1]);
        assert_eq!(label_counts(&test).values().copied().collect::<Vec<_>>(), vec![1, 1, 1]);
    }

    #[test]
    fn singleton_label_cannot_be_stratified() {
        let mut records = balanced(5);
        records.push(TrainingRecord::new("rare", "Rare"));
        let err = stratified_split(&records, 0.15, 42).unwrap_err();
        assert!(err.to_string().contains("'Rare'"));
    }

    #[test]
    fn test_fraction_must_be_a_proper_fraction() {
        let records = balanced(5);
        for fraction in [0.0, 1.0, -0.5, f64::NAN] {
            assert!(stratified_split(&records, fraction, 42).is_err());
        }
    }
}
