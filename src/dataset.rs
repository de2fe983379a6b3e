// 📂 Dataset - CSV in, CSV out
// Loads the static client dataset and validates it once at the boundary,
// so everything downstream can trust every field is present and finite.

use crate::metrics::FlaggedRow;
use crate::record::ClientRecord;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default file name of the bundled dataset
pub const DEFAULT_DATA_FILE: &str = "dummy_finfit_data.csv";

/// File name used for flagged-clients exports
pub const FLAGGED_EXPORT_FILE: &str = "flagged_clients.csv";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open dataset {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("line {line}: failed to parse client record")]
    Parse {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("line {line}: field {field} is not a finite number")]
    NonFinite { line: u64, field: &'static str },

    #[error("line {line}: Client_ID is empty")]
    MissingClientId { line: u64 },

    #[error("duplicate Client_ID {client_id:?} on line {line}")]
    DuplicateClientId { client_id: String, line: u64 },

    #[error("dataset contains no client records")]
    Empty,

    #[error("failed to write {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ============================================================================
// LOADING
// ============================================================================

pub fn load_csv(csv_path: &Path) -> Result<Vec<ClientRecord>, DatasetError> {
    let rdr = csv::Reader::from_path(csv_path).map_err(|source| DatasetError::Open {
        path: csv_path.to_path_buf(),
        source,
    })?;

    let records = read_records(rdr)?;

    tracing::info!(
        path = %csv_path.display(),
        records = records.len(),
        "loaded client dataset"
    );

    Ok(records)
}

/// Parse client records from any reader (header row required).
pub fn load_reader<R: Read>(reader: R) -> Result<Vec<ClientRecord>, DatasetError> {
    read_records(csv::Reader::from_reader(reader))
}

fn read_records<R: Read>(mut rdr: csv::Reader<R>) -> Result<Vec<ClientRecord>, DatasetError> {
    let mut records = Vec::new();
    let mut seen_ids = HashSet::new();

    for (idx, result) in rdr.deserialize::<ClientRecord>().enumerate() {
        // Line 1 is the header
        let line = idx as u64 + 2;

        let mut record = result.map_err(|source| DatasetError::Parse { line, source })?;
        validate_record(&mut record, line)?;

        if !seen_ids.insert(record.client_id.clone()) {
            return Err(DatasetError::DuplicateClientId {
                client_id: record.client_id,
                line,
            });
        }

        records.push(record);
    }

    if records.is_empty() {
        return Err(DatasetError::Empty);
    }

    Ok(records)
}

fn validate_record(record: &mut ClientRecord, line: u64) -> Result<(), DatasetError> {
    record.client_id = record.client_id.trim().to_string();
    if record.client_id.is_empty() {
        return Err(DatasetError::MissingClientId { line });
    }

    for (field, value) in record.numeric_fields() {
        if !value.is_finite() {
            return Err(DatasetError::NonFinite { line, field });
        }
    }

    Ok(())
}

// ============================================================================
// EXPORT
// ============================================================================

/// Write the flagged-clients listing as delimited text.
pub fn write_flagged_csv<W: Write>(writer: W, rows: &[FlaggedRow]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        wtr.write_record(FlaggedRow::HEADERS)?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Export flagged clients to `<dir>/flagged_clients.csv`, returning the path.
pub fn export_flagged(dir: &Path, rows: &[FlaggedRow]) -> Result<PathBuf, DatasetError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(FLAGGED_EXPORT_FILE);

    let file = std::fs::File::create(&path)?;
    write_flagged_csv(file, rows).map_err(|source| DatasetError::Write {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), rows = rows.len(), "exported flagged clients");
    Ok(path)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::flagged_report;
    use std::io::Write as _;
    use tempfile::TempDir;

    const HEADER: &str = "Client_ID,Region,Gender,Financial_Personality,Spending_Pattern,Net_Income,Expenses_Fixed,Expenses_Variable,Expenses_Discretionary,Net_Worth,Debt_to_Income,Savings_to_Income,Financial_Stress_Index,Happiness_Index,Financial_Wellness_Score";

    fn csv_with(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out.push('\n');
        out
    }

    #[test]
    fn test_load_reader_parses_rows() {
        let data = csv_with(&[
            "C001,Khomas,Female,Saver,Frugal,12000,4000,2000,1000,35000,0.3,0.2,40,75,72.5",
            "C002,Erongo,Male,Spender,Impulsive,8000,5000,2500,1500,-1200,0.65,0.05,82,30,35",
        ]);

        let records = load_reader(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].client_id, "C001");
        assert_eq!(records[0].region, "Khomas");
        assert_eq!(records[0].total_expenses(), 7000.0);
        assert_eq!(records[1].net_worth, -1200.0);
        assert_eq!(records[1].financial_wellness_score, 35.0);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let data = "Client_ID,Date,Net_Income,Expenses_Fixed,Expenses_Variable,Expenses_Discretionary,Net_Worth,Debt_to_Income,Savings_to_Income,Financial_Stress_Index,Happiness_Index,Financial_Wellness_Score\n\
                    C010,2024-01-31,1000,100,100,100,10,0.1,0.2,10,50,50\n";

        let records = load_reader(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].region, "");
    }

    #[test]
    fn test_non_numeric_field_is_rejected() {
        let data = csv_with(&[
            "C001,Khomas,Female,Saver,Frugal,12000,4000,2000,1000,35000,0.3,0.2,40,75,72.5",
            "C002,Erongo,Male,Spender,Impulsive,lots,5000,2500,1500,-1200,0.65,0.05,82,30,35",
        ]);

        let err = load_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::Parse { line: 3, .. }), "{err:?}");
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let data = csv_with(&["C001,Khomas,Female,Saver,Frugal,12000,4000,2000,1000,35000,0.3,0.2,,75,72.5"]);

        let err = load_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::Parse { line: 2, .. }), "{err:?}");
    }

    #[test]
    fn test_nan_is_rejected() {
        let data = csv_with(&["C001,Khomas,Female,Saver,Frugal,12000,4000,2000,1000,35000,NaN,0.2,40,75,72.5"]);

        let err = load_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::NonFinite { line: 2, field: "Debt_to_Income" }
        ));
    }

    #[test]
    fn test_duplicate_and_blank_ids_are_rejected() {
        let dup = csv_with(&[
            "C001,Khomas,Female,Saver,Frugal,1,1,1,1,1,0.1,0.2,1,1,1",
            " C001 ,Khomas,Female,Saver,Frugal,1,1,1,1,1,0.1,0.2,1,1,1",
        ]);
        match load_reader(dup.as_bytes()).unwrap_err() {
            DatasetError::DuplicateClientId { client_id, line } => {
                assert_eq!(client_id, "C001");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let blank = csv_with(&["  ,Khomas,Female,Saver,Frugal,1,1,1,1,1,0.1,0.2,1,1,1"]);
        assert!(matches!(
            load_reader(blank.as_bytes()).unwrap_err(),
            DatasetError::MissingClientId { line: 2 }
        ));
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let data = csv_with(&[]);
        assert!(matches!(load_reader(data.as_bytes()).unwrap_err(), DatasetError::Empty));
    }

    #[test]
    fn test_load_csv_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, DatasetError::Open { .. }));
    }

    #[test]
    fn test_load_csv_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_DATA_FILE);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(
            csv_with(&["C001,Khomas,Female,Saver,Frugal,12000,4000,2000,1000,35000,0.3,0.2,40,75,72.5"])
                .as_bytes(),
        )
        .unwrap();

        let records = load_csv(&path).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_export_flagged_round_trip_headers() {
        let data = csv_with(&[
            "C001,Khomas,Female,Saver,Frugal,12000,4000,2000,1000,35000,0.3,0.2,40,75,72.5",
            "C002,Erongo,Male,Spender,Impulsive,8000,5000,2500,1500,-1200,0.65,0.05,82,30,35",
        ]);
        let records = load_reader(data.as_bytes()).unwrap();
        let rows = flagged_report(&records);

        let dir = TempDir::new().unwrap();
        let path = export_flagged(&dir.path().join("exports"), &rows).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();

        let mut lines = written.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Client_ID,Region,Debt_to_Income,Savings_to_Income,Financial_Stress_Index,Risk_Tags"
        );
        assert_eq!(
            lines.next().unwrap(),
            "C002,Erongo,0.65,0.05,82.0,\"High Debt, Low Savings, High Stress, Negative Worth\""
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_export_with_no_flagged_rows_still_has_header() {
        let mut buf = Vec::new();
        write_flagged_csv(&mut buf, &[]).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap().trim_end(),
            "Client_ID,Region,Debt_to_Income,Savings_to_Income,Financial_Stress_Index,Risk_Tags"
        );
    }
}
