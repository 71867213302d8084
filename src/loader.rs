use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::info;

use crate::error::HistoryError;
use crate::models::{Observation, Pattern, Symbol};

/// Expected positional layout of the tagged-returns table:
/// `idx, date, adj_close, ret, next_ret, abs_ret, std_dev, tag, tag_pattern`.
const FIELDS: usize = 9;

fn parse_f64(row: usize, column: &'static str, value: &str) -> Result<f64, HistoryError> {
    value.trim().parse().map_err(|_| HistoryError::BadNumber {
        row,
        column,
        value: value.to_string(),
    })
}

/// Load and validate the historical observation sequence.
///
/// The header row is skipped. Every data row must carry nine fields with
/// parseable numerics, a single-symbol tag and a pattern whose width
/// matches the first row's. Any violation fails the whole load; nothing
/// is simulated against a partially parsed history.
pub fn load_history<R: Read>(reader: R) -> Result<Vec<Observation>, HistoryError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut observations = Vec::new();
    let mut expected_width: Option<usize> = None;

    for (i, record) in rdr.records().enumerate() {
        let row = i + 1; // 1-based data row, header excluded
        let record = record?;

        if record.len() != FIELDS {
            return Err(HistoryError::FieldCount {
                row,
                found: record.len(),
            });
        }

        let tag_field = record[7].trim();
        let mut tag_chars = tag_field.chars();
        let tag = match (tag_chars.next().and_then(Symbol::from_char), tag_chars.next()) {
            (Some(tag), None) => tag,
            _ => {
                return Err(HistoryError::BadTag {
                    row,
                    value: tag_field.to_string(),
                })
            }
        };

        let tag_pattern = Pattern::parse(record[8].trim())?;
        match expected_width {
            None => expected_width = Some(tag_pattern.width()),
            Some(expected) if tag_pattern.width() != expected => {
                return Err(HistoryError::PatternWidthMismatch {
                    row,
                    found: tag_pattern.width(),
                    expected,
                });
            }
            Some(_) => {}
        }

        observations.push(Observation {
            idx: record[0].to_string(),
            date: record[1].to_string(),
            adj_close: parse_f64(row, "adj_close", &record[2])?,
            ret: parse_f64(row, "ret", &record[3])?,
            next_ret: parse_f64(row, "next_ret", &record[4])?,
            abs_ret: parse_f64(row, "abs_ret", &record[5])?,
            std_dev: parse_f64(row, "std_dev", &record[6])?,
            tag,
            tag_pattern,
        });
    }

    if observations.is_empty() {
        return Err(HistoryError::Empty);
    }

    info!(
        observations = observations.len(),
        pattern_width = expected_width.unwrap_or(0),
        "loaded tagged-returns history"
    );
    Ok(observations)
}

pub fn load_history_from_path(path: &Path) -> Result<Vec<Observation>, HistoryError> {
    let file = File::open(path).map_err(csv::Error::from)?;
    load_history(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "idx,date,adj_close,ret,next_ret,abs_ret,std_dev,tag,tag_pattern\n";

    #[test]
    fn test_load_well_formed_history() {
        let csv = format!(
            "{HEADER}\
             0,2024-01-02,185.64,0.0102,-0.0075,0.0102,0.0111,C,AABBC\n\
             1,2024-01-03,184.25,-0.0075,0.0034,0.0075,0.0110,B,ABBCB\n"
        );
        let history = load_history(csv.as_bytes()).unwrap();

        assert_eq!(history.len(), 2);
        let first = &history[0];
        assert_eq!(first.idx, "0");
        assert_eq!(first.date, "2024-01-02");
        assert!((first.adj_close - 185.64).abs() < 1e-12);
        assert!((first.next_ret + 0.0075).abs() < 1e-12);
        assert_eq!(first.tag, Symbol::C);
        assert_eq!(first.tag_pattern.to_string(), "AABBC");
    }

    #[test]
    fn test_header_row_is_skipped() {
        let csv = format!("{HEADER}0,2024-01-02,100.0,0.01,0.02,0.01,0.005,A,AA\n");
        let history = load_history(csv.as_bytes()).unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_wrong_field_count_fails() {
        let csv = format!("{HEADER}0,2024-01-02,100.0,0.01\n");
        let err = load_history(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, HistoryError::FieldCount { row: 1, found: 4 }));
    }

    #[test]
    fn test_non_numeric_field_fails() {
        let csv = format!("{HEADER}0,2024-01-02,oops,0.01,0.02,0.01,0.005,A,AA\n");
        let err = load_history(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            HistoryError::BadNumber {
                row: 1,
                column: "adj_close",
                ..
            }
        ));
    }

    #[test]
    fn test_bad_tag_fails() {
        let csv = format!("{HEADER}0,2024-01-02,100.0,0.01,0.02,0.01,0.005,AB,AA\n");
        assert!(matches!(
            load_history(csv.as_bytes()).unwrap_err(),
            HistoryError::BadTag { row: 1, .. }
        ));

        let csv = format!("{HEADER}0,2024-01-02,100.0,0.01,0.02,0.01,0.005,X,AA\n");
        assert!(matches!(
            load_history(csv.as_bytes()).unwrap_err(),
            HistoryError::BadTag { row: 1, .. }
        ));
    }

    #[test]
    fn test_inconsistent_pattern_width_fails() {
        let csv = format!(
            "{HEADER}\
             0,2024-01-02,100.0,0.01,0.02,0.01,0.005,A,AA\n\
             1,2024-01-03,101.0,0.01,0.02,0.01,0.005,A,AAA\n"
        );
        let err = load_history(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            HistoryError::PatternWidthMismatch {
                row: 2,
                found: 3,
                expected: 2
            }
        ));
    }

    #[test]
    fn test_empty_history_fails() {
        let err = load_history(HEADER.as_bytes()).unwrap_err();
        assert!(matches!(err, HistoryError::Empty));
    }
}
