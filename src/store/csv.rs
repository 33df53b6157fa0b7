//! CSV snapshot serialization
//!
//! Serializes a store snapshot as delimited rows for reporting: one header
//! line, then `id,pseudonym,name,birth_period` per record. Fields are quoted
//! when they contain a delimiter, quote, or line break.

use crate::domain::PatientRecord;
use chrono::Local;

/// Column order of the snapshot.
const HEADER: [&str; 4] = ["id", "pseudonym", "name", "birth_period"];

/// Serializes the given records to CSV bytes.
pub fn to_csv(records: &[PatientRecord]) -> Vec<u8> {
    let mut out = String::new();
    write_row(&mut out, HEADER.iter().copied());
    for record in records {
        write_row(
            &mut out,
            [
                record.id.as_str(),
                record.pseudonym.as_str(),
                record.name.as_str(),
                record.birth_period.as_str(),
            ]
            .into_iter(),
        );
    }
    out.into_bytes()
}

/// Snapshot file name derived from the current local time.
pub fn snapshot_filename() -> String {
    format!("{}.csv", Local::now().format("%Y-%m-%d_%H-%M-%S"))
}

fn write_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        push_field(out, field);
    }
    out.push_str("\r\n");
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        for c in field.chars() {
            if c == '"' {
                out.push('"');
            }
            out.push(c);
        }
        out.push('"');
    } else {
        out.push_str(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_csv_header_and_rows() {
        let records = vec![
            PatientRecord {
                id: "P001".to_string(),
                pseudonym: "abc".to_string(),
                name: "Alice".to_string(),
                birth_period: "2020/01".to_string(),
            },
            PatientRecord::new("P002", "def"),
        ];
        let csv = String::from_utf8(to_csv(&records)).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "id,pseudonym,name,birth_period");
        assert_eq!(lines[1], "P001,abc,Alice,2020/01");
        assert_eq!(lines[2], "P002,def,,");
    }

    #[test]
    fn test_to_csv_quotes_special_characters() {
        let records = vec![PatientRecord {
            id: "P,1".to_string(),
            pseudonym: "abc".to_string(),
            name: "De \"Wit\"".to_string(),
            birth_period: String::new(),
        }];
        let csv = String::from_utf8(to_csv(&records)).unwrap();
        assert!(csv.contains(r#""P,1",abc,"De ""Wit""","#));
    }

    #[test]
    fn test_to_csv_empty_snapshot() {
        let csv = String::from_utf8(to_csv(&[])).unwrap();
        assert_eq!(csv, "id,pseudonym,name,birth_period\r\n");
    }

    #[test]
    fn test_snapshot_filename_shape() {
        let name = snapshot_filename();
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), "2026-01-01_00-00-00.csv".len());
    }
}
