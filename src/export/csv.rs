//! CSV serialization for report downloads.
//!
//! Fields containing commas, quotes, or line breaks are quoted per RFC 4180;
//! everything else is written bare to keep the output diff-friendly.

use crate::models::{AttendanceSheet, Justification, StaffAssignment};

/// A record type exportable as one CSV row.
pub trait CsvRecord {
    fn header() -> &'static [&'static str];
    fn fields(&self) -> Vec<String>;
}

/// Serialize `records` to a CSV string, header row first.
pub fn to_csv<T: CsvRecord>(records: &[T]) -> String {
    let mut out = String::new();
    write_row(&mut out, T::header().iter().map(|s| s.to_string()));
    for record in records {
        write_row(&mut out, record.fields().into_iter());
    }
    out
}

fn write_row(out: &mut String, fields: impl Iterator<Item = String>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(&escape_field(&field));
    }
    out.push_str("\r\n");
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

impl CsvRecord for StaffAssignment {
    fn header() -> &'static [&'static str] {
        &["document", "name", "role", "start_date", "end_date"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.document.clone(),
            self.person_name.clone(),
            self.role.clone(),
            self.start_date.to_string(),
            self.end_date.map(|d| d.to_string()).unwrap_or_default(),
        ]
    }
}

impl CsvRecord for Justification {
    fn header() -> &'static [&'static str] {
        &["student", "absence_date", "reason", "status", "reviewed_by"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.student_name.clone(),
            self.absence_date.to_string(),
            self.reason.clone(),
            format!("{:?}", self.status).to_lowercase(),
            self.reviewed_by.clone().unwrap_or_default(),
        ]
    }
}

impl AttendanceSheet {
    /// Flatten the sheet into per-student CSV rows.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        write_row(
            &mut out,
            ["date", "student", "status", "note"].iter().map(|s| s.to_string()),
        );
        for entry in &self.entries {
            write_row(
                &mut out,
                [
                    self.date.to_string(),
                    entry.student_name.clone(),
                    format!("{:?}", entry.status).to_lowercase(),
                    entry.note.clone().unwrap_or_default(),
                ]
                .into_iter(),
            );
        }
        out
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(name: &str) -> StaffAssignment {
        StaffAssignment {
            id: 1,
            headquarters_id: 4,
            person_name: name.to_string(),
            document: "1017234567".to_string(),
            role: "teacher".to_string(),
            start_date: "2026-01-15".parse().unwrap(),
            end_date: None,
        }
    }

    #[test]
    fn test_plain_fields_written_bare() {
        let csv = to_csv(&[assignment("Luis Pardo")]);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("document,name,role,start_date,end_date"));
        assert_eq!(
            lines.next(),
            Some("1017234567,Luis Pardo,teacher,2026-01-15,")
        );
    }

    #[test]
    fn test_fields_with_commas_and_quotes_are_quoted() {
        let csv = to_csv(&[assignment(r#"Pardo, Luis "Lucho""#)]);
        assert!(csv.contains(r#""Pardo, Luis ""Lucho""""#));
    }

    #[test]
    fn test_attendance_sheet_flattens_entries() {
        use crate::models::{AttendanceEntry, AttendanceStatus};

        let sheet = AttendanceSheet {
            id: Some(55),
            group_id: 301,
            headquarters_id: 4,
            date: "2026-08-20".parse().unwrap(),
            entries: vec![
                AttendanceEntry {
                    student_id: 1,
                    student_name: "Sofía Rojas".to_string(),
                    status: AttendanceStatus::Present,
                    note: None,
                },
                AttendanceEntry {
                    student_id: 2,
                    student_name: "Mateo Gil".to_string(),
                    status: AttendanceStatus::Absent,
                    note: Some("sick".to_string()),
                },
            ],
        };

        let csv = sheet.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "date,student,status,note");
        assert_eq!(lines[1], "2026-08-20,Sofía Rojas,present,");
        assert_eq!(lines[2], "2026-08-20,Mateo Gil,absent,sick");
    }
}
