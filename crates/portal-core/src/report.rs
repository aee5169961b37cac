//! Attendance export: a dense date × person matrix and its CSV form.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
  attendance::{AttendanceStatus, Ledger},
  directory::{Directory, Scope},
  person::{ClassYear, Role},
};

/// Column names of the exported CSV, in order.
pub const CSV_HEADER: [&str; 9] = [
  "Date",
  "Person Id",
  "Name",
  "Role",
  "Department",
  "Class",
  "Batch",
  "Status",
  "Arrival Time",
];

/// One cell of the matrix: a person on a date. Person attributes come from
/// the directory as it is now; status and arrival time from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixRow {
  pub date:         NaiveDate,
  pub person_id:    String,
  pub name:         String,
  pub role:         Role,
  pub department:   Option<String>,
  pub class_year:   Option<ClassYear>,
  pub batch:        Option<String>,
  pub status:       AttendanceStatus,
  pub arrival_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceMatrix {
  pub scope: Scope,
  pub rows:  Vec<MatrixRow>,
}

/// Every date in `[date_from, date_to]`, inclusive. Empty if reversed.
pub fn dates_between(date_from: NaiveDate, date_to: NaiveDate) -> Vec<NaiveDate> {
  date_from.iter_days().take_while(|d| *d <= date_to).collect()
}

/// Build the full cross product of dates and in-scope people, date-major.
/// Days without a record read as `Absent` with no arrival time.
pub fn build_attendance_matrix(
  directory: &Directory,
  ledger: &Ledger,
  scope: &Scope,
  date_from: NaiveDate,
  date_to: NaiveDate,
) -> AttendanceMatrix {
  let people: Vec<_> = directory.in_scope(scope).collect();
  let dates = dates_between(date_from, date_to);
  let mut rows = Vec::with_capacity(people.len() * dates.len());

  for date in dates {
    for person in &people {
      let entry = ledger.entry(person, date);
      rows.push(MatrixRow {
        date,
        person_id: person.id.clone(),
        name: person.name.clone(),
        role: person.role,
        department: person.department.clone(),
        class_year: person.class_year,
        batch: person.batch.clone(),
        status: entry.status,
        arrival_time: entry.arrival_time.map(str::to_owned),
      });
    }
  }

  AttendanceMatrix { scope: scope.clone(), rows }
}

/// Serialise to CSV: a header line then one line per row, `\n`-separated
/// with no trailing newline.
///
/// The name column is always wrapped in double quotes so embedded commas
/// survive. Embedded double quotes are written as-is, not doubled; consumers
/// of the existing files rely on that exact shape.
pub fn serialize_csv(matrix: &AttendanceMatrix) -> String {
  let mut lines = Vec::with_capacity(matrix.rows.len() + 1);
  lines.push(CSV_HEADER.join(","));

  for row in &matrix.rows {
    let fields = [
      row.date.to_string(),
      row.person_id.clone(),
      format!("\"{}\"", row.name),
      row.role.to_string(),
      row.department.clone().unwrap_or_default(),
      row.class_year.map(|c| c.to_string()).unwrap_or_default(),
      row.batch.clone().unwrap_or_default(),
      row.status.to_string(),
      row.arrival_time.clone().unwrap_or_default(),
    ];
    lines.push(fields.join(","));
  }

  lines.join("\n")
}

/// Download name for an export, e.g. `Attendance_STUDENT.csv`.
pub fn export_file_name(scope: &Scope) -> String {
  format!("Attendance_{}.csv", scope.tag())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{academic::AcademicConfig, person::Person};

  fn date(s: &str) -> NaiveDate { s.parse().unwrap() }

  fn roster() -> Directory {
    Directory::new(vec![
      Person::admin("root", "Root"),
      Person::student("s1", "Khan, Sara", "DPT", ClassYear::First, "2023-2027"),
      Person::student("s2", "Omar", "DPT", ClassYear::First, "2023-2027"),
      Person::student("s3", "Ali \"Ace\" Raza", "DPT", ClassYear::First, "2023-2027"),
      Person::staff("t1", "Teacher", "Faculty"),
    ])
  }

  fn students() -> Scope { Scope::role(Role::Student).with_department("DPT") }

  #[test]
  fn matrix_is_full_cross_product() {
    let dir = roster();
    let ledger = Ledger::default();
    let m = build_attendance_matrix(
      &dir,
      &ledger,
      &students(),
      date("2025-02-27"),
      date("2025-03-02"),
    );
    // 2025 is not a leap year: 27, 28, 1, 2.
    assert_eq!(m.rows.len(), 3 * 4);
    assert!(m.rows.iter().all(|r| r.status == AttendanceStatus::Absent));
  }

  #[test]
  fn single_day_yields_one_row_per_person() {
    let dir = roster();
    let ledger = Ledger::default();
    let d = date("2025-03-10");
    let m = build_attendance_matrix(&dir, &ledger, &students(), d, d);
    assert_eq!(m.rows.len(), 3);
  }

  #[test]
  fn reversed_range_is_empty() {
    let dir = roster();
    let ledger = Ledger::default();
    let m = build_attendance_matrix(
      &dir,
      &ledger,
      &students(),
      date("2025-03-10"),
      date("2025-03-09"),
    );
    assert!(m.rows.is_empty());
  }

  #[test]
  fn csv_header_and_quoting() {
    let cfg = AcademicConfig::default();
    let dir = roster();
    let root = dir.require("root").unwrap();
    let mut ledger = Ledger::default();
    let d = date("2025-03-10");
    ledger
      .set_status(&cfg.policy(), root, &dir, "s2", d, AttendanceStatus::Late)
      .unwrap();

    let csv = serialize_csv(&build_attendance_matrix(&dir, &ledger, &students(), d, d));
    let mut lines = csv.lines();
    let header: Vec<_> = lines.next().unwrap().split(',').collect();
    assert_eq!(header, CSV_HEADER);

    let rows: Vec<_> = lines.collect();
    assert_eq!(
      rows[0],
      "2025-03-10,s1,\"Khan, Sara\",STUDENT,DPT,1st Year,2023-2027,Absent,"
    );
    assert_eq!(rows[1], "2025-03-10,s2,\"Omar\",STUDENT,DPT,1st Year,2023-2027,Late,");
    assert!(!csv.ends_with('\n'));
  }

  #[test]
  fn csv_does_not_escape_embedded_quotes() {
    // Known limitation kept for compatibility: quotes inside the name are
    // not doubled, so this line is not RFC 4180 conformant.
    let dir = roster();
    let ledger = Ledger::default();
    let d = date("2025-03-10");
    let csv = serialize_csv(&build_attendance_matrix(&dir, &ledger, &students(), d, d));
    assert!(csv.contains(",\"Ali \"Ace\" Raza\","));
  }

  #[test]
  fn arrival_time_is_exported() {
    let cfg = AcademicConfig::default();
    let dir = roster();
    let root = dir.require("root").unwrap();
    let mut ledger = Ledger::default();
    let d = date("2025-03-10");
    ledger
      .set_arrival_time(&cfg.policy(), root, &dir, "t1", d, "08:45")
      .unwrap();

    let scope = Scope::role(Role::Staff);
    let csv = serialize_csv(&build_attendance_matrix(&dir, &ledger, &scope, d, d));
    assert!(csv.ends_with("2025-03-10,t1,\"Teacher\",STAFF,Faculty,,,Present,08:45"));
    assert_eq!(export_file_name(&scope), "Attendance_STAFF.csv");
  }
}
