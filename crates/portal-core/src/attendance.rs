//! The attendance ledger: one record per person per calendar date.
//!
//! A missing record reads as `Absent` with no arrival time. Reads never
//! materialise records; only [`Ledger::set_status`] and
//! [`Ledger::set_arrival_time`] create them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
  Error, Result,
  directory::{Directory, Scope},
  person::{ClassYear, Person, Role},
  policy::{Action, Policy, Target},
};

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum AttendanceStatus {
  Present,
  #[default]
  Absent,
  Late,
  Online,
}

impl AttendanceStatus {
  /// Parse a status from text, rejecting anything outside the four values.
  pub fn parse(s: &str) -> Result<Self> {
    s.trim().parse().map_err(|_| Error::UnknownStatus(s.to_owned()))
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A person's attendance on one date. The role, class year and batch are a
/// snapshot taken when the record was first written and are not refreshed
/// when the directory changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
  pub user_id:      String,
  pub user_name:    String,
  pub date:         NaiveDate,
  pub status:       AttendanceStatus,
  pub role:         Role,
  /// "HH:MM", 24-hour. Used for staff arrival tracking.
  #[serde(
    rename = "officeReachedTime",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub arrival_time: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub class_year:   Option<ClassYear>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub batch:        Option<String>,
}

impl AttendanceRecord {
  fn snapshot(person: &Person, date: NaiveDate, status: AttendanceStatus) -> Self {
    Self {
      user_id: person.id.clone(),
      user_name: person.name.clone(),
      date,
      status,
      role: person.role,
      arrival_time: None,
      class_year: person.class_year,
      batch: person.batch.clone(),
    }
  }
}

/// One row of a day sheet: a person and their (possibly synthesised) state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEntry<'a> {
  pub person:       &'a Person,
  pub status:       AttendanceStatus,
  pub arrival_time: Option<&'a str>,
  /// `false` when no record exists and the entry is the implicit default.
  pub recorded:     bool,
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
  records: Vec<AttendanceRecord>,
}

impl Ledger {
  pub fn new(records: Vec<AttendanceRecord>) -> Self { Self { records } }

  pub fn records(&self) -> &[AttendanceRecord] { &self.records }

  pub fn get(&self, person_id: &str, date: NaiveDate) -> Option<&AttendanceRecord> {
    self
      .records
      .iter()
      .find(|r| r.user_id == person_id && r.date == date)
  }

  fn position(&self, person_id: &str, date: NaiveDate) -> Option<usize> {
    self
      .records
      .iter()
      .position(|r| r.user_id == person_id && r.date == date)
  }

  /// Set the status for `(person_id, date)`.
  ///
  /// An existing record has only its status replaced. Otherwise a new record
  /// is created from the person's current directory entry.
  pub fn set_status(
    &mut self,
    policy: &Policy<'_>,
    caller: &Person,
    directory: &Directory,
    person_id: &str,
    date: NaiveDate,
    status: AttendanceStatus,
  ) -> Result<&AttendanceRecord> {
    let person = directory.require(person_id)?;
    policy.authorize(caller, Action::MarkStatus, Target::Person(person))?;

    let index = match self.position(person_id, date) {
      Some(i) => {
        self.records[i].status = status;
        i
      }
      None => {
        self.records.push(AttendanceRecord::snapshot(person, date, status));
        self.records.len() - 1
      }
    };
    tracing::info!(person = person_id, %date, %status, by = %caller.id, "set status");
    Ok(&self.records[index])
  }

  /// Record an arrival time for `(person_id, date)`. Recording a time always
  /// forces the status to `Present`.
  pub fn set_arrival_time(
    &mut self,
    policy: &Policy<'_>,
    caller: &Person,
    directory: &Directory,
    person_id: &str,
    date: NaiveDate,
    time: &str,
  ) -> Result<&AttendanceRecord> {
    let person = directory.require(person_id)?;
    policy.authorize(caller, Action::MarkArrival, Target::Person(person))?;

    let index = match self.position(person_id, date) {
      Some(i) => i,
      None => {
        self.records.push(AttendanceRecord::snapshot(
          person,
          date,
          AttendanceStatus::Present,
        ));
        self.records.len() - 1
      }
    };
    let record = &mut self.records[index];
    record.arrival_time = Some(time.to_owned());
    record.status = AttendanceStatus::Present;
    tracing::info!(person = person_id, %date, time, by = %caller.id, "set arrival time");
    Ok(&*record)
  }

  /// The sheet for `date`: every person in `scope`, with their record or the
  /// implicit `Absent` default. Does not modify the ledger.
  pub fn query_day<'a>(
    &'a self,
    directory: &'a Directory,
    date: NaiveDate,
    scope: &'a Scope,
  ) -> Vec<DayEntry<'a>> {
    directory
      .in_scope(scope)
      .map(|person| self.entry(person, date))
      .collect()
  }

  pub(crate) fn entry<'a>(&'a self, person: &'a Person, date: NaiveDate) -> DayEntry<'a> {
    match self.get(&person.id, date) {
      Some(r) => DayEntry {
        person,
        status: r.status,
        arrival_time: r.arrival_time.as_deref(),
        recorded: true,
      },
      None => DayEntry {
        person,
        status: AttendanceStatus::Absent,
        arrival_time: None,
        recorded: false,
      },
    }
  }

  /// All records for one person, newest date first.
  pub fn history(&self, person_id: &str) -> Vec<&AttendanceRecord> {
    let mut records: Vec<_> =
      self.records.iter().filter(|r| r.user_id == person_id).collect();
    records.sort_by(|a, b| b.date.cmp(&a.date));
    records
  }
}
