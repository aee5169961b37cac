//! Academic configuration: the department, program and batch lists that the
//! rest of the portal filters by.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
  Error, Result,
  person::{ClassYear, Person},
  policy::{Action, Policy, Target},
};

// ─── Defaults ────────────────────────────────────────────────────────────────

const STUDENT_DEPARTMENTS: &[&str] = &[
  "MBBS",
  "DPT",
  "BS MLT",
  "BS OTT",
  "BS RIT",
  "BS Optometry",
  "BS Nutrition",
  "BS Psychology",
];

const STAFF_DEPARTMENTS: &[&str] = &[
  "Administration",
  "Faculty",
  "Accounts",
  "IT Support",
  "Student Affairs",
  "Security",
  "Maintenance",
  "Admission Staff",
  "Teaching Staff",
];

const FIVE_YEAR_PROGRAMS: &[&str] = &["MBBS", "DPT"];

const BATCHES: &[&str] = &["2023-2027", "2024-2028", "2025-2029", "2025-2030"];

const TEACHING_DEPARTMENTS: &[&str] = &["Teaching Staff", "Faculty"];

fn owned(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| (*s).to_owned()).collect()
}

// ─── Config ──────────────────────────────────────────────────────────────────

/// Which editable list an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum AcademicList {
  StudentDepartments,
  StaffDepartments,
  Batches,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AcademicConfig {
  pub student_departments:  Vec<String>,
  pub staff_departments:    Vec<String>,
  /// Student departments whose students may be in a fifth year.
  pub five_year_programs:   Vec<String>,
  pub batches:              Vec<String>,
  /// Staff departments whose members may mark student attendance and record
  /// class tests.
  pub teaching_departments: Vec<String>,
}

impl Default for AcademicConfig {
  fn default() -> Self {
    Self {
      student_departments:  owned(STUDENT_DEPARTMENTS),
      staff_departments:    owned(STAFF_DEPARTMENTS),
      five_year_programs:   owned(FIVE_YEAR_PROGRAMS),
      batches:              owned(BATCHES),
      teaching_departments: owned(TEACHING_DEPARTMENTS),
    }
  }
}

impl AcademicConfig {
  /// The policy derived from the current teaching-department flags.
  pub fn policy(&self) -> Policy<'_> { Policy::new(&self.teaching_departments) }

  pub fn is_five_year(&self, department: &str) -> bool {
    self.five_year_programs.iter().any(|d| d == department)
  }

  /// Class years selectable for a department. An empty department offers
  /// only the first year.
  pub fn class_options(&self, department: &str) -> Vec<ClassYear> {
    if department.is_empty() {
      return vec![ClassYear::First];
    }
    let mut options = ClassYear::STANDARD.to_vec();
    if self.is_five_year(department) {
      options.push(ClassYear::Fifth);
    }
    options
  }

  pub fn list(&self, which: AcademicList) -> &[String] {
    match which {
      AcademicList::StudentDepartments => &self.student_departments,
      AcademicList::StaffDepartments => &self.staff_departments,
      AcademicList::Batches => &self.batches,
    }
  }

  fn list_mut(&mut self, which: AcademicList) -> &mut Vec<String> {
    match which {
      AcademicList::StudentDepartments => &mut self.student_departments,
      AcademicList::StaffDepartments => &mut self.staff_departments,
      AcademicList::Batches => &mut self.batches,
    }
  }

  fn authorize(&self, caller: &Person) -> Result<()> {
    self.policy().authorize(caller, Action::ManageAcademics, Target::None)
  }

  /// Append a trimmed, non-empty, not-yet-present entry.
  pub fn add(
    &mut self,
    caller: &Person,
    which: AcademicList,
    name: &str,
  ) -> Result<()> {
    self.authorize(caller)?;
    let name = non_empty(name)?;
    let list = self.list_mut(which);
    if list.iter().any(|d| d == name) {
      return Err(Error::DuplicateId(name.to_owned()));
    }
    list.push(name.to_owned());
    Ok(())
  }

  /// Remove an entry. Removing a student department also clears its
  /// five-year flag. Existing people keep the old value.
  pub fn remove(
    &mut self,
    caller: &Person,
    which: AcademicList,
    name: &str,
  ) -> Result<()> {
    self.authorize(caller)?;
    self.list_mut(which).retain(|d| d != name);
    if which == AcademicList::StudentDepartments {
      self.five_year_programs.retain(|d| d != name);
    }
    Ok(())
  }

  /// Rename an entry in place, carrying the five-year flag across.
  pub fn rename(
    &mut self,
    caller: &Person,
    which: AcademicList,
    from: &str,
    to: &str,
  ) -> Result<()> {
    self.authorize(caller)?;
    let to = non_empty(to)?;
    let list = self.list_mut(which);
    if to != from && list.iter().any(|d| d == to) {
      return Err(Error::DuplicateId(to.to_owned()));
    }
    let slot = list.iter_mut().find(|d| d.as_str() == from).ok_or_else(|| {
      Error::InvalidValue { field: "name", reason: format!("{from:?} is not listed") }
    })?;
    *slot = to.to_owned();
    if which == AcademicList::StudentDepartments {
      for program in self.five_year_programs.iter_mut().filter(|p| p.as_str() == from) {
        *program = to.to_owned();
      }
    }
    Ok(())
  }

  /// Flip the five-year flag for a student department; returns the new flag.
  pub fn toggle_five_year(
    &mut self,
    caller: &Person,
    department: &str,
  ) -> Result<bool> {
    self.authorize(caller)?;
    if self.is_five_year(department) {
      self.five_year_programs.retain(|d| d != department);
      Ok(false)
    } else {
      self.five_year_programs.push(department.to_owned());
      Ok(true)
    }
  }
}

fn non_empty(name: &str) -> Result<&str> {
  let name = name.trim();
  if name.is_empty() {
    return Err(Error::MissingField("name"));
  }
  Ok(name)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn admin() -> Person { Person::admin("root", "Root") }

  #[test]
  fn five_year_programs_offer_fifth_year() {
    let cfg = AcademicConfig::default();
    assert_eq!(cfg.class_options("MBBS").len(), 5);
    assert_eq!(cfg.class_options("BS MLT").len(), 4);
    assert_eq!(cfg.class_options(""), vec![ClassYear::First]);
  }

  #[test]
  fn add_rejects_duplicates_and_blank() {
    let mut cfg = AcademicConfig::default();
    cfg.add(&admin(), AcademicList::Batches, " 2026-2030 ").unwrap();
    assert!(cfg.batches.iter().any(|b| b == "2026-2030"));

    let err = cfg.add(&admin(), AcademicList::Batches, "2026-2030").unwrap_err();
    assert!(matches!(err, Error::DuplicateId(_)));
    let err = cfg.add(&admin(), AcademicList::Batches, "   ").unwrap_err();
    assert!(matches!(err, Error::MissingField("name")));
  }

  #[test]
  fn removing_department_clears_five_year_flag() {
    let mut cfg = AcademicConfig::default();
    cfg.remove(&admin(), AcademicList::StudentDepartments, "DPT").unwrap();
    assert!(!cfg.is_five_year("DPT"));
  }

  #[test]
  fn rename_keeps_five_year_flag() {
    let mut cfg = AcademicConfig::default();
    cfg
      .rename(&admin(), AcademicList::StudentDepartments, "DPT", "Doctor of PT")
      .unwrap();
    assert!(cfg.is_five_year("Doctor of PT"));
    assert!(!cfg.is_five_year("DPT"));
  }

  #[test]
  fn rename_rejects_existing_name() {
    let mut cfg = AcademicConfig::default();
    let err = cfg
      .rename(&admin(), AcademicList::StudentDepartments, "DPT", "MBBS")
      .unwrap_err();
    assert!(matches!(err, Error::DuplicateId(name) if name == "MBBS"));
    assert_eq!(
      cfg.student_departments.iter().filter(|d| d.as_str() == "MBBS").count(),
      1
    );
    assert!(cfg.student_departments.iter().any(|d| d == "DPT"));
  }

  #[test]
  fn staff_cannot_edit_lists() {
    let mut cfg = AcademicConfig::default();
    let staff = Person::staff("t1", "Teacher", "Faculty");
    let err = cfg.toggle_five_year(&staff, "BS RIT").unwrap_err();
    assert!(err.is_authorization());
    assert!(!cfg.is_five_year("BS RIT"));
  }
}
