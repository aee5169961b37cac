//! Person, an entry in the directory.
//!
//! Identity and role live here and nowhere else. Attendance records, leave
//! applications and class tests copy the attributes they need at write time
//! and never write back.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ─── Role ────────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Role {
  Admin,
  Staff,
  Student,
}

// ─── Class year ──────────────────────────────────────────────────────────────

/// A student's year of study. `Fifth` exists only for departments flagged as
/// five-year programs.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
pub enum ClassYear {
  #[serde(rename = "1st Year")]
  #[strum(to_string = "1st Year", serialize = "1")]
  First,
  #[serde(rename = "2nd Year")]
  #[strum(to_string = "2nd Year", serialize = "2")]
  Second,
  #[serde(rename = "3rd Year")]
  #[strum(to_string = "3rd Year", serialize = "3")]
  Third,
  #[serde(rename = "4th Year")]
  #[strum(to_string = "4th Year", serialize = "4")]
  Fourth,
  #[serde(rename = "5th Year")]
  #[strum(to_string = "5th Year", serialize = "5")]
  Fifth,
}

impl ClassYear {
  /// The four years every program has, in order.
  pub const STANDARD: [ClassYear; 4] =
    [Self::First, Self::Second, Self::Third, Self::Fourth];
}

// ─── Person ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
  /// Globally unique; never changes after registration.
  pub id:           String,
  pub name:         String,
  pub role:         Role,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub department:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:        Option<String>,
  /// Students only.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub class_year:   Option<ClassYear>,
  /// Cohort label, e.g. "2023-2027". Students only.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub batch:        Option<String>,
  #[serde(default)]
  pub is_suspended: bool,
}

impl Person {
  pub fn admin(id: impl Into<String>, name: impl Into<String>) -> Self {
    Self::new(id, name, Role::Admin, Some("Administration".into()))
  }

  pub fn staff(
    id: impl Into<String>,
    name: impl Into<String>,
    department: impl Into<String>,
  ) -> Self {
    Self::new(id, name, Role::Staff, Some(department.into()))
  }

  pub fn student(
    id: impl Into<String>,
    name: impl Into<String>,
    department: impl Into<String>,
    class_year: ClassYear,
    batch: impl Into<String>,
  ) -> Self {
    Self {
      class_year: Some(class_year),
      batch: Some(batch.into()),
      ..Self::new(id, name, Role::Student, Some(department.into()))
    }
  }

  fn new(
    id: impl Into<String>,
    name: impl Into<String>,
    role: Role,
    department: Option<String>,
  ) -> Self {
    Self {
      id: id.into(),
      name: name.into(),
      role,
      department,
      email: None,
      class_year: None,
      batch: None,
      is_suspended: false,
    }
  }

  pub fn is_admin(&self) -> bool { self.role == Role::Admin }

  pub fn is_student(&self) -> bool { self.role == Role::Student }
}
