//! Class test results and the per-student progress report.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  directory::Directory,
  person::{ClassYear, Person},
  policy::{Action, Policy, Target},
};

/// One test result. Student name, class year, batch and department are
/// copied from the directory when the result is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassTest {
  pub id:             Uuid,
  pub student_id:     String,
  pub student_name:   String,
  pub subject:        String,
  pub title:          String,
  pub total_marks:    u32,
  pub obtained_marks: u32,
  pub date:           NaiveDate,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub class_year:     Option<ClassYear>,
  #[serde(default)]
  pub batch:          String,
  #[serde(default)]
  pub department:     String,
  pub instructor_id:  String,
}

impl ClassTest {
  pub fn percent(&self) -> f64 {
    f64::from(self.obtained_marks) / f64::from(self.total_marks) * 100.0
  }

  /// The student as they were when the result was recorded.
  fn student(&self) -> Person {
    Person {
      class_year: self.class_year,
      ..Person::student(
        self.student_id.clone(),
        self.student_name.clone(),
        self.department.clone(),
        ClassYear::First,
        self.batch.clone(),
      )
    }
  }
}

/// Input to [`Gradebook::record`].
#[derive(Debug, Clone)]
pub struct NewClassTest {
  pub student_id:     String,
  pub subject:        String,
  pub title:          String,
  pub total_marks:    u32,
  pub obtained_marks: u32,
  pub date:           NaiveDate,
}

/// Rounded mean percentage over `tests`; 0 when there are none.
pub fn average_percent<'a>(tests: impl IntoIterator<Item = &'a ClassTest>) -> u32 {
  let (sum, count) = tests
    .into_iter()
    .filter(|t| t.total_marks > 0)
    .fold((0.0, 0u32), |(sum, n), t| (sum + t.percent(), n + 1));
  if count == 0 {
    return 0;
  }
  (sum / f64::from(count)).round() as u32
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gradebook {
  tests: Vec<ClassTest>,
}

impl Gradebook {
  pub fn new(tests: Vec<ClassTest>) -> Self { Self { tests } }

  pub fn tests(&self) -> &[ClassTest] { &self.tests }

  /// Record a result for a student. Admins and teaching staff only.
  pub fn record(
    &mut self,
    policy: &Policy<'_>,
    caller: &Person,
    directory: &Directory,
    input: NewClassTest,
  ) -> Result<&ClassTest> {
    let student = directory.require(&input.student_id)?;
    policy.authorize(caller, Action::RecordProgress, Target::Person(student))?;
    if input.total_marks == 0 {
      return Err(Error::InvalidValue {
        field:  "totalMarks",
        reason: "must be greater than zero".into(),
      });
    }
    if input.obtained_marks > input.total_marks {
      return Err(Error::InvalidValue {
        field:  "obtainedMarks",
        reason: format!("exceeds total of {}", input.total_marks),
      });
    }
    if input.title.trim().is_empty() {
      return Err(Error::MissingField("title"));
    }

    let test = ClassTest {
      id: Uuid::new_v4(),
      student_id: student.id.clone(),
      student_name: student.name.clone(),
      subject: input.subject,
      title: input.title,
      total_marks: input.total_marks,
      obtained_marks: input.obtained_marks,
      date: input.date,
      class_year: student.class_year,
      batch: student.batch.clone().unwrap_or_default(),
      department: student.department.clone().unwrap_or_default(),
      instructor_id: caller.id.clone(),
    };
    tracing::info!(id = %test.id, student = %test.student_id, by = %caller.id, "class test recorded");
    self.tests.insert(0, test);
    Ok(&self.tests[0])
  }

  /// Delete a result. Same authority as recording one.
  pub fn remove(
    &mut self,
    policy: &Policy<'_>,
    caller: &Person,
    id: Uuid,
  ) -> Result<ClassTest> {
    let index = self
      .tests
      .iter()
      .position(|t| t.id == id)
      .ok_or(Error::NotFound { kind: "class test", id })?;
    let student = self.tests[index].student();
    policy.authorize(caller, Action::RecordProgress, Target::Person(&student))?;
    tracing::info!(%id, by = %caller.id, "class test removed");
    Ok(self.tests.remove(index))
  }

  /// A student's results, newest first. Students may only read their own.
  pub fn for_student(
    &self,
    policy: &Policy<'_>,
    caller: &Person,
    student_id: &str,
  ) -> Result<Vec<&ClassTest>> {
    policy.authorize(caller, Action::ViewProgress, Target::Owner(student_id))?;
    let mut tests: Vec<_> =
      self.tests.iter().filter(|t| t.student_id == student_id).collect();
    tests.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(tests)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::academic::AcademicConfig;

  fn date(s: &str) -> NaiveDate { s.parse().unwrap() }

  fn roster() -> Directory {
    Directory::new(vec![
      Person::admin("root", "Root"),
      Person::staff("t1", "Teacher", "Faculty"),
      Person::staff("g1", "Guard", "Security"),
      Person::student("s1", "Sara", "DPT", ClassYear::First, "2023-2027"),
      Person::student("s2", "Omar", "DPT", ClassYear::First, "2023-2027"),
    ])
  }

  fn test_for(student: &str, obtained: u32, total: u32, on: &str) -> NewClassTest {
    NewClassTest {
      student_id: student.into(),
      subject: "Anatomy".into(),
      title: "Weekly Test".into(),
      total_marks: total,
      obtained_marks: obtained,
      date: date(on),
    }
  }

  #[test]
  fn average_is_rounded_mean() {
    let cfg = AcademicConfig::default();
    let dir = roster();
    let teacher = dir.require("t1").unwrap();
    let mut book = Gradebook::default();
    book.record(&cfg.policy(), teacher, &dir, test_for("s1", 40, 50, "2025-03-01")).unwrap();
    book.record(&cfg.policy(), teacher, &dir, test_for("s1", 7, 10, "2025-03-08")).unwrap();
    book.record(&cfg.policy(), teacher, &dir, test_for("s1", 2, 3, "2025-03-04")).unwrap();

    let sara = dir.require("s1").unwrap();
    let mine = book.for_student(&cfg.policy(), sara, "s1").unwrap();
    // (80 + 70 + 66.67) / 3 = 72.2
    assert_eq!(average_percent(mine.iter().copied()), 72);
    let dates: Vec<_> = mine.iter().map(|t| t.date).collect();
    assert_eq!(dates, [date("2025-03-08"), date("2025-03-04"), date("2025-03-01")]);
    assert_eq!(mine[0].instructor_id, "t1");
    assert_eq!(mine[0].batch, "2023-2027");
  }

  #[test]
  fn average_of_nothing_is_zero() {
    assert_eq!(average_percent(Vec::<&ClassTest>::new()), 0);
  }

  #[test]
  fn zero_total_is_rejected() {
    let cfg = AcademicConfig::default();
    let dir = roster();
    let root = dir.require("root").unwrap();
    let mut book = Gradebook::default();
    let err = book
      .record(&cfg.policy(), root, &dir, test_for("s1", 0, 0, "2025-03-01"))
      .unwrap_err();
    assert!(matches!(err, Error::InvalidValue { field: "totalMarks", .. }));
  }

  #[test]
  fn only_teaching_staff_record_and_only_for_students() {
    let cfg = AcademicConfig::default();
    let dir = roster();
    let guard = dir.require("g1").unwrap();
    let teacher = dir.require("t1").unwrap();
    let mut book = Gradebook::default();

    assert!(
      book
        .record(&cfg.policy(), guard, &dir, test_for("s1", 1, 2, "2025-03-01"))
        .unwrap_err()
        .is_authorization()
    );
    assert!(
      book
        .record(&cfg.policy(), teacher, &dir, test_for("g1", 1, 2, "2025-03-01"))
        .unwrap_err()
        .is_authorization()
    );
    assert!(book.tests().is_empty());
  }

  #[test]
  fn students_cannot_read_others() {
    let cfg = AcademicConfig::default();
    let dir = roster();
    let omar = dir.require("s2").unwrap();
    let book = Gradebook::default();
    assert!(book.for_student(&cfg.policy(), omar, "s1").unwrap_err().is_authorization());
  }

  #[test]
  fn remove_uses_recording_authority() {
    let cfg = AcademicConfig::default();
    let dir = roster();
    let teacher = dir.require("t1").unwrap();
    let sara = dir.require("s1").unwrap();
    let mut book = Gradebook::default();
    let id = book
      .record(&cfg.policy(), teacher, &dir, test_for("s1", 1, 2, "2025-03-01"))
      .unwrap()
      .id;

    assert!(book.remove(&cfg.policy(), sara, id).unwrap_err().is_authorization());
    book.remove(&cfg.policy(), teacher, id).unwrap();
    assert!(book.tests().is_empty());
  }
}
