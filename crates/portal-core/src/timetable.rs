//! The weekly class timetable.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  person::{ClassYear, Person},
  policy::{Action, Policy, Target},
};

/// Day names as stored on slots, Monday first.
pub const WEEKDAYS: [&str; 7] = [
  "Monday",
  "Tuesday",
  "Wednesday",
  "Thursday",
  "Friday",
  "Saturday",
  "Sunday",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableSlot {
  pub id:         Uuid,
  pub day:        String,
  /// "HH:MM - HH:MM".
  pub time:       String,
  pub subject:    String,
  pub instructor: String,
  pub room:       String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub class_year: Option<ClassYear>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub batch:      Option<String>,
  /// The student department the class belongs to.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub program:    Option<String>,
}

/// Input to [`Timetable::add`].
#[derive(Debug, Clone, Default)]
pub struct NewSlot {
  pub day:        String,
  pub start:      String,
  pub end:        String,
  pub subject:    String,
  pub instructor: String,
  pub room:       String,
  pub class_year: Option<ClassYear>,
  pub batch:      Option<String>,
  pub program:    Option<String>,
}

fn canonical_day(day: &str) -> Result<&'static str> {
  let day = day.trim();
  WEEKDAYS
    .iter()
    .find(|d| d.eq_ignore_ascii_case(day))
    .copied()
    .ok_or_else(|| Error::InvalidValue {
      field:  "day",
      reason: format!("{day:?} is not a day of the week"),
    })
}

fn parse_hhmm(field: &'static str, s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|_| Error::InvalidValue {
    field,
    reason: format!("expected HH:MM, got {s:?}"),
  })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timetable {
  slots: Vec<TimetableSlot>,
}

impl Timetable {
  pub fn new(slots: Vec<TimetableSlot>) -> Self { Self { slots } }

  pub fn slots(&self) -> &[TimetableSlot] { &self.slots }

  pub fn add(
    &mut self,
    policy: &Policy<'_>,
    caller: &Person,
    input: NewSlot,
  ) -> Result<&TimetableSlot> {
    policy.authorize(caller, Action::ManageTimetable, Target::None)?;
    let day = canonical_day(&input.day)?;
    let start = parse_hhmm("start", &input.start)?;
    let end = parse_hhmm("end", &input.end)?;
    if end <= start {
      return Err(Error::InvalidValue {
        field:  "end",
        reason: "must be after the start time".into(),
      });
    }
    if input.subject.trim().is_empty() {
      return Err(Error::MissingField("subject"));
    }

    let slot = TimetableSlot {
      id: Uuid::new_v4(),
      day: day.to_owned(),
      time: format!("{} - {}", start.format("%H:%M"), end.format("%H:%M")),
      subject: input.subject,
      instructor: input.instructor,
      room: input.room,
      class_year: input.class_year,
      batch: input.batch,
      program: input.program,
    };
    tracing::info!(id = %slot.id, day, subject = %slot.subject, "timetable slot added");
    self.slots.push(slot);
    Ok(&self.slots[self.slots.len() - 1])
  }

  pub fn remove(
    &mut self,
    policy: &Policy<'_>,
    caller: &Person,
    id: Uuid,
  ) -> Result<TimetableSlot> {
    policy.authorize(caller, Action::ManageTimetable, Target::None)?;
    let index = self
      .slots
      .iter()
      .position(|s| s.id == id)
      .ok_or(Error::NotFound { kind: "timetable slot", id })?;
    tracing::info!(%id, "timetable slot removed");
    Ok(self.slots.remove(index))
  }

  /// Slots for one class. `batch` and `day` narrow further when given.
  pub fn for_class(
    &self,
    program: &str,
    class_year: ClassYear,
    batch: Option<&str>,
    day: Option<&str>,
  ) -> Vec<&TimetableSlot> {
    self
      .slots
      .iter()
      .filter(|s| {
        s.program.as_deref() == Some(program)
          && s.class_year == Some(class_year)
          && batch.is_none_or(|b| s.batch.as_deref() == Some(b))
          && day.is_none_or(|d| s.day.eq_ignore_ascii_case(d))
      })
      .collect()
  }

  /// The caller's schedule for `weekday`. Students see only slots for their
  /// own program and class year; everyone else sees the whole day.
  pub fn today<'a>(&'a self, caller: &Person, weekday: &str) -> Vec<&'a TimetableSlot> {
    self
      .slots
      .iter()
      .filter(|s| s.day.eq_ignore_ascii_case(weekday))
      .filter(|s| {
        !caller.is_student()
          || (s.program.is_some() && s.program == caller.department
            && s.class_year.is_some()
            && s.class_year == caller.class_year)
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::academic::AcademicConfig;

  fn slot(day: &str, program: &str, class_year: ClassYear, subject: &str) -> NewSlot {
    NewSlot {
      day: day.into(),
      start: "09:00".into(),
      end: "10:00".into(),
      subject: subject.into(),
      instructor: "Dr. Ahmed".into(),
      room: "R1".into(),
      class_year: Some(class_year),
      batch: Some("2023-2027".into()),
      program: Some(program.into()),
    }
  }

  fn populated() -> Timetable {
    let cfg = AcademicConfig::default();
    let root = Person::admin("root", "Root");
    let mut tt = Timetable::default();
    for s in [
      slot("monday", "DPT", ClassYear::First, "Anatomy"),
      slot("Monday", "DPT", ClassYear::Second, "Kinesiology"),
      slot("Monday", "BSCS", ClassYear::First, "Programming"),
      slot("Tuesday", "DPT", ClassYear::First, "Physiology"),
    ] {
      tt.add(&cfg.policy(), &root, s).unwrap();
    }
    tt
  }

  #[test]
  fn add_normalises_day_and_time() {
    let tt = populated();
    assert_eq!(tt.slots()[0].day, "Monday");
    assert_eq!(tt.slots()[0].time, "09:00 - 10:00");
  }

  #[test]
  fn student_sees_only_own_class_today() {
    let tt = populated();
    let sara = Person::student("s1", "Sara", "DPT", ClassYear::First, "2023-2027");
    let subjects: Vec<_> = tt.today(&sara, "Monday").iter().map(|s| s.subject.as_str()).collect();
    assert_eq!(subjects, ["Anatomy"]);

    let teacher = Person::staff("t1", "Teacher", "Faculty");
    assert_eq!(tt.today(&teacher, "Monday").len(), 3);
  }

  #[test]
  fn for_class_filters_by_day() {
    let tt = populated();
    assert_eq!(tt.for_class("DPT", ClassYear::First, None, None).len(), 2);
    assert_eq!(
      tt.for_class("DPT", ClassYear::First, Some("2023-2027"), Some("Tuesday"))[0].subject,
      "Physiology"
    );
  }

  #[test]
  fn rejects_bad_input() {
    let cfg = AcademicConfig::default();
    let root = Person::admin("root", "Root");
    let mut tt = Timetable::default();

    let mut bad_day = slot("Funday", "DPT", ClassYear::First, "X");
    assert!(tt.add(&cfg.policy(), &root, bad_day.clone()).is_err());
    bad_day.day = "Friday".into();
    bad_day.end = "08:00".into();
    assert!(matches!(
      tt.add(&cfg.policy(), &root, bad_day),
      Err(Error::InvalidValue { field: "end", .. })
    ));

    let teacher = Person::staff("t1", "Teacher", "Faculty");
    let err = tt
      .add(&cfg.policy(), &teacher, slot("Friday", "DPT", ClassYear::First, "X"))
      .unwrap_err();
    assert!(err.is_authorization());
  }
}
