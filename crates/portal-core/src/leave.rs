//! The leave workflow.
//!
//! An application starts `Pending` and is decided exactly once, by an admin,
//! into `Approved` or `Rejected`. Decided applications are never reopened.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  person::{ClassYear, Person, Role},
  policy::{Action, Policy, Target},
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum LeaveStatus {
  Pending,
  Approved,
  Rejected,
}

impl LeaveStatus {
  pub fn is_terminal(self) -> bool { self != Self::Pending }
}

/// The decision an admin may record on a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum LeaveOutcome {
  Approved,
  Rejected,
}

impl From<LeaveOutcome> for LeaveStatus {
  fn from(outcome: LeaveOutcome) -> Self {
    match outcome {
      LeaveOutcome::Approved => Self::Approved,
      LeaveOutcome::Rejected => Self::Rejected,
    }
  }
}

// ─── Application ─────────────────────────────────────────────────────────────

/// A leave application. Applicant role, class year and department are
/// snapshots taken at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveApplication {
  pub id:               Uuid,
  pub applicant_id:     String,
  pub applicant_name:   String,
  pub applicant_role:   Role,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub class_year:       Option<ClassYear>,
  pub department:       String,
  /// Inclusive range. `date_from <= date_to` is expected but not enforced.
  pub date_from:        NaiveDate,
  pub date_to:          NaiveDate,
  pub reason:           String,
  pub status:           LeaveStatus,
  pub applied_on:       NaiveDate,
  /// Set only when rejected; may be empty.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rejection_reason: Option<String>,
}

/// Input to [`LeaveBook::submit`].
#[derive(Debug, Clone, Default)]
pub struct NewLeave {
  pub date_from: Option<NaiveDate>,
  pub date_to:   Option<NaiveDate>,
  pub reason:    String,
}

// ─── Book ────────────────────────────────────────────────────────────────────

/// All leave applications, most recently submitted first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaveBook {
  applications: Vec<LeaveApplication>,
}

impl LeaveBook {
  pub fn new(applications: Vec<LeaveApplication>) -> Self { Self { applications } }

  pub fn applications(&self) -> &[LeaveApplication] { &self.applications }

  pub fn get(&self, id: Uuid) -> Option<&LeaveApplication> {
    self.applications.iter().find(|l| l.id == id)
  }

  /// Submit an application on the caller's own behalf.
  pub fn submit(
    &mut self,
    policy: &Policy<'_>,
    caller: &Person,
    input: NewLeave,
    applied_on: NaiveDate,
  ) -> Result<&LeaveApplication> {
    policy.authorize(caller, Action::SubmitLeave, Target::Owner(&caller.id))?;
    let date_from = input.date_from.ok_or(Error::MissingField("dateFrom"))?;
    let date_to = input.date_to.ok_or(Error::MissingField("dateTo"))?;
    if input.reason.trim().is_empty() {
      return Err(Error::MissingField("reason"));
    }

    let application = LeaveApplication {
      id: Uuid::new_v4(),
      applicant_id: caller.id.clone(),
      applicant_name: caller.name.clone(),
      applicant_role: caller.role,
      class_year: caller.class_year,
      department: caller.department.clone().unwrap_or_else(|| "General".into()),
      date_from,
      date_to,
      reason: input.reason,
      status: LeaveStatus::Pending,
      applied_on,
      rejection_reason: None,
    };
    tracing::info!(id = %application.id, applicant = %caller.id, "leave submitted");
    self.applications.insert(0, application);
    Ok(&self.applications[0])
  }

  /// The applicant's own applications, newest `applied_on` first.
  pub fn list_mine(
    &self,
    policy: &Policy<'_>,
    caller: &Person,
    applicant_id: &str,
  ) -> Result<Vec<&LeaveApplication>> {
    policy.authorize(caller, Action::ViewLeaves, Target::Owner(applicant_id))?;
    let mut mine: Vec<_> = self
      .applications
      .iter()
      .filter(|l| l.applicant_id == applicant_id)
      .collect();
    mine.sort_by(|a, b| b.applied_on.cmp(&a.applied_on));
    Ok(mine)
  }

  /// The review queue, optionally restricted to one status.
  pub fn list_for_review(
    &self,
    policy: &Policy<'_>,
    caller: &Person,
    status: Option<LeaveStatus>,
  ) -> Result<Vec<&LeaveApplication>> {
    policy.authorize(caller, Action::ReviewLeaves, Target::None)?;
    Ok(
      self
        .applications
        .iter()
        .filter(|l| status.is_none_or(|s| l.status == s))
        .collect(),
    )
  }

  /// Decide a pending application.
  ///
  /// A rejection reason is stored only for `Rejected`, and may be absent or
  /// empty. Deciding an application that is no longer pending fails with
  /// [`Error::AlreadyDecided`] and leaves it untouched.
  pub fn decide(
    &mut self,
    policy: &Policy<'_>,
    caller: &Person,
    id: Uuid,
    outcome: LeaveOutcome,
    rejection_reason: Option<String>,
  ) -> Result<&LeaveApplication> {
    policy.authorize(caller, Action::DecideLeave, Target::None)?;
    let application = self
      .applications
      .iter_mut()
      .find(|l| l.id == id)
      .ok_or(Error::LeaveNotFound(id))?;
    if application.status.is_terminal() {
      return Err(Error::AlreadyDecided(id));
    }

    application.status = outcome.into();
    application.rejection_reason = match outcome {
      LeaveOutcome::Rejected => rejection_reason,
      LeaveOutcome::Approved => None,
    };
    tracing::info!(%id, %outcome, by = %caller.id, "leave decided");
    Ok(&*application)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::academic::AcademicConfig;

  fn date(s: &str) -> NaiveDate { s.parse().unwrap() }

  fn student() -> Person {
    Person::student("s1", "Sara", "DPT", ClassYear::Second, "2023-2027")
  }

  fn wedding() -> NewLeave {
    NewLeave {
      date_from: Some(date("2025-12-20")),
      date_to:   Some(date("2025-12-21")),
      reason:    "Wedding".into(),
    }
  }

  #[test]
  fn reject_then_second_decision_fails() {
    let cfg = AcademicConfig::default();
    let policy = cfg.policy();
    let admin = Person::admin("root", "Root");
    let s = student();
    let mut book = LeaveBook::default();

    let id = book.submit(&policy, &s, wedding(), date("2025-12-01")).unwrap().id;
    let mine = book.list_mine(&policy, &s, "s1").unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].status, LeaveStatus::Pending);
    assert_eq!(mine[0].class_year, Some(ClassYear::Second));

    book
      .decide(&policy, &admin, id, LeaveOutcome::Rejected, Some("Not enough notice".into()))
      .unwrap();
    let mine = book.list_mine(&policy, &s, "s1").unwrap();
    assert_eq!(mine[0].status, LeaveStatus::Rejected);
    assert_eq!(mine[0].rejection_reason.as_deref(), Some("Not enough notice"));

    let err = book
      .decide(&policy, &admin, id, LeaveOutcome::Approved, None)
      .unwrap_err();
    assert!(err.is_invalid_transition());
    assert_eq!(book.get(id).unwrap().status, LeaveStatus::Rejected);
  }

  #[test]
  fn approved_stays_approved() {
    let cfg = AcademicConfig::default();
    let policy = cfg.policy();
    let admin = Person::admin("root", "Root");
    let mut book = LeaveBook::default();
    let id = book.submit(&policy, &student(), wedding(), date("2025-12-01")).unwrap().id;

    book.decide(&policy, &admin, id, LeaveOutcome::Approved, None).unwrap();
    let err = book
      .decide(&policy, &admin, id, LeaveOutcome::Rejected, Some("late".into()))
      .unwrap_err();
    assert!(matches!(err, Error::AlreadyDecided(d) if d == id));
    assert_eq!(book.get(id).unwrap().status, LeaveStatus::Approved);
    assert_eq!(book.get(id).unwrap().rejection_reason, None);
  }

  #[test]
  fn rejection_without_reason_is_accepted() {
    let cfg = AcademicConfig::default();
    let policy = cfg.policy();
    let admin = Person::admin("root", "Root");
    let mut book = LeaveBook::default();
    let id = book.submit(&policy, &student(), wedding(), date("2025-12-01")).unwrap().id;

    let decided = book
      .decide(&policy, &admin, id, LeaveOutcome::Rejected, Some(String::new()))
      .unwrap();
    assert_eq!(decided.status, LeaveStatus::Rejected);
    assert_eq!(decided.rejection_reason.as_deref(), Some(""));
  }

  #[test]
  fn submit_requires_reason_and_dates() {
    let cfg = AcademicConfig::default();
    let policy = cfg.policy();
    let mut book = LeaveBook::default();
    let today = date("2025-12-01");

    let blank = NewLeave { reason: "  ".into(), ..wedding() };
    assert!(matches!(
      book.submit(&policy, &student(), blank, today),
      Err(Error::MissingField("reason"))
    ));
    let open_ended = NewLeave { date_to: None, ..wedding() };
    assert!(matches!(
      book.submit(&policy, &student(), open_ended, today),
      Err(Error::MissingField("dateTo"))
    ));
    assert!(book.applications().is_empty());
  }

  #[test]
  fn staff_cannot_review_or_decide() {
    let cfg = AcademicConfig::default();
    let policy = cfg.policy();
    let teacher = Person::staff("t1", "Teacher", "Faculty");
    let mut book = LeaveBook::default();
    let id = book.submit(&policy, &student(), wedding(), date("2025-12-01")).unwrap().id;

    assert!(book.list_for_review(&policy, &teacher, None).unwrap_err().is_authorization());
    let err = book
      .decide(&policy, &teacher, id, LeaveOutcome::Approved, None)
      .unwrap_err();
    assert!(err.is_authorization());
    assert_eq!(book.get(id).unwrap().status, LeaveStatus::Pending);
  }

  #[test]
  fn list_mine_sorted_and_private() {
    let cfg = AcademicConfig::default();
    let policy = cfg.policy();
    let s = student();
    let mut book = LeaveBook::default();
    book.submit(&policy, &s, wedding(), date("2025-11-01")).unwrap();
    book.submit(&policy, &s, wedding(), date("2025-12-05")).unwrap();
    book.submit(&policy, &s, wedding(), date("2025-11-20")).unwrap();

    let applied: Vec<_> = book
      .list_mine(&policy, &s, "s1")
      .unwrap()
      .iter()
      .map(|l| l.applied_on)
      .collect();
    assert_eq!(applied, [date("2025-12-05"), date("2025-11-20"), date("2025-11-01")]);

    let other = Person::student("s2", "Omar", "DPT", ClassYear::First, "2023-2027");
    assert!(book.list_mine(&policy, &other, "s1").is_err());
  }

  #[test]
  fn review_filter_by_status() {
    let cfg = AcademicConfig::default();
    let policy = cfg.policy();
    let admin = Person::admin("root", "Root");
    let mut book = LeaveBook::default();
    let first = book.submit(&policy, &student(), wedding(), date("2025-12-01")).unwrap().id;
    book.submit(&policy, &student(), wedding(), date("2025-12-02")).unwrap();
    book.decide(&policy, &admin, first, LeaveOutcome::Approved, None).unwrap();

    let pending = book.list_for_review(&policy, &admin, Some(LeaveStatus::Pending)).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(book.list_for_review(&policy, &admin, None).unwrap().len(), 2);
  }
}
