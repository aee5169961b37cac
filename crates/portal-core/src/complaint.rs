//! Complaints filed by anyone in the directory and worked through by admins.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  enrich::{ComplaintAnalysis, Priority},
  person::Person,
  policy::{Action, Policy, Target},
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum ComplaintStatus {
  #[default]
  Pending,
  #[serde(rename = "In Progress")]
  #[strum(to_string = "In Progress", serialize = "in-progress")]
  InProgress,
  Resolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
  pub id:          Uuid,
  pub subject:     String,
  pub description: String,
  pub status:      ComplaintStatus,
  pub date:        NaiveDate,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub priority:    Option<Priority>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub category:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub summary:     Option<String>,
  pub author_name: String,
  pub author_id:   String,
}

/// Input to [`ComplaintBook::file`].
#[derive(Debug, Clone, Default)]
pub struct NewComplaint {
  pub subject:     String,
  pub description: String,
}

/// All complaints, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComplaintBook {
  complaints: Vec<Complaint>,
}

impl ComplaintBook {
  pub fn new(complaints: Vec<Complaint>) -> Self { Self { complaints } }

  pub fn complaints(&self) -> &[Complaint] { &self.complaints }

  pub fn count_with_status(&self, status: ComplaintStatus) -> usize {
    self.complaints.iter().filter(|c| c.status == status).count()
  }

  /// Check a complaint before it is classified, so that nothing is sent for
  /// enrichment on behalf of a caller who could not file it anyway.
  pub fn validate(
    policy: &Policy<'_>,
    caller: &Person,
    input: &NewComplaint,
  ) -> Result<()> {
    policy.authorize(caller, Action::FileComplaint, Target::None)?;
    if input.subject.trim().is_empty() {
      return Err(Error::MissingField("subject"));
    }
    if input.description.trim().is_empty() {
      return Err(Error::MissingField("description"));
    }
    Ok(())
  }

  /// File a complaint with an already computed classification.
  pub fn file(
    &mut self,
    policy: &Policy<'_>,
    caller: &Person,
    input: NewComplaint,
    analysis: ComplaintAnalysis,
    date: NaiveDate,
  ) -> Result<&Complaint> {
    Self::validate(policy, caller, &input)?;
    let complaint = Complaint {
      id: Uuid::new_v4(),
      subject: input.subject,
      description: input.description,
      status: ComplaintStatus::Pending,
      date,
      priority: Some(analysis.priority),
      category: Some(analysis.category),
      summary: Some(analysis.summary),
      author_name: caller.name.clone(),
      author_id: caller.id.clone(),
    };
    tracing::info!(id = %complaint.id, author = %caller.id, priority = %analysis.priority, "complaint filed");
    self.complaints.insert(0, complaint);
    Ok(&self.complaints[0])
  }

  pub fn set_status(
    &mut self,
    policy: &Policy<'_>,
    caller: &Person,
    id: Uuid,
    status: ComplaintStatus,
  ) -> Result<&Complaint> {
    policy.authorize(caller, Action::UpdateComplaint, Target::None)?;
    let complaint = self
      .complaints
      .iter_mut()
      .find(|c| c.id == id)
      .ok_or(Error::NotFound { kind: "complaint", id })?;
    complaint.status = status;
    tracing::info!(%id, %status, by = %caller.id, "complaint status changed");
    Ok(&*complaint)
  }

  /// Admins see every complaint; everyone else sees only their own.
  pub fn list_visible(
    &self,
    policy: &Policy<'_>,
    caller: &Person,
  ) -> Result<Vec<&Complaint>> {
    policy.authorize(caller, Action::ViewComplaints, Target::Owner(&caller.id))?;
    let mut visible: Vec<_> = self
      .complaints
      .iter()
      .filter(|c| caller.is_admin() || c.author_id == caller.id)
      .collect();
    visible.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(visible)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{academic::AcademicConfig, person::ClassYear};

  fn date(s: &str) -> NaiveDate { s.parse().unwrap() }

  fn input(subject: &str) -> NewComplaint {
    NewComplaint { subject: subject.into(), description: "The fan is broken".into() }
  }

  #[test]
  fn students_see_only_their_own() {
    let cfg = AcademicConfig::default();
    let root = Person::admin("root", "Root");
    let sara = Person::student("s1", "Sara", "DPT", ClassYear::First, "2023-2027");
    let omar = Person::student("s2", "Omar", "DPT", ClassYear::First, "2023-2027");
    let mut book = ComplaintBook::default();

    book
      .file(&cfg.policy(), &sara, input("Fan"), ComplaintAnalysis::fallback(), date("2025-03-10"))
      .unwrap();
    book
      .file(&cfg.policy(), &omar, input("Door"), ComplaintAnalysis::fallback(), date("2025-03-11"))
      .unwrap();

    let mine = book.list_visible(&cfg.policy(), &sara).unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].subject, "Fan");

    let all = book.list_visible(&cfg.policy(), &root).unwrap();
    assert_eq!(all.iter().map(|c| c.subject.as_str()).collect::<Vec<_>>(), ["Door", "Fan"]);
  }

  #[test]
  fn fallback_classification_is_stored() {
    let cfg = AcademicConfig::default();
    let sara = Person::student("s1", "Sara", "DPT", ClassYear::First, "2023-2027");
    let mut book = ComplaintBook::default();
    let c = book
      .file(&cfg.policy(), &sara, input("Fan"), ComplaintAnalysis::fallback(), date("2025-03-10"))
      .unwrap();
    assert_eq!(c.priority, Some(Priority::Medium));
    assert_eq!(c.category.as_deref(), Some("General"));
    assert_eq!(c.status, ComplaintStatus::Pending);
  }

  #[test]
  fn only_admin_changes_status() {
    let cfg = AcademicConfig::default();
    let root = Person::admin("root", "Root");
    let sara = Person::student("s1", "Sara", "DPT", ClassYear::First, "2023-2027");
    let mut book = ComplaintBook::default();
    let id = book
      .file(&cfg.policy(), &sara, input("Fan"), ComplaintAnalysis::fallback(), date("2025-03-10"))
      .unwrap()
      .id;

    let err = book
      .set_status(&cfg.policy(), &sara, id, ComplaintStatus::Resolved)
      .unwrap_err();
    assert!(err.is_authorization());

    book
      .set_status(&cfg.policy(), &root, id, ComplaintStatus::InProgress)
      .unwrap();
    assert_eq!(book.count_with_status(ComplaintStatus::InProgress), 1);
  }

  #[test]
  fn subject_is_required() {
    let cfg = AcademicConfig::default();
    let sara = Person::student("s1", "Sara", "DPT", ClassYear::First, "2023-2027");
    let err = ComplaintBook::validate(&cfg.policy(), &sara, &input("  ")).unwrap_err();
    assert!(matches!(err, Error::MissingField("subject")));
  }

  #[test]
  fn status_text_uses_display_names() {
    assert_eq!(ComplaintStatus::InProgress.to_string(), "In Progress");
    assert_eq!(
      serde_json::to_string(&ComplaintStatus::InProgress).unwrap(),
      "\"In Progress\""
    );
    assert_eq!("resolved".parse::<ComplaintStatus>().unwrap(), ComplaintStatus::Resolved);
  }
}
