//! Role policy. The single place that decides who may do what to whom.
//!
//! Every mutating operation in this crate calls [`Policy::authorize`] before
//! touching its collection. The check is advisory: there are no sessions or
//! credentials behind the caller, so it only keeps an honest client honest.

use strum::Display;

use crate::{
  Error, Result,
  person::{Person, Role},
};

/// Something a caller wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Action {
  #[strum(to_string = "view attendance")]
  ViewAttendance,
  #[strum(to_string = "mark attendance status")]
  MarkStatus,
  #[strum(to_string = "mark arrival time")]
  MarkArrival,
  #[strum(to_string = "export attendance")]
  ExportAttendance,
  #[strum(to_string = "submit a leave application")]
  SubmitLeave,
  #[strum(to_string = "view leave applications")]
  ViewLeaves,
  #[strum(to_string = "review leave applications")]
  ReviewLeaves,
  #[strum(to_string = "decide a leave application")]
  DecideLeave,
  #[strum(to_string = "manage users")]
  ManageUsers,
  #[strum(to_string = "update a profile")]
  UpdateProfile,
  #[strum(to_string = "manage academic lists")]
  ManageAcademics,
  #[strum(to_string = "publish announcements")]
  PublishAnnouncement,
  #[strum(to_string = "file a complaint")]
  FileComplaint,
  #[strum(to_string = "view complaints")]
  ViewComplaints,
  #[strum(to_string = "update complaint status")]
  UpdateComplaint,
  #[strum(to_string = "manage the timetable")]
  ManageTimetable,
  #[strum(to_string = "record class tests")]
  RecordProgress,
  #[strum(to_string = "view progress reports")]
  ViewProgress,
  #[strum(to_string = "view the timetable and notice board")]
  ViewBoard,
}

/// What the action is aimed at.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
  /// A collection as a whole (a sheet, the review queue, a config list).
  None,
  /// A specific directory entry.
  Person(&'a Person),
  /// A record owned by the person with this identifier.
  Owner(&'a str),
}

impl Target<'_> {
  fn owner_id(&self) -> Option<&str> {
    match self {
      Target::None => None,
      Target::Person(p) => Some(p.id.as_str()),
      Target::Owner(id) => Some(*id),
    }
  }

  fn is_student(&self) -> bool {
    matches!(self, Target::Person(p) if p.is_student())
  }
}

/// Policy evaluated against the current teaching-department flags.
#[derive(Debug, Clone, Copy)]
pub struct Policy<'a> {
  teaching_departments: &'a [String],
}

impl<'a> Policy<'a> {
  pub fn new(teaching_departments: &'a [String]) -> Self {
    Self { teaching_departments }
  }

  /// Staff whose department is flagged as teaching, or any admin.
  pub fn is_teaching(&self, person: &Person) -> bool {
    match person.role {
      Role::Admin => true,
      Role::Staff => person.department.as_deref().is_some_and(|d| {
        self.teaching_departments.iter().any(|t| t == d)
      }),
      Role::Student => false,
    }
  }

  /// Evaluate `(caller, action, target)` to allow (`true`) or deny.
  pub fn permits(&self, caller: &Person, action: Action, target: Target<'_>) -> bool {
    if caller.is_suspended {
      return false;
    }
    if caller.role == Role::Admin {
      return true;
    }
    let is_self = target.owner_id() == Some(caller.id.as_str());

    match action {
      Action::MarkStatus | Action::RecordProgress => {
        self.is_teaching(caller) && target.is_student()
      }
      Action::ViewAttendance => is_self || caller.role == Role::Staff,
      Action::ExportAttendance => self.is_teaching(caller),
      Action::ViewProgress => is_self || self.is_teaching(caller),
      Action::MarkArrival
      | Action::SubmitLeave
      | Action::ViewLeaves
      | Action::UpdateProfile
      | Action::ViewComplaints => is_self,
      Action::FileComplaint | Action::ViewBoard => true,
      Action::ReviewLeaves
      | Action::DecideLeave
      | Action::ManageUsers
      | Action::ManageAcademics
      | Action::PublishAnnouncement
      | Action::UpdateComplaint
      | Action::ManageTimetable => false,
    }
  }

  /// [`Policy::permits`], turned into an [`Error::Unauthorized`] on denial.
  pub fn authorize(
    &self,
    caller: &Person,
    action: Action,
    target: Target<'_>,
  ) -> Result<()> {
    if self.permits(caller, action, target) {
      Ok(())
    } else {
      tracing::debug!(caller = %caller.id, %action, "denied");
      Err(Error::Unauthorized { caller: caller.id.clone(), action })
    }
  }
}
