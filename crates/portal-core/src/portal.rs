//! [`Portal`], one loaded session over a [`PortalStore`].
//!
//! Every collection is read once in [`Portal::load`]. Each mutating method
//! looks the caller up in the directory, lets the collection apply its own
//! policy checks, and then writes that whole collection back to its slot.
//! When the write fails the in-memory change is kept and the error returned.

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::{
  Error, Result,
  academic::{AcademicConfig, AcademicList},
  announcement::{Announcement, Board, NewAnnouncement},
  attendance::{AttendanceRecord, AttendanceStatus, DayEntry, Ledger},
  clock::Clock,
  complaint::{Complaint, ComplaintBook, ComplaintStatus, NewComplaint},
  directory::{Directory, ProfileUpdate, Scope},
  enrich::Enricher,
  leave::{LeaveApplication, LeaveBook, LeaveOutcome, LeaveStatus, NewLeave},
  person::{ClassYear, Person, Role},
  policy::{Action, Target},
  progress::{self, ClassTest, Gradebook, NewClassTest},
  report::{self, AttendanceMatrix},
  store::{PortalStore, Slot, load_slot, save_slot},
  timetable::{NewSlot, Timetable, TimetableSlot},
};

/// A rendered attendance export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceExport {
  pub file_name: String,
  pub csv:       String,
  pub matrix:    AttendanceMatrix,
}

/// A student's class tests and their average.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressReport {
  pub student_id:      String,
  pub tests:           Vec<ClassTest>,
  pub average_percent: u32,
}

/// Head counts shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
  pub students:           usize,
  pub staff:              usize,
  pub announcements:      usize,
  pub pending_complaints: usize,
}

pub struct Portal<S> {
  store:      S,
  clock:      Clock,
  directory:  Directory,
  academic:   AcademicConfig,
  ledger:     Ledger,
  leaves:     LeaveBook,
  board:      Board,
  complaints: ComplaintBook,
  timetable:  Timetable,
  gradebook:  Gradebook,
}

impl<S: PortalStore> Portal<S> {
  /// Load every slot. Missing or undecodable slots start from their
  /// defaults: a directory holding only the seed administrator, the stock
  /// academic lists, and empty collections for everything else.
  pub async fn load(store: S, clock: Clock) -> Self {
    let directory = load_slot(&store, Slot::Users, Directory::seeded).await;
    let academic = load_slot(&store, Slot::Academic, AcademicConfig::default).await;
    let ledger = load_slot(&store, Slot::Attendance, Ledger::default).await;
    let leaves = load_slot(&store, Slot::Leaves, LeaveBook::default).await;
    let board = load_slot(&store, Slot::Announcements, Board::default).await;
    let complaints = load_slot(&store, Slot::Complaints, ComplaintBook::default).await;
    let timetable = load_slot(&store, Slot::Timetable, Timetable::default).await;
    let gradebook = load_slot(&store, Slot::ClassTests, Gradebook::default).await;

    tracing::info!(
      people = directory.people().len(),
      attendance = ledger.records().len(),
      leaves = leaves.applications().len(),
      "portal loaded"
    );

    Self {
      store,
      clock,
      directory,
      academic,
      ledger,
      leaves,
      board,
      complaints,
      timetable,
      gradebook,
    }
  }

  pub fn store(&self) -> &S { &self.store }
  pub fn clock(&self) -> &Clock { &self.clock }
  pub fn directory(&self) -> &Directory { &self.directory }
  pub fn academic(&self) -> &AcademicConfig { &self.academic }
  pub fn ledger(&self) -> &Ledger { &self.ledger }
  pub fn leaves(&self) -> &LeaveBook { &self.leaves }
  pub fn timetable(&self) -> &Timetable { &self.timetable }

  fn caller(&self, id: &str) -> Result<Person> {
    self.directory.require(id).cloned()
  }

  async fn save(&self, slot: Slot) -> Result<()> {
    match slot {
      Slot::Users => save_slot(&self.store, slot, &self.directory).await,
      Slot::Attendance => save_slot(&self.store, slot, &self.ledger).await,
      Slot::Leaves => save_slot(&self.store, slot, &self.leaves).await,
      Slot::Announcements => save_slot(&self.store, slot, &self.board).await,
      Slot::Complaints => save_slot(&self.store, slot, &self.complaints).await,
      Slot::Timetable => save_slot(&self.store, slot, &self.timetable).await,
      Slot::ClassTests => save_slot(&self.store, slot, &self.gradebook).await,
      Slot::Academic => save_slot(&self.store, slot, &self.academic).await,
    }
  }

  pub fn summary(&self, caller_id: &str) -> Result<Summary> {
    self.authorize_board(caller_id)?;
    Ok(Summary {
      students:           self.directory.count_by_role(Role::Student),
      staff:              self.directory.count_by_role(Role::Staff),
      announcements:      self.board.announcements().len(),
      pending_complaints: self.complaints.count_with_status(ComplaintStatus::Pending),
    })
  }

  fn authorize_board(&self, caller_id: &str) -> Result<&Person> {
    let caller = self.directory.require(caller_id)?;
    self
      .academic
      .policy()
      .authorize(caller, Action::ViewBoard, Target::None)?;
    Ok(caller)
  }

  /// Reject a class year the student's department does not offer.
  fn check_class_year(&self, department: &str, class_year: ClassYear) -> Result<()> {
    if self.academic.class_options(department).contains(&class_year) {
      Ok(())
    } else {
      Err(Error::InvalidValue {
        field:  "classYear",
        reason: format!("{class_year} is not offered by {department}"),
      })
    }
  }

  // ─── Attendance ────────────────────────────────────────────────────────────

  /// The day sheet for `scope`. Students only ever get their own row.
  pub fn attendance_sheet<'a>(
    &'a self,
    caller_id: &str,
    date: NaiveDate,
    scope: &'a Scope,
  ) -> Result<Vec<DayEntry<'a>>> {
    let caller = self.directory.require(caller_id)?;
    let policy = self.academic.policy();
    if caller.is_student() {
      policy.authorize(caller, Action::ViewAttendance, Target::Owner(&caller.id))?;
      let sheet = self.ledger.query_day(&self.directory, date, scope);
      return Ok(sheet.into_iter().filter(|e| e.person.id == caller.id).collect());
    }
    policy.authorize(caller, Action::ViewAttendance, Target::None)?;
    Ok(self.ledger.query_day(&self.directory, date, scope))
  }

  /// One person's records, newest first.
  pub fn attendance_history(
    &self,
    caller_id: &str,
    person_id: &str,
  ) -> Result<Vec<&AttendanceRecord>> {
    let caller = self.directory.require(caller_id)?;
    self
      .academic
      .policy()
      .authorize(caller, Action::ViewAttendance, Target::Owner(person_id))?;
    Ok(self.ledger.history(person_id))
  }

  pub async fn mark_status(
    &mut self,
    caller_id: &str,
    person_id: &str,
    date: NaiveDate,
    status: AttendanceStatus,
  ) -> Result<AttendanceRecord> {
    let caller = self.caller(caller_id)?;
    let policy = self.academic.policy();
    let record = self
      .ledger
      .set_status(&policy, &caller, &self.directory, person_id, date, status)?
      .clone();
    self.save(Slot::Attendance).await?;
    Ok(record)
  }

  /// Record an arrival. `date` and `time` default to the clock's today and
  /// current "HH:MM".
  pub async fn mark_arrival(
    &mut self,
    caller_id: &str,
    person_id: &str,
    date: Option<NaiveDate>,
    time: Option<&str>,
  ) -> Result<AttendanceRecord> {
    let caller = self.caller(caller_id)?;
    let date = date.unwrap_or_else(|| self.clock.today());
    let time = match time {
      Some(t) => NaiveTime::parse_from_str(t.trim(), "%H:%M")
        .map_err(|_| Error::InvalidValue {
          field:  "time",
          reason: format!("expected HH:MM, got {t:?}"),
        })?
        .format("%H:%M")
        .to_string(),
      None => self.clock.time_hhmm(),
    };
    let policy = self.academic.policy();
    let record = self
      .ledger
      .set_arrival_time(&policy, &caller, &self.directory, person_id, date, &time)?
      .clone();
    self.save(Slot::Attendance).await?;
    Ok(record)
  }

  pub fn export_attendance(
    &self,
    caller_id: &str,
    scope: &Scope,
    date_from: NaiveDate,
    date_to: NaiveDate,
  ) -> Result<AttendanceExport> {
    let caller = self.directory.require(caller_id)?;
    self
      .academic
      .policy()
      .authorize(caller, Action::ExportAttendance, Target::None)?;
    let matrix = report::build_attendance_matrix(
      &self.directory,
      &self.ledger,
      scope,
      date_from,
      date_to,
    );
    tracing::info!(scope = %scope.tag(), rows = matrix.rows.len(), "attendance exported");
    Ok(AttendanceExport {
      file_name: report::export_file_name(scope),
      csv: report::serialize_csv(&matrix),
      matrix,
    })
  }

  // ─── Leave ─────────────────────────────────────────────────────────────────

  pub async fn submit_leave(
    &mut self,
    caller_id: &str,
    input: NewLeave,
  ) -> Result<LeaveApplication> {
    let caller = self.caller(caller_id)?;
    let today = self.clock.today();
    let policy = self.academic.policy();
    let application = self.leaves.submit(&policy, &caller, input, today)?.clone();
    self.save(Slot::Leaves).await?;
    Ok(application)
  }

  pub fn my_leaves(&self, caller_id: &str) -> Result<Vec<&LeaveApplication>> {
    let caller = self.directory.require(caller_id)?;
    self.leaves.list_mine(&self.academic.policy(), caller, &caller.id)
  }

  pub fn review_leaves(
    &self,
    caller_id: &str,
    status: Option<LeaveStatus>,
  ) -> Result<Vec<&LeaveApplication>> {
    let caller = self.directory.require(caller_id)?;
    self.leaves.list_for_review(&self.academic.policy(), caller, status)
  }

  pub async fn decide_leave(
    &mut self,
    caller_id: &str,
    id: Uuid,
    outcome: LeaveOutcome,
    rejection_reason: Option<String>,
  ) -> Result<LeaveApplication> {
    let caller = self.caller(caller_id)?;
    let policy = self.academic.policy();
    let application = self
      .leaves
      .decide(&policy, &caller, id, outcome, rejection_reason)?
      .clone();
    self.save(Slot::Leaves).await?;
    Ok(application)
  }

  // ─── Directory ─────────────────────────────────────────────────────────────

  /// People matching `scope`. Admin only.
  pub fn list_people<'a>(
    &'a self,
    caller_id: &str,
    scope: &'a Scope,
  ) -> Result<Vec<&'a Person>> {
    let caller = self.directory.require(caller_id)?;
    self
      .academic
      .policy()
      .authorize(caller, Action::ManageUsers, Target::None)?;
    Ok(self.directory.in_scope(scope).collect())
  }

  pub async fn register(&mut self, caller_id: &str, person: Person) -> Result<Person> {
    let caller = self.caller(caller_id)?;
    if let (Some(department), Some(class_year)) = (&person.department, person.class_year)
      && person.is_student()
    {
      self.check_class_year(department, class_year)?;
    }
    let policy = self.academic.policy();
    let person = self.directory.register(&policy, &caller, person)?.clone();
    self.save(Slot::Users).await?;
    Ok(person)
  }

  pub async fn set_suspended(
    &mut self,
    caller_id: &str,
    id: &str,
    suspended: bool,
  ) -> Result<Person> {
    let caller = self.caller(caller_id)?;
    let policy = self.academic.policy();
    let person = self.directory.set_suspended(&policy, &caller, id, suspended)?.clone();
    self.save(Slot::Users).await?;
    Ok(person)
  }

  /// Flip a person's suspension.
  pub async fn toggle_suspension(&mut self, caller_id: &str, id: &str) -> Result<Person> {
    let suspended = self.directory.require(id)?.is_suspended;
    self.set_suspended(caller_id, id, !suspended).await
  }

  pub async fn set_role(&mut self, caller_id: &str, id: &str, role: Role) -> Result<Person> {
    let caller = self.caller(caller_id)?;
    let policy = self.academic.policy();
    let person = self.directory.set_role(&policy, &caller, id, role)?.clone();
    self.save(Slot::Users).await?;
    Ok(person)
  }

  pub async fn remove_person(&mut self, caller_id: &str, id: &str) -> Result<Person> {
    let caller = self.caller(caller_id)?;
    let policy = self.academic.policy();
    let person = self.directory.remove(&policy, &caller, id)?;
    self.save(Slot::Users).await?;
    Ok(person)
  }

  pub async fn update_profile(
    &mut self,
    caller_id: &str,
    id: &str,
    update: ProfileUpdate,
  ) -> Result<Person> {
    let caller = self.caller(caller_id)?;
    if let Some(class_year) = update.class_year {
      let target = self.directory.require(id)?;
      if target.is_student() {
        let department = update
          .department
          .as_deref()
          .or(target.department.as_deref())
          .unwrap_or_default();
        self.check_class_year(department, class_year)?;
      }
    }
    let policy = self.academic.policy();
    let person = self.directory.update_profile(&policy, &caller, id, update)?.clone();
    self.save(Slot::Users).await?;
    Ok(person)
  }

  // ─── Academic configuration ───────────────────────────────────────────────

  pub async fn add_academic(
    &mut self,
    caller_id: &str,
    which: AcademicList,
    name: &str,
  ) -> Result<()> {
    let caller = self.caller(caller_id)?;
    self.academic.add(&caller, which, name)?;
    self.save(Slot::Academic).await
  }

  pub async fn remove_academic(
    &mut self,
    caller_id: &str,
    which: AcademicList,
    name: &str,
  ) -> Result<()> {
    let caller = self.caller(caller_id)?;
    self.academic.remove(&caller, which, name)?;
    self.save(Slot::Academic).await
  }

  pub async fn rename_academic(
    &mut self,
    caller_id: &str,
    which: AcademicList,
    from: &str,
    to: &str,
  ) -> Result<()> {
    let caller = self.caller(caller_id)?;
    self.academic.rename(&caller, which, from, to)?;
    self.save(Slot::Academic).await
  }

  pub async fn toggle_five_year(&mut self, caller_id: &str, department: &str) -> Result<bool> {
    let caller = self.caller(caller_id)?;
    let flag = self.academic.toggle_five_year(&caller, department)?;
    self.save(Slot::Academic).await?;
    Ok(flag)
  }

  // ─── Complaints ────────────────────────────────────────────────────────────

  /// File a complaint, classifying it through `enricher` first. The
  /// enricher's fallback is stored when classification is unavailable.
  pub async fn file_complaint(
    &mut self,
    caller_id: &str,
    input: NewComplaint,
    enricher: &impl Enricher,
  ) -> Result<Complaint> {
    let caller = self.caller(caller_id)?;
    ComplaintBook::validate(&self.academic.policy(), &caller, &input)?;
    let analysis = enricher.classify_complaint(&input.description).await;
    let today = self.clock.today();
    let policy = self.academic.policy();
    let complaint = self
      .complaints
      .file(&policy, &caller, input, analysis, today)?
      .clone();
    self.save(Slot::Complaints).await?;
    Ok(complaint)
  }

  pub fn complaints(&self, caller_id: &str) -> Result<Vec<&Complaint>> {
    let caller = self.directory.require(caller_id)?;
    self.complaints.list_visible(&self.academic.policy(), caller)
  }

  pub async fn set_complaint_status(
    &mut self,
    caller_id: &str,
    id: Uuid,
    status: ComplaintStatus,
  ) -> Result<Complaint> {
    let caller = self.caller(caller_id)?;
    let policy = self.academic.policy();
    let complaint = self.complaints.set_status(&policy, &caller, id, status)?.clone();
    self.save(Slot::Complaints).await?;
    Ok(complaint)
  }

  // ─── Announcements ─────────────────────────────────────────────────────────

  /// Draft announcement text for `topic`. Only callers who may publish may
  /// ask for a draft; the text itself is whatever the enricher returns.
  pub async fn draft_announcement(
    &self,
    caller_id: &str,
    topic: &str,
    enricher: &impl Enricher,
  ) -> Result<String> {
    let caller = self.directory.require(caller_id)?;
    self
      .academic
      .policy()
      .authorize(caller, Action::PublishAnnouncement, Target::None)?;
    if topic.trim().is_empty() {
      return Err(Error::MissingField("topic"));
    }
    Ok(enricher.draft_announcement(topic).await)
  }

  pub async fn post_announcement(
    &mut self,
    caller_id: &str,
    input: NewAnnouncement,
  ) -> Result<Announcement> {
    let caller = self.caller(caller_id)?;
    let today = self.clock.today();
    let policy = self.academic.policy();
    let announcement = self.board.post(&policy, &caller, input, today)?.clone();
    self.save(Slot::Announcements).await?;
    Ok(announcement)
  }

  pub async fn remove_announcement(
    &mut self,
    caller_id: &str,
    id: Uuid,
  ) -> Result<Announcement> {
    let caller = self.caller(caller_id)?;
    let policy = self.academic.policy();
    let announcement = self.board.remove(&policy, &caller, id)?;
    self.save(Slot::Announcements).await?;
    Ok(announcement)
  }

  pub fn recent_announcements(&self, caller_id: &str, n: usize) -> Result<Vec<&Announcement>> {
    self.authorize_board(caller_id)?;
    Ok(self.board.recent(n))
  }

  // ─── Timetable ─────────────────────────────────────────────────────────────

  pub async fn add_slot(&mut self, caller_id: &str, input: NewSlot) -> Result<TimetableSlot> {
    let caller = self.caller(caller_id)?;
    let policy = self.academic.policy();
    let slot = self.timetable.add(&policy, &caller, input)?.clone();
    self.save(Slot::Timetable).await?;
    Ok(slot)
  }

  pub async fn remove_slot(&mut self, caller_id: &str, id: Uuid) -> Result<TimetableSlot> {
    let caller = self.caller(caller_id)?;
    let policy = self.academic.policy();
    let slot = self.timetable.remove(&policy, &caller, id)?;
    self.save(Slot::Timetable).await?;
    Ok(slot)
  }

  /// The caller's classes for the clock's current weekday.
  pub fn timetable_today(&self, caller_id: &str) -> Result<Vec<&TimetableSlot>> {
    let caller = self.authorize_board(caller_id)?;
    Ok(self.timetable.today(caller, &self.clock.weekday_name()))
  }

  pub fn class_timetable(
    &self,
    caller_id: &str,
    program: &str,
    class_year: ClassYear,
    batch: Option<&str>,
    day: Option<&str>,
  ) -> Result<Vec<&TimetableSlot>> {
    self.authorize_board(caller_id)?;
    Ok(self.timetable.for_class(program, class_year, batch, day))
  }

  // ─── Progress ──────────────────────────────────────────────────────────────

  pub async fn record_test(
    &mut self,
    caller_id: &str,
    input: NewClassTest,
  ) -> Result<ClassTest> {
    let caller = self.caller(caller_id)?;
    let policy = self.academic.policy();
    let test = self
      .gradebook
      .record(&policy, &caller, &self.directory, input)?
      .clone();
    self.save(Slot::ClassTests).await?;
    Ok(test)
  }

  pub async fn remove_test(&mut self, caller_id: &str, id: Uuid) -> Result<ClassTest> {
    let caller = self.caller(caller_id)?;
    let policy = self.academic.policy();
    let test = self.gradebook.remove(&policy, &caller, id)?;
    self.save(Slot::ClassTests).await?;
    Ok(test)
  }

  pub fn progress_report(&self, caller_id: &str, student_id: &str) -> Result<ProgressReport> {
    let caller = self.directory.require(caller_id)?;
    let tests = self
      .gradebook
      .for_student(&self.academic.policy(), caller, student_id)?;
    Ok(ProgressReport {
      student_id:      student_id.to_owned(),
      average_percent: progress::average_percent(tests.iter().copied()),
      tests:           tests.into_iter().cloned().collect(),
    })
  }
}
