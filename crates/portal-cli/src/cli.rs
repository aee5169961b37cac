//! Command-line surface.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use portal_core::{
  academic::AcademicList,
  complaint::ComplaintStatus,
  directory::Scope,
  leave::{LeaveOutcome, LeaveStatus},
  person::{ClassYear, Role},
};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "portal", author, version, about = "Attendance, leave and campus records")]
pub struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "portal.toml")]
  pub config: PathBuf,

  /// Identifier of the person running the command.
  #[arg(long = "as", value_name = "PERSON_ID", env = "PORTAL_AS", default_value = "admin")]
  pub caller: String,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Daily attendance, arrival times and CSV export.
  #[command(subcommand)]
  Attendance(AttendanceCmd),
  /// Leave applications.
  #[command(subcommand)]
  Leave(LeaveCmd),
  /// The directory of people.
  #[command(subcommand)]
  Users(UsersCmd),
  /// The complaint center.
  #[command(subcommand)]
  Complaint(ComplaintCmd),
  /// Announcements.
  #[command(subcommand)]
  Announce(AnnounceCmd),
  /// The weekly class timetable.
  #[command(subcommand)]
  Timetable(TimetableCmd),
  /// Class tests and progress reports.
  #[command(subcommand)]
  Progress(ProgressCmd),
  /// Departments, batches and five-year programs.
  #[command(subcommand)]
  Academic(AcademicCmd),
  /// Head counts for the dashboard.
  Summary,
}

// ─── Scope ───────────────────────────────────────────────────────────────────

#[derive(Args, Debug, Clone, Default)]
pub struct ScopeArgs {
  /// ADMIN, STAFF or STUDENT.
  #[arg(long)]
  pub role:       Option<Role>,
  #[arg(long)]
  pub department: Option<String>,
  /// "1st Year" .. "5th Year", or 1 .. 5.
  #[arg(long = "class")]
  pub class_year: Option<ClassYear>,
  #[arg(long)]
  pub batch:      Option<String>,
}

impl From<ScopeArgs> for Scope {
  fn from(args: ScopeArgs) -> Self {
    Scope {
      role:       args.role,
      department: args.department,
      class_year: args.class_year,
      batch:      args.batch,
    }
  }
}

// ─── Attendance ──────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum AttendanceCmd {
  /// Show the sheet for one day. Missing records read as Absent.
  Day {
    /// Defaults to today.
    #[arg(long)]
    date:  Option<NaiveDate>,
    #[command(flatten)]
    scope: ScopeArgs,
  },
  /// Set a student's status for a day.
  Mark {
    person: String,
    /// Present, Absent, Late or Online.
    status: String,
    #[arg(long)]
    date:   Option<NaiveDate>,
  },
  /// Record an arrival time; the status becomes Present.
  Arrive {
    /// Defaults to the caller.
    person: Option<String>,
    #[arg(long)]
    date:   Option<NaiveDate>,
    /// "HH:MM"; defaults to now.
    #[arg(long)]
    time:   Option<String>,
  },
  /// A person's recorded days, newest first.
  History {
    /// Defaults to the caller.
    person: Option<String>,
  },
  /// Write `Attendance_<SCOPE>.csv` for a date range.
  Export {
    #[arg(long)]
    from:  NaiveDate,
    #[arg(long)]
    to:    NaiveDate,
    #[command(flatten)]
    scope: ScopeArgs,
    /// Directory to write into.
    #[arg(long, default_value = ".")]
    out:   PathBuf,
  },
}

// ─── Leave ───────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum LeaveCmd {
  /// Apply for leave.
  Apply {
    #[arg(long)]
    from:   NaiveDate,
    #[arg(long)]
    to:     NaiveDate,
    #[arg(long)]
    reason: String,
  },
  /// Your own applications, newest first.
  Mine,
  /// The review queue.
  Review {
    /// Pending, Approved or Rejected.
    #[arg(long)]
    status: Option<LeaveStatus>,
  },
  /// Approve or reject a pending application.
  Decide {
    id:      Uuid,
    /// Approved or Rejected.
    outcome: LeaveOutcome,
    /// Stored only on rejection.
    #[arg(long)]
    reason:  Option<String>,
  },
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum UsersCmd {
  List {
    #[command(flatten)]
    scope: ScopeArgs,
  },
  Add {
    id:         String,
    name:       String,
    #[arg(long)]
    role:       Role,
    #[arg(long)]
    department: Option<String>,
    #[arg(long = "class")]
    class_year: Option<ClassYear>,
    #[arg(long)]
    batch:      Option<String>,
    #[arg(long)]
    email:      Option<String>,
  },
  /// Suspend a person, or lift a suspension with `--lift`.
  Suspend {
    id:   String,
    #[arg(long)]
    lift: bool,
  },
  Role {
    id:   String,
    role: Role,
  },
  Remove {
    id: String,
  },
  /// Edit a profile. Defaults to the caller's own.
  Profile {
    id:         Option<String>,
    #[arg(long)]
    name:       Option<String>,
    #[arg(long)]
    email:      Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long = "class")]
    class_year: Option<ClassYear>,
    #[arg(long)]
    batch:      Option<String>,
  },
}

// ─── Complaints ──────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum ComplaintCmd {
  File {
    #[arg(long)]
    subject:     String,
    #[arg(long)]
    description: String,
  },
  List,
  Status {
    id:     Uuid,
    /// Pending, "In Progress" (or in-progress) or Resolved.
    status: ComplaintStatus,
  },
}

// ─── Announcements ───────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum AnnounceCmd {
  /// Draft announcement text for a topic.
  Draft {
    topic: String,
  },
  Post {
    #[arg(long)]
    title:     String,
    #[arg(long)]
    content:   String,
    #[arg(long)]
    important: bool,
  },
  List {
    #[arg(long, default_value_t = 5)]
    limit: usize,
  },
  Remove {
    id: Uuid,
  },
}

// ─── Timetable ───────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum TimetableCmd {
  /// Your classes today.
  Today,
  /// One class's week, or one day of it.
  Class {
    #[arg(long)]
    program:    String,
    #[arg(long = "class")]
    class_year: ClassYear,
    #[arg(long)]
    batch:      Option<String>,
    #[arg(long)]
    day:        Option<String>,
  },
  Add {
    #[arg(long)]
    day:        String,
    #[arg(long)]
    start:      String,
    #[arg(long)]
    end:        String,
    #[arg(long)]
    subject:    String,
    #[arg(long, default_value = "")]
    instructor: String,
    #[arg(long, default_value = "")]
    room:       String,
    #[arg(long)]
    program:    Option<String>,
    #[arg(long = "class")]
    class_year: Option<ClassYear>,
    #[arg(long)]
    batch:      Option<String>,
  },
  Remove {
    id: Uuid,
  },
}

// ─── Progress ────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum ProgressCmd {
  Record {
    student:  String,
    #[arg(long)]
    subject:  String,
    #[arg(long)]
    title:    String,
    #[arg(long)]
    total:    u32,
    #[arg(long)]
    obtained: u32,
    /// Defaults to today.
    #[arg(long)]
    date:     Option<NaiveDate>,
  },
  /// A student's tests and average. Defaults to the caller.
  Show {
    student: Option<String>,
  },
  Remove {
    id: Uuid,
  },
}

// ─── Academic ────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum AcademicCmd {
  Show,
  /// Add to student-departments, staff-departments or batches.
  Add {
    list: AcademicList,
    name: String,
  },
  Remove {
    list: AcademicList,
    name: String,
  },
  Rename {
    list: AcademicList,
    from: String,
    to:   String,
  },
  /// Toggle the five-year flag on a student department.
  FiveYear {
    department: String,
  },
}
