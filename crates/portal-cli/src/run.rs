//! Dispatch of one parsed command against a loaded [`Portal`].

use anyhow::{Context as _, Result};
use portal_core::{
  Portal,
  announcement::NewAnnouncement,
  attendance::AttendanceStatus,
  complaint::NewComplaint,
  directory::{ProfileUpdate, Scope},
  enrich::{ComplaintAnalysis, Enricher, Offline},
  leave::{LeaveApplication, NewLeave},
  person::Person,
  progress::NewClassTest,
  store::PortalStore,
  timetable::{NewSlot, TimetableSlot},
};
use portal_genai::GenAiClient;

use crate::cli::{
  AcademicCmd, AnnounceCmd, AttendanceCmd, Command, ComplaintCmd, LeaveCmd,
  ProgressCmd, TimetableCmd, UsersCmd,
};

// ─── Enrichment ──────────────────────────────────────────────────────────────

/// The configured enricher: a remote service, or the fixed fallbacks.
pub enum Enrichment {
  Remote(GenAiClient),
  Offline(Offline),
}

impl Enricher for Enrichment {
  async fn draft_announcement(&self, topic: &str) -> String {
    match self {
      Enrichment::Remote(client) => client.draft_announcement(topic).await,
      Enrichment::Offline(offline) => offline.draft_announcement(topic).await,
    }
  }

  async fn classify_complaint(&self, description: &str) -> ComplaintAnalysis {
    match self {
      Enrichment::Remote(client) => client.classify_complaint(description).await,
      Enrichment::Offline(offline) => offline.classify_complaint(description).await,
    }
  }
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

pub async fn run<S: PortalStore>(
  portal: &mut Portal<S>,
  caller: &str,
  command: Command,
  enricher: &Enrichment,
) -> Result<()> {
  match command {
    Command::Attendance(cmd) => attendance(portal, caller, cmd).await,
    Command::Leave(cmd) => leave(portal, caller, cmd).await,
    Command::Users(cmd) => users(portal, caller, cmd).await,
    Command::Complaint(cmd) => complaint(portal, caller, cmd, enricher).await,
    Command::Announce(cmd) => announce(portal, caller, cmd, enricher).await,
    Command::Timetable(cmd) => timetable(portal, caller, cmd).await,
    Command::Progress(cmd) => progress(portal, caller, cmd).await,
    Command::Academic(cmd) => academic(portal, caller, cmd).await,
    Command::Summary => {
      let s = portal.summary(caller)?;
      println!("students           {}", s.students);
      println!("staff              {}", s.staff);
      println!("announcements      {}", s.announcements);
      println!("pending complaints {}", s.pending_complaints);
      Ok(())
    }
  }
}

async fn attendance<S: PortalStore>(
  portal: &mut Portal<S>,
  caller: &str,
  cmd: AttendanceCmd,
) -> Result<()> {
  match cmd {
    AttendanceCmd::Day { date, scope } => {
      let date = date.unwrap_or_else(|| portal.clock().today());
      let scope = Scope::from(scope);
      let sheet = portal.attendance_sheet(caller, date, &scope)?;
      println!("{date}  {} people", sheet.len());
      for entry in sheet {
        println!(
          "{:<12} {:<28} {:<8} {:<7} {}",
          entry.person.id,
          entry.person.name,
          entry.person.role,
          entry.status,
          entry.arrival_time.unwrap_or("")
        );
      }
    }
    AttendanceCmd::Mark { person, status, date } => {
      let status = AttendanceStatus::parse(&status)?;
      let date = date.unwrap_or_else(|| portal.clock().today());
      let record = portal.mark_status(caller, &person, date, status).await?;
      println!("{} {} {}", record.date, record.user_id, record.status);
    }
    AttendanceCmd::Arrive { person, date, time } => {
      let person = person.as_deref().unwrap_or(caller);
      let record = portal
        .mark_arrival(caller, person, date, time.as_deref())
        .await?;
      println!(
        "{} {} {} at {}",
        record.date,
        record.user_id,
        record.status,
        record.arrival_time.as_deref().unwrap_or("")
      );
    }
    AttendanceCmd::History { person } => {
      let person = person.as_deref().unwrap_or(caller);
      for record in portal.attendance_history(caller, person)? {
        println!(
          "{} {:<7} {}",
          record.date,
          record.status,
          record.arrival_time.as_deref().unwrap_or("")
        );
      }
    }
    AttendanceCmd::Export { from, to, scope, out } => {
      let scope = Scope::from(scope);
      let export = portal.export_attendance(caller, &scope, from, to)?;
      let path = out.join(&export.file_name);
      tokio::fs::write(&path, export.csv)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
      println!("wrote {} rows to {}", export.matrix.rows.len(), path.display());
    }
  }
  Ok(())
}

fn print_leave(l: &LeaveApplication) {
  println!(
    "{}  {} → {}  {:<8} {} ({})  {}{}",
    l.id,
    l.date_from,
    l.date_to,
    l.status,
    l.applicant_name,
    l.applicant_role,
    l.reason,
    l.rejection_reason
      .as_deref()
      .map(|r| format!("  [rejected: {r}]"))
      .unwrap_or_default()
  );
}

async fn leave<S: PortalStore>(
  portal: &mut Portal<S>,
  caller: &str,
  cmd: LeaveCmd,
) -> Result<()> {
  match cmd {
    LeaveCmd::Apply { from, to, reason } => {
      let input = NewLeave { date_from: Some(from), date_to: Some(to), reason };
      print_leave(&portal.submit_leave(caller, input).await?);
    }
    LeaveCmd::Mine => portal.my_leaves(caller)?.into_iter().for_each(print_leave),
    LeaveCmd::Review { status } => {
      portal.review_leaves(caller, status)?.into_iter().for_each(print_leave)
    }
    LeaveCmd::Decide { id, outcome, reason } => {
      print_leave(&portal.decide_leave(caller, id, outcome, reason).await?);
    }
  }
  Ok(())
}

fn print_person(p: &Person) {
  println!(
    "{:<12} {:<28} {:<8} {:<18} {:<9} {:<10}{}",
    p.id,
    p.name,
    p.role,
    p.department.as_deref().unwrap_or("-"),
    p.class_year.map(|c| c.to_string()).unwrap_or_default(),
    p.batch.as_deref().unwrap_or(""),
    if p.is_suspended { " suspended" } else { "" }
  );
}

async fn users<S: PortalStore>(
  portal: &mut Portal<S>,
  caller: &str,
  cmd: UsersCmd,
) -> Result<()> {
  match cmd {
    UsersCmd::List { scope } => {
      let scope = Scope::from(scope);
      portal.list_people(caller, &scope)?.into_iter().for_each(print_person);
    }
    UsersCmd::Add { id, name, role, department, class_year, batch, email } => {
      let person = Person {
        id,
        name,
        role,
        department,
        email,
        class_year,
        batch,
        is_suspended: false,
      };
      print_person(&portal.register(caller, person).await?);
    }
    UsersCmd::Suspend { id, lift } => {
      print_person(&portal.set_suspended(caller, &id, !lift).await?);
    }
    UsersCmd::Role { id, role } => print_person(&portal.set_role(caller, &id, role).await?),
    UsersCmd::Remove { id } => {
      let removed = portal.remove_person(caller, &id).await?;
      println!("removed {}", removed.id);
    }
    UsersCmd::Profile { id, name, email, department, class_year, batch } => {
      let id = id.as_deref().unwrap_or(caller);
      let update = ProfileUpdate { name, email, department, class_year, batch };
      print_person(&portal.update_profile(caller, id, update).await?);
    }
  }
  Ok(())
}

async fn complaint<S: PortalStore>(
  portal: &mut Portal<S>,
  caller: &str,
  cmd: ComplaintCmd,
  enricher: &Enrichment,
) -> Result<()> {
  match cmd {
    ComplaintCmd::File { subject, description } => {
      let c = portal
        .file_complaint(caller, NewComplaint { subject, description }, enricher)
        .await?;
      println!(
        "{}  {} [{} / {}]",
        c.id,
        c.subject,
        c.priority.map(|p| p.to_string()).unwrap_or_default(),
        c.category.as_deref().unwrap_or("")
      );
    }
    ComplaintCmd::List => {
      for c in portal.complaints(caller)? {
        println!(
          "{}  {}  {:<11} {:<6} {}  {} ({})",
          c.id,
          c.date,
          c.status,
          c.priority.map(|p| p.to_string()).unwrap_or_default(),
          c.subject,
          c.author_name,
          c.author_id
        );
      }
    }
    ComplaintCmd::Status { id, status } => {
      let c = portal.set_complaint_status(caller, id, status).await?;
      println!("{}  {}", c.id, c.status);
    }
  }
  Ok(())
}

async fn announce<S: PortalStore>(
  portal: &mut Portal<S>,
  caller: &str,
  cmd: AnnounceCmd,
  enricher: &Enrichment,
) -> Result<()> {
  match cmd {
    AnnounceCmd::Draft { topic } => {
      println!("{}", portal.draft_announcement(caller, &topic, enricher).await?);
    }
    AnnounceCmd::Post { title, content, important } => {
      let input = NewAnnouncement { title, content, is_important: important };
      let a = portal.post_announcement(caller, input).await?;
      println!("{}  {}", a.id, a.title);
    }
    AnnounceCmd::List { limit } => {
      for a in portal.recent_announcements(caller, limit)? {
        let flag = if a.is_important { "!" } else { " " };
        println!("{flag} {}  {}  ({})\n  {}", a.date, a.title, a.author, a.content);
      }
    }
    AnnounceCmd::Remove { id } => {
      let a = portal.remove_announcement(caller, id).await?;
      println!("removed {}", a.title);
    }
  }
  Ok(())
}

fn print_slot(s: &TimetableSlot) {
  println!(
    "{}  {:<9} {}  {:<24} {:<18} {:<6} {} {}",
    s.id,
    s.day,
    s.time,
    s.subject,
    s.instructor,
    s.room,
    s.program.as_deref().unwrap_or(""),
    s.class_year.map(|c| c.to_string()).unwrap_or_default()
  );
}

async fn timetable<S: PortalStore>(
  portal: &mut Portal<S>,
  caller: &str,
  cmd: TimetableCmd,
) -> Result<()> {
  match cmd {
    TimetableCmd::Today => portal.timetable_today(caller)?.into_iter().for_each(print_slot),
    TimetableCmd::Class { program, class_year, batch, day } => portal
      .class_timetable(caller, &program, class_year, batch.as_deref(), day.as_deref())?
      .into_iter()
      .for_each(print_slot),
    TimetableCmd::Add {
      day,
      start,
      end,
      subject,
      instructor,
      room,
      program,
      class_year,
      batch,
    } => {
      let input = NewSlot {
        day,
        start,
        end,
        subject,
        instructor,
        room,
        class_year,
        batch,
        program,
      };
      print_slot(&portal.add_slot(caller, input).await?);
    }
    TimetableCmd::Remove { id } => {
      let s = portal.remove_slot(caller, id).await?;
      println!("removed {} on {}", s.subject, s.day);
    }
  }
  Ok(())
}

async fn progress<S: PortalStore>(
  portal: &mut Portal<S>,
  caller: &str,
  cmd: ProgressCmd,
) -> Result<()> {
  match cmd {
    ProgressCmd::Record { student, subject, title, total, obtained, date } => {
      let input = NewClassTest {
        student_id: student,
        subject,
        title,
        total_marks: total,
        obtained_marks: obtained,
        date: date.unwrap_or_else(|| portal.clock().today()),
      };
      let t = portal.record_test(caller, input).await?;
      println!("{}  {} {}/{}", t.id, t.student_name, t.obtained_marks, t.total_marks);
    }
    ProgressCmd::Show { student } => {
      let student = student.as_deref().unwrap_or(caller);
      let report = portal.progress_report(caller, student)?;
      println!(
        "{}: average {}% over {} tests",
        report.student_id,
        report.average_percent,
        report.tests.len()
      );
      for t in &report.tests {
        println!(
          "  {}  {} ({})  {}/{}",
          t.date, t.title, t.subject, t.obtained_marks, t.total_marks
        );
      }
    }
    ProgressCmd::Remove { id } => {
      let t = portal.remove_test(caller, id).await?;
      println!("removed {} for {}", t.title, t.student_name);
    }
  }
  Ok(())
}

async fn academic<S: PortalStore>(
  portal: &mut Portal<S>,
  caller: &str,
  cmd: AcademicCmd,
) -> Result<()> {
  match cmd {
    AcademicCmd::Show => {
      let json = serde_json::to_string_pretty(portal.academic())
        .context("failed to render academic configuration")?;
      println!("{json}");
    }
    AcademicCmd::Add { list, name } => {
      portal.add_academic(caller, list, &name).await?;
      println!("added {name:?} to {list}");
    }
    AcademicCmd::Remove { list, name } => {
      portal.remove_academic(caller, list, &name).await?;
      println!("removed {name:?} from {list}");
    }
    AcademicCmd::Rename { list, from, to } => {
      portal.rename_academic(caller, list, &from, &to).await?;
      println!("renamed {from:?} to {to:?} in {list}");
    }
    AcademicCmd::FiveYear { department } => {
      let flag = portal.toggle_five_year(caller, &department).await?;
      let state = if flag { "now" } else { "no longer" };
      println!("{department} is {state} a five-year program");
    }
  }
  Ok(())
}
