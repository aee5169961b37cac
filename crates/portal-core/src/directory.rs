//! The directory: the authoritative roster of people.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  person::{ClassYear, Person, Role},
  policy::{Action, Policy, Target},
};

// ─── Scope ───────────────────────────────────────────────────────────────────

/// A filter narrowing the directory for a sheet or an export.
///
/// Role and department match exactly when set. Class year and batch are
/// lenient: a person with no class year (or batch) recorded passes either
/// filter, so staff records and half-filled student entries still show up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
  pub role:       Option<Role>,
  pub department: Option<String>,
  pub class_year: Option<ClassYear>,
  pub batch:      Option<String>,
}

impl Scope {
  pub fn role(role: Role) -> Self { Self { role: Some(role), ..Self::default() } }

  pub fn with_department(mut self, department: impl Into<String>) -> Self {
    self.department = Some(department.into());
    self
  }

  pub fn with_class_year(mut self, class_year: ClassYear) -> Self {
    self.class_year = Some(class_year);
    self
  }

  pub fn with_batch(mut self, batch: impl Into<String>) -> Self {
    self.batch = Some(batch.into());
    self
  }

  pub fn matches(&self, person: &Person) -> bool {
    self.role.is_none_or(|r| r == person.role)
      && self
        .department
        .as_deref()
        .is_none_or(|d| person.department.as_deref() == Some(d))
      && self
        .class_year
        .is_none_or(|c| person.class_year.is_none_or(|pc| pc == c))
      && self.batch.as_deref().is_none_or(|b| {
        person.batch.as_deref().is_none_or(|pb| pb == b)
      })
  }

  /// Upper-case label used in export file names ("STUDENT", "STAFF", "ALL").
  pub fn tag(&self) -> String {
    self.role.map_or_else(|| "ALL".to_owned(), |r| r.to_string())
  }
}

// ─── Profile edits ───────────────────────────────────────────────────────────

/// Editable profile fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
  pub name:       Option<String>,
  pub email:      Option<String>,
  pub department: Option<String>,
  pub class_year: Option<ClassYear>,
  pub batch:      Option<String>,
}

// ─── Directory ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Directory {
  people: Vec<Person>,
}

impl Directory {
  pub fn new(people: Vec<Person>) -> Self { Self { people } }

  /// The roster used when nothing has been stored yet: a single
  /// administrator who can register everyone else.
  pub fn seeded() -> Self {
    Self::new(vec![Person::admin("admin", "Administrator")])
  }

  pub fn people(&self) -> &[Person] { &self.people }

  pub fn get(&self, id: &str) -> Option<&Person> {
    self.people.iter().find(|p| p.id == id)
  }

  pub fn require(&self, id: &str) -> Result<&Person> {
    self.get(id).ok_or_else(|| Error::PersonNotFound(id.to_owned()))
  }

  /// People matching `scope`, in roster order.
  pub fn in_scope<'a>(
    &'a self,
    scope: &'a Scope,
  ) -> impl Iterator<Item = &'a Person> + 'a {
    self.people.iter().filter(move |p| scope.matches(p))
  }

  pub fn count_by_role(&self, role: Role) -> usize {
    self.people.iter().filter(|p| p.role == role).count()
  }

  fn get_mut(&mut self, id: &str) -> Result<&mut Person> {
    self
      .people
      .iter_mut()
      .find(|p| p.id == id)
      .ok_or_else(|| Error::PersonNotFound(id.to_owned()))
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  /// Add a person. Identifiers must be unique; class year and batch are
  /// dropped for anyone who is not a student.
  pub fn register(
    &mut self,
    policy: &Policy<'_>,
    caller: &Person,
    mut person: Person,
  ) -> Result<&Person> {
    policy.authorize(caller, Action::ManageUsers, Target::None)?;
    person.id = person.id.trim().to_owned();
    if person.id.is_empty() {
      return Err(Error::MissingField("id"));
    }
    if person.name.trim().is_empty() {
      return Err(Error::MissingField("name"));
    }
    if self.get(&person.id).is_some() {
      return Err(Error::DuplicateId(person.id));
    }
    if !person.is_student() {
      person.class_year = None;
      person.batch = None;
    }
    tracing::info!(id = %person.id, role = %person.role, "registered person");
    self.people.push(person);
    Ok(&self.people[self.people.len() - 1])
  }

  pub fn set_suspended(
    &mut self,
    policy: &Policy<'_>,
    caller: &Person,
    id: &str,
    suspended: bool,
  ) -> Result<&Person> {
    policy.authorize(caller, Action::ManageUsers, Target::None)?;
    if caller.id == id {
      return Err(Error::InvalidValue {
        field:  "id",
        reason: "cannot change your own suspension".into(),
      });
    }
    let person = self.get_mut(id)?;
    person.is_suspended = suspended;
    tracing::info!(id, suspended, "changed suspension");
    Ok(&*person)
  }

  pub fn set_role(
    &mut self,
    policy: &Policy<'_>,
    caller: &Person,
    id: &str,
    role: Role,
  ) -> Result<&Person> {
    policy.authorize(caller, Action::ManageUsers, Target::None)?;
    let person = self.get_mut(id)?;
    person.role = role;
    if !person.is_student() {
      person.class_year = None;
      person.batch = None;
    }
    tracing::info!(id, %role, "changed role");
    Ok(&*person)
  }

  /// Remove a person from the roster. Their historical records stay.
  pub fn remove(
    &mut self,
    policy: &Policy<'_>,
    caller: &Person,
    id: &str,
  ) -> Result<Person> {
    policy.authorize(caller, Action::ManageUsers, Target::None)?;
    let index = self
      .people
      .iter()
      .position(|p| p.id == id)
      .ok_or_else(|| Error::PersonNotFound(id.to_owned()))?;
    tracing::info!(id, "removed person");
    Ok(self.people.remove(index))
  }

  /// Apply profile edits. People may change their own name and email;
  /// department, class year and batch need user management rights.
  pub fn update_profile(
    &mut self,
    policy: &Policy<'_>,
    caller: &Person,
    id: &str,
    update: ProfileUpdate,
  ) -> Result<&Person> {
    policy.authorize(caller, Action::UpdateProfile, Target::Owner(id))?;
    if update.department.is_some() || update.class_year.is_some() || update.batch.is_some() {
      policy.authorize(caller, Action::ManageUsers, Target::None)?;
    }
    if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
      return Err(Error::MissingField("name"));
    }
    let person = self.get_mut(id)?;
    if let Some(name) = update.name {
      person.name = name;
    }
    if let Some(email) = update.email {
      person.email = Some(email);
    }
    if let Some(department) = update.department {
      person.department = Some(department);
    }
    if person.is_student() {
      if let Some(class_year) = update.class_year {
        person.class_year = Some(class_year);
      }
      if let Some(batch) = update.batch {
        person.batch = Some(batch);
      }
    }
    Ok(&*person)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::academic::AcademicConfig;

  fn roster() -> Directory {
    Directory::new(vec![
      Person::admin("root", "Root"),
      Person::staff("t1", "Teacher", "Faculty"),
      Person::student("s1", "Sara", "DPT", ClassYear::First, "2023-2027"),
      Person::student("s2", "Omar", "DPT", ClassYear::Second, "2023-2027"),
      Person {
        class_year: None,
        batch: None,
        ..Person::student("s3", "Hina", "DPT", ClassYear::First, "x")
      },
    ])
  }

  #[test]
  fn scope_is_lenient_on_missing_class_and_batch() {
    let dir = roster();
    let scope = Scope::role(Role::Student)
      .with_department("DPT")
      .with_class_year(ClassYear::First)
      .with_batch("2023-2027");
    let ids: Vec<_> = dir.in_scope(&scope).map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["s1", "s3"]);
  }

  #[test]
  fn register_rejects_duplicate_id() {
    let cfg = AcademicConfig::default();
    let mut dir = roster();
    let root = Person::admin("root", "Root");
    let err = dir
      .register(&cfg.policy(), &root, Person::staff("t1", "Dup", "Faculty"))
      .unwrap_err();
    assert!(matches!(err, Error::DuplicateId(id) if id == "t1"));
  }

  #[test]
  fn register_strips_cohort_from_staff() {
    let cfg = AcademicConfig::default();
    let mut dir = roster();
    let root = Person::admin("root", "Root");
    let mut p = Person::staff("t9", "New", "Accounts");
    p.class_year = Some(ClassYear::First);
    let stored = dir.register(&cfg.policy(), &root, p).unwrap();
    assert_eq!(stored.class_year, None);
  }

  #[test]
  fn student_edits_own_profile_only() {
    let cfg = AcademicConfig::default();
    let mut dir = roster();
    let sara = dir.require("s1").unwrap().clone();
    let update = ProfileUpdate { name: Some("Sara K".into()), ..Default::default() };
    dir.update_profile(&cfg.policy(), &sara, "s1", update.clone()).unwrap();
    assert_eq!(dir.require("s1").unwrap().name, "Sara K");

    let err = dir.update_profile(&cfg.policy(), &sara, "s2", update).unwrap_err();
    assert!(err.is_authorization());
  }

  #[test]
  fn only_admins_move_people_between_departments() {
    let cfg = AcademicConfig::default();
    let mut dir = roster();
    let teacher = dir.require("t1").unwrap().clone();
    let sara = dir.require("s1").unwrap().clone();

    let move_dept = ProfileUpdate { department: Some("Accounts".into()), ..Default::default() };
    let err = dir.update_profile(&cfg.policy(), &teacher, "t1", move_dept.clone()).unwrap_err();
    assert!(err.is_authorization());
    assert_eq!(dir.require("t1").unwrap().department.as_deref(), Some("Faculty"));

    let promote = ProfileUpdate { class_year: Some(ClassYear::Fourth), ..Default::default() };
    assert!(dir.update_profile(&cfg.policy(), &sara, "s1", promote).unwrap_err().is_authorization());
    let rebatch = ProfileUpdate { batch: Some("2024-2028".into()), ..Default::default() };
    assert!(dir.update_profile(&cfg.policy(), &sara, "s1", rebatch).unwrap_err().is_authorization());
    assert_eq!(dir.require("s1").unwrap().class_year, Some(ClassYear::First));

    let root = dir.require("root").unwrap().clone();
    dir.update_profile(&cfg.policy(), &root, "t1", move_dept).unwrap();
    assert_eq!(dir.require("t1").unwrap().department.as_deref(), Some("Accounts"));
  }

  #[test]
  fn role_change_drops_cohort() {
    let cfg = AcademicConfig::default();
    let mut dir = roster();
    let root = dir.require("root").unwrap().clone();
    let moved = dir.set_role(&cfg.policy(), &root, "s1", Role::Staff).unwrap();
    assert_eq!(moved.role, Role::Staff);
    assert_eq!(moved.class_year, None);
    assert_eq!(moved.batch, None);
    assert_eq!(moved.department.as_deref(), Some("DPT"));
  }

  #[test]
  fn admin_cannot_suspend_self() {
    let cfg = AcademicConfig::default();
    let mut dir = roster();
    let root = dir.require("root").unwrap().clone();
    assert!(dir.set_suspended(&cfg.policy(), &root, "root", true).is_err());
    dir.set_suspended(&cfg.policy(), &root, "s2", true).unwrap();
    assert!(dir.require("s2").unwrap().is_suspended);
  }
}
