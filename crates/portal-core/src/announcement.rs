//! Announcements published by administrators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  person::Person,
  policy::{Action, Policy, Target},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
  pub id:           Uuid,
  pub title:        String,
  pub content:      String,
  pub date:         NaiveDate,
  pub author:       String,
  #[serde(default)]
  pub is_important: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NewAnnouncement {
  pub title:        String,
  pub content:      String,
  pub is_important: bool,
}

/// Published announcements, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
  announcements: Vec<Announcement>,
}

impl Board {
  pub fn new(announcements: Vec<Announcement>) -> Self { Self { announcements } }

  pub fn announcements(&self) -> &[Announcement] { &self.announcements }

  pub fn post(
    &mut self,
    policy: &Policy<'_>,
    caller: &Person,
    input: NewAnnouncement,
    date: NaiveDate,
  ) -> Result<&Announcement> {
    policy.authorize(caller, Action::PublishAnnouncement, Target::None)?;
    if input.title.trim().is_empty() {
      return Err(Error::MissingField("title"));
    }
    if input.content.trim().is_empty() {
      return Err(Error::MissingField("content"));
    }
    let announcement = Announcement {
      id: Uuid::new_v4(),
      title: input.title,
      content: input.content,
      date,
      author: caller.name.clone(),
      is_important: input.is_important,
    };
    tracing::info!(id = %announcement.id, by = %caller.id, "announcement posted");
    self.announcements.insert(0, announcement);
    Ok(&self.announcements[0])
  }

  pub fn remove(
    &mut self,
    policy: &Policy<'_>,
    caller: &Person,
    id: Uuid,
  ) -> Result<Announcement> {
    policy.authorize(caller, Action::PublishAnnouncement, Target::None)?;
    let index = self
      .announcements
      .iter()
      .position(|a| a.id == id)
      .ok_or(Error::NotFound { kind: "announcement", id })?;
    tracing::info!(%id, by = %caller.id, "announcement removed");
    Ok(self.announcements.remove(index))
  }

  /// Up to `n` announcements, newest date first. Same-day posts keep their
  /// posting order.
  pub fn recent(&self, n: usize) -> Vec<&Announcement> {
    let mut all: Vec<_> = self.announcements.iter().collect();
    all.sort_by(|a, b| b.date.cmp(&a.date));
    all.truncate(n);
    all
  }
}
