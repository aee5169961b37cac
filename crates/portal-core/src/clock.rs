//! Wall-clock access at the portal's fixed UTC offset.
//!
//! "Today" for attendance, leave and complaints is the local calendar date
//! at the institution, not the host's.

use chrono::{
  Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset as _, Utc,
};

/// Minutes east of UTC for Asia/Karachi, which observes no DST.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 300;

#[derive(Debug, Clone, Copy)]
pub struct Clock {
  offset: FixedOffset,
  pinned: Option<NaiveDateTime>,
}

impl Default for Clock {
  fn default() -> Self { Self::with_offset_minutes(DEFAULT_UTC_OFFSET_MINUTES) }
}

impl Clock {
  /// Out-of-range offsets fall back to UTC.
  pub fn with_offset_minutes(minutes: i32) -> Self {
    let offset = minutes
      .checked_mul(60)
      .and_then(FixedOffset::east_opt)
      .unwrap_or_else(|| Utc.fix());
    Self { offset, pinned: None }
  }

  /// A clock stuck at `at` (local time). For tests and replays.
  pub fn pinned(at: NaiveDateTime) -> Self {
    Self { pinned: Some(at), ..Self::default() }
  }

  pub fn now(&self) -> NaiveDateTime {
    self.pinned.unwrap_or_else(|| {
      Utc::now().naive_utc() + Duration::seconds(self.offset.local_minus_utc().into())
    })
  }

  pub fn today(&self) -> NaiveDate { self.now().date() }

  /// Current local time as "HH:MM".
  pub fn time_hhmm(&self) -> String { self.now().format("%H:%M").to_string() }

  /// Current local weekday name, e.g. "Monday".
  pub fn weekday_name(&self) -> String { self.now().format("%A").to_string() }
}
