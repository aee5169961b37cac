//! Core types and rules for the institutional portal.
//!
//! This crate owns the attendance ledger, the leave workflow, attendance
//! export and the role policy that guards them, plus the smaller collections
//! (announcements, complaints, timetable, progress reports) that share the
//! same directory of people. It performs no I/O of its own: persistence goes
//! through [`store::PortalStore`] and text enrichment through
//! [`enrich::Enricher`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod academic;
pub mod announcement;
pub mod attendance;
pub mod clock;
pub mod complaint;
pub mod directory;
pub mod enrich;
pub mod error;
pub mod leave;
pub mod person;
pub mod policy;
pub mod portal;
pub mod progress;
pub mod report;
pub mod store;
pub mod timetable;

pub use error::{Error, Result};
pub use portal::Portal;
