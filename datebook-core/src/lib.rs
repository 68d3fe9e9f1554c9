//! Palm OS Datebook records.
//!
//! This crate provides the types shared by the datebook tools:
//! - `AppointmentRecord` and its binary codec
//! - the Datebook application info block
//! - the `.pdb` database container

pub mod app_info;
pub mod appointment;
pub mod codec;
pub mod config;
pub mod error;
pub mod pdb;
pub mod record;

pub use appointment::{AdvanceUnits, AppointmentRecord, DayOfMonth, RepeatType, Weekdays};
pub use error::{DatebookError, DatebookResult};
pub use record::{PalmRecord, RecordAttributes, RecordId, RecordMeta};
