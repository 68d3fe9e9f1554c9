//! Datebook appointment records.
//!
//! An [`AppointmentRecord`] is one entry of the Palm OS Datebook database:
//! a start and end time on a single day, an optional alarm, an optional
//! repeat rule with exception dates, and two free-text fields.

mod pack;
mod types;
mod unpack;

use std::fmt;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, SubsecRound, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::DatebookResult;
use crate::record::{PalmRecord, RecordId, RecordMeta};

pub use types::{AdvanceUnits, DayOfMonth, RepeatType, Weekdays};

/// Placeholder printed for absent optional values.
const NULL: &str = "(null)";

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One Datebook appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    #[serde(default)]
    pub meta: RecordMeta,

    pub begin: NaiveDateTime,
    /// Only the time of day is stored; the date always matches `begin`.
    pub end: NaiveDateTime,
    /// Appointment has no time of day.
    pub timeless: bool,

    pub exceptions: Vec<NaiveDate>,
    pub description: Option<String>,
    pub note: Option<String>,

    pub alarm: bool,
    pub advance: i32,
    pub advance_units: AdvanceUnits,

    pub repeat_type: RepeatType,
    /// Last day of the repeat; `None` repeats forever.
    pub repeat_end: Option<NaiveDate>,
    pub repeat_frequency: i32,
    pub repeat_weekdays: Weekdays,
    /// Day-of-month code for monthly-by-day repeats, see [`DayOfMonth`].
    pub repeat_day: i32,
    pub repeat_week_start: i32,
}

impl AppointmentRecord {
    /// An appointment filled with defaults at the current local time.
    pub fn new() -> Self {
        Self::filled_at(Local::now().naive_local())
    }

    /// An appointment filled with defaults at `now`.
    pub fn filled_at(now: NaiveDateTime) -> Self {
        let now = truncate_to_minute(now);
        AppointmentRecord {
            meta: RecordMeta::default(),
            begin: now,
            end: now,
            timeless: false,
            exceptions: Vec::new(),
            description: Some(String::new()),
            note: None,
            alarm: false,
            advance: 0,
            advance_units: AdvanceUnits::Minutes,
            repeat_type: RepeatType::None,
            repeat_end: None,
            repeat_frequency: 1,
            repeat_weekdays: Weekdays::default(),
            repeat_day: 0,
            repeat_week_start: 0,
        }
    }

    /// Decode a record payload and attach its database metadata.
    pub fn from_raw(
        contents: Vec<u8>,
        id: RecordId,
        index: usize,
        attributes: u8,
        category: u8,
    ) -> DatebookResult<Self> {
        let mut record = Self::unpack(&contents)?;
        record.meta = RecordMeta::new(contents, id, index, attributes, category)?;
        Ok(record)
    }

    /// Reset every field to its default, keeping the record metadata.
    pub fn fill(&mut self) {
        self.fill_at(Local::now().naive_local());
    }

    /// Reset every field to its default with `now` as begin and end.
    pub fn fill_at(&mut self, now: NaiveDateTime) {
        let meta = std::mem::take(&mut self.meta);
        *self = Self::filled_at(now);
        self.meta = meta;
    }

    /// Alarm lead time, if an alarm is set.
    pub fn alarm_lead(&self) -> Option<Duration> {
        self.alarm.then(|| {
            Duration::minutes(i64::from(self.advance) * self.advance_units.minutes())
        })
    }

    /// Decoded `repeat_day` for monthly-by-day repeats.
    pub fn repeat_day_of_month(&self) -> Option<DayOfMonth> {
        match self.repeat_type {
            RepeatType::MonthlyByDay => DayOfMonth::from_code(self.repeat_day),
            _ => None,
        }
    }

    /// One-line dump of every field, for debugging and logs.
    pub fn describe(&self) -> String {
        let exceptions: Vec<String> = self
            .exceptions
            .iter()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect();

        let repeat_end = self
            .repeat_end
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| NULL.to_string());

        format!(
            "start={}, end={}, note={}, description={}, exceptions=[{}], \
             advance={}, advanceUnits={}, repeatType={}, repeatEnd={}, \
             repeatFrequency={}, repeatWeekStart={}, repeatDay={}, repeatWeekdays={}",
            self.begin.format(DATETIME_FORMAT),
            self.end.format(DATETIME_FORMAT),
            self.note.as_deref().unwrap_or(NULL),
            self.description.as_deref().unwrap_or(NULL),
            exceptions.join(","),
            self.advance,
            self.advance_units,
            self.repeat_type,
            repeat_end,
            self.repeat_frequency,
            self.repeat_week_start,
            self.repeat_day,
            self.repeat_weekdays,
        )
    }
}

impl Default for AppointmentRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AppointmentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

impl PalmRecord for AppointmentRecord {
    fn unpack(data: &[u8]) -> DatebookResult<Self> {
        unpack::unpack_appointment(data)
    }

    fn pack(&self) -> DatebookResult<Vec<u8>> {
        pack::pack_appointment(self)
    }
}

fn truncate_to_minute(t: NaiveDateTime) -> NaiveDateTime {
    let t = t.trunc_subsecs(0);
    t.with_second(0).unwrap_or(t)
}
