//! Enumerations and small value types used by appointment records.

use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::{DatebookError, DatebookResult};

/// Unit of an alarm's advance warning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvanceUnits {
    #[default]
    Minutes,
    Hours,
    Days,
}

impl AdvanceUnits {
    pub fn code(self) -> u8 {
        match self {
            AdvanceUnits::Minutes => 0,
            AdvanceUnits::Hours => 1,
            AdvanceUnits::Days => 2,
        }
    }

    pub fn from_code(code: u8) -> DatebookResult<Self> {
        match code {
            0 => Ok(AdvanceUnits::Minutes),
            1 => Ok(AdvanceUnits::Hours),
            2 => Ok(AdvanceUnits::Days),
            other => Err(DatebookError::InvalidAdvanceUnits(other)),
        }
    }

    /// Length of one unit in minutes.
    pub fn minutes(self) -> i64 {
        match self {
            AdvanceUnits::Minutes => 1,
            AdvanceUnits::Hours => 60,
            AdvanceUnits::Days => 24 * 60,
        }
    }
}

impl fmt::Display for AdvanceUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdvanceUnits::Minutes => "Minutes",
            AdvanceUnits::Hours => "Hours",
            AdvanceUnits::Days => "Days",
        };
        write!(f, "{}", name)
    }
}

/// How an appointment recurs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatType {
    #[default]
    None,
    Daily,
    Weekly,
    /// e.g. "second Tuesday of every month"; anchored by `repeat_day`.
    MonthlyByDay,
    /// Same day-of-month as the start date.
    MonthlyByDate,
    Yearly,
}

impl RepeatType {
    pub fn code(self) -> u8 {
        match self {
            RepeatType::None => 0,
            RepeatType::Daily => 1,
            RepeatType::Weekly => 2,
            RepeatType::MonthlyByDay => 3,
            RepeatType::MonthlyByDate => 4,
            RepeatType::Yearly => 5,
        }
    }

    pub fn from_code(code: u8) -> DatebookResult<Self> {
        match code {
            0 => Ok(RepeatType::None),
            1 => Ok(RepeatType::Daily),
            2 => Ok(RepeatType::Weekly),
            3 => Ok(RepeatType::MonthlyByDay),
            4 => Ok(RepeatType::MonthlyByDate),
            5 => Ok(RepeatType::Yearly),
            other => Err(DatebookError::InvalidRepeatType(other)),
        }
    }
}

impl fmt::Display for RepeatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RepeatType::None => "None",
            RepeatType::Daily => "Daily",
            RepeatType::Weekly => "Weekly",
            RepeatType::MonthlyByDay => "MonthlyByDay",
            RepeatType::MonthlyByDate => "MonthlyByDate",
            RepeatType::Yearly => "Yearly",
        };
        write!(f, "{}", name)
    }
}

/// Weekday set for weekly repeats. Index 0 is Sunday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weekdays(pub [bool; 7]);

impl Weekdays {
    pub fn from_mask(mask: u8) -> Self {
        let mut days = [false; 7];
        for (i, day) in days.iter_mut().enumerate() {
            *day = mask & (1 << i) != 0;
        }
        Weekdays(days)
    }

    pub fn mask(&self) -> u8 {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .fold(0, |acc, (i, _)| acc | (1 << i))
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0[day.num_days_from_sunday() as usize]
    }

    pub fn set(&mut self, day: Weekday, on: bool) {
        self.0[day.num_days_from_sunday() as usize] = on;
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|on| !on)
    }
}

impl fmt::Display for Weekdays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self.0.iter().map(|b| b.to_string()).collect();
        write!(f, "[{}]", items.join(","))
    }
}

/// Decoded form of the `repeat_day` code used by monthly-by-day repeats.
///
/// Codes run week-major: 0 is the first Sunday, 6 the first Saturday,
/// 28..=34 the last Sunday..Saturday of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayOfMonth {
    /// 0..=3 for first..fourth; `LAST_WEEK` for the last week.
    pub week: u8,
    pub weekday: Weekday,
}

impl DayOfMonth {
    pub const LAST_WEEK: u8 = 4;

    pub fn from_code(code: i32) -> Option<Self> {
        if !(0..35).contains(&code) {
            return None;
        }
        let weekday = weekday_from_sunday((code % 7) as u8)?;
        Some(DayOfMonth {
            week: (code / 7) as u8,
            weekday,
        })
    }

    pub fn code(self) -> i32 {
        i32::from(self.week) * 7 + self.weekday.num_days_from_sunday() as i32
    }
}

impl fmt::Display for DayOfMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let week = match self.week {
            0 => "first",
            1 => "second",
            2 => "third",
            3 => "fourth",
            _ => "last",
        };
        write!(f, "{} {}", week, self.weekday)
    }
}

fn weekday_from_sunday(n: u8) -> Option<Weekday> {
    match n {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}
