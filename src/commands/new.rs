use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use datebook_core::pdb::{Datebook, PalmDatabase};
use datebook_core::{AppointmentRecord, PalmRecord, RecordAttributes};
use owo_colors::OwoColorize;

/// Field values for a new appointment, as given on the command line.
pub struct NewArgs {
    pub start: String,
    pub end: Option<String>,
    pub description: Option<String>,
    pub note: Option<String>,
    pub alarm: Option<i32>,
}

/// Pack the appointment and write it as a raw record file.
pub fn write_record(args: NewArgs, out: &Path) -> Result<()> {
    let record = build(args, Local::now().naive_local())?;
    let bytes = record.pack()?;

    std::fs::write(out, &bytes).with_context(|| format!("Failed to write {}", out.display()))?;

    println!(
        "{}",
        format!("  Wrote {} bytes to {}", bytes.len(), out.display()).green()
    );
    Ok(())
}

/// Append the appointment to a database, creating the database if needed.
///
/// Works on the raw record list so deleted records, records that do not decode
/// and the sort info block are written back as they were read.
pub fn append_to_database(args: NewArgs, db: &Path) -> Result<()> {
    let now = Local::now().naive_local();
    let record = build(args, now)?;

    let mut database = if db.exists() {
        let database = PalmDatabase::read(db)
            .with_context(|| format!("Failed to read {}", db.display()))?;
        if !database.header.is_datebook() {
            anyhow::bail!(
                "{} is not a Datebook database (creator {:?})",
                db.display(),
                String::from_utf8_lossy(&database.header.creator)
            );
        }
        database
    } else {
        tracing::info!(path = %db.display(), "creating new database");
        Datebook::new(now).to_database()?
    };

    let id = database.append(&record, RecordAttributes::default(), 0, now)?;
    database
        .write(db)
        .with_context(|| format!("Failed to write {}", db.display()))?;

    let title = record.description.unwrap_or_default();
    println!("{}", format!("  Created: {} ({})", title, id).green());
    Ok(())
}

fn build(args: NewArgs, now: NaiveDateTime) -> Result<AppointmentRecord> {
    let mut record = AppointmentRecord::filled_at(now);

    match parse_start(&args.start)? {
        Start::Date(date) => {
            record.timeless = true;
            record.begin = date.and_time(NaiveTime::MIN);
            record.end = record.begin;
        }
        Start::DateTime(dt) => {
            record.begin = dt;
            record.end = match &args.end {
                Some(end) => parse_end(end, dt)?,
                None => dt,
            };
        }
    }

    if args.end.is_some() && record.timeless {
        anyhow::bail!("--end cannot be used with a date-only --start");
    }

    record.description = args.description.or(Some(String::new()));
    record.note = args.note;

    if let Some(minutes) = args.alarm {
        record.alarm = true;
        record.advance = minutes;
    }

    Ok(record)
}

#[derive(Debug, PartialEq)]
enum Start {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

fn parse_start(s: &str) -> Result<Start> {
    let s = s.trim();
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Start::DateTime(dt));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(Start::Date)
        .map_err(|_| {
            anyhow::anyhow!(
                "Invalid start '{}'. Expected YYYY-MM-DD or YYYY-MM-DDTHH:MM",
                s
            )
        })
}

/// End is a time on the start's day, or a full date/time on that same day.
fn parse_end(s: &str, start: NaiveDateTime) -> Result<NaiveDateTime> {
    let s = s.trim();
    let end = match NaiveTime::parse_from_str(s, "%H:%M") {
        Ok(time) => start.date().and_time(time),
        Err(_) => DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
            .ok_or_else(|| anyhow::anyhow!("Invalid end '{}'. Expected HH:MM", s))?,
    };

    if end.date() != start.date() {
        anyhow::bail!("Appointments must end on the day they start");
    }
    if end < start {
        anyhow::bail!("End {} is before start {}", end.format("%H:%M"), start.format("%H:%M"));
    }
    Ok(end)
}
