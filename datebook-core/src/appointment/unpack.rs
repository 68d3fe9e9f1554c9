//! Decoding of the appointment record payload.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::{AdvanceUnits, AppointmentRecord, RepeatType, Weekdays};
use crate::codec::{NO_DATE, Reader, unpack_date};
use crate::error::{DatebookError, DatebookResult};
use crate::record::RecordMeta;

pub(super) const FLAG_ALARM: u8 = 0x40;
pub(super) const FLAG_REPEAT: u8 = 0x20;
pub(super) const FLAG_NOTE: u8 = 0x10;
pub(super) const FLAG_EXCEPTIONS: u8 = 0x08;
pub(super) const FLAG_DESCRIPTION: u8 = 0x04;

/// Hour/minute pair marking an appointment with no time of day.
pub(super) const NO_TIME: u8 = 0xff;

/// Fixed header: begin time, end time, date, flags, reserved byte.
pub(super) const HEADER_LEN: usize = 8;

pub(super) fn unpack_appointment(data: &[u8]) -> DatebookResult<AppointmentRecord> {
    if data.len() < HEADER_LEN {
        return Err(DatebookError::Truncated {
            offset: 0,
            needed: HEADER_LEN,
            available: data.len(),
        });
    }

    let mut r = Reader::new(data);
    let begin_hour = r.u8()?;
    let begin_minute = r.u8()?;
    let end_hour = r.u8()?;
    let end_minute = r.u8()?;
    let date = r.date()?;
    let flags = r.u8()?;
    r.skip(1)?;

    let timeless = begin_hour == NO_TIME && begin_minute == NO_TIME;
    let (begin, end) = if timeless {
        let midnight = date.and_time(NaiveTime::MIN);
        (midnight, midnight)
    } else {
        (
            at_time(date, begin_hour, begin_minute)?,
            at_time(date, end_hour, end_minute)?,
        )
    };

    let mut record = AppointmentRecord {
        meta: RecordMeta::default(),
        begin,
        end,
        timeless,
        exceptions: Vec::new(),
        description: None,
        note: None,
        alarm: false,
        advance: 0,
        advance_units: AdvanceUnits::Minutes,
        repeat_type: RepeatType::None,
        repeat_end: None,
        repeat_frequency: 0,
        repeat_weekdays: Weekdays::default(),
        repeat_day: 0,
        repeat_week_start: 0,
    };

    if flags & FLAG_ALARM != 0 {
        record.alarm = true;
        record.advance = i32::from(r.i8()?);
        record.advance_units = AdvanceUnits::from_code(r.u8()?)?;
    }

    if flags & FLAG_REPEAT != 0 {
        record.repeat_type = RepeatType::from_code(r.u8()?)?;
        r.skip(1)?;
        let end_word = r.u16()?;
        record.repeat_end = if end_word == NO_DATE {
            None
        } else {
            Some(unpack_date(end_word)?)
        };
        record.repeat_frequency = i32::from(r.u8()?);
        let on = r.u8()?;
        match record.repeat_type {
            RepeatType::Weekly => record.repeat_weekdays = Weekdays::from_mask(on),
            RepeatType::MonthlyByDay => record.repeat_day = i32::from(on),
            _ => {}
        }
        record.repeat_week_start = i32::from(r.u8()?);
        r.skip(1)?;
    }

    if flags & FLAG_EXCEPTIONS != 0 {
        let count = r.u16()?;
        record.exceptions.reserve(usize::from(count));
        for _ in 0..count {
            record.exceptions.push(r.date()?);
        }
    }

    if flags & FLAG_DESCRIPTION != 0 {
        record.description = Some(r.cstring()?);
    }

    if flags & FLAG_NOTE != 0 {
        record.note = Some(r.cstring()?);
    }

    if r.remaining() > 0 {
        tracing::debug!(
            trailing = r.remaining(),
            "ignoring trailing bytes after appointment record"
        );
    }

    tracing::trace!(begin = %record.begin, flags, "unpacked appointment");

    Ok(record)
}

fn at_time(date: NaiveDate, hour: u8, minute: u8) -> DatebookResult<NaiveDateTime> {
    NaiveTime::from_hms_opt(u32::from(hour), u32::from(minute), 0)
        .map(|t| date.and_time(t))
        .ok_or(DatebookError::InvalidTime { hour, minute })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PalmRecord;
    use chrono::Weekday;

    // 2004-03-01 packed: (100 << 9) | (3 << 5) | 1
    const MARCH_1_2004: [u8; 2] = [0xc8, 0x61];

    fn header(flags: u8) -> Vec<u8> {
        let mut buf = vec![9, 30, 10, 15];
        buf.extend_from_slice(&MARCH_1_2004);
        buf.push(flags);
        buf.push(0);
        buf
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn unpack_plain_appointment() {
        let record = unpack_appointment(&header(0)).unwrap();

        assert_eq!(record.begin, date(2004, 3, 1).and_hms_opt(9, 30, 0).unwrap());
        assert_eq!(record.end, date(2004, 3, 1).and_hms_opt(10, 15, 0).unwrap());
        assert!(!record.timeless);
        assert!(!record.alarm);
        assert_eq!(record.repeat_type, RepeatType::None);
        assert_eq!(record.description, None);
        assert_eq!(record.note, None);
        assert!(record.exceptions.is_empty());
    }

    #[test]
    fn unpack_timeless_appointment() {
        let mut buf = header(0);
        buf[..4].copy_from_slice(&[0xff, 0xff, 0xff, 0xff]);

        let record = unpack_appointment(&buf).unwrap();
        assert!(record.timeless);
        assert_eq!(record.begin, date(2004, 3, 1).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(record.end, record.begin);
    }

    #[test]
    fn unpack_all_sections() {
        let mut buf = header(
            FLAG_ALARM | FLAG_REPEAT | FLAG_EXCEPTIONS | FLAG_DESCRIPTION | FLAG_NOTE,
        );
        // alarm: 5 minutes
        buf.extend_from_slice(&[5, 0]);
        // repeat: weekly, forever, every 2 weeks, Mon+Wed, week start 1
        buf.extend_from_slice(&[2, 0, 0xff, 0xff, 2, 0b0000_1010, 1, 0]);
        // exceptions: one date
        buf.extend_from_slice(&[0, 1, 0xc8, 0x68]);
        buf.extend_from_slice(b"Standup\0");
        buf.extend_from_slice(b"Bring notes\0");

        let record = unpack_appointment(&buf).unwrap();

        assert!(record.alarm);
        assert_eq!(record.advance, 5);
        assert_eq!(record.advance_units, AdvanceUnits::Minutes);
        assert_eq!(record.repeat_type, RepeatType::Weekly);
        assert_eq!(record.repeat_end, None);
        assert_eq!(record.repeat_frequency, 2);
        assert!(record.repeat_weekdays.contains(Weekday::Mon));
        assert!(record.repeat_weekdays.contains(Weekday::Wed));
        assert!(!record.repeat_weekdays.contains(Weekday::Tue));
        assert_eq!(record.repeat_week_start, 1);
        assert_eq!(record.repeat_day, 0);
        assert_eq!(record.exceptions, vec![date(2004, 3, 8)]);
        assert_eq!(record.description.as_deref(), Some("Standup"));
        assert_eq!(record.note.as_deref(), Some("Bring notes"));
        assert_eq!(record.pack().unwrap(), buf);
    }

    #[test]
    fn unpack_negative_advance() {
        let mut buf = header(FLAG_ALARM);
        buf.extend_from_slice(&[0xfe, 1]);
        let record = unpack_appointment(&buf).unwrap();
        assert_eq!(record.advance, -2);
        assert_eq!(record.advance_units, AdvanceUnits::Hours);
    }

    #[test]
    fn unpack_monthly_by_day_sets_repeat_day() {
        let mut buf = header(FLAG_REPEAT);
        // third Friday, ends 2004-12-31
        let end = (100u16 << 9) | (12 << 5) | 31;
        buf.extend_from_slice(&[3, 0]);
        buf.extend_from_slice(&end.to_be_bytes());
        buf.extend_from_slice(&[1, 19, 0, 0]);

        let record = unpack_appointment(&buf).unwrap();
        assert_eq!(record.repeat_type, RepeatType::MonthlyByDay);
        assert_eq!(record.repeat_day, 19);
        assert!(record.repeat_weekdays.is_empty());
        assert_eq!(record.repeat_end, Some(date(2004, 12, 31)));
        let dom = record.repeat_day_of_month().unwrap();
        assert_eq!(dom.week, 2);
        assert_eq!(dom.weekday, Weekday::Fri);
        assert_eq!(record.pack().unwrap(), buf);
    }

    #[test]
    fn unpack_short_buffer_is_truncated() {
        let err = unpack_appointment(&[9, 30, 10]).unwrap_err();
        assert!(matches!(
            err,
            DatebookError::Truncated {
                offset: 0,
                needed: 8,
                available: 3
            }
        ));
    }

    #[test]
    fn unpack_missing_flagged_section_is_truncated() {
        let buf = header(FLAG_REPEAT);
        assert!(matches!(
            unpack_appointment(&buf),
            Err(DatebookError::Truncated { offset: 8, .. })
        ));
    }

    #[test]
    fn unpack_unknown_repeat_type() {
        let mut buf = header(FLAG_REPEAT);
        buf.extend_from_slice(&[9, 0, 0xff, 0xff, 1, 0, 0, 0]);
        assert!(matches!(
            unpack_appointment(&buf),
            Err(DatebookError::InvalidRepeatType(9))
        ));
    }

    #[test]
    fn unpack_invalid_time() {
        let mut buf = header(0);
        buf[0] = 25;
        assert!(matches!(
            unpack_appointment(&buf),
            Err(DatebookError::InvalidTime { hour: 25, minute: 30 })
        ));
    }

    #[test]
    fn unpack_unterminated_description() {
        let mut buf = header(FLAG_DESCRIPTION);
        buf.extend_from_slice(b"no terminator");
        assert!(matches!(
            unpack_appointment(&buf),
            Err(DatebookError::UnterminatedString(8))
        ));
    }
}
