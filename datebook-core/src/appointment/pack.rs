//! Encoding of the appointment record payload.

use chrono::Timelike;

use super::unpack::{
    FLAG_ALARM, FLAG_DESCRIPTION, FLAG_EXCEPTIONS, FLAG_NOTE, FLAG_REPEAT, NO_TIME,
};
use super::{AppointmentRecord, RepeatType};
use crate::codec::{NO_DATE, Writer, narrow, pack_date};
use crate::error::DatebookResult;

pub(super) fn pack_appointment(record: &AppointmentRecord) -> DatebookResult<Vec<u8>> {
    let description = record.description.as_deref().filter(|s| !s.is_empty());
    let note = record.note.as_deref().filter(|s| !s.is_empty());
    let repeats = record.repeat_type != RepeatType::None;

    let mut flags = 0;
    if record.alarm {
        flags |= FLAG_ALARM;
    }
    if repeats {
        flags |= FLAG_REPEAT;
    }
    if note.is_some() {
        flags |= FLAG_NOTE;
    }
    if !record.exceptions.is_empty() {
        flags |= FLAG_EXCEPTIONS;
    }
    if description.is_some() {
        flags |= FLAG_DESCRIPTION;
    }

    let mut w = Writer::new();

    if record.timeless {
        w.bytes(&[NO_TIME; 4]);
    } else {
        w.u8(record.begin.hour() as u8);
        w.u8(record.begin.minute() as u8);
        w.u8(record.end.hour() as u8);
        w.u8(record.end.minute() as u8);
    }
    w.date(record.begin.date())?;
    w.u8(flags);
    w.u8(0);

    if record.alarm {
        w.i8(narrow("advance", record.advance)?);
        w.u8(record.advance_units.code());
    }

    if repeats {
        w.u8(record.repeat_type.code());
        w.u8(0);
        match record.repeat_end {
            Some(end) => w.u16(pack_date(end)?),
            None => w.u16(NO_DATE),
        }
        w.u8(narrow("repeat frequency", record.repeat_frequency)?);
        let on = match record.repeat_type {
            RepeatType::Weekly => record.repeat_weekdays.mask(),
            RepeatType::MonthlyByDay => narrow("repeat day", record.repeat_day)?,
            _ => 0,
        };
        w.u8(on);
        w.u8(narrow("repeat week start", record.repeat_week_start)?);
        w.u8(0);
    }

    if !record.exceptions.is_empty() {
        let count: u16 = narrow("exception count", record.exceptions.len() as i64)?;
        w.u16(count);
        for date in &record.exceptions {
            w.date(*date)?;
        }
    }

    if let Some(text) = description {
        w.cstring(text)?;
    }

    if let Some(text) = note {
        w.cstring(text)?;
    }

    tracing::trace!(begin = %record.begin, flags, len = w.len(), "packed appointment");

    Ok(w.into_inner())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::appointment::{AdvanceUnits, AppointmentRecord, RepeatType, Weekdays};
    use crate::error::DatebookError;
    use crate::record::PalmRecord;

    fn at(h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2004, 3, 1)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn meeting() -> AppointmentRecord {
        let mut record = AppointmentRecord::filled_at(at(9, 30));
        record.end = at(10, 15);
        record
    }

    #[test]
    fn pack_minimal_record_is_header_only() {
        let bytes = meeting().pack().unwrap();
        assert_eq!(bytes, vec![9, 30, 10, 15, 0xc8, 0x61, 0, 0]);
    }

    #[test]
    fn pack_timeless_uses_marker() {
        let mut record = meeting();
        record.timeless = true;
        let bytes = record.pack().unwrap();
        assert_eq!(&bytes[..4], &[0xff; 4]);
    }

    #[test]
    fn pack_then_unpack_full_record() {
        let mut record = meeting();
        record.description = Some("Design review".to_string());
        record.note = Some("Room 4, bring the Visor".to_string());
        record.alarm = true;
        record.advance = 1;
        record.advance_units = AdvanceUnits::Days;
        record.repeat_type = RepeatType::Weekly;
        record.repeat_frequency = 2;
        record.repeat_weekdays = Weekdays::from_mask(0b0100_0010);
        record.repeat_week_start = 1;
        record.repeat_end = NaiveDate::from_ymd_opt(2004, 12, 27);
        record.exceptions = vec![
            NaiveDate::from_ymd_opt(2004, 3, 15).unwrap(),
            NaiveDate::from_ymd_opt(2004, 5, 10).unwrap(),
        ];

        let bytes = record.pack().unwrap();
        let decoded = AppointmentRecord::unpack(&bytes).unwrap();

        assert_eq!(decoded, record);
        assert_eq!(decoded.pack().unwrap(), bytes);
    }

    #[test]
    fn pack_omits_empty_text_sections() {
        let mut record = meeting();
        record.description = Some(String::new());
        record.note = Some(String::new());
        let bytes = record.pack().unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(bytes[6], 0);
    }

    #[test]
    fn pack_monthly_by_day_writes_repeat_day() {
        let mut record = meeting();
        record.repeat_type = RepeatType::MonthlyByDay;
        record.repeat_day = 30;
        record.repeat_weekdays = Weekdays::from_mask(0x7f);
        let bytes = record.pack().unwrap();
        // header, then type, reserved, end, frequency, on
        assert_eq!(bytes[8], 3);
        assert_eq!(&bytes[10..12], &[0xff, 0xff]);
        assert_eq!(bytes[13], 30);
    }

    #[test]
    fn pack_non_weekly_ignores_weekday_mask() {
        let mut record = meeting();
        record.repeat_type = RepeatType::Daily;
        record.repeat_weekdays = Weekdays::from_mask(0x7f);
        let bytes = record.pack().unwrap();
        assert_eq!(bytes[13], 0);
    }

    #[test]
    fn pack_rejects_out_of_range_advance() {
        let mut record = meeting();
        record.alarm = true;
        record.advance = 500;
        assert!(matches!(
            record.pack(),
            Err(DatebookError::OutOfRange {
                field: "advance",
                value: 500
            })
        ));
    }

    #[test]
    fn pack_ignores_advance_without_alarm() {
        let mut record = meeting();
        record.advance = 500;
        assert!(record.pack().is_ok());
    }

    #[test]
    fn pack_rejects_unencodable_note() {
        let mut record = meeting();
        record.note = Some("会議".to_string());
        assert!(matches!(record.pack(), Err(DatebookError::Unencodable(_))));
    }

    #[test]
    fn pack_rejects_dates_outside_palm_range() {
        let mut record = meeting();
        record.begin = NaiveDate::from_ymd_opt(2040, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert!(matches!(
            record.pack(),
            Err(DatebookError::OutOfRange { field: "year", .. })
        ));
    }
}
