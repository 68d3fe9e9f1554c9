//! Low-level helpers shared by the record and database codecs.
//!
//! Palm OS stores every multi-byte integer big-endian, dates as a packed
//! 16-bit word and text as NUL-terminated Windows-1252.

use chrono::{Datelike, NaiveDate};
use encoding_rs::WINDOWS_1252;

use crate::error::{DatebookError, DatebookResult};

/// First year representable by a packed date (7 bits of years since 1904).
pub const PALM_EPOCH_YEAR: i32 = 1904;

/// Last year representable by a packed date.
pub const PALM_MAX_YEAR: i32 = PALM_EPOCH_YEAR + 0x7f;

/// Packed date value meaning "no date" (e.g. a repeat that never ends).
pub const NO_DATE: u16 = 0xffff;

/// Bounds-checked big-endian reader over a record buffer.
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Take the next `n` bytes, failing if the buffer is too short.
    pub fn take(&mut self, n: usize) -> DatebookResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(DatebookError::Truncated {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn skip(&mut self, n: usize) -> DatebookResult<()> {
        self.take(n).map(|_| ())
    }

    pub fn u8(&mut self) -> DatebookResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn i8(&mut self) -> DatebookResult<i8> {
        Ok(self.u8()? as i8)
    }

    pub fn u16(&mut self) -> DatebookResult<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn u32(&mut self) -> DatebookResult<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a packed date word.
    pub fn date(&mut self) -> DatebookResult<NaiveDate> {
        unpack_date(self.u16()?)
    }

    /// Read a NUL-terminated string and consume its terminator.
    pub fn cstring(&mut self) -> DatebookResult<String> {
        let rest = &self.data[self.pos..];
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(DatebookError::UnterminatedString(self.pos))?;
        let text = decode_text(&rest[..len]);
        self.pos += len + 1;
        Ok(text)
    }
}

/// Growable big-endian writer.
#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn i8(&mut self, v: i8) {
        self.buf.push(v as u8);
    }

    pub fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }

    pub fn zeros(&mut self, n: usize) {
        self.buf.resize(self.buf.len() + n, 0);
    }

    pub fn date(&mut self, date: NaiveDate) -> DatebookResult<()> {
        self.u16(pack_date(date)?);
        Ok(())
    }

    /// Write text followed by a NUL terminator.
    pub fn cstring(&mut self, text: &str) -> DatebookResult<()> {
        let encoded = encode_text(text)?;
        self.buf.extend_from_slice(&encoded);
        self.buf.push(0);
        Ok(())
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Decode a packed date: `(year - 1904) << 9 | month << 5 | day`.
pub fn unpack_date(word: u16) -> DatebookResult<NaiveDate> {
    let year = PALM_EPOCH_YEAR + i32::from(word >> 9);
    let month = u32::from((word >> 5) & 0x0f);
    let day = u32::from(word & 0x1f);
    NaiveDate::from_ymd_opt(year, month, day).ok_or(DatebookError::InvalidDate(word))
}

/// Encode a date into its packed 16-bit form.
pub fn pack_date(date: NaiveDate) -> DatebookResult<u16> {
    let year = date.year();
    if !(PALM_EPOCH_YEAR..=PALM_MAX_YEAR).contains(&year) {
        return Err(DatebookError::OutOfRange {
            field: "year",
            value: i64::from(year),
        });
    }
    let years = (year - PALM_EPOCH_YEAR) as u16;
    Ok((years << 9) | ((date.month() as u16) << 5) | date.day() as u16)
}

/// Decode device text. Windows-1252 maps every byte, so this never fails.
pub fn decode_text(bytes: &[u8]) -> String {
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    text.into_owned()
}

/// Encode text for the device, rejecting characters Windows-1252 lacks
/// and embedded NULs.
pub fn encode_text(text: &str) -> DatebookResult<Vec<u8>> {
    if text.contains('\0') {
        return Err(DatebookError::Unencodable(text.to_string()));
    }
    let (bytes, _, had_errors) = WINDOWS_1252.encode(text);
    if had_errors {
        return Err(DatebookError::Unencodable(text.to_string()));
    }
    Ok(bytes.into_owned())
}

/// Narrow an integer field to its on-wire width.
pub fn narrow<T, U>(field: &'static str, value: T) -> DatebookResult<U>
where
    T: Copy + Into<i64>,
    U: TryFrom<T>,
{
    U::try_from(value).map_err(|_| DatebookError::OutOfRange {
        field,
        value: value.into(),
    })
}
