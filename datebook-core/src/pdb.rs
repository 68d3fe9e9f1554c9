//! Palm database (`.pdb`) container.
//!
//! A PDB file is the desktop form of a device database: a fixed header, a
//! list of record entries (offset, attributes, unique id), an optional
//! application info block and the record payloads laid end to end.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::app_info::AppointmentAppInfo;
use crate::appointment::AppointmentRecord;
use crate::codec::{Reader, Writer, decode_text, encode_text};
use crate::error::{DatebookError, DatebookResult};
use crate::record::{PalmRecord, RecordAttributes, RecordId, RecordMeta};

pub const HEADER_LEN: usize = 78;
pub const RECORD_ENTRY_LEN: usize = 8;
const NAME_LEN: usize = 32;
/// Gap between the record list and the first data block.
const LIST_PADDING: usize = 2;

/// Seconds between 1904-01-01 and 1970-01-01.
const PALM_EPOCH_OFFSET: i64 = 2_082_844_800;

/// Database attribute marking a resource (`.prc`) database.
const ATTR_RESOURCE: u16 = 0x0001;

pub const DATEBOOK_TYPE: [u8; 4] = *b"DATA";
pub const DATEBOOK_CREATOR: [u8; 4] = *b"date";
pub const DATEBOOK_NAME: &str = "DatebookDB";

/// Database header fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseHeader {
    pub name: String,
    pub attributes: u16,
    pub version: u16,
    pub created: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>,
    pub backed_up: Option<NaiveDateTime>,
    pub modification_number: u32,
    pub type_code: [u8; 4],
    pub creator: [u8; 4],
    pub unique_id_seed: u32,
}

impl DatabaseHeader {
    /// Header for a new, empty Datebook database.
    pub fn datebook(now: NaiveDateTime) -> Self {
        DatabaseHeader {
            name: DATEBOOK_NAME.to_string(),
            attributes: 0,
            version: 0,
            created: Some(now),
            modified: Some(now),
            backed_up: None,
            modification_number: 0,
            type_code: DATEBOOK_TYPE,
            creator: DATEBOOK_CREATOR,
            unique_id_seed: 0,
        }
    }

    pub fn is_datebook(&self) -> bool {
        self.type_code == DATEBOOK_TYPE && self.creator == DATEBOOK_CREATOR
    }
}

/// One record as stored in the database, payload still encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub id: RecordId,
    pub attributes: RecordAttributes,
    pub category: u8,
    pub data: Vec<u8>,
}

/// A parsed record database.
#[derive(Debug, Clone, PartialEq)]
pub struct PalmDatabase {
    pub header: DatabaseHeader,
    pub app_info: Option<Vec<u8>>,
    pub sort_info: Option<Vec<u8>>,
    pub records: Vec<RawRecord>,
}

impl PalmDatabase {
    pub fn read(path: &Path) -> DatebookResult<Self> {
        let bytes = std::fs::read(path)?;
        tracing::debug!(path = %path.display(), len = bytes.len(), "reading database");
        Self::parse(&bytes)
    }

    pub fn write(&self, path: &Path) -> DatebookResult<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, &bytes)?;
        tracing::debug!(path = %path.display(), len = bytes.len(), "wrote database");
        Ok(())
    }

    pub fn parse(bytes: &[u8]) -> DatebookResult<Self> {
        let mut r = Reader::new(bytes);

        let name_slot = r.take(NAME_LEN)?;
        let name_len = name_slot.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        let name = decode_text(&name_slot[..name_len]);
        let attributes = r.u16()?;
        if attributes & ATTR_RESOURCE != 0 {
            return Err(DatebookError::Pdb(format!(
                "'{}' is a resource database",
                name
            )));
        }
        let version = r.u16()?;
        let created = from_palm_seconds(r.u32()?);
        let modified = from_palm_seconds(r.u32()?);
        let backed_up = from_palm_seconds(r.u32()?);
        let modification_number = r.u32()?;
        let app_info_offset = r.u32()? as usize;
        let sort_info_offset = r.u32()? as usize;
        let mut type_code = [0u8; 4];
        type_code.copy_from_slice(r.take(4)?);
        let mut creator = [0u8; 4];
        creator.copy_from_slice(r.take(4)?);
        let unique_id_seed = r.u32()?;
        let next_record_list = r.u32()?;
        if next_record_list != 0 {
            tracing::warn!(next_record_list, "chained record lists are not supported; ignoring");
        }
        let count = usize::from(r.u16()?);

        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let offset = r.u32()? as usize;
            let attr = r.u8()?;
            let id_bytes = r.take(3)?;
            let id = RecordId::from_bytes([id_bytes[0], id_bytes[1], id_bytes[2]]);
            entries.push((offset, attr, id));
        }

        let data_start = r.position();
        let offsets: Vec<usize> = entries.iter().map(|(offset, _, _)| *offset).collect();
        let check_offset = |what: &str, start: usize| -> DatebookResult<()> {
            if start < data_start || start > bytes.len() {
                return Err(DatebookError::Pdb(format!(
                    "{} offset {} outside data area {}..{}",
                    what,
                    start,
                    data_start,
                    bytes.len()
                )));
            }
            Ok(())
        };

        for (index, pair) in offsets.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(DatebookError::Pdb(format!(
                    "record {} offset {} is before previous record at {}",
                    index + 1,
                    pair[1],
                    pair[0]
                )));
            }
        }

        // The info blocks end where the next block begins.
        let mut boundaries = offsets.clone();
        boundaries.extend([app_info_offset, sort_info_offset].into_iter().filter(|&o| o != 0));
        let info_block = |what: &str, start: usize| -> DatebookResult<Vec<u8>> {
            check_offset(what, start)?;
            let end = boundaries
                .iter()
                .copied()
                .filter(|&b| b > start && b <= bytes.len())
                .min()
                .unwrap_or(bytes.len());
            Ok(bytes[start..end].to_vec())
        };

        let app_info = match app_info_offset {
            0 => None,
            offset => Some(info_block("app info", offset)?),
        };
        let sort_info = match sort_info_offset {
            0 => None,
            offset => Some(info_block("sort info", offset)?),
        };

        let mut records = Vec::with_capacity(count);
        for (index, (offset, attr, id)) in entries.into_iter().enumerate() {
            check_offset("record", offset)?;
            let end = offsets
                .get(index + 1)
                .map_or(bytes.len(), |&next| next.min(bytes.len()));
            records.push(RawRecord {
                id,
                attributes: RecordAttributes::from_bits(attr),
                category: attr & 0x0f,
                data: bytes[offset..end].to_vec(),
            });
        }

        tracing::debug!(name = %name, records = records.len(), "parsed database");

        Ok(PalmDatabase {
            header: DatabaseHeader {
                name,
                attributes,
                version,
                created,
                modified,
                backed_up,
                modification_number,
                type_code,
                creator,
                unique_id_seed,
            },
            app_info,
            sort_info,
            records,
        })
    }

    /// Pack `record` and append it with the next free record id.
    ///
    /// Existing records, including deleted ones and payloads this crate cannot
    /// decode, and both info blocks are left untouched.
    pub fn append<R: PalmRecord>(
        &mut self,
        record: &R,
        attributes: RecordAttributes,
        category: u8,
        now: NaiveDateTime,
    ) -> DatebookResult<RecordId> {
        let data = record.pack()?;
        let id = self.next_record_id()?;
        self.records.push(RawRecord {
            id,
            attributes,
            category: category & 0x0f,
            data,
        });
        self.header.modified = Some(now);
        self.header.modification_number = self.header.modification_number.wrapping_add(1);
        tracing::debug!(id = %id, records = self.records.len(), "appended record");
        Ok(id)
    }

    /// One past the highest record id in use.
    pub fn next_record_id(&self) -> DatebookResult<RecordId> {
        let next = self
            .records
            .iter()
            .map(|r| r.id.value())
            .max()
            .map_or(1, |max| max + 1);
        RecordId::new(next)
    }

    pub fn to_bytes(&self) -> DatebookResult<Vec<u8>> {
        let count: u16 = self.records.len().try_into().map_err(|_| DatebookError::OutOfRange {
            field: "record count",
            value: self.records.len() as i64,
        })?;

        let mut offset = HEADER_LEN + RECORD_ENTRY_LEN * self.records.len() + LIST_PADDING;
        let app_info_offset = match &self.app_info {
            Some(block) => {
                let at = offset;
                offset += block.len();
                at
            }
            None => 0,
        };
        let sort_info_offset = match &self.sort_info {
            Some(block) => {
                let at = offset;
                offset += block.len();
                at
            }
            None => 0,
        };

        let mut w = Writer::new();
        let name = encode_text(&self.header.name)?;
        if name.len() >= NAME_LEN {
            return Err(DatebookError::OutOfRange {
                field: "database name length",
                value: name.len() as i64,
            });
        }
        w.bytes(&name);
        w.zeros(NAME_LEN - name.len());
        w.u16(self.header.attributes);
        w.u16(self.header.version);
        w.u32(to_palm_seconds(self.header.created)?);
        w.u32(to_palm_seconds(self.header.modified)?);
        w.u32(to_palm_seconds(self.header.backed_up)?);
        w.u32(self.header.modification_number);
        w.u32(file_offset(app_info_offset)?);
        w.u32(file_offset(sort_info_offset)?);
        w.bytes(&self.header.type_code);
        w.bytes(&self.header.creator);
        w.u32(self.header.unique_id_seed);
        w.u32(0);
        w.u16(count);

        for record in &self.records {
            w.u32(file_offset(offset)?);
            w.u8(record.attributes.bits() | (record.category & 0x0f));
            w.bytes(&record.id.to_bytes());
            offset += record.data.len();
        }
        w.zeros(LIST_PADDING);

        if let Some(block) = &self.app_info {
            w.bytes(block);
        }
        if let Some(block) = &self.sort_info {
            w.bytes(block);
        }
        for record in &self.records {
            w.bytes(&record.data);
        }

        Ok(w.into_inner())
    }
}

/// A decoded Datebook database.
#[derive(Debug, Clone, PartialEq)]
pub struct Datebook {
    pub header: DatabaseHeader,
    pub app_info: AppointmentAppInfo,
    pub appointments: Vec<AppointmentRecord>,
}

impl Datebook {
    pub fn new(now: NaiveDateTime) -> Self {
        Datebook {
            header: DatabaseHeader::datebook(now),
            app_info: AppointmentAppInfo::default(),
            appointments: Vec::new(),
        }
    }

    pub fn read(path: &Path) -> DatebookResult<Self> {
        Self::from_database(PalmDatabase::read(path)?)
    }

    pub fn write(&self, path: &Path) -> DatebookResult<()> {
        self.to_database()?.write(path)
    }

    /// Decode every live record. Deleted records and records that fail to
    /// decode are skipped with a warning.
    pub fn from_database(db: PalmDatabase) -> DatebookResult<Self> {
        if !db.header.is_datebook() {
            return Err(DatebookError::Pdb(format!(
                "'{}' is not a Datebook database (type {:?}, creator {:?})",
                db.header.name,
                String::from_utf8_lossy(&db.header.type_code),
                String::from_utf8_lossy(&db.header.creator),
            )));
        }

        let app_info = match &db.app_info {
            Some(block) => AppointmentAppInfo::unpack(block)?,
            None => AppointmentAppInfo::default(),
        };

        let mut appointments = Vec::with_capacity(db.records.len());
        for (index, raw) in db.records.into_iter().enumerate() {
            if raw.attributes.is_deleted() {
                tracing::debug!(index, id = %raw.id, "skipping deleted record");
                continue;
            }
            match AppointmentRecord::from_raw(
                raw.data,
                raw.id,
                index,
                raw.attributes.bits(),
                raw.category,
            ) {
                Ok(appointment) => appointments.push(appointment),
                Err(e) => {
                    tracing::warn!(index, id = %raw.id, error = %e, "skipping undecodable record");
                }
            }
        }

        Ok(Datebook {
            header: db.header,
            app_info,
            appointments,
        })
    }

    pub fn to_database(&self) -> DatebookResult<PalmDatabase> {
        let records = self
            .appointments
            .iter()
            .map(|a| {
                Ok(RawRecord {
                    id: a.meta.id,
                    attributes: a.meta.attributes,
                    category: a.meta.category,
                    data: a.pack()?,
                })
            })
            .collect::<DatebookResult<Vec<_>>>()?;

        Ok(PalmDatabase {
            header: self.header.clone(),
            app_info: Some(self.app_info.pack()?),
            sort_info: None,
            records,
        })
    }

    /// Add an appointment, assigning it the next free record id.
    pub fn push(&mut self, mut appointment: AppointmentRecord) -> DatebookResult<RecordId> {
        let next = self
            .appointments
            .iter()
            .map(|a| a.meta.id.value())
            .max()
            .map_or(1, |max| max + 1);
        let id = RecordId::new(next)?;
        let index = self
            .appointments
            .iter()
            .map(|a| a.meta.index + 1)
            .max()
            .unwrap_or(0);
        appointment.meta = RecordMeta {
            id,
            index,
            contents: None,
            ..appointment.meta
        };
        self.appointments.push(appointment);
        Ok(id)
    }

    /// Name of the category an appointment is filed under.
    pub fn category_name(&self, appointment: &AppointmentRecord) -> &str {
        self.app_info
            .category
            .names
            .get(usize::from(appointment.meta.category))
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn from_palm_seconds(seconds: u32) -> Option<NaiveDateTime> {
    if seconds == 0 {
        return None;
    }
    DateTime::from_timestamp(i64::from(seconds) - PALM_EPOCH_OFFSET, 0).map(|dt| dt.naive_utc())
}

fn to_palm_seconds(time: Option<NaiveDateTime>) -> DatebookResult<u32> {
    let Some(time) = time else {
        return Ok(0);
    };
    let seconds = time.and_utc().timestamp() + PALM_EPOCH_OFFSET;
    u32::try_from(seconds).map_err(|_| DatebookError::OutOfRange {
        field: "database timestamp",
        value: seconds,
    })
}

fn file_offset(offset: usize) -> DatebookResult<u32> {
    u32::try_from(offset).map_err(|_| DatebookError::OutOfRange {
        field: "file offset",
        value: offset as i64,
    })
}
