//! Application info blocks: category names and Datebook preferences.

use serde::{Deserialize, Serialize};

use crate::codec::{Reader, Writer, decode_text, encode_text};
use crate::error::{DatebookError, DatebookResult};
use crate::record::CATEGORY_COUNT;

/// Size of a category name slot, including its NUL.
pub const CATEGORY_NAME_LEN: usize = 16;

/// Encoded size of [`CategoryAppInfo`].
pub const CATEGORY_APP_INFO_LEN: usize = 2 + CATEGORY_COUNT * CATEGORY_NAME_LEN + CATEGORY_COUNT + 4;

/// Encoded size of [`AppointmentAppInfo`].
pub const APPOINTMENT_APP_INFO_LEN: usize = CATEGORY_APP_INFO_LEN + 2;

/// Category table shared by the built-in Palm applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAppInfo {
    /// Which categories the user renamed.
    pub renamed: [bool; CATEGORY_COUNT],
    pub names: [String; CATEGORY_COUNT],
    pub ids: [u8; CATEGORY_COUNT],
    pub last_unique_id: u8,
}

impl Default for CategoryAppInfo {
    fn default() -> Self {
        let mut names: [String; CATEGORY_COUNT] = Default::default();
        names[0] = "Unfiled".to_string();
        CategoryAppInfo {
            renamed: [false; CATEGORY_COUNT],
            names,
            ids: [0; CATEGORY_COUNT],
            last_unique_id: 0,
        }
    }
}

impl CategoryAppInfo {
    pub fn unpack(r: &mut Reader<'_>) -> DatebookResult<Self> {
        let renamed_bits = r.u16()?;
        let mut renamed = [false; CATEGORY_COUNT];
        for (i, flag) in renamed.iter_mut().enumerate() {
            *flag = renamed_bits & (1 << i) != 0;
        }

        let mut names: [String; CATEGORY_COUNT] = Default::default();
        for name in names.iter_mut() {
            let slot = r.take(CATEGORY_NAME_LEN)?;
            let len = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
            *name = decode_text(&slot[..len]);
        }

        let mut ids = [0u8; CATEGORY_COUNT];
        ids.copy_from_slice(r.take(CATEGORY_COUNT)?);

        let last_unique_id = r.u8()?;
        r.skip(3)?;

        Ok(CategoryAppInfo {
            renamed,
            names,
            ids,
            last_unique_id,
        })
    }

    pub fn pack(&self, w: &mut Writer) -> DatebookResult<()> {
        let renamed_bits = self
            .renamed
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .fold(0u16, |acc, (i, _)| acc | (1 << i));
        w.u16(renamed_bits);

        for name in &self.names {
            let encoded = encode_text(name)?;
            if encoded.len() >= CATEGORY_NAME_LEN {
                return Err(DatebookError::OutOfRange {
                    field: "category name length",
                    value: encoded.len() as i64,
                });
            }
            w.bytes(&encoded);
            w.zeros(CATEGORY_NAME_LEN - encoded.len());
        }

        w.bytes(&self.ids);
        w.u8(self.last_unique_id);
        w.zeros(3);
        Ok(())
    }

    /// Index of the category with this name, ignoring case.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.names
            .iter()
            .position(|n| !n.is_empty() && n.eq_ignore_ascii_case(name))
    }
}

/// Datebook application info block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentAppInfo {
    pub category: CategoryAppInfo,
    /// First day of the week in the week view, 0 = Sunday.
    pub start_of_week: u8,
}

impl AppointmentAppInfo {
    pub fn unpack(data: &[u8]) -> DatebookResult<Self> {
        let mut r = Reader::new(data);
        let category = CategoryAppInfo::unpack(&mut r)?;
        let start_of_week = r.u8()?;
        r.skip(1)?;
        Ok(AppointmentAppInfo {
            category,
            start_of_week,
        })
    }

    pub fn pack(&self) -> DatebookResult<Vec<u8>> {
        let mut w = Writer::new();
        self.category.pack(&mut w)?;
        w.u8(self.start_of_week);
        w.u8(0);
        Ok(w.into_inner())
    }
}
