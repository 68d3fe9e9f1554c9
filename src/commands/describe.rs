use std::path::Path;

use anyhow::{Context, Result};
use datebook_core::{AppointmentRecord, PalmRecord};

pub fn run(file: &Path) -> Result<()> {
    let bytes =
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let record = AppointmentRecord::unpack(&bytes)
        .with_context(|| format!("{} is not a valid appointment record", file.display()))?;

    println!("{}", record.describe());
    Ok(())
}
