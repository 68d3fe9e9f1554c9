use std::path::Path;

use anyhow::Result;

use super::load_datebook;

pub fn run(db: &Path) -> Result<()> {
    let datebook = load_datebook(db)?;

    let json = serde_json::json!({
        "database": datebook.header,
        "app_info": datebook.app_info,
        "appointments": datebook.appointments,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);

    Ok(())
}
