use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;

use super::load_datebook;
use crate::render::Render;

pub fn run(db: &Path) -> Result<()> {
    let datebook = load_datebook(db)?;

    println!("{}", datebook.header.render());

    if datebook.appointments.is_empty() {
        println!("   {}", "No appointments.".dimmed());
        return Ok(());
    }

    let mut appointments: Vec<_> = datebook.appointments.iter().collect();
    appointments.sort_by_key(|a| a.begin);

    for appointment in appointments {
        let category = datebook.category_name(appointment);
        if appointment.meta.category == 0 || category.is_empty() {
            println!("{}", appointment.render());
        } else {
            println!("{}  {}", appointment.render(), format!("[{}]", category).dimmed());
        }
    }

    Ok(())
}
