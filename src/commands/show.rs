use std::path::Path;

use anyhow::Result;

use super::load_datebook;

pub fn run(db: &Path, index: usize) -> Result<()> {
    let datebook = load_datebook(db)?;

    let Some(appointment) = datebook.appointments.iter().find(|a| a.meta.index == index) else {
        anyhow::bail!("No appointment at index {} in {}", index, db.display());
    };

    println!("id:         {}", appointment.meta.id);
    println!("attributes: {}", appointment.meta.attributes);
    println!(
        "category:   {} ({})",
        appointment.meta.category,
        datebook.category_name(appointment)
    );
    if let Some(lead) = appointment.alarm_lead() {
        println!("alarm:      {} minutes before", lead.num_minutes());
    }
    if let Some(day) = appointment.repeat_day_of_month() {
        println!("repeats on: {} of the month", day);
    }
    println!();
    println!("{}", appointment.describe());

    Ok(())
}
