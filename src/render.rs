//! Terminal rendering for datebook types.
//!
//! Extension traits that add colored output to datebook-core types using
//! owo_colors.

use datebook_core::pdb::DatabaseHeader;
use datebook_core::{AppointmentRecord, RepeatType};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for AppointmentRecord {
    fn render(&self) -> String {
        let date = self.begin.format("%a %Y-%m-%d").to_string();
        let time = if self.timeless {
            "all day".to_string()
        } else {
            format!("{}-{}", self.begin.format("%H:%M"), self.end.format("%H:%M"))
        };
        let title = self
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or("(no description)");

        let mut line = format!(
            "{:>4}  {}  {:<11}  {}",
            self.meta.index,
            date,
            time.dimmed(),
            title
        );
        if self.repeat_type != RepeatType::None {
            line.push_str(&format!("  {}", self.repeat_type.to_string().cyan()));
        }
        if self.alarm {
            line.push_str(&format!("  {}", "alarm".yellow()));
        }
        if self.meta.attributes.is_secret() {
            line.push_str(&format!("  {}", "private".red()));
        }
        line
    }
}

impl Render for DatabaseHeader {
    fn render(&self) -> String {
        let modified = self
            .modified
            .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());
        format!("📅 {} {}", self.name.bold(), format!("(modified {})", modified).dimmed())
    }
}
