use crate::output::is_quiet;
use crate::ui::{theme, Icons};
use crate::EntityKind;
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::SCHOOL, text.style(theme().header.clone()));
}

pub fn status(icon: &str, label: &str, value: &str) {
    println!("{} {}: {}", icon, label.style(theme().dim.clone()), value);
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

/// `teacher #3`, styled
pub fn entity(kind: EntityKind, id: i64) -> String {
    format!("{} #{}", kind, id).style(theme().entity.clone()).to_string()
}

pub fn deleted(kind: EntityKind, id: i64, impact: u64) {
    println!(
        "{} Deleted {} ({} dependent row(s) removed)",
        Icons::DEL.style(theme().error.clone()),
        entity(kind, id),
        impact
    );
}

pub fn aborted(kind: EntityKind, id: i64, impact: u64) {
    println!(
        "{} Kept {} and its {} dependent row(s)",
        Icons::CROSS.style(theme().warn.clone()),
        entity(kind, id),
        impact
    );
}
