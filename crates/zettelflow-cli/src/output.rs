//! Styled terminal messages

use colored::Colorize;
use std::fmt::Display;

pub fn success(message: impl Display) {
    println!("{} {}", "Success:".green().bold(), message);
}

pub fn info(message: impl Display) {
    println!("{} {}", "Info:".cyan().bold(), message);
}

pub fn warning(message: impl Display) {
    eprintln!("{} {}", "Warning:".yellow().bold(), message);
}

pub fn error(message: impl Display) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

/// Section heading
pub fn section(title: &str) {
    println!("\n{}", title.bold().underline());
}

/// Indented `key: value` line under a section
pub fn setting(key: &str, value: impl Display) {
    println!("  {} {}", format!("{key}:").dimmed(), value);
}
