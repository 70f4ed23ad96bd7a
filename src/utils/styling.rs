//! Terminal styling utilities shared by both utilities

use console::{style, Emoji};
use std::path::Path;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static FILM: Emoji<'_, '_> = Emoji("🎬 ", "");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[ok] ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[x] ");
pub static WAVE: Emoji<'_, '_> = Emoji("👋 ", "");

const RULE_WIDTH: usize = 60;

/// Print the application banner
pub fn print_banner(title: &str, tagline: &str, version: &str) {
    println!();
    println!("    {}{}", ROCKET, style(title).cyan().bold());
    println!("    {}", style(tagline).dim());
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(RULE_WIDTH)).dim());
    println!();
}

/// Print a section header framed by rules
pub fn print_header(title: &str) {
    println!();
    println!("    {}", style("═".repeat(RULE_WIDTH)).cyan());
    println!("    {}{}", FILM, style(title).white().bold());
    println!("    {}", style("═".repeat(RULE_WIDTH)).cyan());
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(RULE_WIDTH)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {}{}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("    {}{}", WARN, style(message).yellow());
}

/// Print an error message to stderr
pub fn print_error(message: &str) {
    eprintln!("    {}{}", CROSS, style(message).red().bold());
}

/// Print a labelled path, shortened to fit the card width
pub fn print_path(label: &str, path: &Path) {
    println!(
        "    {}{} {}",
        FOLDER,
        style(label).bold(),
        style(truncate_path(path, 48)).dim()
    );
}

/// Print the final completion message
pub fn print_completion(message: &str) {
    println!();
    println!("    {}{}", ROCKET, style(message).green().bold());
    println!();
}

/// Print the farewell line when a utility exits
pub fn print_farewell(message: &str) {
    println!();
    println!("    {}{}", WAVE, style(message).dim());
}

// Helper functions

pub fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

pub fn truncate_string(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        s.to_string()
    } else {
        let tail: String = s.chars().skip(count + 3 - max_len).collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate_string("frames", 10), "frames");
    }

    #[test]
    fn test_truncate_keeps_tail() {
        let truncated = truncate_string("/very/long/path/to/frames", 12);
        assert_eq!(truncated.chars().count(), 12);
        assert!(truncated.starts_with("..."));
        assert!(truncated.ends_with("frames"));
    }

    #[test]
    fn test_status_icons_have_plain_fallbacks() {
        for icon in [&CHECK, &WARN, &CROSS] {
            let plain = icon.1;
            assert!(plain.is_ascii() && !plain.trim().is_empty());
            assert!(plain.ends_with(' '), "Icons are followed by a space: {:?}", plain);
        }
    }
}
