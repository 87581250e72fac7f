/// Log formatting and output with ANSI colors
///
/// Handles:
/// - Colorized console output with aligned tag and level columns
/// - Dual output (console + file)
/// - Broken pipe handling for piped commands

use super::file::write_to_file;
use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stdout, ErrorKind, Write};

/// Column widths for alignment
const TAG_WIDTH: usize = 8;
const LEVEL_WIDTH: usize = 7;

/// Format and output a log message
pub fn format_and_log(tag: LogTag, level: LogLevel, message: &str) {
    let now = Local::now();
    let time = now.format("%H:%M:%S").to_string();

    let tag_str = format!("{:<width$}", tag.to_plain_string(), width = TAG_WIDTH)
        .color(tag.color())
        .to_string();
    let level_str = colorize_level(level);

    let console_line = format!("{} [{}] [{}] {}", time.dimmed(), tag_str, level_str, message);
    print_stdout_safe(&console_line);

    let timestamp = now.format("%Y-%m-%d %H:%M:%S").to_string();
    let file_line = format!(
        "{} [{}] [{}] {}",
        timestamp,
        tag.to_plain_string(),
        level.as_str(),
        message
    );
    write_to_file(&file_line);
}

/// Colorize the level column
fn colorize_level(level: LogLevel) -> String {
    let padded = format!("{:<width$}", level.as_str(), width = LEVEL_WIDTH);
    match level {
        LogLevel::Error => padded.red().bold().to_string(),
        LogLevel::Warning => padded.yellow().to_string(),
        LogLevel::Info => padded.green().to_string(),
        LogLevel::Debug => padded.cyan().to_string(),
        LogLevel::Verbose => padded.dimmed().to_string(),
    }
}

/// Print to stdout, ignoring broken pipes (e.g. `scorehub | head`)
fn print_stdout_safe(line: &str) {
    let mut out = stdout();
    if let Err(e) = writeln!(out, "{}", line) {
        if e.kind() != ErrorKind::BrokenPipe {
            eprintln!("{}", line);
        }
    }
}
