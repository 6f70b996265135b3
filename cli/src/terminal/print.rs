use colored::*;
use edgerank_common::record::BenchmarkRecord;
use tracing::{info, warn};

use crate::terminal::logging::RAW_TARGET;

pub const TOTAL_WIDTH: usize = 64;

/// Minimum column widths for the header and data rows; the address column
/// widens when any displayed address exceeds 15 characters.
const HEAD_WIDTHS: [usize; 6] = [16, 5, 5, 5, 6, 11];
const DATA_WIDTHS: [usize; 6] = [18, 8, 8, 8, 10, 15];
const WIDE_HEAD_ADDR: usize = 40;
const WIDE_DATA_ADDR: usize = 42;

const COLUMNS: [&str; 6] = [
    "IP Address",
    "Sent",
    "Received",
    "Packet Loss Rate",
    "Average Delay",
    "Download Speed (MB/s)",
];

pub fn print(msg: &str) {
    info!(target: RAW_TARGET, "{msg}");
}

pub fn banner() {
    let text: String = format!("⟦ EDGERANK v{} ⟧", env!("CARGO_PKG_VERSION"));
    let text_width: usize = text.chars().count();
    let sep: ColoredString = "═"
        .repeat(TOTAL_WIDTH.saturating_sub(text_width) / 2)
        .bright_black();
    print(&format!("{}{}{}", sep, text.bright_green().bold(), sep));
}

pub fn header(msg: &str) {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

/// Display rows after clamping the limit to the available result count.
pub fn rows_to_print(limit: usize, available: usize) -> usize {
    limit.min(available)
}

/// Renders the fixed-width result table; a zero limit suppresses it.
pub fn table(records: &[BenchmarkRecord], limit: usize) {
    if limit == 0 {
        return;
    }
    if records.is_empty() {
        warn!("no results survived measurement; nothing to display");
        return;
    }

    let count: usize = rows_to_print(limit, records.len());
    let rows: Vec<[String; 6]> = records[..count].iter().map(|r| r.to_row()).collect();
    let wide: bool = rows.iter().any(|row| row[0].len() > 15);

    let mut head_widths = HEAD_WIDTHS;
    let mut data_widths = DATA_WIDTHS;
    if wide {
        head_widths[0] = WIDE_HEAD_ADDR;
        data_widths[0] = WIDE_DATA_ADDR;
    }

    print(&format_line(&COLUMNS.map(String::from), head_widths));
    for row in &rows {
        print(&format_line(row, data_widths));
    }
}

fn format_line(cols: &[String; 6], widths: [usize; 6]) -> String {
    let mut line = String::new();
    for (col, width) in cols.iter().zip(widths) {
        line.push_str(&format!("{:<w$}", col, w = width));
    }
    line.trim_end().to_string()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
