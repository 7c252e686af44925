//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};
use horizon_core::{Money, OperationResult};
use serde::Serialize;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Print a value wrapped in a success envelope
pub fn json<T: Serialize>(data: T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&OperationResult::ok(data))?);
    Ok(())
}

/// Print a failure envelope for `--json` callers
pub fn json_error(e: &anyhow::Error) {
    let envelope: OperationResult<()> = OperationResult::fail(format!("{:#}", e));
    match serde_json::to_string_pretty(&envelope) {
        Ok(text) => println!("{}", text),
        Err(_) => error(&e.to_string()),
    }
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Right-aligned money cell, red when negative
pub fn money_cell(money: &Money) -> Cell {
    let text = money.format();
    let cell = Cell::new(text).set_alignment(CellAlignment::Right);
    if money.is_negative() {
        cell.fg(comfy_table::Color::Red)
    } else {
        cell
    }
}

/// Signed money with color: green gains, red losses
pub fn signed_money(money: &Money) -> String {
    if money.is_negative() {
        money.format().red().to_string()
    } else if money.is_zero() {
        money.format()
    } else {
        format!("+{}", money.format()).green().to_string()
    }
}

/// Percentage with sign and color
pub fn signed_percent(value: f64) -> String {
    let text = format!("{:+.2}%", value);
    if value < 0.0 {
        text.red().to_string()
    } else if value > 0.0 {
        text.green().to_string()
    } else {
        text
    }
}

/// Score in [0, 1] as a percentage
pub fn format_score(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}
