use crate::core::history::Trend;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Creates a cell for displaying percentage change with color coding.
pub fn change_cell(change: f64) -> Cell {
    let text = format!("{change:.2}%");
    if change >= 0.0 {
        Cell::new(text)
            .fg(Color::Green)
            .set_alignment(CellAlignment::Right)
    } else {
        Cell::new(text)
            .fg(Color::Red)
            .set_alignment(CellAlignment::Right)
    }
}

/// Creates a cell for absent values.
pub fn na_cell() -> Cell {
    Cell::new("N/A").fg(Color::DarkGrey)
}

/// A colored signed number, green for gains and red for losses.
pub fn signed_text(value: f64, precision: usize) -> String {
    let text = format!("{value:+.precision$}");
    if value >= 0.0 {
        style(text).green().to_string()
    } else {
        style(text).red().to_string()
    }
}

/// Directional glyph for a metric versus the prior snapshot. Absent history
/// renders as empty, not as a downtrend.
pub fn trend_glyph(trend: Option<Trend>) -> String {
    match trend {
        Some(Trend::Up) => style("_/").green().bold().to_string(),
        Some(Trend::Down) => style("‾\\").red().bold().to_string(),
        Some(Trend::Flat) => style("--").dim().bold().to_string(),
        None => String::new(),
    }
}

/// Table-cell variant of the trend glyph.
pub fn trend_cell(trend: Option<Trend>) -> Cell {
    match trend {
        Some(Trend::Up) => Cell::new("_/").fg(Color::Green).add_attribute(Attribute::Bold),
        Some(Trend::Down) => Cell::new("‾\\").fg(Color::Red).add_attribute(Attribute::Bold),
        Some(Trend::Flat) => Cell::new("--")
            .fg(Color::DarkGrey)
            .add_attribute(Attribute::Bold),
        None => Cell::new(""),
    }
}

/// Creates a new `indicatif` spinner for the single ticker fetch.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
