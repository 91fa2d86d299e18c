use std::path::Path;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use super::Row;
use crate::license::label;

/// Render a colored terminal report.
pub fn render(rows: &[Row], path: &Path, show_count: bool, quiet: bool) -> Result<()> {
    let total = rows.len();
    let resolved = rows.iter().filter(|r| r.repo_url.is_some()).count();
    let licensed = rows.iter().filter(|r| r.license.is_some()).count();
    let unresolved = rows.iter().filter(|r| r.error.is_some()).count();

    if quiet {
        println!(
            "Total: {}  Resolved: {}  Licensed: {}  Unresolved: {}",
            total,
            resolved.to_string().green(),
            licensed.to_string().cyan(),
            unresolved.to_string().yellow(),
        );
        return Ok(());
    }

    println!(
        "\n {} v{}",
        "golicense-checkr".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Scanning: {}\n", path.display());

    if rows.is_empty() {
        println!(" No external dependencies found.\n");
        return Ok(());
    }

    println!("{}", build_table(rows, show_count));
    println!(
        "\n {} dependencies, {} resolved, {} with a license, {} unresolved\n",
        total.to_string().bold(),
        resolved.to_string().green(),
        licensed.to_string().cyan(),
        unresolved.to_string().yellow(),
    );

    Ok(())
}

fn build_table(rows: &[Row], show_count: bool) -> Table {
    let mut header = vec![Cell::new("Dependency").add_attribute(Attribute::Bold)];
    if show_count {
        header.push(Cell::new("Count").add_attribute(Attribute::Bold));
    }
    header.push(Cell::new("RepoURL").add_attribute(Attribute::Bold));
    header.push(Cell::new("License").add_attribute(Attribute::Bold));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for row in rows {
        let mut cells = vec![Cell::new(&row.dependency)];
        if show_count {
            cells.push(Cell::new(row.count).set_alignment(CellAlignment::Right));
        }
        cells.push(Cell::new(row.repo_url.as_deref().unwrap_or("")).fg(Color::Blue));

        let license_cell = match (&row.license, &row.license_key) {
            (Some(name), Some(key)) => Cell::new(name).fg(label::color(key)),
            _ => Cell::new(""),
        };
        cells.push(license_cell);

        table.add_row(cells);
    }

    table
}
