use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use chartmap_cli::commands::ChartTypeInfo;
use chartmap_core::{ApiResponse, DryRunReport};
use chartmap_model::PlaceholderCatalog;
use chartmap_validate::ValidationReport;

pub fn print_chart_types(types: &[ChartTypeInfo]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Chart type"),
        header_cell("Category"),
        header_cell("Default series"),
        header_cell("Max series"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for info in types {
        table.add_row(vec![
            Cell::new(&info.chart_type).add_attribute(Attribute::Bold),
            Cell::new(info.category),
            Cell::new(info.default_series_count),
            Cell::new(info.max_series_count),
        ]);
    }
    println!("{table}");
}

pub fn print_catalog(catalog: &PlaceholderCatalog) {
    println!("Chart: {}", catalog.chart_id);
    println!(
        "Versions: template {}, spec {}",
        catalog.template_version, catalog.spec_version
    );
    println!("Checksum: {}", catalog.checksum);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Placeholder"),
        header_cell("Type"),
        header_cell("Required"),
        header_cell("Group"),
        header_cell("Target path"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    for item in &catalog.items {
        let required = if item.required {
            Cell::new("yes").fg(Color::Green)
        } else {
            dim_cell("no")
        };
        table.add_row(vec![
            Cell::new(&item.name),
            Cell::new(item.data_type),
            required,
            Cell::new(item.group),
            dim_cell(&item.target_path),
        ]);
    }
    println!("{table}");
}

pub fn print_validation(report: &ValidationReport) {
    let status = if report.passed { "PASSED" } else { "FAILED" };
    let mut table = Table::new();
    table.set_header(vec![header_cell("Finding"), header_cell("Placeholder"), header_cell("Detail")]);
    apply_summary_table_style(&mut table);
    for placeholder in &report.missing {
        table.add_row(vec![
            Cell::new("missing").fg(Color::Red),
            Cell::new(placeholder),
            dim_cell("required placeholder has no mapping item"),
        ]);
    }
    for mismatch in &report.type_errors {
        table.add_row(vec![
            Cell::new("type").fg(Color::Red),
            Cell::new(&mismatch.placeholder),
            Cell::new(format!("expected {}, mapped as {}", mismatch.expected, mismatch.actual)),
        ]);
    }
    for unknown in &report.unknown {
        let detail = unknown
            .suggestion
            .as_deref()
            .map_or_else(|| "not in catalog".to_string(), |s| format!("did you mean {s}?"));
        table.add_row(vec![
            Cell::new("unknown").fg(Color::Yellow),
            Cell::new(&unknown.placeholder),
            Cell::new(detail),
        ]);
    }
    println!("Validation: {status}");
    if report.issue_count() + report.unknown.len() > 0 {
        println!("{table}");
    }
}

pub fn print_dry_run(response: &ApiResponse<DryRunReport>) {
    println!("Result: {} (trace {})", response.code, response.trace_id);
    let Some(report) = &response.data else {
        eprintln!("error: {}", response.message);
        return;
    };
    match serde_json::to_string_pretty(&report.final_echarts_config) {
        Ok(text) => println!("{text}"),
        Err(error) => eprintln!("error: {error}"),
    }
    print_validation(&report.validation);

    if !report.remaining_placeholders.is_empty() {
        println!();
        println!("Unresolved placeholders:");
        for token in &report.remaining_placeholders {
            println!("  {token}");
        }
    }
    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  - {warning}");
        }
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}
