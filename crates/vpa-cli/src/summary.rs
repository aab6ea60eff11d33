use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use vpa_cli::types::{IngestResult, SummaryResult};

pub fn print_ingest_summary(result: &IngestResult) {
    println!("Data directory: {}", result.data_dir.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Time (ms)"),
        header_cell("Warnings"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for ingested in &result.tables {
        let warnings = ingested
            .validation
            .as_ref()
            .map(|validation| validation.warning_count());
        table.add_row(vec![
            Cell::new(&ingested.table).fg(Color::Green),
            Cell::new(ingested.rows),
            Cell::new(ingested.columns),
            Cell::new(ingested.duration_ms),
            count_cell(warnings, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(result.total_rows()).add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(result.duration_ms).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");
    print_errors(&result.errors);
}

pub fn print_summary_result(result: &SummaryResult) {
    let report = &result.report;
    println!("Database: {}", result.database.display());
    if report.empty {
        println!("Summary is empty; nothing was written to '{}'", report.output_table);
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Stage"), header_cell("Time (ms)")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for timing in &report.stages {
        table.add_row(vec![Cell::new(timing.stage), Cell::new(timing.duration_ms)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(report.total_duration().as_millis()).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    let resolved = &report.missing_values;
    if resolved.total_nulls > 0 {
        let mut nulls = Table::new();
        nulls.set_header(vec![
            header_cell("Column"),
            header_cell("Nulls"),
            header_cell("Strategy"),
            header_cell("Fill"),
        ]);
        apply_table_style(&mut nulls);
        align_column(&mut nulls, 1, CellAlignment::Right);
        for column in &resolved.columns {
            nulls.add_row(vec![
                Cell::new(&column.column),
                Cell::new(column.nulls),
                Cell::new(column.strategy),
                match &column.fill {
                    Some(value) => Cell::new(value),
                    None => Cell::new("left null").fg(Color::Yellow),
                },
            ]);
        }
        println!("{nulls}");
    }

    if let Some(path) = &result.exported_csv {
        println!("Exported: {}", path.display());
    }
    println!(
        "Summary complete: {} rows x {} columns written to '{}' ({})",
        report.rows_written, report.columns, report.output_table, report.load_mode
    );
}

fn print_errors(errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    eprintln!("Errors:");
    for error in errors {
        eprintln!("- {error}");
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: Option<usize>, color: Color) -> Cell {
    match count {
        Some(value) if value > 0 => Cell::new(value).fg(color).add_attribute(Attribute::Bold),
        Some(value) => dim_cell(value),
        None => dim_cell("-"),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
