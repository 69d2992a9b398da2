//! Review and edit generated rows before they are inserted.

use super::prompt::Prompter;
use crate::error::SeedError;
use crate::schema::{ColumnDefinition, ColumnType, RowRecord, Value};
use crate::session::GenerationSession;
use anyhow::Result;

/// Longest value shown in the batch overview
pub const PREVIEW_WIDTH: usize = 10;

/// Answer that leaves the current review level
const DONE: &str = "None";

/// Shorten `s` to `max_len` characters, marking the cut with `...`
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

/// Render rows as a box table
pub fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let border = |left: char, mid: char, right: char| {
        let mut line = String::new();
        line.push(left);
        for (i, width) in widths.iter().enumerate() {
            line.push_str(&"─".repeat(width + 2));
            if i < widths.len() - 1 {
                line.push(mid);
            }
        }
        line.push(right);
        line.push('\n');
        line
    };
    let cells = |values: &[String]| {
        let mut line = String::from("│");
        for (i, width) in widths.iter().enumerate() {
            let value = values.get(i).map(String::as_str).unwrap_or("");
            line.push_str(&format!(" {:width$} │", value, width = *width));
        }
        line.push('\n');
        line
    };

    let mut output = border('┌', '┬', '┐');
    output.push_str(&cells(headers));
    output.push_str(&border('├', '┼', '┤'));
    for row in rows {
        output.push_str(&cells(row.as_slice()));
    }
    output.push_str(&border('└', '┴', '┘'));
    output
}

/// Overview of the whole batch, long values truncated
pub fn format_rows(columns: &[ColumnDefinition], rows: &[RowRecord]) -> String {
    let headers: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| {
                    let value = row.get(&c.name).map(Value::display).unwrap_or_default();
                    truncate(&value, PREVIEW_WIDTH)
                })
                .collect()
        })
        .collect();
    format_table(&headers, &body)
}

/// Column/value listing of a single row, untruncated
pub fn format_row_detail(row: &RowRecord) -> String {
    let body: Vec<Vec<String>> = row
        .iter()
        .map(|(column, value)| vec![column.to_string(), value.display()])
        .collect();
    format_table(&["Column".to_string(), "Value".to_string()], &body)
}

/// Convert typed input into a value for `column`
pub fn coerce_input(input: &str, column: &ColumnDefinition) -> Value {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    match column.data_type {
        ColumnType::BigInt => trimmed
            .parse()
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(input.to_string())),
        ColumnType::Boolean => match trimmed.to_lowercase().as_str() {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => Value::Text(input.to_string()),
        },
        _ => Value::Text(input.to_string()),
    }
}

/// Index of the row named by `answer`: its key, or its 1-based position
/// when the table has no key column
pub fn find_row(rows: &[RowRecord], key_column: Option<&str>, answer: &str) -> Option<usize> {
    let answer = answer.trim();
    match key_column {
        Some(key) => rows
            .iter()
            .position(|r| r.get(key).is_some_and(|v| v.display() == answer)),
        None => answer
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=rows.len()).contains(n))
            .map(|n| n - 1),
    }
}

/// Set one column of one generated row from typed input
pub fn apply_edit(
    session: &mut GenerationSession,
    row_index: usize,
    column: &str,
    input: &str,
) -> Result<()> {
    let definition = session
        .columns
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(column))
        .cloned()
        .ok_or_else(|| SeedError::UnknownColumn {
            table: session.table.clone(),
            column: column.to_string(),
        })?;

    let row = session
        .rows
        .get_mut(row_index)
        .ok_or_else(|| anyhow::anyhow!("Row {} does not exist", row_index + 1))?;
    row.set(&definition.name, coerce_input(input, &definition));
    Ok(())
}

/// Let the user pick rows and rewrite column values until they answer `None`
pub fn review_rows(
    session: &mut GenerationSession,
    key_column: Option<&str>,
    prompter: &mut dyn Prompter,
) -> Result<()> {
    loop {
        print!("{}", format_rows(&session.columns, &session.rows));

        let mut row_choices: Vec<String> = match key_column {
            Some(key) => session
                .rows
                .iter()
                .filter_map(|r| r.get(key).map(Value::display))
                .collect(),
            None => (1..=session.rows.len()).map(|n| n.to_string()).collect(),
        };
        row_choices.push(DONE.to_string());

        let question = match key_column {
            Some(key) => format!("Enter the {} of the row to edit ({} to go back)", key, DONE),
            None => format!("Enter the row number to edit ({} to go back)", DONE),
        };
        let answer = prompter.ask(&question, &row_choices)?;
        if answer.eq_ignore_ascii_case(DONE) {
            return Ok(());
        }

        let Some(row_index) = find_row(&session.rows, key_column, &answer) else {
            eprintln!("Warning: No generated row matches '{}'", answer);
            continue;
        };

        edit_row(session, row_index, prompter)?;
    }
}

fn edit_row(
    session: &mut GenerationSession,
    row_index: usize,
    prompter: &mut dyn Prompter,
) -> Result<()> {
    let mut column_choices: Vec<String> = session.columns.iter().map(|c| c.name.clone()).collect();
    column_choices.push(DONE.to_string());

    loop {
        print!("{}", format_row_detail(&session.rows[row_index]));

        let column = prompter.ask(
            &format!("Which column do you want to edit? ({} to go back)", DONE),
            &column_choices,
        )?;
        if column.eq_ignore_ascii_case(DONE) {
            return Ok(());
        }
        if !session
            .columns
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(&column))
        {
            eprintln!(
                "Error: {}",
                SeedError::UnknownColumn {
                    table: session.table.clone(),
                    column,
                }
            );
            continue;
        }

        let input = prompter.ask(&format!("Enter the new value for {}", column), &[])?;
        apply_edit(session, row_index, &column, &input)?;
    }
}
