//! Extracts trend queries from an exported trends CSV.
//!
//! The scanner is deliberately simple: every `"` toggles quoting and is
//! dropped, unquoted commas split fields, and fields are trimmed. A doubled
//! `""` inside a quoted field is not an escape.

use crate::CsvError;

/// Header label of the column holding one query per row.
pub const TREND_BREAKDOWN_COLUMN: &str = "Trend breakdown";

/// Splits one CSV line into trimmed fields.
///
/// Always yields at least one field, so an empty line parses as `[""]`.
#[must_use]
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Returns the non-empty `Trend breakdown` values of every data row, in order.
///
/// The first line is the header and must contain the column (matched
/// case-insensitively after trimming).
///
/// # Errors
///
/// - [`CsvError::MissingColumn`] if the header lacks the column.
/// - [`CsvError::EmptyResult`] if no data row has a value in it.
pub fn extract_trends(text: &str) -> Result<Vec<String>, CsvError> {
    let mut lines = text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));

    let header = lines.next().unwrap_or_default();
    let column = parse_csv_line(header)
        .iter()
        .position(|col| col.eq_ignore_ascii_case(TREND_BREAKDOWN_COLUMN))
        .ok_or_else(|| CsvError::MissingColumn {
            expected: TREND_BREAKDOWN_COLUMN.to_string(),
        })?;

    let trends: Vec<String> = lines
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            parse_csv_line(line)
                .into_iter()
                .nth(column)
                .filter(|value| !value.is_empty())
        })
        .collect();

    if trends.is_empty() {
        return Err(CsvError::EmptyResult {
            column: TREND_BREAKDOWN_COLUMN.to_string(),
        });
    }

    Ok(trends)
}

#[cfg(test)]
#[path = "csv_import_test.rs"]
mod tests;
