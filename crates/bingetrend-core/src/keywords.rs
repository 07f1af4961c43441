//! Validation of user-supplied keyword blocks and trend counts.

use crate::types::TrendQuery;
use crate::InputError;

pub const MIN_TREND_COUNT: u32 = 1;
pub const MAX_TREND_COUNT: u32 = 100;

/// Splits a block of text into one [`TrendQuery`] per non-blank line.
///
/// Lines are trimmed; blank lines are discarded and do not take a position.
///
/// # Errors
///
/// Returns [`InputError::EmptyQueryBlock`] when no line has content.
pub fn parse_query_block(block: &str) -> Result<Vec<TrendQuery>, InputError> {
    let queries: Vec<TrendQuery> = block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| TrendQuery(line.to_string()))
        .collect();

    if queries.is_empty() {
        return Err(InputError::EmptyQueryBlock);
    }
    Ok(queries)
}

/// Checks a requested trend count against the fetch service's accepted range.
///
/// # Errors
///
/// Returns [`InputError::CountOutOfRange`] outside `1..=100`.
pub fn validate_trend_count(count: u32) -> Result<u32, InputError> {
    if (MIN_TREND_COUNT..=MAX_TREND_COUNT).contains(&count) {
        Ok(count)
    } else {
        Err(InputError::CountOutOfRange {
            count,
            min: MIN_TREND_COUNT,
            max: MAX_TREND_COUNT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_discarded_in_order() {
        let block = "Dune Part Two, Timothee Chalamet\nOppenheimer movie\n\nGame of Thrones";
        let queries = parse_query_block(block).unwrap();
        let texts: Vec<&str> = queries.iter().map(TrendQuery::as_str).collect();
        assert_eq!(
            texts,
            vec![
                "Dune Part Two, Timothee Chalamet",
                "Oppenheimer movie",
                "Game of Thrones"
            ]
        );
    }

    #[test]
    fn whitespace_only_block_is_rejected() {
        assert_eq!(
            parse_query_block("  \n\t\n").unwrap_err(),
            InputError::EmptyQueryBlock
        );
        assert_eq!(parse_query_block("").unwrap_err(), InputError::EmptyQueryBlock);
    }

    #[test]
    fn crlf_lines_are_trimmed() {
        let queries = parse_query_block("Barbie\r\n  Wednesday  \r\n").unwrap();
        assert_eq!(queries[0].as_str(), "Barbie");
        assert_eq!(queries[1].as_str(), "Wednesday");
    }

    #[test]
    fn trend_count_bounds() {
        assert_eq!(validate_trend_count(1), Ok(1));
        assert_eq!(validate_trend_count(100), Ok(100));
        assert!(matches!(
            validate_trend_count(0),
            Err(InputError::CountOutOfRange { count: 0, .. })
        ));
        assert!(matches!(
            validate_trend_count(101),
            Err(InputError::CountOutOfRange { count: 101, .. })
        ));
    }
}
