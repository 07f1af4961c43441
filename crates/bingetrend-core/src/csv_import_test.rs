use super::*;

#[test]
fn parse_csv_line_splits_on_commas_and_trims() {
    assert_eq!(parse_csv_line(" 1 , Dune ,x"), vec!["1", "Dune", "x"]);
}

#[test]
fn parse_csv_line_keeps_commas_inside_quotes() {
    assert_eq!(
        parse_csv_line(r#"1,"Dune Part Two, Zendaya",500K+"#),
        vec!["1", "Dune Part Two, Zendaya", "500K+"]
    );
}

#[test]
fn parse_csv_line_does_not_unescape_doubled_quotes() {
    // `""` toggles twice, so the quote characters vanish and the comma
    // before `ok` is still inside the quoted field.
    assert_eq!(
        parse_csv_line(r#""He said ""hi"", ok",2"#),
        vec!["He said hi, ok", "2"]
    );
}

#[test]
fn parse_csv_line_empty_line_yields_single_empty_field() {
    assert_eq!(parse_csv_line(""), vec![String::new()]);
}

#[test]
fn extract_trends_reads_named_column() {
    let csv = "Rank,Trend breakdown\n1,Dune Part Two\n2,Oppenheimer";
    assert_eq!(
        extract_trends(csv).unwrap(),
        vec!["Dune Part Two", "Oppenheimer"]
    );
}

#[test]
fn extract_trends_header_match_is_case_insensitive_and_trimmed() {
    let csv = "Trends, TREND BREAKDOWN ,Started\nfoo,\"Wednesday, Jenna Ortega\",today\n";
    assert_eq!(extract_trends(csv).unwrap(), vec!["Wednesday, Jenna Ortega"]);
}

#[test]
fn extract_trends_missing_column_fails_without_rows() {
    let csv = "Rank,Topic\n1,Dune Part Two\n2,Oppenheimer";
    let err = extract_trends(csv).unwrap_err();
    assert_eq!(
        err,
        CsvError::MissingColumn {
            expected: "Trend breakdown".to_string()
        }
    );
}

#[test]
fn extract_trends_blank_first_line_is_missing_header() {
    let csv = "\nRank,Trend breakdown\n1,Dune";
    assert!(matches!(
        extract_trends(csv),
        Err(CsvError::MissingColumn { .. })
    ));
}

#[test]
fn extract_trends_skips_blank_lines_and_empty_values() {
    let csv = "Rank,Trend breakdown\r\n1,Dune\r\n\r\n2,   \r\n3\r\n4,Barbie\r\n";
    assert_eq!(extract_trends(csv).unwrap(), vec!["Dune", "Barbie"]);
}

#[test]
fn extract_trends_header_only_is_empty_result() {
    let csv = "Rank,Trend breakdown\n";
    assert_eq!(
        extract_trends(csv).unwrap_err(),
        CsvError::EmptyResult {
            column: "Trend breakdown".to_string()
        }
    );
}

#[test]
fn extract_trends_count_matches_rows_with_values() {
    let rows = [
        "Trend breakdown,Volume",
        "a,1",
        ",2",
        "b,3",
        "",
        "c,4",
        "   ,5",
    ];
    let csv = rows.join("\n");
    let out = extract_trends(&csv).unwrap();
    assert_eq!(out, vec!["a", "b", "c"]);
}
