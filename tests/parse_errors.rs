//! Diagnostics: the three-line error echo with a caret sized to the token.

use relnorm::parse::{parse_dependencies, parse_schema, ParseErrorKind};

#[test]
fn s6_duplicate_column_echoes_line_and_caret() {
    let source = "CREATE TABLE R(id INT, id INT);";
    let err = parse_schema(source).unwrap_err();
    let rendered = err.to_string();
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[0], source);
    // Caret sits under the second `id` and is exactly as wide
    assert_eq!(lines[1], format!("{}^^", " ".repeat(23)));
    assert!(lines[2].contains("DuplicateColumn"));
    assert!(lines[2].contains("line 1"));
}

#[test]
fn caret_lands_on_the_right_line_of_a_multiline_schema() {
    let source = "CREATE TABLE R(\n    id INT NOT NULL,\n    id INT NOT NULL\n);";
    let err = parse_schema(source).unwrap_err();
    let rendered = err.to_string();
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[0], "    id INT NOT NULL");
    assert_eq!(lines[1], "    ^^");
    assert!(lines[2].starts_with("line 3"));
}

#[test]
fn unknown_token_is_cited_verbatim() {
    let err = parse_schema("CREATE TABLE R(id INT ?);").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::Unknown { ref literal } if literal == "?"));
    assert!(err.to_string().contains("Unknown"));
    assert!(err.to_string().contains('?'));
}

#[test]
fn unexpected_token_names_the_expected_grammar() {
    let err = parse_schema("CREATE TABLE R(id VARCHAR NOT NULL);").unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("Unexpected"));
    assert!(rendered.contains("max_column_length_in_characters"));
}

#[test]
fn dependency_errors_render_against_their_own_source() {
    let table = parse_schema("CREATE TABLE R(a INT NOT NULL, b INT NOT NULL);").unwrap();
    let err = parse_dependencies("a -> b\nKEY: a\nKEY: b", &table).unwrap_err();
    let rendered = err.to_string();
    let lines: Vec<&str> = rendered.lines().collect();

    assert!(matches!(err.kind, ParseErrorKind::DuplicatePrimaryKey));
    assert_eq!(lines[0], "KEY: b");
    assert_eq!(lines[1], "^^^");
    assert!(lines[2].contains("DuplicatePrimaryKey"));
    assert!(lines[2].contains("line 3"));
}

#[test]
fn unknown_column_in_dependencies() {
    let table = parse_schema("CREATE TABLE R(a INT NOT NULL);").unwrap();
    let err = parse_dependencies("a -> ghost", &table).unwrap_err();
    let rendered = err.to_string();
    assert!(matches!(err.kind, ParseErrorKind::UnknownColumn { ref name } if name == "ghost"));
    assert!(rendered.contains("UnknownColumn"));
    assert!(rendered.lines().nth(1).unwrap().ends_with("^^^^^"));
}

#[test]
fn truncated_dependency_reports_eof() {
    let table = parse_schema("CREATE TABLE R(a INT NOT NULL);").unwrap();
    let err = parse_dependencies("a ->", &table).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedEof { .. }));
}
