//! Recursive-descent parser for the `CREATE TABLE` language.

use super::{ParseError, ParseErrorKind, TokenStream};
use crate::lexer::{TokenKind, TokenValue};
use crate::table::{Column, ColumnDef, Table};

/// Parses a single `CREATE TABLE` statement into a [`Table`].
pub fn parse_schema(source: &str) -> Result<Table, ParseError> {
    let mut stream = TokenStream::new(source)?;
    let mut table = Table::default();

    stream.expect(TokenKind::Create, "CREATE")?;
    stream.expect(TokenKind::Table, "TABLE")?;

    let token = stream.next("[IF NOT EXISTS] table_name")?;
    match token.kind {
        TokenKind::If => {
            stream.expect(TokenKind::Not, "NOT")?;
            stream.expect(TokenKind::Exists, "EXISTS")?;
            table.set_if_not_exists(true);
            let name = stream.expect(TokenKind::Identifier, "table_name")?;
            table.set_name(name.text());
        }
        TokenKind::Identifier => table.set_name(token.text()),
        _ => return Err(stream.fail(&token, "[IF NOT EXISTS] table_name")),
    }

    stream.expect(TokenKind::LParen, "(")?;
    loop {
        parse_column(&mut stream, &mut table)?;
        let token = stream.next(", or )")?;
        match token.kind {
            TokenKind::Comma => continue,
            TokenKind::RParen => break,
            _ => return Err(stream.fail(&token, ", or )")),
        }
    }
    stream.expect(TokenKind::Semicolon, ";")?;

    // One statement per file
    if let Some(extra) = stream.peek().cloned() {
        return Err(stream.fail(&extra, "end of input"));
    }

    Ok(table)
}

fn parse_column(stream: &mut TokenStream, table: &mut Table) -> Result<(), ParseError> {
    let name_token = stream.expect(TokenKind::Identifier, "column_name")?;
    let name = name_token.text();
    if table.has_column(&name) {
        return Err(stream.error(&name_token, ParseErrorKind::DuplicateColumn { name }));
    }

    let type_token = stream.next("column_definition")?;
    let mut def = ColumnDef::default();
    match type_token.kind {
        TokenKind::Int | TokenKind::Integer => {
            def.data_type = type_token.kind.as_str().to_string();
            // Size is optional for the integer types
            if stream.peek_kind() == Some(TokenKind::LParen) {
                stream.advance();
                def.size = Some(parse_size(stream)?);
            }
        }
        TokenKind::Varchar => {
            def.data_type = type_token.kind.as_str().to_string();
            stream.expect(TokenKind::LParen, "(max_column_length_in_characters)")?;
            def.size = Some(parse_size(stream)?);
        }
        _ => return Err(stream.fail(&type_token, "column_definition (INT, INTEGER or VARCHAR)")),
    }

    match stream.peek_kind() {
        Some(TokenKind::Null) => {
            stream.advance();
            def.nullable = true;
        }
        Some(TokenKind::Not) => {
            stream.advance();
            stream.expect(TokenKind::Null, "NULL")?;
            def.nullable = false;
        }
        _ => {}
    }

    table.add_column(Column::new(name, def));
    Ok(())
}

fn parse_size(stream: &mut TokenStream) -> Result<u64, ParseError> {
    let token = stream.expect(TokenKind::IntConst, "INTEGER VALUE")?;
    let TokenValue::Number(size) = token.value else {
        return Err(stream.fail(&token, "INTEGER VALUE"));
    };
    stream.expect(TokenKind::RParen, ")")?;
    Ok(size)
}
