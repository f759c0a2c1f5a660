//! Parser for the dependency language, bound to an already-parsed table.

use super::{ParseError, ParseErrorKind, TokenStream};
use crate::deps::{DependencyManager, DependencyRow};
use crate::lexer::{Token, TokenKind};
use crate::table::Table;

/// Parses a dependency file against `table` into a [`DependencyManager`].
///
/// Identifiers are matched case-sensitively against the table's columns.
/// The caller propagates the manager's primary keys back onto the table.
pub fn parse_dependencies(source: &str, table: &Table) -> Result<DependencyManager, ParseError> {
    let parser = DependencyParser {
        stream: TokenStream::new(source)?,
        table,
        rows: Vec::new(),
        keys: Vec::new(),
    };
    parser.parse()
}

struct DependencyParser<'a> {
    stream: TokenStream,
    table: &'a Table,
    rows: Vec<DependencyRow>,
    keys: Vec<String>,
}

impl DependencyParser<'_> {
    fn parse(mut self) -> Result<DependencyManager, ParseError> {
        while self.stream.has_more() {
            let token = self.stream.next("column_name, ( or KEY")?;
            match token.kind {
                TokenKind::Identifier => {
                    self.check_column(&token)?;
                    self.parse_dependency(vec![token], false)?;
                }
                TokenKind::LParen => {
                    let determinants = self.parse_column_list()?;
                    self.parse_dependency(determinants, true)?;
                }
                TokenKind::Key => self.parse_key(&token)?,
                _ => return Err(self.stream.fail(&token, "column_name, ( or KEY")),
            }
        }

        let mut manager = DependencyManager::new();
        for row in self.rows {
            manager.add_row(row);
        }
        for key in self.keys {
            manager.add_primary_key(key);
        }
        Ok(manager)
    }

    /// `determinant(s) "-" ">" [">"] rhs`, with the arrow already pending.
    ///
    /// A grouped left-hand side distributes the right-hand side over each
    /// member, merging into rows that earlier statements populated; a
    /// single determinant may not restate an already-populated block.
    fn parse_dependency(&mut self, determinants: Vec<Token>, grouped: bool) -> Result<(), ParseError> {
        self.stream.expect(TokenKind::Dash, "-")?;
        self.stream.expect(TokenKind::RAngle, ">[>]")?;
        let multi = self.stream.peek_kind() == Some(TokenKind::RAngle);
        if multi {
            self.stream.advance();
        }

        let first = self.stream.next("( or dependent_column")?;
        let block_start = first.clone();
        let dependents = match first.kind {
            TokenKind::Identifier => {
                self.check_column(&first)?;
                vec![first]
            }
            TokenKind::LParen => self.parse_column_list()?,
            _ => return Err(self.stream.fail(&first, "( or dependent_column")),
        };

        for determinant in &determinants {
            self.append_block(&determinant.text(), multi, grouped, &block_start, &dependents)?;
        }
        Ok(())
    }

    /// Appends one right-hand block to the determinant's row.
    fn append_block(
        &mut self,
        determinant: &str,
        multi: bool,
        grouped: bool,
        block_start: &Token,
        dependents: &[Token],
    ) -> Result<(), ParseError> {
        let index = match self.row_index(determinant) {
            Some(index) => index,
            None => {
                self.rows.push(DependencyRow::new(determinant));
                self.rows.len() - 1
            }
        };

        let populated = if multi {
            !self.rows[index].multis().is_empty()
        } else {
            !self.rows[index].singles().is_empty()
        };
        if populated && !grouped {
            let kind = if multi {
                ParseErrorKind::DuplicateMultiBlock {
                    determinant: determinant.to_string(),
                }
            } else {
                ParseErrorKind::DuplicateSingleBlock {
                    determinant: determinant.to_string(),
                }
            };
            return Err(self.stream.error(block_start, kind));
        }

        let mut added: Vec<String> = Vec::new();
        for token in dependents {
            let name = token.text();
            if added.contains(&name) {
                return Err(self
                    .stream
                    .error(token, ParseErrorKind::DuplicateRhs { name }));
            }
            let already_present = if multi {
                self.rows[index].multis().contains(&name)
            } else {
                self.rows[index].singles().contains(&name)
            };
            if already_present {
                // Only possible for a grouped statement merging into an
                // earlier declaration of the same dependency.
                continue;
            }
            added.push(name.clone());
            if multi {
                self.rows[index].add_multi(name);
            } else {
                self.rows[index].add_single(name);
            }
        }
        Ok(())
    }

    /// `KEY ":" ( identifier | "(" identifier { "," identifier } ")" )`
    fn parse_key(&mut self, key_token: &Token) -> Result<(), ParseError> {
        if !self.keys.is_empty() {
            return Err(self
                .stream
                .error(key_token, ParseErrorKind::DuplicatePrimaryKey));
        }
        self.stream.expect(TokenKind::Colon, ":")?;

        let first = self.stream.next("( or primary_key")?;
        let columns = match first.kind {
            TokenKind::Identifier => {
                self.check_column(&first)?;
                vec![first]
            }
            TokenKind::LParen => self.parse_column_list()?,
            _ => return Err(self.stream.fail(&first, "( or primary_key")),
        };

        for token in columns {
            let name = token.text();
            if !self.keys.contains(&name) {
                self.keys.push(name);
            }
        }
        Ok(())
    }

    /// `identifier { "," identifier } ")"`, the opening paren already consumed.
    fn parse_column_list(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut names = Vec::new();
        loop {
            let token = self.stream.next("column_name")?;
            match token.kind {
                TokenKind::Identifier => {
                    self.check_column(&token)?;
                    names.push(token);
                }
                _ => return Err(self.stream.fail(&token, "column_name")),
            }
            let separator = self.stream.next(", or )")?;
            match separator.kind {
                TokenKind::Comma => continue,
                TokenKind::RParen => break,
                _ => return Err(self.stream.fail(&separator, ", or )")),
            }
        }
        Ok(names)
    }

    fn row_index(&self, determinant: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.determinant() == determinant)
    }

    fn check_column(&self, token: &Token) -> Result<(), ParseError> {
        let name = token.text();
        if self.table.has_column(&name) {
            Ok(())
        } else {
            Err(self
                .stream
                .error(token, ParseErrorKind::UnknownColumn { name }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_schema;

    fn order_table() -> Table {
        parse_schema(
            "CREATE TABLE Order(
                orderId INT NOT NULL,
                productId INT NOT NULL,
                qty INT NOT NULL,
                productName VARCHAR(50) NOT NULL
            );",
        )
        .unwrap()
    }

    #[test]
    fn test_single_and_multi_dependencies() {
        let table = order_table();
        let manager = parse_dependencies(
            "productId -> productName\nproductId ->> qty",
            &table,
        )
        .unwrap();
        let row = manager.row("productId").unwrap();
        assert_eq!(row.singles(), ["productName"]);
        assert_eq!(row.multis(), ["qty"]);
    }

    #[test]
    fn test_split_arrow_is_multi() {
        let table = order_table();
        let manager = parse_dependencies("productId -> >> qty", &table).unwrap();
        assert_eq!(manager.row("productId").unwrap().multis(), ["qty"]);
    }

    #[test]
    fn test_grouped_lhs_fans_out() {
        let table = order_table();
        let manager = parse_dependencies("(orderId, productId) -> qty", &table).unwrap();
        assert_eq!(manager.row("orderId").unwrap().singles(), ["qty"]);
        assert_eq!(manager.row("productId").unwrap().singles(), ["qty"]);
    }

    #[test]
    fn test_grouped_rhs() {
        let table = order_table();
        let manager =
            parse_dependencies("orderId -> (qty, productName)", &table).unwrap();
        assert_eq!(
            manager.row("orderId").unwrap().singles(),
            ["qty", "productName"]
        );
    }

    #[test]
    fn test_grouped_lhs_merges_into_existing_rows() {
        let table = order_table();
        let manager = parse_dependencies(
            "productId -> productName\n(orderId, productId) -> qty",
            &table,
        )
        .unwrap();
        assert_eq!(
            manager.row("productId").unwrap().singles(),
            ["productName", "qty"]
        );
        assert_eq!(manager.row("orderId").unwrap().singles(), ["qty"]);
    }

    #[test]
    fn test_key_clause_with_list() {
        let table = order_table();
        let manager = parse_dependencies("KEY: (orderId, productId)", &table).unwrap();
        assert_eq!(manager.primary_keys(), ["orderId", "productId"]);
    }

    #[test]
    fn test_second_key_clause_is_fatal() {
        let table = order_table();
        let err =
            parse_dependencies("KEY: orderId\nKEY: productId", &table).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::DuplicatePrimaryKey));
    }

    #[test]
    fn test_unknown_column_is_fatal() {
        let table = order_table();
        let err = parse_dependencies("missing -> qty", &table).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnknownColumn { ref name } if name == "missing"));
    }

    #[test]
    fn test_restating_a_single_block_is_fatal() {
        let table = order_table();
        let err = parse_dependencies(
            "productId -> productName\nproductId -> qty",
            &table,
        )
        .unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::DuplicateSingleBlock { ref determinant } if determinant == "productId"
        ));
    }

    #[test]
    fn test_restating_a_multi_block_is_fatal() {
        let table = order_table();
        let err = parse_dependencies(
            "productId ->> qty\nproductId ->> productName",
            &table,
        )
        .unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::DuplicateMultiBlock { .. }));
    }

    #[test]
    fn test_repeated_rhs_in_one_block_is_fatal() {
        let table = order_table();
        let err = parse_dependencies("orderId -> (qty, qty)", &table).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::DuplicateRhs { ref name } if name == "qty"));
    }

    #[test]
    fn test_missing_arrow_head() {
        let table = order_table();
        let err = parse_dependencies("orderId - qty", &table).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::Unexpected { .. }));
    }

    #[test]
    fn test_newlines_are_insignificant() {
        let table = order_table();
        let manager = parse_dependencies(
            "productId ->\n(productName)\nKEY:\norderId",
            &table,
        )
        .unwrap();
        assert_eq!(manager.row("productId").unwrap().singles(), ["productName"]);
        assert_eq!(manager.primary_keys(), ["orderId"]);
    }
}
