//! Parsers for the two surface languages and their shared diagnostics.

mod deps;
mod schema;

pub use deps::parse_dependencies;
pub use schema::parse_schema;

use crate::lexer::{LexError, Lexer, Token, TokenKind};
use thiserror::Error;

/// Where an error happened, for the three-line caret rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub line_text: String,
    pub line_number: usize,
    pub caret_start: usize,
    pub caret_len: usize,
}

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    Lex(LexError),
    Unknown { literal: String },
    Unexpected { found: String, expected: String },
    UnexpectedEof { expected: String },
    DuplicateColumn { name: String },
    DuplicatePrimaryKey,
    UnknownColumn { name: String },
    DuplicateSingleBlock { determinant: String },
    DuplicateMultiBlock { determinant: String },
    DuplicateRhs { name: String },
}

impl ParseErrorKind {
    /// Stable kind name, quoted literally in rendered messages.
    pub fn name(&self) -> &'static str {
        match self {
            ParseErrorKind::Lex(_) => "Lex",
            ParseErrorKind::Unknown { .. } => "Unknown",
            ParseErrorKind::Unexpected { .. } => "Unexpected",
            ParseErrorKind::UnexpectedEof { .. } => "UnexpectedEof",
            ParseErrorKind::DuplicateColumn { .. } => "DuplicateColumn",
            ParseErrorKind::DuplicatePrimaryKey => "DuplicatePrimaryKey",
            ParseErrorKind::UnknownColumn { .. } => "UnknownColumn",
            ParseErrorKind::DuplicateSingleBlock { .. } => "DuplicateSingleBlock",
            ParseErrorKind::DuplicateMultiBlock { .. } => "DuplicateMultiBlock",
            ParseErrorKind::DuplicateRhs { .. } => "DuplicateRhs",
        }
    }

    fn describe(&self) -> String {
        match self {
            ParseErrorKind::Lex(e) => e.to_string(),
            ParseErrorKind::Unknown { literal } => {
                format!("unknown token \"{literal}\"")
            }
            ParseErrorKind::Unexpected { found, expected } => {
                format!("unexpected token \"{found}\"; expected grammar is {expected}")
            }
            ParseErrorKind::UnexpectedEof { expected } => {
                format!("input ended early; expected grammar is {expected}")
            }
            ParseErrorKind::DuplicateColumn { name } => {
                format!("column \"{name}\" is declared twice")
            }
            ParseErrorKind::DuplicatePrimaryKey => {
                "a KEY clause was already declared".to_string()
            }
            ParseErrorKind::UnknownColumn { name } => {
                format!("\"{name}\" does not name a column of the table")
            }
            ParseErrorKind::DuplicateSingleBlock { determinant } => {
                format!("single-valued dependencies of \"{determinant}\" were already declared")
            }
            ParseErrorKind::DuplicateMultiBlock { determinant } => {
                format!("multi-valued dependencies of \"{determinant}\" were already declared")
            }
            ParseErrorKind::DuplicateRhs { name } => {
                format!("\"{name}\" is listed twice on the right-hand side")
            }
        }
    }
}

/// A fatal parse failure; `Display` echoes the offending line with a caret
/// underline sized to the token, then the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render(.kind, .context))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub context: Option<SourceContext>,
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        Self {
            kind: ParseErrorKind::Lex(e),
            context: None,
        }
    }
}

fn render(kind: &ParseErrorKind, context: &Option<SourceContext>) -> String {
    let message = match context {
        Some(ctx) => format!("line {}: {}: {}", ctx.line_number + 1, kind.name(), kind.describe()),
        None => format!("{}: {}", kind.name(), kind.describe()),
    };
    match context {
        Some(ctx) => {
            let mut caret = " ".repeat(ctx.caret_start);
            caret.push_str(&"^".repeat(ctx.caret_len.max(1)));
            format!("{}\n{}\n{}", ctx.line_text, caret, message)
        }
        None => message,
    }
}

/// Token cursor over a lexed buffer, holding the source lines for error echo.
#[derive(Debug)]
pub(crate) struct TokenStream {
    tokens: Vec<Token>,
    lines: Vec<String>,
    pos: usize,
}

impl TokenStream {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let tokens = Lexer::new(source).tokens()?;
        let lines = source
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        Ok(Self {
            tokens,
            lines,
            pos: 0,
        })
    }

    pub fn has_more(&self) -> bool {
        self.pos < self.tokens.len()
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    pub fn next(&mut self, expected: &str) -> Result<Token, ParseError> {
        match self.tokens.get(self.pos) {
            Some(token) => {
                self.pos += 1;
                Ok(token.clone())
            }
            None => Err(ParseError {
                kind: ParseErrorKind::UnexpectedEof {
                    expected: expected.to_string(),
                },
                context: self.end_context(),
            }),
        }
    }

    pub fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Consumes the next token, requiring `kind`.
    pub fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        let token = self.next(expected)?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(self.fail(&token, expected))
        }
    }

    /// Error at `token`: `Unknown` for unclassified lexemes, `Unexpected` otherwise.
    pub fn fail(&self, token: &Token, expected: &str) -> ParseError {
        if token.kind == TokenKind::Unknown {
            self.error(
                token,
                ParseErrorKind::Unknown {
                    literal: token.text(),
                },
            )
        } else {
            self.error(
                token,
                ParseErrorKind::Unexpected {
                    found: token.text(),
                    expected: expected.to_string(),
                },
            )
        }
    }

    pub fn error(&self, token: &Token, kind: ParseErrorKind) -> ParseError {
        ParseError {
            kind,
            context: Some(SourceContext {
                line_text: self.lines.get(token.line).cloned().unwrap_or_default(),
                line_number: token.line,
                caret_start: token.caret_start(),
                caret_len: token.length,
            }),
        }
    }

    fn end_context(&self) -> Option<SourceContext> {
        let token = self.tokens.last()?;
        Some(SourceContext {
            line_text: self.lines.get(token.line).cloned().unwrap_or_default(),
            line_number: token.line,
            caret_start: token.offset,
            caret_len: 1,
        })
    }
}
