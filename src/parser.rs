use crate::lang::node::{BinaryOp, Expr, Stmt, UnaryOp};
use crate::lang::program::Program;
use crate::lexer::{Span, Spanned};
use crate::parser_error::ParserError;
use crate::token::Token;

/// Recursive-descent parser for flint.
///
/// The parser consumes a stream of lexed `Spanned` tokens and produces a
/// `Program`: a list of `;`-separated statements, each either an assignment
/// (`x = expr`, `local x = expr`) or a bare expression.
///
/// Binary operators come in three left-associative precedence levels
/// (lowest first): `min`/`max`, then `+`/`-`, then `*`/`/`/`mod`. Unary
/// operators bind tighter than any binary operator.
pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    /// Span of the most recently consumed token.
    ///
    /// Used to provide stable source locations for errors that occur after
    /// advancing past the last token or at end-of-file.
    last_span: Option<Span>,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Parser {
            tokens,
            pos: 0,
            last_span: None,
        }
    }

    /// Returns the current token without consuming it.
    fn current(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    /// Advances the token stream by one.
    ///
    /// This also updates `last_span` to the consumed token's span so that
    /// EOF-related errors can still report a useful location.
    fn advance(&mut self) {
        if let Some(s) = self.tokens.get(self.pos) {
            self.last_span = Some(s.span.clone());
        }
        self.pos += 1;
    }

    /// Peeks the current token kind without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    /// Peeks the next token kind without consuming anything.
    fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1).map(|s| &s.token)
    }

    /// Constructs a `ParserError` at the most relevant location.
    fn error(&self, message: &str) -> ParserError {
        if let Some(spanned) = self.current() {
            ParserError {
                message: message.to_string(),
                line: spanned.span.line,
                col: spanned.span.col,
            }
        } else if let Some(span) = &self.last_span {
            ParserError {
                message: message.to_string(),
                line: span.line,
                col: span.col,
            }
        } else {
            ParserError {
                message: message.to_string(),
                line: 1,
                col: 1,
            }
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), ParserError> {
        if self.peek() == Some(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&format!("expected {}", what)))
        }
    }

    pub fn parse(&mut self) -> Result<Program, ParserError> {
        let mut statements = Vec::new();

        loop {
            match self.peek() {
                None | Some(Token::Eof) => break,
                // Tolerate empty statements (trailing or doubled semicolons)
                Some(Token::Semicolon) => {
                    self.advance();
                    continue;
                }
                Some(_) => {}
            }

            statements.push(self.parse_stmt()?);

            match self.peek() {
                None | Some(Token::Eof) => break,
                Some(Token::Semicolon) => self.advance(),
                Some(_) => {
                    return Err(self.error("expected ';' between statements"));
                }
            }
        }

        Ok(Program { statements })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParserError> {
        match (self.peek(), self.peek_next()) {
            (Some(Token::Local), _) => {
                self.advance();
                let name = match self.peek().cloned() {
                    Some(Token::Ident(name)) => {
                        self.advance();
                        name
                    }
                    _ => return Err(self.error("expected variable name after 'local'")),
                };
                self.expect(&Token::Assign, "'=' after variable name")?;
                let expr = self.parse_expr()?;
                Ok(Stmt::Assign {
                    name,
                    local: true,
                    expr,
                })
            }
            (Some(Token::Ident(_)), Some(Token::Assign)) => {
                let name = match self.peek().cloned() {
                    Some(Token::Ident(name)) => name,
                    _ => unreachable!("peeked Ident"),
                };
                self.advance();
                self.advance();
                let expr = self.parse_expr()?;
                Ok(Stmt::Assign {
                    name,
                    local: false,
                    expr,
                })
            }
            _ => Ok(Stmt::Expr(self.parse_expr()?)),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ParserError> {
        self.parse_minmax()
    }

    fn parse_minmax(&mut self) -> Result<Expr, ParserError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Min) => BinaryOp::Min,
                Some(Token::Max) => BinaryOp::Max,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParserError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr, ParserError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Mod) => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParserError> {
        let op = match self.peek() {
            Some(Token::Minus) => UnaryOp::Neg,
            Some(Token::Sqrt) => UnaryOp::Sqrt,
            Some(Token::Abs) => UnaryOp::Abs,
            Some(Token::Floor) => UnaryOp::Floor,
            Some(Token::Ceil) => UnaryOp::Ceil,
            Some(Token::Str) => UnaryOp::Str,
            Some(Token::Count) => UnaryOp::Count,
            _ => return self.parse_primary(),
        };
        self.advance();
        let expr = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            expr: Box::new(expr),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParserError> {
        match self.peek().cloned() {
            Some(Token::Number(n)) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            Some(Token::String(s)) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            Some(Token::Bool(b)) => {
                self.advance();
                Ok(Expr::Bool(b))
            }
            Some(Token::Ident(name)) => {
                self.advance();
                Ok(Expr::Variable(name))
            }
            Some(Token::LParen) => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(&Token::RParen, "')' to close parenthesized expression")?;
                Ok(expr)
            }
            Some(Token::LBracket) => {
                self.advance();
                let mut elements = Vec::new();
                if self.peek() != Some(&Token::RBracket) {
                    loop {
                        elements.push(self.parse_expr()?);
                        match self.peek() {
                            Some(Token::Comma) => self.advance(),
                            _ => break,
                        }
                    }
                }
                self.expect(&Token::RBracket, "']' to close array literal")?;
                Ok(Expr::Array(elements))
            }
            _ => Err(self.error("expected expression")),
        }
    }
}
