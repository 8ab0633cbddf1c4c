use crate::token::Token;

#[derive(Debug, Clone)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub span: Span,
}

#[derive(Debug)]
pub struct LexerError {
    pub message: String,
    pub line: usize,
    pub col: usize,
}

impl std::fmt::Display for LexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.col, self.message)
    }
}

pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current();
        if ch == Some('\n') {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.pos += 1;
        ch
    }

    fn span(&self) -> Span {
        Span {
            line: self.line,
            col: self.col,
        }
    }

    fn error(&self, message: impl Into<String>) -> LexerError {
        LexerError {
            message: message.into(),
            line: self.line,
            col: self.col,
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '#' {
                // Line comment: skip to end of line
                while let Some(ch) = self.current() {
                    if ch == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn read_string(&mut self) -> Result<Token, LexerError> {
        let start_line = self.line;
        let start_col = self.col;
        self.advance();

        let mut string = String::new();
        loop {
            match self.current() {
                Some('"') => {
                    self.advance();
                    return Ok(Token::String(string));
                }
                Some('\\') => {
                    self.advance();
                    match self.current() {
                        Some('n') => string.push('\n'),
                        Some('t') => string.push('\t'),
                        Some('r') => string.push('\r'),
                        Some('\\') => string.push('\\'),
                        Some('"') => string.push('"'),
                        Some('0') => string.push('\0'),
                        Some(ch) => {
                            return Err(self.error(format!("unknown escape sequence: \\{}", ch)));
                        }
                        None => {
                            return Err(self.error("unexpected EOF in escape sequence"));
                        }
                    }
                    self.advance();
                }
                Some('\n') => {
                    return Err(LexerError {
                        message: "unterminated string (newline before closing quote)".to_string(),
                        line: start_line,
                        col: start_col,
                    });
                }
                Some(ch) => {
                    string.push(ch);
                    self.advance();
                }
                None => {
                    return Err(LexerError {
                        message: "unterminated string literal".to_string(),
                        line: start_line,
                        col: start_col,
                    });
                }
            }
        }
    }

    fn read_number(&mut self) -> Result<Token, LexerError> {
        let start_line = self.line;
        let start_col = self.col;

        let mut digits = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if self.current() == Some('.') {
            self.advance();
            digits.push('.');

            let mut saw_fraction = false;
            while let Some(ch) = self.current() {
                if ch.is_ascii_digit() {
                    digits.push(ch);
                    self.advance();
                    saw_fraction = true;
                } else {
                    break;
                }
            }

            if !saw_fraction {
                return Err(LexerError {
                    message: "expected digit after decimal point".to_string(),
                    line: start_line,
                    col: start_col,
                });
            }
        }

        let value: f64 = digits.parse().map_err(|_| LexerError {
            message: format!("invalid number: {}", digits),
            line: start_line,
            col: start_col,
        })?;

        Ok(Token::Number(value))
    }

    fn read_word(&mut self) -> Token {
        let mut word = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match word.as_str() {
            "sqrt" => Token::Sqrt,
            "abs" => Token::Abs,
            "floor" => Token::Floor,
            "ceil" => Token::Ceil,
            "str" => Token::Str,
            "count" => Token::Count,
            "mod" => Token::Mod,
            "min" => Token::Min,
            "max" => Token::Max,
            "local" => Token::Local,
            "true" => Token::Bool(true),
            "false" => Token::Bool(false),
            _ => Token::Ident(word),
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Spanned>, LexerError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            let span = self.span();
            let token = match self.current() {
                None => {
                    tokens.push(Spanned {
                        token: Token::Eof,
                        span,
                    });
                    break;
                }
                Some('"') => self.read_string()?,
                Some(ch) if ch.is_ascii_digit() => self.read_number()?,
                Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => self.read_word(),
                Some('+') => {
                    self.advance();
                    Token::Plus
                }
                Some('-') => {
                    self.advance();
                    Token::Minus
                }
                Some('*') => {
                    self.advance();
                    Token::Star
                }
                Some('/') => {
                    self.advance();
                    Token::Slash
                }
                Some('=') => {
                    self.advance();
                    Token::Assign
                }
                Some(';') => {
                    self.advance();
                    Token::Semicolon
                }
                Some(',') => {
                    self.advance();
                    Token::Comma
                }
                Some('(') => {
                    self.advance();
                    Token::LParen
                }
                Some(')') => {
                    self.advance();
                    Token::RParen
                }
                Some('[') => {
                    self.advance();
                    Token::LBracket
                }
                Some(']') => {
                    self.advance();
                    Token::RBracket
                }
                Some(ch) => {
                    return Err(self.error(format!("unexpected character: {:?}", ch)));
                }
            };

            tokens.push(Spanned { token, span });
        }

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        lexer
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .filter(|t| !matches!(t, Token::Eof))
            .collect()
    }

    #[test]
    fn test_numbers() {
        let t = tokens("12 3.5 0.25");
        assert_eq!(
            t,
            vec![Token::Number(12.0), Token::Number(3.5), Token::Number(0.25)]
        );
    }

    #[test]
    fn test_arithmetic() {
        let t = tokens("1 + 2 * 3");
        assert_eq!(
            t,
            vec![
                Token::Number(1.0),
                Token::Plus,
                Token::Number(2.0),
                Token::Star,
                Token::Number(3.0)
            ]
        );
    }

    #[test]
    fn test_word_operators() {
        let t = tokens("sqrt 16 mod min max");
        assert_eq!(
            t,
            vec![
                Token::Sqrt,
                Token::Number(16.0),
                Token::Mod,
                Token::Min,
                Token::Max
            ]
        );
    }

    #[test]
    fn test_assignment() {
        let t = tokens("local x = 5;");
        assert_eq!(
            t,
            vec![
                Token::Local,
                Token::Ident("x".to_string()),
                Token::Assign,
                Token::Number(5.0),
                Token::Semicolon
            ]
        );
    }

    #[test]
    fn test_array_literal() {
        let t = tokens("[1, 2]");
        assert_eq!(
            t,
            vec![
                Token::LBracket,
                Token::Number(1.0),
                Token::Comma,
                Token::Number(2.0),
                Token::RBracket
            ]
        );
    }

    #[test]
    fn test_string_with_escapes() {
        let t = tokens(r#""a\nb""#);
        assert_eq!(t, vec![Token::String("a\nb".to_string())]);
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("\"oops");
        let err = lexer.tokenize().unwrap_err();
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn test_comment_skipped() {
        let t = tokens("1 # the rest is ignored\n2");
        assert_eq!(t, vec![Token::Number(1.0), Token::Number(2.0)]);
    }

    #[test]
    fn test_namespace_is_plain_ident() {
        let t = tokens("globalnamespace");
        assert_eq!(t, vec![Token::Ident("globalnamespace".to_string())]);
    }

    #[test]
    fn test_dangling_decimal_point() {
        let mut lexer = Lexer::new("3.");
        let err = lexer.tokenize().unwrap_err();
        assert!(err.message.contains("decimal point"));
    }

    #[test]
    fn test_spans_track_lines() {
        let mut lexer = Lexer::new("1\n  2");
        let spanned = lexer.tokenize().unwrap();
        assert_eq!(spanned[0].span.line, 1);
        assert_eq!(spanned[1].span.line, 2);
        assert_eq!(spanned[1].span.col, 3);
    }
}
