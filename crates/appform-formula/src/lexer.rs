//! Formula tokenizer
//!
//! Turns formula text into a flat token stream. The tokenizer never fails:
//! characters it does not understand are skipped, and the problems it
//! noticed are kept aside for diagnostics.

use std::fmt;

use crate::error::FormulaError;

/// Fold full-width operator glyphs to ASCII and drop one leading `=`.
///
/// Input typed through an IME often contains `＋`, `（` and friends; `×` and
/// `÷` are accepted for multiplication and division. A leading `=` (after
/// optional whitespace) is tolerated for spreadsheet-style input.
pub fn normalize_input(input: &str) -> String {
    let normalized: String = input
        .chars()
        .map(|c| match c {
            '×' | '＊' => '*',
            '÷' | '／' => '/',
            '＋' => '+',
            '－' | '−' => '-',
            '＝' => '=',
            '＆' => '&',
            '＜' => '<',
            '＞' => '>',
            '，' => ',',
            '．' => '.',
            '（' => '(',
            '）' => ')',
            other => other,
        })
        .collect();

    match normalized.trim_start().strip_prefix('=') {
        Some(rest) => rest.to_string(),
        None => normalized,
    }
}

/// Tokenize formula text (normalizing it first)
pub fn tokenize(text: &str) -> Vec<Token> {
    Lexer::new(&normalize_input(text)).run().0
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(f64),
    String(String),

    // Identifiers and references
    /// Bare identifier: function name, `TRUE`/`FALSE`/`BLANK`, table name
    Identifier(String),
    /// `[Column Name]`, contents trimmed
    Bracket(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Ampersand,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,

    // Punctuation
    LeftParen,
    RightParen,
    Comma,
    Dot,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", n),
            Token::String(s) => write!(f, "string \"{}\"", s),
            Token::Identifier(s) => write!(f, "identifier '{}'", s),
            Token::Bracket(s) => write!(f, "'[{}]'", s),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Star => f.write_str("'*'"),
            Token::Slash => f.write_str("'/'"),
            Token::Ampersand => f.write_str("'&'"),
            Token::Equal => f.write_str("'='"),
            Token::NotEqual => f.write_str("'<>'"),
            Token::LessThan => f.write_str("'<'"),
            Token::LessEqual => f.write_str("'<='"),
            Token::GreaterThan => f.write_str("'>'"),
            Token::GreaterEqual => f.write_str("'>='"),
            Token::LeftParen => f.write_str("'('"),
            Token::RightParen => f.write_str("')'"),
            Token::Comma => f.write_str("','"),
            Token::Dot => f.write_str("'.'"),
        }
    }
}

/// Scanner over already-normalized text
pub(crate) struct Lexer {
    chars: Vec<char>,
    pos: usize,
    tokens: Vec<Token>,
    issues: Vec<FormulaError>,
}

impl Lexer {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            tokens: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Scan the whole input, returning the tokens and any lexical issues
    pub(crate) fn run(mut self) -> (Vec<Token>, Vec<FormulaError>) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.pos += 1;
                continue;
            }

            // Two-character operators before single-character ones
            match (c, self.peek_next()) {
                ('<', Some('>')) => {
                    self.push_op(Token::NotEqual, 2);
                    continue;
                }
                ('<', Some('=')) => {
                    self.push_op(Token::LessEqual, 2);
                    continue;
                }
                ('>', Some('=')) => {
                    self.push_op(Token::GreaterEqual, 2);
                    continue;
                }
                _ => {}
            }

            match c {
                '(' => self.push_op(Token::LeftParen, 1),
                ')' => self.push_op(Token::RightParen, 1),
                ',' => self.push_op(Token::Comma, 1),
                '.' => self.push_op(Token::Dot, 1),
                '<' => self.push_op(Token::LessThan, 1),
                '>' => self.push_op(Token::GreaterThan, 1),
                '=' => self.push_op(Token::Equal, 1),
                '&' => self.push_op(Token::Ampersand, 1),
                '+' => self.push_op(Token::Plus, 1),
                '-' => self.push_op(Token::Minus, 1),
                '*' => self.push_op(Token::Star, 1),
                '/' => self.push_op(Token::Slash, 1),
                '[' => self.scan_bracket(),
                '"' => self.scan_string(),
                '0'..='9' => self.scan_number(),
                c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(),
                other => {
                    self.issues.push(FormulaError::UnexpectedCharacter {
                        ch: other,
                        pos: self.pos,
                    });
                    self.pos += 1;
                }
            }
        }

        (self.tokens, self.issues)
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn push_op(&mut self, token: Token, width: usize) {
        self.tokens.push(token);
        self.pos += width;
    }

    fn scan_bracket(&mut self) {
        let start = self.pos;
        self.pos += 1;
        let mut raw = String::new();
        let mut closed = false;

        while let Some(c) = self.peek_char() {
            self.pos += 1;
            if c == ']' {
                closed = true;
                break;
            }
            raw.push(c);
        }

        if !closed {
            self.issues.push(FormulaError::UnterminatedBracket(start));
        }
        self.tokens.push(Token::Bracket(raw.trim().to_string()));
    }

    /// Double-quoted string; only `\\` and `\"` are escapes
    fn scan_string(&mut self) {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        let mut closed = false;

        while let Some(c) = self.peek_char() {
            if c == '"' {
                self.pos += 1;
                closed = true;
                break;
            }
            if c == '\\' {
                if let Some(next @ ('\\' | '"')) = self.peek_next() {
                    out.push(next);
                    self.pos += 2;
                    continue;
                }
            }
            out.push(c);
            self.pos += 1;
        }

        if !closed {
            self.issues.push(FormulaError::UnterminatedString(start));
        }
        self.tokens.push(Token::String(out));
    }

    /// `[0-9]+(\.[0-9]+)?`
    fn scan_number(&mut self) {
        let start = self.pos;
        self.consume_digits();

        if self.peek_char() == Some('.') && self.peek_next().map_or(false, |c| c.is_ascii_digit()) {
            self.pos += 1;
            self.consume_digits();
        }

        let raw: String = self.chars[start..self.pos].iter().collect();
        let value = raw.parse::<f64>().ok().filter(|n| n.is_finite()).unwrap_or(0.0);
        self.tokens.push(Token::Number(value));
    }

    fn consume_digits(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn scan_identifier(&mut self) {
        let start = self.pos;
        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        let ident: String = self.chars[start..self.pos].iter().collect();
        self.tokens.push(Token::Identifier(ident));
    }
}
