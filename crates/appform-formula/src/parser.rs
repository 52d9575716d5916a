//! Formula parser
//!
//! A recursive descent parser with the following precedence (lowest first):
//! concatenation `&`, comparison, additive, multiplicative, unary sign,
//! primary. The parser never fails: anything it cannot make sense of becomes
//! [`FormulaExpr::Blank`] and parsing continues. Issues are collected so the
//! strict entry point and the diagnostics pass can report them.

use crate::ast::{BinaryOperator, FormulaExpr, TableColumnRef, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::lexer::{normalize_input, Lexer, Token};

/// Nesting depth beyond which the rest of the input is dropped
const MAX_NESTING: usize = 200;

/// Parse a token stream into an AST
pub fn parse(tokens: Vec<Token>) -> FormulaExpr {
    Parser::new(tokens).parse().0
}

/// Parse formula text into an AST without going through the cache
///
/// # Example
/// ```rust
/// use appform_formula::{parse_formula, FormulaExpr};
///
/// assert_eq!(parse_formula("=42"), FormulaExpr::Number(42.0));
/// assert_eq!(parse_formula("   "), FormulaExpr::Blank);
/// ```
pub fn parse_formula(text: &str) -> FormulaExpr {
    parse_with_issues(text).0
}

/// Parse formula text, failing on the first lexical or syntax issue
///
/// # Example
/// ```rust
/// use appform_formula::parse_formula_strict;
///
/// assert!(parse_formula_strict("IF([Done], 1, 0)").is_ok());
/// assert!(parse_formula_strict("(1 + 2").is_err());
/// ```
pub fn parse_formula_strict(text: &str) -> FormulaResult<FormulaExpr> {
    let (expr, mut issues) = parse_with_issues(text);
    if issues.is_empty() {
        Ok(expr)
    } else {
        Err(issues.swap_remove(0))
    }
}

/// Parse formula text, returning the AST along with every issue found
pub(crate) fn parse_with_issues(text: &str) -> (FormulaExpr, Vec<FormulaError>) {
    let normalized = normalize_input(text);
    parse_normalized(normalized.trim())
}

/// Parse text that is already normalized and trimmed (the cache key form)
pub(crate) fn parse_normalized(key: &str) -> (FormulaExpr, Vec<FormulaError>) {
    if key.is_empty() {
        return (FormulaExpr::Blank, Vec::new());
    }

    let (tokens, mut issues) = Lexer::new(key).run();
    let (expr, parse_issues) = Parser::new(tokens).parse();
    issues.extend(parse_issues);
    (expr, issues)
}

/// Formula parser over a token stream
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    issues: Vec<FormulaError>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            issues: Vec::new(),
        }
    }

    fn parse(mut self) -> (FormulaExpr, Vec<FormulaError>) {
        let expr = self.parse_expression();

        // Trailing input is ignored, but reported
        if !self.is_at_end() {
            let rest: Vec<String> = self.tokens[self.pos..].iter().map(|t| t.to_string()).collect();
            self.issues.push(FormulaError::TrailingInput(rest.join(" ")));
        }

        (expr, self.issues)
    }

    // === Token access ===

    fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it equals `expected`
    fn match_token(&mut self, expected: &Token) -> bool {
        if self.current_token() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Track nesting; past the limit the remaining input is abandoned
    fn enter(&mut self) -> bool {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            if !self.issues.contains(&FormulaError::TooDeep) {
                self.issues.push(FormulaError::TooDeep);
            }
            self.pos = self.tokens.len();
            return false;
        }
        true
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // === Expression parsing with precedence ===

    fn parse_expression(&mut self) -> FormulaExpr {
        if !self.enter() {
            self.leave();
            return FormulaExpr::Blank;
        }
        let expr = self.parse_concatenation();
        self.leave();
        expr
    }

    fn parse_concatenation(&mut self) -> FormulaExpr {
        let mut left = self.parse_comparison();

        while self.match_token(&Token::Ampersand) {
            let right = self.parse_comparison();
            left = FormulaExpr::BinaryOp {
                op: BinaryOperator::Concat,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        left
    }

    fn parse_comparison(&mut self) -> FormulaExpr {
        let mut left = self.parse_additive();

        loop {
            let op = match self.current_token() {
                Some(Token::Equal) => BinaryOperator::Equal,
                Some(Token::NotEqual) => BinaryOperator::NotEqual,
                Some(Token::LessThan) => BinaryOperator::LessThan,
                Some(Token::LessEqual) => BinaryOperator::LessEqual,
                Some(Token::GreaterThan) => BinaryOperator::GreaterThan,
                Some(Token::GreaterEqual) => BinaryOperator::GreaterEqual,
                _ => break,
            };

            self.consume();
            let right = self.parse_additive();
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        left
    }

    fn parse_additive(&mut self) -> FormulaExpr {
        let mut left = self.parse_multiplicative();

        loop {
            let op = match self.current_token() {
                Some(Token::Plus) => BinaryOperator::Add,
                Some(Token::Minus) => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume();
            let right = self.parse_multiplicative();
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        left
    }

    fn parse_multiplicative(&mut self) -> FormulaExpr {
        let mut left = self.parse_unary();

        loop {
            let op = match self.current_token() {
                Some(Token::Star) => BinaryOperator::Multiply,
                Some(Token::Slash) => BinaryOperator::Divide,
                _ => break,
            };

            self.consume();
            let right = self.parse_unary();
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        left
    }

    fn parse_unary(&mut self) -> FormulaExpr {
        let op = match self.current_token() {
            Some(Token::Plus) => UnaryOperator::Plus,
            Some(Token::Minus) => UnaryOperator::Negate,
            _ => return self.parse_primary(),
        };

        self.consume();
        if !self.enter() {
            self.leave();
            return FormulaExpr::Blank;
        }
        let operand = self.parse_unary();
        self.leave();

        FormulaExpr::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    fn parse_primary(&mut self) -> FormulaExpr {
        let token = match self.consume() {
            Some(token) => token,
            None => {
                self.issues
                    .push(FormulaError::UnexpectedToken("end of formula".into()));
                return FormulaExpr::Blank;
            }
        };

        match token {
            Token::Number(n) => FormulaExpr::Number(n),
            Token::String(s) => FormulaExpr::String(s),
            Token::Identifier(name) => self.parse_identifier(name),
            Token::Bracket(name) => self.parse_column_path(name),
            Token::LeftParen => {
                let inner = self.parse_expression();
                if !self.match_token(&Token::RightParen) {
                    self.issues.push(FormulaError::UnclosedParen);
                }
                inner
            }
            other => {
                self.issues
                    .push(FormulaError::UnexpectedToken(other.to_string()));
                FormulaExpr::Blank
            }
        }
    }

    /// `TRUE`, `FALSE`, `BLANK`, `Table[Column]` or `NAME(args...)`
    fn parse_identifier(&mut self, name: String) -> FormulaExpr {
        match name.to_uppercase().as_str() {
            "TRUE" => return FormulaExpr::Boolean(true),
            "FALSE" => return FormulaExpr::Boolean(false),
            "BLANK" => return FormulaExpr::Blank,
            _ => {}
        }

        if let Some(Token::Bracket(column)) = self.current_token() {
            let column = column.clone();
            self.consume();
            return FormulaExpr::TableColumnRef(TableColumnRef {
                table: name,
                column,
            });
        }

        if self.match_token(&Token::LeftParen) {
            let args = self.parse_arguments();
            return FormulaExpr::Function { name, args };
        }

        self.issues
            .push(FormulaError::UnexpectedToken(format!("identifier '{}'", name)));
        FormulaExpr::Blank
    }

    /// Arguments after `(`: expressions separated by `,` up to `)`
    fn parse_arguments(&mut self) -> Vec<FormulaExpr> {
        let mut args = Vec::new();
        if self.match_token(&Token::RightParen) {
            return args;
        }

        loop {
            args.push(self.parse_expression());

            if self.match_token(&Token::RightParen) {
                break;
            }
            if self.is_at_end() {
                self.issues.push(FormulaError::UnclosedParen);
                break;
            }
            if !self.match_token(&Token::Comma) {
                let found = self
                    .current_token()
                    .map(|t| format!("{} (expected ',' or ')')", t));
                if let Some(found) = found {
                    self.issues.push(FormulaError::UnexpectedToken(found));
                }
            }
        }

        args
    }

    /// `[A]` optionally followed by `.[B]` segments
    fn parse_column_path(&mut self, first: String) -> FormulaExpr {
        let mut path = vec![first];

        while self.match_token(&Token::Dot) {
            match self.current_token() {
                Some(Token::Bracket(next)) => {
                    path.push(next.clone());
                    self.consume();
                }
                _ => {
                    self.issues
                        .push(FormulaError::UnexpectedToken("'.' without a column after it".into()));
                    break;
                }
            }
        }

        FormulaExpr::ColumnRef(path)
    }
}
