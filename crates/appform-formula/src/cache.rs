//! Process-wide parse cache
//!
//! Formulas are re-evaluated for every row and every fixed-point pass, so
//! each distinct formula text is tokenized and parsed once. Entries live for
//! the lifetime of the process; [`clear_parse_cache`] exists for tests and
//! long-running hosts that load many unrelated projects.

use std::sync::Arc;

use ahash::RandomState;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::trace;

use crate::ast::FormulaExpr;
use crate::lexer::normalize_input;
use crate::parser::parse_normalized;

static PARSE_CACHE: Lazy<ParseCache> = Lazy::new(ParseCache::new);

static BLANK: Lazy<Arc<FormulaExpr>> = Lazy::new(|| Arc::new(FormulaExpr::Blank));

/// Parsed ASTs keyed by normalized, trimmed formula text
pub struct ParseCache {
    entries: DashMap<Arc<str>, Arc<FormulaExpr>, RandomState>,
}

impl ParseCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_hasher(RandomState::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Return the cached AST for `input`, parsing it on first use.
    ///
    /// Concurrent first uses of the same text agree on a single shared AST.
    pub fn get_or_parse(&self, input: &str) -> Arc<FormulaExpr> {
        let normalized = normalize_input(input);
        let key = normalized.trim();
        if key.is_empty() {
            return Arc::clone(&BLANK);
        }

        if let Some(hit) = self.entries.get(key) {
            return Arc::clone(hit.value());
        }

        trace!(formula = key, "parse cache miss");
        let (ast, _) = parse_normalized(key);
        self.entries
            .entry(Arc::from(key))
            .or_insert_with(|| Arc::new(ast))
            .clone()
    }
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse formula text through the process-wide cache
///
/// Repeated calls with the same (normalized) text return the same shared AST.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use appform_formula::parse_expression_cached;
///
/// let a = parse_expression_cached("[Price] * [Quantity]");
/// let b = parse_expression_cached("  =[Price] * [Quantity]  ");
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
pub fn parse_expression_cached(input: &str) -> Arc<FormulaExpr> {
    PARSE_CACHE.get_or_parse(input)
}

/// Drop every cached AST
pub fn clear_parse_cache() {
    PARSE_CACHE.clear();
}

/// Number of cached formulas
pub fn parse_cache_len() -> usize {
    PARSE_CACHE.len()
}
