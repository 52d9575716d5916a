//! Process-wide parse cache behavior
//!
//! Kept in its own test binary: clearing the global cache would race with
//! pointer-identity assertions running in parallel elsewhere.

use std::sync::Arc;

use appform::{clear_parse_cache, parse_cache_len, parse_expression_cached, FormulaExpr};

#[test]
fn test_global_parse_cache() {
    clear_parse_cache();
    assert_eq!(parse_cache_len(), 0);

    let a = parse_expression_cached("[Price] * [Quantity]");
    let b = parse_expression_cached("  =[Price] * [Quantity]\t");
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(parse_cache_len(), 1);

    // Blank input is answered without an entry
    assert_eq!(*parse_expression_cached("   "), FormulaExpr::Blank);
    assert_eq!(parse_cache_len(), 1);

    let c = parse_expression_cached("[Price] + [Quantity]");
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(parse_cache_len(), 2);

    clear_parse_cache();
    assert_eq!(parse_cache_len(), 0);
    let d = parse_expression_cached("[Price] * [Quantity]");
    assert!(!Arc::ptr_eq(&a, &d));
    assert_eq!(a, d);
}
