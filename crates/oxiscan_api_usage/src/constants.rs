//! Table names and limits shared across the analyzer.

/// Table of APIs invoked as functions: `dep.fn()`
pub const METHOD_TABLE: &str = "methodMap";

/// Table of APIs used as type references: `let x: Dep`
pub const TYPE_TABLE: &str = "typeMap";

/// Catch-all table for every other usage
pub const DEFAULT_TABLE: &str = "apiMap";

/// Longest member chain collapsed into one API name before the usage is
/// dropped as malformed.
pub const MAX_CHAIN_DEPTH: usize = 64;

pub const BASE_SCORE: i64 = 100;
pub const BLACK_API_PENALTY: i64 = 5;
pub const MULTI_VERSION_PENALTY: i64 = 5;
pub const PARSE_ERROR_PENALTY: i64 = 1;
