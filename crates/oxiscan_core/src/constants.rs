//! Constants for source file discovery.
//!
//! Only TypeScript sources are analyzed. Declaration files (`.d.ts`) end in
//! `.ts` and are picked up as well, since they can import types from the
//! target dependency.

/// File extensions of sources that are scanned for imports
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "ts",  // TypeScript (also matches .d.ts)
    "tsx", // TypeScript with JSX
];

/// Directory names never descended into, even when not gitignored
pub const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_extensions_are_typescript_only() {
        assert_eq!(SOURCE_EXTENSIONS, &["ts", "tsx"]);
        assert!(!SOURCE_EXTENSIONS.contains(&"js"));
    }

    #[test]
    fn test_node_modules_is_skipped() {
        assert!(SKIPPED_DIRS.contains(&"node_modules"));
    }
}
