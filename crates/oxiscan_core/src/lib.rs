//! Core utilities for oxiscan tools.
//!
//! This crate provides the collaborators the usage analyzer is built on:
//! - Enumerating TypeScript sources under a scan path
//! - Parsing a file with oxc and building its symbol table
//! - Mapping byte offsets to line numbers
//! - Reading package manifests and lockfiles

mod collector;
mod constants;
mod manifest;
mod parser;

// Re-export public API
pub use collector::{SourceFile, collect_source_files, scan_root};
pub use constants::{SKIPPED_DIRS, SOURCE_EXTENSIONS};
pub use manifest::{dependency_version, read_json};
pub use parser::{LineIndex, ParsedSource, parse_source, source_type_for};
