//! API usage analysis for TypeScript projects.
//!
//! Scans one or more projects for imports of a single target dependency,
//! resolves every use of the imported bindings through scope analysis and
//! classifies each use into a result table: called methods, type
//! references, or everything else. Black-listed APIs are flagged, installed
//! versions of the target are tallied and an optional score summarizes the
//! findings.
//!
//! # Examples
//!
//! ```no_run
//! use oxiscan_api_usage::{AnalysisConfig, Analyzer, print_summary};
//! use std::io::{BufWriter, Write};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = AnalysisConfig::from_file(std::path::Path::new("oxiscan.json"))?;
//! let report = Analyzer::new(cfg).run()?;
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! print_summary(&mut stdout, &report, 10)?;
//! stdout.flush()?;
//! # Ok(())
//! # }
//! ```
//!
//! Custom plugins are consulted before the built-in ones:
//!
//! ```no_run
//! use oxiscan_api_usage::{
//!     AnalysisConfig, AnalysisPlugin, Analyzer, Usage, record_usage, types::ApiTable,
//! };
//!
//! #[derive(Default)]
//! struct HookPlugin {
//!     table: ApiTable,
//! }
//!
//! impl AnalysisPlugin for HookPlugin {
//!     fn table_name(&self) -> &str {
//!         "hookMap"
//!     }
//!
//!     fn claim(&mut self, usage: &Usage<'_, '_>) -> bool {
//!         let is_hook = usage.occurrence.api_name.starts_with("use");
//!         if is_hook {
//!             record_usage(&mut self.table, &usage.occurrence);
//!         }
//!         is_hook
//!     }
//!
//!     fn table(&self) -> &ApiTable {
//!         &self.table
//!     }
//!
//!     fn table_mut(&mut self) -> &mut ApiTable {
//!         &mut self.table
//!     }
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! # let cfg = AnalysisConfig::default();
//! let _report = Analyzer::new(cfg).with_plugin(HookPlugin::default()).run()?;
//! # Ok(())
//! # }
//! ```

mod analyzer;
mod catalog;
mod config;
pub mod constants;
mod dispatcher;
mod plugin;
mod reporter;
mod resolver;
mod score;
pub mod types;

pub use analyzer::{Analyzer, collect_versions, tag_black_list};
pub use catalog::build_import_catalog;
pub use config::{AnalysisConfig, ConfigError, ScanSource, ScoreMode};
pub use dispatcher::PluginDispatcher;
pub use plugin::{
    AnalysisPlugin, DefaultPlugin, FileContext, MethodPlugin, TypePlugin, Usage, UsageOccurrence,
    record_usage,
};
pub use reporter::{black_listed_usages, print_no_usage_message, print_summary};
pub use resolver::resolve_usages;
pub use score::{ScoreFn, ScorePlugin, default_score};
pub use types::{AnalysisReport, ApiStat, PluginTable, ScoreRecord};
