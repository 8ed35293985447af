use log::trace;
use oxc_ast::{AstKind, ast::Program};
use oxc_semantic::Scoping;
use oxc_span::{GetSpan, Span};

use crate::{
    constants::{DEFAULT_TABLE, METHOD_TABLE, TYPE_TABLE},
    types::{ApiTable, FileRef, ImportBinding, ImportCatalog},
};

/// One confirmed use of an imported binding.
#[derive(Debug, Clone)]
pub struct UsageOccurrence<'c> {
    /// Binding name followed by every collapsed member access, e.g. `foo.bar.baz`
    pub api_name: String,
    /// Number of member accesses collapsed into `api_name`
    pub chain_depth: usize,
    pub binding: &'c ImportBinding,
    pub file: &'c FileRef,
    pub line: usize,
}

impl UsageOccurrence<'_> {
    /// `api_name` spelled with the exported name instead of the local alias.
    pub fn origin_name(&self) -> Option<String> {
        let origin = self.binding.origin.as_deref().filter(|o| *o != "*")?;
        let rest = &self.api_name[self.binding.local_name.len()..];
        Some(format!("{origin}{rest}"))
    }
}

/// What a plugin sees when asked to claim an occurrence.
pub struct Usage<'c, 'a> {
    pub occurrence: UsageOccurrence<'c>,
    /// Span of the outermost node of the collapsed chain
    pub base_span: Span,
    /// Syntax node directly enclosing the chain
    pub parent: AstKind<'a>,
    pub analysis_target: &'c str,
}

/// Per-file state handed to `AnalysisPlugin::on_file_end`.
pub struct FileContext<'c, 'a> {
    pub catalog: &'c ImportCatalog,
    pub program: &'c Program<'a>,
    pub scoping: &'c Scoping,
    pub source: &'c str,
    pub file: &'c FileRef,
}

/// A usage classifier owning one result table.
///
/// Plugins are consulted in registration order and the first one whose
/// `claim` returns true records the occurrence; nobody else sees it.
pub trait AnalysisPlugin {
    fn table_name(&self) -> &str;

    /// Returns true if this plugin takes the occurrence, after recording it.
    fn claim(&mut self, usage: &Usage<'_, '_>) -> bool;

    /// Called once after every occurrence of a file has been dispatched.
    fn on_file_end(&mut self, _file: &FileContext<'_, '_>) {}

    fn table(&self) -> &ApiTable;

    fn table_mut(&mut self) -> &mut ApiTable;
}

/// Counts the occurrence under its api name.
pub fn record_usage(table: &mut ApiTable, occurrence: &UsageOccurrence<'_>) {
    let stat = table.entry(occurrence.api_name.clone()).or_default();
    if stat.call_origin.is_none() {
        stat.call_origin = occurrence.origin_name();
    }
    stat.record(&occurrence.file.project, &occurrence.file.path, occurrence.line);
}

/// Claims chains that are called: `dep.fn()`.
#[derive(Debug, Default)]
pub struct MethodPlugin {
    table: ApiTable,
}

impl AnalysisPlugin for MethodPlugin {
    fn table_name(&self) -> &str {
        METHOD_TABLE
    }

    fn claim(&mut self, usage: &Usage<'_, '_>) -> bool {
        let is_callee = matches!(
            usage.parent,
            AstKind::CallExpression(call) if call.callee.span() == usage.base_span
        );
        if is_callee {
            trace!("Method call: {}", usage.occurrence.api_name);
            record_usage(&mut self.table, &usage.occurrence);
        }
        is_callee
    }

    fn table(&self) -> &ApiTable {
        &self.table
    }

    fn table_mut(&mut self) -> &mut ApiTable {
        &mut self.table
    }
}

/// Claims chains used as a type: `let x: Dep.Options`.
#[derive(Debug, Default)]
pub struct TypePlugin {
    table: ApiTable,
}

impl AnalysisPlugin for TypePlugin {
    fn table_name(&self) -> &str {
        TYPE_TABLE
    }

    fn claim(&mut self, usage: &Usage<'_, '_>) -> bool {
        let is_type = matches!(
            usage.parent,
            AstKind::TSTypeReference(reference) if reference.type_name.span() == usage.base_span
        );
        if is_type {
            trace!("Type reference: {}", usage.occurrence.api_name);
            record_usage(&mut self.table, &usage.occurrence);
        }
        is_type
    }

    fn table(&self) -> &ApiTable {
        &self.table
    }

    fn table_mut(&mut self) -> &mut ApiTable {
        &mut self.table
    }
}

/// Catch-all, always registered last.
#[derive(Debug, Default)]
pub struct DefaultPlugin {
    table: ApiTable,
}

impl AnalysisPlugin for DefaultPlugin {
    fn table_name(&self) -> &str {
        DEFAULT_TABLE
    }

    fn claim(&mut self, usage: &Usage<'_, '_>) -> bool {
        record_usage(&mut self.table, &usage.occurrence);
        true
    }

    fn table(&self) -> &ApiTable {
        &self.table
    }

    fn table_mut(&mut self) -> &mut ApiTable {
        &mut self.table
    }
}
