use log::{debug, trace, warn};
use oxc_ast::ast::*;
use oxc_ast_visit::Visit;
use oxc_span::{GetSpan, Span};

use oxiscan_core::LineIndex;

use crate::types::{FileRef, ImportBinding, ImportCatalog, ImportIndex, ImportIndexEntry};

/// Collects the bindings `file` imports from `analysis_target` and folds them
/// into the run-wide `index`.
///
/// Every import declaration counts, including those nested in ambient
/// `declare module` blocks. Must run after semantic analysis: each binding is
/// keyed on the symbol its local name declares.
pub fn build_import_catalog(
    program: &Program<'_>,
    analysis_target: &str,
    file: &FileRef,
    lines: &LineIndex,
    index: &mut ImportIndex,
) -> ImportCatalog {
    let mut collector =
        ImportCollector { analysis_target, file, lines, index, catalog: ImportCatalog::new() };
    collector.visit_program(program);

    let catalog = collector.catalog;
    debug!("Found {} bindings of '{}' in {}", catalog.len(), analysis_target, file);
    catalog
}

struct ImportCollector<'c> {
    analysis_target: &'c str,
    file: &'c FileRef,
    lines: &'c LineIndex,
    index: &'c mut ImportIndex,
    catalog: ImportCatalog,
}

impl<'a> Visit<'a> for ImportCollector<'_> {
    fn visit_import_declaration(&mut self, decl: &ImportDeclaration<'a>) {
        self.add_declaration(decl);
    }
}

impl ImportCollector<'_> {
    fn add_declaration(&mut self, decl: &ImportDeclaration<'_>) {
        if decl.source.value.as_str() != self.analysis_target {
            return;
        }
        // `import 'dep'` binds nothing
        let Some(specifiers) = &decl.specifiers else {
            trace!("Side-effect import of '{}' in {}", self.analysis_target, self.file);
            return;
        };

        let line = self.lines.line_of(decl.span.start);
        for spec in specifiers {
            let (local, origin, span) = match spec {
                ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => (&s.local, None, s.span),
                ImportDeclarationSpecifier::ImportSpecifier(s) => {
                    // `import { a }` shares one node for both names, `import { a as b }` does not
                    let origin = (s.imported.span() != s.local.span)
                        .then(|| s.imported.name().to_string());
                    (&s.local, origin, s.span)
                }
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                    (&s.local, Some("*".to_string()), s.span)
                }
            };
            if self.catalog.contains_key(local.name.as_str()) {
                debug!("'{}' is imported twice in {}, keeping the first", local.name, self.file);
                continue;
            }
            let Some(binding) = binding_for(local, origin, span, line) else {
                warn!("Import '{}' in {} has no resolved symbol, skipping", local.name, self.file);
                continue;
            };
            trace!(
                "Import binding '{}' (origin {:?}) in {}",
                binding.local_name, binding.origin, self.file
            );
            merge_into_index(self.index, &binding, self.file);
            self.catalog.insert(binding.local_name.clone(), binding);
        }
    }
}

fn binding_for(
    local: &BindingIdentifier<'_>,
    origin: Option<String>,
    declaration_span: Span,
    line: usize,
) -> Option<ImportBinding> {
    let symbol_id = local.symbol_id.get()?;
    Some(ImportBinding {
        local_name: local.name.to_string(),
        origin,
        symbol_id,
        declaration_span,
        identifier_span: local.span,
        line,
    })
}

fn merge_into_index(index: &mut ImportIndex, binding: &ImportBinding, file: &FileRef) {
    index
        .entry(binding.local_name.clone())
        .or_insert_with(|| ImportIndexEntry {
            call_origin: binding.origin.clone(),
            call_files: Vec::new(),
        })
        .call_files
        .push(file.clone());
}
