use log::{debug, trace, warn};
use oxc_ast::{AstKind, ast::*};
use oxc_ast_visit::Visit;
use oxc_semantic::Scoping;
use oxc_span::{Atom, GetSpan, Span};
use oxc_syntax::symbol::SymbolId;

use oxiscan_core::LineIndex;

use crate::{
    constants::MAX_CHAIN_DEPTH,
    dispatcher::PluginDispatcher,
    plugin::{Usage, UsageOccurrence},
    types::{FileRef, ImportCatalog},
};

/// The member chain an identifier sits at the bottom of.
struct Chain<'a> {
    api_name: String,
    depth: usize,
    base_span: Span,
    parent: AstKind<'a>,
}

/// Finds every confirmed usage of a cataloged binding in `program` and hands
/// each one to `dispatcher`. Returns the number of usages found.
pub fn resolve_usages<'a>(
    program: &Program<'a>,
    scoping: &Scoping,
    catalog: &ImportCatalog,
    lines: &LineIndex,
    analysis_target: &str,
    file: &FileRef,
    dispatcher: &mut PluginDispatcher,
) -> usize {
    let mut visitor = UsageVisitor {
        catalog,
        scoping,
        lines,
        analysis_target,
        file,
        dispatcher,
        ancestors: Vec::new(),
        confirmed: 0,
    };
    visitor.visit_program(program);
    debug!("Found {} usages of '{}' in {}", visitor.confirmed, analysis_target, file);
    visitor.confirmed
}

struct UsageVisitor<'v, 'a> {
    catalog: &'v ImportCatalog,
    scoping: &'v Scoping,
    lines: &'v LineIndex,
    analysis_target: &'v str,
    file: &'v FileRef,
    dispatcher: &'v mut PluginDispatcher,
    ancestors: Vec<AstKind<'a>>,
    confirmed: usize,
}

impl<'a> Visit<'a> for UsageVisitor<'_, 'a> {
    fn enter_node(&mut self, kind: AstKind<'a>) {
        self.ancestors.push(kind);
    }

    fn leave_node(&mut self, _kind: AstKind<'a>) {
        self.ancestors.pop();
    }

    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        self.check_identifier(it);
    }
}

impl<'v, 'a> UsageVisitor<'v, 'a> {
    fn check_identifier(&mut self, ident: &IdentifierReference<'a>) {
        let catalog: &'v ImportCatalog = self.catalog;
        let Some(binding) = catalog.get(ident.name.as_str()) else {
            return;
        };
        if ident.span == binding.identifier_span {
            return;
        }
        if self.symbol_of(ident) != Some(binding.symbol_id) {
            trace!(
                "'{}' at {:?} in {} is a different declaration",
                ident.name, ident.span, self.file
            );
            return;
        }

        let Some(chain) = collapse_chain(&self.ancestors, ident.name, ident.span) else {
            trace!("Discarding '{}' in {}: no enclosing node", ident.name, self.file);
            return;
        };

        let occurrence = UsageOccurrence {
            api_name: chain.api_name,
            chain_depth: chain.depth,
            binding,
            file: self.file,
            line: self.lines.line_of(ident.span.start),
        };
        let usage = Usage {
            occurrence,
            base_span: chain.base_span,
            parent: chain.parent,
            analysis_target: self.analysis_target,
        };
        self.confirmed += 1;
        self.dispatcher.dispatch(&usage);
    }

    fn symbol_of(&self, ident: &IdentifierReference<'a>) -> Option<SymbolId> {
        let reference_id = ident.reference_id.get()?;
        self.scoping.get_reference(reference_id).symbol_id()
    }
}

/// Climbs from an identifier through every member access it is the object of.
///
/// `ancestors` is the path from the root down to (not including) the
/// identifier. Returns `None` when there is no enclosing node or the chain is
/// longer than `MAX_CHAIN_DEPTH`.
fn collapse_chain<'a>(ancestors: &[AstKind<'a>], name: Atom<'_>, span: Span) -> Option<Chain<'a>> {
    let mut api_name = name.to_string();
    let mut depth = 0;
    let mut current = span;

    for &ancestor in ancestors.iter().rev() {
        match member_access(ancestor) {
            Some((object, property)) if object == current => {
                if depth == MAX_CHAIN_DEPTH {
                    warn!("Member chain '{}' exceeds {} levels, dropping it", api_name, depth);
                    return None;
                }
                api_name.push('.');
                api_name.push_str(&property);
                depth += 1;
                current = ancestor.span();
            }
            // a node spanning exactly the chain only wraps it, except a type
            // reference without type arguments
            _ if ancestor.span() == current
                && !matches!(ancestor, AstKind::TSTypeReference(_)) =>
            {
                continue;
            }
            _ => return Some(Chain { api_name, depth, base_span: current, parent: ancestor }),
        }
    }
    None
}

/// Object span and property name of a non-computed member access.
fn member_access<'a>(kind: AstKind<'a>) -> Option<(Span, Atom<'a>)> {
    match kind {
        AstKind::StaticMemberExpression(m) => Some((m.object.span(), m.property.name)),
        // `ns.Type` in type position
        AstKind::TSQualifiedName(q) => Some((q.left.span(), q.right.name)),
        // `<ns.Component />`
        AstKind::JSXMemberExpression(j) => Some((j.object.span(), j.property.name)),
        _ => None,
    }
}
