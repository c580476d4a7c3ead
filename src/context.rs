//! Per-file pass state and the cleanup finalizer.

use oxc_ast::ast::{Program, Statement};
use oxc_ast::AstBuilder;
use oxc_span::{GetSpan, Span};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::import_cache::ImportResolver;
use crate::injector::{ImportInjector, SyntheticImport};
use crate::resolver::ModuleResolver;

/// Placeholder left where an original import declaration stood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalHandle {
    span: Span,
}

/// What one pass did to one file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    pub namespace_bindings: usize,
    pub named_bindings: usize,
    pub removed_imports: usize,
    pub rewrites: usize,
    pub synthetic_imports: Vec<SyntheticImport>,
}

impl PassReport {
    pub fn changed(&self) -> bool {
        self.removed_imports > 0 || self.rewrites > 0 || !self.synthetic_imports.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PASS CONTEXT
// ═══════════════════════════════════════════════════════════════════════════════

/// Tables for one file. Created when the pass enters a program and consumed by
/// [`PassContext::finish`] when it leaves it.
pub struct PassContext<'a, 'r> {
    ast: AstBuilder<'a>,
    library: &'r str,
    /// local names bound to the whole library
    namespace_bindings: HashSet<String>,
    /// local name -> canonical symbol
    named_bindings: HashMap<String, String>,
    pub(crate) imports: ImportResolver<'a, 'r>,
    pending_removals: Vec<RemovalHandle>,
    rewrites: usize,
}

impl<'a, 'r> PassContext<'a, 'r> {
    pub fn new(
        ast: AstBuilder<'a>,
        library: &'r str,
        resolver: &'r dyn ModuleResolver,
        taken_names: HashSet<String>,
    ) -> Self {
        let injector = ImportInjector::new(ast, taken_names);
        PassContext {
            ast,
            library,
            namespace_bindings: HashSet::new(),
            named_bindings: HashMap::new(),
            imports: ImportResolver::new(ast, resolver, injector),
            pending_removals: Vec::new(),
            rewrites: 0,
        }
    }

    pub fn library(&self) -> &'r str {
        self.library
    }

    pub fn is_target(&self, source: &str) -> bool {
        source == self.library
    }

    pub fn bind_namespace(&mut self, local: &str) {
        self.named_bindings.remove(local);
        self.namespace_bindings.insert(local.to_string());
    }

    pub fn bind_named(&mut self, local: &str, imported: &str) {
        self.namespace_bindings.remove(local);
        self.named_bindings
            .insert(local.to_string(), imported.to_string());
    }

    pub fn is_namespace(&self, local: &str) -> bool {
        self.namespace_bindings.contains(local)
    }

    /// Canonical symbol a named binding was imported as.
    pub fn named_symbol(&self, local: &str) -> Option<&str> {
        self.named_bindings.get(local).map(String::as_str)
    }

    pub fn note_rewrite(&mut self) {
        self.rewrites += 1;
    }

    /// Swaps an import declaration for an inert placeholder and schedules the
    /// placeholder for deletion at file exit.
    pub fn schedule_removal(&mut self, stmt: &mut Statement<'a>) {
        if !matches!(stmt, Statement::ImportDeclaration(_)) {
            return;
        }
        let span = stmt.span();
        *stmt = self.ast.statement_empty(span);
        self.pending_removals.push(RemovalHandle { span });
    }

    /// Deletes scheduled placeholders that are still attached and puts the
    /// synthetic imports at the top of the program.
    pub fn finish(self, program: &mut Program<'a>) -> PassReport {
        let mut removed = 0;
        for handle in &self.pending_removals {
            if detach_placeholder(program, *handle) {
                removed += 1;
            } else {
                tracing::trace!(
                    start = handle.span.start,
                    end = handle.span.end,
                    "import placeholder already detached"
                );
            }
        }

        let (statements, synthetic_imports) = self.imports.into_injector().into_parts();
        if !statements.is_empty() {
            let rest = std::mem::replace(&mut program.body, self.ast.vec());
            program.body.extend(statements);
            program.body.extend(rest);
        }

        PassReport {
            namespace_bindings: self.namespace_bindings.len(),
            named_bindings: self.named_bindings.len(),
            removed_imports: removed,
            rewrites: self.rewrites,
            synthetic_imports,
        }
    }
}

fn detach_placeholder(program: &mut Program<'_>, handle: RemovalHandle) -> bool {
    let position = program.body.iter().position(|stmt| {
        matches!(stmt, Statement::EmptyStatement(empty) if empty.span == handle.span)
    });
    match position {
        Some(index) => {
            program.body.remove(index);
            true
        }
        None => false,
    }
}
