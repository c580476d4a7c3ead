//! Synthetic default-import registration.

use lazy_static::lazy_static;
use oxc_ast::ast::{ImportOrExportKind, Statement};
use oxc_ast::AstBuilder;
use oxc_span::SPAN;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

lazy_static! {
    static ref NON_IDENTIFIER: Regex = Regex::new(r"[^A-Za-z0-9_$]+").unwrap();
    static ref TRAILING_DIGITS: Regex = Regex::new(r"[0-9]+$").unwrap();
}

/// An import the pass added to a file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyntheticImport {
    /// Local binding name, e.g. `_map`.
    pub local: String,
    /// Module specifier, e.g. `ramda/src/map`.
    pub source: String,
    /// Canonical library symbol the import stands for, e.g. `map`.
    pub symbol: String,
}

/// Registers `import <local> from "<path>"` declarations for one file.
///
/// Local names are unique against every identifier already present in the
/// file and against each other. Declarations are buffered and handed to the
/// finalizer, which places them at the top of the program.
pub struct ImportInjector<'a> {
    ast: AstBuilder<'a>,
    taken: HashSet<String>,
    injected: Vec<SyntheticImport>,
    statements: Vec<Statement<'a>>,
}

impl<'a> ImportInjector<'a> {
    pub fn new(ast: AstBuilder<'a>, taken: HashSet<String>) -> Self {
        ImportInjector {
            ast,
            taken,
            injected: Vec::new(),
            statements: Vec::new(),
        }
    }

    /// Adds a default import of `module_path` for `symbol` and returns its
    /// local name.
    pub fn inject_default(&mut self, module_path: &str, symbol: &str) -> &'a str {
        let local = self.generate_uid(symbol);
        let local_name: &'a str = self.ast.allocator.alloc_str(&local);
        let source_value: &'a str = self.ast.allocator.alloc_str(module_path);

        let specifier = self
            .ast
            .import_declaration_specifier_import_default_specifier(
                SPAN,
                self.ast.binding_identifier(SPAN, local_name),
            );
        let decl = self.ast.alloc_import_declaration(
            SPAN,
            Some(self.ast.vec1(specifier)),
            self.ast.string_literal(SPAN, source_value, None),
            None,
            None::<oxc_allocator::Box<'a, oxc_ast::ast::WithClause<'a>>>,
            ImportOrExportKind::Value,
        );
        self.statements.push(Statement::ImportDeclaration(decl));

        self.injected.push(SyntheticImport {
            local,
            source: module_path.to_string(),
            symbol: symbol.to_string(),
        });
        local_name
    }

    pub fn injected(&self) -> &[SyntheticImport] {
        &self.injected
    }

    pub fn into_parts(self) -> (Vec<Statement<'a>>, Vec<SyntheticImport>) {
        (self.statements, self.injected)
    }

    fn generate_uid(&mut self, hint: &str) -> String {
        let base = uid_base(hint);
        let mut i = 1;
        loop {
            let candidate = if i > 1 {
                format!("_{}{}", base, i)
            } else {
                format!("_{}", base)
            };
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            i += 1;
        }
    }
}

fn uid_base(hint: &str) -> String {
    let ident = NON_IDENTIFIER.replace_all(hint, "_");
    let ident = ident.trim_start_matches('_');
    let ident = TRAILING_DIGITS.replace(ident, "");
    if ident.is_empty() {
        "temp".to_string()
    } else {
        ident.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_ast::ast::ImportDeclarationSpecifier;
    use oxc_codegen::Codegen;

    #[test]
    fn test_uid_base() {
        assert_eq!(uid_base("map"), "map");
        assert_eq!(uid_base("__"), "temp");
        assert_eq!(uid_base("_private"), "private");
        assert_eq!(uid_base("add3"), "add");
        assert_eq!(uid_base("foo-bar"), "foo_bar");
    }

    #[test]
    fn test_inject_default_statement() {
        let allocator = Allocator::default();
        let mut injector = ImportInjector::new(AstBuilder::new(&allocator), HashSet::new());
        let local = injector.inject_default("ramda/src/map", "map");
        assert_eq!(local, "_map");

        let (statements, injected) = injector.into_parts();
        assert_eq!(statements.len(), 1);
        let Statement::ImportDeclaration(decl) = &statements[0] else {
            panic!("expected import declaration");
        };
        assert_eq!(decl.source.value.as_str(), "ramda/src/map");
        let specifiers = decl.specifiers.as_ref().unwrap();
        assert!(matches!(
            specifiers[0],
            ImportDeclarationSpecifier::ImportDefaultSpecifier(_)
        ));
        assert_eq!(
            injected,
            vec![SyntheticImport {
                local: "_map".to_string(),
                source: "ramda/src/map".to_string(),
                symbol: "map".to_string(),
            }]
        );
    }

    #[test]
    fn test_injected_declaration_prints() {
        let allocator = Allocator::default();
        let mut program = oxc_parser::Parser::new(&allocator, "", oxc_span::SourceType::mjs())
            .parse()
            .program;
        let mut injector = ImportInjector::new(AstBuilder::new(&allocator), HashSet::new());
        injector.inject_default("@scope/lib/src/add", "add");

        let (statements, _) = injector.into_parts();
        program.body.extend(statements);
        let out = Codegen::new().build(&program).code;
        assert!(out.contains("import _add from \"@scope/lib/src/add\";"), "{}", out);
    }

    #[test]
    fn test_uid_avoids_collisions() {
        let allocator = Allocator::default();
        let taken: HashSet<String> = ["_map".to_string(), "_map2".to_string()].into();
        let mut injector = ImportInjector::new(AstBuilder::new(&allocator), taken);
        assert_eq!(injector.inject_default("ramda/src/map", "map"), "_map3");
        assert_eq!(injector.inject_default("ramda/es/map", "map"), "_map4");
    }
}
