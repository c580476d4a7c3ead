//! Binding introspection.
//!
//! Rewrite rules never look at scopes directly. They ask a
//! [`BindingIntrospection`] whether an identifier reference still resolves to
//! an import binding, which keeps shadowing locals (`function f(map) { map() }`)
//! out of reach of the pass.

use oxc_ast::ast::{
    BindingIdentifier, IdentifierReference, ImportDeclarationSpecifier, Program, Statement,
};
use oxc_ast_visit::Visit;
use oxc_semantic::SemanticBuilder;
use oxc_syntax::reference::ReferenceId;
use std::collections::{HashMap, HashSet};

/// Declaration kind of an import binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// `import R from 'lib'`
    DefaultImport,
    /// `import * as R from 'lib'`
    NamespaceImport,
    /// `import { map } from 'lib'`
    NamedImport,
}

impl BindingKind {
    /// Whether the binding stands for the whole module namespace.
    pub fn is_namespace(self) -> bool {
        matches!(self, BindingKind::DefaultImport | BindingKind::NamespaceImport)
    }
}

/// Answers "is this reference bound to an import, and of which kind" for the
/// lexical scope the reference sits in.
pub trait BindingIntrospection {
    /// `None` when the reference is unresolved or bound to anything other than
    /// an import specifier.
    fn binding_kind(&self, reference: &IdentifierReference<'_>) -> Option<BindingKind>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// SEMANTIC BINDINGS
// ═══════════════════════════════════════════════════════════════════════════════

/// [`BindingIntrospection`] backed by `oxc_semantic` scope resolution.
///
/// The reference table is captured before the rewrite starts, so nodes the
/// pass synthesizes later (which carry no reference id) never resolve.
#[derive(Debug, Default)]
pub struct SemanticBindings {
    kinds: HashMap<ReferenceId, BindingKind>,
}

impl SemanticBindings {
    pub fn build(program: &Program<'_>) -> Self {
        let ret = SemanticBuilder::new().build(program);
        if !ret.errors.is_empty() {
            tracing::debug!(
                errors = ret.errors.len(),
                "semantic analysis reported errors, continuing with partial scope data"
            );
        }
        let scoping = ret.semantic.scoping();

        let mut kinds = HashMap::new();
        for stmt in &program.body {
            let Statement::ImportDeclaration(decl) = stmt else {
                continue;
            };
            let Some(specifiers) = &decl.specifiers else {
                continue;
            };
            for specifier in specifiers {
                let (local, kind) = specifier_binding(specifier);
                let Some(symbol_id) = local.symbol_id.get() else {
                    continue;
                };
                for &reference_id in scoping.get_resolved_reference_ids(symbol_id) {
                    kinds.insert(reference_id, kind);
                }
            }
        }

        SemanticBindings { kinds }
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl BindingIntrospection for SemanticBindings {
    fn binding_kind(&self, reference: &IdentifierReference<'_>) -> Option<BindingKind> {
        let reference_id = reference.reference_id.get()?;
        self.kinds.get(&reference_id).copied()
    }
}

pub(crate) fn specifier_binding<'s, 'a>(
    specifier: &'s ImportDeclarationSpecifier<'a>,
) -> (&'s BindingIdentifier<'a>, BindingKind) {
    match specifier {
        ImportDeclarationSpecifier::ImportSpecifier(s) => (&s.local, BindingKind::NamedImport),
        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
            (&s.local, BindingKind::DefaultImport)
        }
        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
            (&s.local, BindingKind::NamespaceImport)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAME INVENTORY
// ═══════════════════════════════════════════════════════════════════════════════

/// Every identifier name used or declared in a file. Synthetic import names
/// are picked outside this set.
pub fn collect_names(program: &Program<'_>) -> HashSet<String> {
    let mut collector = NameCollector {
        names: HashSet::new(),
    };
    collector.visit_program(program);
    collector.names
}

struct NameCollector {
    names: HashSet<String>,
}

impl<'a> Visit<'a> for NameCollector {
    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        self.names.insert(ident.name.to_string());
    }

    fn visit_binding_identifier(&mut self, ident: &BindingIdentifier<'a>) {
        self.names.insert(ident.name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_ast::ast::{Argument, Expression};
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn call_arguments<'p, 'a>(program: &'p Program<'a>, index: usize) -> &'p [Argument<'a>] {
        match &program.body[index] {
            Statement::ExpressionStatement(stmt) => match &stmt.expression {
                Expression::CallExpression(call) => &call.arguments,
                _ => panic!("expected call expression"),
            },
            _ => panic!("expected expression statement"),
        }
    }

    fn argument_ident<'p, 'a>(arg: &'p Argument<'a>) -> &'p IdentifierReference<'a> {
        match arg {
            Argument::Identifier(ident) => ident,
            _ => panic!("expected identifier argument"),
        }
    }

    #[test]
    fn test_import_kinds_resolved() {
        let allocator = Allocator::default();
        let code = "import R from 'ramda';\nimport * as N from 'ramda';\nimport { map as m } from 'ramda';\nconst local = 1;\nf(R, N, m, local, unknown);";
        let ret = Parser::new(&allocator, code, SourceType::mjs()).parse();
        let bindings = SemanticBindings::build(&ret.program);

        let args = call_arguments(&ret.program, 4);
        let kinds: Vec<_> = args
            .iter()
            .map(|arg| bindings.binding_kind(argument_ident(arg)))
            .collect();
        assert_eq!(
            kinds,
            vec![
                Some(BindingKind::DefaultImport),
                Some(BindingKind::NamespaceImport),
                Some(BindingKind::NamedImport),
                None,
                None,
            ]
        );
    }

    #[test]
    fn test_shadowed_import_not_reported() {
        let allocator = Allocator::default();
        let code = "import { map } from 'ramda';\nfunction g(map) { f(map); }\nf(map);";
        let ret = Parser::new(&allocator, code, SourceType::mjs()).parse();
        let bindings = SemanticBindings::build(&ret.program);

        let outer = call_arguments(&ret.program, 2);
        assert_eq!(
            bindings.binding_kind(argument_ident(&outer[0])),
            Some(BindingKind::NamedImport)
        );

        let Statement::FunctionDeclaration(func) = &ret.program.body[1] else {
            panic!("expected function declaration");
        };
        let body = func.body.as_ref().unwrap();
        let Statement::ExpressionStatement(stmt) = &body.statements[0] else {
            panic!("expected expression statement");
        };
        let Expression::CallExpression(call) = &stmt.expression else {
            panic!("expected call");
        };
        assert_eq!(bindings.binding_kind(argument_ident(&call.arguments[0])), None);
    }

    #[test]
    fn test_collect_names() {
        let allocator = Allocator::default();
        let code = "import { map } from 'ramda';\nconst _map = 1;\nfoo(bar);";
        let ret = Parser::new(&allocator, code, SourceType::mjs()).parse();
        let names = collect_names(&ret.program);
        for name in ["map", "_map", "foo", "bar"] {
            assert!(names.contains(name), "missing {}", name);
        }
    }
}
