//! Binding classification of target-library import declarations.

use oxc_ast::ast::{
    ImportDeclaration, ImportDeclarationSpecifier, ImportOrExportKind, ModuleExportName, Statement,
};

use crate::context::PassContext;

/// Records the bindings of a target-library import and schedules the
/// declaration for removal. Returns `false` for any other statement.
///
/// Type-only imports have no runtime use site and are left alone. Inline type
/// specifiers (`import { type Ord, map } from 'lib'`) survive as an
/// `import type { Ord } from 'lib'` declaration in place of the original.
pub fn classify_import<'a>(ctx: &mut PassContext<'a, '_>, stmt: &mut Statement<'a>) -> bool {
    let Statement::ImportDeclaration(decl) = stmt else {
        return false;
    };
    if !ctx.is_target(decl.source.value.as_str()) || decl.import_kind.is_type() {
        return false;
    }

    let (type_specifiers, value_specifiers) = match &decl.specifiers {
        Some(specifiers) => {
            let types = specifiers.iter().filter(|s| is_type_specifier(s)).count();
            (types, specifiers.len() - types)
        }
        None => (0, 0),
    };
    if type_specifiers > 0 && value_specifiers == 0 {
        return false;
    }

    if let Some(specifiers) = &decl.specifiers {
        for specifier in specifiers {
            match specifier {
                ImportDeclarationSpecifier::ImportSpecifier(s) if s.import_kind.is_type() => {}
                ImportDeclarationSpecifier::ImportSpecifier(s) => {
                    ctx.bind_named(s.local.name.as_str(), export_name(&s.imported));
                }
                ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                    ctx.bind_namespace(s.local.name.as_str());
                }
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                    ctx.bind_namespace(s.local.name.as_str());
                }
            }
        }
    }

    tracing::trace!(library = ctx.library(), "classified import declaration");
    if type_specifiers > 0 {
        keep_type_specifiers(decl);
        ctx.note_rewrite();
    } else {
        ctx.schedule_removal(stmt);
    }
    true
}

fn is_type_specifier(specifier: &ImportDeclarationSpecifier<'_>) -> bool {
    matches!(specifier, ImportDeclarationSpecifier::ImportSpecifier(s) if s.import_kind.is_type())
}

/// Narrows a mixed declaration to `import type { .. }` of its type specifiers.
fn keep_type_specifiers(decl: &mut ImportDeclaration<'_>) {
    if let Some(specifiers) = &mut decl.specifiers {
        specifiers.retain(is_type_specifier);
        for specifier in specifiers.iter_mut() {
            if let ImportDeclarationSpecifier::ImportSpecifier(s) = specifier {
                s.import_kind = ImportOrExportKind::Value;
            }
        }
    }
    decl.import_kind = ImportOrExportKind::Type;
}

pub(crate) fn export_name<'s>(name: &'s ModuleExportName<'_>) -> &'s str {
    match name {
        ModuleExportName::IdentifierName(id) => id.name.as_str(),
        ModuleExportName::IdentifierReference(id) => id.name.as_str(),
        ModuleExportName::StringLiteral(s) => s.value.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::LibraryLayout;
    use oxc_allocator::Allocator;
    use oxc_ast::AstBuilder;
    use oxc_parser::Parser;
    use oxc_span::SourceType;
    use std::collections::HashSet;

    #[test]
    fn test_classify_accumulates_tables() {
        let allocator = Allocator::default();
        let code = "import R, { map as m, 'filter' as f } from 'ramda';\nimport * as N from 'ramda';\nimport { other } from 'lodash';\nimport type { Ord } from 'ramda';";
        let source_type = SourceType::mjs().with_typescript(true);
        let mut program = Parser::new(&allocator, code, source_type).parse().program;
        let layout = LibraryLayout::new("ramda", false);
        let mut ctx = PassContext::new(
            AstBuilder::new(&allocator),
            "ramda",
            &layout,
            HashSet::new(),
        );

        let classified: Vec<bool> = program
            .body
            .iter_mut()
            .map(|stmt| classify_import(&mut ctx, stmt))
            .collect();
        assert_eq!(classified, vec![true, true, false, false]);

        assert!(ctx.is_namespace("R"));
        assert!(ctx.is_namespace("N"));
        assert_eq!(ctx.named_symbol("m"), Some("map"));
        assert_eq!(ctx.named_symbol("f"), Some("filter"));
        assert_eq!(ctx.named_symbol("other"), None);
        assert_eq!(ctx.named_symbol("Ord"), None);

        assert!(matches!(program.body[0], Statement::EmptyStatement(_)));
        assert!(matches!(program.body[2], Statement::ImportDeclaration(_)));
        assert!(matches!(program.body[3], Statement::ImportDeclaration(_)));
    }

    #[test]
    fn test_inline_type_specifiers_are_kept() {
        let allocator = Allocator::default();
        let code = "import { type Ord, map } from 'ramda';\nimport { type Pred } from 'ramda';";
        let source_type = SourceType::ts();
        let mut program = Parser::new(&allocator, code, source_type).parse().program;
        let layout = LibraryLayout::new("ramda", false);
        let mut ctx = PassContext::new(
            AstBuilder::new(&allocator),
            "ramda",
            &layout,
            HashSet::new(),
        );

        assert!(classify_import(&mut ctx, &mut program.body[0]));
        assert!(!classify_import(&mut ctx, &mut program.body[1]));
        assert_eq!(ctx.named_symbol("map"), Some("map"));
        assert_eq!(ctx.named_symbol("Ord"), None);
        assert_eq!(ctx.named_symbol("Pred"), None);

        let Statement::ImportDeclaration(decl) = &program.body[0] else {
            panic!("expected the type import to stay");
        };
        assert!(decl.import_kind.is_type());
        let specifiers = decl.specifiers.as_ref().unwrap();
        assert_eq!(specifiers.len(), 1);
        let ImportDeclarationSpecifier::ImportSpecifier(ord) = &specifiers[0] else {
            panic!("expected a named specifier");
        };
        assert_eq!(ord.local.name.as_str(), "Ord");
        assert!(!ord.import_kind.is_type());
    }
}
