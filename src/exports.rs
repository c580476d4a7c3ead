//! Export forwarding for re-exports of the target library.

use oxc_ast::ast::{ExportAllDeclaration, ExportNamedDeclaration, ModuleExportName};

use crate::classifier::export_name;
use crate::context::PassContext;
use crate::error::{line_column, TransformError};
use crate::scope::{BindingIntrospection, BindingKind};

/// `export { map as m } from 'lib'` -> `export { _map as m }`.
pub fn forward_reexport<'a>(
    ctx: &mut PassContext<'a, '_>,
    decl: &mut ExportNamedDeclaration<'a>,
) -> bool {
    let Some(source) = &decl.source else {
        return false;
    };
    if !ctx.is_target(source.value.as_str()) || decl.export_kind.is_type() {
        return false;
    }

    for specifier in decl.specifiers.iter_mut() {
        let symbol = export_name(&specifier.local).to_string();
        let reference = ctx.imports.resolve(&symbol);
        specifier.local = ModuleExportName::IdentifierReference(reference);
    }
    decl.source = None;
    ctx.note_rewrite();
    true
}

/// `import { map } from 'lib'; export { map }` -> `export { _map as map }`.
///
/// Only named bindings are forwarded; a namespace binding has no single symbol
/// to stand in for it and is left as is.
pub fn forward_local_export<'a>(
    ctx: &mut PassContext<'a, '_>,
    bindings: &dyn BindingIntrospection,
    decl: &mut ExportNamedDeclaration<'a>,
) {
    if decl.source.is_some() {
        return;
    }
    for specifier in decl.specifiers.iter_mut() {
        let ModuleExportName::IdentifierReference(local) = &specifier.local else {
            continue;
        };
        if bindings.binding_kind(local) != Some(BindingKind::NamedImport) {
            continue;
        }
        let Some(symbol) = ctx.named_symbol(local.name.as_str()).map(str::to_string) else {
            continue;
        };
        let reference = ctx.imports.resolve(&symbol);
        specifier.local = ModuleExportName::IdentifierReference(reference);
        ctx.note_rewrite();
    }
}

/// `export * from 'lib'` cannot be narrowed and aborts the pass.
pub fn reject_wildcard(
    ctx: &PassContext<'_, '_>,
    decl: &ExportAllDeclaration<'_>,
    file: &str,
    source_text: &str,
) -> Result<(), TransformError> {
    if !ctx.is_target(decl.source.value.as_str()) || decl.export_kind.is_type() {
        return Ok(());
    }
    let (line, column) = line_column(source_text, decl.span.start);
    Err(TransformError::WildcardReExport {
        library: ctx.library().to_string(),
        file: file.to_string(),
        line,
        column,
    })
}
