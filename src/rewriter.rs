//! Use-site rewriting.
//!
//! Rules, each owning one node shape:
//!
//! 1. **Call**: `map(f, xs)` / `pipe(add, inc)` -> callee and bare identifier
//!    arguments bound to named imports become synthetic import references.
//! 2. **Member access**: `R.map` (also `R['map']`, `R?.map`) -> `_map`.
//! 3. **Property**: computed keys and values of object literal properties and
//!    class fields (`{ [map]: 1, f: add, add }`).
//! 4. **Bare identifier**: everything else. Named bindings become references,
//!    namespace bindings become `null`.
//!
//! Identifiers sitting directly in a position owned by rules 2 and 3 are never
//! touched by rule 4; [`OwnedPosition`] lists those positions.

use oxc_allocator::Box as ArenaBox;
use oxc_ast::ast::*;
use oxc_ast::AstBuilder;
use oxc_ast_visit::walk_mut::{
    walk_call_expression, walk_expression, walk_export_named_declaration, walk_program,
    walk_statement,
};
use oxc_ast_visit::VisitMut;
use oxc_span::SPAN;

use crate::classifier::classify_import;
use crate::context::PassContext;
use crate::error::TransformError;
use crate::exports::{forward_local_export, forward_reexport, reject_wildcard};
use crate::scope::{BindingIntrospection, BindingKind};

/// Parent positions whose direct identifier child belongs to the member-access
/// or property rule. Any new position handled by those rules must be added
/// here, or the bare-identifier rule will rewrite the same node again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OwnedPosition {
    MemberObject,
    PropertyKey,
    PropertyValue,
}

pub struct ReferenceRewriter<'a, 'r, 'c> {
    ast: AstBuilder<'a>,
    ctx: &'c mut PassContext<'a, 'r>,
    bindings: &'c dyn BindingIntrospection,
    file: &'c str,
    source_text: &'a str,
    owned: Option<OwnedPosition>,
    error: Option<TransformError>,
}

impl<'a, 'r, 'c> ReferenceRewriter<'a, 'r, 'c> {
    pub fn new(
        ast: AstBuilder<'a>,
        ctx: &'c mut PassContext<'a, 'r>,
        bindings: &'c dyn BindingIntrospection,
        file: &'c str,
    ) -> Self {
        ReferenceRewriter {
            ast,
            ctx,
            bindings,
            file,
            source_text: "",
            owned: None,
            error: None,
        }
    }

    /// The fatal error that stopped the pass, if any.
    pub fn into_error(self) -> Option<TransformError> {
        self.error
    }

    // ───────────────────────────────────────────────────────────────────────
    // binding confirmation
    // ───────────────────────────────────────────────────────────────────────

    /// Canonical symbol when `ident` is a named import of the target library
    /// in its own scope.
    fn named_symbol_of(&self, ident: &IdentifierReference<'a>) -> Option<String> {
        if self.bindings.binding_kind(ident) != Some(BindingKind::NamedImport) {
            return None;
        }
        self.ctx.named_symbol(ident.name.as_str()).map(str::to_string)
    }

    fn is_namespace_ref(&self, ident: &IdentifierReference<'a>) -> bool {
        self.bindings
            .binding_kind(ident)
            .is_some_and(BindingKind::is_namespace)
            && self.ctx.is_namespace(ident.name.as_str())
    }

    fn resolved_ident(&mut self, symbol: &str) -> ArenaBox<'a, IdentifierReference<'a>> {
        let reference = self.ctx.imports.resolve(symbol);
        self.ast.alloc(reference)
    }

    fn record(&mut self, rule: &'static str, symbol: &str) {
        tracing::trace!(rule, symbol, file = self.file, "rewrote reference");
        self.ctx.note_rewrite();
    }

    fn visit_owned(&mut self, position: OwnedPosition, expr: &mut Expression<'a>) {
        self.owned = Some(position);
        self.visit_expression(expr);
        self.owned = None;
    }

    // ───────────────────────────────────────────────────────────────────────
    // rules
    // ───────────────────────────────────────────────────────────────────────

    fn rewrite_call(&mut self, call: &mut CallExpression<'a>) {
        if let Expression::Identifier(callee) = &call.callee {
            if let Some(symbol) = self.named_symbol_of(callee) {
                call.callee = self.ctx.imports.resolve_expression(&symbol);
                self.record("call", &symbol);
            }
        }

        for argument in call.arguments.iter_mut() {
            let Argument::Identifier(ident) = argument else {
                continue;
            };
            if let Some(symbol) = self.named_symbol_of(ident) {
                *argument = Argument::Identifier(self.resolved_ident(&symbol));
                self.record("call-argument", &symbol);
            }
        }
    }

    /// Replaces the whole member expression; returns whether it did.
    ///
    /// The object is looked at through parentheses and TS assertions, so
    /// `(R).map` and `(R as any).map` resolve like `R.map`.
    fn rewrite_member(&mut self, expr: &mut Expression<'a>) -> bool {
        let symbol = match expr {
            Expression::StaticMemberExpression(member)
                if self.namespace_object(&member.object) =>
            {
                member.property.name.to_string()
            }
            Expression::ComputedMemberExpression(member) => match &member.expression {
                Expression::StringLiteral(key) if self.namespace_object(&member.object) => {
                    key.value.to_string()
                }
                _ => return false,
            },
            Expression::ChainExpression(chain) => match &chain.expression {
                ChainElement::StaticMemberExpression(member)
                    if self.namespace_object(&member.object) =>
                {
                    member.property.name.to_string()
                }
                _ => return false,
            },
            _ => return false,
        };

        *expr = self.ctx.imports.resolve_expression(&symbol);
        self.record("member", &symbol);
        true
    }

    fn namespace_object(&self, object: &Expression<'a>) -> bool {
        match object.get_inner_expression() {
            Expression::Identifier(ident) => self.is_namespace_ref(ident),
            _ => false,
        }
    }

    fn rewrite_property_key(&mut self, computed: bool, key: &mut PropertyKey<'a>) {
        if !computed {
            return;
        }
        let PropertyKey::Identifier(ident) = key else {
            return;
        };
        if let Some(symbol) = self.named_symbol_of(ident) {
            *key = PropertyKey::Identifier(self.resolved_ident(&symbol));
            self.record("property-key", &symbol);
        }
    }

    /// Returns whether the value was replaced.
    fn rewrite_property_value(&mut self, value: &mut Expression<'a>) -> bool {
        let Expression::Identifier(ident) = value else {
            return false;
        };
        match self.named_symbol_of(ident) {
            Some(symbol) => {
                *value = self.ctx.imports.resolve_expression(&symbol);
                self.record("property-value", &symbol);
                true
            }
            None => false,
        }
    }

    fn rewrite_bare(&mut self, expr: &mut Expression<'a>) {
        let Expression::Identifier(ident) = expr else {
            return;
        };
        if let Some(symbol) = self.named_symbol_of(ident) {
            *expr = self.ctx.imports.resolve_expression(&symbol);
            self.record("identifier", &symbol);
        } else if self.is_namespace_ref(ident) {
            let name = ident.name.to_string();
            *expr = self.ast.expression_null_literal(SPAN);
            self.record("namespace-null", &name);
        }
    }

    fn visit_property_key_owned(&mut self, computed: bool, key: &mut PropertyKey<'a>) {
        if computed {
            if let Some(expr) = key.as_expression_mut() {
                self.visit_owned(OwnedPosition::PropertyKey, expr);
                return;
            }
        }
        self.visit_property_key(key);
    }
}

impl<'a, 'r, 'c> VisitMut<'a> for ReferenceRewriter<'a, 'r, 'c> {
    fn visit_program(&mut self, program: &mut Program<'a>) {
        self.source_text = program.source_text;
        walk_program(self, program);
    }

    fn visit_statement(&mut self, stmt: &mut Statement<'a>) {
        if self.error.is_some() {
            return;
        }
        if classify_import(self.ctx, stmt) {
            return;
        }
        if let Statement::ExportAllDeclaration(decl) = stmt {
            if let Err(err) = reject_wildcard(self.ctx, decl, self.file, self.source_text) {
                self.error = Some(err);
                return;
            }
        }
        walk_statement(self, stmt);
    }

    fn visit_export_named_declaration(&mut self, decl: &mut ExportNamedDeclaration<'a>) {
        if forward_reexport(self.ctx, decl) {
            return;
        }
        forward_local_export(self.ctx, self.bindings, decl);
        walk_export_named_declaration(self, decl);
    }

    fn visit_expression(&mut self, expr: &mut Expression<'a>) {
        let owned = self.owned.take();

        if matches!(expr, Expression::Identifier(_)) {
            if owned.is_none() {
                self.rewrite_bare(expr);
            }
            return;
        }
        if owned.is_some() && is_transparent_wrapper(expr) {
            // `(R).map`: the wrapped identifier still sits in the owned position.
            self.owned = owned;
            walk_expression(self, expr);
            self.owned = None;
            return;
        }
        if self.rewrite_member(expr) {
            return;
        }
        walk_expression(self, expr);
    }

    fn visit_call_expression(&mut self, call: &mut CallExpression<'a>) {
        self.rewrite_call(call);
        walk_call_expression(self, call);
    }

    fn visit_static_member_expression(&mut self, member: &mut StaticMemberExpression<'a>) {
        self.visit_owned(OwnedPosition::MemberObject, &mut member.object);
    }

    fn visit_computed_member_expression(&mut self, member: &mut ComputedMemberExpression<'a>) {
        self.visit_owned(OwnedPosition::MemberObject, &mut member.object);
        self.visit_expression(&mut member.expression);
    }

    fn visit_private_field_expression(&mut self, member: &mut PrivateFieldExpression<'a>) {
        self.visit_owned(OwnedPosition::MemberObject, &mut member.object);
    }

    fn visit_object_property(&mut self, prop: &mut ObjectProperty<'a>) {
        self.rewrite_property_key(prop.computed, &mut prop.key);
        if self.rewrite_property_value(&mut prop.value) {
            // `{ map }` must keep its key once the value is renamed.
            prop.shorthand = false;
        }

        self.visit_property_key_owned(prop.computed, &mut prop.key);
        self.visit_owned(OwnedPosition::PropertyValue, &mut prop.value);
    }

    fn visit_property_definition(&mut self, def: &mut PropertyDefinition<'a>) {
        self.rewrite_property_key(def.computed, &mut def.key);
        if let Some(value) = &mut def.value {
            self.rewrite_property_value(value);
        }

        for decorator in def.decorators.iter_mut() {
            self.visit_decorator(decorator);
        }
        self.visit_property_key_owned(def.computed, &mut def.key);
        if let Some(value) = &mut def.value {
            self.visit_owned(OwnedPosition::PropertyValue, value);
        }
    }
}

fn is_transparent_wrapper(expr: &Expression<'_>) -> bool {
    matches!(
        expr,
        Expression::ParenthesizedExpression(_)
            | Expression::TSAsExpression(_)
            | Expression::TSSatisfiesExpression(_)
            | Expression::TSNonNullExpression(_)
            | Expression::TSTypeAssertion(_)
    )
}
