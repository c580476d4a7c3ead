//! Memoized per-file synthesis of one import per canonical symbol.

use oxc_allocator::CloneIn;
use oxc_ast::ast::{Expression, IdentifierReference};
use oxc_ast::AstBuilder;
use oxc_span::SPAN;
use std::collections::HashMap;

use crate::injector::{ImportInjector, SyntheticImport};
use crate::resolver::ModuleResolver;

pub struct ImportResolver<'a, 'r> {
    ast: AstBuilder<'a>,
    resolver: &'r dyn ModuleResolver,
    injector: ImportInjector<'a>,
    /// canonical symbol -> reference to its synthetic import
    cache: HashMap<String, IdentifierReference<'a>>,
}

impl<'a, 'r> ImportResolver<'a, 'r> {
    pub fn new(
        ast: AstBuilder<'a>,
        resolver: &'r dyn ModuleResolver,
        injector: ImportInjector<'a>,
    ) -> Self {
        ImportResolver {
            ast,
            resolver,
            injector,
            cache: HashMap::new(),
        }
    }

    /// Reference to the synthetic import of `symbol`, injecting it on first use.
    ///
    /// Every call returns a fresh clone so the same reference can be spliced
    /// into several positions of the tree.
    pub fn resolve(&mut self, symbol: &str) -> IdentifierReference<'a> {
        if let Some(cached) = self.cache.get(symbol) {
            return cached.clone_in(self.ast.allocator);
        }

        let module_path = self.resolver.resolve_path(symbol);
        let local = self.injector.inject_default(&module_path, symbol);
        tracing::trace!(symbol, local, module_path = %module_path, "synthesized import");

        let reference = self.ast.identifier_reference(SPAN, local);
        let out = reference.clone_in(self.ast.allocator);
        self.cache.insert(symbol.to_string(), reference);
        out
    }

    pub fn resolve_expression(&mut self, symbol: &str) -> Expression<'a> {
        let reference = self.resolve(symbol);
        Expression::Identifier(self.ast.alloc(reference))
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn injected(&self) -> &[SyntheticImport] {
        self.injector.injected()
    }

    pub fn into_injector(self) -> ImportInjector<'a> {
        self.injector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use std::cell::RefCell;
    use std::collections::HashSet;

    struct CountingResolver {
        calls: RefCell<Vec<String>>,
    }

    impl ModuleResolver for CountingResolver {
        fn resolve_path(&self, symbol: &str) -> String {
            self.calls.borrow_mut().push(symbol.to_string());
            format!("lib/{}", symbol)
        }
    }

    #[test]
    fn test_resolve_is_memoized() {
        let allocator = Allocator::default();
        let ast = AstBuilder::new(&allocator);
        let resolver = CountingResolver {
            calls: RefCell::new(Vec::new()),
        };
        let injector = ImportInjector::new(ast, HashSet::new());
        let mut imports = ImportResolver::new(ast, &resolver, injector);

        let first = imports.resolve("map");
        let second = imports.resolve("map");
        let third = imports.resolve("add");

        assert_eq!(first.name, second.name);
        assert_eq!(first.name.as_str(), "_map");
        assert_eq!(third.name.as_str(), "_add");
        assert_eq!(*resolver.calls.borrow(), vec!["map", "add"]);
        assert_eq!(imports.len(), 2);
        assert_eq!(imports.injected().len(), 2);
        assert_eq!(imports.injected()[1].symbol, "add");
    }
}
