//! Module path resolution for synthetic imports.

/// Computes the module path a single symbol of the target library lives at.
///
/// Implementations must be pure: the same symbol always yields the same path,
/// and batch transforms call it from several threads at once.
pub trait ModuleResolver {
    fn resolve_path(&self, symbol: &str) -> String;
}

impl<R: ModuleResolver + ?Sized> ModuleResolver for &R {
    fn resolve_path(&self, symbol: &str) -> String {
        (**self).resolve_path(symbol)
    }
}

/// The two on-disk layouts a library ships its per-function modules in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryLayout {
    library: String,
    use_es: bool,
}

impl LibraryLayout {
    pub fn new(library: impl Into<String>, use_es: bool) -> Self {
        LibraryLayout {
            library: library.into(),
            use_es,
        }
    }

    pub fn library(&self) -> &str {
        &self.library
    }

    fn layout_dir(&self) -> &'static str {
        if self.use_es {
            "es"
        } else {
            "src"
        }
    }
}

impl ModuleResolver for LibraryLayout {
    fn resolve_path(&self, symbol: &str) -> String {
        format!("{}/{}/{}", self.library, self.layout_dir(), symbol)
    }
}
