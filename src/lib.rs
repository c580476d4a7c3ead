//! # Selective Import Transform
//!
//! Rewrites blanket imports of a utility library into per-symbol default
//! imports, so bundlers only pull in the functions a module actually uses.
//!
//! ```js
//! import R, { map } from 'ramda';
//! R.add(1, 2);
//! map(inc, xs);
//! ```
//!
//! becomes
//!
//! ```js
//! import _add from "ramda/src/add";
//! import _map from "ramda/src/map";
//! _add(1, 2);
//! _map(inc, xs);
//! ```
//!
//! ## Pass Invariants
//!
//! 1. **Confirmed bindings only**: a use site is rewritten only when the
//!    identifier resolves, lexically, to an import of the target library.
//!    A parameter or local that shadows an import name is never touched.
//!
//! 2. **One import per symbol**: every symbol is resolved and injected at most
//!    once per file. Repeated uses share the same synthetic local.
//!
//! 3. **One rule per node**: an identifier that is the object of a member access
//!    or the key/value of a property is owned by that rule and never rewritten
//!    again by the bare-identifier rule.
//!
//! 4. **Wildcard re-exports are fatal**: `export * from '<lib>'` cannot be
//!    narrowed and aborts the file with `SI-ERR-EXPORT-ALL`.
//!
//! 5. **No-op files are untouched**: a file without target imports comes back
//!    byte for byte.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod cache;
mod classifier;
mod context;
mod discovery;
mod error;
mod exports;
mod import_cache;
mod injector;
mod options;
mod resolver;
mod rewriter;
mod scope;
mod transform;


pub use cache::TransformCache;
pub use context::PassReport;
pub use discovery::{discover_sources, is_source_file, transform_dir, FileOutcome};
pub use error::{
    Diagnostic, TransformError, ERR_EXPORT_ALL, ERR_IO, ERR_OPTIONS, ERR_PARSE,
};
pub use injector::SyntheticImport;
pub use options::{TransformOptions, DEFAULT_LIBRARY};
pub use resolver::{LibraryLayout, ModuleResolver};
pub use scope::{BindingIntrospection, BindingKind, SemanticBindings};
pub use transform::{
    transform_batch, transform_program, transform_source, transform_source_with, SourceFile,
    TransformOutput,
};

#[cfg(feature = "napi")]
pub use discovery::transform_dir_native;
#[cfg(feature = "napi")]
pub use transform::transform_native;

#[cfg(feature = "napi")]
#[napi]
pub fn native_bridge_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
