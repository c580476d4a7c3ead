#[cfg(feature = "napi")]
use napi_derive::napi;
use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_ast::AstBuilder;
use oxc_ast_visit::VisitMut;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_span::SourceType;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::context::{PassContext, PassReport};
use crate::error::TransformError;
use crate::options::TransformOptions;
use crate::resolver::ModuleResolver;
use crate::rewriter::ReferenceRewriter;
use crate::scope::{collect_names, SemanticBindings};

// ═══════════════════════════════════════════════════════════════════════════════
// INPUT / OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    pub path: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransformOutput {
    pub code: String,
    /// `false` means `code` is the input, byte for byte.
    pub changed: bool,
    pub report: PassReport,
}

// ═══════════════════════════════════════════════════════════════════════════════
// TREE PASS
// ═══════════════════════════════════════════════════════════════════════════════

/// Runs the selective-import pass over an already parsed program.
///
/// All pass state lives in a [`PassContext`] created here and dropped on
/// return, so independent programs can be transformed concurrently.
pub fn transform_program<'a>(
    allocator: &'a Allocator,
    program: &mut Program<'a>,
    options: &TransformOptions,
    resolver: &dyn ModuleResolver,
    file: &str,
) -> Result<PassReport, TransformError> {
    tracing::debug!(file, library = %options.library, "selective import pass started");
    let bindings = SemanticBindings::build(program);
    let taken = collect_names(program);
    let ast = AstBuilder::new(allocator);

    let mut ctx = PassContext::new(ast, &options.library, resolver, taken);
    let error = {
        let mut rewriter = ReferenceRewriter::new(ast, &mut ctx, &bindings, file);
        rewriter.visit_program(program);
        rewriter.into_error()
    };
    if let Some(err) = error {
        tracing::debug!(file, code = err.code(), "pass aborted");
        return Err(err);
    }

    let report = ctx.finish(program);
    tracing::debug!(
        file,
        library = %options.library,
        namespace_bindings = report.namespace_bindings,
        named_bindings = report.named_bindings,
        synthetic_imports = report.synthetic_imports.len(),
        removed_imports = report.removed_imports,
        rewrites = report.rewrites,
        "selective import pass finished"
    );
    Ok(report)
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn transform_source(
    source: &str,
    file: &str,
    options: &TransformOptions,
) -> Result<TransformOutput, TransformError> {
    transform_source_with(source, file, options, &options.resolver())
}

/// Parse, transform and print one file with a caller-supplied resolver.
///
/// Files the pass leaves untouched are returned verbatim rather than reprinted.
pub fn transform_source_with(
    source: &str,
    file: &str,
    options: &TransformOptions,
    resolver: &dyn ModuleResolver,
) -> Result<TransformOutput, TransformError> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(file).unwrap_or_else(|_| SourceType::mjs());
    let ret = Parser::new(&allocator, source, source_type).parse();
    if ret.panicked || !ret.errors.is_empty() {
        return Err(TransformError::Parse {
            file: file.to_string(),
            messages: ret.errors.iter().map(|e| e.to_string()).collect(),
        });
    }

    let mut program = ret.program;
    let report = transform_program(&allocator, &mut program, options, resolver, file)?;
    if !report.changed() {
        return Ok(TransformOutput {
            code: source.to_string(),
            changed: false,
            report,
        });
    }

    let code = Codegen::new().build(&program).code;
    Ok(TransformOutput {
        code,
        changed: true,
        report,
    })
}

/// Transforms every file in parallel; results keep the input order.
pub fn transform_batch(
    files: &[SourceFile],
    options: &TransformOptions,
) -> Vec<Result<TransformOutput, TransformError>> {
    let resolver = options.resolver();
    files
        .par_iter()
        .map(|file| {
            let result = transform_source_with(&file.code, &file.path, options, &resolver);
            if let Err(e) = &result {
                tracing::warn!(file = %file.path, code = e.code(), error = %e, "transform failed");
            }
            result
        })
        .collect()
}

#[cfg(feature = "napi")]
#[napi]
pub fn transform_native(code: String, file: String, options_json: String) -> napi::Result<String> {
    let options = TransformOptions::from_json(&options_json)
        .map_err(|e| napi::Error::from_reason(format!("[{}] {}", e.code(), e)))?;
    let output = transform_source(&code, &file, &options)
        .map_err(|e| napi::Error::from_reason(format!("[{}] {}", e.code(), e)))?;
    serde_json::to_string(&output)
        .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))
}
