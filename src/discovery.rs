//! Source discovery and directory-level transforms.
//!
//! Recursively scans a directory for script modules and runs the pass over
//! each of them in parallel, optionally through the on-disk cache.

use lazy_static::lazy_static;
#[cfg(feature = "napi")]
use napi_derive::napi;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cache::TransformCache;
use crate::error::{Diagnostic, TransformError};
use crate::options::TransformOptions;
use crate::transform::{transform_source_with, TransformOutput};

lazy_static! {
    static ref SOURCE_FILE: Regex = Regex::new(r"\.(m|c)?[jt]sx?$").unwrap();
    static ref DECLARATION_FILE: Regex = Regex::new(r"\.d\.(m|c)?ts$").unwrap();
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    pub path: String,
    pub output: Option<TransformOutput>,
    pub error: Option<Diagnostic>,
    pub cached: bool,
}

pub fn is_source_file(path: &Path) -> bool {
    let name = path.to_string_lossy();
    SOURCE_FILE.is_match(&name) && !DECLARATION_FILE.is_match(&name)
}

/// Recursively find all script modules under `dir`, skipping `node_modules`.
pub fn discover_sources(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != "node_modules")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && is_source_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// Discover and transform every source file under `dir`.
///
/// Per-file failures, including a wildcard re-export, are reported in the
/// file's outcome and do not stop the other files.
pub fn transform_dir(
    dir: &Path,
    options: &TransformOptions,
    cache: Option<&TransformCache>,
) -> Result<Vec<FileOutcome>, TransformError> {
    if !dir.is_dir() {
        return Err(TransformError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let resolver = options.resolver();
    let files = discover_sources(dir);
    tracing::debug!(dir = %dir.display(), files = files.len(), "discovered sources");

    let outcomes = files
        .par_iter()
        .map(|path| {
            let path_str = path.to_string_lossy().to_string();
            let source = match fs::read_to_string(path) {
                Ok(source) => source,
                Err(e) => return failed(path_str, &TransformError::io(path, e)),
            };

            if let Some(output) = cache.and_then(|c| c.get(&path_str, &source, options)) {
                return FileOutcome {
                    path: path_str,
                    output: Some(output),
                    error: None,
                    cached: true,
                };
            }

            match transform_source_with(&source, &path_str, options, &resolver) {
                Ok(output) => {
                    if let Some(cache) = cache {
                        if let Err(e) = cache.set(&path_str, &source, options, &output) {
                            tracing::warn!(file = %path_str, error = %e, "failed to write cache entry");
                        }
                    }
                    FileOutcome {
                        path: path_str,
                        output: Some(output),
                        error: None,
                        cached: false,
                    }
                }
                Err(e) => {
                    tracing::warn!(file = %path_str, code = e.code(), error = %e, "transform failed");
                    failed(path_str, &e)
                }
            }
        })
        .collect();

    Ok(outcomes)
}

fn failed(path: String, err: &TransformError) -> FileOutcome {
    FileOutcome {
        path,
        output: None,
        error: Some(Diagnostic::from(err)),
        cached: false,
    }
}

#[cfg(feature = "napi")]
#[napi]
pub fn transform_dir_native(base_dir: String, options_json: String) -> napi::Result<String> {
    let options = TransformOptions::from_json(&options_json)
        .map_err(|e| napi::Error::from_reason(format!("[{}] {}", e.code(), e)))?;
    let outcomes = transform_dir(Path::new(&base_dir), &options, None)
        .map_err(|e| napi::Error::from_reason(format!("[{}] {}", e.code(), e)))?;
    serde_json::to_string(&outcomes)
        .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))
}
