#[cfg(feature = "napi")]
use napi_derive::napi;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_EXPORT_ALL: &str = "SI-ERR-EXPORT-ALL";
pub const ERR_PARSE: &str = "SI-ERR-PARSE";
pub const ERR_OPTIONS: &str = "SI-ERR-OPTIONS";
pub const ERR_IO: &str = "SI-ERR-IO";

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSFORM ERROR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// `export * from '<library>'` cannot be narrowed to individual symbols.
    #[error("`export * from \"{library}\"` defeats the purpose of selective imports ({file}:{line}:{column})")]
    WildcardReExport {
        library: String,
        file: String,
        line: u32,
        column: u32,
    },

    #[error("failed to parse {file}: {}", messages.join("; "))]
    Parse { file: String, messages: Vec<String> },

    #[error("invalid transform options: {0}")]
    Options(#[from] serde_json::Error),

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TransformError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TransformError::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable diagnostic code.
    pub fn code(&self) -> &'static str {
        match self {
            TransformError::WildcardReExport { .. } => ERR_EXPORT_ALL,
            TransformError::Parse { .. } => ERR_PARSE,
            TransformError::Options(_) => ERR_OPTIONS,
            TransformError::Io { .. } => ERR_IO,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTIC
// ═══════════════════════════════════════════════════════════════════════════════

/// Serializable form of a [`TransformError`] handed across the native boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub file: Option<String>,
    pub line: u32,
    pub column: u32,
}

impl From<&TransformError> for Diagnostic {
    fn from(err: &TransformError) -> Self {
        let (file, line, column) = match err {
            TransformError::WildcardReExport {
                file, line, column, ..
            } => (Some(file.clone()), *line, *column),
            TransformError::Parse { file, .. } => (Some(file.clone()), 0, 0),
            TransformError::Io { path, .. } => (Some(path.display().to_string()), 0, 0),
            TransformError::Options(e) => (None, e.line() as u32, e.column() as u32),
        };
        Diagnostic {
            code: err.code().to_string(),
            message: err.to_string(),
            file,
            line,
            column,
        }
    }
}

/// 1-based line and column of a byte offset.
pub fn line_column(source: &str, offset: u32) -> (u32, u32) {
    let offset = (offset as usize).min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() as u32 + 1;
    let column = match before.rfind('\n') {
        Some(idx) => before[idx + 1..].chars().count() as u32 + 1,
        None => before.chars().count() as u32 + 1,
    };
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_column() {
        let src = "import a from 'x';\nexport * from 'ramda';";
        assert_eq!(line_column(src, 0), (1, 1));
        assert_eq!(line_column(src, 19), (2, 1));
        assert_eq!(line_column(src, 26), (2, 8));
    }

    #[test]
    fn test_diagnostic_from_wildcard() {
        let err = TransformError::WildcardReExport {
            library: "ramda".to_string(),
            file: "index.js".to_string(),
            line: 3,
            column: 1,
        };
        let diag = Diagnostic::from(&err);
        assert_eq!(diag.code, ERR_EXPORT_ALL);
        assert_eq!(diag.file.as_deref(), Some("index.js"));
        assert_eq!(diag.line, 3);
        assert!(diag.message.contains("export * from \"ramda\""));
    }
}
