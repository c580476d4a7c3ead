use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::resolver::LibraryLayout;

pub const DEFAULT_LIBRARY: &str = "ramda";

/// Options shared by every entry point of the pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformOptions {
    /// Module specifier of the target library, matched exactly.
    pub library: String,
    /// Resolve synthetic imports against the ES module layout (`<lib>/es/<name>`)
    /// instead of the CommonJS one (`<lib>/src/<name>`).
    #[serde(rename = "useES", alias = "useEs")]
    pub use_es: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        TransformOptions {
            library: DEFAULT_LIBRARY.to_string(),
            use_es: false,
        }
    }
}

impl TransformOptions {
    pub fn new(library: impl Into<String>) -> Self {
        TransformOptions {
            library: library.into(),
            ..Default::default()
        }
    }

    pub fn with_use_es(mut self, use_es: bool) -> Self {
        self.use_es = use_es;
        self
    }

    /// Parse options from JSON. An empty string yields the defaults.
    pub fn from_json(json: &str) -> Result<Self, TransformError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    pub fn resolver(&self) -> LibraryLayout {
        LibraryLayout::new(self.library.clone(), self.use_es)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = TransformOptions::from_json("").unwrap();
        assert_eq!(opts.library, "ramda");
        assert!(!opts.use_es);
    }

    #[test]
    fn test_from_json_camel_case() {
        let opts = TransformOptions::from_json(r#"{ "useES": true }"#).unwrap();
        assert!(opts.use_es);
        assert_eq!(opts.library, "ramda");

        let opts = TransformOptions::from_json(r#"{ "library": "rambda", "useEs": true }"#).unwrap();
        assert_eq!(opts.library, "rambda");
        assert!(opts.use_es);
    }

    #[test]
    fn test_from_json_invalid() {
        let err = TransformOptions::from_json("{ useES: }").unwrap_err();
        assert_eq!(err.code(), crate::error::ERR_OPTIONS);
    }
}
