use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::TransformError;
use crate::options::TransformOptions;
use crate::transform::TransformOutput;

#[derive(Serialize, Deserialize)]
pub struct CacheEntry {
    pub hash: String,
    pub output: TransformOutput,
}

/// On-disk cache of transform outputs, keyed by file path and invalidated by a
/// hash of the options and the source text.
pub struct TransformCache {
    cache_dir: PathBuf,
}

impl TransformCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self, TransformError> {
        let cache_dir = cache_dir.into();
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir).map_err(|e| TransformError::io(&cache_dir, e))?;
        }
        Ok(Self { cache_dir })
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn compute_hash(options: &TransformOptions, source: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(options.library.as_bytes());
        hasher.update([0, options.use_es as u8, 0]);
        hasher.update(source.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn get_cache_path(&self, file_path: &str) -> PathBuf {
        let safe_name = file_path
            .replace("/", "_")
            .replace("\\", "_")
            .replace(":", "_");
        self.cache_dir.join(format!("{}.json", safe_name))
    }

    pub fn get(
        &self,
        file_path: &str,
        source: &str,
        options: &TransformOptions,
    ) -> Option<TransformOutput> {
        let cache_path = self.get_cache_path(file_path);
        if !cache_path.exists() {
            return None;
        }

        let data = fs::read_to_string(&cache_path).ok()?;
        let entry: CacheEntry = match serde_json::from_str(&data) {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(file = file_path, error = %e, "discarding corrupt cache entry");
                fs::remove_file(cache_path).ok();
                return None;
            }
        };

        if entry.hash == Self::compute_hash(options, source) {
            Some(entry.output)
        } else {
            None
        }
    }

    pub fn set(
        &self,
        file_path: &str,
        source: &str,
        options: &TransformOptions,
        output: &TransformOutput,
    ) -> Result<(), TransformError> {
        let cache_path = self.get_cache_path(file_path);
        let entry = CacheEntry {
            hash: Self::compute_hash(options, source),
            output: output.clone(),
        };
        let data = serde_json::to_string(&entry)
            .map_err(|e| TransformError::io(&cache_path, std::io::Error::other(e)))?;
        fs::write(&cache_path, data).map_err(|e| TransformError::io(&cache_path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PassReport;

    fn output(code: &str) -> TransformOutput {
        TransformOutput {
            code: code.to_string(),
            changed: true,
            report: PassReport::default(),
        }
    }

    #[test]
    fn test_hit_and_invalidation() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TransformCache::new(dir.path().join("cache")).unwrap();
        let options = TransformOptions::default();

        assert!(cache.get("src/a.js", "a", &options).is_none());
        cache.set("src/a.js", "a", &options, &output("out")).unwrap();

        assert_eq!(cache.get("src/a.js", "a", &options), Some(output("out")));
        assert!(cache.get("src/a.js", "changed", &options).is_none());
        assert!(cache
            .get("src/a.js", "a", &options.clone().with_use_es(true))
            .is_none());
    }

    #[test]
    fn test_corrupt_entry_removed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TransformCache::new(dir.path()).unwrap();
        let path = cache.get_cache_path("b.js");
        fs::write(&path, "{not json").unwrap();

        assert!(cache.get("b.js", "b", &TransformOptions::default()).is_none());
        assert!(!path.exists());
    }
}
