//! Taxonomy loading
//!
//! Resolves which taxonomy a run uses: the built-in one, or a JSON file
//! named in the settings. Structural defects fail here, before any
//! navigator is created.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::Taxonomy;
use crate::infrastructure::traits::FileSystem;

pub struct TaxonomyService {
    fs: Arc<dyn FileSystem>,
}

impl TaxonomyService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load from `path` if given, otherwise the built-in taxonomy.
    pub fn load(&self, path: Option<&Path>) -> ApplicationResult<Taxonomy> {
        match path {
            Some(path) => self.load_file(path),
            None => {
                debug!("using built-in taxonomy");
                Ok(Taxonomy::builtin()?)
            }
        }
    }

    pub fn load_file(&self, path: &Path) -> ApplicationResult<Taxonomy> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read taxonomy", path)?;
        let taxonomy = Taxonomy::from_json(&content)?;
        info!(
            "loaded taxonomy {} ({} nodes, depth {})",
            path.display(),
            taxonomy.node_count(),
            taxonomy.max_depth()
        );
        Ok(taxonomy)
    }
}
