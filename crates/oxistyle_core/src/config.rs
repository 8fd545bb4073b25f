use anyhow::Result;
use log::debug;
use serde_json::{Map, Value};
use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    compiler::Logger,
    package::{NodeModulesResolver, PackageResolver},
};

/// Transforms a stylesheet's contents before compilation. The flag is `true`
/// for the entry file and `false` for imported files.
pub type PreprocessHook = Arc<dyn Fn(String, &Path, bool) -> Result<String> + Send + Sync>;

/// Rewrites a decoded import path before it is looked up on disk.
pub type RewriteHook = Arc<dyn Fn(&Path) -> PathBuf + Send + Sync>;

/// Renderer configuration. Built once, then shared read-only between
/// concurrent renders.
#[derive(Clone)]
pub struct RendererConfig {
    /// Directories searched after the importing file's own directory, in order
    pub search_roots: Vec<PathBuf>,
    pub package_resolver: Arc<dyn PackageResolver>,
    pub preprocess: Option<PreprocessHook>,
    pub rewrite: Option<RewriteHook>,
    /// Additional receiver for compiler diagnostics. It does not replace
    /// buffering: every warning is still returned in the render result.
    pub logger: Option<Arc<dyn Logger>>,
    pub source_map: bool,
    pub compiler_options: Map<String, Value>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            search_roots: Vec::new(),
            package_resolver: Arc::new(NodeModulesResolver::default()),
            preprocess: None,
            rewrite: None,
            logger: None,
            source_map: false,
            compiler_options: Map::new(),
        }
    }
}

impl fmt::Debug for RendererConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererConfig")
            .field("search_roots", &self.search_roots)
            .field("preprocess", &self.preprocess.is_some())
            .field("rewrite", &self.rewrite.is_some())
            .field("logger", &self.logger.is_some())
            .field("source_map", &self.source_map)
            .field("compiler_options", &self.compiler_options)
            .finish_non_exhaustive()
    }
}

impl RendererConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_roots = roots.into_iter().map(Into::into).collect();
        debug!("Configured {} search roots", self.search_roots.len());
        self
    }

    pub fn with_package_resolver(mut self, resolver: impl PackageResolver + 'static) -> Self {
        self.package_resolver = Arc::new(resolver);
        self
    }

    pub fn with_preprocess(
        mut self,
        hook: impl Fn(String, &Path, bool) -> Result<String> + Send + Sync + 'static,
    ) -> Self {
        self.preprocess = Some(Arc::new(hook));
        self
    }

    pub fn with_rewrite(mut self, hook: impl Fn(&Path) -> PathBuf + Send + Sync + 'static) -> Self {
        self.rewrite = Some(Arc::new(hook));
        self
    }

    /// Adds a logger that sees each diagnostic as it is reported, alongside
    /// the warnings collected into the render result.
    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    pub fn with_source_map(mut self, enabled: bool) -> Self {
        self.source_map = enabled;
        self
    }

    pub fn with_compiler_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.compiler_options.insert(key.into(), value);
        self
    }

    /// Applies the preprocess hook, if any.
    pub fn preprocess(&self, content: String, path: &Path, is_entry: bool) -> Result<String> {
        match &self.preprocess {
            Some(hook) => hook(content, path, is_entry),
            None => Ok(content),
        }
    }

    /// Applies the rewrite hook, if any.
    pub fn rewrite(&self, path: PathBuf) -> PathBuf {
        match &self.rewrite {
            Some(hook) => hook(&path),
            None => path,
        }
    }
}
