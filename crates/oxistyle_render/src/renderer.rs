use anyhow::{Context, Result, anyhow};
use log::{debug, info, trace};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::Arc,
};
use url::Url;

use oxistyle_core::{
    CompileRequest, FileSystem, RealFs, RendererConfig, StyleCompiler, StyleImporter, Syntax,
};

use crate::{
    logger::WarningCollector,
    source_map::{inline_source_map_comment, rewrite_source_map},
    types::RenderResult,
};

/// Drives one compile per entry file. Renders share nothing but the
/// read-only configuration, so several may run at once.
pub struct Renderer<C, F: FileSystem = RealFs> {
    config: Arc<RendererConfig>,
    compiler: C,
    fs: F,
}

impl<C: StyleCompiler> Renderer<C, RealFs> {
    pub fn new(config: RendererConfig, compiler: C) -> Self {
        Self::with_fs(config, compiler, RealFs)
    }
}

impl<C: StyleCompiler, F: FileSystem + Clone> Renderer<C, F> {
    pub fn with_fs(config: RendererConfig, compiler: C, fs: F) -> Self {
        Self { config: Arc::new(config), compiler, fs }
    }

    /// Compiles `entry` (an absolute path).
    ///
    /// Plain CSS entries are returned verbatim without involving the
    /// compiler. Compiler errors are returned unchanged.
    pub async fn render(&self, entry: &Path) -> Result<RenderResult> {
        info!("Rendering {}", entry.display());
        let syntax = Syntax::from_path(entry);

        if syntax == Syntax::Css {
            debug!("Plain CSS entry, skipping compilation");
            let css = self
                .fs
                .read_to_string(entry)
                .await
                .with_context(|| format!("Failed to read {}", entry.display()))?;
            return Ok(RenderResult {
                css,
                watch_files: vec![entry.to_path_buf()],
                warnings: Vec::new(),
                source_map: None,
            });
        }

        let entry_dir = entry.parent().unwrap_or(entry);
        let entry_url = Url::from_file_path(entry)
            .map_err(|_| anyhow!("Entry path must be absolute: {}", entry.display()))?;
        let importer =
            StyleImporter::with_fs(Arc::clone(&self.config), self.fs.clone(), entry_dir);
        let source = importer.read_source(entry, true).await?;
        let logger = WarningCollector::new(entry, self.config.logger.clone());

        let request = CompileRequest {
            source: &source,
            syntax,
            url: &entry_url,
            source_map: self.config.source_map,
            options: &self.config.compiler_options,
        };
        let output = self.compiler.compile_string(request, &importer, &logger).await?;
        debug!("Compiled {} ({} stylesheets loaded)", entry.display(), output.loaded_urls.len());

        let mut css = output.css;
        let mut source_map = output.source_map.filter(|_| self.config.source_map);
        if let Some(map) = source_map.as_mut() {
            rewrite_source_map(map, entry);
            if !css.is_empty() && !css.ends_with('\n') {
                css.push('\n');
            }
            css.push_str(&inline_source_map_comment(map)?);
        }

        let watch_files = watch_files(entry, &output.loaded_urls);
        let warnings = logger.into_warnings();
        info!(
            "Rendered {} with {} watched files and {} warnings",
            entry.display(),
            watch_files.len(),
            warnings.len()
        );

        Ok(RenderResult { css, watch_files, warnings, source_map })
    }
}

/// The entry followed by every loaded file, each listed once.
fn watch_files(entry: &Path, loaded_urls: &[Url]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut files = Vec::with_capacity(loaded_urls.len() + 1);
    seen.insert(entry.to_path_buf());
    files.push(entry.to_path_buf());

    for url in loaded_urls {
        let Ok(path) = url.to_file_path() else {
            trace!("Skipping non-file URL in watch list: {}", url);
            continue;
        };
        if seen.insert(path.clone()) {
            files.push(path);
        }
    }
    files
}
