use anyhow::{Result, anyhow};
use log::{debug, info, trace, warn};
use std::{collections::HashSet, path::Path, sync::Arc};
use tokio::task::JoinSet;

use oxistyle_core::StyleImporter;

use crate::{
    collector::collect_entries,
    config::Config,
    graph::{ImportCache, ResolveCache, reachable_stylesheets},
    types::{EntryDeps, ScanResult},
};

pub async fn run_deps_scan(mut cfg: Config) -> Result<ScanResult> {
    info!("Starting dependency scan");

    cfg.initialize()?;
    let root = cfg.root()?.clone();

    debug!("Collecting entry files with glob: {:?}", cfg.entry_glob);
    let entries = collect_entries(&root, cfg.entry_glob.as_deref())?;
    if entries.is_empty() {
        warn!("No entry stylesheets found under {}", root.display());
        return Err(anyhow!("No entry stylesheets found under {}", root.display()));
    }
    info!("Found {} entry files", entries.len());

    // Shared across tasks; resolution is deterministic per (directory, specifier)
    let import_cache: Arc<ImportCache> = Arc::new(ImportCache::new());
    let resolve_cache: Arc<ResolveCache> = Arc::new(ResolveCache::new());
    let renderer_config = Arc::new(cfg.renderer_config());

    let mut tasks = JoinSet::new();
    for entry in entries {
        let renderer_config = Arc::clone(&renderer_config);
        let import_cache = Arc::clone(&import_cache);
        let resolve_cache = Arc::clone(&resolve_cache);

        tasks.spawn(async move {
            trace!("Scanning entry: {}", entry.display());
            let entry_dir = entry.parent().unwrap_or(Path::new("/")).to_path_buf();
            let importer = StyleImporter::new(renderer_config, entry_dir);
            reachable_stylesheets(&importer, &entry, &import_cache, &resolve_cache).await
        });
    }

    let mut results: Vec<EntryDeps> = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok(deps) => results.push(deps),
            Err(e) => warn!("Error scanning entry: {}", e),
        }
    }
    results.sort_by(|a, b| a.entry.cmp(&b.entry));

    info!("Dependency scan complete for {} entries", results.len());
    debug!(
        "Cache statistics: imports={}, resolutions={}",
        import_cache.len(),
        resolve_cache.len()
    );

    let files_analyzed =
        import_cache.iter().map(|scan| scan.key().0.clone()).collect::<HashSet<_>>().len();
    Ok(ScanResult { root, entries: results, files_analyzed })
}
