use anyhow::Result;
use dashmap::DashMap;
use log::{debug, trace, warn};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use oxistyle_core::{FileSystem, StyleImporter, Syntax};

use crate::{
    parser::scan_imports,
    types::{EntryDeps, Unresolved},
};

/// Keyed by file and entry flag, since preprocessing may depend on the flag
pub(crate) type ImportCache = DashMap<(PathBuf, bool), Vec<String>>;
pub(crate) type ResolveCache = DashMap<(PathBuf, String), Option<PathBuf>>;

pub(crate) async fn imports_for<F: FileSystem>(
    importer: &StyleImporter<F>,
    file: &Path,
    is_entry: bool,
    cache: &ImportCache,
) -> Result<Vec<String>> {
    let key = (file.to_path_buf(), is_entry);
    let cached = cache.get(&key).map(|specs| specs.clone());
    if let Some(specs) = cached {
        trace!("Cache hit for imports: {}", file.display());
        return Ok(specs);
    }
    trace!("Scanning file for imports: {}", file.display());

    let source = importer.read_source(file, is_entry).await?;
    let specs = scan_imports(&source, Syntax::from_path(file));
    debug!("Found {} import specifiers in {}", specs.len(), file.display());
    cache.insert(key, specs.clone());
    Ok(specs)
}

async fn resolve_cached<F: FileSystem>(
    importer: &StyleImporter<F>,
    dir: &Path,
    specifier: &str,
    cache: &ResolveCache,
) -> Result<Option<PathBuf>> {
    let key = (dir.to_path_buf(), specifier.to_string());
    let cached = cache.get(&key).map(|resolved| resolved.clone());
    if let Some(resolved) = cached {
        trace!("Cache hit for resolve: '{}' from {}", specifier, dir.display());
        return Ok(resolved);
    }

    let resolved = importer.canonicalize_path(specifier, dir).await?;
    cache.insert(key, resolved.clone());
    Ok(resolved)
}

/// Walks the import graph of `entry` with the same resolution a compile
/// uses. Plain CSS files are leaves; cycles are visited once.
pub(crate) async fn reachable_stylesheets<F: FileSystem>(
    importer: &StyleImporter<F>,
    entry: &Path,
    import_cache: &ImportCache,
    resolve_cache: &ResolveCache,
) -> Result<EntryDeps> {
    trace!("Computing reachable stylesheets from: {}", entry.display());
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut files = Vec::new();
    let mut unresolved = Vec::new();
    let mut stack: Vec<PathBuf> = vec![entry.to_path_buf()];

    while let Some(cur) = stack.pop() {
        if !visited.insert(cur.clone()) {
            continue;
        }
        files.push(cur.clone());

        if Syntax::from_path(&cur) == Syntax::Css {
            trace!("Plain CSS, not following imports: {}", cur.display());
            continue;
        }

        let is_entry = cur == entry;
        let specs = match imports_for(importer, &cur, is_entry, import_cache).await {
            Ok(specs) => specs,
            Err(e) if is_entry => return Err(e),
            Err(e) => {
                warn!("Error scanning imports for {}: {}", cur.display(), e);
                continue;
            }
        };

        let dir = cur.parent().unwrap_or(&cur).to_path_buf();
        let mut children = Vec::with_capacity(specs.len());
        for spec in specs {
            match resolve_cached(importer, &dir, &spec, resolve_cache).await {
                Ok(Some(next)) => children.push(next),
                Ok(None) => {
                    trace!("Could not resolve import: '{}'", spec);
                    unresolved.push(Unresolved {
                        from_file: cur.clone(),
                        specifier: spec,
                        reason: None,
                    });
                }
                Err(e) => {
                    warn!("Error resolving '{}': {}", spec, e);
                    unresolved.push(Unresolved {
                        from_file: cur.clone(),
                        specifier: spec,
                        reason: Some(e.to_string()),
                    });
                }
            }
        }

        // Reversed so the first import is visited first
        for next in children.into_iter().rev() {
            if !visited.contains(&next) {
                stack.push(next);
            }
        }
    }

    debug!("Computed {} reachable stylesheets from {}", files.len(), entry.display());
    Ok(EntryDeps { entry: entry.to_path_buf(), files, unresolved })
}
