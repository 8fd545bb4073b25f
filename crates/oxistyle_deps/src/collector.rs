use anyhow::Result;
use ignore::WalkBuilder;
use log::{debug, trace};
use std::path::{Path, PathBuf};

use oxistyle_core::{PARTIAL_PREFIX, SASS_EXTENSION, SCSS_EXTENSION};

/// Every compilable, non-partial stylesheet under `root`, sorted.
pub fn collect_entries(root: &Path, entry_glob: Option<&str>) -> Result<Vec<PathBuf>> {
    debug!("Collecting entry stylesheets");
    let mut files: Vec<PathBuf> = Vec::new();
    debug!("Walking directory tree from root: {}", root.display());
    let walker = WalkBuilder::new(root).hidden(false).ignore(true).git_ignore(true).build();

    for res in walker {
        let dent = res?;
        let p = dent.path();
        if !p.is_file() {
            continue;
        }

        // Installed packages are never entries
        if p.components().any(|c| c.as_os_str() == "node_modules") {
            continue;
        }

        let Some(ext) = p.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if ext != SCSS_EXTENSION && ext != SASS_EXTENSION {
            continue;
        }

        if p.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with(PARTIAL_PREFIX)) {
            trace!("Skipping partial: {}", p.display());
            continue;
        }

        if let Some(gl) = entry_glob {
            let rel_str = p.strip_prefix(root).unwrap_or(p).to_string_lossy();
            if !rel_str.contains(gl) {
                continue;
            }
            trace!("Matched entry file with glob '{}': {}", gl, rel_str);
        }

        trace!("Found entry file: {}", p.display());
        files.push(p.to_path_buf());
    }

    files.sort();
    debug!("Collected {} entry files", files.len());
    Ok(files)
}
