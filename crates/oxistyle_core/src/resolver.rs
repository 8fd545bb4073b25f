use log::trace;
use path_clean::clean;
use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
};

use crate::{
    constants::{INDEX_FILE, PARTIAL_PREFIX, RESOLVE_EXTENSIONS},
    fs::{FileSystem, exists},
};

/// One step of the extensionless lookup: if `guard` does not exist the whole
/// lookup stops, otherwise `candidates` are probed in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeStage {
    pub guard: PathBuf,
    pub candidates: Vec<PathBuf>,
}

/// `dir/name.scss` -> `dir/_name.scss`
pub fn partial_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let mut partial = OsString::from(PARTIAL_PREFIX.to_string());
    partial.push(name);
    Some(path.with_file_name(partial))
}

/// Appends `.ext` without touching any dot already in the file name.
fn append_extension(base: &Path, ext: impl AsRef<OsStr>) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(".");
    path.push(ext.as_ref());
    PathBuf::from(path)
}

fn extension_candidates(base: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(RESOLVE_EXTENSIONS.len() * 2);
    for ext in RESOLVE_EXTENSIONS {
        let plain = append_extension(base, ext);
        let partial = partial_path(&plain);
        candidates.push(plain);
        candidates.extend(partial);
    }
    candidates
}

/// The complete probe order for an import without an extension.
///
/// `base` itself is tried with every extension (plain, then partial) once its
/// parent directory is known to exist, then `base/index` the same way once
/// `base` is known to exist.
pub fn probe_plan(base: &Path) -> Vec<ProbeStage> {
    let guard = base.parent().unwrap_or(base).to_path_buf();
    vec![
        ProbeStage { guard, candidates: extension_candidates(base) },
        ProbeStage {
            guard: base.to_path_buf(),
            candidates: extension_candidates(&base.join(INDEX_FILE)),
        },
    ]
}

/// Resolves `base` with exactly one extension, falling back to its partial.
pub async fn resolve_with_extension<F: FileSystem>(
    fs: &F,
    base: &Path,
    ext: &OsStr,
) -> Option<PathBuf> {
    let candidate = append_extension(base, ext);
    if exists(fs, &candidate).await {
        trace!("Resolved {} with explicit extension", candidate.display());
        return Some(candidate);
    }

    let partial = partial_path(&candidate)?;
    if exists(fs, &partial).await {
        trace!("Resolved partial {}", partial.display());
        return Some(partial);
    }

    None
}

/// Resolves an extensionless `base` against the dialect extensions, partials
/// and directory index files. The first existing candidate wins.
pub async fn resolve_import<F: FileSystem>(fs: &F, base: &Path) -> Option<PathBuf> {
    for stage in probe_plan(base) {
        if !exists(fs, &stage.guard).await {
            trace!("Directory {} does not exist, skipping lookup", stage.guard.display());
            return None;
        }
        for candidate in stage.candidates {
            if exists(fs, &candidate).await {
                trace!("Resolved {} to {}", base.display(), candidate.display());
                return Some(candidate);
            }
        }
    }
    None
}

/// Resolves `specifier` (already decoded to a path) against `root`.
///
/// Any extension in the specifier is authoritative: only that extension and
/// its partial are probed, so `theme.dark` never becomes `theme.dark.scss`.
pub async fn resolve_relative<F: FileSystem>(
    fs: &F,
    root: &Path,
    specifier: &Path,
) -> Option<PathBuf> {
    let path = clean(root.join(specifier));
    trace!("Resolving {} against {}", specifier.display(), root.display());

    match path.extension() {
        Some(ext) => resolve_with_extension(fs, &path.with_extension(""), ext).await,
        None => resolve_import(fs, &path).await,
    }
}
