use anyhow::Result;
use log::{debug, trace};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Default package directory name walked up from the importing file
pub const DEFAULT_PACKAGE_DIR: &str = "node_modules";

#[derive(Debug, Error)]
pub enum PackageResolveError {
    #[error("Can't find package '{specifier}' from {}", from.display())]
    NotFound { specifier: String, from: PathBuf },

    #[error("Invalid package specifier '{0}'")]
    InvalidSpecifier(String),
}

/// Resolves a package-style specifier (`bootstrap/scss/functions`) to an
/// absolute path. The returned path may still lack an extension; it goes
/// through the regular extension and partial lookup afterwards.
pub trait PackageResolver: Send + Sync {
    fn resolve_module(&self, specifier: &str, from_dir: &Path) -> Result<PathBuf>;
}

impl<F> PackageResolver for F
where
    F: Fn(&str, &Path) -> Result<PathBuf> + Send + Sync,
{
    fn resolve_module(&self, specifier: &str, from_dir: &Path) -> Result<PathBuf> {
        self(specifier, from_dir)
    }
}

#[derive(Debug, Deserialize)]
struct PackageManifest {
    sass: Option<String>,
    style: Option<String>,
}

/// Walks up from the importing directory looking for packages in each of the
/// configured package directories, nearest ancestor first.
#[derive(Debug, Clone)]
pub struct NodeModulesResolver {
    package_dirs: Vec<String>,
}

impl Default for NodeModulesResolver {
    fn default() -> Self {
        Self { package_dirs: vec![DEFAULT_PACKAGE_DIR.to_string()] }
    }
}

impl NodeModulesResolver {
    pub fn new(package_dirs: Vec<String>) -> Self {
        Self { package_dirs }
    }

    fn resolve_in(&self, dir: &Path, package: &str, subpath: Option<&str>) -> Option<PathBuf> {
        for package_dir in &self.package_dirs {
            let pkg_root = dir.join(package_dir).join(package);
            if !pkg_root.is_dir() {
                trace!("Package path does not exist: {:?}", pkg_root);
                continue;
            }
            trace!("Found package at: {:?}", pkg_root);

            return Some(match subpath {
                Some(rest) => pkg_root.join(rest),
                None => package_entry(&pkg_root),
            });
        }
        None
    }
}

/// Splits `@scope/name/rest` or `name/rest` into the package and the rest.
fn split_specifier(specifier: &str) -> Option<(&str, Option<&str>)> {
    let segments = if specifier.starts_with('@') { 2 } else { 1 };
    let mut end = 0;
    for segment in 0..segments {
        if segment > 0 {
            // skip the separator
            end += 1;
            if end >= specifier.len() {
                return None;
            }
        }
        let len = specifier[end..].find('/').unwrap_or(specifier.len() - end);
        if len == 0 {
            return None;
        }
        end += len;
    }
    let package = &specifier[..end];
    let rest = specifier.get(end + 1..).filter(|rest| !rest.is_empty());
    Some((package, rest))
}

/// The stylesheet a bare package import points at: the `sass` or `style`
/// manifest field, otherwise the package directory itself.
fn package_entry(pkg_root: &Path) -> PathBuf {
    let manifest_path = pkg_root.join("package.json");
    if let Ok(txt) = fs::read_to_string(&manifest_path)
        && let Ok(manifest) = serde_json::from_str::<PackageManifest>(&txt)
        && let Some(entry) = manifest.sass.or(manifest.style)
    {
        trace!("Using manifest entry '{}' for {:?}", entry, pkg_root);
        return pkg_root.join(entry.trim_start_matches("./"));
    }
    pkg_root.to_path_buf()
}

impl PackageResolver for NodeModulesResolver {
    fn resolve_module(&self, specifier: &str, from_dir: &Path) -> Result<PathBuf> {
        let (package, subpath) = split_specifier(specifier)
            .ok_or_else(|| PackageResolveError::InvalidSpecifier(specifier.to_string()))?;
        trace!("Walking up from {:?} to find package '{}'", from_dir, package);

        for dir in from_dir.ancestors() {
            if let Some(resolved) = self.resolve_in(dir, package, subpath) {
                debug!("Resolved package '{}' to {}", specifier, resolved.display());
                return Ok(resolved);
            }
        }

        Err(PackageResolveError::NotFound {
            specifier: specifier.to_string(),
            from: from_dir.to_path_buf(),
        }
        .into())
    }
}
