use anyhow::{Context, Result};
use log::{debug, trace};
use percent_encoding::percent_decode_str;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use url::Url;

use crate::{
    compiler::{CanonicalizeContext, Importer, ImporterResult},
    config::RendererConfig,
    constants::{EMBEDDED_PACKAGE_MARKER, FILE_URL_PREFIX, PACKAGE_PREFIX},
    fs::{FileSystem, RealFs},
    resolver::resolve_relative,
    types::Syntax,
};

fn decode(specifier: &str) -> String {
    percent_decode_str(specifier).decode_utf8_lossy().into_owned()
}

/// Turns import specifiers into canonical file URLs and loads them.
///
/// Lookup order for every specifier: the importing file's directory, then
/// each search root in configured order. The first match wins.
pub struct StyleImporter<F: FileSystem = RealFs> {
    config: Arc<RendererConfig>,
    fs: F,
    /// Used when the compiler gives no containing URL (the entry source)
    entry_dir: PathBuf,
}

impl StyleImporter<RealFs> {
    pub fn new(config: Arc<RendererConfig>, entry_dir: impl Into<PathBuf>) -> Self {
        Self::with_fs(config, RealFs, entry_dir)
    }
}

impl<F: FileSystem> StyleImporter<F> {
    pub fn with_fs(config: Arc<RendererConfig>, fs: F, entry_dir: impl Into<PathBuf>) -> Self {
        Self { config, fs, entry_dir: entry_dir.into() }
    }

    /// Decodes a specifier into a filesystem path. Package specifiers go
    /// through the package resolver, whose failure is returned as an error.
    fn specifier_path(&self, specifier: &str, importer_dir: &Path) -> Result<Option<PathBuf>> {
        if let Some(package) = specifier.strip_prefix(PACKAGE_PREFIX) {
            let package = decode(package);
            trace!("Resolving package specifier '{}' from {}", package, importer_dir.display());
            return self.config.package_resolver.resolve_module(&package, importer_dir).map(Some);
        }

        if specifier.starts_with(FILE_URL_PREFIX) {
            let Some(path) = Url::parse(specifier).ok().and_then(|url| url.to_file_path().ok())
            else {
                debug!("Ignoring malformed file URL '{}'", specifier);
                return Ok(None);
            };
            return self.unmangle_package_path(path).map(Some);
        }

        Ok(Some(PathBuf::from(decode(specifier))))
    }

    /// A package import that the compiler joined onto the importer's
    /// directory comes back as `file:///dir/~pkg/path`; resolve `pkg/path`
    /// from `/dir` instead of looking for a literal `~pkg` directory.
    fn unmangle_package_path(&self, path: PathBuf) -> Result<PathBuf> {
        let text = path.to_string_lossy().into_owned();
        // `/~pkg` is the last marker; any earlier one is part of the directory
        let Some(idx) = text.rfind(EMBEDDED_PACKAGE_MARKER) else {
            return Ok(path);
        };
        let from_dir = Path::new(&text[..idx]);
        let package = &text[idx + EMBEDDED_PACKAGE_MARKER.len()..];
        trace!("Re-resolving embedded package '{}' from {}", package, from_dir.display());
        self.config.package_resolver.resolve_module(package, from_dir)
    }

    /// Resolves `specifier` imported from a file in `importer_dir` to a file.
    ///
    /// `Ok(None)` means no match. The only error is a failed package lookup.
    pub async fn canonicalize_path(
        &self,
        specifier: &str,
        importer_dir: &Path,
    ) -> Result<Option<PathBuf>> {
        let Some(path) = self.specifier_path(specifier, importer_dir)? else {
            return Ok(None);
        };
        let path = self.config.rewrite(path);

        if let Some(resolved) = resolve_relative(&self.fs, importer_dir, &path).await {
            debug!("Resolved '{}' relative to {}", specifier, importer_dir.display());
            return Ok(Some(resolved));
        }

        // Joining an absolute path onto a search root yields the same path
        if path.is_absolute() {
            trace!("Could not resolve '{}'", specifier);
            return Ok(None);
        }

        for root in &self.config.search_roots {
            if let Some(resolved) = resolve_relative(&self.fs, root, &path).await {
                debug!("Resolved '{}' in search root {}", specifier, root.display());
                return Ok(Some(resolved));
            }
        }

        trace!("Could not resolve '{}'", specifier);
        Ok(None)
    }

    pub async fn canonicalize_specifier(
        &self,
        specifier: &str,
        importer_dir: &Path,
    ) -> Result<Option<Url>> {
        let resolved = self.canonicalize_path(specifier, importer_dir).await?;
        Ok(resolved.and_then(|path| Url::from_file_path(&path).ok()))
    }

    /// Reads a stylesheet and applies the preprocess hook.
    pub async fn read_source(&self, path: &Path, is_entry: bool) -> Result<String> {
        let content = self
            .fs
            .read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        self.config.preprocess(content, path, is_entry)
    }

    pub async fn load_path(&self, path: &Path, canonical_url: &Url) -> Result<ImporterResult> {
        trace!("Loading {}", path.display());
        let contents = self.read_source(path, false).await?;
        Ok(ImporterResult {
            contents,
            syntax: Syntax::from_path(path),
            source_map_url: self.config.source_map.then(|| canonical_url.clone()),
        })
    }

    fn importer_dir(&self, context: &CanonicalizeContext) -> PathBuf {
        context
            .containing_url
            .as_ref()
            .and_then(|url| url.to_file_path().ok())
            .and_then(|path| path.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| self.entry_dir.clone())
    }
}

impl<F: FileSystem> Importer for StyleImporter<F> {
    async fn canonicalize(&self, url: &str, context: &CanonicalizeContext) -> Result<Option<Url>> {
        let importer_dir = self.importer_dir(context);
        self.canonicalize_specifier(url, &importer_dir).await
    }

    async fn load(&self, canonical_url: &Url) -> Result<Option<ImporterResult>> {
        let Ok(path) = canonical_url.to_file_path() else {
            return Ok(None);
        };
        self.load_path(&path, canonical_url).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fs::MemoryFs, package::PackageResolveError};
    use std::fs;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    fn memory_importer(fs: MemoryFs, config: RendererConfig) -> StyleImporter<MemoryFs> {
        StyleImporter::with_fs(Arc::new(config), fs, "/app/src")
    }

    fn vendor_resolver(specifier: &str, _from: &Path) -> Result<PathBuf> {
        Ok(PathBuf::from("/app/node_modules").join(specifier))
    }

    #[tokio::test]
    async fn test_importer_dir_before_search_roots() {
        let mut fs = MemoryFs::new();
        fs.add_file("/app/src/_vars.scss", "");
        fs.add_file("/roots/a/_vars.scss", "");
        fs.add_file("/roots/b/_vars.scss", "");
        let importer = memory_importer(
            fs,
            RendererConfig::new().with_search_roots(["/roots/a", "/roots/b"]),
        );

        let resolved = importer.canonicalize_path("vars", Path::new("/app/src")).await.unwrap();
        assert_eq!(resolved, Some(PathBuf::from("/app/src/_vars.scss")));
    }

    #[tokio::test]
    async fn test_search_roots_in_order() {
        let mut fs = MemoryFs::new();
        fs.add_dir("/app/src");
        fs.add_file("/roots/a/_vars.scss", "");
        fs.add_file("/roots/b/vars.scss", "");
        let importer = memory_importer(
            fs,
            RendererConfig::new().with_search_roots(["/roots/a", "/roots/b"]),
        );

        let resolved = importer.canonicalize_path("vars", Path::new("/app/src")).await.unwrap();
        assert_eq!(resolved, Some(PathBuf::from("/roots/a/_vars.scss")));
    }

    #[tokio::test]
    async fn test_later_root_when_earlier_misses() {
        let mut fs = MemoryFs::new();
        fs.add_dir("/roots/a");
        fs.add_file("/roots/b/mixins/_index.scss", "");
        let importer = memory_importer(
            fs,
            RendererConfig::new().with_search_roots(["/roots/a", "/roots/b"]),
        );

        let resolved = importer.canonicalize_path("mixins", Path::new("/app/src")).await.unwrap();
        assert_eq!(resolved, Some(PathBuf::from("/roots/b/mixins/_index.scss")));
    }

    #[tokio::test]
    async fn test_no_match_is_not_an_error() {
        let importer = memory_importer(MemoryFs::new(), RendererConfig::new());

        let resolved = importer.canonicalize_specifier("missing", Path::new("/app/src")).await;
        assert!(matches!(resolved, Ok(None)));
    }

    #[tokio::test]
    async fn test_tilde_specifier() {
        let mut fs = MemoryFs::new();
        fs.add_file("/app/node_modules/bootstrap/scss/_functions.scss", "");
        let importer =
            memory_importer(fs, RendererConfig::new().with_package_resolver(vendor_resolver));

        let resolved = importer
            .canonicalize_specifier("~bootstrap/scss/functions", Path::new("/app/src"))
            .await
            .unwrap();
        assert_eq!(
            resolved,
            Some(Url::parse("file:///app/node_modules/bootstrap/scss/_functions.scss").unwrap())
        );
    }

    #[tokio::test]
    async fn test_tilde_specifier_is_decoded() {
        let mut fs = MemoryFs::new();
        fs.add_file("/app/node_modules/my theme/_index.scss", "");
        let importer =
            memory_importer(fs, RendererConfig::new().with_package_resolver(vendor_resolver));

        let resolved =
            importer.canonicalize_path("~my%20theme", Path::new("/app/src")).await.unwrap();
        assert_eq!(resolved, Some(PathBuf::from("/app/node_modules/my theme/_index.scss")));
    }

    #[tokio::test]
    async fn test_package_failure_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let importer = StyleImporter::new(Arc::new(RendererConfig::new()), temp_dir.path());

        let err = importer.canonicalize_path("~nope/x", temp_dir.path()).await.unwrap_err();
        assert!(err.downcast_ref::<PackageResolveError>().is_some());
    }

    #[tokio::test]
    async fn test_file_url() {
        let mut fs = MemoryFs::new();
        fs.add_file("/lib/_grid.scss", "");
        let importer = memory_importer(fs, RendererConfig::new());

        let resolved = importer.canonicalize_path("file:///lib/grid", Path::new("/app/src")).await;
        assert_eq!(resolved.unwrap(), Some(PathBuf::from("/lib/_grid.scss")));
    }

    #[tokio::test]
    async fn test_file_url_with_embedded_package() {
        let mut fs = MemoryFs::new();
        fs.add_file("/app/node_modules/theme/_colors.scss", "");
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let resolver = move |specifier: &str, from: &Path| -> Result<PathBuf> {
            recorder.lock().unwrap().push((specifier.to_string(), from.to_path_buf()));
            Ok(PathBuf::from("/app/node_modules").join(specifier))
        };
        let importer = memory_importer(fs, RendererConfig::new().with_package_resolver(resolver));

        let resolved = importer
            .canonicalize_path("file:///app/src/~theme/colors", Path::new("/app/src"))
            .await
            .unwrap();
        assert_eq!(resolved, Some(PathBuf::from("/app/node_modules/theme/_colors.scss")));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("theme/colors".to_string(), PathBuf::from("/app/src"))]
        );
    }

    #[tokio::test]
    async fn test_embedded_package_under_tilde_directory() {
        let mut fs = MemoryFs::new();
        fs.add_file("/home/~ci/app/node_modules/theme/_colors.scss", "");
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let resolver = move |specifier: &str, from: &Path| -> Result<PathBuf> {
            recorder.lock().unwrap().push((specifier.to_string(), from.to_path_buf()));
            Ok(PathBuf::from("/home/~ci/app/node_modules").join(specifier))
        };
        let importer = memory_importer(fs, RendererConfig::new().with_package_resolver(resolver));

        let resolved = importer
            .canonicalize_path(
                "file:///home/~ci/app/src/~theme/colors",
                Path::new("/home/~ci/app/src"),
            )
            .await
            .unwrap();
        assert_eq!(
            resolved,
            Some(PathBuf::from("/home/~ci/app/node_modules/theme/_colors.scss"))
        );
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("theme/colors".to_string(), PathBuf::from("/home/~ci/app/src"))]
        );
    }

    #[tokio::test]
    async fn test_plain_specifier_is_decoded() {
        let mut fs = MemoryFs::new();
        fs.add_file("/app/src/my file.scss", "");
        let importer = memory_importer(fs, RendererConfig::new());

        let resolved = importer.canonicalize_path("my%20file", Path::new("/app/src")).await;
        assert_eq!(resolved.unwrap(), Some(PathBuf::from("/app/src/my file.scss")));
    }

    #[tokio::test]
    async fn test_rewrite_hook() {
        let mut fs = MemoryFs::new();
        fs.add_file("/app/src/themes/_dark.scss", "");
        let config = RendererConfig::new()
            .with_rewrite(|p: &Path| PathBuf::from(p.to_string_lossy().replace("@theme", "themes")));
        let importer = memory_importer(fs, config);

        let resolved = importer.canonicalize_path("@theme/dark", Path::new("/app/src")).await;
        assert_eq!(resolved.unwrap(), Some(PathBuf::from("/app/src/themes/_dark.scss")));
    }

    #[tokio::test]
    async fn test_canonicalize_is_idempotent() {
        let mut fs = MemoryFs::new();
        fs.add_file("/app/src/_a.scss", "");
        let importer = memory_importer(fs, RendererConfig::new());

        let first = importer.canonicalize_specifier("a", Path::new("/app/src")).await.unwrap();
        let second = importer.canonicalize_specifier("a", Path::new("/app/src")).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_importer_trait_uses_containing_url() {
        let mut fs = MemoryFs::new();
        fs.add_file("/app/src/components/_button.scss", "");
        fs.add_file("/app/src/_button.scss", "");
        let importer = memory_importer(fs, RendererConfig::new());

        let containing = Url::parse("file:///app/src/components/index.scss").unwrap();
        let context = CanonicalizeContext { containing_url: Some(containing) };
        let resolved = importer.canonicalize("button", &context).await.unwrap();
        assert_eq!(resolved, Some(Url::parse("file:///app/src/components/_button.scss").unwrap()));

        let resolved = importer.canonicalize("button", &CanonicalizeContext::default()).await;
        assert_eq!(resolved.unwrap(), Some(Url::parse("file:///app/src/_button.scss").unwrap()));
    }

    #[tokio::test]
    async fn test_load_applies_preprocess_and_syntax() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let file = create_test_file(root, "_layout.sass", ".a\n  color: red\n");
        let config = RendererConfig::new().with_preprocess(|content: String, _: &Path, entry| {
            Ok(if entry { content } else { format!("// imported\n{content}") })
        });
        let importer = StyleImporter::new(Arc::new(config), root);

        let url = Url::from_file_path(&file).unwrap();
        let loaded = importer.load(&url).await.unwrap().unwrap();
        assert_eq!(loaded.contents, "// imported\n.a\n  color: red\n");
        assert_eq!(loaded.syntax, Syntax::Indented);
        assert_eq!(loaded.source_map_url, None);
    }

    #[tokio::test]
    async fn test_load_attaches_source_map_url() {
        let mut fs = MemoryFs::new();
        fs.add_file("/app/src/a.css", "a {}");
        let importer = memory_importer(fs, RendererConfig::new().with_source_map(true));

        let url = Url::parse("file:///app/src/a.css").unwrap();
        let loaded = importer.load(&url).await.unwrap().unwrap();
        assert_eq!(loaded.syntax, Syntax::Css);
        assert_eq!(loaded.source_map_url, Some(url));
    }

    #[tokio::test]
    async fn test_tilde_round_trip_reports_dialect() {
        let mut fs = MemoryFs::new();
        fs.add_file("/app/node_modules/grid/_index.sass", ".row\n  display: flex\n");
        let importer =
            memory_importer(fs, RendererConfig::new().with_package_resolver(vendor_resolver));

        let url = importer
            .canonicalize("~grid", &CanonicalizeContext::default())
            .await
            .unwrap()
            .unwrap();
        let loaded = importer.load(&url).await.unwrap().unwrap();
        assert_eq!(loaded.syntax, Syntax::Indented);
    }
}
