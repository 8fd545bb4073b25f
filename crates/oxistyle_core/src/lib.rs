//! Core import resolution for oxistyle.
//!
//! This crate turns stylesheet import specifiers into concrete files and
//! provides the callbacks an external stylesheet compiler drives:
//! - Probing the filesystem for dialect extensions, partials and index files
//! - Resolving package-style (`~pkg/path`) imports
//! - Canonicalizing imports against the importer's directory and search roots
//! - Loading stylesheets with their dialect
//! - The compiler, importer and logger interfaces

mod compiler;
mod config;
mod constants;
mod fs;
mod importer;
mod package;
mod resolver;
mod types;

// Re-export public API
pub use compiler::{
    CanonicalizeContext, CompileOutput, CompileRequest, Importer, ImporterResult, Logger,
    SourceMap, SourceSpan, StyleCompiler, WarnOptions,
};
pub use config::{PreprocessHook, RendererConfig, RewriteHook};
pub use constants::{
    CSS_EXTENSION, INDEX_FILE, PARTIAL_PREFIX, RESOLVE_EXTENSIONS, SASS_EXTENSION, SCSS_EXTENSION,
};
pub use fs::{FileSystem, MemoryFs, Probe, RealFs, exists};
pub use importer::StyleImporter;
pub use package::{DEFAULT_PACKAGE_DIR, NodeModulesResolver, PackageResolveError, PackageResolver};
pub use resolver::{
    ProbeStage, partial_path, probe_plan, resolve_import, resolve_relative, resolve_with_extension,
};
pub use types::{LocatedWarning, Syntax, Warning, WarningDetail};
