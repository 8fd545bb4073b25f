//! Constants for stylesheet extensions and import resolution.
//!
//! This module centralizes the file naming conventions used when an import
//! specifier is turned into a concrete file on disk.
//!
//! ## Dialects
//!
//! - **SCSS**: `.scss` (bracketed syntax)
//! - **Indented**: `.sass` (whitespace-significant syntax)
//! - **Plain CSS**: `.css` (never passed through the compiler's import protocol)
//!
//! ## Partials
//!
//! A partial is a stylesheet whose file name starts with `_`. It is importable
//! under its unprefixed name: `@import "dir/name"` finds `dir/_name.scss`.

pub const SCSS_EXTENSION: &str = "scss";
pub const SASS_EXTENSION: &str = "sass";
pub const CSS_EXTENSION: &str = "css";

/// Extensions to try when an import names no extension (in priority order)
pub const RESOLVE_EXTENSIONS: &[&str] = &[
    SCSS_EXTENSION, // most common dialect first
    CSS_EXTENSION,
    SASS_EXTENSION,
];

/// File stem looked up inside a directory when an import names a directory
pub const INDEX_FILE: &str = "index";

/// Prefix marking a partial stylesheet
pub const PARTIAL_PREFIX: char = '_';

/// Prefix marking a package-style import (`~bootstrap/scss/functions`)
pub const PACKAGE_PREFIX: char = '~';

pub const FILE_URL_PREFIX: &str = "file://";

/// Marker left inside a `file://` URL when a package import was re-submitted
/// by the compiler after being joined onto the importer's directory
pub const EMBEDDED_PACKAGE_MARKER: &str = "/~";
