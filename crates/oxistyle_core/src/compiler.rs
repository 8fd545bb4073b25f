//! Interface to the external stylesheet compiler.
//!
//! The compiler is driven with the entry source and calls back into an
//! [`Importer`] for every import it meets, and into a [`Logger`] for every
//! diagnostic. Nothing here depends on a particular compiler implementation.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::types::Syntax;

/// Location of a diagnostic as reported by the compiler. Line and column are
/// 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    pub url: Option<Url>,
    pub line: usize,
    pub column: usize,
    /// Text of the line the span starts on
    pub context: String,
}

#[derive(Debug, Clone, Default)]
pub struct WarnOptions {
    pub span: Option<SourceSpan>,
    pub deprecation: bool,
    pub stack: Option<String>,
}

pub trait Logger: Send + Sync {
    fn warn(&self, message: &str, options: &WarnOptions);

    fn debug(&self, message: &str, span: Option<&SourceSpan>) {
        let _ = (message, span);
    }
}

#[derive(Debug, Clone, Default)]
pub struct CanonicalizeContext {
    /// Canonical URL of the stylesheet containing the import, if known
    pub containing_url: Option<Url>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImporterResult {
    pub contents: String,
    pub syntax: Syntax,
    pub source_map_url: Option<Url>,
}

#[allow(async_fn_in_trait)]
pub trait Importer {
    /// Returns `Ok(None)` when the import can't be placed; the compiler decides
    /// whether that is fatal.
    async fn canonicalize(&self, url: &str, context: &CanonicalizeContext) -> Result<Option<Url>>;

    async fn load(&self, canonical_url: &Url) -> Result<Option<ImporterResult>>;
}

#[derive(Debug, Clone)]
pub struct CompileRequest<'a> {
    pub source: &'a str,
    pub syntax: Syntax,
    /// Canonical URL of the entry stylesheet
    pub url: &'a Url,
    pub source_map: bool,
    /// Compiler-specific options, forwarded untouched
    pub options: &'a Map<String, Value>,
}

/// Source map (revision 3) as produced by the compiler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
}

#[derive(Debug, Clone, Default)]
pub struct CompileOutput {
    pub css: String,
    /// Canonical URLs of every stylesheet loaded, in load order
    pub loaded_urls: Vec<Url>,
    pub source_map: Option<SourceMap>,
}

#[allow(async_fn_in_trait)]
pub trait StyleCompiler {
    async fn compile_string<I: Importer, L: Logger>(
        &self,
        request: CompileRequest<'_>,
        importer: &I,
        logger: &L,
    ) -> Result<CompileOutput>;
}
