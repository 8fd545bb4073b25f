use std::path::PathBuf;

use oxistyle_core::{SourceMap, Warning};

#[derive(Debug, Clone)]
pub struct RenderResult {
    /// Generated CSS, ending with an inline source map comment when source
    /// maps are enabled
    pub css: String,
    /// Every file that took part in the render, entry first
    pub watch_files: Vec<PathBuf>,
    pub warnings: Vec<Warning>,
    /// The rewritten source map, with sources relative to the entry directory
    pub source_map: Option<SourceMap>,
}
