use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub from_file: PathBuf,
    pub specifier: String,
    /// Set when resolution failed loudly (package lookup), None for no match
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EntryDeps {
    pub entry: PathBuf,
    /// Entry first, then every reachable stylesheet in discovery order
    pub files: Vec<PathBuf>,
    pub unresolved: Vec<Unresolved>,
}

#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Project root the scan ran from, after initialization
    pub root: PathBuf,
    pub entries: Vec<EntryDeps>,
    pub files_analyzed: usize,
}
