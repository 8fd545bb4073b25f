//! Import dependency listing for stylesheet projects.
//!
//! Every non-partial `.scss`/`.sass` file under the project root is treated
//! as an entry. Its imports are followed with the same resolution rules the
//! renderer uses, so the output is the set of files a compile would read.
//!
//! # Examples
//!
//! ```no_run
//! use oxistyle_deps::{Config, run_deps_scan};
//! use std::io::{BufWriter, Write};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let cfg = Config {
//!     root: Some(std::path::PathBuf::from("/path/to/project")),
//!     include_paths: vec!["styles".into()],
//!     entry_glob: None,
//! };
//!
//! let result = run_deps_scan(cfg).await?;
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! oxistyle_deps::print_dependency_tree(&mut stdout, &result, &result.root)?;
//! stdout.flush()?;
//! # Ok(())
//! # }
//! ```

mod checker;
mod collector;
mod config;
mod graph;
mod parser;
mod reporter;
mod types;

// Re-export public API
pub use checker::run_deps_scan;
pub use collector::collect_entries;
pub use config::Config;
pub use parser::scan_imports;
pub use reporter::{has_unresolved, print_all_resolved_message, print_dependency_tree};
pub use types::{EntryDeps, ScanResult, Unresolved};
