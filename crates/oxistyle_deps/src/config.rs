use anyhow::{Result, anyhow};
use clap::Parser;
use log::{debug, info};
use std::{env, path::PathBuf};

use oxistyle_core::RendererConfig;

#[derive(Debug, Clone, Parser)]
#[command(name = "deps")]
#[command(about = "List the stylesheets each entry file depends on")]
pub struct Config {
    /// Root directory of the project (defaults to the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Additional directory searched for imports (repeatable, in priority order)
    #[arg(long = "include-path", short = 'I')]
    pub include_paths: Vec<PathBuf>,

    /// Only files whose path relative to the root contains this string are entries
    #[arg(long)]
    pub entry_glob: Option<String>,
}

impl Config {
    /// Resolve the root directory and make include paths absolute
    pub fn initialize(&mut self) -> Result<()> {
        let root = match self.root.take() {
            Some(r) => {
                debug!("Using provided root directory: {:?}", r);
                r.canonicalize().unwrap_or(r)
            }
            None => {
                debug!("No root provided, using current directory");
                env::current_dir()?
            }
        };
        info!("Using root directory: {}", root.display());

        self.include_paths = self
            .include_paths
            .iter()
            .map(|p| if p.is_absolute() { p.clone() } else { root.join(p) })
            .collect();
        debug!("Search roots: {:?}", self.include_paths);

        self.root = Some(root);
        Ok(())
    }

    /// Get the root directory, returning an error if not initialized
    pub fn root(&self) -> Result<&PathBuf> {
        self.root
            .as_ref()
            .ok_or_else(|| anyhow!("Config not initialized - call initialize() first"))
    }

    pub fn renderer_config(&self) -> RendererConfig {
        RendererConfig::new().with_search_roots(self.include_paths.iter().cloned())
    }
}
