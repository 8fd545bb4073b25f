use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use log::{debug, info};
use oxistyle_core::{RendererConfig, StyleImporter};
use oxistyle_deps::Config;
use std::env;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "oxistyle")]
#[command(about = "Tools for resolving stylesheet imports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show which file an import specifier resolves to
    Resolve(ResolveArgs),
    /// List the stylesheets each entry file depends on
    Deps(Config),
}

#[derive(Debug, Args)]
struct ResolveArgs {
    /// The specifier as written in the import, e.g. `~bootstrap/scss/functions`
    specifier: String,

    /// The stylesheet containing the import
    #[arg(long)]
    from: PathBuf,

    /// Additional directory searched for imports (repeatable, in priority order)
    #[arg(long = "include-path", short = 'I')]
    include_paths: Vec<PathBuf>,
}

async fn run_resolve<W: Write>(stdout: &mut W, args: ResolveArgs) -> Result<bool> {
    let cwd = env::current_dir()?;
    let from = if args.from.is_absolute() { args.from } else { cwd.join(args.from) };
    let importer_dir = from.parent().unwrap_or(Path::new("/")).to_path_buf();
    let search_roots: Vec<PathBuf> = args
        .include_paths
        .into_iter()
        .map(|p| if p.is_absolute() { p } else { cwd.join(p) })
        .collect();
    debug!("Resolving '{}' from {} with roots {:?}", args.specifier, from.display(), search_roots);

    let config = Arc::new(RendererConfig::new().with_search_roots(search_roots));
    let importer = StyleImporter::new(config, importer_dir.clone());

    match importer.canonicalize_path(&args.specifier, &importer_dir).await? {
        Some(resolved) => {
            writeln!(stdout, "{} {}", "✓".green().bold(), resolved.display())?;
            Ok(true)
        }
        None => {
            writeln!(
                stdout,
                "{} Could not resolve '{}' from {}",
                "✗".red().bold(),
                args.specifier.red(),
                from.display()
            )?;
            Ok(false)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    match cli.command {
        Commands::Resolve(args) => {
            let found = run_resolve(&mut stdout, args).await?;
            stdout.flush()?;
            if !found {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Deps(cfg) => {
            info!("Running dependency scan");
            debug!("Config: root={:?}, entry_glob={:?}", cfg.root, cfg.entry_glob);

            let result = oxistyle_deps::run_deps_scan(cfg).await?;
            let elapsed_ms = start.elapsed().as_millis();

            oxistyle_deps::print_dependency_tree(&mut stdout, &result, &result.root)?;
            let unresolved = oxistyle_deps::has_unresolved(&result);
            if !unresolved {
                oxistyle_deps::print_all_resolved_message(&mut stdout, result.entries.len())?;
            }

            writeln!(
                stdout,
                "\n{} Finished in {}ms on {} files.",
                "●".bright_blue(),
                elapsed_ms.to_string().cyan(),
                result.files_analyzed.to_string().cyan()
            )?;
            stdout.flush()?;

            // Non-zero exit to fail CI
            if unresolved {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
