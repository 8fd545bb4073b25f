use std::{
    io::{self, Write},
    path::Path,
};

use colored::Colorize;
use log::{debug, trace};

use crate::types::{EntryDeps, ScanResult};

/// Shows `path` relative to the project root when it lives under it
fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).to_string_lossy().into_owned()
}

pub fn print_all_resolved_message<W: Write>(writer: &mut W, entries: usize) -> io::Result<()> {
    debug!("All imports resolved");
    writeln!(writer, "{} All imports resolved across {} entries", "✓".green().bold(), entries)?;
    writer.flush()?;
    Ok(())
}

fn print_entry<W: Write>(writer: &mut W, entry: &EntryDeps, root: &Path) -> io::Result<()> {
    trace!("Printing entry: {}", entry.entry.display());
    let dependencies = &entry.files[entry.files.len().min(1)..];

    writeln!(
        writer,
        "{} ({} files)",
        display_path(root, &entry.entry).blue(),
        entry.files.len().to_string().cyan().bold()
    )?;

    let total = dependencies.len() + entry.unresolved.len();
    let lines = dependencies
        .iter()
        .map(|file| display_path(root, file))
        .chain(entry.unresolved.iter().map(|missing| {
            let reason = missing.reason.as_deref().unwrap_or("no matching file");
            format!(
                "{} {} ({} in {})",
                "✗".red().bold(),
                missing.specifier.red(),
                reason,
                display_path(root, &missing.from_file)
            )
        }))
        .enumerate();

    for (idx, line) in lines {
        let prefix = if idx + 1 == total { "└──" } else { "├──" };
        writeln!(writer, "{}  {}", prefix.dimmed(), line)?;
    }

    writeln!(writer)?;
    Ok(())
}

pub fn print_dependency_tree<W: Write>(
    writer: &mut W,
    result: &ScanResult,
    root: &Path,
) -> io::Result<()> {
    debug!("Printing dependency tree for {} entries", result.entries.len());

    for entry in &result.entries {
        print_entry(writer, entry, root)?;
    }

    print_summary(writer, result, root)?;
    writer.flush()?;
    Ok(())
}

fn print_summary<W: Write>(writer: &mut W, result: &ScanResult, root: &Path) -> io::Result<()> {
    let unresolved: usize = result.entries.iter().map(|e| e.unresolved.len()).sum();
    let largest = result.entries.iter().max_by_key(|e| e.files.len());

    writeln!(writer, "{}", "─".repeat(60).dimmed())?;
    writeln!(writer, "{}", "Summary".bold())?;
    writeln!(writer, "  Entries: {}", result.entries.len().to_string().cyan().bold())?;
    writeln!(writer, "  Stylesheets analyzed: {}", result.files_analyzed.to_string().cyan())?;
    if let Some(largest) = largest {
        writeln!(
            writer,
            "  Largest entry: {} files - {}",
            largest.files.len().to_string().yellow(),
            display_path(root, &largest.entry).blue()
        )?;
    }
    if unresolved > 0 {
        writeln!(writer, "  Unresolved imports: {}", unresolved.to_string().red().bold())?;
    }

    Ok(())
}

/// Whether any entry has an import that could not be resolved
pub fn has_unresolved(result: &ScanResult) -> bool {
    result.entries.iter().any(|e| !e.unresolved.is_empty())
}
