use crate::agents::{PatchAgent, ProjectScannerAgent, StrategyRegistry, UpdateRun};
use crate::config::Config;
use crate::error::{DepError, Result};
use crate::models::{DependencyFile, UpdateSet, verify_fingerprint};
use crate::utils::PathValidator;
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Original and updated file sets, as handed to the upload collaborator.
#[derive(Debug, Serialize)]
struct UpdatePayload {
    ecosystem: String,
    updates: UpdateSet,
    original: Vec<DependencyFile>,
    updated: Vec<DependencyFile>,
}

/// List dependency files with their fingerprints
pub fn execute_list<P: AsRef<Path>>(
    project_path: P,
    files: &[String],
    ignore: &[String],
    json: bool,
) -> Result<()> {
    let project_path = PathValidator::validate_project_path(project_path)?;
    let mut config = Config::load(&project_path)?;
    config.ignored_paths.extend(ignore.iter().cloned());

    let scanner = ProjectScannerAgent::new(&project_path, &config.ignored_paths)?;
    let dependency_files: Vec<DependencyFile> = scanner
        .lookup(files)?
        .iter()
        .map(|f| f.relative_to(&project_path))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&dependency_files)?);
        return Ok(());
    }

    print_file_table(&dependency_files);
    Ok(())
}

/// Check files against `FILE=SHA` expectations, reporting every mismatch.
pub fn execute_verify<P: AsRef<Path>>(project_path: P, expected: &[String]) -> Result<()> {
    let project_path = PathValidator::validate_project_path(project_path)?;
    let checks = expected
        .iter()
        .map(|entry| parse_expectation(entry))
        .collect::<Result<Vec<_>>>()?;

    let mut first_mismatch = None;
    for (file, sha) in checks {
        let path = PathValidator::resolve_project_file(file, &project_path)?;
        match verify_fingerprint(&path, sha) {
            Ok(()) => println!("{} {} {}", "✓".green(), file.white().bold(), sha.dimmed()),
            Err(err @ DepError::Integrity { .. }) => {
                println!("{} {}", "✗".red(), err.to_string().red());
                first_mismatch.get_or_insert(err);
            }
            Err(err) => return Err(err),
        }
    }

    first_mismatch.map_or(Ok(()), Err)
}

/// Execute the update workflow
///
/// On failure the original files are written back before the error is
/// returned.
pub fn execute_update<P: AsRef<Path>>(
    project_path: P,
    ecosystem: &str,
    coordinates: &[String],
    restore: bool,
    json: bool,
) -> Result<()> {
    let project_path = PathValidator::validate_project_path(project_path)?;
    let config = Config::load(&project_path)?;
    let updates = UpdateSet::parse(coordinates)?;

    let registry = StrategyRegistry::with_defaults(&config, &project_path, !json)?;
    let strategy = match registry.get(ecosystem) {
        Ok(strategy) => strategy,
        Err(err) => {
            let known: Vec<&str> = registry.ecosystems().collect();
            eprintln!("Known package types: {}", known.join(", ").bright_cyan());
            return Err(err);
        }
    };

    if !json {
        println!(
            "{}",
            format!(
                "Updating {} {} package(s)...",
                updates.len(),
                strategy.ecosystem()
            )
            .cyan()
            .bold()
        );
    }

    let run = strategy.apply(&updates);

    if let Some(err) = run.error() {
        rollback(&run);
        if err.is_unsatisfiable() {
            eprintln!(
                "{}",
                "The requested versions are not compatible with each other; the update set was rejected."
                    .yellow()
            );
        }
        return run.outcome.map(|_| ());
    }

    if json {
        let payload = UpdatePayload {
            ecosystem: strategy.ecosystem().to_string(),
            updates,
            original: rebase(&run.original, &project_path),
            updated: rebase(run.updated(), &project_path),
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_update_summary(&run, &project_path);
    }

    if restore {
        run.restore_original()?;
        if !json {
            println!("{}", "✓ Original files restored".green());
        }
    }

    Ok(())
}

/// Apply a unified diff to one dependency file
pub fn execute_patch<P: AsRef<Path>>(
    project_path: P,
    file: &str,
    patch_source: Option<PathBuf>,
) -> Result<()> {
    let project_path = PathValidator::validate_project_path(project_path)?;
    let config = Config::load(&project_path)?;

    let path = PathValidator::resolve_project_file(file, &project_path)?;
    let mut dependency_file = DependencyFile::read(&path)?;
    let before = dependency_file.sha().to_string();

    let patch = read_patch(patch_source.as_deref())?;
    PatchAgent::from_config(&config).apply(&mut dependency_file, &patch)?;

    println!(
        "{} {} {} → {}",
        "✓ Patched".green(),
        file.white().bold(),
        before.red(),
        dependency_file.sha().green()
    );
    Ok(())
}

fn rollback(run: &UpdateRun) {
    if run.original.is_empty() {
        return;
    }
    match run.restore_original() {
        Ok(()) => eprintln!("{}", "Original files restored".yellow()),
        Err(err) => eprintln!(
            "{} {}",
            "Failed to restore original files:".red().bold(),
            err
        ),
    }
}

fn parse_expectation(entry: &str) -> Result<(&str, &str)> {
    match entry.rsplit_once('=') {
        Some((file, sha)) if !file.trim().is_empty() && !sha.trim().is_empty() => {
            Ok((file.trim(), sha.trim()))
        }
        _ => Err(DepError::InvalidInput(format!(
            "Invalid expectation '{}'. Expected format FILE=SHA",
            entry
        ))),
    }
}

fn read_patch(source: Option<&Path>) -> Result<String> {
    match source {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).map_err(|e| DepError::io(path, e))
        }
        _ => {
            let mut patch = String::new();
            io::stdin()
                .read_to_string(&mut patch)
                .map_err(|e| DepError::io("<stdin>", e))?;
            Ok(patch)
        }
    }
}

fn rebase(files: &[DependencyFile], root: &Path) -> Vec<DependencyFile> {
    files.iter().map(|f| f.relative_to(root)).collect()
}

fn print_file_table(files: &[DependencyFile]) {
    if files.is_empty() {
        println!("{}", "No dependency files found".yellow());
        return;
    }

    let width = files
        .iter()
        .map(|f| f.path().display().to_string().len())
        .max()
        .unwrap_or(0)
        .max("Path".len());

    println!("{:<width$}  {}", "Path".bold(), "SHA".bold(), width = width);
    for file in files {
        println!(
            "{:<width$}  {}",
            file.path().display().to_string().white(),
            file.sha().dimmed(),
            width = width
        );
    }
    println!("\n{} dependency file(s)", files.len().to_string().yellow());
}

fn print_update_summary(run: &UpdateRun, root: &Path) {
    println!("\n{}", "Update Summary:".cyan().bold());
    for updated in run.updated() {
        let name = updated.relative_to(root).path().display().to_string();
        match run.original.iter().find(|o| o.path() == updated.path()) {
            Some(original) if original.differs_from(updated) => println!(
                "  • {} {} → {}",
                name.white().bold(),
                original.sha().red(),
                updated.sha().green()
            ),
            Some(_) => println!("  • {} {}", name.white().bold(), "unchanged".dimmed()),
            None => println!("  • {} {}", name.white().bold(), updated.sha().green()),
        }
    }
}
