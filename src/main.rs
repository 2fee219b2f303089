use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use uplift::recipe::{apply_migration, load_from_path, MigrationConfig, StepResult};
use uplift::{dependency_version, ProjectGuard, StagedTree};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "uplift")]
#[command(about = "Automated migration engine for UI component library consumers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply migrations to a consumer project
    Apply {
        /// Path to the project root (auto-detected if not specified)
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Specific migration file to apply (otherwise applies all in migrations/)
        #[arg(short, long)]
        migration: Option<PathBuf>,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Show which migrations match the installed library version
    Status {
        /// Path to the project root (auto-detected if not specified)
        #[arg(short, long)]
        project: Option<PathBuf>,
    },

    /// List available migrations and their version constraints
    List,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("uplift=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            project,
            migration,
            dry_run,
            diff,
        } => cmd_apply(project, migration, dry_run, diff),

        Commands::Status { project } => cmd_status(project),

        Commands::List => cmd_list(),
    }
}

/// Helper: Discover all .toml migration files in a migrations/ directory.
///
/// Discovery order:
/// 1. `<project>/migrations` (allows keeping migrations alongside the target).
/// 2. `./migrations` relative to the current working directory.
fn discover_migration_files(project: &Path) -> Result<Vec<PathBuf>> {
    let cwd_migrations = env::current_dir().ok().map(|cwd| cwd.join("migrations"));
    let project_migrations = project.join("migrations");

    let candidate_dirs: Vec<PathBuf> = std::iter::once(project_migrations)
        .chain(cwd_migrations)
        .collect();

    for migrations_dir in candidate_dirs {
        if !migrations_dir.exists() {
            continue;
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&migrations_dir).max_depth(1) {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|s| s.to_str()) == Some("toml")
            {
                files.push(entry.path().to_path_buf());
            }
        }

        files.sort();

        if !files.is_empty() {
            return Ok(files);
        }
    }

    anyhow::bail!(
        "No .toml migration files found in either ./migrations or {}/migrations",
        project.display()
    )
}

/// Resolve the project path using multiple detection strategies.
///
/// Priority order:
/// 1. Explicit --project flag
/// 2. UPLIFT_PROJECT environment variable
/// 3. Nearest ancestor of the current directory holding a package.json
fn resolve_project(cli_project: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = cli_project {
        return Ok(path.canonicalize()?);
    }

    if let Ok(env_path) = env::var("UPLIFT_PROJECT") {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(path.canonicalize()?);
        }
        anyhow::bail!("UPLIFT_PROJECT points to a missing path: {env_path}");
    }

    let cwd = env::current_dir()?;
    for dir in cwd.ancestors() {
        if dir.join("package.json").is_file() {
            return Ok(dir.to_path_buf());
        }
    }

    anyhow::bail!(
        "no package.json found in {} or any parent; pass --project",
        cwd.display()
    )
}

fn cmd_apply(
    project: Option<PathBuf>,
    migration: Option<PathBuf>,
    dry_run: bool,
    diff: bool,
) -> Result<()> {
    let project = resolve_project(project)?;
    let guard = ProjectGuard::new(&project)?;
    let files = match migration {
        Some(file) => vec![file],
        None => discover_migration_files(&project)?,
    };

    let mut failures = 0usize;

    for file in files {
        let config = load_from_path(&file)?;
        println!(
            "{} {} ({})",
            "==>".bold(),
            config.meta.name.bold(),
            file.display()
        );

        let mut tree = StagedTree::new(&project)?;
        let results = apply_migration(&config, &mut tree)?;
        let mut migration_failed = false;

        for (id, result) in &results {
            match result {
                Ok(StepResult::Applied { files }) => {
                    println!("  {} {id}: applied ({files} file(s))", "ok".green());
                }
                Ok(StepResult::Unchanged) => {
                    println!("  {} {id}: nothing to do", "--".dimmed());
                }
                Ok(StepResult::SkippedVersion { reason }) => {
                    println!("  {} {id}: {reason}", "skip".yellow());
                }
                Ok(StepResult::NotRun) => {
                    println!("  {} {id}: not run (earlier step failed)", "skip".yellow());
                }
                Err(e) => {
                    failures += 1;
                    migration_failed = true;
                    println!("  {} {id}: {e}", "fail".red());
                }
            }
        }

        if diff {
            print_tree_diff(&tree)?;
        }

        if dry_run {
            println!("  {} dry run, discarding staged changes", "--".dimmed());
        } else if migration_failed {
            println!(
                "  {} migration failed, discarding staged changes",
                "fail".red()
            );
        } else if tree.is_dirty() {
            let stats = tree.commit(&guard)?;
            println!(
                "  {} committed {} write(s), {} delete(s)",
                "ok".green(),
                stats.written,
                stats.deleted
            );
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} step(s) failed");
    }
    Ok(())
}

fn cmd_status(project: Option<PathBuf>) -> Result<()> {
    let project = resolve_project(project)?;
    let files = discover_migration_files(&project)?;

    let tree = StagedTree::new(&project)?;
    let manifest = tree
        .read("package.json")?
        .ok_or_else(|| anyhow::anyhow!("project has no package.json"))?;

    for file in files {
        let config = load_from_path(&file)?;
        let declared = dependency_version(&manifest, &config.meta.package)?;

        let status = match declared.as_deref() {
            None => format!("{} not installed", config.meta.package).yellow(),
            Some(declared) => {
                let installed = uplift::recipe::declared_to_version(declared);
                if matches_gate(&config, installed)? {
                    format!("would apply (installed {installed})").green()
                } else {
                    format!("out of range (installed {installed})").dimmed()
                }
            }
        };

        println!("{} {}: {status}", config.meta.name.bold(), range_of(&config));
    }

    Ok(())
}

fn cmd_list() -> Result<()> {
    let cwd = env::current_dir()?;
    let files = discover_migration_files(&cwd)?;

    for file in files {
        let config = load_from_path(&file)?;
        println!(
            "{} {} - {} ({} step(s))",
            config.meta.name.bold(),
            range_of(&config),
            config.meta.description.as_deref().unwrap_or("no description"),
            config.steps.len()
        );
    }

    Ok(())
}

fn matches_gate(config: &MigrationConfig, installed: &str) -> Result<bool> {
    Ok(uplift::recipe::matches_requirement(
        installed,
        config.meta.version_range.as_deref(),
    )?)
}

fn range_of(config: &MigrationConfig) -> String {
    config
        .meta
        .version_range
        .clone()
        .unwrap_or_else(|| "*".to_string())
}

/// Print a unified-style diff of every staged change against disk.
fn print_tree_diff(tree: &StagedTree) -> Result<()> {
    let changes: Vec<(PathBuf, Option<String>)> = tree
        .changes()
        .map(|(p, c)| (p.to_path_buf(), c.map(|s| s.to_string())))
        .collect();

    for (path, staged) in changes {
        let original = tree.original(&path)?.unwrap_or_default();
        let staged = staged.unwrap_or_default();
        if original == staged {
            continue;
        }

        println!("  {}", format!("--- {}", path.display()).bold());
        let text_diff = TextDiff::from_lines(&original, &staged);
        for change in text_diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Delete => print!("  {}", format!("-{change}").red()),
                ChangeTag::Insert => print!("  {}", format!("+{change}").green()),
                ChangeTag::Equal => {}
            }
        }
    }

    Ok(())
}
