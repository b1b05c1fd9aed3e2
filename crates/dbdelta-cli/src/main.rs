use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use dbdelta_catalog::{MemoryDatabase, Snapshot};
use dbdelta_core::{ObjectType, SchemaComparison};
use dbdelta_engine::{CompareControl, DiffOutputControl, DiffRunner, ReportFormat};

mod config;
use config::Config;

/// dbdelta - structural diffs between database snapshots
#[derive(Parser)]
#[command(name = "dbdelta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: dbdelta.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a reference snapshot against a target snapshot
    Diff {
        /// Reference snapshot file (JSON)
        #[arg(short, long)]
        reference: PathBuf,

        /// Target snapshot file (JSON)
        #[arg(short, long)]
        target: PathBuf,

        /// Schema pairs to compare, as REFERENCE=TARGET (comma-separated
        /// or repeated)
        #[arg(short, long)]
        schemas: Vec<String>,

        /// Restrict the diff to these object kinds (e.g. table,view)
        #[arg(long)]
        types: Vec<String>,

        /// Regex patterns for object names to include
        #[arg(long)]
        include_objects: Option<String>,

        /// Regex patterns for object names to exclude
        #[arg(long)]
        exclude_objects: Option<String>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize the contents of a snapshot file
    Inspect {
        /// Snapshot file (JSON)
        snapshot: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dbdelta_engine=debug")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    // Load config if specified
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("dbdelta.toml").exists() {
        Config::from_file(Path::new("dbdelta.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    match cli.command {
        Commands::Diff {
            reference,
            target,
            schemas,
            types,
            include_objects,
            exclude_objects,
            format,
            output,
        } => {
            diff_command(
                &config,
                &reference,
                &target,
                schemas,
                types,
                include_objects,
                exclude_objects,
                &format,
                output.as_deref(),
                cli.verbose,
            )
            .await
        }
        Commands::Inspect { snapshot } => inspect_command(&snapshot, cli.verbose),
    }
}

/// Parse schema pair specs (`REFERENCE=TARGET`, bare name maps to itself)
fn parse_schema_pairs(specs: &[String]) -> Result<Vec<SchemaComparison>> {
    let mut pairs = Vec::new();
    for spec in specs.iter().flat_map(|spec| spec.split(',')) {
        let spec = spec.trim();
        if spec.is_empty() {
            continue;
        }
        let pair = match spec.split_once('=') {
            Some((reference, target)) => {
                let (reference, target) = (reference.trim(), target.trim());
                if reference.is_empty() || target.is_empty() {
                    return Err(anyhow::anyhow!("invalid schema pair: {spec}"));
                }
                SchemaComparison::by_name(reference, target)
            }
            None => SchemaComparison::by_name(spec, spec),
        };
        pairs.push(pair);
    }
    Ok(pairs)
}

/// Parse object-kind specs (comma-separated or repeated)
fn parse_types(specs: &[String]) -> Result<Vec<ObjectType>> {
    specs
        .iter()
        .flat_map(|spec| spec.split(','))
        .map(str::trim)
        .filter(|spec| !spec.is_empty())
        .map(|spec| spec.parse::<ObjectType>().map_err(Into::into))
        .collect()
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read snapshot {}: {}", path.display(), e))?;
    Snapshot::from_json(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse snapshot {}: {}", path.display(), e))
}

#[allow(clippy::too_many_arguments)]
async fn diff_command(
    config: &Config,
    reference_path: &Path,
    target_path: &Path,
    schemas: Vec<String>,
    types: Vec<String>,
    include_objects: Option<String>,
    exclude_objects: Option<String>,
    format: &str,
    output: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    // command-line flags win over config defaults
    let schemas = if schemas.is_empty() {
        config.diff.schemas.clone()
    } else {
        schemas
    };
    let types = if types.is_empty() {
        config.diff.types.clone()
    } else {
        types
    };
    let include_objects = include_objects.or_else(|| config.diff.include_objects.clone());
    let exclude_objects = exclude_objects.or_else(|| config.diff.exclude_objects.clone());

    let format: ReportFormat = format.parse()?;
    let pairs = parse_schema_pairs(&schemas)?;
    let types = parse_types(&types)?;

    if verbose {
        eprintln!(
            "{} {}",
            "Loading reference snapshot from:".cyan(),
            reference_path.display()
        );
    }
    let reference = MemoryDatabase::from_snapshot(load_snapshot(reference_path)?);

    if verbose {
        eprintln!(
            "{} {}",
            "Loading target snapshot from:".cyan(),
            target_path.display()
        );
    }
    let target = MemoryDatabase::from_snapshot(load_snapshot(target_path)?);

    let compare_control = CompareControl::new(pairs.clone()).with_types(types);

    let mut output_builder = DiffOutputControl::builder();
    if !pairs.is_empty() {
        output_builder = output_builder.schema_comparisons(pairs);
    }
    if let Some(patterns) = &include_objects {
        output_builder = output_builder.include_objects(patterns.clone());
    }
    if let Some(patterns) = &exclude_objects {
        output_builder = output_builder.exclude_objects(patterns.clone());
    }
    let output_control = output_builder.build()?;

    let runner = DiffRunner::between(&reference, &target)
        .with_compare_control(compare_control)
        .with_output_control(output_control);

    if verbose {
        eprintln!("{}", "Comparing snapshots...".cyan());
    }

    let result = match output {
        Some(path) => {
            let mut file = std::fs::File::create(path)?;
            let result = runner.run(format, &mut file).await?;
            if verbose {
                eprintln!("{} {}", "Report saved to:".green(), path.display());
            }
            result
        }
        None => {
            let mut stdout = std::io::stdout();
            runner.run(format, &mut stdout).await?
        }
    };

    eprintln!(
        "{} missing, {} unexpected, {} changed",
        result.missing.len().to_string().red(),
        result.unexpected.len().to_string().yellow(),
        result.changed.len().to_string().cyan(),
    );

    // Exit with error code if the databases differ
    if result.has_differences() {
        std::process::exit(1);
    }

    Ok(())
}

fn inspect_command(path: &Path, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("{} {}", "Loading snapshot from:".cyan(), path.display());
    }
    let snapshot = load_snapshot(path)?;

    println!("{} {}", "Database:".bold(), snapshot.dialect.name.green());
    println!(
        "{} {}",
        "Case sensitive:".bold(),
        snapshot.dialect.is_case_sensitive()
    );

    let schemas: Vec<String> = snapshot
        .schemas
        .iter()
        .map(|schema| schema.to_string())
        .collect();
    println!("{} {}", "Schemas:".bold(), schemas.join(", "));

    println!("{} {}", "Objects:".bold(), snapshot.objects.len());
    for (object_type, count) in snapshot.counts_by_type() {
        println!("  {:<20} {}", format!("{}:", object_type.label()), count);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn schema_pairs_parse_pairs_and_bare_names() {
        let pairs = parse_schema_pairs(&["public=app,audit".to_string()]).unwrap();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], SchemaComparison::by_name("public", "app"));
        assert_eq!(pairs[1], SchemaComparison::by_name("audit", "audit"));
    }

    #[test]
    fn empty_schema_pair_is_rejected() {
        assert!(parse_schema_pairs(&["=app".to_string()]).is_err());
    }

    #[test]
    fn types_parse_comma_separated() {
        let types = parse_types(&["table,view".to_string()]).unwrap();
        assert_eq!(types, vec![ObjectType::Table, ObjectType::View]);
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(parse_types(&["tabel".to_string()]).is_err());
    }
}
