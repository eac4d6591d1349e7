use anyhow::{bail, Context as AnyhowContext, Result};
use ask::{build_context, referenced_scripts, LlmRunner};
use clap::{Args, Parser, Subcommand};
use config::{FileConfig, SourceFlags, SourceKind};
use script_index_indexer::{
    GitHubSource, IndexMode, IndexStats, IndexerConfig, LocalSource, ScriptIndexer, SourceProvider,
};
use script_index_store::{repair_with_report, IndexStore, RepairReport};
use serde::Serialize;
use std::io;
use std::path::PathBuf;

pub mod ask;
pub mod config;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "script-index")]
#[command(about = "Build, repair, and query a JSON index of script files", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file (default: ./script-index.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the index from every script in the source
    Build(SourceArgs),

    /// Add scripts the index does not know yet
    Update(UpdateArgs),

    /// Normalize an existing index file in place
    Repair(RepairArgs),

    /// Print the index as numbered context lines
    Context(ContextArgs),

    /// Ask a local model which scripts answer a question
    Ask(AskArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// Where scripts come from
    #[arg(long, value_enum)]
    source: Option<SourceKind>,

    /// Directory to scan (local source)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Repository as OWNER/NAME (github source)
    #[arg(long)]
    repo: Option<String>,

    /// Branch to read (github source)
    #[arg(long)]
    branch: Option<String>,

    /// Script file extension
    #[arg(long)]
    extension: Option<String>,

    /// Index file
    #[arg(long)]
    index: Option<PathBuf>,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct UpdateArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Rebuild known scripts too and overwrite their entries
    #[arg(long)]
    refresh: bool,
}

#[derive(Args)]
struct RepairArgs {
    /// Index file
    #[arg(long)]
    index: Option<PathBuf>,

    /// Print the repaired document instead of saving it
    #[arg(long)]
    dry_run: bool,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ContextArgs {
    /// Index file
    #[arg(long)]
    index: Option<PathBuf>,

    /// Function names listed per script
    #[arg(long, default_value_t = 0)]
    max_functions: usize,
}

#[derive(Args)]
struct AskArgs {
    /// Question about the scripts
    question: String,

    /// Index file
    #[arg(long)]
    index: Option<PathBuf>,

    /// Ollama model
    #[arg(long)]
    model: Option<String>,

    /// Maximum scripts to suggest
    #[arg(long)]
    top: Option<usize>,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

impl Commands {
    fn json(&self) -> bool {
        match self {
            Self::Build(args) => args.json,
            Self::Update(args) => args.source.json,
            Self::Repair(args) => args.json,
            Self::Ask(args) => args.json,
            Self::Context(_) => false,
        }
    }
}

impl SourceArgs {
    fn flags(&self) -> SourceFlags {
        SourceFlags {
            kind: self.source,
            dir: self.dir.clone(),
            extension: self.extension.clone(),
            repo: self.repo.clone(),
            branch: self.branch.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport<'a> {
    index: String,
    saved: bool,
    total_scripts: usize,
    stats: &'a IndexStats,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RepairOutput<'a> {
    index: String,
    saved: bool,
    total_scripts: usize,
    report: &'a RepairReport,
}

#[derive(Serialize)]
struct AskOutput<'a> {
    reply: &'a str,
    scripts: Vec<&'a str>,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet || cli.command.json() {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = FileConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Build(args) => run_index(args, IndexMode::Full, &config).await?,
        Commands::Update(args) => {
            let mode = if args.refresh {
                IndexMode::Refresh
            } else {
                IndexMode::Incremental
            };
            run_index(args.source, mode, &config).await?;
        }
        Commands::Repair(args) => run_repair(args, &config).await?,
        Commands::Context(args) => run_context(args, &config).await?,
        Commands::Ask(args) => run_ask(args, &config).await?,
    }

    Ok(())
}

fn provider_for(args: &SourceArgs, config: &FileConfig) -> Result<Box<dyn SourceProvider>> {
    let settings = config.source(args.flags());
    Ok(match settings.kind {
        SourceKind::Local => Box::new(LocalSource::new(&settings.dir, &settings.extension)),
        SourceKind::Github => Box::new(
            GitHubSource::new(
                &settings.repo,
                &settings.branch,
                &settings.extension,
                settings.token,
            )
            .context("Invalid GitHub source")?,
        ),
    })
}

/// Build, update, or refresh the index
async fn run_index(args: SourceArgs, mode: IndexMode, config: &FileConfig) -> Result<()> {
    let index_path = config.index_path(args.index.clone());
    let provider = provider_for(&args, config)?;
    let indexer = ScriptIndexer::new(IndexerConfig::new(&index_path));

    let run = indexer
        .index_with_mode(provider.as_ref(), mode)
        .await
        .with_context(|| format!("Indexing into {} failed", index_path.display()))?;

    if args.json {
        let report = RunReport {
            index: indexer.store().path().display().to_string(),
            saved: run.saved,
            total_scripts: run.document.total_scripts(),
            stats: &run.stats,
        };
        print_stdout(&serde_json::to_string_pretty(&report)?)?;
    } else {
        eprintln!(
            "{}; {} scripts in {}",
            run.stats,
            run.document.total_scripts(),
            indexer.store().path().display()
        );
    }
    Ok(())
}

async fn run_repair(args: RepairArgs, config: &FileConfig) -> Result<()> {
    let index_path = config.index_path(args.index);
    let store = IndexStore::new(&index_path);
    let Some(raw) = store
        .load_raw()
        .await
        .with_context(|| format!("Failed to read {}", index_path.display()))?
    else {
        bail!("No index at {}", index_path.display());
    };

    let (document, report) = repair_with_report(&raw);

    if args.dry_run {
        print_stdout(&serde_json::to_string_pretty(&document)?)?;
        return Ok(());
    }

    store
        .save(&document)
        .await
        .with_context(|| format!("Failed to save {}", index_path.display()))?;

    if args.json {
        let output = RepairOutput {
            index: index_path.display().to_string(),
            saved: true,
            total_scripts: document.total_scripts(),
            report: &report,
        };
        print_stdout(&serde_json::to_string_pretty(&output)?)?;
    } else if report.is_clean() {
        eprintln!(
            "{} is already clean ({} scripts)",
            index_path.display(),
            document.total_scripts()
        );
    } else {
        eprintln!(
            "Repaired {}: {} placeholders, {} defaulted fields, {} recovered functions, {} dropped entries, {} duplicates ({} scripts)",
            index_path.display(),
            report.placeholders,
            report.defaulted_fields,
            report.recovered_functions,
            report.dropped_entries,
            report.duplicate_names,
            document.total_scripts()
        );
    }
    Ok(())
}

async fn run_context(args: ContextArgs, config: &FileConfig) -> Result<()> {
    let index_path = config.index_path(args.index);
    let document = IndexStore::new(&index_path)
        .load()
        .await
        .with_context(|| format!("Failed to load {}", index_path.display()))?;
    print_stdout(&build_context(&document, args.max_functions))
}

async fn run_ask(args: AskArgs, config: &FileConfig) -> Result<()> {
    let index_path = config.index_path(args.index);
    let document = IndexStore::new(&index_path)
        .load()
        .await
        .with_context(|| format!("Failed to load {}", index_path.display()))?;
    if document.is_empty() {
        bail!(
            "{} has no scripts; run `script-index build` first",
            index_path.display()
        );
    }

    let llm = config.llm(args.model, args.top);
    let runner = LlmRunner::ollama(&llm.model, llm.timeout);
    let reply = runner.ask(&document, &args.question, llm.top).await?;
    let scripts = referenced_scripts(&reply, &document);

    if args.json {
        let output = AskOutput {
            reply: &reply,
            scripts,
        };
        print_stdout(&serde_json::to_string_pretty(&output)?)?;
    } else {
        print_stdout(&reply)?;
        if !scripts.is_empty() {
            eprintln!("Mentioned scripts: {}", scripts.join(", "));
        }
    }
    Ok(())
}
