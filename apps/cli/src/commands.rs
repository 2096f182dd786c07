//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use console::style;
use tokio_util::sync::CancellationToken;
use tracing::info;

use markfill_core::{EnrichSummary, RunConfig, RunOutcome, run_deferred_revision, run_enrichment};
use markfill_lookup::{LookupClient, LookupOptions};
use markfill_shared::{AppConfig, init_config, load_config};

use crate::signals;
use crate::terminal::{CliProgress, ConsolePrompter};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// markfill: fill bookmark lists with website descriptions and favicons.
#[derive(Parser)]
#[command(
    name = "markfill",
    version,
    about = "Fill a YAML bookmark list with website descriptions and favicons.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Look up descriptions for every bookmark, then revise or provision.
    Enrich(EnrichArgs),

    /// Revise entries left over from an earlier `enrich` run.
    Revise {
        /// Bookmark document to update in place.
        #[arg(long)]
        bookmarks: Option<PathBuf>,

        /// Revise-needs list; rewritten with the entries still unresolved.
        #[arg(long)]
        needs: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for `markfill enrich`. Unset flags fall back to the config file.
#[derive(Args, Debug, Default)]
pub(crate) struct EnrichArgs {
    /// Bookmark list to enrich.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Enriched bookmark document.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// List of bookmarks that still need a description.
    #[arg(long)]
    pub revise_output: Option<PathBuf>,

    /// Website-info endpoint.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Maximum lookups in flight (0 = unbounded).
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Skip interactive revision and write both documents.
    #[arg(long)]
    pub no_prompt: bool,
}

impl EnrichArgs {
    /// Overlay the flags that were given onto `config`.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(input) = &self.input {
            config.files.input = input.clone();
        }
        if let Some(output) = &self.output {
            config.files.output = output.clone();
        }
        if let Some(revise_output) = &self.revise_output {
            config.files.revise_output = revise_output.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.lookup.endpoint = endpoint.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.lookup.concurrency = concurrency;
        }
    }
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "markfill=info",
        1 => "markfill=debug",
        _ => "markfill=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Enrich(args) => cmd_enrich(&args).await,
        Command::Revise { bookmarks, needs } => cmd_revise(bookmarks, needs).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_enrich(args: &EnrichArgs) -> Result<()> {
    let mut config = load_config()?;
    args.apply(&mut config);

    let lookup = LookupClient::new(&LookupOptions::from_config(&config.lookup)?)?;
    let run_config = RunConfig::from(&config);

    let cancel = CancellationToken::new();
    signals::spawn_abort_listener(cancel.clone());

    info!(
        input = %run_config.input.display(),
        endpoint = %config.lookup.endpoint,
        concurrency = run_config.concurrency,
        "enriching bookmarks"
    );

    let mut prompter = ConsolePrompter::new(cancel.clone()).declining(args.no_prompt);
    let progress = CliProgress::new();

    let outcome = run_enrichment(&run_config, &lookup, &mut prompter, &progress, cancel).await?;

    match outcome {
        RunOutcome::Provisioned { summary } => {
            print_summary(&summary);
            print_written(&run_config.output);
            println!(
                "{}",
                style(format!(
                    "Websites need to be fixed manually are listed in file \"{}\".",
                    run_config.revise_output.display()
                ))
                .yellow()
            );
            println!("See you!");
        }
        RunOutcome::Revised { summary, report } => {
            print_summary(&summary);
            if report.unmatched > 0 {
                println!(
                    "{}",
                    style(format!(
                        "{} revised entries no longer match a bookmark and were dropped.",
                        report.unmatched
                    ))
                    .yellow()
                );
            }
            print_written(&run_config.output);
            println!("See you!");
        }
        RunOutcome::Aborted => info!("run aborted, nothing written"),
    }

    Ok(())
}

async fn cmd_revise(bookmarks: Option<PathBuf>, needs: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let bookmarks = bookmarks.unwrap_or(config.files.output);
    let needs = needs.unwrap_or(config.files.revise_output);

    let cancel = CancellationToken::new();
    signals::spawn_abort_listener(cancel.clone());

    info!(
        bookmarks = %bookmarks.display(),
        needs = %needs.display(),
        "revising leftover entries"
    );

    let mut prompter = ConsolePrompter::new(cancel.clone());
    let Some(report) = run_deferred_revision(&bookmarks, &needs, &mut prompter, cancel).await?
    else {
        info!("revision aborted, nothing written");
        return Ok(());
    };

    print_written(&bookmarks);
    if report.remaining.is_empty() {
        println!("{}", style("Every website now has a description.").green());
    } else {
        println!(
            "{}",
            style(format!(
                "{} websites still need a description, see \"{}\".",
                report.remaining.len(),
                needs.display()
            ))
            .yellow()
        );
    }
    println!("See you!");

    Ok(())
}

fn print_summary(summary: &EnrichSummary) {
    println!();
    println!("  Websites:    {}", summary.total);
    println!("  Described:   {}", summary.described);
    println!("  Need review: {}", summary.needs_revision);
}

fn print_written(path: &std::path::Path) {
    println!(
        "{}",
        style(format!("\nSuccessfully wrote \"{}\"!", path.display())).green()
    );
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
