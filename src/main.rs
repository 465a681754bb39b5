//! link-sieve main entry point
//!
//! This is the command-line interface for fetching, filtering and saving
//! the links of web pages, and for bulk-downloading the results.

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use link_sieve::config::{load_config_with_hash, validate, Config, FetchStrategyKind, NamingScheme};
use link_sieve::crawler::{crawl, BatchReport, ExtractMode};
use link_sieve::download::{build_download_client, download_all, DownloadOptions, DownloadReport};
use link_sieve::input::prompt::Prompter;
use link_sieve::input::read_url_list;
use link_sieve::output::{
    default_output_name, print_report, ConsoleObserver, ReportSource, ReportWriter, SaveMetadata,
    TextFileOutput,
};
use link_sieve::url::{add_scheme_if_missing, validate_target, MatchPattern};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// link-sieve: fetch web pages and sift their links
///
/// Collects hyperlinks, image links or directory-listing entries from one
/// page or a list of pages, filters them by substring or regular
/// expression, and saves the merged, sorted list to a text file. Any value
/// not given on the command line is asked for interactively.
#[derive(Parser, Debug)]
#[command(name = "link-sieve")]
#[command(version = "1.0.0")]
#[command(about = "Fetch web pages and sift their links", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress progress output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    timeout: Option<u64>,

    /// User agent sent with every request
    #[arg(long, global = true)]
    user_agent: Option<String>,

    /// Render pages in headless Chromium (requires the `browser` feature)
    #[arg(long, global = true)]
    browser: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect the links of a single page
    Page {
        /// Page URL; the scheme defaults to https
        url: Option<String>,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        save: SaveArgs,
    },

    /// Collect the links of every page in a URL list file
    Batch {
        /// Text file with one URL per line (`#` starts a comment)
        list: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        save: SaveArgs,
    },

    /// Collect image links from every page in a URL list file
    Images {
        /// Text file with one URL per line
        list: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        save: SaveArgs,
    },

    /// Collect the entries of an "Index of" directory listing
    Index {
        /// Listing URL
        url: Option<String>,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        save: SaveArgs,
    },

    /// Download every URL of a link list file
    Download {
        /// Text file with one URL per line
        list: Option<PathBuf>,

        /// Target directory
        #[arg(short, long)]
        directory: Option<PathBuf>,

        /// Keep original file names instead of numbering files
        #[arg(long)]
        original_names: bool,
    },
}

#[derive(Args, Debug, Clone)]
struct FilterArgs {
    /// Keep only links containing this text (or matching it with --regex)
    #[arg(short, long)]
    pattern: Option<String>,

    /// Treat the pattern as a case-insensitive regular expression
    #[arg(long)]
    regex: bool,

    /// Keep every link without asking for a pattern
    #[arg(long, conflicts_with = "pattern")]
    all: bool,
}

#[derive(Args, Debug, Clone)]
struct SaveArgs {
    /// Save the links to this file without asking
    #[arg(short, long, conflicts_with = "no_save")]
    output: Option<PathBuf>,

    /// Save the links under the default file name without asking
    #[arg(long, conflicts_with = "no_save")]
    save: bool,

    /// Do not save and do not ask
    #[arg(long)]
    no_save: bool,
}

/// Everything the command handlers share
struct Session<R, W> {
    config: Config,
    config_hash: Option<String>,
    observer: ConsoleObserver,
    prompter: Prompter<R, W>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_configuration(&cli)?;

    let mut session = Session {
        config,
        config_hash,
        observer: ConsoleObserver::new(cli.quiet),
        prompter: Prompter::stdio(),
    };

    match cli.command {
        Command::Page { url, filter, save } => {
            handle_single_page(&mut session, url, ExtractMode::Links, &filter, &save).await
        }
        Command::Index { url, filter, save } => {
            handle_single_page(&mut session, url, ExtractMode::DirectoryListing, &filter, &save)
                .await
        }
        Command::Batch { list, filter, save } => {
            handle_url_list(&mut session, list, ExtractMode::Links, &filter, &save).await
        }
        Command::Images { list, filter, save } => {
            handle_url_list(&mut session, list, ExtractMode::Images, &filter, &save).await
        }
        Command::Download {
            list,
            directory,
            original_names,
        } => handle_download(&mut session, list, directory, original_names).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            // Per-URL problems are already on the console
            0 => EnvFilter::new("link_sieve=error,warn"),
            1 => EnvFilter::new("link_sieve=info,warn"),
            2 => EnvFilter::new("link_sieve=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Built-in defaults, then the config file, then command-line flags
fn load_configuration(cli: &Cli) -> Result<(Config, Option<String>)> {
    let (mut config, hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    if let Some(timeout) = cli.timeout {
        config.fetch.timeout_secs = timeout;
    }
    if let Some(user_agent) = &cli.user_agent {
        config.fetch.user_agent = user_agent.clone();
    }
    if cli.browser {
        config.fetch.strategy = FetchStrategyKind::Browser;
    }

    validate(&config).context("Invalid command-line options")?;
    Ok((config, hash))
}

/// `page` and `index`: one URL, failure is fatal
async fn handle_single_page<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    url: Option<String>,
    mode: ExtractMode,
    filter: &FilterArgs,
    save: &SaveArgs,
) -> Result<()> {
    let target = match url {
        Some(url) => url,
        None => session.prompter.ask_required("Enter the link of the web page: ")?,
    };

    let page_url = validate_target(&add_scheme_if_missing(
        &target,
        session.config.filter.default_scheme,
    ))
    .with_context(|| {
        format!(
            "Invalid URL format '{}'. Please include a valid domain (e.g., example.com)",
            target
        )
    })?;

    let pattern = resolve_pattern(session, filter)?;

    if !session.observer.quiet {
        println!("\nFetching {} from {}...", mode.label(), page_url);
    }
    let report = crawl(
        &session.config,
        &[target],
        mode,
        pattern.clone(),
        &session.observer,
    )
    .await?;

    if let Some(error) = report.errors.first() {
        bail!("{}", error.message);
    }

    let metadata = SaveMetadata::new(ReportSource::Page(page_url), mode, pattern)
        .with_config_hash(session.config_hash.clone());
    print_report(&report, &metadata);
    offer_save(session, &report, &metadata, save)
}

/// `batch` and `images`: a list of URLs, per-URL failures are reported
async fn handle_url_list<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    list: Option<PathBuf>,
    mode: ExtractMode,
    filter: &FilterArgs,
    save: &SaveArgs,
) -> Result<()> {
    let path = match list {
        Some(path) => path,
        None => session.prompter.ask_existing_file(
            "Enter the path to the text file containing the list of web page URLs: ",
        )?,
    };

    let urls = read_url_list(&path)?;
    println!(
        "\nFound {} URLs in '{}'.",
        urls.len(),
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    );

    let pattern = resolve_pattern(session, filter)?;

    let report = crawl(&session.config, &urls, mode, pattern.clone(), &session.observer).await?;

    let metadata = SaveMetadata::new(ReportSource::UrlList(path), mode, pattern)
        .with_config_hash(session.config_hash.clone());
    print_report(&report, &metadata);
    offer_save(session, &report, &metadata, save)
}

/// Determines the link filter from flags or by asking
fn resolve_pattern<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    filter: &FilterArgs,
) -> Result<Option<MatchPattern>> {
    if filter.all {
        return Ok(None);
    }

    let (text, use_regex) = match &filter.pattern {
        Some(text) => (text.clone(), filter.regex),
        None => {
            let text = session.prompter.ask(
                "Enter the text to search for within the links (leave blank to collect all http(s) links): ",
            )?;
            let use_regex = !text.is_empty()
                && (filter.regex
                    || session
                        .prompter
                        .ask_yes_no("Treat the text as a regular expression?")?);
            (text, use_regex)
        }
    };

    let pattern = MatchPattern::parse(&text, use_regex);
    match &pattern {
        None => println!("{}", "No text provided. Collecting all valid links.".yellow()),
        Some(MatchPattern::InvalidRegex { reason, .. }) => println!(
            "{}",
            format!("Invalid regular expression, no links will match: {}", reason).red()
        ),
        Some(_) => {}
    }

    Ok(pattern)
}

/// Saves the report if requested by flag or by answer
///
/// When the destination comes from a flag, a failed save is fatal;
/// otherwise the user is asked for another file name.
fn offer_save<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    report: &BatchReport,
    metadata: &SaveMetadata,
    save: &SaveArgs,
) -> Result<()> {
    if save.no_save {
        return Ok(());
    }

    let explicit = save.output.is_some() || save.save;
    if !explicit {
        if report.links.is_empty() {
            return Ok(());
        }
        if !session
            .prompter
            .ask_yes_no("\nDo you want to save these links to a text file?")?
        {
            println!("Okay, links will not be saved.");
            return Ok(());
        }
    }

    let default_path = Path::new(&session.config.output.directory)
        .join(default_output_name(metadata, Local::now()));

    loop {
        let path = match (&save.output, save.save) {
            (Some(path), _) => path.clone(),
            (None, true) => default_path.clone(),
            (None, false) => PathBuf::from(session.prompter.ask_with_default(
                "Enter filename to save as",
                &default_path.display().to_string(),
            )?),
        };

        println!("Saving links to '{}'...", path.display());
        match TextFileOutput::new(&path).write_report(report, metadata) {
            Ok(()) => {
                println!("{}", "Links saved successfully.".green());
                return Ok(());
            }
            Err(e) if explicit => return Err(e.into()),
            Err(e) => eprintln!("{}", e.to_string().red()),
        }
    }
}

/// `download`: fetch every URL of a list into a directory
async fn handle_download<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    list: Option<PathBuf>,
    directory: Option<PathBuf>,
    original_names: bool,
) -> Result<()> {
    let path = match list {
        Some(path) => path,
        None => session
            .prompter
            .ask_existing_file("Enter the full path to your links file: ")?,
    };
    let urls = read_url_list(&path)?;

    let mut options = DownloadOptions::from_config(&session.config);
    if let Some(directory) = directory {
        options.directory = directory;
    }
    if original_names {
        options.naming = NamingScheme::Original;
    }

    println!(
        "\nFiles will be saved to the '{}' folder.",
        options.directory.display()
    );
    println!("Starting downloads...\n");

    let client = build_download_client(&session.config.fetch)?;
    let report = download_all(&urls, &client, &options, &session.observer).await?;

    print_download_summary(&report);
    Ok(())
}

fn print_download_summary(report: &DownloadReport) {
    println!("\n{}", "--- Download process finished ---".bold());
    println!(
        "Processed {} links. Saved {} files.",
        report.attempted,
        report.saved.len()
    );

    if !report.failures.is_empty() {
        println!(
            "{}",
            format!("{} downloads failed:", report.failures.len()).red()
        );
        for failure in &report.failures {
            println!("- {}: {}", failure.url, failure.message);
        }
    }
}
