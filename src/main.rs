use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use listing_scout::keywords::{self, scoring};
use listing_scout::{LabelTable, ListingParser, ListingRecord, ParseOptions, Settings};

#[derive(Parser)]
#[command(name = "listing_scout", about = "Extract listing analytics from pasted page text")]
struct Cli {
    /// Label table file (toml, json or yaml); overrides the configured one
    #[arg(long, global = true)]
    labels: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse listing pastes into JSON records (stdin when no files are given)
    Parse {
        files: Vec<PathBuf>,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Rank keywords from a keyword-tool paste
    Keywords {
        /// Paste file (default: stdin)
        file: Option<PathBuf>,
        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Show the active label table
    Labels,
}

#[derive(Serialize)]
struct ParsedPaste<'a> {
    source: String,
    record: &'a ListingRecord,
}

#[derive(Serialize)]
struct RankedReport<'a> {
    seed_keyword: Option<&'a str>,
    country_code: &'a str,
    keywords: &'a [scoring::ScoredKeyword],
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .try_init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let t0 = Instant::now();
    let cli = Cli::parse();

    let settings = Settings::load().context("loading settings")?;
    info!(settings_loaded = ?settings, msg = "Starting listing_scout");

    let labels_path = cli.labels.as_ref().or(settings.labels_path.as_ref());
    let table = match labels_path {
        Some(path) => LabelTable::from_path(path)
            .with_context(|| format!("loading label table {}", path.display()))?,
        None => LabelTable::builtin().context("loading built-in label table")?,
    };

    match cli.command {
        Commands::Parse { files, pretty } => {
            let parser = ListingParser::new(table, ParseOptions::from(&settings));
            if files.is_empty() {
                let text = read_stdin()?;
                let record = parser.parse(&text);
                emit_record("-", &record, pretty)?;
            } else {
                let results = parse_files(&parser, &files)?;
                for (path, record) in &results {
                    emit_record(&path.display().to_string(), record, pretty)?;
                }
            }
        }
        Commands::Keywords { file, json, limit } => {
            let text = match &file {
                Some(path) => read_file(path)?,
                None => read_stdin()?,
            };
            let report = keywords::parse(&text);
            let ranked = scoring::rank(report.keywords.clone(), &settings.weights);

            if json {
                let out = RankedReport {
                    seed_keyword: report.seed_keyword.as_deref(),
                    country_code: &report.country_code,
                    keywords: &ranked,
                };
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_keywords(&report, &ranked, limit);
            }
        }
        Commands::Labels => print_labels(&table),
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }
    Ok(())
}

fn parse_files(
    parser: &ListingParser,
    files: &[PathBuf],
) -> anyhow::Result<Vec<(PathBuf, ListingRecord)>> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let texts = files
        .iter()
        .map(|p| read_file(p).map(|t| (p.clone(), t)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let pb = if texts.len() > 1 {
        ProgressBar::new(texts.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );

    let results = texts
        .par_iter()
        .map(|(path, text)| {
            let record = parser.parse(text);
            pb.inc(1);
            (path.clone(), record)
        })
        .collect();

    pb.finish_and_clear();
    Ok(results)
}

fn emit_record(source: &str, record: &ListingRecord, pretty: bool) -> anyhow::Result<()> {
    if record.is_empty() {
        eprintln!("{}: no data fields extracted", source);
    }
    let out = ParsedPaste {
        source: source.to_string(),
        record,
    };
    let json = if pretty {
        serde_json::to_string_pretty(&out)?
    } else {
        serde_json::to_string(&out)?
    };
    println!("{}", json);
    Ok(())
}

fn print_keywords(
    report: &keywords::KeywordReport,
    ranked: &[scoring::ScoredKeyword],
    limit: usize,
) {
    println!(
        "Seed: {} | Country: {}",
        report.seed_keyword.as_deref().unwrap_or("(none found)"),
        report.country_code
    );
    if ranked.is_empty() {
        println!("No keyword rows found.");
        return;
    }

    println!(
        "{:>3} | {:<32} | {:>7} | {:>10} | {:>8} | {:>12}",
        "#", "Keyword", "Score", "Searches", "CTR", "Competition"
    );
    println!("{}", "-".repeat(86));
    for (i, k) in ranked.iter().take(limit).enumerate() {
        println!(
            "{:>3} | {:<32} | {:>7.3} | {:>10} | {:>8} | {:>12}",
            i + 1,
            truncate(&k.entry.keyword, 32),
            k.opportunity,
            k.entry.avg_searches,
            k.entry.avg_ctr,
            k.entry.etsy_competition
        );
    }
    println!("\n{} keywords", ranked.len());
}

fn print_labels(table: &LabelTable) {
    println!("Label table v{}", table.version());
    println!(
        "{:<20} | {:<20} | {:<5} | {:<8} | {}",
        "Label", "Field", "Type", "Flags", "Pattern"
    );
    println!("{}", "-".repeat(90));
    for rule in table.rules() {
        let mut flags = Vec::new();
        if rule.multi_alias {
            flags.push("alias");
        }
        if rule.strip_percent {
            flags.push("%");
        }
        println!(
            "{:<20} | {:<20} | {:<5} | {:<8} | {}",
            rule.label,
            rule.field,
            rule.converter.name(),
            flags.join(","),
            rule.validator.as_ref().map(|r| r.as_str()).unwrap_or("-")
        );
    }
    let noise: Vec<&str> = table.noise().collect();
    if !noise.is_empty() {
        println!("\nNoise lines: {}", noise.join(", "));
    }
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn read_stdin() -> anyhow::Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("reading stdin")?;
    Ok(text)
}

/// Cut `s` to at most `max` characters, marking the cut with "...".
fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let total = d.as_secs();
    let (hours, mins, secs) = (total / 3600, total / 60 % 60, total % 60);
    match (hours, mins) {
        (0, 0) => format!("{:.1}s", d.as_secs_f64()),
        (0, _) => format!("{}m {}s", mins, secs),
        _ => format!("{}h {}m {}s", hours, mins, secs),
    }
}
