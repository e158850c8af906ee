use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use seo_scorer::{analyze_with, Analysis, Error, ScoringConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Text,
}

#[derive(Parser)]
#[command(
    name = "seo-scorer",
    about = "Score article drafts for readability, keywords and SEO structure",
    version
)]
struct Cli {
    /// Markdown files to analyze (reads stdin if none provided)
    files: Vec<PathBuf>,

    /// Meta title the article will be published with
    #[arg(short, long, default_value = "")]
    title: String,

    /// Meta description the article will be published with
    #[arg(short, long, default_value = "")]
    description: String,

    /// TOML file overriding the scoring thresholds
    #[arg(short, long, env = "SEO_SCORER_CONFIG")]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_inputs(files: &[PathBuf]) -> Result<Vec<(String, String)>, Error> {
    if files.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .map_err(|e| Error::io("<stdin>", e))?;
        return Ok(vec![("<stdin>".to_string(), input)]);
    }
    files
        .iter()
        .map(|path| {
            std::fs::read_to_string(path)
                .map(|text| (path.display().to_string(), text))
                .map_err(|e| Error::io(path, e))
        })
        .collect()
}

fn print_report(label: &str, analysis: &Analysis) {
    let r = &analysis.readability;
    let s = &analysis.structure;
    println!("{label}");
    println!("  Score: {}/100 ({})", analysis.score, analysis.band);
    println!(
        "  Readability: {}/100, grade {:.1} ({}), {} words in {} sentences, {:.1} words/sentence",
        r.score, r.grade_metric, r.grade_label, r.word_count, r.sentence_count, r.avg_sentence_length
    );
    println!(
        "  Meta: title {} chars, description {} chars",
        analysis.meta.title_length, analysis.meta.description_length
    );
    println!(
        "  Structure: H1 {}, {} H2, {} H3, {} paragraphs, images {}, {} internal / {} external links",
        if s.has_h1 { "yes" } else { "no" },
        s.h2_count,
        s.h3_count,
        s.paragraph_count,
        if s.has_images { "yes" } else { "no" },
        s.internal_links,
        s.external_links
    );
    if !analysis.keywords.top_keywords.is_empty() {
        println!("  Top keywords:");
        for k in &analysis.keywords.top_keywords {
            println!("    {:<20} {:>4}  {:.2}%", k.word, k.count, k.density);
        }
    }
    println!("  Suggestions:");
    for suggestion in &analysis.suggestions {
        println!("    [{}] {}", suggestion.kind, suggestion.message);
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let config = match &cli.config {
        Some(path) => ScoringConfig::load(path)?,
        None => ScoringConfig::default(),
    };

    for (label, content) in read_inputs(&cli.files)? {
        if content.trim().is_empty() {
            tracing::warn!(input = %label, "skipping empty content");
            continue;
        }
        let analysis = analyze_with(&config, &content, &cli.title, &cli.description);
        match cli.format {
            Format::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
            Format::Text => print_report(&label, &analysis),
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
