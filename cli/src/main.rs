//! pdf-outline CLI - heading outline extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdf_outline::classify::SimilarityScorer;
use pdf_outline::model::Evidence;
use pdf_outline::render::render_outline;
use pdf_outline::{OutlineConfig, OutlineExtractor, PdfDocument, RunEvent, RunSummary, Runner};

#[derive(Parser)]
#[command(name = "pdf-outline")]
#[command(version)]
#[command(about = "Extract heading outlines (H1, H2, ...) from PDF files as JSON", long_about = None)]
struct Cli {
    /// Directory containing the PDF files to process
    #[arg(long, env = "PDF_OUTLINE_INPUT", default_value = "/app/input")]
    input: PathBuf,

    /// Directory receiving one JSON file per PDF
    #[arg(long, env = "PDF_OUTLINE_OUTPUT", default_value = "/app/output")]
    output: PathBuf,

    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every command that classifies headings.
#[derive(Args)]
struct Settings {
    /// Directory holding the sentence-embedding model
    #[arg(long, global = true, env = "PDF_OUTLINE_MODEL", default_value = "/app/local_model")]
    model: PathBuf,

    /// Classify by font and style only, without loading the model
    #[arg(long, global = true)]
    no_semantic: bool,

    /// JSON configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of font-ranked heading levels (1-8)
    #[arg(long, global = true, value_name = "K")]
    levels: Option<usize>,

    /// Ignore text within this fraction of the page height from the top and bottom edges
    #[arg(long, global = true, value_name = "F")]
    margin: Option<f32>,

    /// Write `{ "title": ..., "outline": [...] }` instead of a bare array
    #[arg(long, global = true)]
    with_title: bool,

    /// Output single-line JSON
    #[arg(long, global = true)]
    compact: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the outline of a single PDF
    File {
        /// Input PDF file
        #[arg(value_name = "PDF")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show every line with its font, level and evidence
    Inspect {
        /// Input PDF file
        #[arg(value_name = "PDF")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::File { input, output }) => {
            cmd_file(&input, output.as_deref(), &cli.settings)
        }
        Some(Commands::Inspect { input }) => cmd_inspect(&input, &cli.settings),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => cmd_batch(&cli.input, &cli.output, &cli.settings),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

impl Settings {
    /// Load the configuration file (if any) and apply flag overrides.
    fn outline_config(&self) -> pdf_outline::Result<OutlineConfig> {
        let mut config = match &self.config {
            Some(path) => OutlineConfig::from_json_file(path)?,
            None => OutlineConfig::default(),
        };

        if let Some(levels) = self.levels {
            config = config.with_max_levels(levels);
        }
        if let Some(margin) = self.margin {
            config = config.with_header_footer_margin(margin);
        }
        if self.with_title {
            config = config.with_title(true);
        }
        if self.compact {
            config = config.with_format(pdf_outline::JsonFormat::Compact);
        }

        config.validate()?;
        Ok(config)
    }

    /// The semantic scorer, or `None` for font-only classification.
    fn scorer(&self, config: &OutlineConfig) -> Option<Box<dyn SimilarityScorer>> {
        if self.no_semantic {
            log::info!("Semantic scoring disabled");
            return None;
        }
        load_scorer(&self.model, &config.classifier.reference_phrases)
    }
}

#[cfg(feature = "embeddings")]
fn load_scorer(model_dir: &Path, phrases: &[String]) -> Option<Box<dyn SimilarityScorer>> {
    use pdf_outline::{MiniLmEmbedder, ReferenceSimilarity};

    let loaded = MiniLmEmbedder::load(model_dir)
        .and_then(|embedder| ReferenceSimilarity::new(embedder, phrases));
    match loaded {
        Ok(scorer) => Some(Box::new(scorer)),
        Err(e) => {
            log::warn!(
                "Embedding model unavailable ({}); using font-only classification",
                e
            );
            None
        }
    }
}

#[cfg(not(feature = "embeddings"))]
fn load_scorer(_model_dir: &Path, _phrases: &[String]) -> Option<Box<dyn SimilarityScorer>> {
    log::warn!("Built without embedding support; using font-only classification");
    None
}

fn cmd_batch(
    input: &Path,
    output: &Path,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = settings.outline_config()?;
    let scorer = settings.scorer(&config);

    let mut runner = Runner::new(config);
    if let Some(scorer) = scorer.as_deref() {
        runner = runner.with_scorer(scorer);
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let summary = runner.run_with_progress(input, output, |event| match event {
        RunEvent::Started { total } => pb.set_length(total as u64),
        RunEvent::Finished { path, .. } | RunEvent::Failed { path, .. } => {
            pb.set_message(file_name(path));
            pb.inc(1);
        }
    });
    pb.finish_and_clear();

    print_summary(&summary?, output);
    Ok(())
}

fn print_summary(summary: &RunSummary, output: &Path) {
    println!(
        "{} {} file(s), {} heading(s) written to {}",
        "Processed".green().bold(),
        summary.processed.len(),
        summary.headings(),
        output.display()
    );

    for (i, report) in summary.processed.iter().enumerate() {
        let branch = if i + 1 == summary.processed.len() && summary.failed.is_empty() {
            "└─"
        } else {
            "├─"
        };
        let degraded = if report.degraded > 0 {
            format!(" ({} line(s) scored without the model)", report.degraded)
                .yellow()
                .to_string()
        } else {
            String::new()
        };
        println!(
            "  {} {} → {}{}",
            branch.dimmed(),
            file_name(&report.input),
            file_name(&report.output),
            degraded
        );
    }

    for (i, failure) in summary.failed.iter().enumerate() {
        let branch = if i + 1 == summary.failed.len() { "└─" } else { "├─" };
        println!(
            "  {} {} {}",
            branch.dimmed(),
            file_name(&failure.input).red(),
            failure.error.to_string().dimmed()
        );
    }

    if summary.total() == 0 {
        println!("{}", "No PDF files found".yellow());
    }
}

fn cmd_file(
    input: &Path,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = settings.outline_config()?;
    let scorer = settings.scorer(&config);

    let mut extractor = OutlineExtractor::new(config);
    if let Some(scorer) = scorer.as_deref() {
        extractor = extractor.with_scorer(scorer);
    }

    let extraction = extractor.extract_file(input)?;
    let json = render_outline(&extraction.outline, &extractor.config().output)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_inspect(input: &Path, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let config = settings.outline_config()?;
    let scorer = settings.scorer(&config);

    let mut extractor = OutlineExtractor::new(config);
    if let Some(scorer) = scorer.as_deref() {
        extractor = extractor.with_scorer(scorer);
    }

    let document = PdfDocument::open(input)?;
    let extraction = extractor.extract_document(&document);
    let stats = &extraction.classification.stats;

    println!("{}", "Document".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), document.version());
    println!("{}: {}", "Pages".bold(), extraction.page_count);
    if extraction.failed_pages > 0 {
        println!("{}: {}", "Unreadable pages".bold(), extraction.failed_pages);
    }
    println!("{}: {:.1}pt", "Body size".bold(), stats.body_size);
    let sizes: Vec<String> = stats
        .heading_sizes
        .iter()
        .map(|s| format!("{:.1}", s))
        .collect();
    println!("{}: [{}]", "Heading sizes".bold(), sizes.join(", "));
    if let Some(title) = pdf_outline::outline::detect_title(
        extraction.classification.candidates.iter().map(|c| &c.line),
        extractor.config().output.title_scan_lines,
    ) {
        println!("{}: {}", "Title".bold(), title);
    }

    println!();
    println!("{}", "Lines".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for candidate in &extraction.classification.candidates {
        let line = &candidate.line;
        let level = match candidate.assigned_level {
            Some(level) => level.to_string().green().bold().to_string(),
            None => "--".dimmed().to_string(),
        };
        let evidence = match candidate.evidence {
            Evidence::FontRank { rank } => format!("rank {}", rank),
            Evidence::StyleOverride => "style".to_string(),
            Evidence::Semantic { similarity } => format!("semantic {:.2}", similarity),
            Evidence::Rejected => String::new(),
        };
        println!(
            "p{:<3} {:>5.1}pt {} {:<3} {:.2} {:<14} {}",
            line.page_index + 1,
            line.font_size,
            if line.is_bold { "B" } else { " " },
            level,
            candidate.score,
            evidence.dimmed(),
            line.text
        );
    }

    if extraction.classification.degraded > 0 {
        println!();
        println!(
            "{} {} ambiguous line(s) could not be scored",
            "Warning:".yellow().bold(),
            extraction.classification.degraded
        );
    }

    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn cmd_version() {
    println!("{} {}", "pdf-outline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Offline PDF heading outline extractor");
    println!();
    println!(
        "Semantic scoring: {}",
        if cfg!(feature = "embeddings") {
            "available".green()
        } else {
            "not built".yellow()
        }
    );
    println!("License: MIT");
}
