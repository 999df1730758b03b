//! Batch processing of an input directory.
//!
//! Every `*.pdf` file in the input directory gets a `<stem>.json` outline in
//! the output directory. A file that cannot be processed is logged and
//! recorded in the [`RunSummary`]; only problems with the directories
//! themselves (or an invalid configuration) abort the run.

use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crate::classify::SimilarityScorer;
use crate::config::OutlineConfig;
use crate::detect::has_pdf_extension;
use crate::error::{Error, Result};
use crate::render::render_outline;
use crate::OutlineExtractor;

/// Progress notifications emitted by [`Runner::run_with_progress`].
#[derive(Debug)]
pub enum RunEvent<'a> {
    /// Input enumerated; `total` files will be processed.
    Started { total: usize },
    /// A file was processed and its outline written.
    Finished { path: &'a Path, headings: usize },
    /// A file was skipped.
    Failed { path: &'a Path, error: &'a Error },
}

/// Outcome of one successfully processed file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub headings: usize,
    pub pages: usize,
    /// Ambiguous lines whose semantic scoring failed
    pub degraded: usize,
}

/// A file that could not be processed.
#[derive(Debug)]
pub struct FileFailure {
    pub input: PathBuf,
    pub error: Error,
}

/// Result of a batch run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub processed: Vec<FileReport>,
    pub failed: Vec<FileFailure>,
}

impl RunSummary {
    /// Number of files attempted.
    pub fn total(&self) -> usize {
        self.processed.len() + self.failed.len()
    }

    /// Whether every file was processed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total headings written.
    pub fn headings(&self) -> usize {
        self.processed.iter().map(|r| r.headings).sum()
    }
}

/// Processes a directory of PDFs, one file at a time.
pub struct Runner<'a> {
    extractor: OutlineExtractor<'a>,
}

impl<'a> Runner<'a> {
    /// Create a runner without semantic scoring.
    pub fn new(config: OutlineConfig) -> Self {
        Self {
            extractor: OutlineExtractor::new(config),
        }
    }

    /// Settle ambiguous lines with `scorer`.
    pub fn with_scorer(mut self, scorer: &'a dyn SimilarityScorer) -> Self {
        self.extractor = self.extractor.with_scorer(scorer);
        self
    }

    pub fn config(&self) -> &OutlineConfig {
        self.extractor.config()
    }

    /// Process every PDF in `input_dir`, writing outlines to `output_dir`.
    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<RunSummary> {
        self.run_with_progress(input_dir, output_dir, |_| {})
    }

    /// Like [`run`](Self::run), reporting progress to `on_event`.
    pub fn run_with_progress<F>(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        mut on_event: F,
    ) -> Result<RunSummary>
    where
        F: FnMut(RunEvent<'_>),
    {
        self.config().validate()?;
        let inputs = list_pdfs(input_dir)?;
        fs::create_dir_all(output_dir).map_err(|source| Error::OutputDirectory {
            path: output_dir.to_path_buf(),
            source,
        })?;

        log::info!(
            "Processing {} PDF file(s) from {}",
            inputs.len(),
            input_dir.display()
        );
        on_event(RunEvent::Started {
            total: inputs.len(),
        });

        let mut summary = RunSummary::default();
        for input in inputs {
            // A panic in the parser on one malformed file must not end the run.
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.process_file(&input, output_dir)
            }))
            .unwrap_or_else(|payload| Err(Error::Unexpected(panic_message(payload.as_ref()))));

            match outcome {
                Ok(report) => {
                    log::info!(
                        "{}: {} heading(s) on {} page(s)",
                        input.display(),
                        report.headings,
                        report.pages
                    );
                    on_event(RunEvent::Finished {
                        path: &input,
                        headings: report.headings,
                    });
                    summary.processed.push(report);
                }
                Err(error) => {
                    log::error!("Skipping {}: {}", input.display(), error);
                    on_event(RunEvent::Failed {
                        path: &input,
                        error: &error,
                    });
                    summary.failed.push(FileFailure { input, error });
                }
            }
        }

        Ok(summary)
    }

    /// Extract one file and write its outline into `output_dir`.
    pub fn process_file(&self, input: &Path, output_dir: &Path) -> Result<FileReport> {
        let extraction = self.extractor.extract_file(input)?;
        let json = render_outline(&extraction.outline, &self.config().output)?;

        let output = output_path_for(input, output_dir);
        fs::write(&output, json).map_err(|source| Error::Write {
            path: output.clone(),
            source,
        })?;

        Ok(FileReport {
            input: input.to_path_buf(),
            output,
            headings: extraction.outline.len(),
            pages: extraction.page_count,
            degraded: extraction.classification.degraded,
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic while processing file".to_string()
    }
}

/// Regular files with a `.pdf` extension in `dir`, sorted by file name.
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let input_error = |source| Error::InputDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(input_error)? {
        let path = entry.map_err(input_error)?.path();
        if path.is_file() && has_pdf_extension(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// `<output_dir>/<stem>.json` for an input file. Only the final extension
/// is replaced, so dots inside the stem survive.
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let mut name = input
        .file_stem()
        .unwrap_or(input.as_os_str())
        .to_os_string();
    name.push(".json");
    output_dir.join(name)
}
