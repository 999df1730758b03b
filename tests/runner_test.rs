//! Directory runs over synthetic PDFs.

mod common;

use std::fs;

use pdf_outline::{Error, OutlineConfig, OutlineEntry, RunEvent, Runner};

fn read_entries(path: &std::path::Path) -> Vec<OutlineEntry> {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_corrupt_and_valid_files() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    common::introduction().save(&input.path().join("good.pdf"));
    fs::write(input.path().join("bad.pdf"), common::CORRUPT).unwrap();
    fs::write(input.path().join("readme.txt"), "not a pdf").unwrap();

    let summary = Runner::new(OutlineConfig::default())
        .run(input.path(), output.path())
        .unwrap();

    assert_eq!(summary.total(), 2);
    assert_eq!(summary.processed.len(), 1);
    assert_eq!(summary.failed.len(), 1);
    assert!(summary.failed[0].input.ends_with("bad.pdf"));
    assert!(summary.failed[0].error.is_document_error());

    assert!(output.path().join("good.json").exists());
    assert!(!output.path().join("bad.json").exists());
    assert!(!output.path().join("readme.json").exists());

    let entries = read_entries(&output.path().join("good.json"));
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "Introduction");
    assert_eq!(entries[0].page, 1);
}

#[test]
fn test_output_directory_is_created() {
    let input = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let output = root.path().join("nested").join("out");
    common::blank().save(&input.path().join("empty.pdf"));

    let summary = Runner::new(OutlineConfig::default())
        .run(input.path(), &output)
        .unwrap();

    assert!(summary.is_success());
    assert_eq!(fs::read_to_string(output.join("empty.json")).unwrap(), "[]");
}

#[test]
fn test_rerun_produces_identical_files() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    common::two_levels().save(&input.path().join("report.pdf"));

    let runner = Runner::new(OutlineConfig::default());
    runner.run(input.path(), output.path()).unwrap();
    let first = fs::read(output.path().join("report.json")).unwrap();
    runner.run(input.path(), output.path()).unwrap();
    let second = fs::read(output.path().join("report.json")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_progress_events_follow_file_order() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    common::two_levels().save(&input.path().join("b.pdf"));
    common::introduction().save(&input.path().join("a.pdf"));

    let mut events = Vec::new();
    Runner::new(OutlineConfig::default())
        .run_with_progress(input.path(), output.path(), |event| {
            events.push(match event {
                RunEvent::Started { total } => format!("start {total}"),
                RunEvent::Finished { path, headings } => format!(
                    "{} {headings}",
                    path.file_name().unwrap().to_string_lossy()
                ),
                RunEvent::Failed { path, .. } => {
                    format!("failed {}", path.display())
                }
            })
        })
        .unwrap();

    assert_eq!(events, vec!["start 2", "a.pdf 1", "b.pdf 4"]);
}

#[test]
fn test_semantic_scorer_settles_ambiguous_lines() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    ambiguous_plan().save(&input.path().join("plan.pdf"));

    let accept = |text: &str| -> pdf_outline::Result<f32> {
        Ok(if text.contains("Results") { 0.9 } else { 0.0 })
    };
    let summary = Runner::new(OutlineConfig::default())
        .with_scorer(&accept)
        .run(input.path(), output.path())
        .unwrap();
    assert_eq!(summary.processed[0].degraded, 0);

    let entries = read_entries(&output.path().join("plan.json"));
    let texts: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["Project Plan", "2. Results"]);

    let failing = |_: &str| -> pdf_outline::Result<f32> {
        Err(Error::Embedding("model unavailable".to_string()))
    };
    let summary = Runner::new(OutlineConfig::default())
        .with_scorer(&failing)
        .run(input.path(), output.path())
        .unwrap();
    assert_eq!(summary.processed[0].degraded, 1);
    assert_eq!(read_entries(&output.path().join("plan.json")).len(), 1);
}

/// Bold but not isolated, with a numbering prefix: only a semantic scorer
/// can promote "2. Results".
fn ambiguous_plan() -> common::PdfBuilder {
    common::PdfBuilder::new()
        .page()
        .text("Project Plan", 20.0, 740.0)
        .body(3, 700.0)
        .bold("2. Results", 10.0, 658.0)
        .body(3, 644.0)
}

#[test]
fn test_panicking_file_does_not_stop_the_run() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    ambiguous_plan().save(&input.path().join("a.pdf"));
    common::introduction().save(&input.path().join("b.pdf"));

    let exploding = |text: &str| -> pdf_outline::Result<f32> {
        panic!("scorer exploded on {text:?}")
    };
    let summary = Runner::new(OutlineConfig::default())
        .with_scorer(&exploding)
        .run(input.path(), output.path())
        .unwrap();

    assert_eq!(summary.failed.len(), 1);
    assert!(summary.failed[0].input.ends_with("a.pdf"));
    match &summary.failed[0].error {
        Error::Unexpected(msg) => assert!(msg.contains("scorer exploded")),
        other => panic!("expected an unexpected-failure error, got {other:?}"),
    }
    assert_eq!(summary.processed.len(), 1);
    assert!(output.path().join("b.json").exists());
    assert!(!output.path().join("a.json").exists());
}

#[test]
fn test_unwritable_output_is_skipped() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    common::introduction().save(&input.path().join("a.pdf"));
    common::two_levels().save(&input.path().join("b.pdf"));
    fs::create_dir(output.path().join("a.json")).unwrap();

    let summary = Runner::new(OutlineConfig::default())
        .run(input.path(), output.path())
        .unwrap();

    assert_eq!(summary.failed.len(), 1);
    assert!(matches!(summary.failed[0].error, Error::Write { .. }));
    assert!(!summary.failed[0].error.is_fatal());
    assert_eq!(summary.processed.len(), 1);
    assert_eq!(read_entries(&output.path().join("b.json")).len(), 4);
}

#[test]
fn test_dotted_file_names_keep_their_stem() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    common::introduction().save(&input.path().join("report.v1.pdf"));
    common::two_levels().save(&input.path().join("report.v2.PDF"));

    let summary = Runner::new(OutlineConfig::default())
        .run(input.path(), output.path())
        .unwrap();

    assert!(summary.is_success());
    assert_eq!(read_entries(&output.path().join("report.v1.json")).len(), 1);
    assert_eq!(read_entries(&output.path().join("report.v2.json")).len(), 4);
    assert!(!output.path().join("report.json").exists());
}
