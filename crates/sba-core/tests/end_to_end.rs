//! Full pipeline against shell analyzers run by the real orchestrator
#![cfg(unix)]

use pretty_assertions::assert_eq;
use sba_core::{AnalysisPipeline, AnalysisRequest, ErrorKind, PipelineConfig};
use sba_dataset::DatasetHandle;
use sba_test_utils::{write_sales_csv, FakeAnalyzer};
use serde_json::json;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn pipeline(dir: &Path, analyzer: &FakeAnalyzer, timeout_ms: u64) -> AnalysisPipeline {
    let script = analyzer.install(dir);
    let config = PipelineConfig::default()
        .with_analyzer("sh", script)
        .with_output_dir(dir.join("output"))
        .with_timeout_ms(timeout_ms);
    AnalysisPipeline::from_config(&config)
}

fn matrix_request(path: &Path) -> AnalysisRequest {
    AnalysisRequest::new(DatasetHandle::new(path), "positioning_matrix")
}

#[tokio::test]
async fn matrix_round_trip() {
    let dir = TempDir::new().unwrap();
    let csv = write_sales_csv(dir.path());
    let pipeline = pipeline(dir.path(), &FakeAnalyzer::Success, 10_000);

    let value = pipeline.analyze(&matrix_request(&csv)).await.to_json();

    assert_eq!(value["ok"], json!(true));
    assert_eq!(value["payload"]["summary"]["counts"]["total"], json!(4));
    assert!(value["payload"]["image"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn repeated_runs_agree() {
    let dir = TempDir::new().unwrap();
    let csv = write_sales_csv(dir.path());
    let pipeline = pipeline(dir.path(), &FakeAnalyzer::Success, 10_000);
    let req = matrix_request(&csv);

    let first = pipeline.analyze(&req).await.to_json();
    let second = pipeline.analyze(&req).await.to_json();

    assert_eq!(first["payload"]["summary"]["counts"], second["payload"]["summary"]["counts"]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn slow_analyzer_times_out_promptly() {
    let dir = TempDir::new().unwrap();
    let csv = write_sales_csv(dir.path());
    let pipeline = pipeline(dir.path(), &FakeAnalyzer::Sleep { secs: 5 }, 300);

    let started = Instant::now();
    let envelope = pipeline.analyze(&matrix_request(&csv)).await;

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(envelope.error_kind(), Some(ErrorKind::Timeout));
    assert_eq!(
        envelope.message(),
        Some("Analysis timed out. The file may be too large or complex to process.")
    );
}

#[tokio::test]
async fn silent_analyzer_is_artifact_missing() {
    let dir = TempDir::new().unwrap();
    let csv = write_sales_csv(dir.path());
    let pipeline = pipeline(dir.path(), &FakeAnalyzer::ExitWithoutFiles, 10_000);

    let envelope = pipeline.analyze(&matrix_request(&csv)).await;

    assert_eq!(envelope.error_kind(), Some(ErrorKind::ArtifactMissing));
}

#[tokio::test]
async fn incomplete_summary_is_artifact_invalid() {
    let dir = TempDir::new().unwrap();
    let csv = write_sales_csv(dir.path());
    let pipeline = pipeline(dir.path(), &FakeAnalyzer::SummaryMissingCounts, 10_000);

    let envelope = pipeline.analyze(&matrix_request(&csv)).await;

    assert_eq!(envelope.error_kind(), Some(ErrorKind::ArtifactInvalid));
}

#[tokio::test]
async fn tokenizer_failure_is_explained() {
    let dir = TempDir::new().unwrap();
    let csv = write_sales_csv(dir.path());
    let analyzer = FakeAnalyzer::Fail {
        stderr: "pandas.errors.ParserError: Error tokenizing data. C error: Expected 4 fields in line 3, saw 5"
            .into(),
        code: 1,
    };
    let pipeline = pipeline(dir.path(), &analyzer, 10_000);

    let value = pipeline.analyze(&matrix_request(&csv)).await.to_json();

    assert_eq!(value["errorKind"], json!("NonZeroExit"));
    assert_eq!(value["detail"], json!("malformedTabularData"));
    assert!(value["message"].as_str().unwrap().starts_with("CSV parsing error:"));
}

#[tokio::test]
async fn missing_script_is_start_failure() {
    let dir = TempDir::new().unwrap();
    let csv = write_sales_csv(dir.path());
    let config = PipelineConfig::default()
        .with_analyzer("sh", dir.path().join("absent.sh"))
        .with_output_dir(dir.path().join("output"));
    let pipeline = AnalysisPipeline::from_config(&config);

    let envelope = pipeline.analyze(&matrix_request(&csv)).await;

    assert_eq!(envelope.error_kind(), Some(ErrorKind::ProcessStartFailure));
}
