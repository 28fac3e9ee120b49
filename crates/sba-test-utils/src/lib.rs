//! Testing utilities for the analysis pipeline workspace
//!
//! Shared fixtures, spies and fakes.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use sba_narrative::{GenerationParams, ModelClient, ModelError};
use sba_process::{ExitInfo, ProcessError, StatisticalRunner};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

pub const SALES_CSV: &str = "Product,Quantity,MarketShare,GrowthRate\n\
Tea,120,8.5,12.0\n\
Coffee,300,15.2,3.1\n\
Honey,40,2.3,18.4\n\
Candles,25,1.1,-2.0\n";

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn write_sales_csv(dir: &Path) -> PathBuf {
    write_file(dir, "sales.csv", SALES_CSV)
}

/// CSV with a header and `rows` numbered data rows
pub fn write_numbered_csv(dir: &Path, rows: usize) -> PathBuf {
    let mut text = String::from("Product,Quantity\n");
    for i in 0..rows {
        text.push_str(&format!("item-{i},{i}\n"));
    }
    write_file(dir, "numbered.csv", &text)
}

pub fn valid_summary() -> Value {
    json!({
        "thresholds": {"market_share": 5.0, "growth_rate": 5.0},
        "counts": {"star": 1, "cash_cow": 1, "question_mark": 1, "dog": 1, "total": 4},
        "top_products": [{"name": "Tea", "category": "Star"}],
    })
}

fn summary_path(image: &Path) -> PathBuf {
    let stem = image.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
    image.with_file_name(format!("{stem}_summary.json"))
}

/// One observed analyzer invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerCall {
    pub dataset: PathBuf,
    pub output: PathBuf,
    pub timeout: Duration,
}

enum Behavior {
    Delegate(Arc<dyn StatisticalRunner>),
    Write { image: Option<Vec<u8>>, summary: Option<Value> },
    Fail(Box<dyn Fn() -> ProcessError + Send + Sync>),
}

/// Analyzer spy
///
/// Records every call, then either delegates, writes canned artifacts, or
/// fails.
pub struct RecordingRunner {
    behavior: Behavior,
    calls: Mutex<Vec<RunnerCall>>,
}

impl RecordingRunner {
    pub fn delegating(inner: Arc<dyn StatisticalRunner>) -> Self {
        Self::with_behavior(Behavior::Delegate(inner))
    }

    /// Writes a PNG and `summary` where the real analyzer would
    pub fn writing(summary: Value) -> Self {
        Self::with_behavior(Behavior::Write {
            image: Some(PNG_MAGIC.to_vec()),
            summary: Some(summary),
        })
    }

    /// Exits cleanly without writing anything
    pub fn writing_nothing() -> Self {
        Self::with_behavior(Behavior::Write {
            image: None,
            summary: None,
        })
    }

    pub fn failing(make_error: impl Fn() -> ProcessError + Send + Sync + 'static) -> Self {
        Self::with_behavior(Behavior::Fail(Box::new(make_error)))
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RunnerCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl StatisticalRunner for RecordingRunner {
    async fn run(&self, dataset: &Path, output: &Path, timeout: Duration) -> Result<ExitInfo, ProcessError> {
        self.calls.lock().push(RunnerCall {
            dataset: dataset.to_path_buf(),
            output: output.to_path_buf(),
            timeout,
        });

        match &self.behavior {
            Behavior::Delegate(inner) => inner.run(dataset, output, timeout).await,
            Behavior::Write { image, summary } => {
                if let Some(bytes) = image {
                    tokio::fs::write(output, bytes).await.unwrap();
                }
                if let Some(summary) = summary {
                    tokio::fs::write(summary_path(output), summary.to_string())
                        .await
                        .unwrap();
                }
                Ok(ExitInfo {
                    exit_code: 0,
                    started_at: chrono::Utc::now(),
                    elapsed: Duration::from_millis(1),
                    stdout_len: 0,
                    stderr_len: 0,
                })
            }
            Behavior::Fail(make_error) => Err(make_error()),
        }
    }
}

/// Model fake with a call counter and prompt log
///
/// Replies are served in order; the last one repeats.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, fn() -> ModelError>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self::scripted(vec![Ok(reply.into())])
    }

    pub fn failing(make_error: fn() -> ModelError) -> Self {
        Self::scripted(vec![Err(make_error)])
    }

    pub fn scripted(replies: Vec<Result<String, fn() -> ModelError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn complete(&self, prompt: &str, _params: &GenerationParams) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());

        let mut replies = self.replies.lock();
        let next = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        };
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(make_error)) => Err(make_error()),
            None => Err(ModelError::EmptyResponse),
        }
    }
}

/// Shell analyzers standing in for the real statistical script
///
/// All are POSIX `sh` scripts taking `<dataset> <image>`.
#[derive(Debug, Clone)]
pub enum FakeAnalyzer {
    /// Writes a PNG and a summary whose `total` is the dataset row count
    Success,
    /// Exits 0 without writing anything
    ExitWithoutFiles,
    /// Writes a PNG and a summary lacking `counts`
    SummaryMissingCounts,
    /// Sleeps (via `exec`, so the kill reaches the sleeper) then succeeds
    Sleep { secs: u32 },
    /// Prints to stderr and exits non-zero
    Fail { stderr: String, code: i32 },
}

impl FakeAnalyzer {
    pub fn script(&self) -> String {
        let body = match self {
            Self::Success => r#"rows=$(( $(wc -l < "$1") - 1 ))
printf '\211PNG\r\n\032\n' > "$2"
summary="${2%.png}_summary.json"
printf '{"thresholds":{"market_share":5.0,"growth_rate":5.0},"counts":{"star":1,"cash_cow":0,"question_mark":0,"dog":0,"total":%d},"top_products":[]}' "$rows" > "$summary"
echo "Summary data saved to: $summary""#
                .to_string(),
            Self::ExitWithoutFiles => "echo 'Analysis complete.'\nexit 0".to_string(),
            Self::SummaryMissingCounts => r#"printf '\211PNG\r\n\032\n' > "$2"
printf '{"thresholds":{"market_share":5.0}}' > "${2%.png}_summary.json""#
                .to_string(),
            Self::Sleep { secs } => format!("exec sleep {secs}"),
            Self::Fail { stderr, code } => {
                format!("cat >&2 <<'EOF'\n{stderr}\nEOF\nexit {code}")
            }
        };
        format!("#!/bin/sh\n{body}\n")
    }

    /// Write the script into `dir` and return its path
    pub fn install(&self, dir: &Path) -> PathBuf {
        let path = dir.join("fake_analyzer.sh");
        std::fs::write(&path, self.script()).unwrap();
        path
    }
}
