use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use sba_core::{
    AnalysisEnvelope, AnalysisKind, AnalysisPipeline, AnalysisRequest, AnalyzerRoute, PipelineConfig,
    PipelineError,
};
use sba_dataset::{DatasetHandle, DatasetValidator};
use serde_json::json;

use crate::cli::{AnalyzeArgs, ValidateArgs};

pub(crate) async fn analyze(args: AnalyzeArgs) -> Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    config.apply_env().context("invalid environment override")?;
    if let Some(dir) = args.output_dir {
        config.analyzer.output_dir = dir;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.analyzer.timeout_ms = timeout_ms;
    }

    let handle = DatasetHandle::new(&args.dataset).with_delimiter(delimiter_byte(args.delimiter)?);
    let mut request = AnalysisRequest::new(handle, args.kind);
    if let Some(route) = args.route {
        request = request.with_route(route.into());
    }

    let pipeline = AnalysisPipeline::from_config(&config);
    let envelope = pipeline.analyze(&request).await;
    print_json(&envelope.to_json())?;
    Ok(exit_code(envelope.is_ok()))
}

pub(crate) async fn validate(args: ValidateArgs) -> Result<ExitCode> {
    let handle = DatasetHandle::new(&args.dataset).with_delimiter(delimiter_byte(args.delimiter)?);
    let validator = DatasetValidator::new(args.probe_bytes);

    match validator.validate(&handle).await {
        Ok(validated) => {
            print_json(&json!({
                "ok": true,
                "path": validated.path(),
                "size": validated.size(),
            }))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let envelope = AnalysisEnvelope::from(&PipelineError::from(err));
            print_json(&envelope.to_json())?;
            Ok(ExitCode::FAILURE)
        }
    }
}

pub(crate) fn kinds() -> Result<ExitCode> {
    let kinds: Vec<_> = AnalysisKind::all()
        .into_iter()
        .map(|kind| {
            json!({
                "kind": kind,
                "defaultRoute": AnalyzerRoute::default_for(kind),
            })
        })
        .collect();
    print_json(&json!(kinds))?;
    Ok(ExitCode::SUCCESS)
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character, got {delimiter:?}");
    }
    Ok(u8::try_from(delimiter).context("delimiter out of range")?)
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to render JSON")?;
    println!("{text}");
    Ok(())
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiters_must_be_ascii() {
        assert_eq!(delimiter_byte(';').unwrap(), b';');
        assert_eq!(delimiter_byte('\t').unwrap(), b'\t');
        assert!(delimiter_byte('é').is_err());
    }
}
