//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::Result;
use crate::output::{Formatter, ImageOutcome};
use skymark_extractor::{ExtractorConfig, Pipeline};
use std::path::PathBuf;
use tracing::warn;

/// Execute the extract command.
pub async fn execute_extract(
    args: ExtractArgs,
    mut config: ExtractorConfig,
    formatter: &Formatter,
) -> Result<()> {
    if let Some(provider) = args.provider {
        config.provider = provider.into();
    }

    let pipeline = Pipeline::from_config(&config)?;
    if !pipeline.is_enabled() {
        eprintln!(
            "{}",
            formatter.warning(&format!(
                "{} provider is not configured; results will be empty",
                pipeline.provider()
            ))
        );
    }

    let outcomes = run_extract(&pipeline, &args.paths).await;

    println!("{}", formatter.format_outcomes(&outcomes)?);
    eprintln!("{}", formatter.extract_summary(&outcomes));

    Ok(())
}

/// Process each image in order. A failed image is recorded and the run continues.
pub async fn run_extract(pipeline: &Pipeline, paths: &[PathBuf]) -> Vec<ImageOutcome> {
    let mut outcomes = Vec::with_capacity(paths.len());

    for path in paths {
        let outcome = match pipeline.process_image(path).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!("Extraction failed for {}: {}", path.display(), e);
                Err(e.to_string())
            }
        };
        outcomes.push(ImageOutcome {
            path: path.clone(),
            outcome,
        });
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ProviderArg;
    use crate::config::OutputFormat;
    use crate::error::CliError;

    #[tokio::test]
    async fn test_unconfigured_pipeline_yields_skipped_results() {
        let pipeline = Pipeline::from_config(&ExtractorConfig::default()).unwrap();
        let paths = vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")];

        let outcomes = run_extract(&pipeline, &paths).await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].path, PathBuf::from("b.jpg"));
        for outcome in &outcomes {
            let result = outcome.outcome.as_ref().unwrap();
            assert_eq!(result.time(), "");
            assert!(!result.is_standard());
        }
    }

    #[tokio::test]
    async fn test_missing_image_is_recorded_and_run_continues() {
        let pipeline = Pipeline::from_config(&ExtractorConfig::ocr("ak", "sk")).unwrap();
        let paths = vec![
            PathBuf::from("/no/such/dir/first.jpg"),
            PathBuf::from("/no/such/dir/second.jpg"),
        ];

        let outcomes = run_extract(&pipeline, &paths).await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.outcome.is_err()));
    }

    #[tokio::test]
    async fn test_invalid_config_fails_the_command() {
        let mut config = ExtractorConfig::vlm("sk-test");
        config.vlm.timeout_secs = 0;
        let args = ExtractArgs {
            paths: vec![PathBuf::from("a.jpg")],
            provider: Some(ProviderArg::Vlm),
        };
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        let result = execute_extract(args, config, &formatter).await;
        assert!(matches!(result, Err(CliError::Extractor(_))));
    }
}
