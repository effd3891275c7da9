//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use skymark_domain::ExtractionResult;
use skymark_extractor::ConfigStatus;
use std::path::PathBuf;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Outcome of processing one image.
#[derive(Debug, Clone)]
pub struct ImageOutcome {
    /// Image path as given on the command line
    pub path: PathBuf,
    /// Extraction result, or the error message for a failed image
    pub outcome: std::result::Result<ExtractionResult, String>,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format per-image extraction outcomes.
    pub fn format_outcomes(&self, outcomes: &[ImageOutcome]) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_outcomes_json(outcomes),
            OutputFormat::Table => Ok(self.format_outcomes_table(outcomes)),
            OutputFormat::Quiet => Ok(self.format_outcomes_quiet(outcomes)),
        }
    }

    fn format_outcomes_json(&self, outcomes: &[ImageOutcome]) -> Result<String> {
        let json: Vec<serde_json::Value> = outcomes
            .iter()
            .map(|o| match &o.outcome {
                Ok(result) => serde_json::json!({
                    "path": o.path.display().to_string(),
                    "time": result.time(),
                    "location": result.location(),
                    "is_standard": result.is_standard(),
                }),
                Err(error) => serde_json::json!({
                    "path": o.path.display().to_string(),
                    "time": "",
                    "location": "",
                    "is_standard": false,
                    "error": error,
                }),
            })
            .collect();

        Ok(serde_json::to_string_pretty(&json)?)
    }

    fn format_outcomes_table(&self, outcomes: &[ImageOutcome]) -> String {
        if outcomes.is_empty() {
            return self.colorize("No images processed.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Image", "Time", "Location", "Standard"]);

        for outcome in outcomes {
            let path = outcome.path.display().to_string();
            match &outcome.outcome {
                Ok(result) => {
                    let standard = if result.is_standard() {
                        self.colorize("yes", "green")
                    } else {
                        self.colorize("no", "yellow")
                    };
                    builder.push_record([
                        path.as_str(),
                        result.time(),
                        result.location(),
                        standard.as_str(),
                    ]);
                }
                Err(error) => {
                    let error = self.colorize(&format!("error: {}", error), "red");
                    builder.push_record([path.as_str(), "", error.as_str(), "no"]);
                }
            }
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    fn format_outcomes_quiet(&self, outcomes: &[ImageOutcome]) -> String {
        outcomes
            .iter()
            .map(|o| {
                let (time, location) = match &o.outcome {
                    Ok(result) => (result.time(), result.location()),
                    Err(_) => ("", ""),
                };
                format!("{}\t{}\t{}", o.path.display(), time, location)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format a normalization result.
    pub fn format_normalized(&self, input: &str, output: &str) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "input": input,
                "output": output,
            }))?),
            OutputFormat::Quiet => Ok(output.to_string()),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Input", "Normalized"]);
                builder.push_record([input, output]);
                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format the configuration summary.
    pub fn format_status(&self, status: &ConfigStatus) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(status)?),
            OutputFormat::Quiet => Ok(format!(
                "{}\t{}",
                status.provider,
                if status.selected_configured() { "configured" } else { "not_configured" }
            )),
            OutputFormat::Table => {
                let configured = |yes: bool| {
                    if yes {
                        self.colorize("configured", "green")
                    } else {
                        self.colorize("not configured", "yellow")
                    }
                };
                let selected = |provider: &str| {
                    if status.provider.to_string() == provider { "*" } else { "" }
                };

                let vlm_status = configured(status.vlm_configured);
                let ocr_status = configured(status.ocr_configured);

                let mut builder = Builder::default();
                builder.push_record(["", "Provider", "Status", "Endpoint"]);
                builder.push_record([
                    selected("vlm"),
                    "vlm",
                    vlm_status.as_str(),
                    status.vlm_model.as_str(),
                ]);
                builder.push_record([
                    selected("ocr"),
                    "ocr",
                    ocr_status.as_str(),
                    status.ocr_base_url.as_str(),
                ]);

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Summary line for an extract run.
    pub fn extract_summary(&self, outcomes: &[ImageOutcome]) -> String {
        let failed = outcomes.iter().filter(|o| o.outcome.is_err()).count();
        let standard = outcomes
            .iter()
            .filter(|o| matches!(&o.outcome, Ok(r) if r.is_standard()))
            .count();
        let message = format!(
            "Processed {} image(s): {} standard, {} failed",
            outcomes.len(),
            standard,
            failed
        );
        if failed > 0 {
            self.warning(&message)
        } else {
            self.success(&message)
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skymark_extractor::ExtractorConfig;

    fn outcomes() -> Vec<ImageOutcome> {
        vec![
            ImageOutcome {
                path: PathBuf::from("a.jpg"),
                outcome: Ok(ExtractionResult::new("2024-01-15 14:30:45", "北京市朝阳区监测站")),
            },
            ImageOutcome {
                path: PathBuf::from("b.jpg"),
                outcome: Err("HTTP 401: unauthorized".to_string()),
            },
        ]
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_outcomes(&outcomes()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["time"], "2024-01-15 14:30:45");
        assert_eq!(parsed[0]["is_standard"], true);
        assert!(parsed[0].get("error").is_none());
        assert_eq!(parsed[1]["is_standard"], false);
        assert_eq!(parsed[1]["error"], "HTTP 401: unauthorized");
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_outcomes(&outcomes()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "a.jpg\t2024-01-15 14:30:45\t北京市朝阳区监测站");
        assert_eq!(lines[1], "b.jpg\t\t");
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_outcomes(&outcomes()).unwrap();
        assert!(output.contains("Location"));
        assert!(output.contains("a.jpg"));
        assert!(output.contains("error: HTTP 401"));
    }

    #[test]
    fn test_empty_outcomes() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_outcomes(&[]).unwrap();
        assert!(output.contains("No images processed"));
    }

    #[test]
    fn test_normalized_formats() {
        let quiet = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(
            quiet.format_normalized("2023-7-20 9:47", "2023-07-20 09:47:00").unwrap(),
            "2023-07-20 09:47:00"
        );

        let json = Formatter::new(OutputFormat::Json, false);
        let output = json.format_normalized("a", "b").unwrap();
        assert!(output.contains("\"output\": \"b\""));
    }

    #[test]
    fn test_status_formats() {
        let status = ExtractorConfig::vlm("sk-test").status();

        let quiet = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(quiet.format_status(&status).unwrap(), "vlm\tconfigured");

        let table = Formatter::new(OutputFormat::Table, false);
        let output = table.format_status(&status).unwrap();
        assert!(output.contains("not configured"));
        assert!(output.contains("qwen3-vl-plus"));
    }

    #[test]
    fn test_summary() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(
            formatter.extract_summary(&outcomes()),
            "⚠ Processed 2 image(s): 1 standard, 1 failed"
        );
    }

    #[test]
    fn test_colorize_palette() {
        let formatter = Formatter::new(OutputFormat::Table, true);
        assert_eq!(formatter.colorize("x", "blue"), "x");
        assert_eq!(formatter.colorize("x", "green"), "x".green().to_string());
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.error("bad"), "✗ bad");
    }
}
