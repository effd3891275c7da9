//! Normalize command implementation.

use crate::cli::NormalizeArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use skymark_extractor::normalize::{clean_location_text, normalize_time};

/// Execute the normalize command.
pub async fn execute_normalize(args: NormalizeArgs, formatter: &Formatter) -> Result<()> {
    let output = normalize_text(&args.text, args.location)?;
    println!("{}", formatter.format_normalized(&args.text, &output)?);
    Ok(())
}

/// Run the time normalizer, or the location cleaner when `location` is set.
pub fn normalize_text(text: &str, location: bool) -> Result<String> {
    if text.trim().is_empty() {
        return Err(CliError::InvalidInput("Text cannot be empty".to_string()));
    }

    Ok(if location {
        clean_location_text(text)
    } else {
        normalize_time(text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_time_text() {
        assert_eq!(normalize_text("20230720 094700", false).unwrap(), "2023-07-20 09:47:00");
        assert_eq!(normalize_text("2023年7月20日 9:47", false).unwrap(), "2023-07-20 09:47:00");
    }

    #[test]
    fn test_clean_location_text() {
        assert_eq!(normalize_text("  江苏省\t南京市  ", true).unwrap(), "江苏省 南京市");
    }

    #[test]
    fn test_blank_text_is_rejected() {
        assert!(matches!(normalize_text("   ", false), Err(CliError::InvalidInput(_))));
    }
}
