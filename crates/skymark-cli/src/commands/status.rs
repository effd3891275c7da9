//! Status command implementation.

use crate::error::Result;
use crate::output::Formatter;
use skymark_extractor::ExtractorConfig;

/// Execute the status command.
pub async fn execute_status(config: &ExtractorConfig, formatter: &Formatter) -> Result<()> {
    let status = config.status();
    println!("{}", formatter.format_status(&status)?);

    if let Err(e) = config.validate() {
        eprintln!("{}", formatter.error(&e));
    } else if !status.selected_configured() {
        eprintln!(
            "{}",
            formatter.warning(&format!("{} provider has no credentials", status.provider))
        );
    }

    Ok(())
}
