//! The `check-config` command.

use std::path::Path;

use amex_config::{ConfigLoader, ConfigValidator};

/// Load and validate the config file, listing every problem found.
///
/// Unlike the scraping commands, a missing file is an error here.
pub(crate) fn check(path: &Path) -> anyhow::Result<()> {
    let config = ConfigLoader::load(path)?;
    let result = ConfigValidator::validate(&config);

    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error:   {}: {}", error.path, error.message);
    }

    if !result.is_valid() {
        anyhow::bail!(
            "{} has {} error(s)",
            path.display(),
            result.errors.len()
        );
    }

    println!(
        "{} is valid (schema version {})",
        path.display(),
        config.schema_version
    );
    Ok(())
}
