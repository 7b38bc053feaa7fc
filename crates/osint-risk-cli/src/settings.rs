use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use osint_risk_core::ScoringConfig;

/// Prefix for environment overrides, e.g. `OSINT_RISK_THRESHOLDS__EXCELLENT=95`.
pub const ENV_PREFIX: &str = "OSINT_RISK";

/// Load scoring configuration from an optional file plus environment overrides.
///
/// Missing keys fall back to the built-in weights and thresholds.
pub fn load_scoring_config(path: Option<&Path>) -> Result<ScoringConfig> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let settings = builder.build().with_context(|| match path {
        Some(path) => format!("failed to load configuration from {}", path.display()),
        None => "failed to load configuration from environment".to_string(),
    })?;
    let scoring: ScoringConfig = settings
        .try_deserialize()
        .context("invalid scoring configuration")?;
    scoring
        .validate()
        .context("invalid scoring thresholds")?;
    Ok(scoring)
}
