use anyhow::{Context, bail};
use envconfig::Envconfig;
use wa_lead_tracker::config::AppConfig;

/// Loads the service configuration and checks the storage variables the
/// commands need.
pub fn load_storage_config() -> anyhow::Result<AppConfig> {
    let app_config = AppConfig::init_from_env().context("invalid environment configuration")?;

    let missing_vars = app_config.missing_storage_vars();
    if !missing_vars.is_empty() {
        bail!("missing environment variables: {}", missing_vars.join(", "));
    }

    Ok(app_config)
}
