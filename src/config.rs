//! Application configuration.
//!
//! All values come from environment variables and are loaded once at startup
//! into an [AppConfig] that is handed to the components that need it.
//!
//! # Security Notes
//! - Sensitive fields are clearly marked and should never be logged
//! - Production environments should use secure secret management systems

use anyhow::Context;
use envconfig::Envconfig;

/// Application configuration loaded from the environment.
///
/// The backing-store fields are optional: a missing value is
/// reported at startup but does not stop the web server, requests touching
/// storage fail instead.
#[derive(Envconfig, Clone, Debug)]
pub struct AppConfig {
    /// Environment name to deploy the app (NON-SENSITIVE)
    /// Values: "local", "dev", "staging", "prod"
    #[envconfig(from = "ENV", default = "local")]
    pub env: String,

    /// Database host value (NON-SENSITIVE)
    /// Example: "sqlite:data/leads.db"
    #[envconfig(from = "DB_HOST")]
    pub db_host: Option<String>,

    /// 🔒 SENSITIVE: Database password to encrypt SQLite data
    #[envconfig(from = "DB_PASS_ENCRYPT")]
    pub db_pass_encrypt: Option<String>,

    /// Host address for web server binding (NON-SENSITIVE)
    #[envconfig(from = "WEB_SERVER_HOST", default = "0.0.0.0")]
    pub web_server_host: String,

    /// Port for web server binding (NON-SENSITIVE)
    #[envconfig(from = "WEB_SERVER_PORT", default = "3000")]
    pub web_server_port: u16,

    /// Path to SSL private key file (SENSITIVE PATH), used only in prod
    #[envconfig(from = "PRIVATE_KEY_PATH", default = "server.key")]
    pub private_key_path: String,

    /// Path to SSL certificate file (NON-SENSITIVE), used only in prod
    #[envconfig(from = "CERTIFICATE_PATH", default = "server.crt")]
    pub certificate_path: String,

    /// 🔒 SENSITIVE: Logfire write token. Telemetry is only exported when set.
    #[envconfig(from = "LOGFIRE_TOKEN")]
    pub logfire_token: Option<String>,

    /// 🔒 SENSITIVE: Shared token the provider sends in the `apikey` header
    /// or payload field. The webhook is open when unset.
    #[envconfig(from = "WEBHOOK_API_KEY")]
    pub webhook_api_key: Option<String>,

    /// 🔒 SENSITIVE: Key for the `/api` admin endpoints. They answer 401
    /// while unset.
    #[envconfig(from = "ADMIN_API_KEY")]
    pub admin_api_key: Option<String>,

    /// Answer 500 instead of 200 `{"success": false}` when webhook
    /// processing fails. Providers retry on 5xx.
    #[envconfig(from = "SURFACE_STORAGE_ERRORS", default = "false")]
    pub surface_storage_errors: bool,

    /// Base url of the click-to-chat links built by `/go/{instance}`
    #[envconfig(from = "WA_LINK_BASE", default = "https://wa.me")]
    pub wa_link_base: String,
}

impl AppConfig {
    /// Reads the configuration from the process environment
    pub fn load() -> anyhow::Result<Self> {
        Self::init_from_env().context("failed to load app config")
    }

    /// Checks if running in production environment
    pub fn is_prod(&self) -> bool {
        self.env.to_lowercase() == "prod"
    }

    /// Lists the backing-store variables required for the current
    /// environment that are not set.
    pub fn missing_storage_vars(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.db_host) {
            missing.push("DB_HOST");
        }
        if self.is_prod() && is_blank(&self.db_pass_encrypt) {
            missing.push("DB_PASS_ENCRYPT");
        }

        missing
    }

    /// Server bind address
    pub fn server_addr(&self) -> (String, u16) {
        (self.web_server_host.clone(), self.web_server_port)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or_default().is_empty()
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        env: "local".to_string(),
        db_host: Some("sqlite::memory:".to_string()),
        db_pass_encrypt: None,
        web_server_host: "127.0.0.1".to_string(),
        web_server_port: 3000,
        private_key_path: "server.key".to_string(),
        certificate_path: "server.crt".to_string(),
        logfire_token: None,
        webhook_api_key: None,
        admin_api_key: Some("admin-secret".to_string()),
        surface_storage_errors: false,
        wa_link_base: "https://wa.me".to_string(),
    }
}
