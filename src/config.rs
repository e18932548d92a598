use crate::store::LogFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub docs: DocsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Prefix every route is mounted under, empty for the root
    #[serde(default)]
    pub context_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptureConfig {
    #[serde(default = "default_log_directory")]
    pub log_directory: String,
    /// "json" or "txt"
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// true: one latest file per endpoint; false: append unique files
    #[serde(default = "default_replace_latest")]
    pub replace_latest: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocsConfig {
    #[serde(default = "default_doc_directory")]
    pub doc_directory: String,
    #[serde(default = "default_application_name")]
    pub application_name: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_api_description")]
    pub api_description: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_directory() -> String {
    "api-logs".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_replace_latest() -> bool {
    true
}

fn default_doc_directory() -> String {
    "api-docs".to_string()
}

fn default_application_name() -> String {
    "apiscribe".to_string()
}

fn default_api_version() -> String {
    "1.0.0".to_string()
}

fn default_api_description() -> String {
    "API Documentation".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            context_path: String::new(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            log_directory: default_log_directory(),
            log_format: default_log_format(),
            replace_latest: default_replace_latest(),
        }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            doc_directory: default_doc_directory(),
            application_name: default_application_name(),
            api_version: default_api_version(),
            api_description: default_api_description(),
        }
    }
}

impl CaptureConfig {
    pub fn format(&self) -> anyhow::Result<LogFormat> {
        LogFormat::parse(&self.log_format).ok_or_else(|| {
            anyhow::anyhow!(
                "capture.log_format must be \"json\" or \"txt\", got \"{}\"",
                self.log_format
            )
        })
    }
}

/// Loads configuration from an optional file plus `APISCRIBE`-prefixed
/// environment variables. A missing file falls back to defaults.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<AppConfig> {
    let config = config::Config::builder()
        .add_source(
            config::File::from(path.to_path_buf()).required(false),
        )
        .add_source(config::Environment::with_prefix("APISCRIBE").separator("__"))
        .build()?;

    let cfg: AppConfig = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

fn validate_config(cfg: &AppConfig) -> anyhow::Result<()> {
    cfg.capture.format()?;

    if !cfg.server.context_path.is_empty() && !cfg.server.context_path.starts_with('/') {
        anyhow::bail!(
            "server.context_path must start with '/', got \"{}\"",
            cfg.server.context_path
        );
    }
    if cfg.server.context_path.ends_with('/') {
        anyhow::bail!("server.context_path must not end with '/'");
    }

    if cfg.capture.log_directory.is_empty() {
        anyhow::bail!("capture.log_directory cannot be empty");
    }
    if cfg.docs.doc_directory.is_empty() {
        anyhow::bail!("docs.doc_directory cannot be empty");
    }

    Ok(())
}
