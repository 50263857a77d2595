use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use anyhow::{Result, Context};
use tracing::{info, warn};

pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];
pub const DEFAULT_AWS_REGION: &str = "ap-south-1";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

const BYTES_PER_MB: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub max_file_size_mb: usize,
    pub upload_dir: PathBuf,
    pub allowed_extensions: HashSet<String>,
    pub aws_region: String,
    pub textract_endpoint: Option<String>,
    /// When set, analysis responses are served from this Textract JSON file
    /// instead of calling the remote service.
    pub textract_fixture: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            max_file_size_mb: 10,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            allowed_extensions: parse_extensions(&DEFAULT_ALLOWED_EXTENSIONS.join(",")),
            aws_region: DEFAULT_AWS_REGION.to_string(),
            textract_endpoint: None,
            textract_fixture: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let defaults = Config::default();

        let config = Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| {
                info!("SERVER_HOST not set, using default: {}", defaults.server_host);
                defaults.server_host.clone()
            }),
            server_port: Self::parse_env_var("SERVER_PORT", defaults.server_port)
                .context("Failed to parse SERVER_PORT")?,
            max_file_size_mb: Self::parse_env_var("MAX_FILE_SIZE_MB", defaults.max_file_size_mb)
                .context("Failed to parse MAX_FILE_SIZE_MB")?,
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    info!("UPLOAD_DIR not set, using default: {}", DEFAULT_UPLOAD_DIR);
                    defaults.upload_dir.clone()
                }),
            allowed_extensions: env::var("ALLOWED_EXTENSIONS")
                .map(|raw| parse_extensions(&raw))
                .unwrap_or_else(|_| defaults.allowed_extensions.clone()),
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| {
                info!("AWS_REGION not set, using default: {}", DEFAULT_AWS_REGION);
                defaults.aws_region.clone()
            }),
            textract_endpoint: non_empty_var("TEXTRACT_ENDPOINT"),
            textract_fixture: non_empty_var("TEXTRACT_FIXTURE").map(PathBuf::from),
        };

        config.validate()?;

        info!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    fn parse_env_var<T>(var_name: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(val) => match val.parse() {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                    Ok(default)
                }
            },
            Err(_) => {
                info!("{} not set, using default: {:?}", var_name, default);
                Ok(default)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if self.max_file_size_mb.checked_mul(BYTES_PER_MB).is_none() {
            return Err(anyhow::anyhow!(
                "MAX_FILE_SIZE_MB {} overflows the request body limit",
                self.max_file_size_mb
            ));
        }
        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS must list at least one extension"));
        }
        if self.aws_region.trim().is_empty() {
            return Err(anyhow::anyhow!("AWS_REGION must not be empty"));
        }
        Ok(())
    }

    /// Request body limit in bytes. Saturates for sizes `validate` rejects.
    pub fn max_body_bytes(&self) -> usize {
        self.max_file_size_mb.saturating_mul(BYTES_PER_MB)
    }
}

/// Splits a comma separated extension list, lower-casing entries and
/// dropping any leading dot.
pub fn parse_extensions(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
