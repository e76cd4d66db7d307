use anyhow::{Context, Result};
use clap::Parser;
use std::{env, str::FromStr, time::Duration};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ARTIFACT_TTL_SECS: u64 = 600;
const DEFAULT_MAX_UPLOAD_MB: usize = 100;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// How long generated artifacts stay downloadable.
    pub artifact_ttl: Duration,
    /// Upper bound on a whole request body, multipart framing included.
    pub max_upload_bytes: usize,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "PDF utility HTTP service")]
pub struct Args {
    /// Host to bind to (overrides PDF_UTILITY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PDF_UTILITY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Seconds a split output or page image stays downloadable (overrides PDF_UTILITY_ARTIFACT_TTL_SECS)
    #[arg(long)]
    pub artifact_ttl_secs: Option<u64>,

    /// Maximum request body size in MiB (overrides PDF_UTILITY_MAX_UPLOAD_MB)
    #[arg(long)]
    pub max_upload_mb: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            artifact_ttl: Duration::from_secs(DEFAULT_ARTIFACT_TTL_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::merge(Args::parse(), |key| env::var(key))
    }

    /// Merge parsed CLI args over values read through `lookup`. CLI wins.
    fn merge<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        // --- Environment fallback ---
        let env_host = lookup("PDF_UTILITY_HOST").unwrap_or_else(|_| DEFAULT_HOST.into());
        let env_port = env_number("PDF_UTILITY_PORT", lookup("PDF_UTILITY_PORT"), DEFAULT_PORT)?;
        let env_ttl = env_number(
            "PDF_UTILITY_ARTIFACT_TTL_SECS",
            lookup("PDF_UTILITY_ARTIFACT_TTL_SECS"),
            DEFAULT_ARTIFACT_TTL_SECS,
        )?;
        let env_upload = env_number(
            "PDF_UTILITY_MAX_UPLOAD_MB",
            lookup("PDF_UTILITY_MAX_UPLOAD_MB"),
            DEFAULT_MAX_UPLOAD_MB,
        )?;

        // --- Merge ---
        let upload_mb = args.max_upload_mb.unwrap_or(env_upload);
        let max_upload_bytes = upload_mb
            .checked_mul(1024 * 1024)
            .with_context(|| format!("max upload size of {upload_mb} MiB overflows"))?;

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            artifact_ttl: Duration::from_secs(args.artifact_ttl_secs.unwrap_or(env_ttl)),
            max_upload_bytes,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_number<T>(key: &str, value: Result<String, env::VarError>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("parsing {key} value `{raw}`")),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {key}")),
    }
}
