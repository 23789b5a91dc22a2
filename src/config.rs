//! Configuration loader for the `codemetal-ecflow` backend service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::{env, path::PathBuf};

use anyhow::{anyhow, Result};

use crate::{
    manifest::{
        parse_school_targets, Manifest, DEFAULT_ENV_SUFFIX, DEFAULT_GROWTH_WORKBOOK,
        DEFAULT_SCHOOLS,
    },
    treatment::EcSource,
};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u16 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u16>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Read an optional string environment variable with a default value.
macro_rules! env_or {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| $default.to_string())
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Directory holding the environment CSVs and the growth workbook.
    pub data_dir: PathBuf,

    /// Expected schools, file suffix and workbook name.
    pub manifest: Manifest,

    /// Strategy for assigning EC levels to growth records.
    pub ec_source: EcSource,

    /// HTTP listen port.
    pub port: u16,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `DATA_DIR` – data directory (default: `data`)
/// - `ENV_FILE_SUFFIX` – environment file stem suffix (default: `_환경데이터`)
/// - `GROWTH_WORKBOOK` – growth workbook file name (default: `4개교_생육결과데이터.xlsx`)
/// - `EC_SOURCE` – `target` or `measured` (default: `target`)
/// - `SCHOOL_EC_TARGETS` – `name=ec,...` (default: the four participating schools)
/// - `PORT` – HTTP port (default: 8080)
///
/// Returns an error if any variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let data_dir = PathBuf::from(env_or!("DATA_DIR", "data"));
    let env_suffix = env_or!("ENV_FILE_SUFFIX", DEFAULT_ENV_SUFFIX);
    let growth_workbook = env_or!("GROWTH_WORKBOOK", DEFAULT_GROWTH_WORKBOOK);
    let port = parse_env_u16!("PORT", 8080);

    let ec_source = match env::var("EC_SOURCE") {
        Ok(v) if !v.trim().is_empty() => v
            .parse::<EcSource>()
            .map_err(|e| anyhow!("Invalid EC_SOURCE: {}", e))?,
        _ => EcSource::default(),
    };

    let schools = match env::var("SCHOOL_EC_TARGETS") {
        Ok(v) if !v.trim().is_empty() => {
            parse_school_targets(&v).map_err(|e| anyhow!("Invalid SCHOOL_EC_TARGETS: {}", e))?
        }
        _ => DEFAULT_SCHOOLS
            .iter()
            .map(|(name, ec)| (name.to_string(), *ec))
            .collect(),
    };

    Ok(Config {
        data_dir,
        manifest: Manifest::new(schools, &env_suffix, &growth_workbook),
        ec_source,
        port,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        let schools: Vec<String> = self
            .manifest
            .schools
            .iter()
            .map(|s| format!("{}={}", s.name, s.target_ec))
            .collect();

        tracing::info!("Configuration loaded:");
        tracing::info!("  DATA_DIR          : {}", self.data_dir.display());
        tracing::info!("  ENV_FILE_SUFFIX   : {}", self.manifest.env_suffix);
        tracing::info!("  GROWTH_WORKBOOK   : {}", self.manifest.growth_workbook);
        tracing::info!("  EC_SOURCE         : {}", self.ec_source);
        tracing::info!("  SCHOOL_EC_TARGETS : {}", schools.join(","));
        tracing::info!("  PORT              : {}", self.port);
    }
}
