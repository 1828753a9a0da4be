// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Runtime configuration, read from `FIN_*` environment variables.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Fin", "fin"));

pub const DEFAULT_RATES_URL: &str = "https://api.frankfurter.dev/v1";
const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    /// Busy timeout applied to every storage call.
    pub storage_timeout: Duration,
    pub rates_url: String,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = match get("FIN_DB") {
            Some(p) if !p.trim().is_empty() => PathBuf::from(p.trim()),
            _ => default_db_path()?,
        };
        let storage_timeout = Duration::from_millis(parse_u64(
            &get,
            "FIN_STORAGE_TIMEOUT_MS",
            DEFAULT_STORAGE_TIMEOUT_MS,
        )?);
        let http_timeout = Duration::from_secs(parse_u64(
            &get,
            "FIN_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?);
        let rates_url = get("FIN_RATES_URL")
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_RATES_URL.to_string());
        Ok(Config {
            db_path,
            storage_timeout,
            rates_url,
            http_timeout,
        })
    }
}

fn parse_u64(get: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64> {
    match get(key) {
        Some(v) => v
            .trim()
            .parse::<u64>()
            .with_context(|| format!("Invalid {} '{}', expected a whole number", key, v)),
        None => Ok(default),
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("fin.sqlite"))
}
