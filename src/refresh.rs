// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Periodic exchange-rate refresh.
//!
//! Runs outside the request path. Each supported currency is refreshed in
//! its own unit of work, and a failure for one currency is recorded without
//! stopping the others.

use crate::config::Config;
use crate::error::{LedgerError, Result};
use crate::models::Rate;
use crate::money::truncate_f64;
use crate::store::currencies;
use crate::utils::http_client;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use rusqlite::Connection;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Currency codes the refresh job maintains, with their display symbols.
pub static SUPPORTED_CURRENCIES: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        ("AUD", "$"),
        ("BGN", "лв"),
        ("BRL", "R$"),
        ("CAD", "$"),
        ("CHF", "CHF"),
        ("CNY", "¥"),
        ("CZK", "Kč"),
        ("DKK", "kr"),
        ("EUR", "€"),
        ("GBP", "£"),
        ("HKD", "$"),
        ("HRK", "kn"),
        ("HUF", "Ft"),
        ("IDR", "Rp"),
        ("ILS", "₪"),
        ("INR", "₹"),
        ("ISK", "kr"),
        ("JPY", "¥"),
        ("KRW", "₩"),
        ("MXN", "$"),
        ("MYR", "RM"),
        ("NOK", "kr"),
        ("NZD", "$"),
        ("PHP", "₱"),
        ("PLN", "zł"),
        ("RON", "lei"),
        ("RUB", "₽"),
        ("SEK", "kr"),
        ("SGD", "$"),
        ("THB", "฿"),
        ("TRY", "₺"),
        ("USD", "$"),
        ("ZAR", "R"),
    ])
});

pub fn symbol_for(code: &str) -> Option<&'static str> {
    SUPPORTED_CURRENCIES.get(code).copied()
}

/// Source of "1 base = x target" observations.
pub trait RateSource {
    fn fetch_rates(&self, base: &str) -> Result<HashMap<String, f64>>;
}

#[derive(Debug, Deserialize)]
struct ExchangeRates {
    rates: HashMap<String, f64>,
    #[serde(rename = "base")]
    _base: String,
    #[serde(rename = "date", default)]
    _date: String,
}

/// Frankfurter-compatible `/latest?base=XXX` endpoint.
pub struct HttpRateSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpRateSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(HttpRateSource {
            client: http_client(timeout)?,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.rates_url.clone(), cfg.http_timeout)
    }

    fn latest_url(&self, base: &str) -> String {
        format!("{}/latest?base={}", self.base_url, base)
    }
}

impl RateSource for HttpRateSource {
    fn fetch_rates(&self, base: &str) -> Result<HashMap<String, f64>> {
        let url = self.latest_url(base);
        debug!("getting exchange rates from {}", url);
        let resp = self.client.get(&url).send()?.error_for_status()?;
        let body: ExchangeRates = resp.json()?;
        Ok(body.rates)
    }
}

#[derive(Debug, Default)]
pub struct RefreshReport {
    /// Currency code and number of rates appended.
    pub refreshed: Vec<(String, usize)>,
    /// Currency code and the error that stopped it.
    pub failed: Vec<(String, String)>,
}

/// Creates `code` if missing, fetches its rates and appends them.
/// Returns how many rates were recorded. Codes outside
/// [`SUPPORTED_CURRENCIES`] are rejected before anything is written.
/// Rates that truncate to zero are skipped.
pub fn refresh_currency(conn: &mut Connection, source: &dyn RateSource, code: &str) -> Result<usize> {
    let symbol = symbol_for(code).ok_or_else(|| {
        LedgerError::validation("currency", format!("currency '{}' is not supported", code))
    })?;
    if !currencies::exists(conn, code)? {
        currencies::create(conn, code, symbol, &[])?;
    }
    let fetched = source.fetch_rates(code)?;
    let mut rates = Vec::with_capacity(fetched.len());
    for (target, value) in fetched {
        match truncate_f64(value) {
            Some(v) if v.is_zero() => {
                warn!("skipping rate {} -> {} that truncates to zero ({})", code, target, value)
            }
            Some(v) => {
                let symbol = symbol_for(&target).unwrap_or("");
                rates.push(Rate::new(target, symbol, v));
            }
            None => warn!("skipping non-finite rate {} -> {}", code, target),
        }
    }
    rates.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(currencies::append_rates(conn, code, &rates)?.len())
}

/// Refreshes every supported currency in code order.
pub fn refresh_all(conn: &mut Connection, source: &dyn RateSource) -> RefreshReport {
    info!("starting rate refresh");
    let mut report = RefreshReport::default();
    for code in SUPPORTED_CURRENCIES.keys() {
        match refresh_currency(conn, source, code) {
            Ok(n) => report.refreshed.push((code.to_string(), n)),
            Err(e) => {
                warn!("rate refresh for {} failed: {}", code, e);
                report.failed.push((code.to_string(), e.to_string()));
            }
        }
    }
    info!(
        "finished rate refresh: {} refreshed, {} failed",
        report.refreshed.len(),
        report.failed.len()
    );
    report
}
