// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::refresh::{self, RateSource, RefreshReport};
use crate::store::currencies;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use log::info;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &mut Connection, source: &dyn RateSource, m: &clap::ArgMatches) -> Result<()> {
    if m.get_flag("if-empty") && !currencies::is_empty(conn)? {
        info!("currencies already present; skipping rate refresh");
        return Ok(());
    }
    let report = match m.get_one::<String>("currency") {
        Some(code) => {
            let code = code.trim().to_uppercase();
            let mut report = RefreshReport::default();
            match refresh::refresh_currency(conn, source, &code) {
                Ok(n) => report.refreshed.push((code, n)),
                Err(e) => report.failed.push((code, e.to_string())),
            }
            report
        }
        None => refresh::refresh_all(conn, source),
    };
    print_report(m.get_flag("json"), &report)?;
    if !report.failed.is_empty() && report.refreshed.is_empty() {
        anyhow::bail!("rate refresh failed for every currency");
    }
    Ok(())
}

fn print_report(json_flag: bool, report: &RefreshReport) -> Result<()> {
    let v = json!({
        "refreshed": report.refreshed.iter().map(|(c, n)| json!({"currency": c, "rates": n})).collect::<Vec<_>>(),
        "failed": report.failed.iter().map(|(c, e)| json!({"currency": c, "error": e})).collect::<Vec<_>>(),
    });
    if maybe_print_json(json_flag, &v)? {
        return Ok(());
    }
    let mut rows: Vec<Vec<String>> = report
        .refreshed
        .iter()
        .map(|(c, n)| vec![c.clone(), format!("{} rates", n)])
        .collect();
    rows.extend(
        report
            .failed
            .iter()
            .map(|(c, e)| vec![c.clone(), format!("failed: {}", e)]),
    );
    println!("{}", pretty_table(&["Currency", "Result"], rows));
    Ok(())
}
