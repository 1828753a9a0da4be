// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Currency;
use crate::store::currencies;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let data = currencies::list(conn)?;
            if !maybe_print_json(sub.get_flag("json"), &data)? {
                let rows = data
                    .iter()
                    .map(|c| {
                        vec![
                            c.name.clone(),
                            c.symbol.clone(),
                            c.rates.len().to_string(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Currency", "Symbol", "Rates"], rows));
            }
        }
        Some(("get", sub)) => {
            let code = sub.get_one::<String>("code").unwrap().trim().to_uppercase();
            let currency = currencies::get(conn, &code)?;
            if !maybe_print_json(sub.get_flag("json"), &currency)? {
                print_rates(&currency);
            }
        }
        _ => {}
    }
    Ok(())
}

fn print_rates(currency: &Currency) {
    let rows = currency
        .rates
        .iter()
        .map(|r| {
            vec![
                r.name.clone(),
                r.symbol.clone(),
                r.value.to_string(),
                r.created_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();
    println!("{} ({})", currency.name, currency.symbol);
    println!(
        "{}",
        pretty_table(&["Target", "Symbol", "Rate", "Observed"], rows)
    );
}
