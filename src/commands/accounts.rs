// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Account, AccountPatch, NewAccount};
use crate::store::accounts;
use crate::utils::{maybe_print_json, parse_id, parse_money, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let rate = rate_param(sub);
            let data = accounts::list(conn, rate.as_deref())?;
            if !maybe_print_json(sub.get_flag("json"), &data)? {
                print_accounts(&data, rate.as_deref());
            }
        }
        Some(("get", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            let rate = rate_param(sub);
            let account = accounts::get(conn, id, rate.as_deref())?;
            if !maybe_print_json(sub.get_flag("json"), &account)? {
                print_accounts(std::slice::from_ref(&account), rate.as_deref());
            }
        }
        Some(("add", sub)) => {
            let new = NewAccount {
                name: sub.get_one::<String>("name").unwrap().trim().to_string(),
                currency: sub.get_one::<String>("currency").unwrap().trim().to_uppercase(),
                initial_balance: parse_money(sub.get_one::<String>("initial-balance").unwrap())?,
            };
            let account = accounts::create(conn, &new)?;
            if !maybe_print_json(sub.get_flag("json"), &account)? {
                println!(
                    "Added account '{}' (#{}, {} {})",
                    account.name, account.id, account.currency.name, account.balance
                );
            }
        }
        Some(("rename", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            let patch = AccountPatch {
                name: sub.get_one::<String>("name").unwrap().trim().to_string(),
                currency: sub
                    .get_one::<String>("currency")
                    .map(|c| c.trim().to_uppercase()),
            };
            let account = accounts::update(conn, id, &patch)?;
            if !maybe_print_json(sub.get_flag("json"), &account)? {
                println!("Renamed account #{} to '{}'", account.id, account.name);
            }
        }
        Some(("rm", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            accounts::delete(conn, id)?;
            println!("Removed account #{}", id);
        }
        _ => {}
    }
    Ok(())
}

fn rate_param(sub: &clap::ArgMatches) -> Option<String> {
    sub.get_one::<String>("rate")
        .map(|r| r.trim().to_uppercase())
        .filter(|r| !r.is_empty())
}

fn print_accounts(data: &[Account], rate: Option<&str>) {
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|a| {
            vec![
                a.id.to_string(),
                a.name.clone(),
                rate.unwrap_or(&a.currency.name).to_string(),
                a.initial_balance.to_string(),
                a.balance.to_string(),
                a.created_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["ID", "Name", "CCY", "Initial", "Balance", "Created"], rows)
    );
}
