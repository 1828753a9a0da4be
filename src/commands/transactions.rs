// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Transaction, TransactionDraft};
use crate::store::transactions;
use crate::utils::{maybe_print_json, parse_id, parse_money, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let account = parse_id(sub.get_one::<String>("account").unwrap())?;
            let data = transactions::list(conn, account)?;
            if !maybe_print_json(sub.get_flag("json"), &data)? {
                print_transactions(&data);
            }
        }
        Some(("get", sub)) => {
            let account = parse_id(sub.get_one::<String>("account").unwrap())?;
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            let t = transactions::get(conn, account, id)?;
            if !maybe_print_json(sub.get_flag("json"), &t)? {
                print_transactions(std::slice::from_ref(&t));
            }
        }
        Some(("add", sub)) => {
            let account = parse_id(sub.get_one::<String>("account").unwrap())?;
            let draft = draft_from(sub)?;
            let t = transactions::create(conn, account, &draft)?;
            if !maybe_print_json(sub.get_flag("json"), &t)? {
                println!(
                    "Recorded {} {} '{}' on account #{} (#{})",
                    t.kind, t.value, t.description, account, t.id
                );
            }
        }
        Some(("update", sub)) => {
            let account = parse_id(sub.get_one::<String>("account").unwrap())?;
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            let draft = draft_from(sub)?;
            let t = transactions::update(conn, account, id, &draft)?;
            if !maybe_print_json(sub.get_flag("json"), &t)? {
                println!("Updated transaction #{}", t.id);
            }
        }
        Some(("rm", sub)) => {
            let account = parse_id(sub.get_one::<String>("account").unwrap())?;
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            transactions::delete(conn, account, id)?;
            println!("Removed transaction #{}", id);
        }
        _ => {}
    }
    Ok(())
}

/// Builds a draft from CLI args. The type is passed through untouched so
/// validation reports it exactly as given.
pub fn draft_from(sub: &clap::ArgMatches) -> Result<TransactionDraft> {
    let categories = sub
        .get_many::<String>("category")
        .map(|vals| vals.map(|v| parse_id(v)).collect::<Result<Vec<_>>>())
        .transpose()?
        .unwrap_or_default();
    Ok(TransactionDraft {
        description: sub
            .get_one::<String>("description")
            .map(|d| d.trim().to_string())
            .unwrap_or_default(),
        value: parse_money(sub.get_one::<String>("value").unwrap())?,
        kind: sub.get_one::<String>("type").unwrap().trim().to_string(),
        categories,
    })
}

fn print_transactions(data: &[Transaction]) {
    let rows = data
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.kind.to_string(),
                t.value.to_string(),
                t.description.clone(),
                t.categories
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                t.created_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Type", "Value", "Description", "Categories", "Created"],
            rows,
        )
    );
}
