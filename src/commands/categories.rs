// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Category, NewCategory};
use crate::store::categories;
use crate::utils::{maybe_print_json, parse_id, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let data = categories::list(conn)?;
            if !maybe_print_json(sub.get_flag("json"), &data)? {
                print_categories(&data);
            }
        }
        Some(("get", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            let category = categories::get(conn, id)?;
            if !maybe_print_json(sub.get_flag("json"), &category)? {
                print_categories(std::slice::from_ref(&category));
            }
        }
        Some(("add", sub)) => {
            let new = NewCategory {
                name: sub.get_one::<String>("name").unwrap().trim().to_string(),
            };
            let category = categories::create(conn, &new)?;
            if !maybe_print_json(sub.get_flag("json"), &category)? {
                println!("Added category '{}' (#{})", category.name, category.id);
            }
        }
        Some(("rename", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            let new = NewCategory {
                name: sub.get_one::<String>("name").unwrap().trim().to_string(),
            };
            let category = categories::update(conn, id, &new)?;
            if !maybe_print_json(sub.get_flag("json"), &category)? {
                println!("Renamed category #{} to '{}'", category.id, category.name);
            }
        }
        Some(("rm", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            categories::delete(conn, id)?;
            println!("Removed category #{}", id);
        }
        _ => {}
    }
    Ok(())
}

fn print_categories(data: &[Category]) {
    let rows = data
        .iter()
        .map(|c| vec![c.id.to_string(), c.name.clone()])
        .collect();
    println!("{}", pretty_table(&["ID", "Category"], rows));
}
