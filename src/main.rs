// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use log::debug;
use serde_json::json;
use std::path::PathBuf;
use std::process;

use fin::config::Config;
use fin::refresh::HttpRateSource;
use fin::{LedgerError, cli, commands, db};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        let status = err
            .downcast_ref::<LedgerError>()
            .map(LedgerError::status_code)
            .unwrap_or(500);
        eprintln!("{}", json!({ "error": err.to_string(), "status": status }));
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let matches = cli::build_cli().get_matches();

    let mut cfg = Config::from_env()?;
    if let Some(path) = matches.get_one::<String>("db") {
        cfg.db_path = PathBuf::from(path);
    }
    debug!("using database {}", cfg.db_path.display());

    let mut conn = db::open(&cfg.db_path, cfg.storage_timeout)?;
    let applied = db::migrate(&mut conn)?;

    match matches.subcommand() {
        Some(("migrate", _)) => {
            println!(
                "Database at {} is at schema version {} ({} applied)",
                cfg.db_path.display(),
                db::schema_version(&conn)?,
                applied
            );
        }
        Some(("scrape", sub)) => {
            let source = HttpRateSource::from_config(&cfg)?;
            commands::scrape::handle(&mut conn, &source, sub)?
        }
        Some(("currency", sub)) => commands::currencies::handle(&conn, sub)?,
        Some(("account", sub)) => commands::accounts::handle(&mut conn, sub)?,
        Some(("category", sub)) => commands::categories::handle(&mut conn, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
