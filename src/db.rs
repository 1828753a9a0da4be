// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::Result;
use log::info;
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::time::Duration;

/// Ordered schema migrations; `PRAGMA user_version` records how many ran.
const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS currencies(
        name TEXT PRIMARY KEY,
        symbol TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    -- append-only: 1 currency_name = value name
    CREATE TABLE IF NOT EXISTS rates(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        currency_name TEXT NOT NULL REFERENCES currencies(name),
        name TEXT NOT NULL,
        symbol TEXT NOT NULL,
        value TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_rates_latest ON rates(currency_name, name, created_at);

    CREATE TABLE IF NOT EXISTS accounts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        currency_name TEXT NOT NULL REFERENCES currencies(name),
        name TEXT NOT NULL,
        initial_balance TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        account_id INTEGER NOT NULL REFERENCES accounts(id),
        description TEXT NOT NULL DEFAULT '',
        value TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('INCOME','EXPENSE')),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account_id, type);

    CREATE TABLE IF NOT EXISTS transactions_categories(
        transaction_id INTEGER NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
        category_id INTEGER NOT NULL REFERENCES categories(id),
        PRIMARY KEY(transaction_id, category_id)
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_categories_category
        ON transactions_categories(category_id);
    "#,
];

pub fn open(path: &Path, timeout: Duration) -> Result<Connection> {
    let conn = Connection::open(path)?;
    configure(&conn, timeout)?;
    Ok(conn)
}

/// Enables foreign keys and sets the busy timeout every storage call honours.
pub fn configure(conn: &Connection, timeout: Duration) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(timeout)?;
    Ok(())
}

/// Applies pending migrations. Returns how many ran.
pub fn migrate(conn: &mut Connection) -> Result<usize> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    let current = usize::try_from(current).unwrap_or(0);
    if current >= MIGRATIONS.len() {
        return Ok(0);
    }
    let tx = conn.transaction()?;
    for (idx, sql) in MIGRATIONS.iter().enumerate().skip(current) {
        tx.execute_batch(sql)?;
        let version = idx + 1;
        tx.pragma_update(None, "user_version", version as i64)?;
        info!("applied schema migration {}", version);
    }
    tx.commit()?;
    Ok(MIGRATIONS.len() - current)
}

pub fn schema_version(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?)
}

/// Reads a TEXT decimal column.
pub fn decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = row.get(idx)?;
    s.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
