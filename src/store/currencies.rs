// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Currencies and their append-only rate history.

use crate::db::decimal_at;
use crate::error::{LedgerError, Result};
use crate::models::{Currency, Rate};
use crate::utils::now;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};

const LATEST_RATES_SQL: &str = "
    SELECT r.id, r.name, r.symbol, r.value, r.created_at
    FROM rates r
    WHERE r.currency_name = ?1
      AND r.id = (
        SELECT r2.id FROM rates r2
        WHERE r2.currency_name = r.currency_name AND r2.name = r.name
        ORDER BY r2.created_at DESC, r2.id DESC
        LIMIT 1
      )
    ORDER BY r.name";

fn rate_from_row(r: &Row<'_>) -> rusqlite::Result<Rate> {
    Ok(Rate {
        id: r.get(0)?,
        name: r.get(1)?,
        symbol: r.get(2)?,
        value: decimal_at(r, 3)?,
        created_at: Some(r.get(4)?),
    })
}

/// Inserts the currency and all of its rates in one unit of work.
/// Any invalid rate rolls back the currency row too.
pub fn create(conn: &mut Connection, name: &str, symbol: &str, rates: &[Rate]) -> Result<Currency> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let created_at = now();
    tx.execute(
        "INSERT INTO currencies(name, symbol, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
        params![name, symbol, created_at, created_at],
    )?;
    let rates = insert_rates(&tx, name, rates, created_at)?;
    tx.commit()?;
    Ok(Currency {
        name: name.to_string(),
        symbol: symbol.to_string(),
        rates,
        created_at,
        updated_at: created_at,
    })
}

/// Records new observations for `code` without touching earlier rows.
pub fn append_rates(conn: &mut Connection, code: &str, rates: &[Rate]) -> Result<Vec<Rate>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if !exists(&tx, code)? {
        return Err(LedgerError::not_found("currency", code));
    }
    let created_at = observed_at(&tx, code)?;
    let inserted = insert_rates(&tx, code, rates, created_at)?;
    tx.commit()?;
    Ok(inserted)
}

/// Timestamp for a new batch of rates: the wall clock, but never earlier
/// than the newest rate already stored for `code`. Equal timestamps fall
/// back to id order, so a clock stepping backwards cannot hide a newer rate.
fn observed_at(conn: &Connection, code: &str) -> Result<DateTime<Utc>> {
    let newest: Option<DateTime<Utc>> = conn
        .query_row(
            "SELECT created_at FROM rates WHERE currency_name = ?1
             ORDER BY created_at DESC, id DESC LIMIT 1",
            params![code],
            |r| r.get(0),
        )
        .optional()?;
    let clock = now();
    Ok(match newest {
        Some(ts) if ts > clock => ts,
        _ => clock,
    })
}

fn insert_rates(
    conn: &Connection,
    code: &str,
    rates: &[Rate],
    created_at: DateTime<Utc>,
) -> Result<Vec<Rate>> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO rates(currency_name, name, symbol, value, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    let mut out = Vec::with_capacity(rates.len());
    for rate in rates {
        rate.validate()?;
        stmt.execute(params![
            code,
            rate.name,
            rate.symbol,
            rate.value.to_string(),
            created_at,
            created_at
        ])?;
        out.push(Rate {
            id: conn.last_insert_rowid(),
            created_at: Some(created_at),
            ..rate.clone()
        });
    }
    Ok(out)
}

/// The most recent rate for every target ever recorded against `code`.
pub fn latest_rates(conn: &Connection, code: &str) -> Result<Vec<Rate>> {
    let mut stmt = conn.prepare_cached(LATEST_RATES_SQL)?;
    let rows = stmt.query_map(params![code], rate_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Every observation of `code` -> `target`, oldest first.
pub fn rate_history(conn: &Connection, code: &str, target: &str) -> Result<Vec<Rate>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, symbol, value, created_at FROM rates
         WHERE currency_name = ?1 AND name = ?2 ORDER BY created_at, id",
    )?;
    let rows = stmt.query_map(params![code, target], rate_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn get(conn: &Connection, code: &str) -> Result<Currency> {
    let row: Option<(String, String, DateTime<Utc>, DateTime<Utc>)> = conn
        .query_row(
            "SELECT name, symbol, created_at, updated_at FROM currencies WHERE name = ?1",
            params![code],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .optional()?;
    let (name, symbol, created_at, updated_at) =
        row.ok_or_else(|| LedgerError::not_found("currency", code))?;
    let rates = latest_rates(conn, &name)?;
    Ok(Currency {
        name,
        symbol,
        rates,
        created_at,
        updated_at,
    })
}

pub fn list(conn: &Connection) -> Result<Vec<Currency>> {
    let mut stmt =
        conn.prepare("SELECT name, symbol, created_at, updated_at FROM currencies ORDER BY name")?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, DateTime<Utc>>(2)?,
            r.get::<_, DateTime<Utc>>(3)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (name, symbol, created_at, updated_at) = row?;
        let rates = latest_rates(conn, &name)?;
        out.push(Currency {
            name,
            symbol,
            rates,
            created_at,
            updated_at,
        });
    }
    Ok(out)
}

pub fn exists(conn: &Connection, code: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM currencies WHERE name = ?1",
            params![code],
            |r| r.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn is_empty(conn: &Connection) -> Result<bool> {
    let count: i64 = conn.query_row("SELECT count(*) FROM currencies", [], |r| r.get(0))?;
    Ok(count == 0)
}
