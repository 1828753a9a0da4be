// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LedgerError, Result};
use crate::models::{Category, NewCategory};
use crate::utils::now;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};

fn category_from_row(r: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        name: r.get(1)?,
        created_at: r.get(2)?,
        updated_at: r.get(3)?,
    })
}

pub fn create(conn: &Connection, new: &NewCategory) -> Result<Category> {
    new.validate()?;
    let created_at = now();
    conn.execute(
        "INSERT INTO categories(name, created_at, updated_at) VALUES (?1, ?2, ?3)",
        params![new.name, created_at, created_at],
    )?;
    Ok(Category {
        id: conn.last_insert_rowid(),
        name: new.name.clone(),
        created_at,
        updated_at: created_at,
    })
}

pub fn get(conn: &Connection, id: i64) -> Result<Category> {
    conn.query_row(
        "SELECT id, name, created_at, updated_at FROM categories WHERE id = ?1",
        params![id],
        category_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("category", id))
}

pub fn list(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt =
        conn.prepare("SELECT id, name, created_at, updated_at FROM categories ORDER BY id")?;
    let rows = stmt.query_map([], category_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn update(conn: &Connection, id: i64, new: &NewCategory) -> Result<Category> {
    new.validate()?;
    conn.query_row(
        "UPDATE categories SET name = ?1, updated_at = ?2 WHERE id = ?3
         RETURNING id, name, created_at, updated_at",
        params![new.name, now(), id],
        category_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("category", id))
}

/// Number of transactions linked to the category.
pub fn usage_count(conn: &Connection, id: i64) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT count(category_id) FROM transactions_categories WHERE category_id = ?1",
        params![id],
        |r| r.get(0),
    )?)
}

/// Deletes an unreferenced category. The reference count and the delete run
/// in one immediate unit, so no writer can link the category in between.
pub fn delete(conn: &mut Connection, id: i64) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    get(&tx, id)?;
    if usage_count(&tx, id)? > 0 {
        return Err(LedgerError::Conflict(format!(
            "category '{}' is being used in one or more transaction, please delete them first",
            id
        )));
    }
    tx.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
    tx.commit()?;
    Ok(())
}
