// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transactions and their category links.
//!
//! Creating or updating a transaction is one immediate unit of work: the row,
//! the category lookups and the join rows either all commit or none do. The
//! join rows are replaced wholesale on update.

use crate::error::{LedgerError, Result};
use crate::models::{Category, Transaction, TransactionDraft, TransactionKind};
use crate::money::Money;
use crate::store::{accounts, categories};
use crate::utils::now;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};

struct TransactionRow {
    id: i64,
    account_id: i64,
    description: String,
    value: Money,
    kind: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const SELECT_TRANSACTION: &str = "SELECT id, account_id, description, value, type, created_at, updated_at FROM transactions";

fn transaction_row(r: &Row<'_>) -> rusqlite::Result<TransactionRow> {
    Ok(TransactionRow {
        id: r.get(0)?,
        account_id: r.get(1)?,
        description: r.get(2)?,
        value: r.get(3)?,
        kind: r.get(4)?,
        created_at: r.get(5)?,
        updated_at: r.get(6)?,
    })
}

fn hydrate(conn: &Connection, row: TransactionRow) -> Result<Transaction> {
    let categories = related_categories(conn, row.id)?;
    Ok(Transaction {
        id: row.id,
        account_id: row.account_id,
        description: row.description,
        value: row.value,
        kind: row.kind.parse()?,
        categories,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Categories linked to a transaction, in the order they were attached.
pub fn related_categories(conn: &Connection, transaction_id: i64) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare_cached(
        "SELECT c.id, c.name, c.created_at, c.updated_at
         FROM transactions_categories tc
         JOIN categories c ON c.id = tc.category_id
         WHERE tc.transaction_id = ?1
         ORDER BY tc.rowid",
    )?;
    let rows = stmt.query_map(params![transaction_id], |r| {
        Ok(Category {
            id: r.get(0)?,
            name: r.get(1)?,
            created_at: r.get(2)?,
            updated_at: r.get(3)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Resolves every id to its full category and links it. The first unknown id
/// fails the call, and dropping the caller's uncommitted unit rolls back
/// everything written before it. Repeated ids are linked once.
fn link_categories(conn: &Connection, transaction_id: i64, ids: &[i64]) -> Result<Vec<Category>> {
    let mut linked: Vec<Category> = Vec::with_capacity(ids.len());
    for &id in ids {
        if linked.iter().any(|c| c.id == id) {
            continue;
        }
        let category = match categories::get(conn, id) {
            Ok(c) => c,
            Err(LedgerError::NotFound { .. }) => {
                return Err(LedgerError::DependencyFailed(format!(
                    "category '{}' not found",
                    id
                )));
            }
            Err(e) => return Err(e),
        };
        conn.execute(
            "INSERT INTO transactions_categories(transaction_id, category_id) VALUES (?1, ?2)",
            params![transaction_id, category.id],
        )?;
        linked.push(category);
    }
    Ok(linked)
}

fn unlink_categories(conn: &Connection, transaction_id: i64) -> Result<()> {
    conn.execute(
        "DELETE FROM transactions_categories WHERE transaction_id = ?1",
        params![transaction_id],
    )?;
    Ok(())
}

pub fn create(conn: &mut Connection, account_id: i64, draft: &TransactionDraft) -> Result<Transaction> {
    let kind = draft.validate()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if !accounts::exists(&tx, account_id)? {
        return Err(LedgerError::not_found("account", account_id));
    }
    let created_at = now();
    tx.execute(
        "INSERT INTO transactions(account_id, description, value, type, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            account_id,
            draft.description,
            draft.value,
            kind.as_str(),
            created_at,
            created_at
        ],
    )?;
    let id = tx.last_insert_rowid();
    let categories = link_categories(&tx, id, &draft.categories)?;
    tx.commit()?;
    Ok(Transaction {
        id,
        account_id,
        description: draft.description.clone(),
        value: draft.value,
        kind,
        categories,
        created_at,
        updated_at: created_at,
    })
}

pub fn get(conn: &Connection, account_id: i64, id: i64) -> Result<Transaction> {
    let row = conn
        .query_row(
            &format!("{} WHERE id = ?1 AND account_id = ?2", SELECT_TRANSACTION),
            params![id, account_id],
            transaction_row,
        )
        .optional()?
        .ok_or_else(|| LedgerError::not_found("transaction", id))?;
    hydrate(conn, row)
}

pub fn list(conn: &Connection, account_id: i64) -> Result<Vec<Transaction>> {
    if !accounts::exists(conn, account_id)? {
        return Err(LedgerError::not_found("account", account_id));
    }
    let mut stmt = conn.prepare(&format!(
        "{} WHERE account_id = ?1 ORDER BY id",
        SELECT_TRANSACTION
    ))?;
    let rows = stmt.query_map(params![account_id], transaction_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(hydrate(conn, row?)?);
    }
    Ok(out)
}

/// Updates description, value and type, then replaces the category links.
/// The draft is validated here as well, so an update can never leave a
/// transaction without categories.
pub fn update(
    conn: &mut Connection,
    account_id: i64,
    id: i64,
    draft: &TransactionDraft,
) -> Result<Transaction> {
    let kind: TransactionKind = draft.validate()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let updated_at = now();
    let created_at: DateTime<Utc> = tx
        .query_row(
            "UPDATE transactions SET description = ?1, value = ?2, type = ?3, updated_at = ?4
             WHERE id = ?5 AND account_id = ?6
             RETURNING created_at",
            params![
                draft.description,
                draft.value,
                kind.as_str(),
                updated_at,
                id,
                account_id
            ],
            |r| r.get(0),
        )
        .optional()?
        .ok_or_else(|| LedgerError::not_found("transaction", id))?;
    unlink_categories(&tx, id)?;
    let categories = link_categories(&tx, id, &draft.categories)?;
    tx.commit()?;
    Ok(Transaction {
        id,
        account_id,
        description: draft.description.clone(),
        value: draft.value,
        kind,
        categories,
        created_at,
        updated_at,
    })
}

/// Deletes the row; its category links go with it through the cascade.
pub fn delete(conn: &Connection, account_id: i64, id: i64) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM transactions WHERE id = ?1 AND account_id = ?2",
        params![id, account_id],
    )?;
    if n == 0 {
        return Err(LedgerError::not_found("transaction", id));
    }
    Ok(())
}
