// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Accounts and their derived balances.
//!
//! Balances are never stored. Every read sums the account's transactions
//! afresh and, when asked for another currency, projects both the initial
//! balance and the balance through the latest rate.

use crate::error::{LedgerError, Result};
use crate::models::{Account, AccountPatch, Currency, NewAccount, TransactionKind};
use crate::money::Money;
use crate::store::currencies;
use crate::utils::now;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

/// Read-time figures for one account, in the requested currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Valuation {
    pub initial_balance: Money,
    pub balance: Money,
}

fn out_of_range(account_id: i64) -> LedgerError {
    LedgerError::Overflow(format!("balance of account '{}' is out of range", account_id))
}

/// Income and expense sums, read by a single statement so both come from one snapshot.
pub fn totals(conn: &Connection, account_id: i64) -> Result<(Money, Money)> {
    let mut stmt = conn.prepare_cached("SELECT type, value FROM transactions WHERE account_id = ?1")?;
    let mut rows = stmt.query(params![account_id])?;
    let mut income = Money::ZERO;
    let mut expense = Money::ZERO;
    while let Some(r) = rows.next()? {
        let kind: String = r.get(0)?;
        let value: Money = r.get(1)?;
        let sum = match kind.parse::<TransactionKind>()? {
            TransactionKind::Income => &mut income,
            TransactionKind::Expense => &mut expense,
        };
        *sum = sum
            .checked_add(value)
            .ok_or_else(|| out_of_range(account_id))?;
    }
    Ok((income, expense))
}

/// `initial + income - expense`, optionally converted into `target`.
///
/// A target equal to the account's own currency, or empty, means no
/// conversion. A target without a usable rate (none recorded, or one that
/// truncated to zero) is an error rather than a zero balance.
pub fn compute_balance(
    conn: &Connection,
    account_id: i64,
    currency: &Currency,
    initial_balance: Money,
    target: Option<&str>,
) -> Result<Valuation> {
    let (income, expense) = totals(conn, account_id)?;
    let balance = initial_balance
        .checked_add(income)
        .and_then(|b| b.checked_sub(expense))
        .ok_or_else(|| out_of_range(account_id))?;
    match target.filter(|t| !t.is_empty() && *t != currency.name) {
        None => Ok(Valuation {
            initial_balance,
            balance,
        }),
        Some(t) => {
            let rate = currency.rate(t).filter(|r| !r.value.is_zero()).ok_or_else(|| {
                LedgerError::DependencyFailed(format!(
                    "rate '{}' not found for currency '{}'",
                    t, currency.name
                ))
            })?;
            Ok(Valuation {
                initial_balance: initial_balance
                    .convert(rate.value)
                    .ok_or_else(|| out_of_range(account_id))?,
                balance: balance
                    .convert(rate.value)
                    .ok_or_else(|| out_of_range(account_id))?,
            })
        }
    }
}

struct AccountRow {
    id: i64,
    currency_name: String,
    name: String,
    initial_balance: Money,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const SELECT_ACCOUNT: &str =
    "SELECT id, currency_name, name, initial_balance, created_at, updated_at FROM accounts";

fn account_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<AccountRow> {
    Ok(AccountRow {
        id: r.get(0)?,
        currency_name: r.get(1)?,
        name: r.get(2)?,
        initial_balance: r.get(3)?,
        created_at: r.get(4)?,
        updated_at: r.get(5)?,
    })
}

fn hydrate(conn: &Connection, row: AccountRow, target: Option<&str>) -> Result<Account> {
    let currency = currencies::get(conn, &row.currency_name)?;
    let valuation = compute_balance(conn, row.id, &currency, row.initial_balance, target)?;
    Ok(Account {
        id: row.id,
        currency,
        name: row.name,
        initial_balance: valuation.initial_balance,
        balance: valuation.balance,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn find_row(conn: &Connection, id: i64) -> Result<AccountRow> {
    conn.query_row(
        &format!("{} WHERE id = ?1", SELECT_ACCOUNT),
        params![id],
        account_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("account", id))
}

pub fn exists(conn: &Connection, id: i64) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM accounts WHERE id = ?1", params![id], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

/// Loads one account with its balance, converted into `target` when given.
pub fn get(conn: &Connection, id: i64, target: Option<&str>) -> Result<Account> {
    let row = find_row(conn, id)?;
    hydrate(conn, row, target)
}

pub fn list(conn: &Connection, target: Option<&str>) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_ACCOUNT))?;
    let rows = stmt.query_map([], account_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(hydrate(conn, row?, target)?);
    }
    Ok(out)
}

/// Creates the account in an existing currency and returns it with its
/// native balance.
pub fn create(conn: &Connection, new: &NewAccount) -> Result<Account> {
    new.validate()?;
    let currency = match currencies::get(conn, &new.currency) {
        Ok(c) => c,
        Err(LedgerError::NotFound { .. }) => {
            return Err(LedgerError::DependencyFailed(format!(
                "currency '{}' not found",
                new.currency
            )));
        }
        Err(e) => return Err(e),
    };
    let created_at = now();
    conn.execute(
        "INSERT INTO accounts(currency_name, name, initial_balance, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            currency.name,
            new.name,
            new.initial_balance,
            created_at,
            created_at
        ],
    )?;
    let id = conn.last_insert_rowid();
    let valuation = compute_balance(conn, id, &currency, new.initial_balance, None)?;
    Ok(Account {
        id,
        currency,
        name: new.name.clone(),
        initial_balance: valuation.initial_balance,
        balance: valuation.balance,
        created_at,
        updated_at: created_at,
    })
}

/// Renames the account. Currency and initial balance are fixed at creation;
/// a patch naming a different currency is rejected.
pub fn update(conn: &mut Connection, id: i64, patch: &AccountPatch) -> Result<Account> {
    patch.validate()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let row = find_row(&tx, id)?;
    if let Some(requested) = patch.currency.as_deref() {
        if requested != row.currency_name {
            return Err(LedgerError::validation(
                "currency.name",
                format!(
                    "field 'currency.name' cannot be changed from '{}' to '{}'",
                    row.currency_name, requested
                ),
            ));
        }
    }
    let updated_at = now();
    tx.execute(
        "UPDATE accounts SET name = ?1, updated_at = ?2 WHERE id = ?3",
        params![patch.name, updated_at, id],
    )?;
    let account = hydrate(
        &tx,
        AccountRow {
            name: patch.name.clone(),
            updated_at,
            ..row
        },
        None,
    )?;
    tx.commit()?;
    Ok(account)
}

/// Hard delete. Refused while transactions still reference the account.
pub fn delete(conn: &mut Connection, id: i64) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    find_row(&tx, id)?;
    let count: i64 = tx.query_row(
        "SELECT count(*) FROM transactions WHERE account_id = ?1",
        params![id],
        |r| r.get(0),
    )?;
    if count > 0 {
        return Err(LedgerError::Conflict(format!(
            "account '{}' has one or more transactions, please delete them first",
            id
        )));
    }
    tx.execute("DELETE FROM accounts WHERE id = ?1", params![id])?;
    tx.commit()?;
    Ok(())
}
