// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LedgerError, Result};
use crate::money::{self, Money};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Currency {
    pub name: String,
    pub symbol: String,
    pub rates: Vec<Rate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Currency {
    /// Latest rate towards `target`, if one was ever recorded.
    pub fn rate(&self, target: &str) -> Option<&Rate> {
        self.rates.iter().find(|r| r.name == target)
    }
}

/// One observation of "1 base unit = value target units". Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rate {
    #[serde(skip)]
    pub id: i64,
    pub name: String,
    pub symbol: String,
    pub value: Decimal,
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Rate {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, value: Decimal) -> Self {
        Rate {
            id: 0,
            name: name.into(),
            symbol: symbol.into(),
            value,
            created_at: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !money::is_cents_format(&self.value) {
            return Err(LedgerError::validation(
                "value",
                "field 'value' must be like 1.99",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub currency: Currency,
    pub name: String,
    pub initial_balance: Money,
    /// Derived on every read, never stored.
    pub balance: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub currency: String,
    pub name: String,
    pub initial_balance: Money,
}

impl NewAccount {
    /// Runs every check in order; the last failing one is reported.
    pub fn validate(&self) -> Result<()> {
        let mut err = None;
        if self.currency.is_empty() {
            err = Some(LedgerError::validation(
                "currency.name",
                "field 'currency.name' must not be empty",
            ));
        }
        if self.name.is_empty() {
            err = Some(LedgerError::validation(
                "name",
                "field 'name' must not be empty",
            ));
        }
        if !self.initial_balance.is_positive() {
            err = Some(LedgerError::validation(
                "initial_balance",
                "field 'initial_balance' must be more than 0",
            ));
        }
        if !self.initial_balance.is_cents_format() {
            err = Some(LedgerError::validation(
                "initial_balance",
                "field 'initial_balance' must be like 1.99",
            ));
        }
        err.map_or(Ok(()), Err)
    }
}

/// Account update payload. Only the name is mutable; a currency, when given,
/// must match the stored one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountPatch {
    pub name: String,
    #[serde(default)]
    pub currency: Option<String>,
}

impl AccountPatch {
    pub fn validate(&self) -> Result<()> {
        let mut err = None;
        if matches!(self.currency.as_deref(), Some("")) {
            err = Some(LedgerError::validation(
                "currency.name",
                "field 'currency.name' must not be empty",
            ));
        }
        if self.name.is_empty() {
            err = Some(LedgerError::validation(
                "name",
                "field 'name' must not be empty",
            ));
        }
        err.map_or(Ok(()), Err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

impl NewCategory {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(LedgerError::validation(
                "name",
                "field 'name' must not be empty",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "INCOME",
            TransactionKind::Expense => "EXPENSE",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "INCOME" => Ok(TransactionKind::Income),
            "EXPENSE" => Ok(TransactionKind::Expense),
            _ => Err(LedgerError::validation(
                "type",
                "field 'type' must be 'INCOME' or 'EXPENSE'",
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    #[serde(skip)]
    pub account_id: i64,
    pub description: String,
    pub value: Money,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller payload for creating or updating a transaction. Categories are
/// referenced by id and resolved to full records inside the unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub description: String,
    pub value: Money,
    #[serde(rename = "type")]
    pub kind: String,
    pub categories: Vec<i64>,
}

impl TransactionDraft {
    /// Checks type, value sign, value format, then categories. Each failing
    /// check replaces the previous error, so the last one wins.
    pub fn validate(&self) -> Result<TransactionKind> {
        let mut err = self.kind.parse::<TransactionKind>().err();
        if !self.value.is_positive() {
            err = Some(LedgerError::validation(
                "value",
                "field 'value' must be more than 0",
            ));
        }
        if !self.value.is_cents_format() {
            err = Some(LedgerError::validation(
                "value",
                "field 'value' must be like 1.99",
            ));
        }
        if self.categories.is_empty() {
            err = Some(LedgerError::validation(
                "categories",
                "field 'categories' must not be empty",
            ));
        }
        match err {
            Some(e) => Err(e),
            None => self.kind.parse(),
        }
    }
}
