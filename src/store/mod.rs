// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The ledger core. Functions here take a connection, never log, and return
//! [`crate::error::LedgerError`]; writers that span several statements open
//! their own immediate unit of work.

pub mod accounts;
pub mod categories;
pub mod currencies;
pub mod transactions;
