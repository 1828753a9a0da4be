// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fin::models::{NewCategory, Rate};
use fin::refresh::{self, RateSource};
use fin::store::{categories, currencies};
use fin::{LedgerError, db};
use rusqlite::{Connection, TransactionBehavior};
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::time::Duration;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::configure(&conn, Duration::from_millis(100)).unwrap();
    db::migrate(&mut conn).unwrap();
    conn
}

struct FakeSource {
    rates: HashMap<&'static str, Vec<(&'static str, f64)>>,
    failing: &'static [&'static str],
}

impl RateSource for FakeSource {
    fn fetch_rates(&self, base: &str) -> fin::Result<HashMap<String, f64>> {
        if self.failing.contains(&base) {
            return Err(LedgerError::Upstream(format!("no rates for {}", base)));
        }
        Ok(self
            .rates
            .get(base)
            .map(|rs| rs.iter().map(|(k, v)| (k.to_string(), *v)).collect())
            .unwrap_or_default())
    }
}

#[test]
fn appended_rate_supersedes_without_deleting() {
    let mut conn = setup();
    currencies::create(&mut conn, "USD", "$", &[Rate::new("BRL", "R$", dec!(3.80))]).unwrap();
    currencies::append_rates(&mut conn, "USD", &[Rate::new("BRL", "R$", dec!(3.85))]).unwrap();

    let latest = currencies::latest_rates(&conn, "USD").unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].value, dec!(3.85));
    assert_eq!(currencies::rate_history(&conn, "USD", "BRL").unwrap().len(), 2);
    assert_eq!(
        currencies::get(&conn, "USD").unwrap().rate("BRL").unwrap().value,
        dec!(3.85)
    );
}

#[test]
fn refresh_appends_latest_observations() {
    let mut conn = setup();
    currencies::create(&mut conn, "USD", "$", &[Rate::new("BRL", "R$", dec!(3.80))]).unwrap();
    let source = FakeSource {
        rates: HashMap::from([("USD", vec![("BRL", 10.99), ("ZAR", 11.99)])]),
        failing: &[],
    };
    assert_eq!(refresh::refresh_currency(&mut conn, &source, "USD").unwrap(), 2);

    let usd = currencies::get(&conn, "USD").unwrap();
    assert_eq!(usd.rates.len(), 2);
    assert_eq!(usd.rate("BRL").unwrap().value, dec!(10.99));
    assert_eq!(usd.rate("ZAR").unwrap().value, dec!(11.99));
    assert_eq!(usd.rate("ZAR").unwrap().symbol, "R");
    assert_eq!(currencies::rate_history(&conn, "USD", "BRL").unwrap().len(), 2);
}

#[test]
fn refresh_creates_currency_and_truncates() {
    let mut conn = setup();
    assert!(currencies::is_empty(&conn).unwrap());
    let source = FakeSource {
        rates: HashMap::from([("EUR", vec![("USD", 1.14159)])]),
        failing: &[],
    };
    refresh::refresh_currency(&mut conn, &source, "EUR").unwrap();
    let eur = currencies::get(&conn, "EUR").unwrap();
    assert_eq!(eur.symbol, "€");
    assert_eq!(eur.rate("USD").unwrap().value, dec!(1.14));
    assert!(!currencies::is_empty(&conn).unwrap());
}

#[test]
fn refresh_skips_rates_truncated_to_zero() {
    let mut conn = setup();
    let source = FakeSource {
        rates: HashMap::from([("JPY", vec![("USD", 0.0067), ("KRW", 9.41)])]),
        failing: &[],
    };
    assert_eq!(refresh::refresh_currency(&mut conn, &source, "JPY").unwrap(), 1);
    let jpy = currencies::get(&conn, "JPY").unwrap();
    assert!(jpy.rate("USD").is_none());
    assert_eq!(jpy.rate("KRW").unwrap().value, dec!(9.41));
}

#[test]
fn refresh_rejects_unsupported_code() {
    let mut conn = setup();
    let source = FakeSource {
        rates: HashMap::new(),
        failing: &["FOO"],
    };
    let err = refresh::refresh_currency(&mut conn, &source, "FOO").unwrap_err();
    assert!(matches!(err, LedgerError::Validation { field: "currency", .. }));
    assert!(!currencies::exists(&conn, "FOO").unwrap());
    assert!(currencies::is_empty(&conn).unwrap());
}

#[test]
fn refresh_all_isolates_failures() {
    let mut conn = setup();
    let source = FakeSource {
        rates: HashMap::from([("USD", vec![("EUR", 0.87)])]),
        failing: &["EUR"],
    };
    let report = refresh::refresh_all(&mut conn, &source);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "EUR");
    assert_eq!(report.refreshed.len(), refresh::SUPPORTED_CURRENCIES.len() - 1);
    assert_eq!(
        currencies::get(&conn, "USD").unwrap().rate("EUR").unwrap().value,
        dec!(0.87)
    );
    // the failing currency row is still created; only its rates are missing
    assert!(currencies::get(&conn, "EUR").unwrap().rates.is_empty());
}

#[test]
fn busy_storage_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fin.sqlite");

    let mut holder = db::open(&path, Duration::from_millis(1000)).unwrap();
    db::migrate(&mut holder).unwrap();
    let waiter = db::open(&path, Duration::from_millis(50)).unwrap();

    let lock = holder
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .unwrap();
    let err = categories::create(&waiter, &NewCategory { name: "Food".into() }).unwrap_err();
    assert!(matches!(err, LedgerError::Timeout));
    assert_eq!(err.status_code(), 503);
    drop(lock);

    assert!(categories::create(&waiter, &NewCategory { name: "Food".into() }).is_ok());
}
