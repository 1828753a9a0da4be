// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fin::models::{NewAccount, NewCategory, TransactionDraft};
use fin::money::Money;
use fin::store::{accounts, categories, currencies, transactions};
use fin::{LedgerError, db};
use rusqlite::Connection;
use rust_decimal_macros::dec;
use std::time::Duration;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::configure(&conn, Duration::from_millis(100)).unwrap();
    db::migrate(&mut conn).unwrap();
    currencies::create(&mut conn, "USD", "$", &[]).unwrap();
    conn
}

#[test]
fn crud_roundtrip() {
    let conn = setup();
    let c = categories::create(&conn, &NewCategory { name: "Food".into() }).unwrap();
    assert_eq!(categories::get(&conn, c.id).unwrap(), c);

    let renamed = categories::update(&conn, c.id, &NewCategory { name: "Groceries".into() }).unwrap();
    assert_eq!(renamed.name, "Groceries");
    assert_eq!(renamed.created_at, c.created_at);
    assert_eq!(categories::list(&conn).unwrap(), vec![renamed]);
}

#[test]
fn empty_name_rejected() {
    let conn = setup();
    let err = categories::create(&conn, &NewCategory { name: "".into() }).unwrap_err();
    assert!(matches!(err, LedgerError::Validation { field: "name", .. }));
    assert!(categories::list(&conn).unwrap().is_empty());
}

#[test]
fn unknown_category_not_found() {
    let mut conn = setup();
    let err = categories::get(&conn, 3213).unwrap_err();
    assert_eq!(err.to_string(), "category '3213' not found");
    assert_eq!(err.status_code(), 404);
    assert!(categories::update(&conn, 3213, &NewCategory { name: "x".into() }).is_err());
    assert!(matches!(
        categories::delete(&mut conn, 3213).unwrap_err(),
        LedgerError::NotFound { .. }
    ));
}

#[test]
fn delete_guarded_by_usage() {
    let mut conn = setup();
    let used = categories::create(&conn, &NewCategory { name: "Rent".into() }).unwrap();
    let spare = categories::create(&conn, &NewCategory { name: "Spare".into() }).unwrap();
    let acc = accounts::create(
        &conn,
        &NewAccount {
            currency: "USD".into(),
            name: "Main".into(),
            initial_balance: Money::new(dec!(1000)),
        },
    )
    .unwrap();
    transactions::create(
        &mut conn,
        acc.id,
        &TransactionDraft {
            description: "April".into(),
            value: Money::new(dec!(900)),
            kind: "EXPENSE".into(),
            categories: vec![used.id],
        },
    )
    .unwrap();

    assert_eq!(categories::usage_count(&conn, used.id).unwrap(), 1);
    let err = categories::delete(&mut conn, used.id).unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)));
    assert!(err.to_string().contains("is being used"));
    assert!(categories::get(&conn, used.id).is_ok());

    categories::delete(&mut conn, spare.id).unwrap();
    assert!(categories::get(&conn, spare.id).is_err());
}
