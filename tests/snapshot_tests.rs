// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use moneyflow::api::{ApiError, ApiResult};
use moneyflow::models::{ExpenseRecord, RateTable};
use moneyflow::snapshot::{Commit, Snapshot, SnapshotLoader, SnapshotSource, fetch_pair};
use rust_decimal::Decimal;
use std::sync::Barrier;

struct Fixed {
    expenses: ApiResult<Vec<ExpenseRecord>>,
    rates: ApiResult<RateTable>,
}

fn clone_result<T: Clone>(r: &ApiResult<T>) -> ApiResult<T> {
    match r {
        Ok(v) => Ok(v.clone()),
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized),
        Err(_) => Err(ApiError::Status {
            status: 500,
            body: "boom".into(),
        }),
    }
}

impl SnapshotSource for Fixed {
    fn fetch_expenses(&self) -> ApiResult<Vec<ExpenseRecord>> {
        clone_result(&self.expenses)
    }

    fn fetch_rates(&self) -> ApiResult<RateTable> {
        clone_result(&self.rates)
    }
}

fn record(id: &str) -> ExpenseRecord {
    ExpenseRecord {
        id: id.into(),
        amount: Some(Decimal::ONE),
        currency: "INR".into(),
        category: None,
        note: None,
        occurred_at: Some(Utc::now()),
    }
}

fn rates() -> RateTable {
    RateTable::from([("INR".to_string(), Decimal::ONE)])
}

fn ok_source(id: &str) -> Fixed {
    Fixed {
        expenses: Ok(vec![record(id)]),
        rates: Ok(rates()),
    }
}

#[test]
fn successful_cycle_commits_both_halves() {
    let loader = SnapshotLoader::new();
    assert!(loader.current().is_none());
    let snap = loader.refresh(&ok_source("a")).unwrap().unwrap();
    assert_eq!(snap.expenses[0].id, "a");
    assert_eq!(snap.rates, rates());
    assert_eq!(loader.current().unwrap().expenses[0].id, "a");
}

#[test]
fn failed_half_keeps_previous_snapshot() {
    let loader = SnapshotLoader::new();
    loader.refresh(&ok_source("first")).unwrap();

    let rates_down = Fixed {
        expenses: Ok(vec![record("second")]),
        rates: Err(ApiError::Status {
            status: 503,
            body: String::new(),
        }),
    };
    assert!(loader.refresh(&rates_down).is_err());
    assert_eq!(loader.current().unwrap().expenses[0].id, "first");

    let expenses_down = Fixed {
        expenses: Err(ApiError::Unauthorized),
        rates: Ok(RateTable::new()),
    };
    assert!(matches!(
        loader.refresh(&expenses_down),
        Err(ApiError::Unauthorized)
    ));
    let kept = loader.current().unwrap();
    assert_eq!(kept.expenses[0].id, "first");
    assert_eq!(kept.rates, rates());
}

#[test]
fn stale_ticket_cannot_overwrite_newer_state() {
    let loader = SnapshotLoader::new();
    let old = loader.begin();
    let new = loader.begin();
    assert!(!loader.is_current(old));

    let snap = |id: &str| Snapshot {
        expenses: vec![record(id)],
        rates: rates(),
        fetched_at: Utc::now(),
    };
    assert_eq!(loader.commit(new, snap("new")), Commit::Applied);
    assert_eq!(loader.commit(old, snap("old")), Commit::Stale);
    assert_eq!(loader.current().unwrap().expenses[0].id, "new");
}

#[test]
fn cancel_discards_in_flight_cycle() {
    let loader = SnapshotLoader::new();
    let t = loader.begin();
    loader.cancel();
    let snap = Snapshot {
        expenses: Vec::new(),
        rates: RateTable::new(),
        fetched_at: Utc::now(),
    };
    assert_eq!(loader.commit(t, snap), Commit::Stale);
    assert!(loader.current().is_none());
}

/// Blocks until both requests are in flight, so it only passes if they run concurrently.
struct Rendezvous {
    barrier: Barrier,
}

impl SnapshotSource for Rendezvous {
    fn fetch_expenses(&self) -> ApiResult<Vec<ExpenseRecord>> {
        self.barrier.wait();
        Ok(vec![record("together")])
    }

    fn fetch_rates(&self) -> ApiResult<RateTable> {
        self.barrier.wait();
        Ok(rates())
    }
}

#[test]
fn both_fetches_run_at_the_same_time() {
    let source = Rendezvous {
        barrier: Barrier::new(2),
    };
    let (expenses, r) = fetch_pair(&source).unwrap();
    assert_eq!(expenses[0].id, "together");
    assert_eq!(r, rates());
}
