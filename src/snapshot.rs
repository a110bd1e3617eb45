// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Fetch cycles for the expense list and rate table.
//!
//! Both requests go out together and are committed as one snapshot only when both
//! succeed. Every cycle carries a generation ticket; a cycle that finishes after a newer
//! one has started is dropped instead of overwriting newer state.

use crate::api::{ApiClient, ApiResult};
use crate::models::{ExpenseRecord, RateTable};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub expenses: Vec<ExpenseRecord>,
    pub rates: RateTable,
    pub fetched_at: DateTime<Utc>,
}

pub trait SnapshotSource: Sync {
    fn fetch_expenses(&self) -> ApiResult<Vec<ExpenseRecord>>;
    fn fetch_rates(&self) -> ApiResult<RateTable>;
}

impl SnapshotSource for ApiClient {
    fn fetch_expenses(&self) -> ApiResult<Vec<ExpenseRecord>> {
        self.list_expenses()
    }

    fn fetch_rates(&self) -> ApiResult<RateTable> {
        ApiClient::fetch_rates(self)
    }
}

/// Runs both fetches concurrently and fails if either does.
pub fn fetch_pair<S: SnapshotSource>(source: &S) -> ApiResult<(Vec<ExpenseRecord>, RateTable)> {
    thread::scope(|s| {
        let rates = s.spawn(|| source.fetch_rates());
        let expenses = source.fetch_expenses();
        let rates = rates
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        Ok((expenses?, rates?))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Applied,
    Stale,
}

#[derive(Debug, Default)]
pub struct SnapshotLoader {
    generation: AtomicU64,
    current: Mutex<Option<Arc<Snapshot>>>,
}

impl SnapshotLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a cycle; any ticket handed out earlier becomes stale.
    pub fn begin(&self) -> Ticket {
        Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Invalidates in-flight cycles without starting a new one (view torn down).
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    pub fn commit(&self, ticket: Ticket, snapshot: Snapshot) -> Commit {
        let mut slot = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if !self.is_current(ticket) {
            tracing::warn!(ticket = ticket.0, "discarding stale snapshot");
            return Commit::Stale;
        }
        *slot = Some(Arc::new(snapshot));
        Commit::Applied
    }

    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// One full cycle. On error the previous snapshot stays in place; `Ok(None)` means the
    /// cycle was superseded while it was in flight.
    pub fn refresh<S: SnapshotSource>(&self, source: &S) -> ApiResult<Option<Arc<Snapshot>>> {
        let ticket = self.begin();
        tracing::debug!(ticket = ticket.0, "snapshot fetch started");
        let (expenses, rates) = fetch_pair(source)?;
        let snapshot = Snapshot {
            expenses,
            rates,
            fetched_at: Utc::now(),
        };
        match self.commit(ticket, snapshot) {
            Commit::Applied => Ok(self.current()),
            Commit::Stale => Ok(None),
        }
    }
}
