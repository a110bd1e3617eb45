// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod auth;
pub mod config;
pub mod expenses;
pub mod exporter;
pub mod profile;
pub mod reports;

use crate::api::{ApiClient, ApiError};
use crate::session::SessionContext;
use crate::snapshot::{Snapshot, SnapshotLoader};
use anyhow::{Context, Result};
use std::sync::Arc;

/// What every command runs against: the session, the backend address and the
/// snapshot of the current fetch cycle.
pub struct Shell<'c> {
    pub session: SessionContext<'c>,
    pub api_url: String,
    pub loader: SnapshotLoader,
}

impl<'c> Shell<'c> {
    pub fn new(session: SessionContext<'c>, api_url: String) -> Self {
        Self {
            session,
            api_url,
            loader: SnapshotLoader::new(),
        }
    }

    pub fn client(&self) -> Result<ApiClient> {
        let token = self.session.session().token.clone();
        ApiClient::new(&self.api_url, token).context("Build HTTP client")
    }

    pub fn base_currency(&self) -> String {
        self.session.session().base_currency().to_string()
    }

    /// Fetches expenses and rates together. Requires a signed-in session.
    pub fn load_snapshot(&self) -> Result<Arc<Snapshot>> {
        if !self.session.session().is_logged_in() {
            return Err(ApiError::NotLoggedIn.into());
        }
        let client = self.client()?;
        let fresh = self
            .loader
            .refresh(&client)
            .with_context(|| format!("Could not load expenses from {}", self.api_url))?;
        match fresh {
            Some(s) => Ok(s),
            None => self
                .loader
                .current()
                .context("Expense fetch was superseded before it finished"),
        }
    }
}
