// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Blocking client for the MoneyFlow backend.

use crate::models::{ExpenseRecord, NewExpense, RateTable, UserProfile, decimal_from_value};
use crate::utils::http_client;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("session expired or unauthorized; log in again")]
    Unauthorized,
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("not logged in; run `moneyflow login` first")]
    NotLoggedIn,
    #[error("could not decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
struct CurrencyResponse {
    #[serde(default)]
    rates: Option<HashMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    #[serde(default)]
    user: Option<UserProfile>,
}

pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> ApiResult<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            http: http_client()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, rb: RequestBuilder) -> ApiResult<RequestBuilder> {
        let token = self.token.as_deref().ok_or(ApiError::NotLoggedIn)?;
        Ok(rb.bearer_auth(token))
    }

    fn check(resp: Response) -> ApiResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized);
        }
        let body = resp.text().unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn decode<T: DeserializeOwned>(resp: Response) -> ApiResult<T> {
        let text = Self::check(resp)?.text()?;
        Ok(serde_json::from_str(&text)?)
    }

    /// `GET /api/expenses`. A null body is an empty list.
    pub fn list_expenses(&self) -> ApiResult<Vec<ExpenseRecord>> {
        let resp = self.authed(self.http.get(self.url("/api/expenses")))?.send()?;
        let items: Option<Vec<ExpenseRecord>> = Self::decode(resp)?;
        let items = items.unwrap_or_default();
        tracing::debug!(count = items.len(), "fetched expenses");
        Ok(items)
    }

    /// `GET /api/currency`. Entries that are not numeric are dropped.
    pub fn fetch_rates(&self) -> ApiResult<RateTable> {
        let resp = self.http.get(self.url("/api/currency")).send()?;
        let body: CurrencyResponse = Self::decode(resp)?;
        let mut rates = RateTable::new();
        for (code, v) in body.rates.unwrap_or_default() {
            match decimal_from_value(&v) {
                Some(r) => {
                    rates.insert(code, r);
                }
                None => tracing::warn!(currency = %code, "ignoring non-numeric rate"),
            }
        }
        tracing::debug!(count = rates.len(), "fetched currency rates");
        Ok(rates)
    }

    pub fn add_expense(&self, new: &NewExpense) -> ApiResult<ExpenseRecord> {
        let resp = self
            .authed(self.http.post(self.url("/api/expenses")))?
            .json(new)
            .send()?;
        Self::decode(resp)
    }

    pub fn delete_expense(&self, id: &str) -> ApiResult<()> {
        let resp = self
            .authed(self.http.delete(self.url(&format!("/api/expenses/{}", id))))?
            .send()?;
        Self::check(resp)?;
        Ok(())
    }

    pub fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let resp = self
            .http
            .post(self.url("/api/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()?;
        Self::decode(resp)
    }

    pub fn register(&self, email: &str, password: &str) -> ApiResult<()> {
        let resp = self
            .http
            .post(self.url("/api/register"))
            .json(&json!({ "email": email, "password": password }))
            .send()?;
        Self::check(resp)?;
        Ok(())
    }

    /// Where the browser must go to start the Google sign-in.
    pub fn google_auth_url(&self) -> String {
        self.url("/auth/google")
    }

    /// `POST /api/set-username`; returns the backend's updated profile when it sends one.
    pub fn set_username(&self, username: &str) -> ApiResult<Option<UserProfile>> {
        let resp = self
            .authed(self.http.post(self.url("/api/set-username")))?
            .json(&json!({ "username": username }))
            .send()?;
        let env: UserEnvelope = Self::decode(resp)?;
        Ok(env.user)
    }

    /// `PATCH /api/user`; not every backend exposes it.
    pub fn update_profile(&self, name: &str, base_currency: &str) -> ApiResult<()> {
        let resp = self
            .authed(self.http.patch(self.url("/api/user")))?
            .json(&json!({ "name": name, "base_currency": base_currency }))
            .send()?;
        Self::check(resp)?;
        Ok(())
    }
}
