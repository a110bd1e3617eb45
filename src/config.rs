// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{get_setting, set_setting};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const API_URL_ENV: &str = "MONEYFLOW_API_URL";
pub const API_URL_KEY: &str = "api_url";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiUrlSource {
    Flag,
    Env,
    Settings,
    Default,
}

/// Flag, then `MONEYFLOW_API_URL`, then the stored setting, then the local default.
pub fn resolve_api_url(conn: &Connection, flag: Option<&str>) -> Result<(String, ApiUrlSource)> {
    let env = std::env::var(API_URL_ENV).ok();
    resolve_api_url_from(conn, flag, env.as_deref())
}

pub fn resolve_api_url_from(
    conn: &Connection,
    flag: Option<&str>,
    env: Option<&str>,
) -> Result<(String, ApiUrlSource)> {
    let pick = |v: Option<&str>| v.map(str::trim).filter(|s| !s.is_empty()).map(normalize);
    if let Some(u) = pick(flag) {
        return Ok((u, ApiUrlSource::Flag));
    }
    if let Some(u) = pick(env) {
        return Ok((u, ApiUrlSource::Env));
    }
    if let Some(u) = pick(get_setting(conn, API_URL_KEY)?.as_deref()) {
        return Ok((u, ApiUrlSource::Settings));
    }
    Ok((DEFAULT_API_URL.to_string(), ApiUrlSource::Default))
}

pub fn set_api_url(conn: &Connection, url: &str) -> Result<String> {
    let url = normalize(url.trim());
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(anyhow!("API URL must start with http:// or https://, got '{}'", url));
    }
    set_setting(conn, API_URL_KEY, &url)?;
    Ok(url)
}

fn normalize(u: &str) -> String {
    u.trim_end_matches('/').to_string()
}
