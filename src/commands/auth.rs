// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::Shell;
use crate::api::ApiError;
use crate::session::oauth_login_from_callback;
use anyhow::{Result, anyhow};

pub fn login(shell: &mut Shell, sub: &clap::ArgMatches) -> Result<()> {
    let email = sub.get_one::<String>("email").unwrap().trim();
    let password = sub.get_one::<String>("password").unwrap();
    let client = shell.client()?;
    let resp = client.login(email, password).map_err(|e| match e {
        ApiError::Unauthorized | ApiError::Status { .. } => anyhow!("Invalid login information"),
        other => other.into(),
    })?;
    shell.session.sign_in(&resp.token, resp.user)?;
    username_hint(shell);
    Ok(())
}

pub fn register(shell: &mut Shell, sub: &clap::ArgMatches) -> Result<()> {
    let email = sub.get_one::<String>("email").unwrap().trim();
    let password = sub.get_one::<String>("password").unwrap();
    shell.client()?.register(email, password)?;
    println!("Registered {}. Sign in with `moneyflow login`.", email);
    Ok(())
}

pub fn logout(shell: &mut Shell) -> Result<()> {
    shell.session.sign_out()
}

pub fn handle(shell: &mut Shell, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("google-url", _)) => {
            println!("Open this URL in a browser to sign in with Google:");
            println!("{}", shell.client()?.google_auth_url());
        }
        Some(("google-callback", sub)) => {
            let callback = sub.get_one::<String>("callback").unwrap();
            let existing = shell.session.session().user.clone();
            let login = oauth_login_from_callback(callback, &existing)
                .ok_or_else(|| anyhow!("Callback carries no token; sign in again"))?;
            shell.session.sign_in(&login.token, login.user)?;
            username_hint(shell);
        }
        Some(("set-username", sub)) => set_username(shell, sub)?,
        _ => {}
    }
    Ok(())
}

fn set_username(shell: &mut Shell, sub: &clap::ArgMatches) -> Result<()> {
    let username = sub.get_one::<String>("username").unwrap().trim();
    if username.is_empty() {
        return Err(anyhow!("Username must not be blank"));
    }
    let client = shell.client()?;
    let current = shell.session.session().user.clone();
    let mut user = client
        .set_username(username)?
        .unwrap_or_else(|| current.clone());
    if user.username.is_empty() {
        user.username = username.to_string();
    }
    if user.base_currency.is_none() {
        user.base_currency = current.base_currency;
    }
    shell.session.update_profile(user)
}

fn username_hint(shell: &Shell) {
    if shell.session.session().user.username.trim().is_empty() {
        println!("No username yet. Pick one with `moneyflow auth set-username <name>`.");
    }
}
