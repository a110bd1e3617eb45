// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::Shell;
use crate::api::ApiError;
use crate::models::{SUPPORTED_CURRENCIES, UserProfile};
use crate::utils::{maybe_print_json, parse_currency, pretty_table};
use anyhow::{Result, anyhow};

pub fn handle(shell: &mut Shell, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(shell, sub)?,
        Some(("set", sub)) => set(shell, sub)?,
        _ => {}
    }
    Ok(())
}

fn show(shell: &mut Shell, sub: &clap::ArgMatches) -> Result<()> {
    let session = shell.session.session();
    if !session.is_logged_in() {
        return Err(ApiError::NotLoggedIn.into());
    }
    let user = &session.user;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), user)? {
        return Ok(());
    }
    let rows = vec![
        vec!["Name".to_string(), user.display_name().to_string()],
        vec!["Email".to_string(), user.email.clone()],
        vec!["Username".to_string(), user.username.clone()],
        vec!["Base currency".to_string(), user.base_currency().to_string()],
    ];
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}

/// Applies edits to a profile. Email stays read-only.
pub fn edited_profile(
    current: &UserProfile,
    name: Option<&str>,
    base_currency: Option<&str>,
) -> Result<UserProfile> {
    let mut user = current.clone();
    if let Some(n) = name {
        user.name = n.trim().to_string();
    }
    if let Some(c) = base_currency {
        let code = parse_currency(c)?;
        if !SUPPORTED_CURRENCIES.contains(&code.as_str()) {
            return Err(anyhow!(
                "Unsupported base currency '{}' (use one of {})",
                code,
                SUPPORTED_CURRENCIES.join(", ")
            ));
        }
        user.base_currency = Some(code);
    }
    Ok(user)
}

fn set(shell: &mut Shell, sub: &clap::ArgMatches) -> Result<()> {
    if !shell.session.session().is_logged_in() {
        return Err(ApiError::NotLoggedIn.into());
    }
    let user = edited_profile(
        &shell.session.session().user,
        sub.get_one::<String>("name").map(String::as_str),
        sub.get_one::<String>("base-currency").map(String::as_str),
    )?;
    // The backend may not expose profile updates; the local copy is saved regardless
    if let Err(e) = shell
        .client()?
        .update_profile(&user.name, user.base_currency())
    {
        tracing::warn!(error = %e, "profile sync with backend failed; keeping local changes");
    }
    shell.session.update_profile(user)
}
