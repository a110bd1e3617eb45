// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::Shell;
use crate::config::{resolve_api_url, set_api_url};
use crate::db::db_path;
use crate::utils::pretty_table;
use anyhow::Result;

pub fn handle(shell: &mut Shell, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let conn = shell.session.conn();
            let (_, source) = resolve_api_url(conn, None)?;
            let session = shell.session.session();
            let signed_in = if session.is_logged_in() {
                session.user.display_name().to_string()
            } else {
                "(signed out)".to_string()
            };
            let rows = vec![
                vec!["API URL".to_string(), shell.api_url.clone()],
                vec!["API URL source (without flag)".to_string(), format!("{:?}", source)],
                vec!["Local store".to_string(), db_path()?.display().to_string()],
                vec!["Signed in as".to_string(), signed_in],
                vec!["Base currency".to_string(), session.base_currency().to_string()],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
        Some(("set-api-url", sub)) => {
            let url = set_api_url(shell.session.conn(), sub.get_one::<String>("url").unwrap())?;
            println!("API URL set to {}", url);
        }
        _ => {}
    }
    Ok(())
}
