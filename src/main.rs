// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use moneyflow::commands::{self, Shell};
use moneyflow::session::{SessionContext, SessionEvent};
use moneyflow::{cli, config, db, utils};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();
    utils::init_tracing(matches.get_count("verbose"));

    let conn = db::open_or_init()?;
    let flag_url = matches.get_one::<String>("api-url").map(String::as_str);
    let (api_url, source) = config::resolve_api_url(&conn, flag_url)?;
    tracing::debug!(%api_url, ?source, "backend selected");

    let mut session = SessionContext::load(&conn)?;
    let events = session.subscribe();
    let mut shell = Shell::new(session, api_url);

    match matches.subcommand() {
        Some(("login", sub)) => commands::auth::login(&mut shell, sub)?,
        Some(("register", sub)) => commands::auth::register(&mut shell, sub)?,
        Some(("logout", _)) => commands::auth::logout(&mut shell)?,
        Some(("auth", sub)) => commands::auth::handle(&mut shell, sub)?,
        Some(("profile", sub)) => commands::profile::handle(&mut shell, sub)?,
        Some(("expense", sub)) => commands::expenses::handle(&mut shell, sub)?,
        Some(("dashboard", sub)) => commands::reports::dashboard(&mut shell, sub)?,
        Some(("analytics", sub)) => commands::reports::analytics(&mut shell, sub)?,
        Some(("history", sub)) => commands::reports::history(&mut shell, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&mut shell, sub)?,
        Some(("config", sub)) => commands::config::handle(&mut shell, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }

    for event in events.try_iter() {
        match event {
            SessionEvent::SignedIn(user) => println!("Signed in as {}", user.display_name()),
            SessionEvent::ProfileChanged(user) => println!(
                "Profile saved ({}, base currency {})",
                user.display_name(),
                user.base_currency()
            ),
            SessionEvent::SignedOut => println!("Signed out"),
        }
    }
    Ok(())
}
