// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::{MAX_DAY_WINDOW, MAX_MONTH_WINDOW};
use clap::{Arg, ArgAction, Command, value_parser};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn credentials(cmd: Command) -> Command {
    cmd.arg(Arg::new("email").long("email").required(true))
        .arg(Arg::new("password").long("password").required(true))
}

fn search_arg() -> Arg {
    Arg::new("search")
        .long("search")
        .short('s')
        .help("Case-insensitive match on category, note, amount or date")
}

fn days_arg() -> Arg {
    Arg::new("days")
        .long("days")
        .value_parser(value_parser!(u64).range(1..=MAX_DAY_WINDOW as u64))
        .help("Days to cover, ending today (default 7)")
}

pub fn build_cli() -> Command {
    Command::new("moneyflow")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Track expenses against a MoneyFlow backend and summarise them in your base currency")
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .global(true)
                .help("Backend base URL (overrides MONEYFLOW_API_URL and the stored setting)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("More log output on stderr (-v debug, -vv trace)"),
        )
        .subcommand(credentials(Command::new("login").about("Sign in with email and password")))
        .subcommand(credentials(Command::new("register").about("Create an account")))
        .subcommand(Command::new("logout").about("Forget the stored session"))
        .subcommand(
            Command::new("auth")
                .about("Google sign-in and username setup")
                .subcommand(Command::new("google-url").about("Print the Google sign-in URL"))
                .subcommand(
                    Command::new("google-callback")
                        .about("Finish Google sign-in from the callback URL or its query string")
                        .arg(Arg::new("callback").required(true)),
                )
                .subcommand(
                    Command::new("set-username")
                        .about("Choose a username after first sign-in")
                        .arg(Arg::new("username").required(true)),
                ),
        )
        .subcommand(
            Command::new("profile")
                .about("Show or edit the signed-in profile")
                .subcommand(json_args(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("name").long("name"))
                        .arg(
                            Arg::new("base-currency")
                                .long("base-currency")
                                .help("One of INR, USD, EUR, GBP"),
                        ),
                ),
        )
        .subcommand(
            Command::new("expense")
                .about("Record, list and delete expenses")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("category").long("category").default_value("Food"))
                        .arg(Arg::new("currency").long("currency").default_value("INR"))
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(
                    Command::new("rm").arg(Arg::new("id").long("id").required(true)),
                )
                .subcommand(json_args(
                    Command::new("list")
                        .arg(
                            Arg::new("today")
                                .long("today")
                                .action(ArgAction::SetTrue)
                                .help("Only today's expenses (UTC day)"),
                        )
                        .arg(search_arg()),
                )),
        )
        .subcommand(json_args(
            Command::new("dashboard")
                .about("Today's expenses and total in the base currency")
                .arg(search_arg()),
        ))
        .subcommand(json_args(
            Command::new("analytics")
                .about("Daily, monthly and category breakdowns")
                .arg(days_arg())
                .arg(
                    Arg::new("months")
                        .long("months")
                        .value_parser(value_parser!(u64).range(1..=MAX_MONTH_WINDOW as u64))
                        .help("Months in the monthly chart (default 6)"),
                )
                .arg(
                    Arg::new("top")
                        .long("top")
                        .value_parser(value_parser!(u64).range(1..=100))
                        .help("Categories in the top list (default 5)"),
                ),
        ))
        .subcommand(json_args(
            Command::new("history")
                .about("Per-day records for recent days and all-time monthly totals")
                .arg(days_arg()),
        ))
        .subcommand(
            Command::new("export")
                .about("Write the current expense list to a file")
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_parser(["csv", "json"])
                        .default_value("csv"),
                )
                .arg(Arg::new("out").long("out").required(true)),
        )
        .subcommand(
            Command::new("config")
                .about("Client settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set-api-url").arg(Arg::new("url").required(true)),
                ),
        )
}
