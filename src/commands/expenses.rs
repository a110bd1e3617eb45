// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::Shell;
use crate::analytics::{convert_record, filter_records, todays_records};
use crate::models::{
    EXPENSE_CATEGORIES, ExpenseRecord, FALLBACK_CATEGORY, NewExpense, RateTable,
    SUPPORTED_CURRENCIES,
};
use crate::utils::{
    fmt_instant, fmt_money, maybe_print_json, parse_amount, parse_currency, pretty_table,
};
use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(shell: &mut Shell, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(shell, sub)?,
        Some(("rm", sub)) => rm(shell, sub)?,
        Some(("list", sub)) => list(shell, sub)?,
        _ => {}
    }
    Ok(())
}

/// Validates the add form the same way the backend's client form does.
pub fn new_expense(
    amount: &str,
    category: &str,
    currency: &str,
    note: Option<&str>,
) -> Result<NewExpense> {
    let amount = parse_amount(amount)?;
    let currency = parse_currency(currency)?;
    if !SUPPORTED_CURRENCIES.contains(&currency.as_str()) {
        return Err(anyhow!(
            "Unsupported currency '{}' (use one of {})",
            currency,
            SUPPORTED_CURRENCIES.join(", ")
        ));
    }
    let category = match category.trim() {
        "" => FALLBACK_CATEGORY.to_string(),
        c => c.to_string(),
    };
    if !EXPENSE_CATEGORIES.contains(&category.as_str()) {
        tracing::debug!(%category, "category outside the standard list");
    }
    Ok(NewExpense {
        amount,
        category,
        note: note.map(str::trim).unwrap_or_default().to_string(),
        currency,
    })
}

fn add(shell: &mut Shell, sub: &clap::ArgMatches) -> Result<()> {
    let new = new_expense(
        sub.get_one::<String>("amount").unwrap(),
        sub.get_one::<String>("category").unwrap(),
        sub.get_one::<String>("currency").unwrap(),
        sub.get_one::<String>("note").map(String::as_str),
    )?;
    let created = shell.client()?.add_expense(&new)?;
    tracing::info!(id = %created.id, "expense created");
    println!(
        "Recorded {} {} under '{}'",
        new.amount, new.currency, new.category
    );
    Ok(())
}

fn rm(shell: &mut Shell, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap().trim();
    if id.is_empty() {
        return Err(anyhow!("Expense id must not be blank"));
    }
    shell.client()?.delete_expense(id)?;
    println!("Deleted expense {}", id);
    Ok(())
}

fn list(shell: &mut Shell, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let snap = shell.load_snapshot()?;
    let base = shell.base_currency();
    let picked = select_records(
        &snap.expenses,
        sub.get_flag("today"),
        sub.get_one::<String>("search").map(String::as_str),
        Utc::now(),
    );
    let rows = expense_rows(&picked, &snap.rates, &base);
    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        print_rows(&rows, &base);
    }
    Ok(())
}

/// Optionally narrows to today's records, then applies the search term.
pub fn select_records<'a>(
    expenses: &'a [ExpenseRecord],
    today_only: bool,
    term: Option<&str>,
    now: DateTime<Utc>,
) -> Vec<&'a ExpenseRecord> {
    let scoped: Vec<&ExpenseRecord> = if today_only {
        todays_records(expenses, now)
    } else {
        expenses.iter().collect()
    };
    filter_records(scoped, term.unwrap_or(""))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseRow {
    pub id: String,
    pub date: String,
    pub category: String,
    pub amount: String,
    pub currency: String,
    pub converted: Decimal,
    pub approximate: bool,
    pub note: String,
}

pub fn expense_rows(records: &[&ExpenseRecord], rates: &RateTable, base: &str) -> Vec<ExpenseRow> {
    records
        .iter()
        .map(|e| {
            let c = convert_record(e, rates, base);
            ExpenseRow {
                id: e.id.clone(),
                date: fmt_instant(e.occurred_at),
                category: e.category_label().to_string(),
                amount: e.amount_text(),
                currency: e.currency.clone(),
                converted: c.value,
                approximate: c.approximate,
                note: e.note_text().to_string(),
            }
        })
        .collect()
}

pub fn print_rows(rows: &[ExpenseRow], base: &str) {
    if rows.is_empty() {
        println!("No expenses");
        return;
    }
    let data = rows
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.date.clone(),
                r.category.clone(),
                format!("{} {}", r.currency, r.amount),
                fmt_money(&r.converted, base, r.approximate),
                r.note.clone(),
            ]
        })
        .collect();
    let converted_hdr = format!("In {}", base);
    println!(
        "{}",
        pretty_table(
            &["Id", "Date (UTC)", "Category", "Amount", &converted_hdr, "Note"],
            data
        )
    );
}
