// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::Shell;
use crate::models::ExpenseRecord;
use anyhow::{Context, Result, anyhow};
use serde_json::json;
use std::path::Path;

pub fn handle(shell: &mut Shell, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let snap = shell.load_snapshot()?;
    write_export(&snap.expenses, &fmt, Path::new(out))?;
    println!("Exported {} expenses to {}", snap.expenses.len(), out);
    Ok(())
}

/// Writes records as they came from the backend: original amount and currency, UTC dates.
pub fn write_export(expenses: &[ExpenseRecord], fmt: &str, out: &Path) -> Result<()> {
    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create {}", out.display()))?;
            wtr.write_record(["id", "date", "category", "amount", "currency", "note"])?;
            for e in expenses {
                let date = e.occurred_at.map(|t| t.to_rfc3339()).unwrap_or_default();
                let amount = e.amount_text();
                wtr.write_record([
                    e.id.as_str(),
                    date.as_str(),
                    e.category_label(),
                    amount.as_str(),
                    e.currency.as_str(),
                    e.note_text(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = expenses
                .iter()
                .map(|e| {
                    json!({
                        "id": e.id,
                        "date": e.occurred_at.map(|t| t.to_rfc3339()),
                        "category": e.category_label(),
                        "amount": e.amount_text(),
                        "currency": e.currency,
                        "note": e.note,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)
                .with_context(|| format!("Write {}", out.display()))?;
        }
        other => return Err(anyhow!("Unknown format: {} (use csv|json)", other)),
    }
    Ok(())
}
