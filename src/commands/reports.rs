// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::Shell;
use super::expenses::{ExpenseRow, expense_rows, print_rows};
use crate::analytics::{
    DEFAULT_DAY_WINDOW, DEFAULT_MONTH_WINDOW, DEFAULT_TOP_CATEGORIES, MonthSummary,
    ReportWindows, Total, analytics_report, day_groups, filter_records, monthly_history,
    sum_converted, todays_records,
};
use crate::models::{ExpenseRecord, RateTable};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub base_currency: String,
    pub total_today: Total,
    pub expenses: Vec<ExpenseRow>,
}

/// Today's records narrowed by the search term, and their total in `base`.
pub fn dashboard_view(
    expenses: &[ExpenseRecord],
    rates: &RateTable,
    base: &str,
    now: DateTime<Utc>,
    term: &str,
) -> DashboardView {
    let today = filter_records(todays_records(expenses, now), term);
    DashboardView {
        base_currency: base.to_string(),
        total_today: sum_converted(today.iter().copied(), rates, base),
        expenses: expense_rows(&today, rates, base),
    }
}

pub fn dashboard(shell: &mut Shell, sub: &clap::ArgMatches) -> Result<()> {
    let snap = shell.load_snapshot()?;
    let base = shell.base_currency();
    let term = sub.get_one::<String>("search").map(String::as_str).unwrap_or("");
    let view = dashboard_view(&snap.expenses, &snap.rates, &base, Utc::now(), term);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
        return Ok(());
    }
    println!(
        "Total Spent Today: {}",
        fmt_money(&view.total_today.value, &base, view.total_today.approximate)
    );
    if view.expenses.is_empty() {
        println!("No expenses today");
    } else {
        print_rows(&view.expenses, &base);
    }
    Ok(())
}

fn window(sub: &clap::ArgMatches, name: &str, default: usize) -> usize {
    sub.get_one::<u64>(name)
        .map_or(default, |n| usize::try_from(*n).unwrap_or(default))
}

pub fn analytics(shell: &mut Shell, sub: &clap::ArgMatches) -> Result<()> {
    let windows = ReportWindows {
        days: window(sub, "days", DEFAULT_DAY_WINDOW),
        months: window(sub, "months", DEFAULT_MONTH_WINDOW),
        top: window(sub, "top", DEFAULT_TOP_CATEGORIES),
    };
    let snap = shell.load_snapshot()?;
    let base = shell.base_currency();
    let report = analytics_report(&snap.expenses, &snap.rates, &base, Utc::now(), windows);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }

    println!("Last {} Days", windows.days);
    let days = report
        .last_days
        .iter()
        .map(|b| {
            vec![
                b.label.clone(),
                b.day.to_string(),
                fmt_money(&b.total, &base, b.approximate),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Day", "Date (UTC)", "Total"], days));

    println!("Last {} Months", windows.months);
    let months = report
        .last_months
        .iter()
        .map(|b| {
            vec![
                format!("{} {}", b.label, b.year),
                fmt_money(&b.total, &base, b.approximate),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Month", "Total"], months));

    println!("Category Breakdown");
    let cats = report
        .categories
        .iter()
        .map(|c| vec![c.name.clone(), fmt_money(&c.value, &base, c.approximate)])
        .collect();
    println!("{}", pretty_table(&["Category", "Spent"], cats));

    println!("Summary");
    let mut summary = vec![
        vec![
            "Total (all time)".to_string(),
            fmt_money(&report.grand_total.value, &base, report.grand_total.approximate),
        ],
        vec!["Tracked expenses".to_string(), report.tracked.to_string()],
    ];
    for (i, c) in report.top_categories.iter().enumerate() {
        summary.push(vec![
            format!("Top {}: {}", i + 1, c.name),
            fmt_money(&c.value, &base, c.approximate),
        ]);
    }
    println!("{}", pretty_table(&["", ""], summary));
    if report.grand_total.approximate {
        println!("~ some amounts had no exchange rate and are shown unconverted");
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryDay {
    pub day: NaiveDate,
    pub label: String,
    pub expenses: Vec<ExpenseRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryView {
    pub base_currency: String,
    pub days: Vec<HistoryDay>,
    pub months: Vec<MonthSummary>,
}

pub fn history_view(
    expenses: &[ExpenseRecord],
    rates: &RateTable,
    base: &str,
    now: DateTime<Utc>,
    days: usize,
) -> HistoryView {
    HistoryView {
        base_currency: base.to_string(),
        days: day_groups(expenses, now, days)
            .into_iter()
            .map(|g| HistoryDay {
                day: g.day,
                label: g.day.format("%d %b %Y, %a").to_string(),
                expenses: expense_rows(&g.records, rates, base),
            })
            .collect(),
        months: monthly_history(expenses, rates, base),
    }
}

pub fn history(shell: &mut Shell, sub: &clap::ArgMatches) -> Result<()> {
    let days = window(sub, "days", DEFAULT_DAY_WINDOW);
    let snap = shell.load_snapshot()?;
    let base = shell.base_currency();
    let view = history_view(&snap.expenses, &snap.rates, &base, Utc::now(), days);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
        return Ok(());
    }

    println!("Last {} days", days);
    for d in &view.days {
        println!("{}", d.label);
        if d.expenses.is_empty() {
            println!("  No transactions");
        } else {
            print_rows(&d.expenses, &base);
        }
    }

    println!("Monthly history");
    let months = view
        .months
        .iter()
        .map(|m| {
            vec![
                m.label.clone(),
                m.count.to_string(),
                fmt_money(&m.total, &base, m.approximate),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Month", "Transactions", "Total amount"], months)
    );
    Ok(())
}
