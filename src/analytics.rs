// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Expense aggregation over a fetched snapshot.
//!
//! Everything here is a pure function of its inputs. All calendar arithmetic is done in
//! UTC: a "day" is a UTC calendar day and a "month" a UTC calendar month, for bucketing,
//! the today filter and the date text matched by search alike.

use crate::models::{ExpenseRecord, RateTable};
use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_DAY_WINDOW: usize = 7;
pub const DEFAULT_MONTH_WINDOW: usize = 6;
pub const DEFAULT_TOP_CATEGORIES: usize = 5;
/// Windows longer than these are clamped.
pub const MAX_DAY_WINDOW: usize = 3660;
pub const MAX_MONTH_WINDOW: usize = 1200;

/// Date text matched by [`filter_records`], e.g. `07 Mar 2025 02:30 PM`.
pub const SEARCH_DATE_FORMAT: &str = "%d %b %Y %I:%M %p";

/// A converted amount. `approximate` is set when no usable rate was found and the
/// original amount was passed through unconverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub value: Decimal,
    pub approximate: bool,
}

/// Running sum of conversions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Total {
    pub value: Decimal,
    pub approximate: bool,
}

impl Total {
    /// A sum that would overflow keeps the running value and is flagged approximate.
    pub fn add(&mut self, c: Conversion) {
        match self.value.checked_add(c.value) {
            Some(v) => self.value = v,
            None => self.approximate = true,
        }
        self.approximate |= c.approximate;
    }
}

/// Converts `amount` in `from` into `base`.
///
/// Missing or zero amounts give zero. Same currency is the identity. If either rate is
/// missing (or the source rate is zero) the amount comes back unchanged and flagged
/// approximate.
pub fn convert_checked(
    amount: Option<Decimal>,
    from: &str,
    rates: &RateTable,
    base: &str,
) -> Conversion {
    let amount = match amount {
        Some(a) if !a.is_zero() => a,
        _ => {
            return Conversion {
                value: Decimal::ZERO,
                approximate: false,
            };
        }
    };
    if from == base {
        return Conversion {
            value: amount,
            approximate: false,
        };
    }
    let converted = match (rates.get(from), rates.get(base)) {
        (Some(rf), Some(rb)) if !rf.is_zero() && !rb.is_zero() => {
            amount.checked_div(*rf).and_then(|v| v.checked_mul(*rb))
        }
        _ => None,
    };
    match converted {
        Some(value) => Conversion {
            value,
            approximate: false,
        },
        None => Conversion {
            value: amount,
            approximate: true,
        },
    }
}

pub fn convert(amount: Option<Decimal>, from: &str, rates: &RateTable, base: &str) -> Decimal {
    convert_checked(amount, from, rates, base).value
}

pub fn convert_record(e: &ExpenseRecord, rates: &RateTable, base: &str) -> Conversion {
    convert_checked(e.amount, &e.currency, rates, base)
}

pub fn sum_converted<'a, I>(records: I, rates: &RateTable, base: &str) -> Total
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    let mut total = Total::default();
    for e in records {
        total.add(convert_record(e, rates, base));
    }
    total
}

pub fn grand_total(expenses: &[ExpenseRecord], rates: &RateTable, base: &str) -> Total {
    sum_converted(expenses, rates, base)
}

/// Closed instant range covering one UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayRange {
    pub fn of(day: NaiveDate) -> Option<Self> {
        let start = Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0)?);
        let end = start + Duration::days(1) - Duration::nanoseconds(1);
        Some(Self { start, end })
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }

    pub fn contains_record(&self, e: &ExpenseRecord) -> bool {
        e.occurred_at.is_some_and(|t| self.contains(t))
    }
}

/// The trailing `n` UTC days ending at `now`, newest first. `n` is clamped to
/// [`MAX_DAY_WINDOW`] and the walk stops at the earliest representable date.
fn trailing_days(now: DateTime<Utc>, n: usize) -> Vec<(NaiveDate, DayRange)> {
    let today = now.date_naive();
    (0..n.min(MAX_DAY_WINDOW) as u64)
        .map_while(|i| {
            let day = today.checked_sub_days(Days::new(i))?;
            Some((day, DayRange::of(day)?))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub day: NaiveDate,
    pub label: String,
    pub total: Decimal,
    pub approximate: bool,
}

/// Per-day totals for the trailing `n` days, oldest first; the last bucket is today.
/// Days without records are present with a zero total.
pub fn last_n_days(
    expenses: &[ExpenseRecord],
    rates: &RateTable,
    base: &str,
    now: DateTime<Utc>,
    n: usize,
) -> Vec<DayBucket> {
    let mut days = trailing_days(now, n);
    days.reverse();
    days.into_iter()
        .map(|(day, range)| {
            let total = sum_converted(
                expenses.iter().filter(|e| range.contains_record(e)),
                rates,
                base,
            );
            DayBucket {
                day,
                label: day.format("%a").to_string(),
                total: total.value,
                approximate: total.approximate,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup<'a> {
    pub day: NaiveDate,
    pub records: Vec<&'a ExpenseRecord>,
}

/// Records of each of the trailing `n` days, newest day first, records in input order.
pub fn day_groups(expenses: &[ExpenseRecord], now: DateTime<Utc>, n: usize) -> Vec<DayGroup<'_>> {
    trailing_days(now, n)
        .into_iter()
        .map(|(day, range)| DayGroup {
            day,
            records: expenses.iter().filter(|e| range.contains_record(e)).collect(),
        })
        .collect()
}

/// Records whose instant falls on `now`'s UTC day.
pub fn todays_records<'a, I>(expenses: I, now: DateTime<Utc>) -> Vec<&'a ExpenseRecord>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    match DayRange::of(now.date_naive()) {
        Some(range) => expenses
            .into_iter()
            .filter(|e| range.contains_record(e))
            .collect(),
        None => Vec::new(),
    }
}

/// Shifts (year, month) back by `back` months; month is 1-based. `None` once the year
/// leaves `i32`.
fn months_back(year: i32, month: u32, back: i64) -> Option<(i32, u32)> {
    let idx = (i64::from(year) * 12 + i64::from(month) - 1).checked_sub(back)?;
    let year = i32::try_from(idx.div_euclid(12)).ok()?;
    Some((year, (idx.rem_euclid(12) + 1) as u32))
}

fn month_start(year: i32, month: u32) -> Option<DateTime<Utc>> {
    let d = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub total: Decimal,
    pub approximate: bool,
}

/// Per-month totals for the trailing `m` months including the current one, oldest first.
/// Each month covers `[first of month, first of next month)`. `m` is clamped to
/// [`MAX_MONTH_WINDOW`]; months chrono cannot represent are skipped.
pub fn last_m_months(
    expenses: &[ExpenseRecord],
    rates: &RateTable,
    base: &str,
    now: DateTime<Utc>,
    m: usize,
) -> Vec<MonthBucket> {
    let mut out = Vec::new();
    for back in (0..m.min(MAX_MONTH_WINDOW) as i64).rev() {
        let Some((year, month)) = months_back(now.year(), now.month(), back) else {
            continue;
        };
        let Some((next_year, next_month)) = months_back(year, month, -1) else {
            continue;
        };
        let (Some(start), Some(end)) = (month_start(year, month), month_start(next_year, next_month))
        else {
            continue;
        };
        let total = sum_converted(
            expenses
                .iter()
                .filter(|e| e.occurred_at.is_some_and(|t| start <= t && t < end)),
            rates,
            base,
        );
        out.push(MonthBucket {
            year,
            month,
            label: start.format("%b").to_string(),
            total: total.value,
            approximate: total.approximate,
        });
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub count: usize,
    pub total: Decimal,
    pub approximate: bool,
}

/// Every month holding at least one dated record, newest first.
pub fn monthly_history(
    expenses: &[ExpenseRecord],
    rates: &RateTable,
    base: &str,
) -> Vec<MonthSummary> {
    let mut map: BTreeMap<(i32, u32), (usize, Total)> = BTreeMap::new();
    for e in expenses {
        let Some(t) = e.occurred_at else { continue };
        let entry = map.entry((t.year(), t.month())).or_default();
        entry.0 += 1;
        entry.1.add(convert_record(e, rates, base));
    }
    map.into_iter()
        .rev()
        .map(|((year, month), (count, total))| MonthSummary {
            year,
            month,
            label: NaiveDate::from_ymd_opt(year, month, 1)
                .map(|d| d.format("%B %Y").to_string())
                .unwrap_or_else(|| format!("{year}-{month:02}")),
            count,
            total: total.value,
            approximate: total.approximate,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    pub value: Decimal,
    pub approximate: bool,
}

/// One entry per category in first-seen order.
pub fn by_category(
    expenses: &[ExpenseRecord],
    rates: &RateTable,
    base: &str,
) -> Vec<CategoryTotal> {
    let mut names: Vec<&str> = Vec::new();
    let mut totals: Vec<Total> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for e in expenses {
        let name = e.category_label();
        let i = *index.entry(name).or_insert_with(|| {
            names.push(name);
            totals.push(Total::default());
            names.len() - 1
        });
        totals[i].add(convert_record(e, rates, base));
    }
    names
        .into_iter()
        .zip(totals)
        .map(|(name, t)| CategoryTotal {
            name: name.to_string(),
            value: t.value,
            approximate: t.approximate,
        })
        .collect()
}

/// Highest `k` categories by value. The sort is stable, so ties keep first-seen order.
pub fn top_categories(categories: &[CategoryTotal], k: usize) -> Vec<CategoryTotal> {
    let mut ranked = categories.to_vec();
    ranked.sort_by(|a, b| b.value.cmp(&a.value));
    ranked.truncate(k);
    ranked
}

/// Case-insensitive search over category, note, amount and formatted date.
/// A blank term keeps everything.
pub fn filter_records<'a, I>(records: I, term: &str) -> Vec<&'a ExpenseRecord>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return records.into_iter().collect();
    }
    records
        .into_iter()
        .filter(|e| matches_term(e, &term))
        .collect()
}

fn matches_term(e: &ExpenseRecord, term: &str) -> bool {
    if e.category_label().to_lowercase().contains(term)
        || e.note_text().to_lowercase().contains(term)
        || e.amount_text().contains(term)
    {
        return true;
    }
    e.occurred_at.is_some_and(|t| {
        t.format(SEARCH_DATE_FORMAT)
            .to_string()
            .to_lowercase()
            .contains(term)
    })
}

/// Everything the analytics view shows, computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub base_currency: String,
    pub last_days: Vec<DayBucket>,
    pub last_months: Vec<MonthBucket>,
    pub categories: Vec<CategoryTotal>,
    pub top_categories: Vec<CategoryTotal>,
    pub grand_total: Total,
    pub tracked: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindows {
    pub days: usize,
    pub months: usize,
    pub top: usize,
}

impl Default for ReportWindows {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAY_WINDOW,
            months: DEFAULT_MONTH_WINDOW,
            top: DEFAULT_TOP_CATEGORIES,
        }
    }
}

pub fn analytics_report(
    expenses: &[ExpenseRecord],
    rates: &RateTable,
    base: &str,
    now: DateTime<Utc>,
    windows: ReportWindows,
) -> AnalyticsReport {
    let categories = by_category(expenses, rates, base);
    let top = top_categories(&categories, windows.top);
    AnalyticsReport {
        base_currency: base.to_string(),
        last_days: last_n_days(expenses, rates, base, now, windows.days),
        last_months: last_m_months(expenses, rates, base, now, windows.months),
        categories,
        top_categories: top,
        grand_total: grand_total(expenses, rates, base),
        tracked: expenses.len(),
    }
}
