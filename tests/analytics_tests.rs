// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use moneyflow::analytics::{
    DEFAULT_TOP_CATEGORIES, MAX_DAY_WINDOW, MAX_MONTH_WINDOW, ReportWindows, analytics_report, by_category, convert,
    convert_checked, day_groups, filter_records, grand_total, last_m_months, last_n_days,
    monthly_history, sum_converted, todays_records, top_categories,
};
use moneyflow::models::{ExpenseRecord, RateTable};
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn rec(id: &str, amount: &str, ccy: &str, cat: Option<&str>, when: &str) -> ExpenseRecord {
    ExpenseRecord {
        id: id.to_string(),
        amount: Some(d(amount)),
        currency: ccy.to_string(),
        category: cat.map(str::to_string),
        note: None,
        occurred_at: Some(at(when)),
    }
}

fn rates() -> RateTable {
    let mut r = RateTable::new();
    r.insert("USD".into(), d("80"));
    r.insert("INR".into(), d("1"));
    r
}

const NOW: &str = "2025-03-15T12:00:00Z";

#[test]
fn same_currency_is_identity() {
    let a = d("123.45");
    assert_eq!(convert(Some(a), "INR", &rates(), "INR"), a);
    assert_eq!(convert(Some(a), "XYZ", &RateTable::new(), "XYZ"), a);
    assert!(!convert_checked(Some(a), "INR", &RateTable::new(), "INR").approximate);
}

#[test]
fn missing_rate_passes_amount_through_and_flags_it() {
    let c = convert_checked(Some(d("40")), "EUR", &rates(), "INR");
    assert_eq!(c.value, d("40"));
    assert!(c.approximate);

    // base itself missing from the table
    let c = convert_checked(Some(d("40")), "USD", &rates(), "GBP");
    assert_eq!(c.value, d("40"));
    assert!(c.approximate);
}

#[test]
fn cross_currency_uses_anchor_rates() {
    assert_eq!(convert(Some(d("100")), "USD", &rates(), "INR"), d("1.25"));

    let mut r = rates();
    r.insert("EUR".into(), d("0.5"));
    // 10 / 0.5 * 1
    assert_eq!(convert(Some(d("10")), "EUR", &r, "INR"), d("20"));
    assert_eq!(convert(Some(d("20")), "INR", &r, "EUR"), d("10"));
}

#[test]
fn zero_or_missing_amount_converts_to_zero() {
    assert_eq!(convert(None, "USD", &rates(), "INR"), Decimal::ZERO);
    assert_eq!(convert(Some(Decimal::ZERO), "EUR", &rates(), "INR"), Decimal::ZERO);
    assert!(!convert_checked(None, "EUR", &rates(), "INR").approximate);
}

#[test]
fn zero_rate_falls_back_instead_of_dividing() {
    let mut r = rates();
    r.insert("JPY".into(), Decimal::ZERO);
    let c = convert_checked(Some(d("500")), "JPY", &r, "INR");
    assert_eq!(c.value, d("500"));
    assert!(c.approximate);
}

#[test]
fn day_window_always_has_n_buckets_oldest_first() {
    let empty = last_n_days(&[], &rates(), "INR", at(NOW), 7);
    assert_eq!(empty.len(), 7);
    assert!(empty.iter().all(|b| b.total.is_zero()));
    assert_eq!(empty[0].day, NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
    assert_eq!(empty[6].day, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
    assert_eq!(empty[6].label, "Sat");

    let some = vec![rec("a", "10", "INR", Some("Food"), "2025-03-12T08:00:00Z")];
    let buckets = last_n_days(&some, &rates(), "INR", at(NOW), 7);
    assert_eq!(buckets.len(), 7);
    assert_eq!(buckets[3].total, d("10"));
    assert_eq!(buckets.iter().map(|b| b.total).sum::<Decimal>(), d("10"));
}

#[test]
fn day_boundaries_are_closed_and_utc() {
    let expenses = vec![
        rec("start", "1", "INR", None, "2025-03-14T00:00:00Z"),
        rec("end", "2", "INR", None, "2025-03-13T23:59:59.999999999Z"),
        // 23:30 on the 14th in UTC-05:00 is already the 15th in UTC
        rec("offset", "4", "INR", None, "2025-03-14T23:30:00-05:00"),
    ];
    let buckets = last_n_days(&expenses, &rates(), "INR", at(NOW), 7);
    assert_eq!(buckets[4].day, NaiveDate::from_ymd_opt(2025, 3, 13).unwrap());
    assert_eq!(buckets[4].total, d("2"));
    assert_eq!(buckets[5].total, d("1"));
    assert_eq!(buckets[6].total, d("4"));
}

#[test]
fn month_window_rolls_over_the_year() {
    let now = at("2025-03-10T09:00:00Z");
    let expenses = vec![
        rec("sep", "100", "INR", None, "2024-09-30T23:59:59Z"),
        rec("nov", "5", "INR", None, "2024-11-30T23:59:59Z"),
        rec("dec", "7", "INR", None, "2024-12-01T00:00:00Z"),
        rec("jan", "80", "USD", None, "2025-01-15T00:00:00Z"),
        rec("mar", "3", "INR", None, "2025-03-01T00:00:00Z"),
    ];
    let months = last_m_months(&expenses, &rates(), "INR", now, 6);
    let labels: Vec<_> = months.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(labels, ["Oct", "Nov", "Dec", "Jan", "Feb", "Mar"]);
    let years: Vec<_> = months.iter().map(|m| m.year).collect();
    assert_eq!(years, [2024, 2024, 2024, 2025, 2025, 2025]);
    let totals: Vec<_> = months.iter().map(|m| m.total).collect();
    assert_eq!(
        totals,
        [d("0"), d("5"), d("7"), d("1"), d("0"), d("3")]
    );
}

#[test]
fn month_window_spanning_more_than_a_year() {
    let months = last_m_months(&[], &rates(), "INR", at("2025-01-31T00:00:00Z"), 14);
    assert_eq!(months.len(), 14);
    assert_eq!((months[0].year, months[0].month), (2023, 12));
    assert_eq!((months[13].year, months[13].month), (2025, 1));
}

#[test]
fn blank_categories_collapse_into_other() {
    let expenses = vec![
        rec("0", "1", "INR", Some("Food"), NOW),
        rec("1", "10", "INR", None, NOW),
        rec("2", "5", "INR", Some(""), NOW),
        rec("3", "4", "INR", Some("Food"), NOW),
    ];
    let cats = by_category(&expenses, &rates(), "INR");
    assert_eq!(cats.len(), 2);
    assert_eq!(cats[0].name, "Food");
    assert_eq!(cats[0].value, d("5"));
    assert_eq!(cats[1].name, "Other");
    assert_eq!(cats[1].value, d("15"));
}

#[test]
fn labels_are_grouped_verbatim() {
    let expenses = vec![
        rec("0", "1", "INR", Some("Food"), NOW),
        rec("1", "2", "INR", Some(" Food"), NOW),
        rec("2", "3", "INR", Some("   "), NOW),
    ];
    let cats = by_category(&expenses, &rates(), "INR");
    let names: Vec<_> = cats.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Food", " Food", "   "]);
}

#[test]
fn overflowing_sums_are_flagged_not_fatal() {
    let huge = |id: &str| rec(id, "50000000000000000000000000000", "INR", Some("Bills"), NOW);
    let expenses = vec![huge("a"), huge("b"), rec("c", "1", "INR", Some("Food"), NOW)];
    let r = RateTable::new();

    let total = grand_total(&expenses, &r, "INR");
    assert!(total.approximate);
    assert_eq!(total.value, d("50000000000000000000000000001"));

    let cats = by_category(&expenses, &r, "INR");
    assert_eq!(cats[0].value, d("50000000000000000000000000000"));
    assert!(cats[0].approximate);
    assert!(!cats[1].approximate);

    let days = last_n_days(&expenses, &r, "INR", at(NOW), 7);
    assert!(days[6].approximate);
    let months = last_m_months(&expenses, &r, "INR", at(NOW), 6);
    assert!(months[5].approximate);
    assert!(monthly_history(&expenses, &r, "INR")[0].approximate);
}

#[test]
fn oversized_windows_are_clamped() {
    let days = last_n_days(&[], &rates(), "INR", at(NOW), usize::MAX);
    assert_eq!(days.len(), MAX_DAY_WINDOW);
    assert_eq!(days.last().unwrap().day, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
    assert_eq!(day_groups(&[], at(NOW), usize::MAX).len(), MAX_DAY_WINDOW);

    let months = last_m_months(&[], &rates(), "INR", at(NOW), usize::MAX / 2);
    assert_eq!(months.len(), MAX_MONTH_WINDOW);
    assert_eq!((months[0].year, months[0].month), (1925, 4));
    assert_eq!((months[1199].year, months[1199].month), (2025, 3));
}

#[test]
fn ranking_is_descending_with_stable_ties() {
    let expenses = vec![
        rec("a", "10", "INR", Some("Bills"), NOW),
        rec("b", "30", "INR", Some("Food"), NOW),
        rec("c", "10", "INR", Some("Health"), NOW),
        rec("d", "50", "INR", Some("Shopping"), NOW),
        rec("e", "10", "INR", Some("Transport"), NOW),
        rec("f", "1", "INR", Some("Other"), NOW),
        rec("g", "10", "INR", Some("Entertainment"), NOW),
    ];
    let cats = by_category(&expenses, &rates(), "INR");
    let top = top_categories(&cats, DEFAULT_TOP_CATEGORIES);
    let names: Vec<_> = top.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Shopping", "Food", "Bills", "Health", "Transport"]);

    assert!(top_categories(&cats, 0).is_empty());
    assert_eq!(top_categories(&cats, 100).len(), 7);
}

#[test]
fn empty_search_keeps_everything_in_order() {
    let expenses = vec![
        rec("a", "1", "INR", Some("Food"), NOW),
        rec("b", "2", "INR", Some("Bills"), NOW),
        rec("c", "3", "INR", Some("Food"), NOW),
    ];
    let ids = |v: Vec<&ExpenseRecord>| v.iter().map(|e| e.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(filter_records(&expenses, "")), ["a", "b", "c"]);
    assert_eq!(ids(filter_records(&expenses, "   ")), ["a", "b", "c"]);
}

#[test]
fn search_is_case_insensitive_across_fields() {
    let mut noted = rec("n", "42.5", "USD", Some("Transport"), "2025-03-15T14:05:00Z");
    noted.note = Some("Airport Taxi".into());
    let expenses = vec![rec("f", "7", "INR", Some("Food"), "2025-03-14T09:00:00Z"), noted];
    let ids = |term: &str| {
        filter_records(&expenses, term)
            .iter()
            .map(|e| e.id.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(ids("FOOD"), ["f"]);
    assert_eq!(ids("taxi"), ["n"]);
    assert_eq!(ids("42.5"), ["n"]);
    assert_eq!(ids("15 mar 2025"), ["n"]);
    assert_eq!(ids("02:05 pm"), ["n"]);
    assert_eq!(ids("mar 2025"), ["f", "n"]);
    assert!(ids("groceries").is_empty());
}

#[test]
fn search_matches_the_other_label() {
    let expenses = vec![rec("x", "1", "INR", Some(""), NOW)];
    assert_eq!(filter_records(&expenses, "other").len(), 1);
}

#[test]
fn today_filter_uses_the_utc_day() {
    let expenses = vec![
        rec("yesterday", "1", "INR", None, "2025-03-14T23:59:59Z"),
        rec("midnight", "2", "INR", None, "2025-03-15T00:00:00Z"),
        rec("late", "3", "INR", None, "2025-03-15T23:59:59.999Z"),
        rec("tomorrow", "4", "INR", None, "2025-03-16T00:00:00Z"),
    ];
    let today: Vec<_> = todays_records(&expenses, at(NOW))
        .iter()
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(today, ["midnight", "late"]);
}

#[test]
fn undated_records_skip_time_views_but_still_count() {
    let mut undated = rec("u", "9", "INR", Some("Bills"), NOW);
    undated.occurred_at = None;
    let expenses = vec![undated, rec("t", "1", "INR", Some("Food"), NOW)];

    assert_eq!(todays_records(&expenses, at(NOW)).len(), 1);
    let days = last_n_days(&expenses, &rates(), "INR", at(NOW), 7);
    assert_eq!(days[6].total, d("1"));
    let months = last_m_months(&expenses, &rates(), "INR", at(NOW), 6);
    assert_eq!(months[5].total, d("1"));
    assert_eq!(monthly_history(&expenses, &rates(), "INR")[0].count, 1);

    assert_eq!(grand_total(&expenses, &rates(), "INR").value, d("10"));
    assert_eq!(by_category(&expenses, &rates(), "INR").len(), 2);
}

#[test]
fn todays_total_and_breakdown_in_base_currency() {
    let expenses = vec![
        rec("1", "100", "USD", Some("Food"), "2025-03-15T10:00:00Z"),
        rec("2", "50", "INR", Some("Food"), "2025-03-15T14:00:00Z"),
    ];
    let r = rates();
    let today = todays_records(&expenses, at(NOW));
    let total = sum_converted(today, &r, "INR");
    assert_eq!(total.value, d("51.25"));
    assert!(!total.approximate);

    let cats = by_category(&expenses, &r, "INR");
    assert_eq!(cats.len(), 1);
    assert_eq!(cats[0].name, "Food");
    assert_eq!(cats[0].value, d("51.25"));
}

#[test]
fn approximate_flag_reaches_aggregates() {
    let expenses = vec![
        rec("1", "10", "EUR", Some("Food"), NOW),
        rec("2", "10", "INR", Some("Bills"), NOW),
    ];
    let r = rates();
    let days = last_n_days(&expenses, &r, "INR", at(NOW), 7);
    assert!(days[6].approximate);
    assert!(!days[5].approximate);
    let cats = by_category(&expenses, &r, "INR");
    assert!(cats[0].approximate);
    assert!(!cats[1].approximate);
    assert!(grand_total(&expenses, &r, "INR").approximate);
}

#[test]
fn history_groups_newest_first() {
    let expenses = vec![
        rec("old", "5", "INR", None, "2024-12-31T10:00:00Z"),
        rec("a", "1", "INR", None, "2025-03-15T08:00:00Z"),
        rec("b", "2", "INR", None, "2025-03-13T08:00:00Z"),
        rec("c", "80", "USD", None, "2025-03-15T09:00:00Z"),
    ];
    let groups = day_groups(&expenses, at(NOW), 7);
    assert_eq!(groups.len(), 7);
    assert_eq!(groups[0].day, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
    let ids: Vec<_> = groups[0].records.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["a", "c"]);
    assert_eq!(groups[2].records.len(), 1);
    assert!(groups[1].records.is_empty());

    let months = monthly_history(&expenses, &rates(), "INR");
    assert_eq!(months.len(), 2);
    assert_eq!(months[0].label, "March 2025");
    assert_eq!(months[0].count, 3);
    assert_eq!(months[0].total, d("4"));
    assert_eq!(months[1].label, "December 2024");
}

#[test]
fn report_on_empty_snapshot_is_all_zero() {
    let report = analytics_report(
        &[],
        &RateTable::new(),
        "INR",
        at(NOW),
        ReportWindows::default(),
    );
    assert_eq!(report.last_days.len(), 7);
    assert_eq!(report.last_months.len(), 6);
    assert!(report.categories.is_empty());
    assert!(report.top_categories.is_empty());
    assert_eq!(report.grand_total.value, Decimal::ZERO);
    assert_eq!(report.tracked, 0);
}
