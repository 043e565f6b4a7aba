#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

fn make_expense(id: i64, category: &str, date: &str, amount: Decimal, title: &str) -> Expense {
    let mut e = Expense::new(category.into(), date.into(), amount).with_title(title);
    e.id = Some(id);
    e
}

/// The six-row sample in storage order.
fn sample() -> Vec<Expense> {
    vec![
        make_expense(1, "Food", "1/1/2021", dec!(42.50), "Weekly Groceries"),
        make_expense(2, "Food", "9/12/2020", dec!(350.12), "Way too much pizza"),
        make_expense(3, "Bills", "5/5/2020", dec!(600.00), "Rent"),
        make_expense(4, "Food", "9/9/1900", dec!(10.00), "Monthly Groceries"),
        make_expense(5, "DEMO_CAT", "1/1/1111", dec!(11.11), "TEST_DUPES"),
        make_expense(6, "DEMO_CAT", "1/1/1111", dec!(11.11), "TEST_DUPES"),
    ]
}

fn ids(expenses: &[Expense]) -> Vec<i64> {
    expenses.iter().filter_map(|e| e.id).collect()
}

// ── Category ──────────────────────────────────────────────────

#[test]
fn test_sort_by_category_ascending() {
    let sorted = sort_by_category(&sample(), false);
    assert_eq!(ids(&sorted), vec![3, 5, 6, 1, 2, 4]);
}

#[test]
fn test_sort_by_category_descending_is_exact_reverse() {
    let asc = sort_by_category(&sample(), false);
    let desc = sort_by_category(&sample(), true);
    let mut reversed = asc.clone();
    reversed.reverse();
    assert_eq!(desc, reversed);
    // ties come out in reverse storage order, not re-sorted by descending key
    assert_eq!(ids(&desc), vec![4, 2, 1, 6, 5, 3]);
}

#[test]
fn test_sort_does_not_mutate_input() {
    let input = sample();
    let _ = sort_by_category(&input, false);
    let _ = sort_by_date(&input, true);
    let _ = sort_by_cost(&input, false);
    assert_eq!(input, sample());
}

#[test]
fn test_sort_by_category_is_case_sensitive() {
    let input = vec![
        make_expense(1, "food", "1/1/2021", dec!(1), ""),
        make_expense(2, "Food", "1/1/2021", dec!(1), ""),
        make_expense(3, "Bills", "1/1/2021", dec!(1), ""),
    ];
    assert_eq!(ids(&sort_by_category(&input, false)), vec![3, 2, 1]);
}

// ── Date ──────────────────────────────────────────────────────

#[test]
fn test_sort_by_date_ascending() {
    let sorted = sort_by_date(&sample(), false);
    assert_eq!(ids(&sorted), vec![5, 6, 4, 3, 2, 1]);
}

#[test]
fn test_sort_by_date_descending() {
    let sorted = sort_by_date(&sample(), true);
    assert_eq!(ids(&sorted), vec![1, 2, 3, 4, 6, 5]);
}

#[test]
fn test_sort_by_date_malformed_first() {
    let mut input = sample();
    input.push(make_expense(7, "Food", "yesterday", dec!(1), "bad date"));
    input.push(make_expense(8, "Food", "0/0/0000", dec!(1), "zero date"));
    let sorted = sort_by_date(&input, false);
    assert_eq!(ids(&sorted), vec![7, 8, 5, 6, 4, 3, 2, 1]);

    let sorted = sort_by_date(&input, true);
    assert_eq!(ids(&sorted).last(), Some(&7));
}

#[test]
fn test_sort_by_date_is_chronological_not_lexical() {
    let input = vec![
        make_expense(1, "A", "10/1/2020", dec!(1), ""),
        make_expense(2, "A", "9/30/2020", dec!(1), ""),
        make_expense(3, "A", "1/1/2019", dec!(1), ""),
    ];
    assert_eq!(ids(&sort_by_date(&input, false)), vec![3, 2, 1]);
}

// ── Cost ──────────────────────────────────────────────────────

#[test]
fn test_sort_by_cost_ascending() {
    let sorted = sort_by_cost(&sample(), false);
    assert_eq!(ids(&sorted), vec![4, 5, 6, 1, 2, 3]);
}

#[test]
fn test_sort_by_cost_descending() {
    let sorted = sort_by_cost(&sample(), true);
    assert_eq!(ids(&sorted), vec![3, 2, 1, 6, 5, 4]);
}

#[test]
fn test_sort_by_cost_compares_numerically() {
    let input = vec![
        make_expense(1, "A", "1/1/2020", dec!(100), ""),
        make_expense(2, "A", "1/1/2020", dec!(9.5), ""),
        make_expense(3, "A", "1/1/2020", dec!(-20), ""),
    ];
    assert_eq!(ids(&sort_by_cost(&input, false)), vec![3, 2, 1]);
}

#[test]
fn test_sort_empty() {
    assert!(sort_by_category(&[], false).is_empty());
    assert!(sort_by_date(&[], true).is_empty());
    assert!(sort_by_cost(&[], false).is_empty());
}

// ── SortKey ───────────────────────────────────────────────────

#[test]
fn test_sort_key_parse() {
    assert_eq!(SortKey::parse("category"), Some(SortKey::Category));
    assert_eq!(SortKey::parse("Date"), Some(SortKey::Date));
    assert_eq!(SortKey::parse("COST"), Some(SortKey::Cost));
    assert_eq!(SortKey::parse("amount"), Some(SortKey::Cost));
    assert_eq!(SortKey::parse("title"), None);
}

#[test]
fn test_sort_key_apply_matches_functions() {
    let input = sample();
    assert_eq!(
        SortKey::Date.apply(&input, true),
        sort_by_date(&input, true)
    );
    assert_eq!(
        SortKey::Cost.apply(&input, false),
        sort_by_cost(&input, false)
    );
}
