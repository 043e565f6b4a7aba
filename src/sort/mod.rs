//! Orderings for an in-memory expense list.
//!
//! Every sort is stable and ascending. With `desc` set the ascending result
//! is reversed afterwards, so ties come out in reverse insertion order rather
//! than in their original relative order.

use crate::models::Expense;

/// Which field an expense list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SortKey {
    Category,
    Date,
    Cost,
}

impl SortKey {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "category" | "cat" => Some(Self::Category),
            "date" => Some(Self::Date),
            "cost" | "amount" => Some(Self::Cost),
            _ => None,
        }
    }

    pub(crate) fn apply(self, expenses: &[Expense], desc: bool) -> Vec<Expense> {
        match self {
            Self::Category => sort_by_category(expenses, desc),
            Self::Date => sort_by_date(expenses, desc),
            Self::Cost => sort_by_cost(expenses, desc),
        }
    }
}

/// Alphabetical by category name.
pub(crate) fn sort_by_category(expenses: &[Expense], desc: bool) -> Vec<Expense> {
    let mut sorted = expenses.to_vec();
    sorted.sort_by(|a, b| a.category.cmp(&b.category));
    finish(sorted, desc)
}

/// Oldest to newest. Dates that are not `MM/DD/YYYY` sort first.
pub(crate) fn sort_by_date(expenses: &[Expense], desc: bool) -> Vec<Expense> {
    let mut sorted = expenses.to_vec();
    sorted.sort_by_cached_key(Expense::parsed_date);
    finish(sorted, desc)
}

/// Least to greatest amount.
pub(crate) fn sort_by_cost(expenses: &[Expense], desc: bool) -> Vec<Expense> {
    let mut sorted = expenses.to_vec();
    sorted.sort_by_key(|e| e.amount);
    finish(sorted, desc)
}

fn finish(mut sorted: Vec<Expense>, desc: bool) -> Vec<Expense> {
    if desc {
        sorted.reverse();
    }
    sorted
}

#[cfg(test)]
mod tests;
