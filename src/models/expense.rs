use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Format of `Expense::date`: month and day may be unpadded.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

pub const DEFAULT_COLOR: &str = "#000000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    /// Row id assigned by the store. `None` until inserted.
    pub id: Option<i64>,
    pub category: String,
    /// Stored verbatim, never validated.
    pub date: String,
    pub amount: Decimal,
    pub title: String,
    pub color: String,
}

impl Expense {
    pub fn new(category: String, date: String, amount: Decimal) -> Self {
        Self {
            id: None,
            category,
            date,
            amount,
            title: String::new(),
            color: DEFAULT_COLOR.to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn parsed_date(&self) -> NaiveDate {
        parse_date(&self.date)
    }
}

/// Today's local date as `MM/DD/YYYY`.
pub fn today() -> String {
    chrono::Local::now().format(DATE_FORMAT).to_string()
}

/// Parse a `MM/DD/YYYY` date. Anything unparsable becomes 0001-01-01 so it
/// sorts before every real date.
pub fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap_or_else(|_| earliest_date())
}

fn earliest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}
