#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    /// Hex color code, e.g. `"#004400"`. Expenses filed under the category
    /// carry a copy of it.
    pub color: String,
}
