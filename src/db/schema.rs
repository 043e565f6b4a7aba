pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS expenses (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    category  TEXT NOT NULL,
    date      TEXT NOT NULL,
    amount    TEXT NOT NULL,
    title     TEXT NOT NULL DEFAULT '',
    color     TEXT NOT NULL DEFAULT '#000000'
);

CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category);

CREATE TABLE IF NOT EXISTS finance (
    id   INTEGER PRIMARY KEY CHECK (id = 1),
    cash TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL,
    color TEXT NOT NULL DEFAULT '#000000'
);

"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

