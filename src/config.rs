use anyhow::{Context, Result};
use std::path::PathBuf;

/// Overrides the location of the data file.
pub(crate) const DB_PATH_ENV: &str = "CASHBOOK_DB";

/// Seeded on first run and restored by `reset`.
pub(crate) const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Food", "#004400"),
    ("Bills", "#660000"),
    ("Transportation", "#003366"),
    ("Entertainment", "#663300"),
    ("Pet Supplies", "#440044"),
    ("Other", "#333333"),
];

pub(crate) fn get_db_path() -> Result<PathBuf> {
    db_path_from(std::env::var_os(DB_PATH_ENV).map(PathBuf::from))
}

fn db_path_from(override_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = override_path.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }
    let proj_dirs = directories::ProjectDirs::from("com", "cashbook", "Cashbook")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("cashbook.db"))
}
