use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::info;

use super::util::{flag_value, format_amount, has_flag, is_hex_color, positionals, truncate};
use crate::config::DEFAULT_CATEGORIES;
use crate::db::{Database, NOT_FOUND};
use crate::models::{today, Expense};
use crate::sort::SortKey;

const RECENT_COUNT: u32 = 5;

const ADD_USAGE: &str =
    "Usage: cashbook add <amount> <category> [--title <text>] [--date <MM/DD/YYYY>]";
const EDIT_USAGE: &str =
    "Usage: cashbook edit <id> <amount> <category> [--title <text>] [--date <MM/DD/YYYY>]";

pub(crate) fn as_cli(args: &[String], db: &mut Database) -> Result<()> {
    let Some(command) = args.get(1) else {
        return cli_summary(db);
    };
    let rest = &args[2..];
    match command.as_str() {
        "summary" | "s" => cli_summary(db),
        "balance" | "b" => cli_balance(rest, db),
        "add" => cli_add(rest, db),
        "edit" => cli_edit(rest, db),
        "delete" | "rm" => cli_delete(rest, db),
        "list" | "ls" => cli_list(rest, db),
        "categories" | "cats" => cli_categories(db),
        "add-category" => cli_add_category(rest, db),
        "rename-category" => cli_rename_category(rest, db),
        "recolor-category" => cli_recolor_category(rest, db),
        "remove-category" => cli_remove_category(rest, db),
        "reset" => cli_reset(rest, db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("cashbook {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("Cashbook - cash on hand and expense tracker");
    println!();
    println!("Usage: cashbook [-v] [command]");
    println!();
    println!("Commands:");
    println!("  (none), summary               Show balance and recent expenses");
    println!("  balance [amount]              Show or set cash on hand");
    println!("  add <amount> <category>       Record an expense");
    println!("    --title <text>              Optional description");
    println!("    --date <MM/DD/YYYY>         Posting date (default: today)");
    println!("  edit <id> <amount> <category> Replace an expense (--title, --date as for add)");
    println!("  delete <id>                   Delete one expense");
    println!("  list                          List all expenses");
    println!("    --sort <category|date|cost> Sort order (default: as entered)");
    println!("    --desc                      Reverse the sort");
    println!("  categories                    List categories");
    println!("  add-category <name> <#color>  Create a category");
    println!("  rename-category <old> <new>   Rename a category and its expenses");
    println!("    --color <#color>            Also change its color");
    println!("  recolor-category <name> <#color>");
    println!("                                Change a category's color and its expenses'");
    println!("  remove-category <name>        Delete a category and its expenses");
    println!("    --move-to <category>        Keep the expenses, filed under another category");
    println!("  reset --yes                   Erase all expenses and restore default categories");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("Set CASHBOOK_DB to use a different data file. -v enables debug logging.");
}

fn cli_summary(db: &Database) -> Result<()> {
    let balance = db.get_balance()?;
    let count = db.get_expense_count()?;
    let recent = db.get_recent_expenses(RECENT_COUNT)?;

    println!("Cash on hand: {}", format_amount(balance));
    println!("Expenses:     {count}");
    println!();
    if recent.is_empty() {
        println!("No expenses yet");
        return Ok(());
    }
    println!("Recent Expenses:");
    for e in &recent {
        println!(
            "  {:<10} {:<16} {:>12}  {}",
            e.date,
            truncate(&e.category, 16),
            format_amount(e.amount),
            truncate(&e.title, 30),
        );
    }
    Ok(())
}

fn cli_balance(args: &[String], db: &Database) -> Result<()> {
    if let Some(input) = args.first() {
        if db.set_balance_input(input)? {
            info!(input = %input, "balance updated");
        } else {
            eprintln!("Ignored non-numeric amount: {input}");
        }
    }
    println!("Cash on hand: {}", format_amount(db.get_balance()?));
    Ok(())
}

/// Builds an expense from `<amount> <category> [--title T] [--date D]`.
/// `base` supplies the title and date when their flags are absent.
fn expense_from_args(args: &[String], db: &Database, base: Option<&Expense>) -> Result<Expense> {
    let pos = positionals(args, &["--title", "--date"]);
    let [amount, category] = pos[..] else {
        anyhow::bail!("Expected <amount> <category>");
    };
    let amount = Decimal::from_str(amount).with_context(|| format!("Invalid amount: {amount}"))?;
    let cat = db.get_category_by_name(category)?.ok_or_else(|| {
        anyhow::anyhow!("Unknown category '{category}'. Create it with: cashbook add-category")
    })?;

    let date = flag_value(args, "--date")
        .map(str::to_string)
        .or_else(|| base.map(|b| b.date.clone()))
        .unwrap_or_else(today);
    let title = flag_value(args, "--title")
        .map(str::to_string)
        .or_else(|| base.map(|b| b.title.clone()))
        .unwrap_or_default();

    Ok(Expense::new(cat.name, date, amount)
        .with_title(title)
        .with_color(cat.color))
}

fn cli_add(args: &[String], db: &Database) -> Result<()> {
    let expense = expense_from_args(args, db, None).context(ADD_USAGE)?;

    let existing = db.find_expense_id(&expense)?;
    if existing != NOT_FOUND {
        println!("Note: an identical expense already exists (#{existing})");
    }

    let id = db.add_expense(&expense)?;
    println!(
        "Added #{id}: {} {} on {}",
        format_amount(expense.amount),
        expense.category,
        expense.date
    );
    Ok(())
}

fn parse_id(arg: Option<&String>, usage: &str) -> Result<i64> {
    let raw = arg.ok_or_else(|| anyhow::anyhow!("{usage}"))?;
    raw.trim_start_matches('#')
        .parse()
        .with_context(|| format!("Invalid expense id: {raw}"))
}

fn cli_edit(args: &[String], db: &Database) -> Result<()> {
    let id = parse_id(args.first(), EDIT_USAGE)?;
    let current = db
        .get_expense_by_id(id)?
        .ok_or_else(|| anyhow::anyhow!("No expense with id {id}"))?;

    let updated = expense_from_args(&args[1..], db, Some(&current)).context(EDIT_USAGE)?;
    db.update_expense(id, &updated)?;
    println!(
        "Updated #{id}: {} {} on {}",
        format_amount(updated.amount),
        updated.category,
        updated.date
    );
    Ok(())
}

fn cli_delete(args: &[String], db: &Database) -> Result<()> {
    let id = parse_id(args.first(), "Usage: cashbook delete <id>")?;
    let Some(expense) = db.get_expense_by_id(id)? else {
        anyhow::bail!("No expense with id {id}");
    };
    db.delete_expense(id)?;
    println!(
        "Deleted #{id}: {} {} on {}",
        format_amount(expense.amount),
        expense.category,
        expense.date
    );
    Ok(())
}

fn cli_list(args: &[String], db: &Database) -> Result<()> {
    let mut expenses = db.get_expenses()?;
    match flag_value(args, "--sort") {
        Some(key) => {
            let key = SortKey::parse(key).ok_or_else(|| {
                anyhow::anyhow!("Unknown sort '{key}'. Use category, date or cost")
            })?;
            expenses = key.apply(&expenses, has_flag(args, "--desc"));
        }
        None if has_flag(args, "--desc") => {
            anyhow::bail!("--desc needs --sort <category|date|cost>");
        }
        None => {}
    }

    if expenses.is_empty() {
        println!("No expenses");
        return Ok(());
    }

    println!("{:<5} {:<10} {:<16} {:>12}  Title", "ID", "Date", "Category", "Amount");
    println!("{}", "─".repeat(70));
    for e in &expenses {
        println!(
            "{:<5} {:<10} {:<16} {:>12}  {}",
            e.id.unwrap_or(0),
            e.date,
            truncate(&e.category, 16),
            format_amount(e.amount),
            truncate(&e.title, 30),
        );
    }
    let total: Decimal = expenses.iter().map(|e| e.amount).sum();
    println!("{}", "─".repeat(70));
    println!("{:<33} {:>12}", "Total", format_amount(total));
    Ok(())
}

fn cli_categories(db: &Database) -> Result<()> {
    let categories = db.get_categories()?;
    if categories.is_empty() {
        println!("No categories");
        return Ok(());
    }

    println!("{:<4} {:<20} {:<8} Expenses", "ID", "Name", "Color");
    println!("{}", "─".repeat(45));
    for cat in &categories {
        let used = db
            .search_by_category(&cat.name)?
            .into_iter()
            .filter(|&id| id != NOT_FOUND)
            .count();
        println!(
            "{:<4} {:<20} {:<8} {used}",
            cat.id.unwrap_or(0),
            truncate(&cat.name, 20),
            cat.color,
        );
    }
    Ok(())
}

fn require_color(color: &str) -> Result<()> {
    if !is_hex_color(color) {
        anyhow::bail!("Invalid color '{color}'. Expected a hex code like #004400");
    }
    Ok(())
}

fn cli_add_category(args: &[String], db: &Database) -> Result<()> {
    let [name, color] = positionals(args, &[])[..] else {
        anyhow::bail!("Usage: cashbook add-category <name> <#color>");
    };
    require_color(color)?;
    if db.is_duplicate_category(name)? {
        anyhow::bail!("Category '{name}' already exists");
    }
    let id = db.add_category(name, color)?;
    println!("Added category #{id}: {name} ({color})");
    Ok(())
}

/// Row ids of every category called `name`. The store does not keep names
/// unique, and expenses only record the name, so all of them change together.
fn category_ids(db: &Database, name: &str) -> Result<Vec<i64>> {
    let ids: Vec<i64> = db
        .get_categories()?
        .into_iter()
        .filter(|c| c.name == name)
        .filter_map(|c| c.id)
        .collect();
    if ids.is_empty() {
        anyhow::bail!("Category '{name}' not found");
    }
    Ok(ids)
}

fn cli_rename_category(args: &[String], db: &Database) -> Result<()> {
    let [old, new] = positionals(args, &["--color"])[..] else {
        anyhow::bail!("Usage: cashbook rename-category <old> <new> [--color <#color>]");
    };
    let current = db
        .get_category_by_name(old)?
        .ok_or_else(|| anyhow::anyhow!("Category '{old}' not found"))?;
    if new != old && db.is_duplicate_category(new)? {
        anyhow::bail!("Category '{new}' already exists");
    }
    let color = flag_value(args, "--color").unwrap_or(&current.color);
    require_color(color)?;

    for id in category_ids(db, old)? {
        db.update_category(id, new, color)?;
    }
    // categories do not cascade; move the expenses along explicitly
    db.batch_category_update(old, new, color)?;
    println!("Renamed category '{old}' to '{new}' ({color})");
    Ok(())
}

fn cli_recolor_category(args: &[String], db: &Database) -> Result<()> {
    let [name, color] = positionals(args, &[])[..] else {
        anyhow::bail!("Usage: cashbook recolor-category <name> <#color>");
    };
    require_color(color)?;
    for id in category_ids(db, name)? {
        db.update_category(id, name, color)?;
    }
    db.update_expense_category_color(name, color)?;
    println!("Category '{name}' is now {color}");
    Ok(())
}

fn cli_remove_category(args: &[String], db: &Database) -> Result<()> {
    let [name] = positionals(args, &["--move-to"])[..] else {
        anyhow::bail!("Usage: cashbook remove-category <name> [--move-to <category>]");
    };
    let ids = category_ids(db, name)?;
    let affected = db
        .search_by_category(name)?
        .into_iter()
        .filter(|&expense_id| expense_id != NOT_FOUND)
        .count();

    match flag_value(args, "--move-to") {
        Some(target) => {
            if target == name {
                anyhow::bail!("Cannot move expenses into the category being removed");
            }
            let target = db
                .get_category_by_name(target)?
                .ok_or_else(|| anyhow::anyhow!("Category '{target}' not found"))?;
            for id in &ids {
                db.delete_category(*id)?;
            }
            db.update_expense_category_group(name, &target.name)?;
            db.update_expense_category_color(&target.name, &target.color)?;
            println!(
                "Removed category '{name}'; moved {affected} expense(s) to '{}'",
                target.name
            );
        }
        None => {
            for id in &ids {
                db.delete_category(*id)?;
            }
            db.delete_by_category(name)?;
            println!("Removed category '{name}' and {affected} expense(s)");
        }
    }
    Ok(())
}

fn cli_reset(args: &[String], db: &mut Database) -> Result<()> {
    if !has_flag(args, "--yes") {
        anyhow::bail!("Reset erases every expense and category. Re-run as: cashbook reset --yes");
    }
    db.reset(DEFAULT_CATEGORIES)?;
    info!("database reset");
    println!("Reset complete: balance is {}", format_amount(Decimal::ZERO));
    Ok(())
}
