// src/services/categories.rs
//
// Per-period category breakdown. Tables encode categories one of two
// ways and never both at once:
//   long form — a category-name column plus a shared "Sales" value column,
//   wide form — one "<Category>_Sales" column per category.
// Long form wins if a table somehow satisfies both detections.

use serde_json::Value;

use crate::models::{CategoryMap, NormalizedRow, Table};
use crate::services::schema::numeric;

const CATEGORY_NAME_ALIASES: &[&str] =
    &["Category", "Category Name", "category", "Department", "Dept"];

const WIDE_SUFFIX: &str = "_sales";

/// Placeholder label for long-form rows with a missing category name.
/// Such rows still count toward the breakdown rather than being dropped.
const UNNAMED_CATEGORY: &str = "(none)";

pub fn find_category_name_col(table: &Table) -> Option<&'static str> {
    CATEGORY_NAME_ALIASES
        .iter()
        .copied()
        .find(|a| table.has_column(a))
}

/// Wide-form category columns: anything ending in "_sales"
/// (case-insensitive), excluding the resolved total column.
pub fn wide_category_cols(table: &Table, total_col: &str) -> Vec<String> {
    table
        .columns
        .iter()
        .filter(|c| c.to_lowercase().ends_with(WIDE_SUFFIX) && c.as_str() != total_col)
        .cloned()
        .collect()
}

fn strip_wide_suffix(col: &str) -> String {
    col[..col.len() - WIDE_SUFFIX.len()].to_string()
}

fn category_label(cell: Option<&Value>) -> String {
    match cell {
        None | Some(Value::Null) => UNNAMED_CATEGORY.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Category -> amount for one store+month. Always returns a freshly
/// allocated map; nothing is retained across periods.
pub fn month_categories(
    rows: &[NormalizedRow],
    table: &Table,
    name_col: Option<&str>,
    wide_cols: &[String],
) -> CategoryMap {
    let mut cats = CategoryMap::new();
    if rows.is_empty() {
        return cats;
    }

    // Long form: category-name column plus a literal Sales/sales column.
    if let Some(name_col) = name_col {
        let val_col = if table.has_column("Sales") {
            Some("Sales")
        } else if table.has_column("sales") {
            Some("sales")
        } else {
            None
        };
        if let Some(val_col) = val_col {
            for row in rows {
                let label = category_label(row.cells.get(name_col));
                let v = row.cells.get(val_col).and_then(numeric).unwrap_or(0.0);
                *cats.entry(label).or_insert(0.0) += v;
            }
            return cats;
        }
    }

    // Wide form: sum each category column across the month's rows.
    // Columns with no numeric cells still appear, at 0.0.
    for col in wide_cols {
        let sum: f64 = rows
            .iter()
            .filter_map(|r| r.cells.get(col).and_then(numeric))
            .sum();
        cats.insert(strip_wide_suffix(col), sum);
    }

    cats
}
