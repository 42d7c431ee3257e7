// src/services/schema.rs
//
// Maps an arbitrary input table onto the canonical columns the pipeline
// needs (store id, date, total sales) by scanning fixed alias lists in
// priority order, then coerces the key columns. Rows whose store id or
// date cannot be coerced are dropped outright.

use chrono::NaiveDate;
use serde_json::Value;

use crate::models::{Cell, NormalizedRow, Table};

const STORE_ALIASES: &[&str] = &[
    "Store Number",
    "store_id",
    "Store",
    "Store #",
    "StoreNumber",
    "Location ID",
    "LocationID",
    "location_id",
    "store",
];

const TOTAL_ALIASES: &[&str] = &["Total_Sales", "Total Sales", "total_sales", "Sales"];

const DATE_ALIASES: &[&str] = &["Date", "date", "Order Date", "order_date"];

// Canonical names the rest of the pipeline (and model feature lists)
// refer to, regardless of which alias the input table used.
pub const CANONICAL_STORE_COL: &str = "Store Number";
pub const CANONICAL_TOTAL_COL: &str = "Total_Sales";

/// First alias present in the table's columns, scanning the alias list in
/// order. Earlier aliases win regardless of column position.
fn find_col<'a>(aliases: &[&'a str], table: &Table) -> Option<&'a str> {
    aliases.iter().copied().find(|a| table.has_column(a))
}

pub fn find_store_col(table: &Table) -> Option<&'static str> {
    find_col(STORE_ALIASES, table)
}

pub fn find_total_col(table: &Table) -> Option<&'static str> {
    find_col(TOTAL_ALIASES, table)
}

pub fn find_date_col(table: &Table) -> Option<&'static str> {
    find_col(DATE_ALIASES, table)
}

/// Store ids arrive as integers, floats ("12.0") or strings; anything that
/// does not round-trip to an integer is a coercion failure.
fn coerce_store_id(cell: &Cell) -> Option<i64> {
    match cell {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.is_finite())
                    .map(|f| f as i64)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        }
        _ => None,
    }
}

fn coerce_date(cell: &Cell) -> Option<NaiveDate> {
    let s = cell.as_str()?.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .ok()
}

/// Lenient numeric read used for measures (sums). Missing or non-numeric
/// cells contribute nothing, so they read as None here and 0.0 at sum time.
pub fn numeric(cell: &Cell) -> Option<f64> {
    match cell {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Coerce the key columns and drop rows that fail. The raw cell map is
/// cloned into each surviving row: requests must never alias the shared
/// table's storage. The coerced store and total values are also written
/// under the canonical `"Store Number"`/`"Total_Sales"` keys, so a model
/// feature named canonically still resolves when the input header was an
/// alias.
pub fn normalize_rows(
    table: &Table,
    store_col: &str,
    date_col: &str,
    total_col: &str,
) -> Vec<NormalizedRow> {
    table
        .rows
        .iter()
        .filter_map(|cells| {
            let store = coerce_store_id(cells.get(store_col)?)?;
            let date = coerce_date(cells.get(date_col)?)?;
            let total_sales = cells.get(total_col).and_then(numeric).unwrap_or(0.0);
            let mut cells = cells.clone();
            if store_col != CANONICAL_STORE_COL {
                cells.insert(CANONICAL_STORE_COL.to_string(), Value::from(store));
            }
            if total_col != CANONICAL_TOTAL_COL {
                cells.insert(CANONICAL_TOTAL_COL.to_string(), Value::from(total_sales));
            }
            Some(NormalizedRow {
                store,
                date,
                total_sales,
                cells,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .into_iter()
            .map(|vals| {
                columns
                    .iter()
                    .cloned()
                    .zip(vals)
                    .collect::<HashMap<_, _>>()
            })
            .collect();
        Table { columns, rows }
    }

    #[test]
    fn earlier_alias_wins_over_later() {
        let t = table(&["Store", "store_id", "Date", "Total_Sales"], vec![]);
        // store_id precedes Store in the alias list even though Store
        // comes first in the table
        assert_eq!(find_store_col(&t), Some("store_id"));
    }

    #[test]
    fn missing_aliases_resolve_to_none() {
        let t = table(&["widget", "gadget"], vec![]);
        assert_eq!(find_store_col(&t), None);
        assert_eq!(find_total_col(&t), None);
        assert_eq!(find_date_col(&t), None);
    }

    #[test]
    fn total_alias_priority() {
        let t = table(&["Sales", "Total_Sales"], vec![]);
        assert_eq!(find_total_col(&t), Some("Total_Sales"));
    }

    #[test]
    fn normalize_drops_uncoercible_rows() {
        let t = table(
            &["store_id", "Date", "Total_Sales"],
            vec![
                vec![json!(5), json!("2020-01-15"), json!(100.0)],
                vec![json!("7"), json!("2020-02-01"), json!("150.5")],
                vec![json!("not-a-store"), json!("2020-03-01"), json!(10.0)],
                vec![json!(9), json!("not-a-date"), json!(10.0)],
                vec![json!(null), json!("2020-04-01"), json!(10.0)],
            ],
        );
        let rows = normalize_rows(&t, "store_id", "Date", "Total_Sales");
        // 5 rows in, 2 survive coercion
        assert_eq!(t.rows.len(), 5);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].store, 5);
        assert_eq!(rows[1].store, 7);
        assert_eq!(rows[1].total_sales, 150.5);
    }

    #[test]
    fn float_store_ids_round_trip() {
        let t = table(
            &["store_id", "Date", "Total_Sales"],
            vec![
                vec![json!(12.0), json!("2020-01-15"), json!(1.0)],
                vec![json!("12.0"), json!("2020-01-16"), json!(1.0)],
                vec![json!(12.5), json!("2020-01-17"), json!(1.0)],
            ],
        );
        let rows = normalize_rows(&t, "store_id", "Date", "Total_Sales");
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.store == 12));
    }

    #[test]
    fn slash_dates_parse() {
        let t = table(
            &["store_id", "Date", "Total_Sales"],
            vec![vec![json!(1), json!("03/17/2020"), json!(42.0)]],
        );
        let rows = normalize_rows(&t, "store_id", "Date", "Total_Sales");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].date,
            chrono::NaiveDate::from_ymd_opt(2020, 3, 17).unwrap()
        );
    }

    #[test]
    fn aliased_columns_materialize_canonical_keys() {
        let t = table(
            &["store", "Date", "Total Sales"],
            vec![vec![json!(5), json!("2020-01-15"), json!(150.5)]],
        );
        let rows = normalize_rows(&t, "store", "Date", "Total Sales");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells["Store Number"], json!(5));
        assert_eq!(rows[0].cells["Total_Sales"], json!(150.5));
        // the alias cell stays readable too
        assert_eq!(rows[0].cells["Total Sales"], json!(150.5));
    }

    #[test]
    fn canonical_columns_are_not_overwritten() {
        let t = table(
            &["Store Number", "Date", "Total_Sales"],
            vec![vec![json!("7"), json!("2020-01-15"), json!(10.0)]],
        );
        let rows = normalize_rows(&t, "Store Number", "Date", "Total_Sales");
        // raw cell keeps its original form when the header was already canonical
        assert_eq!(rows[0].cells["Store Number"], json!("7"));
        assert_eq!(rows[0].store, 7);
    }

    #[test]
    fn non_numeric_total_reads_as_zero() {
        let t = table(
            &["store_id", "Date", "Total_Sales"],
            vec![vec![json!(1), json!("2020-01-01"), json!("n/a")]],
        );
        let rows = normalize_rows(&t, "store_id", "Date", "Total_Sales");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_sales, 0.0);
    }
}
